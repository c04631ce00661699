//! Unit tests for the topology module.

mod domain_tests;
mod eventing_tests;
mod host_tests;
