//! Unit tests for the pgAdmin module.

mod integration_tests;
