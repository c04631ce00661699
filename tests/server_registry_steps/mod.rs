//! Step definitions for server registry scenarios.

pub mod world;

mod given;
mod then;
mod when;
