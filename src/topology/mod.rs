//! Resource model for the local development topology.
//!
//! This module is the boundary to the orchestration substrate: it records
//! which resources exist, which endpoints they expose, how parameters
//! resolve and which lifecycle events fire during a run. Starting
//! containers, probing health and ordering startup happen elsewhere. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Builder and run services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
