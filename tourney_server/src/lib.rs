//! HTTP front end for the tournament registry.
//!
//! The binary in `main.rs` wires these modules together; they are exposed as
//! a library so integration tests can drive the router directly.

pub mod api;
pub mod config;
pub mod logging;
