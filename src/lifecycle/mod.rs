//! Runtime orchestration and lifecycle management.
//!
//! - [`Dashboard`] - Starts the store, wires it to the gateway and session, and tears the
//!   session down on logout
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod dashboard;
pub mod tracing;

pub use dashboard::*;
pub use tracing::*;
