//! Type definitions for the Glow Stack router
//!
//! Task kinds with their static profiles, and the per-request input
//! descriptors parsed from request bodies.

mod request;
mod task;

pub use request::*;
pub use task::*;
