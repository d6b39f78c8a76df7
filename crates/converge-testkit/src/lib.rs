//! Test-support layer for the converge gateway-configuration tool.
//!
//! Convergence runs against a live gateway produce action messages full of
//! non-deterministic identifiers (entity uuids, timestamps, host addresses).
//! This crate makes those runs comparable byte-for-byte across test
//! executions:
//!
//! - [`Sanitizer`]: rewrites UUID-shaped substrings to deterministically
//!   assigned replacement ids and redacts volatile keys.
//! - [`Harness`]: captures the engine's action log in raw and sanitized
//!   parallel forms, and tears down gateway state between tests by driving
//!   the convergence executor with a removal plan.
//!
//! The convergence engine itself (diffing, admin API transport, yaml
//! rendering) lives behind the seams in [`traits`]; this crate only consumes
//! those contracts.

pub mod client;
pub mod error;
pub mod harness;
pub mod sanitize;
pub mod state;
pub mod traits;

pub use client::{ADMIN_HOST_ENV, AdminClient, AdminConfig, CANONICAL_ADMIN_HOST, admin_client};
pub use error::HarnessError;
pub use harness::Harness;
pub use sanitize::{IGNORED_KEYS, Sanitizer};
pub use state::{DesiredConfig, GatewayState, removal_plan};
pub use traits::{ConvergeExecutor, PrettyPrinter, StateReader};
