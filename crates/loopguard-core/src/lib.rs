//! Language-independent model for the loop-guard transformation engine.
//!
//! The engine crates (one per supported language) depend on this crate for
//! the loop taxonomy, guard configuration, snippet records and the error
//! types shared across the pipeline boundary.

pub mod config;
pub mod error;
pub mod loops;
pub mod snippet;

pub use config::{GuardConfig, GuardOverrides, DEFAULT_MAX};
pub use error::{Error, Result};
pub use loops::{LoopKind, LoopKindSet, LoopSite, GUARD_PREFIX};
pub use snippet::Snippet;
