//! Loop-guard instrumentation for JavaScript source snippets.
//!
//! The engine parses a snippet into a syntax tree, locates every loop of
//! the configured kinds in pre-order, injects a per-loop iteration counter
//! plus a threshold check that throws once the counter exceeds the
//! configured maximum, and serializes the tree back to source text. On
//! parse or generation failure the original snippet passes through
//! unchanged, with a logged warning as the only signal.

pub mod codegen;
pub mod inject;
pub mod locate;
pub mod parser;
pub mod pipeline;
pub mod transform;

pub use loopguard_core::{
    Error, GuardConfig, LoopKind, LoopKindSet, LoopSite, Result, Snippet,
};
pub use pipeline::guard_snippet;
pub use transform::{transform, TransformOutcome};

#[cfg(test)]
mod tests;
