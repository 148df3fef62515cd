use loopguard_core::{Error, GuardConfig, LoopSite, Result};
use tracing::warn;

use crate::{codegen, inject, parser};

/// Result of one transform invocation. The permissive fallback contract
/// is explicit here: parse and generation failures do not escape as
/// errors, they come back as `Fallback` carrying the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    Guarded { code: String, loops: Vec<LoopSite> },
    Fallback { code: String, reason: Error },
}

impl TransformOutcome {
    pub fn code(&self) -> &str {
        match self {
            TransformOutcome::Guarded { code, .. } => code,
            TransformOutcome::Fallback { code, .. } => code,
        }
    }

    pub fn into_code(self) -> String {
        match self {
            TransformOutcome::Guarded { code, .. } => code,
            TransformOutcome::Fallback { code, .. } => code,
        }
    }

    pub fn is_guarded(&self) -> bool {
        matches!(self, TransformOutcome::Guarded { .. })
    }

    /// Guarded loop sites in discovery order; empty on fallback.
    pub fn loops(&self) -> &[LoopSite] {
        match self {
            TransformOutcome::Guarded { loops, .. } => loops,
            TransformOutcome::Fallback { .. } => &[],
        }
    }
}

/// Run the full pipeline: parse, locate-and-inject, generate.
///
/// Invalid configuration fails fast with `Err`. A snippet that fails to
/// parse (or, defensively, to re-serialize) passes through unguarded: the
/// original text is returned and a warning is the only signal, so one
/// malformed snippet never halts the surrounding pipeline.
pub fn transform(source: &str, config: &GuardConfig) -> Result<TransformOutcome> {
    config.validate()?;

    let mut program = match parser::parse(source) {
        Ok(program) => program,
        Err(reason) => {
            warn!(%reason, "loop guard: returning snippet unguarded");
            return Ok(TransformOutcome::Fallback {
                code: source.to_string(),
                reason,
            });
        }
    };

    let loops = inject::inject(&mut program, config);

    match codegen::generate(&program) {
        Ok(code) => Ok(TransformOutcome::Guarded { code, loops }),
        Err(reason) => {
            warn!(%reason, "loop guard: returning snippet unguarded");
            Ok(TransformOutcome::Fallback {
                code: source.to_string(),
                reason,
            })
        }
    }
}
