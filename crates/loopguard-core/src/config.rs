use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::loops::LoopKindSet;

/// Threshold applied when the caller does not override `max`.
pub const DEFAULT_MAX: u32 = 1000;

/// Configuration for one transform invocation.
///
/// `#[serde(default)]` makes partially specified records merge onto the
/// defaults, so `{"max": 500}` keeps all six loop kinds enabled. Every
/// construction path returns a fresh, non-aliased value; independent
/// configurations never influence each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub max: u32,
    pub loops: LoopKindSet,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX,
            loops: LoopKindSet::all(),
        }
    }
}

impl GuardConfig {
    pub fn with_max(max: u32) -> Self {
        Self {
            max,
            ..Self::default()
        }
    }

    pub fn with_loops(loops: LoopKindSet) -> Self {
        Self {
            loops,
            ..Self::default()
        }
    }

    /// Merge caller overrides onto the defaults, returning a fresh value.
    pub fn merged(overrides: GuardOverrides) -> Self {
        let defaults = Self::default();
        Self {
            max: overrides.max.unwrap_or(defaults.max),
            loops: overrides.loops.unwrap_or(defaults.loops),
        }
    }

    /// Configuration is caller-controlled and fails fast, unlike the
    /// permissive parse-failure path.
    pub fn validate(&self) -> Result<()> {
        if self.max == 0 {
            return Err(Error::Config(
                "max must be a positive iteration threshold".into(),
            ));
        }
        Ok(())
    }
}

/// Partial overrides accepted by the configuration factory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loops: Option<LoopKindSet>,
}
