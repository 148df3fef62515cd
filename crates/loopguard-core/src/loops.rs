use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Prefix shared by every injected guard counter identifier.
pub const GUARD_PREFIX: &str = "loopGuard_";

/// The closed set of loop constructs the engine knows how to guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoopKind {
    #[serde(rename = "for")]
    For,
    #[serde(rename = "while")]
    While,
    #[serde(rename = "do-while")]
    DoWhile,
    #[serde(rename = "for-of")]
    ForOf,
    #[serde(rename = "for-in")]
    ForIn,
    #[serde(rename = "for-await-of")]
    ForAwaitOf,
}

impl LoopKind {
    pub const ALL: [LoopKind; 6] = [
        LoopKind::For,
        LoopKind::While,
        LoopKind::DoWhile,
        LoopKind::ForOf,
        LoopKind::ForIn,
        LoopKind::ForAwaitOf,
    ];

    /// Source-level spelling, also used in serialized configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopKind::For => "for",
            LoopKind::While => "while",
            LoopKind::DoWhile => "do-while",
            LoopKind::ForOf => "for-of",
            LoopKind::ForIn => "for-in",
            LoopKind::ForAwaitOf => "for-await-of",
        }
    }
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoopKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoopKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unknown loop kind: {s}")))
    }
}

/// The set of loop kinds enabled for one transform invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoopKindSet(BTreeSet<LoopKind>);

impl LoopKindSet {
    pub fn all() -> Self {
        Self(LoopKind::ALL.into_iter().collect())
    }

    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn of(kinds: impl IntoIterator<Item = LoopKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    pub fn contains(&self, kind: LoopKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn insert(&mut self, kind: LoopKind) -> bool {
        self.0.insert(kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = LoopKind> + '_ {
        self.0.iter().copied()
    }
}

impl Default for LoopKindSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<LoopKind> for LoopKindSet {
    fn from_iter<T: IntoIterator<Item = LoopKind>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One located loop: its kind and its 1-based discovery order in the
/// pre-order tree walk. The order names the guard, so numbering is a
/// per-invocation counter and never derived from node addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSite {
    pub order: u32,
    pub kind: LoopKind,
}

impl LoopSite {
    pub fn guard_name(&self) -> String {
        format!("{GUARD_PREFIX}{}", self.order)
    }
}
