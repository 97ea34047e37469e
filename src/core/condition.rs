//! Build-variant conditions gating entries, rules and jobs.

use crate::core::error::{ArtdepsError, closest_match};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which build variant something applies to.
///
/// An entry carries one condition; a path rule may narrow it further. The
/// effective condition of a rule is the [`intersect`](Condition::intersect) of
/// the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Condition {
    /// Applies to every variant.
    #[default]
    Always,
    /// Applies to debug builds only.
    Debug,
    /// Applies to release builds only.
    Release,
}

impl Condition {
    pub const ALL: [Self; 3] = [Self::Always, Self::Debug, Self::Release];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "Always",
            Self::Debug => "Debug",
            Self::Release => "Release",
        }
    }

    /// Narrowest condition satisfying both, or `None` if they exclude each other.
    pub fn intersect(self, other: Self) -> Option<Self> {
        match (self, other) {
            (Self::Always, c) | (c, Self::Always) => Some(c),
            (a, b) if a == b => Some(a),
            _ => None,
        }
    }

    /// Whether something tagged with `self` applies when building `variant`.
    pub fn applies_to(self, variant: Self) -> bool {
        self == Self::Always || variant == Self::Always || self == variant
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = ArtdepsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.as_str() == s).ok_or_else(|| {
            let names = Self::ALL.map(Self::as_str);
            ArtdepsError::UnknownCondition {
                value: s.to_string(),
                suggestion: closest_match(s, &names).map(str::to_string),
            }
        })
    }
}
