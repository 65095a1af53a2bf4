//! Core roster types.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// One freelancer on the roster.
///
/// Records are defined at deploy time and never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct FreelancerRecord {
    /// Display name, e.g. "Alice Kim"
    pub name: String,
    /// Unique handle used by the proposal intent
    pub username: String,
    /// Role or title
    pub role: String,
    /// Free-text profile description
    #[serde(alias = "desc")]
    pub description: String,
    /// Completed project count
    pub projects: u32,
    /// Star rating (0.0 - 5.0)
    pub stars: f32,
    /// Perfection score (percentage 0 - 100)
    pub perfection: u8,
    /// Payment address on chain; may be empty for incomplete profiles
    #[serde(default)]
    pub wallet: String,
}

impl FreelancerRecord {
    /// First word of the display name.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or_default()
    }

    /// Whether a payment address is configured.
    pub fn has_wallet(&self) -> bool {
        !self.wallet.trim().is_empty()
    }

    /// Project this record into the public shortlist shape.
    pub fn pick(&self) -> ScoutPick {
        ScoutPick {
            name: self.name.clone(),
            role: self.role.clone(),
            stars: self.stars,
            perfection: self.perfection,
        }
    }
}

/// Shortlist entry handed to the conversational UI.
///
/// Carries no description or payment address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ScoutPick {
    pub name: String,
    pub role: String,
    pub stars: f32,
    pub perfection: u8,
}

/// A roster entry with its score for one prompt. Recomputed per query.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub record: &'a FreelancerRecord,
    pub score: u32,
}
