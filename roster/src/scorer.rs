//! Token-overlap ranking of the roster against a free-text prompt.
//!
//! Matching is substring containment between tokens, not whole-word
//! equality: the prompt token "front" credits the role token "frontend",
//! and the prompt token "maintainer" credits the role token "ai". Existing
//! shortlists depend on this, so it is kept as is.

use std::cmp::Ordering;

use tracing::trace;

use crate::tokenizer::Tokenizer;
use crate::types::{FreelancerRecord, ScoredCandidate, ScoutPick};

/// Maximum number of freelancers in a shortlist.
pub const SHORTLIST_LEN: usize = 3;

/// Credit for a prompt token overlapping any role token.
pub const ROLE_WEIGHT: u32 = 3;

/// Credit for a prompt token overlapping any description token.
pub const DESCRIPTION_WEIGHT: u32 = 1;

/// Ranks roster entries against a prompt.
pub struct MatchScorer;

impl MatchScorer {
    /// Top freelancers for `prompt`, at most [`SHORTLIST_LEN`].
    ///
    /// Never empty unless the roster is.
    pub fn score_freelancers(prompt: &str, roster: &[FreelancerRecord]) -> Vec<ScoutPick> {
        Self::rank(prompt, roster)
            .into_iter()
            .take(SHORTLIST_LEN)
            .map(|candidate| candidate.record.pick())
            .collect()
    }

    /// Full ranking for `prompt`.
    ///
    /// Zero-score entries are dropped unless every entry scored zero, in
    /// which case the whole roster is ranked by rating alone. An empty
    /// prompt takes that same path.
    pub fn rank<'a>(prompt: &str, roster: &'a [FreelancerRecord]) -> Vec<ScoredCandidate<'a>> {
        let prompt_tokens = Tokenizer::tokenize(prompt);

        let scored: Vec<ScoredCandidate<'a>> = roster
            .iter()
            .map(|record| ScoredCandidate {
                record,
                score: Self::score(&prompt_tokens, record),
            })
            .collect();

        let mut ranked: Vec<ScoredCandidate<'a>> =
            scored.iter().copied().filter(|c| c.score > 0).collect();
        if ranked.is_empty() {
            ranked = scored;
        }

        // Stable sort: full ties keep roster order.
        ranked.sort_by(Self::compare);

        trace!(
            prompt_tokens = prompt_tokens.len(),
            candidates = ranked.len(),
            "Ranked roster"
        );

        ranked
    }

    /// Score one record against already tokenized prompt tokens.
    pub fn score(prompt_tokens: &[String], record: &FreelancerRecord) -> u32 {
        let role_tokens = Tokenizer::tokenize(&record.role);
        let description_tokens = Tokenizer::tokenize(&record.description);

        prompt_tokens
            .iter()
            .map(|token| {
                let mut credit = 0;
                if role_tokens.iter().any(|t| overlaps(t, token)) {
                    credit += ROLE_WEIGHT;
                }
                if description_tokens.iter().any(|t| overlaps(t, token)) {
                    credit += DESCRIPTION_WEIGHT;
                }
                credit
            })
            .sum()
    }

    /// Score desc, then stars desc, then perfection desc.
    fn compare(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
        b.score
            .cmp(&a.score)
            .then_with(|| b.record.stars.total_cmp(&a.record.stars))
            .then_with(|| b.record.perfection.cmp(&a.record.perfection))
    }
}

/// Either token contains the other.
fn overlaps(record_token: &str, prompt_token: &str) -> bool {
    record_token.contains(prompt_token) || prompt_token.contains(record_token)
}
