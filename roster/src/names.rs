//! Best-effort mapping from free-text agent replies back to roster entries.
//!
//! Lossy and non-authoritative: a reply that mentions a freelancer only in
//! lowercase, or by surname alone, is missed. Use the output to render
//! shortlist cards, never to pick a payment target.

use std::sync::OnceLock;

use regex::Regex;

use crate::scorer::SHORTLIST_LEN;
use crate::types::{FreelancerRecord, ScoutPick};

/// Capitalized words, Unicode aware ("Müller" included).
fn capitalized_word() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\b\p{Lu}\p{L}*\b").ok())
        .as_ref()
}

/// Pulls name-like words out of text and resolves them against the roster.
pub struct NameExtractor;

impl NameExtractor {
    /// Roster entries mentioned in `text`, in order of first mention.
    ///
    /// A capitalized word matches an entry whose display name starts with
    /// it. When several entries share that first name, the one whose full
    /// name is spelled out at that mention wins, otherwise the earliest on
    /// the roster.
    pub fn extract<'a>(text: &str, roster: &'a [FreelancerRecord]) -> Vec<&'a FreelancerRecord> {
        let Some(pattern) = capitalized_word() else {
            return Vec::new();
        };

        let mut found: Vec<&'a FreelancerRecord> = Vec::new();

        for mention in pattern.find_iter(text) {
            let word = mention.as_str();
            let same_first: Vec<&'a FreelancerRecord> = roster
                .iter()
                .filter(|record| record.first_name() == word)
                .collect();
            let Some(&earliest) = same_first.first() else {
                continue;
            };

            let at_mention = &text[mention.start()..];
            let chosen = same_first
                .iter()
                .copied()
                .find(|record| at_mention.starts_with(record.name.as_str()))
                .unwrap_or(earliest);

            if !found.iter().any(|r| r.username == chosen.username) {
                found.push(chosen);
            }
        }

        found
    }

    /// Shortlist cards for the entries mentioned in `text`.
    pub fn shortlist(text: &str, roster: &[FreelancerRecord]) -> Vec<ScoutPick> {
        Self::extract(text, roster)
            .into_iter()
            .take(SHORTLIST_LEN)
            .map(FreelancerRecord::pick)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freelancer(name: &str, username: &str) -> FreelancerRecord {
        FreelancerRecord {
            name: name.to_string(),
            username: username.to_string(),
            role: "Web3 Developer".to_string(),
            description: "Builds things.".to_string(),
            projects: 3,
            stars: 4.5,
            perfection: 95,
            wallet: format!("0x{}", username),
        }
    }

    fn roster() -> Vec<FreelancerRecord> {
        vec![
            freelancer("Alice Kim", "alice"),
            freelancer("Hugo Silva", "hugo"),
            freelancer("Leo Müller", "leo"),
            freelancer("Alice Moreau", "amoreau"),
        ]
    }

    fn usernames(found: &[&FreelancerRecord]) -> Vec<String> {
        found.iter().map(|r| r.username.clone()).collect()
    }

    #[test]
    fn test_extracts_in_order_of_mention() {
        let roster = roster();
        let reply = "I'd suggest Hugo Silva first, then Leo. Hugo has shipped ML models.";
        assert_eq!(
            usernames(&NameExtractor::extract(reply, &roster)),
            vec!["hugo", "leo"]
        );
    }

    #[test]
    fn test_full_name_disambiguates_shared_first_name() {
        let roster = roster();
        let reply = "Alice Moreau is a strong fit.";
        assert_eq!(
            usernames(&NameExtractor::extract(reply, &roster)),
            vec!["amoreau"]
        );

        let reply = "Ask Alice about it.";
        assert_eq!(usernames(&NameExtractor::extract(reply, &roster)), vec!["alice"]);
    }

    #[test]
    fn test_shared_first_name_resolved_per_mention() {
        let roster = roster();
        let reply = "Consider Alice Kim or Alice Moreau.";
        assert_eq!(
            usernames(&NameExtractor::extract(reply, &roster)),
            vec!["alice", "amoreau"]
        );

        let reply = "Alice Moreau leads, and Alice can review.";
        assert_eq!(
            usernames(&NameExtractor::extract(reply, &roster)),
            vec!["amoreau", "alice"]
        );
    }

    #[test]
    fn test_lowercase_mentions_are_missed() {
        let roster = roster();
        assert!(NameExtractor::extract("maybe alice or hugo?", &roster).is_empty());
        assert!(NameExtractor::extract("Sure! Here are some options.", &roster).is_empty());
    }

    #[test]
    fn test_shortlist_caps_at_three() {
        let roster = roster();
        let reply = "Alice Kim, Hugo Silva, Leo Müller and Alice Moreau all qualify.";
        let picks = NameExtractor::shortlist(reply, &roster);
        assert_eq!(picks.len(), 3);
        assert_eq!(picks[2].name, "Leo Müller");
    }
}
