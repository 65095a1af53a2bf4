//! Recognition of "send project proposal to X" utterances.

use std::sync::OnceLock;

use regex::Regex;
use roster::{FreelancerRecord, Roster};
use tracing::debug;

fn intent_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)send\s+project\s+(?:proposal|invitation)\s+to\s+@?(\w+)").ok()
        })
        .as_ref()
}

/// Parses proposal intents and resolves their target on the roster.
pub struct ProposalIntentParser;

impl ProposalIntentParser {
    /// The lowercased handle named by a proposal intent, if the utterance is one.
    pub fn handle(utterance: &str) -> Option<String> {
        let captures = intent_pattern()?.captures(utterance)?;
        captures.get(1).map(|m| m.as_str().to_lowercase())
    }

    /// Resolve the intent's target: exact username first, then first name.
    ///
    /// `None` when the utterance is not an intent or names nobody on the
    /// roster; the caller then handles the message normally.
    pub fn resolve<'a>(utterance: &str, roster: &'a Roster) -> Option<&'a FreelancerRecord> {
        let handle = Self::handle(utterance)?;
        let target = roster
            .by_username(&handle)
            .or_else(|| roster.by_first_name(&handle));

        debug!(%handle, resolved = target.is_some(), "Proposal intent");
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::builtin().unwrap()
    }

    #[test]
    fn test_handle_variants() {
        assert_eq!(
            ProposalIntentParser::handle("send project proposal to alice").as_deref(),
            Some("alice")
        );
        assert_eq!(
            ProposalIntentParser::handle("Please SEND PROJECT INVITATION TO @Hugo now").as_deref(),
            Some("hugo")
        );
        assert!(ProposalIntentParser::handle("send a proposal to alice").is_none());
        assert!(ProposalIntentParser::handle("send project proposal to").is_none());
    }

    #[test]
    fn test_username_wins_over_first_name() {
        let mut records = roster().records().to_vec();
        // "kim" is Alice Kim's surname; give someone else that username
        records[1].username = "kim".to_string();
        records.push(roster::FreelancerRecord {
            name: "Kim Novak".to_string(),
            username: "knovak".to_string(),
            ..records[0].clone()
        });
        let roster = Roster::new(records);

        let target = ProposalIntentParser::resolve("send project proposal to kim", &roster).unwrap();
        assert_eq!(target.name, "Brian Lee");

        let target = ProposalIntentParser::resolve("send project proposal to Kim", &roster).unwrap();
        assert_eq!(target.username, "kim");
    }

    #[test]
    fn test_first_name_fallback() {
        let roster = roster();
        let mut records = roster.records().to_vec();
        records[7].username = "hsilva".to_string();
        let roster = Roster::new(records);

        let target = ProposalIntentParser::resolve("send project invitation to @hugo", &roster).unwrap();
        assert_eq!(target.username, "hsilva");
    }

    #[test]
    fn test_unknown_target() {
        assert!(ProposalIntentParser::resolve("send project proposal to nobody123", &roster()).is_none());
        assert!(ProposalIntentParser::resolve("find me a designer", &roster()).is_none());
    }
}
