//! Roster loading, validation and lookup.
//!
//! Raw entries are validated one by one at load time. A malformed entry is
//! logged and skipped, so scoring never sees missing or out-of-range fields.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::scorer::MatchScorer;
use crate::types::{FreelancerRecord, ScoutPick};

/// Roster shipped with the marketplace.
const BUILTIN_ROSTER: &str = include_str!("../data/freelancers.yaml");

/// Number of entries shown by an empty sidebar search.
const DEFAULT_SEARCH_LEN: usize = 5;

/// Error types for roster loading.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// Failed to read a roster file
    #[error("Failed to read roster: {0}")]
    Io(#[from] std::io::Error),

    /// YAML document is not a list of entries
    #[error("Invalid roster YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON document is not a list of entries
    #[error("Invalid roster JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// No entry survived validation
    #[error("Roster has no valid entries ({rejected} rejected)")]
    Empty { rejected: usize },
}

/// The ordered, read-only list of freelancers.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    records: Vec<FreelancerRecord>,
}

impl Roster {
    /// Build a roster from typed records, applying the same validation as
    /// the document loaders.
    pub fn new(records: Vec<FreelancerRecord>) -> Self {
        let (roster, _) = Self::from_entries(records.into_iter().map(Ok));
        roster
    }

    /// Load the built-in roster.
    pub fn builtin() -> Result<Self, RosterError> {
        Self::from_yaml(BUILTIN_ROSTER)
    }

    /// Load a roster from a YAML list.
    pub fn from_yaml(yaml: &str) -> Result<Self, RosterError> {
        let raw: Vec<serde_yaml::Value> = serde_yaml::from_str(yaml)?;
        let entries = raw
            .into_iter()
            .map(|value| serde_yaml::from_value(value).map_err(|e| e.to_string()));
        Self::non_empty(Self::from_entries(entries))
    }

    /// Load a roster from a JSON array.
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let entries = raw
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(|e| e.to_string()));
        Self::non_empty(Self::from_entries(entries))
    }

    /// Load a roster file; `.json` files are read as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    fn non_empty((roster, rejected): (Self, usize)) -> Result<Self, RosterError> {
        if roster.is_empty() {
            return Err(RosterError::Empty { rejected });
        }
        Ok(roster)
    }

    /// Validate entries in order, returning the roster and the rejected count.
    fn from_entries(
        entries: impl Iterator<Item = Result<FreelancerRecord, String>>,
    ) -> (Self, usize) {
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut rejected = 0;

        for (index, entry) in entries.enumerate() {
            let outcome = entry.and_then(|record| {
                validate(&record)?;
                if !seen.insert(record.username.to_lowercase()) {
                    return Err(format!("duplicate username '{}'", record.username));
                }
                Ok(record)
            });

            match outcome {
                Ok(record) => records.push(record),
                Err(reason) => {
                    warn!(index, %reason, "Skipping roster entry");
                    rejected += 1;
                }
            }
        }

        debug!(loaded = records.len(), rejected, "Roster loaded");
        (Self { records }, rejected)
    }

    /// All records in roster order.
    pub fn records(&self) -> &[FreelancerRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find by username, ignoring case.
    pub fn by_username(&self, username: &str) -> Option<&FreelancerRecord> {
        self.records
            .iter()
            .find(|r| r.username.eq_ignore_ascii_case(username))
    }

    /// Find the first record whose display name starts with `first_name`,
    /// ignoring case.
    pub fn by_first_name(&self, first_name: &str) -> Option<&FreelancerRecord> {
        let wanted = first_name.to_lowercase();
        self.records
            .iter()
            .find(|r| r.first_name().to_lowercase() == wanted)
    }

    /// Find by payment address, ignoring hex case.
    pub fn by_wallet(&self, wallet: &str) -> Option<&FreelancerRecord> {
        self.records
            .iter()
            .filter(|r| r.has_wallet())
            .find(|r| r.wallet.eq_ignore_ascii_case(wallet))
    }

    /// Sidebar filter: display names containing `query`, or the first few
    /// entries when the query is empty.
    pub fn search(&self, query: &str) -> Vec<&FreelancerRecord> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.records.iter().take(DEFAULT_SEARCH_LEN).collect();
        }
        self.records
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Shortlist for a prompt. See [`MatchScorer::score_freelancers`].
    pub fn score(&self, prompt: &str) -> Vec<ScoutPick> {
        MatchScorer::score_freelancers(prompt, &self.records)
    }

    /// SHA-256 over usernames and payment addresses, in roster order.
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        for record in &self.records {
            hasher.update(record.username.as_bytes());
            hasher.update(b":");
            hasher.update(record.wallet.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

fn validate(record: &FreelancerRecord) -> Result<(), String> {
    if record.name.trim().is_empty() {
        return Err("missing name".to_string());
    }
    if record.username.trim().is_empty() {
        return Err(format!("'{}' has no username", record.name));
    }
    if !(0.0..=5.0).contains(&record.stars) {
        return Err(format!("'{}' stars {} outside 0-5", record.username, record.stars));
    }
    if record.perfection > 100 {
        return Err(format!(
            "'{}' perfection {} above 100",
            record.username, record.perfection
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_roster() {
        let roster = Roster::builtin().unwrap();
        assert_eq!(roster.len(), 15);
        assert_eq!(roster.records()[0].username, "alice");
        assert!(roster.records().iter().all(|r| r.has_wallet()));
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let yaml = r#"
- name: Alice Kim
  username: alice
  role: Frontend Developer
  description: React.
  projects: 24
  stars: 4.8
  perfection: 98
  wallet: "0x1"
- name: No Role
  username: norole
- name: Too Bright
  username: bright
  role: Dev
  description: x
  projects: 1
  stars: 7.5
  perfection: 90
- name: Alice Again
  username: ALICE
  role: Dev
  description: x
  projects: 1
  stars: 4.0
  perfection: 90
- name: Brian Lee
  username: brian
  role: Backend Engineer
  desc: APIs.
  projects: 31
  stars: 4.6
  perfection: 95
"#;
        let roster = Roster::from_yaml(yaml).unwrap();
        let usernames: Vec<_> = roster.records().iter().map(|r| r.username.as_str()).collect();
        assert_eq!(usernames, vec!["alice", "brian"]);
        assert!(!roster.by_username("brian").unwrap().has_wallet());
    }

    #[test]
    fn test_all_rejected_is_error() {
        let json = r#"[{"name": "Ghost"}]"#;
        match Roster::from_json(json) {
            Err(RosterError::Empty { rejected }) => assert_eq!(rejected, 1),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(Roster::from_json("{}"), Err(RosterError::Json(_))));
    }

    #[test]
    fn test_lookups() {
        let roster = Roster::builtin().unwrap();
        assert_eq!(roster.by_username("Hugo").unwrap().name, "Hugo Silva");
        assert_eq!(roster.by_first_name("leo").unwrap().username, "leo");
        assert_eq!(
            roster
                .by_wallet("0xab8483f64d9c6d1ecf9b849ae677dd3315835cb2")
                .unwrap()
                .username,
            "alice"
        );
        assert!(roster.by_username("nobody123").is_none());
    }

    #[test]
    fn test_search() {
        let roster = Roster::builtin().unwrap();
        assert_eq!(roster.search("").len(), 5);
        let hits: Vec<_> = roster.search("LE").iter().map(|r| r.username.clone()).collect();
        assert_eq!(hits, vec!["brian", "elena", "leo"]);
    }

    #[test]
    fn test_fingerprint_tracks_wallets() {
        let roster = Roster::builtin().unwrap();
        let mut records = roster.records().to_vec();
        assert_eq!(Roster::new(records.clone()).fingerprint(), roster.fingerprint());

        records[0].wallet = "0xdead".to_string();
        assert_ne!(Roster::new(records).fingerprint(), roster.fingerprint());
    }

    #[test]
    fn test_builtin_empty_prompt_shortlist() {
        let roster = Roster::builtin().unwrap();
        let names: Vec<_> = roster.score("").into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Carla Smith", "Hugo Silva", "Leo Müller"]);
    }
}
