//! Audit trail for scout turns.
//!
//! Records every prompt, which backend answered, and what was shortlisted.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::traits::Usage;
use crate::request::ScoutRequest;
use crate::response::{AnswerStatus, ScoutAnswer};

/// Maximum entries in the audit log before pruning.
const MAX_AUDIT_ENTRIES: usize = 10_000;

/// An entry in the audit log.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Unique entry ID
    pub entry_id: String,
    /// Request ID
    pub request_id: String,
    /// Response ID (if available)
    pub response_id: Option<String>,
    /// Who asked
    pub requester_id: String,
    /// Prompt as typed
    pub prompt: String,
    /// Roster fingerprint at request time
    pub roster_fingerprint: String,
    /// Backend that answered
    pub backend_id: Option<String>,
    /// Outcome
    pub status: Option<AnswerStatus>,
    /// Display names shortlisted
    pub shortlist: Vec<String>,
    /// Token usage
    pub usage: Option<Usage>,
    /// When the request was made
    pub requested_at: DateTime<Utc>,
    /// When the answer was produced
    pub responded_at: Option<DateTime<Utc>>,
    /// Processing duration in ms
    pub duration_ms: Option<u64>,
}

impl AuditEntry {
    /// Create an entry from a request.
    pub fn from_request(request: &ScoutRequest, roster_fingerprint: impl Into<String>) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            request_id: request.request_id.clone(),
            response_id: None,
            requester_id: request.requester_id.clone(),
            prompt: request.prompt.clone(),
            roster_fingerprint: roster_fingerprint.into(),
            backend_id: None,
            status: None,
            shortlist: Vec::new(),
            usage: None,
            requested_at: request.requested_at,
            responded_at: None,
            duration_ms: None,
        }
    }

    fn record_answer(&mut self, answer: &ScoutAnswer) {
        self.response_id = Some(answer.response_id.clone());
        self.backend_id = answer.backend_id.clone();
        self.status = Some(answer.status);
        self.shortlist = answer.shortlist.iter().map(|p| p.name.clone()).collect();
        self.usage = Some(answer.usage.clone());
        self.responded_at = Some(answer.responded_at);
        self.duration_ms = Some(
            (answer.responded_at - self.requested_at)
                .num_milliseconds()
                .max(0) as u64,
        );
    }
}

/// Audit log for tracking scout turns.
pub struct AuditLog {
    /// Log entries (newest first)
    entries: Arc<RwLock<VecDeque<AuditEntry>>>,
    /// Maximum entries to retain
    max_entries: usize,
}

impl AuditLog {
    /// Create a new audit log.
    pub fn new() -> Self {
        Self::with_max_entries(MAX_AUDIT_ENTRIES)
    }

    /// Create with custom max entries.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries,
        }
    }

    /// Log a request (before processing).
    pub async fn log_request(&self, request: &ScoutRequest, roster_fingerprint: &str) -> String {
        let entry = AuditEntry::from_request(request, roster_fingerprint);
        let entry_id = entry.entry_id.clone();

        let mut entries = self.entries.write().await;
        entries.push_front(entry);

        // Prune if over limit
        while entries.len() > self.max_entries {
            entries.pop_back();
        }

        entry_id
    }

    /// Update entry with the answer.
    pub async fn log_answer(&self, entry_id: &str, answer: &ScoutAnswer) {
        let mut entries = self.entries.write().await;

        if let Some(entry) = entries.iter_mut().find(|e| e.entry_id == entry_id) {
            entry.record_answer(answer);
        }
    }

    /// Get recent entries.
    pub async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries.iter().take(limit).cloned().collect()
    }

    /// Get entry by request ID.
    pub async fn get_by_request(&self, request_id: &str) -> Option<AuditEntry> {
        let entries = self.entries.read().await;
        entries.iter().find(|e| e.request_id == request_id).cloned()
    }

    /// Get entries for a requester.
    pub async fn get_by_requester(&self, requester_id: &str, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| e.requester_id == requester_id)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Get statistics.
    pub async fn stats(&self) -> AuditStats {
        let entries = self.entries.read().await;

        let total = entries.len();
        let answered = entries
            .iter()
            .filter(|e| e.status == Some(AnswerStatus::Answered))
            .count();
        let degraded = entries
            .iter()
            .filter(|e| e.status == Some(AnswerStatus::Degraded))
            .count();

        let timed: Vec<u64> = entries.iter().filter_map(|e| e.duration_ms).collect();
        let avg_duration_ms = if timed.is_empty() {
            0
        } else {
            timed.iter().sum::<u64>() / timed.len() as u64
        };

        AuditStats {
            total_requests: total,
            answered,
            degraded,
            avg_duration_ms,
        }
    }

    /// Get count.
    pub async fn count(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics from the audit log.
#[derive(Debug, Clone)]
pub struct AuditStats {
    /// Total requests logged
    pub total_requests: usize,
    /// Turns the backend answered
    pub answered: usize,
    /// Turns that fell back to the apology
    pub degraded: usize,
    /// Average processing duration
    pub avg_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster::ScoutPick;

    #[tokio::test]
    async fn test_audit_log() {
        let log = AuditLog::new();
        let request = ScoutRequest::new("0xclient", "need a designer");

        let entry_id = log.log_request(&request, "abc123").await;

        let entry = log.get_by_request(&request.request_id).await.unwrap();
        assert_eq!(entry.roster_fingerprint, "abc123");
        assert!(entry.status.is_none());

        let answer = ScoutAnswer::answered(
            &request.request_id,
            "mock-scout",
            "Carla Smith is great.",
            vec![ScoutPick {
                name: "Carla Smith".to_string(),
                role: "UI/UX Designer".to_string(),
                stars: 4.9,
                perfection: 99,
            }],
            Usage::default(),
        );
        log.log_answer(&entry_id, &answer).await;

        let entry = log.get_by_request(&request.request_id).await.unwrap();
        assert_eq!(entry.status, Some(AnswerStatus::Answered));
        assert_eq!(entry.shortlist, vec!["Carla Smith"]);
        assert!(entry.duration_ms.is_some());
    }

    #[tokio::test]
    async fn test_audit_pruning_and_stats() {
        let log = AuditLog::with_max_entries(3);

        for i in 0..5 {
            let request = ScoutRequest::new(format!("0x{}", i), "prompt");
            let entry_id = log.log_request(&request, "fp").await;
            let answer = ScoutAnswer::degraded(&request.request_id, "sorry", vec![]);
            log.log_answer(&entry_id, &answer).await;
        }

        assert_eq!(log.count().await, 3);
        assert_eq!(log.recent(1).await[0].requester_id, "0x4");
        assert_eq!(log.get_by_requester("0x0", 10).await.len(), 0);

        let stats = log.stats().await;
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.degraded, 3);
        assert_eq!(stats.answered, 0);
    }
}
