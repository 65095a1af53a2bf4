//! Persistence for client/freelancer chat messages.

pub mod memory;
pub mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix that marks a delivered project proposal.
pub const PROPOSAL_PREFIX: &str = "Project Proposal: ";

/// Message store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Message store not configured: {0}")]
    NotConfigured(String),

    #[error("Message rejected: {0}")]
    Rejected(String),

    #[error("Request failed with HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse store response: {0}")]
    Parse(String),

    #[error("Message store unavailable")]
    Unavailable,
}

/// One persisted chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "from")]
    pub sender: String,
    #[serde(rename = "to")]
    pub recipient: String,
    pub text: String,
    /// Assigned by the store
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            text: text.into(),
            timestamp: None,
        }
    }

    /// Whether this message is a project proposal delivered by Scout.
    pub fn is_proposal(&self) -> bool {
        self.text.starts_with(PROPOSAL_PREFIX)
    }

    /// Whether the message belongs to the conversation between `a` and `b`,
    /// in either direction.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.sender == a && self.recipient == b) || (self.sender == b && self.recipient == a)
    }
}

/// A durable message store.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Store identifier for logging
    fn id(&self) -> &str;

    /// Persist a message and return it as stored.
    async fn send(&self, sender: &str, recipient: &str, text: &str) -> Result<ChatMessage, StoreError>;

    /// Messages between two accounts in either direction, oldest first.
    async fn history(&self, account: &str, peer: &str) -> Result<Vec<ChatMessage>, StoreError>;

    /// Oldest message addressed to `recipient` from someone else.
    ///
    /// Freelancers use this to discover which client contacted them.
    async fn first_inbound(&self, recipient: &str) -> Result<Option<ChatMessage>, StoreError>;
}

pub(crate) fn reject_blank(text: &str) -> Result<(), StoreError> {
    if text.trim().is_empty() {
        return Err(StoreError::Rejected("empty message".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_names() {
        let message = ChatMessage::new("0xclient", "0xfreelancer", "hello");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["from"], "0xclient");
        assert_eq!(json["to"], "0xfreelancer");

        let parsed: ChatMessage = serde_json::from_str(
            r#"{"id": 7, "from": "a", "to": "b", "text": "hi", "timestamp": "2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.sender, "a");
        assert!(parsed.timestamp.is_some());
    }

    #[test]
    fn test_is_proposal() {
        assert!(ChatMessage::new("a", "b", "Project Proposal: build a dApp").is_proposal());
        assert!(!ChatMessage::new("a", "b", "project proposal: lowercase").is_proposal());
    }

    #[test]
    fn test_is_between() {
        let message = ChatMessage::new("a", "b", "hi");
        assert!(message.is_between("a", "b"));
        assert!(message.is_between("b", "a"));
        assert!(!message.is_between("a", "c"));
    }
}
