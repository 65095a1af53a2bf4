//! Core trait for Scout backends.

use async_trait::async_trait;
use roster::FreelancerRecord;
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Error types for backend calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Backend is not available
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Rate limited by the backend
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    /// No reply within the deadline
    #[error("Timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// The "generate agent reply" collaborator.
///
/// Given a user prompt and the roster, produce conversational free text.
#[async_trait]
pub trait ScoutBackend: Send + Sync {
    /// Backend identifier (model name or endpoint).
    fn id(&self) -> &str;

    /// Check if the backend is currently reachable.
    async fn is_available(&self) -> bool;

    /// Generate a reply.
    async fn reply(&self, request: ReplyRequest<'_>) -> Result<AgentReply, BackendError>;
}

/// Input for one reply.
#[derive(Debug, Clone, Copy)]
pub struct ReplyRequest<'a> {
    /// What the client typed
    pub prompt: &'a str,
    /// Freelancers the agent may recommend
    pub roster: &'a [FreelancerRecord],
}

impl<'a> ReplyRequest<'a> {
    pub fn new(prompt: &'a str, roster: &'a [FreelancerRecord]) -> Self {
        Self { prompt, roster }
    }
}

/// Free-text reply from a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReply {
    /// Generated text
    pub content: String,
    /// Token usage, zero when the backend does not report it
    pub usage: Usage,
}

impl AgentReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: Usage::default(),
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl Usage {
    /// Get total tokens.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}
