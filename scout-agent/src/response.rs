//! Scout answer types.

use chrono::{DateTime, Utc};
use roster::ScoutPick;
use serde::{Deserialize, Serialize};

use crate::backend::traits::Usage;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// How a scout turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    /// The backend replied
    Answered,
    /// The backend failed; the message is the apology
    Degraded,
}

/// Reply shown to the client plus the shortlist cards rendered under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ScoutAnswer {
    /// Unique response identifier
    pub response_id: String,
    /// Request this answers
    pub request_id: String,
    /// Text shown in the chat
    pub message: String,
    /// Up to three shortlisted freelancers
    pub shortlist: Vec<ScoutPick>,
    /// Outcome
    pub status: AnswerStatus,
    /// Backend that produced the reply, if any
    pub backend_id: Option<String>,
    /// Token usage reported by the backend
    pub usage: Usage,
    /// When the answer was produced
    pub responded_at: DateTime<Utc>,
}

impl ScoutAnswer {
    /// A successful answer.
    pub fn answered(
        request_id: impl Into<String>,
        backend_id: impl Into<String>,
        message: impl Into<String>,
        shortlist: Vec<ScoutPick>,
        usage: Usage,
    ) -> Self {
        Self {
            response_id: uuid::Uuid::new_v4().to_string(),
            request_id: request_id.into(),
            message: message.into(),
            shortlist,
            status: AnswerStatus::Answered,
            backend_id: Some(backend_id.into()),
            usage,
            responded_at: Utc::now(),
        }
    }

    /// A degraded answer carrying a fixed apology.
    pub fn degraded(
        request_id: impl Into<String>,
        message: impl Into<String>,
        shortlist: Vec<ScoutPick>,
    ) -> Self {
        Self {
            response_id: uuid::Uuid::new_v4().to_string(),
            request_id: request_id.into(),
            message: message.into(),
            shortlist,
            status: AnswerStatus::Degraded,
            backend_id: None,
            usage: Usage::default(),
            responded_at: Utc::now(),
        }
    }

    /// Whether the backend replied.
    pub fn is_answered(&self) -> bool {
        self.status == AnswerStatus::Answered
    }
}
