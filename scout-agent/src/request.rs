//! Scout request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// One prompt typed into the Scout chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ScoutRequest {
    /// Unique request identifier
    pub request_id: String,
    /// Account asking (client wallet address)
    pub requester_id: String,
    /// Free-text prompt
    pub prompt: String,
    /// When the request was made
    pub requested_at: DateTime<Utc>,
}

impl ScoutRequest {
    /// Create a new request.
    pub fn new(requester_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            requester_id: requester_id.into(),
            prompt: prompt.into(),
            requested_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_unique() {
        let a = ScoutRequest::new("0xclient", "frontend");
        let b = ScoutRequest::new("0xclient", "frontend");
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.prompt, "frontend");
    }
}
