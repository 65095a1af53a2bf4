//! Scout Agent - the CryptoTasks freelancer assistant
//!
//! Wraps the external text-generation collaborator behind a trait and turns
//! its replies into shortlists:
//! - Trait-based backends (Scout endpoint, OpenAI-compatible, mock)
//! - Timeout and apology fallback so a failed backend never fails a turn
//! - Shortlists from names in the reply, or from roster scoring
//! - Audit trail of every scout turn
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             ScoutService                │
//! │   (prompt -> reply + shortlist)         │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ScoutBackend │       │   Roster    │
//! │ (Endpoint/  │       │ NameExtract │
//! │  OpenAI)    │       │ MatchScorer │
//! └─────────────┘       └─────────────┘
//! ```

pub mod audit;
pub mod backend;
pub mod prompt;
pub mod request;
pub mod response;
pub mod service;

// Re-export main types for convenience
pub use backend::traits::{AgentReply, BackendError, ReplyRequest, ScoutBackend, Usage};
pub use request::ScoutRequest;
pub use response::{AnswerStatus, ScoutAnswer};
pub use service::{ScoutService, ServiceConfig, ServiceError, APOLOGY, GREETING};
