//! Backends for the Scout text-generation collaborator.
//!
//! - Scout endpoint (`POST /scout` on the agent server)
//! - OpenAI-compatible chat completions (Groq, vLLM, Ollama, OpenAI)
//! - Mock backend for testing

pub mod endpoint;
pub mod mock;
pub mod openai;
pub mod traits;

pub use endpoint::EndpointBackend;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use traits::{AgentReply, BackendError, ReplyRequest, ScoutBackend, Usage};
