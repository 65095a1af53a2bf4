//! Proposal dialogue: intent recognition and the per-conversation session.
//!
//! ```text
//! Empty ──intent resolves──▶ AwaitingDetails ──next message──▶ Ready ──▶ Sent ──▶ Empty
//!                                                                │
//!                                                  no wallet ────┴──▶ Empty
//! ```

pub mod intent;
pub mod session;

pub use intent::ProposalIntentParser;
pub use session::{
    try_start_or_advance, Outbound, ProposalSession, ProposalStage, ProposalTurn, TurnOutcome,
};
