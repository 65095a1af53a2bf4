//! CryptoTasks Marketplace Desk
//!
//! Drives client conversations on top of the roster and Scout:
//!
//! - **Proposal intents**: "send project proposal to @alice" starts a
//!   two-turn dialogue that collects details and delivers a proposal
//! - **Messaging**: direct client/freelancer chat persisted in a hosted
//!   message store
//! - **Fund release**: "Work done release 0.01 eth" runs the payment
//!   script and posts the transaction hash back into the chat
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MarketplaceDesk                          │
//! │                                                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐    │
//! │  │   Proposal   │   │ ScoutService │   │ FundReleaser │    │
//! │  │   sessions   │   │  (agent)     │   │  (script)    │    │
//! │  └──────┬───────┘   └──────────────┘   └──────┬───────┘    │
//! │         │                                      │            │
//! │         └──────────────┬───────────────────────┘            │
//! │                ┌───────▼───────┐                            │
//! │                │ MessageStore  │                            │
//! │                └───────────────┘                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod desk;
pub mod payment;
pub mod proposal;
pub mod store;

// Re-export main types
pub use config::{ConfigError, MarketplaceConfig};
pub use desk::{ChatOutcome, MarketplaceDesk, Role, ScoutTurn, TurnKind};
pub use payment::{FundReleaser, ReleaseError, ReleaseReceipt, ScriptReleaser};
pub use proposal::{try_start_or_advance, Outbound, ProposalIntentParser, ProposalSession, ProposalTurn};
pub use store::{ChatMessage, MemoryStore, MessageStore, StoreError, SupabaseStore};
