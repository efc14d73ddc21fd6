//! # Stable-Match
//!
//! A deterministic, proposer-optimal stable matching engine
//! (Gale-Shapley deferred acceptance).
//!
//! ## Design Principles
//!
//! - **Deterministic**: the same input in the same order always produces
//!   the same matching and the same event trace
//! - **Eager Validation**: malformed preference data fails before the
//!   proposal loop starts; no partial results
//! - **Dense Indices**: agents are interned to `u32` indices once; the
//!   hot loop never hashes
//! - **O(1) Rank Lookups**: receiver rankings are compiled into reverse
//!   lookup tables at registry construction
//!
//! ## Architecture
//!
//! ```text
//! [Caller Preferences] --> [PreferenceRegistry (validate + compile)]
//!                                      |
//!                             [MatchingEngine loop]
//!                            /         |         \
//!                    [FreeQueue] [EngagementLedger] [Event Trace]
//!                                      |
//!                         [Matching (receiver -> proposer)]
//! ```

pub mod engine;
pub mod error;
pub mod ledger;
pub mod queue;
pub mod registry;
pub mod types;

// Re-exports for convenience
pub use engine::{compute_stable_matching, MatchingEngine};
pub use error::MatchError;
pub use ledger::EngagementLedger;
pub use queue::FreeQueue;
pub use registry::{PreferenceRegistry, RANK_NONE};
pub use types::{MatchEvent, MatchReport, MatchStats, Matching, Side};
