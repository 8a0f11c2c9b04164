//! Proposal/Vote Ledger
//!
//! Owns proposal records and vote records, enforces creation and voting
//! invariants, and answers read queries. All mutations go through
//! [`ProposalLedger`]; callers that share a ledger wrap it in a single
//! `Arc<Mutex<_>>` so every create/vote is an indivisible read-modify-write.

pub mod clock;
pub mod db;
pub mod events;
pub mod store;
pub mod types;

#[cfg(test)]
mod proptests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use db::{DbError, LedgerDb};
pub use events::LedgerEvent;
pub use store::{LedgerError, LedgerSnapshot, ProposalLedger};
pub use types::{Identity, Proposal, ProposalId, ProposalView, VotePolicy, VoteRecord};
