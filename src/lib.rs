//! Parkvote - Civic voting ledger for park redevelopment proposals
//!
//! A proposal/vote ledger with a chat-style query router in front of it.
//!
//! Key principles:
//! - The ledger exclusively owns all proposal and vote state
//! - A proposal is active iff now <= deadline; re-evaluated on every read,
//!   never explicitly closed
//! - External services (intent classifier, geospatial queries, impact
//!   analysis) sit behind traits and are mocked in tests

pub mod chat;
pub mod ledger;
pub mod serialization;
