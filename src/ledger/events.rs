//! Ledger notifications.
//!
//! Events are advisory and published on a `tokio::sync::broadcast` channel
//! for external subscribers. The ledger state is authoritative; a lagging
//! subscriber loses events, it does not stall voting.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;

use super::types::{Identity, ProposalId};

/// Notification emitted by the ledger after a mutation is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    ProposalCreated {
        id: ProposalId,
        title: String,
        description: String,
        size: u64,
        discussion_ref: String,
        creator: Identity,
        deadline: u64,
    },
    VoteCast {
        id: ProposalId,
        voter: Identity,
        support: bool,
    },
}

/// Adapt a broadcast receiver into a `Stream` of events.
pub fn into_stream(
    rx: broadcast::Receiver<LedgerEvent>,
) -> impl Stream<Item = Result<LedgerEvent, BroadcastStreamRecvError>> {
    BroadcastStream::new(rx)
}
