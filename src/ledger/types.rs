//! Core ledger types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential proposal identifier, allocated from 1.
pub type ProposalId = u64;

/// Opaque caller identity (e.g. a wallet address or chat user id).
///
/// The ledger never verifies identities; under the `Delegated` policy the
/// upstream caller is trusted to have authenticated the voter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(pub String);

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Identity(s.to_string())
    }
}

/// Voting integrity policy.
///
/// The two policies must not be merged: they reflect two deployment modes
/// with different trust boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VotePolicy {
    /// Any caller may vote on behalf of any named identity. No duplicate
    /// check; authentication is enforced upstream (e.g. by the chat router).
    #[default]
    Delegated,
    /// The voter is the calling identity and a repeat vote on the same
    /// proposal is rejected with `DuplicateVote`.
    SelfChecked,
}

/// A park-change proposal open for a bounded voting window.
///
/// Records are never deleted; a closed proposal stays readable forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    /// Caller-supplied magnitude (e.g. affected area in square meters).
    pub size: u64,
    /// Opaque external reference, e.g. a discussion-thread id.
    pub discussion_ref: String,
    pub creator: Identity,
    pub yes_count: u64,
    pub no_count: u64,
    /// Unix timestamp (seconds). Voting is open while now <= deadline.
    pub deadline: u64,
}

/// One accepted vote, in cast order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: Identity,
    pub support: bool,
}

/// Read snapshot of a proposal plus the derived `active` flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalView {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub size: u64,
    pub discussion_ref: String,
    pub creator: Identity,
    pub yes_count: u64,
    pub no_count: u64,
    pub deadline: u64,
    /// now <= deadline at the time of the read.
    pub active: bool,
}

impl ProposalView {
    pub(crate) fn new(proposal: &Proposal, now: u64) -> Self {
        Self {
            id: proposal.id,
            title: proposal.title.clone(),
            description: proposal.description.clone(),
            size: proposal.size,
            discussion_ref: proposal.discussion_ref.clone(),
            creator: proposal.creator.clone(),
            yes_count: proposal.yes_count,
            no_count: proposal.no_count,
            deadline: proposal.deadline,
            active: now <= proposal.deadline,
        }
    }
}
