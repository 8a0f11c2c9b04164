//! The proposal/vote store.
//!
//! A single shared mutable structure with no internal concurrency: each
//! operation takes `&mut self` (or `&self` for reads) and is atomic from the
//! caller's point of view. Hosts that serve concurrent callers wrap the
//! ledger in one `Arc<Mutex<_>>` so all operations execute in a total order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::clock::{Clock, SystemClock};
use super::events::LedgerEvent;
use super::types::{Identity, Proposal, ProposalId, ProposalView, VotePolicy, VoteRecord};

/// Broadcast capacity for event subscribers. Events are advisory; a slow
/// subscriber lags rather than blocking the ledger.
const EVENT_CAPACITY: usize = 64;

/// Ledger operation errors. All are propagated synchronously to the caller
/// as rejected operations; none are retried or swallowed internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Creation with a deadline that is not strictly in the future.
    #[error("deadline {deadline} is not in the future (now: {now})")]
    InvalidDeadline { deadline: u64, now: u64 },

    /// Operation on an id that was never allocated.
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    /// Vote after the proposal's deadline passed.
    #[error("voting closed for proposal {0}")]
    VotingClosed(ProposalId),

    /// Repeat vote by the same identity (SelfChecked policy only).
    #[error("{voter} already voted on proposal {proposal}")]
    DuplicateVote { proposal: ProposalId, voter: Identity },
}

/// Full ledger state for persistence and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub policy: VotePolicy,
    pub next_id: ProposalId,
    pub proposals: Vec<Proposal>,
    /// Vote log per proposal, in cast order.
    pub votes: BTreeMap<ProposalId, Vec<VoteRecord>>,
}

/// Proposal/vote ledger.
pub struct ProposalLedger {
    policy: VotePolicy,
    clock: Arc<dyn Clock>,
    proposals: BTreeMap<ProposalId, Proposal>,
    /// Append-only vote log keyed by proposal id, owned solely by the ledger.
    votes: BTreeMap<ProposalId, Vec<VoteRecord>>,
    next_id: ProposalId,
    events: broadcast::Sender<LedgerEvent>,
}

impl ProposalLedger {
    /// Create an empty ledger on the system clock.
    pub fn new(policy: VotePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Create an empty ledger with an explicit clock (tests use
    /// [`super::ManualClock`] to cross deadlines without sleeping).
    pub fn with_clock(policy: VotePolicy, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            policy,
            clock,
            proposals: BTreeMap::new(),
            votes: BTreeMap::new(),
            next_id: 1,
            events,
        }
    }

    pub fn policy(&self) -> VotePolicy {
        self.policy
    }

    /// Subscribe to ledger notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Create a new proposal and return its id.
    ///
    /// Ids are consecutive from 1 and never reused. A rejected creation
    /// (`InvalidDeadline`) allocates nothing.
    pub fn create_proposal(
        &mut self,
        title: &str,
        description: &str,
        size: u64,
        discussion_ref: &str,
        deadline: u64,
        creator: &Identity,
    ) -> Result<ProposalId, LedgerError> {
        let now = self.clock.now();
        if deadline <= now {
            return Err(LedgerError::InvalidDeadline { deadline, now });
        }

        let id = self.next_id;
        self.next_id += 1;

        let proposal = Proposal {
            id,
            title: title.to_string(),
            description: description.to_string(),
            size,
            discussion_ref: discussion_ref.to_string(),
            creator: creator.clone(),
            yes_count: 0,
            no_count: 0,
            deadline,
        };

        tracing::info!(id, title, deadline, creator = %creator, "proposal created");

        // No subscribers is fine; events are advisory.
        let _ = self.events.send(LedgerEvent::ProposalCreated {
            id,
            title: proposal.title.clone(),
            description: proposal.description.clone(),
            size,
            discussion_ref: proposal.discussion_ref.clone(),
            creator: creator.clone(),
            deadline,
        });

        self.proposals.insert(id, proposal);
        Ok(id)
    }

    /// Cast a vote on an open proposal.
    ///
    /// Checks run in order: unknown id, closed window, then (SelfChecked
    /// only) duplicate voter. A rejected vote mutates nothing.
    pub fn vote(
        &mut self,
        id: ProposalId,
        support: bool,
        voter: &Identity,
    ) -> Result<(), LedgerError> {
        let now = self.clock.now();
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(LedgerError::ProposalNotFound(id))?;

        if now > proposal.deadline {
            return Err(LedgerError::VotingClosed(id));
        }

        let log = self.votes.entry(id).or_default();
        if self.policy == VotePolicy::SelfChecked && log.iter().any(|r| &r.voter == voter) {
            return Err(LedgerError::DuplicateVote {
                proposal: id,
                voter: voter.clone(),
            });
        }

        if support {
            proposal.yes_count += 1;
        } else {
            proposal.no_count += 1;
        }
        log.push(VoteRecord {
            voter: voter.clone(),
            support,
        });

        tracing::info!(id, voter = %voter, support, "vote cast");

        let _ = self.events.send(LedgerEvent::VoteCast {
            id,
            voter: voter.clone(),
            support,
        });

        Ok(())
    }

    /// Snapshot of a proposal with its derived `active` flag.
    pub fn get_proposal(&self, id: ProposalId) -> Result<ProposalView, LedgerError> {
        let proposal = self
            .proposals
            .get(&id)
            .ok_or(LedgerError::ProposalNotFound(id))?;
        Ok(ProposalView::new(proposal, self.clock.now()))
    }

    /// Voter identities for a proposal, in cast order. Empty (not an error)
    /// for unknown ids or proposals with no votes.
    pub fn get_voters(&self, id: ProposalId) -> Vec<Identity> {
        self.votes
            .get(&id)
            .map(|log| log.iter().map(|r| r.voter.clone()).collect())
            .unwrap_or_default()
    }

    /// Whether `identity` appears in the recorded voter log for `id`.
    pub fn has_voted(&self, id: ProposalId, identity: &Identity) -> bool {
        self.votes
            .get(&id)
            .map(|log| log.iter().any(|r| &r.voter == identity))
            .unwrap_or(false)
    }

    /// Ids of proposals whose voting window is still open, ascending.
    ///
    /// Deliberately a linear scan over all proposals; callers must not
    /// assume any index behind this.
    pub fn active_proposals(&self) -> Vec<ProposalId> {
        let now = self.clock.now();
        self.proposals
            .values()
            .filter(|p| now <= p.deadline)
            .map(|p| p.id)
            .collect()
    }

    /// Count of proposals ever created, including closed ones.
    pub fn total_proposals(&self) -> u64 {
        self.next_id - 1
    }

    /// Export the full state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            policy: self.policy,
            next_id: self.next_id,
            proposals: self.proposals.values().cloned().collect(),
            votes: self.votes.clone(),
        }
    }

    /// Rebuild a ledger from an exported snapshot.
    pub fn restore(snapshot: LedgerSnapshot, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            policy: snapshot.policy,
            clock,
            proposals: snapshot
                .proposals
                .into_iter()
                .map(|p| (p.id, p))
                .collect(),
            votes: snapshot.votes,
            next_id: snapshot.next_id,
            events,
        }
    }
}
