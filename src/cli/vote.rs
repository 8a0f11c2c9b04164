//! `parkvote vote` - cast a vote.

use super::VoteChoice;
use parkvote::ledger::Identity;

pub async fn execute(
    id: u64,
    choice: VoteChoice,
    voter: String,
    config: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config)?;
    let (db, mut ledger) = super::open_ledger(&config).await?;

    let support = choice == VoteChoice::Yes;
    let voter = Identity(voter);
    ledger.vote(id, support, &voter)?;
    db.save_vote(id, &voter, support).await?;

    let view = ledger.get_proposal(id)?;
    println!(
        "Recorded {} vote by {} on proposal {} (yes {} / no {})",
        if support { "yes" } else { "no" },
        voter,
        id,
        view.yes_count,
        view.no_count
    );
    Ok(())
}
