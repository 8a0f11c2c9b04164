//! `parkvote propose` - create a proposal.

use parkvote::ledger::{Clock, Identity, SystemClock};

/// Create a proposal whose voting window closes `--window` from now.
pub async fn execute(
    title: String,
    description: String,
    size: u64,
    discussion: String,
    window: String,
    creator: String,
    config: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let window = humantime::parse_duration(&window)
        .map_err(|e| format!("Invalid --window duration '{}': {}", window, e))?;

    let config = super::load_config(config)?;
    let (db, mut ledger) = super::open_ledger(&config).await?;

    let deadline = SystemClock.now() + window.as_secs();
    let id = ledger.create_proposal(
        &title,
        &description,
        size,
        &discussion,
        deadline,
        &Identity(creator),
    )?;
    db.save_proposal(&ledger.get_proposal(id)?).await?;

    println!("Created proposal {} (voting closes at unix {})", id, deadline);
    Ok(())
}
