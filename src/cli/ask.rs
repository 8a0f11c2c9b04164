//! `parkvote ask` - route a free-text question.
//!
//! Uses the offline keyword classifier and the GeoJSON feature file from
//! the config. Votes cast through chat are persisted like direct votes.

use std::sync::Arc;
use tokio::sync::Mutex;

use parkvote::chat::offline::{FileGeoService, UnconfiguredImpactService};
use parkvote::chat::{ChatReply, ChatRouter, KeywordClassifier};
use parkvote::ledger::Identity;

pub async fn execute(
    text: String,
    caller: String,
    config: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config)?;
    let (db, ledger) = super::open_ledger(&config).await?;

    let geo = match &config.services.features_path {
        Some(path) => FileGeoService::load(path)?,
        None => FileGeoService::empty(),
    };

    let ledger = Arc::new(Mutex::new(ledger));
    let router = ChatRouter::new(
        KeywordClassifier::new(),
        geo,
        UnconfiguredImpactService,
        ledger,
    );

    let caller = Identity(caller);
    let reply = router.handle(&text, &caller).await?;

    // The router mutates only the in-memory ledger; mirror accepted votes
    // into the database.
    if let ChatReply::VoteAccepted { proposal, support } = &reply {
        db.save_vote(*proposal, &caller, *support).await?;
    }

    println!("{}", reply.render());
    Ok(())
}
