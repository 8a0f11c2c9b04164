//! Ledger snapshot export/import (CBOR).

use std::path::Path;

use parkvote::ledger::LedgerSnapshot;
use parkvote::serialization::{from_cbor, to_cbor};

pub async fn export(
    output: String,
    config: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config)?;
    let (_db, ledger) = super::open_ledger(&config).await?;

    let snapshot = ledger.snapshot();
    let bytes = to_cbor(&snapshot)?;
    std::fs::write(Path::new(&output), &bytes)?;

    println!(
        "Exported {} proposal(s) ({} bytes) to {}",
        snapshot.proposals.len(),
        bytes.len(),
        output
    );
    Ok(())
}

pub async fn import(
    input: String,
    config: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config)?;
    let (db, _ledger) = super::open_ledger(&config).await?;

    let bytes = std::fs::read(Path::new(&input))?;
    let snapshot: LedgerSnapshot = from_cbor(&bytes)?;
    db.import_snapshot(&snapshot).await?;

    println!(
        "Imported {} proposal(s) from {}",
        snapshot.proposals.len(),
        input
    );
    Ok(())
}
