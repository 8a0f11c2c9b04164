//! `parkvote init` - create the config file and an empty ledger database.
//!
//! Every command creates these lazily on first use; `init` does it
//! explicitly so operators can inspect and edit the config before the
//! first proposal, and is idempotent.

use std::path::PathBuf;

use parkvote::ledger::LedgerDb;

use super::config::{self, ParkvoteConfig};

pub async fn execute(config_path: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path);

    if config_path.exists() {
        println!("Config already exists: {}", config_path.display());
    } else {
        ParkvoteConfig::create_default(&config_path, &config::default_db_path())?;
        println!("Created config: {}", config_path.display());
    }

    let config = ParkvoteConfig::load(&config_path)?;
    if let Some(parent) = config.ledger.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Opening creates the database and its schema if missing.
    let _db = LedgerDb::open(&config.ledger.db_path).await?;
    println!("Ledger database ready: {}", config.ledger.db_path.display());
    Ok(())
}
