use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use parkvote::ledger::{LedgerDb, ProposalLedger, SystemClock};

pub mod ask;
pub mod config;
pub mod init;
pub mod propose;
pub mod query;
pub mod snapshot;
pub mod version;
pub mod vote;

use config::ParkvoteConfig;

#[derive(Parser)]
#[command(name = "parkvote")]
#[command(author = "Parkvote Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Civic voting ledger for park redevelopment proposals", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VoteChoice {
    Yes,
    No,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the config file and an empty ledger database
    Init {
        /// Path to config file (default: ~/.local/share/parkvote/config.toml)
        #[arg(long)]
        config: Option<String>,
    },

    /// Create a new proposal
    Propose {
        /// Proposal title
        title: String,

        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,

        /// Affected area in square meters
        #[arg(long, default_value_t = 0)]
        size: u64,

        /// Discussion-thread reference (forum link, ticket id, ...)
        #[arg(long, default_value = "")]
        discussion: String,

        /// Voting window as a duration (e.g. 48h, 7d)
        #[arg(long, default_value = "72h")]
        window: String,

        /// Creator identity recorded on the proposal
        #[arg(long, default_value = "operator")]
        creator: String,

        /// Path to config file (default: ~/.local/share/parkvote/config.toml)
        #[arg(long)]
        config: Option<String>,
    },

    /// Cast a vote on a proposal
    Vote {
        /// Proposal id
        id: u64,

        /// yes or no
        choice: VoteChoice,

        /// Voter identity (under self_checked policy this is the caller)
        #[arg(long)]
        voter: String,

        /// Path to config file
        #[arg(long)]
        config: Option<String>,
    },

    /// Show one proposal
    Show {
        /// Proposal id
        id: u64,

        /// Path to config file
        #[arg(long)]
        config: Option<String>,
    },

    /// List ids of proposals still open for voting
    Active {
        /// Path to config file
        #[arg(long)]
        config: Option<String>,
    },

    /// List voters of a proposal in cast order
    Voters {
        /// Proposal id
        id: u64,

        /// Path to config file
        #[arg(long)]
        config: Option<String>,
    },

    /// Count of proposals ever created
    Total {
        /// Path to config file
        #[arg(long)]
        config: Option<String>,
    },

    /// Route a free-text question (offline keyword classifier)
    Ask {
        /// The question
        text: String,

        /// Identity the question (and any resulting vote) is attributed to
        #[arg(long, default_value = "cli-user")]
        caller: String,

        /// Path to config file
        #[arg(long)]
        config: Option<String>,
    },

    /// Export the ledger as a CBOR snapshot
    Export {
        /// Output file path
        #[arg(long)]
        output: String,

        /// Path to config file
        #[arg(long)]
        config: Option<String>,
    },

    /// Replace the ledger with a CBOR snapshot
    Import {
        /// Input file path
        #[arg(long)]
        input: String,

        /// Path to config file
        #[arg(long)]
        config: Option<String>,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Init { config } => init::execute(config).await,
        Commands::Propose {
            title,
            description,
            size,
            discussion,
            window,
            creator,
            config,
        } => propose::execute(title, description, size, discussion, window, creator, config).await,
        Commands::Vote {
            id,
            choice,
            voter,
            config,
        } => vote::execute(id, choice, voter, config).await,
        Commands::Show { id, config } => query::show(id, config).await,
        Commands::Active { config } => query::active(config).await,
        Commands::Voters { id, config } => query::voters(id, config).await,
        Commands::Total { config } => query::total(config).await,
        Commands::Ask {
            text,
            caller,
            config,
        } => ask::execute(text, caller, config).await,
        Commands::Export { output, config } => snapshot::export(output, config).await,
        Commands::Import { input, config } => snapshot::import(input, config).await,
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}

/// Load (or create) the config and initialize logging.
pub(crate) fn load_config(
    config_path: Option<String>,
) -> Result<ParkvoteConfig, Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path);

    let config = if config_path.exists() {
        ParkvoteConfig::load(&config_path)?
    } else {
        ParkvoteConfig::create_default(&config_path, &config::default_db_path())?;
        eprintln!("Created default config: {}", config_path.display());
        ParkvoteConfig::load(&config_path)?
    };

    init_logging(&config.logging.level);
    Ok(config)
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    // try_init: commands may be invoked from tests that already installed
    // a subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Open the ledger database and rebuild the in-memory ledger from it.
pub(crate) async fn open_ledger(
    config: &ParkvoteConfig,
) -> Result<(LedgerDb, ProposalLedger), Box<dyn std::error::Error>> {
    if let Some(parent) = config.ledger.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = LedgerDb::open(&config.ledger.db_path).await?;
    let ledger = db
        .load(config.ledger.policy, Arc::new(SystemClock))
        .await?;
    Ok((db, ledger))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["parkvote", "init"]);
        assert!(matches!(cli.command, Commands::Init { config: None }));

        let cli = Cli::parse_from(["parkvote", "init", "--config", "/tmp/parkvote.toml"]);
        match cli.command {
            Commands::Init { config } => {
                assert_eq!(config.as_deref(), Some("/tmp/parkvote.toml"));
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_parse_propose() {
        let cli = Cli::parse_from([
            "parkvote",
            "propose",
            "Save the meadow",
            "--size",
            "120",
            "--window",
            "48h",
            "--creator",
            "addr-A",
        ]);

        match cli.command {
            Commands::Propose {
                title,
                description,
                size,
                discussion,
                window,
                creator,
                config,
            } => {
                assert_eq!(title, "Save the meadow");
                assert_eq!(description, "");
                assert_eq!(size, 120);
                assert_eq!(discussion, "");
                assert_eq!(window, "48h");
                assert_eq!(creator, "addr-A");
                assert_eq!(config, None);
            }
            _ => panic!("Expected Propose command"),
        }
    }

    #[test]
    fn test_cli_parse_propose_defaults() {
        let cli = Cli::parse_from(["parkvote", "propose", "Minimal"]);

        match cli.command {
            Commands::Propose {
                window, creator, ..
            } => {
                assert_eq!(window, "72h");
                assert_eq!(creator, "operator");
            }
            _ => panic!("Expected Propose command"),
        }
    }

    #[test]
    fn test_cli_parse_vote() {
        let cli = Cli::parse_from(["parkvote", "vote", "3", "yes", "--voter", "addr-B"]);

        match cli.command {
            Commands::Vote {
                id,
                choice,
                voter,
                config,
            } => {
                assert_eq!(id, 3);
                assert_eq!(choice, VoteChoice::Yes);
                assert_eq!(voter, "addr-B");
                assert_eq!(config, None);
            }
            _ => panic!("Expected Vote command"),
        }
    }

    #[test]
    fn test_cli_parse_queries() {
        let cli = Cli::parse_from(["parkvote", "show", "1"]);
        assert!(matches!(cli.command, Commands::Show { id: 1, .. }));

        let cli = Cli::parse_from(["parkvote", "active"]);
        assert!(matches!(cli.command, Commands::Active { .. }));

        let cli = Cli::parse_from(["parkvote", "voters", "2"]);
        assert!(matches!(cli.command, Commands::Voters { id: 2, .. }));

        let cli = Cli::parse_from(["parkvote", "total"]);
        assert!(matches!(cli.command, Commands::Total { .. }));
    }

    #[test]
    fn test_cli_parse_ask() {
        let cli = Cli::parse_from([
            "parkvote",
            "ask",
            "How much green space is there in Altstadt?",
            "--caller",
            "user-9",
        ]);

        match cli.command {
            Commands::Ask { text, caller, .. } => {
                assert_eq!(text, "How much green space is there in Altstadt?");
                assert_eq!(caller, "user-9");
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_cli_parse_export_import() {
        let cli = Cli::parse_from(["parkvote", "export", "--output", "/tmp/ledger.cbor"]);
        match cli.command {
            Commands::Export { output, .. } => assert_eq!(output, "/tmp/ledger.cbor"),
            _ => panic!("Expected Export command"),
        }

        let cli = Cli::parse_from(["parkvote", "import", "--input", "/tmp/ledger.cbor"]);
        match cli.command {
            Commands::Import { input, .. } => assert_eq!(input, "/tmp/ledger.cbor"),
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::parse_from(["parkvote", "version"]);
        assert!(matches!(cli.command, Commands::Version));
    }
}
