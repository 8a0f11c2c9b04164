//! SQLite persistence for the ledger (ledger.db).
//!
//! The database is the durable copy of the ledger; the in-memory
//! [`ProposalLedger`] is rebuilt from it on startup. Vote order is
//! preserved through the `seq` rowid.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use super::clock::Clock;
use super::store::{LedgerSnapshot, ProposalLedger};
use super::types::{Identity, Proposal, ProposalId, ProposalView, VotePolicy, VoteRecord};

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS proposals (
    id             INTEGER PRIMARY KEY,
    title          TEXT    NOT NULL,
    description    TEXT    NOT NULL,
    size           INTEGER NOT NULL,
    discussion_ref TEXT    NOT NULL,
    creator        TEXT    NOT NULL,
    yes_count      INTEGER NOT NULL,
    no_count       INTEGER NOT NULL,
    deadline       INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS votes (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    proposal_id INTEGER NOT NULL,
    voter       TEXT    NOT NULL,
    support     INTEGER NOT NULL
);
"#;

/// Handle to the SQLite ledger store.
#[derive(Clone)]
pub struct LedgerDb {
    pool: SqlitePool,
}

impl LedgerDb {
    /// Open (creating if missing) the database at `path`.
    pub async fn open(path: &Path) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// In-memory database for tests.
    pub async fn open_in_memory() -> Result<Self, DbError> {
        // One connection so the in-memory database outlives individual queries.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), DbError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Persist a freshly created proposal.
    pub async fn save_proposal(&self, view: &ProposalView) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO proposals \
             (id, title, description, size, discussion_ref, creator, yes_count, no_count, deadline) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(view.id as i64)
        .bind(&view.title)
        .bind(&view.description)
        .bind(view.size as i64)
        .bind(&view.discussion_ref)
        .bind(&view.creator.0)
        .bind(view.yes_count as i64)
        .bind(view.no_count as i64)
        .bind(view.deadline as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persist an accepted vote: appends to the log and bumps the counter.
    pub async fn save_vote(
        &self,
        id: ProposalId,
        voter: &Identity,
        support: bool,
    ) -> Result<(), DbError> {
        sqlx::query("INSERT INTO votes (proposal_id, voter, support) VALUES (?, ?, ?)")
            .bind(id as i64)
            .bind(&voter.0)
            .bind(support as i64)
            .execute(&self.pool)
            .await?;

        let column = if support { "yes_count" } else { "no_count" };
        sqlx::query(&format!(
            "UPDATE proposals SET {column} = {column} + 1 WHERE id = ?"
        ))
        .bind(id as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Rebuild the in-memory ledger from the database.
    pub async fn load(
        &self,
        policy: VotePolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<ProposalLedger, DbError> {
        let rows = sqlx::query("SELECT * FROM proposals ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let mut proposals = Vec::with_capacity(rows.len());
        let mut next_id: ProposalId = 1;
        for row in rows {
            let id = row.get::<i64, _>("id") as u64;
            next_id = next_id.max(id + 1);
            proposals.push(Proposal {
                id,
                title: row.get("title"),
                description: row.get("description"),
                size: row.get::<i64, _>("size") as u64,
                discussion_ref: row.get("discussion_ref"),
                creator: Identity(row.get("creator")),
                yes_count: row.get::<i64, _>("yes_count") as u64,
                no_count: row.get::<i64, _>("no_count") as u64,
                deadline: row.get::<i64, _>("deadline") as u64,
            });
        }

        let rows = sqlx::query("SELECT proposal_id, voter, support FROM votes ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;
        let mut votes: BTreeMap<ProposalId, Vec<VoteRecord>> = BTreeMap::new();
        for row in rows {
            let id = row.get::<i64, _>("proposal_id") as u64;
            votes.entry(id).or_default().push(VoteRecord {
                voter: Identity(row.get("voter")),
                support: row.get::<i64, _>("support") != 0,
            });
        }

        let snapshot = LedgerSnapshot {
            policy,
            next_id,
            proposals,
            votes,
        };
        Ok(ProposalLedger::restore(snapshot, clock))
    }

    /// Replace the database contents with an imported snapshot.
    pub async fn import_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM votes").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM proposals")
            .execute(&mut *tx)
            .await?;

        for p in &snapshot.proposals {
            sqlx::query(
                "INSERT INTO proposals \
                 (id, title, description, size, discussion_ref, creator, yes_count, no_count, deadline) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(p.id as i64)
            .bind(&p.title)
            .bind(&p.description)
            .bind(p.size as i64)
            .bind(&p.discussion_ref)
            .bind(&p.creator.0)
            .bind(p.yes_count as i64)
            .bind(p.no_count as i64)
            .bind(p.deadline as i64)
            .execute(&mut *tx)
            .await?;
        }

        for (id, log) in &snapshot.votes {
            for record in log {
                sqlx::query("INSERT INTO votes (proposal_id, voter, support) VALUES (?, ?, ?)")
                    .bind(*id as i64)
                    .bind(&record.voter.0)
                    .bind(record.support as i64)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
