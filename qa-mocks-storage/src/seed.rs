//! Seed fixtures and the reset lifecycle
//!
//! Each service describes its deterministic dataset as a [`Fixture`]. The
//! [`SeedLifecycle`] loads it on first boot and reloads it on reset. Reset clears
//! the fixture's tables and their `sqlite_sequence` entries inside one
//! transaction, so ids and keys restart from the seed's values every time.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseTransaction, DbBackend, Statement, TransactionTrait};
use tracing::{debug, info};

use crate::connection::DatabaseConnection;
use crate::error::StorageResult;
use crate::gate::ResetGate;

/// A deterministic dataset owned by one service
#[async_trait]
pub trait Fixture: Send + Sync + 'static {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Every table the fixture owns, children before parents
    fn tables(&self) -> &'static [&'static str];

    /// Table whose emptiness means the store was never seeded
    fn sentinel_table(&self) -> &'static str;

    /// Insert the dataset
    async fn load(&self, txn: &DatabaseTransaction) -> StorageResult<()>;
}

pub struct SeedLifecycle<F> {
    db: DatabaseConnection,
    gate: ResetGate,
    fixture: F,
}

impl<F: Fixture> SeedLifecycle<F> {
    pub fn new(db: DatabaseConnection, gate: ResetGate, fixture: F) -> Self {
        Self { db, gate, fixture }
    }

    /// Seed the store unless it already holds data
    ///
    /// Returns whether the fixture was loaded. Existing data, including counters
    /// advanced by earlier runs, is left untouched.
    pub async fn initialize(&self) -> StorageResult<bool> {
        let _guard = self.gate.exclusive().await;

        let txn = self.db.get_connection().begin().await?;
        if row_count(&txn, self.fixture.sentinel_table()).await? > 0 {
            debug!("{} store already seeded", self.fixture.name());
            return Ok(false);
        }

        self.fixture.load(&txn).await?;
        txn.commit().await?;

        info!("Seeded {} store", self.fixture.name());
        Ok(true)
    }

    /// Discard every row and reload the fixture atomically
    pub async fn reset(&self) -> StorageResult<()> {
        let _guard = self.gate.exclusive().await;

        let txn = self.db.get_connection().begin().await?;
        for table in self.fixture.tables() {
            txn.execute_unprepared(&format!("DELETE FROM \"{}\"", table)).await?;
        }

        if has_sequence_table(&txn).await? {
            let names = self
                .fixture
                .tables()
                .iter()
                .map(|table| format!("'{}'", table))
                .collect::<Vec<_>>()
                .join(", ");
            txn.execute_unprepared(&format!("DELETE FROM sqlite_sequence WHERE name IN ({})", names))
                .await?;
        }

        self.fixture.load(&txn).await?;
        txn.commit().await?;

        info!("Reset {} store to seed data", self.fixture.name());
        Ok(())
    }
}

async fn row_count<C: ConnectionTrait>(conn: &C, table: &str) -> StorageResult<i64> {
    let row = conn
        .query_one(Statement::from_string(
            DbBackend::Sqlite,
            format!("SELECT COUNT(*) AS count FROM \"{}\"", table),
        ))
        .await?;

    Ok(match row {
        Some(row) => row.try_get("", "count")?,
        None => 0,
    })
}

/// `sqlite_sequence` only exists once an AUTOINCREMENT table has been created
async fn has_sequence_table<C: ConnectionTrait>(conn: &C) -> StorageResult<bool> {
    let row = conn
        .query_one(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
        ))
        .await?;

    Ok(match row {
        Some(row) => row.try_get::<i64>("", "count")? > 0,
        None => false,
    })
}
