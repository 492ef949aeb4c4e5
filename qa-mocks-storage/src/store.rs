use std::sync::Arc;

use qa_mocks_config::DatabaseSettings;
use sea_orm_migration::MigratorTrait;

use crate::connection::DatabaseConnection;
use crate::error::StorageResult;
use crate::gate::ResetGate;
use crate::seed::{Fixture, SeedLifecycle};

/// A service's connection, reset gate and seed lifecycle, ready to serve
pub struct ServiceStore<F> {
    pub db: DatabaseConnection,
    pub gate: ResetGate,
    pub seed: Arc<SeedLifecycle<F>>,
}

impl<F: Fixture> ServiceStore<F> {
    /// Connect, apply `M`'s migrations and seed an empty store
    pub async fn open<M: MigratorTrait>(settings: DatabaseSettings, fixture: F) -> StorageResult<Self> {
        let db = DatabaseConnection::new(settings).await?;
        Self::prepare::<M>(db, fixture).await
    }

    /// Same as [`ServiceStore::open`] over a private in-memory database
    pub async fn in_memory<M: MigratorTrait>(fixture: F) -> StorageResult<Self> {
        let db = DatabaseConnection::in_memory().await?;
        Self::prepare::<M>(db, fixture).await
    }

    async fn prepare<M: MigratorTrait>(db: DatabaseConnection, fixture: F) -> StorageResult<Self> {
        db.migrate::<M>().await?;

        let gate = ResetGate::new();
        let seed = Arc::new(SeedLifecycle::new(db.clone(), gate.clone(), fixture));
        seed.initialize().await?;

        Ok(Self { db, gate, seed })
    }
}
