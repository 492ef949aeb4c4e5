use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, IntoActiveModel};
use serde::Deserialize;

use super::entities::{cases, projects, results, run_entries, runs, sections};
use crate::error::{StorageError, StorageResult};
use crate::seed::Fixture;

const SEED_DOCUMENT: &str = include_str!("seed.json");

/// Seed rows are stored exactly as the entity models, ids included
#[derive(Debug, Deserialize)]
struct SeedDocument {
    projects: Vec<projects::Model>,
    sections: Vec<sections::Model>,
    cases: Vec<cases::Model>,
    runs: Vec<runs::Model>,
    run_entries: Vec<run_entries::Model>,
    results: Vec<results::Model>,
}

/// Demo project 1 with five sections, seven cases, one run and its results
#[derive(Debug, Clone, Copy, Default)]
pub struct TestRailFixture;

#[async_trait]
impl Fixture for TestRailFixture {
    fn name(&self) -> &'static str {
        "testrail"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["results", "run_entries", "runs", "cases", "sections", "projects"]
    }

    fn sentinel_table(&self) -> &'static str {
        "projects"
    }

    async fn load(&self, txn: &DatabaseTransaction) -> StorageResult<()> {
        let seed: SeedDocument = serde_json::from_str(SEED_DOCUMENT)
            .map_err(|e| StorageError::Seed(format!("invalid testrail seed document: {}", e)))?;

        // Parents first so foreign keys resolve
        insert_all::<projects::Entity, _>(txn, seed.projects).await?;
        insert_all::<sections::Entity, _>(txn, seed.sections).await?;
        insert_all::<cases::Entity, _>(txn, seed.cases).await?;
        insert_all::<runs::Entity, _>(txn, seed.runs).await?;
        insert_all::<run_entries::Entity, _>(txn, seed.run_entries).await?;
        insert_all::<results::Entity, _>(txn, seed.results).await?;

        Ok(())
    }
}

async fn insert_all<E, M>(txn: &DatabaseTransaction, models: Vec<M>) -> StorageResult<()>
where
    E: EntityTrait,
    M: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
{
    if models.is_empty() {
        return Ok(());
    }

    // `reset_all` marks every column as set, so explicit seed ids are written
    let rows = models.into_iter().map(|m| m.into_active_model().reset_all());
    E::insert_many(rows).exec(txn).await?;
    Ok(())
}
