//! TestRail project, case, result and run store

pub mod entities;
pub mod fixture;
pub mod lookups;
pub mod migration;
pub mod repository;

pub use fixture::TestRailFixture;
pub use migration::Migrator;
pub use repository::{
    BulkDeleteOutcome, CaseChanges, CaseFilter, NewCase, NewProject, NewResult, NewRun, NewSection, ProjectStats,
    RunWithEntries, SectionStats, TestRailRepository,
};
