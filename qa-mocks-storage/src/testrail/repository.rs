use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde_json::Value;

use super::entities::{
    cases, results, run_entries, runs, sections, Case, CaseActiveModel, Cases, Project, ProjectActiveModel,
    Projects, ResultActiveModel, Results, Run, RunActiveModel, RunEntries, RunEntry, RunEntryActiveModel, Runs,
    Section, SectionActiveModel, Sections, TestResult,
};
use super::lookups::STATUS_UNTESTED;
use crate::connection::DatabaseConnection;
use crate::error::{StorageError, StorageResult};
use crate::gate::ResetGate;

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub announcement: Option<String>,
    pub show_announcement: bool,
}

#[derive(Debug, Clone)]
pub struct NewSection {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
}

/// Fields for a new case; lookup ids are validated by the caller
#[derive(Debug, Clone)]
pub struct NewCase {
    pub title: String,
    pub template_id: i32,
    pub type_id: i32,
    pub priority_id: i32,
    pub steps: Option<Value>,
    pub expected_result: Option<String>,
    pub preconditions: Option<String>,
    pub estimate: Option<String>,
    pub refs: Option<String>,
}

/// Partial case update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct CaseChanges {
    pub section_id: Option<i32>,
    pub title: Option<String>,
    pub template_id: Option<i32>,
    pub type_id: Option<i32>,
    pub priority_id: Option<i32>,
    pub steps: Option<Option<Value>>,
    pub expected_result: Option<Option<String>>,
    pub preconditions: Option<Option<String>>,
    pub estimate: Option<Option<String>>,
    pub refs: Option<Option<String>>,
}

impl CaseChanges {
    pub fn is_empty(&self) -> bool {
        self.section_id.is_none()
            && self.title.is_none()
            && self.template_id.is_none()
            && self.type_id.is_none()
            && self.priority_id.is_none()
            && self.steps.is_none()
            && self.expected_result.is_none()
            && self.preconditions.is_none()
            && self.estimate.is_none()
            && self.refs.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CaseFilter {
    pub section_id: Option<i32>,
    pub type_id: Option<i32>,
    pub priority_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewResult {
    pub status_id: i32,
    pub comment: Option<String>,
    pub elapsed: Option<String>,
    pub defects: Option<String>,
    pub created_by: String,
}

#[derive(Debug, Clone)]
pub struct NewRun {
    pub name: String,
    pub description: Option<String>,
    pub include_all: bool,
    /// Ignored when `include_all` is set
    pub case_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<i32>,
    pub missing: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStats {
    pub section_id: i32,
    pub section_name: String,
    pub case_count: u64,
    /// Latest-result status id to number of cases
    pub status_counts: BTreeMap<i32, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStats {
    pub project_id: i32,
    pub total_cases: u64,
    pub sections: Vec<SectionStats>,
    pub overall_status_counts: BTreeMap<i32, u64>,
}

/// A run together with its entries
pub type RunWithEntries = (Run, Vec<RunEntry>);

/// Repository for TestRail projects, sections, cases, results and runs
#[derive(Clone)]
pub struct TestRailRepository {
    db: DatabaseConnection,
    gate: ResetGate,
}

impl TestRailRepository {
    pub fn new(db: DatabaseConnection, gate: ResetGate) -> Self {
        Self { db, gate }
    }

    pub async fn list_projects(&self) -> StorageResult<Vec<Project>> {
        let _guard = self.gate.shared().await;
        Ok(Projects::find()
            .order_by(super::entities::projects::Column::Id, Order::Asc)
            .all(self.db.get_connection())
            .await?)
    }

    pub async fn get_project(&self, id: i32) -> StorageResult<Project> {
        let _guard = self.gate.shared().await;
        require_project(self.db.get_connection(), id).await
    }

    pub async fn add_project(&self, new: NewProject) -> StorageResult<Project> {
        let _guard = self.gate.shared().await;
        let project = ProjectActiveModel {
            name: Set(new.name),
            announcement: Set(new.announcement),
            show_announcement: Set(new.show_announcement),
            is_completed: Set(false),
            completed_on: Set(None),
            created_on: Set(now()),
            ..Default::default()
        }
        .insert(self.db.get_connection())
        .await?;
        Ok(project)
    }

    pub async fn list_sections(&self, project_id: i32) -> StorageResult<Vec<Section>> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();
        require_project(conn, project_id).await?;
        sections_of(conn, project_id).await
    }

    pub async fn get_section(&self, id: i32) -> StorageResult<Section> {
        let _guard = self.gate.shared().await;
        require_section(self.db.get_connection(), id).await
    }

    /// Add a section; a parent must belong to the same project
    pub async fn add_section(&self, project_id: i32, new: NewSection) -> StorageResult<Section> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        require_project(&txn, project_id).await?;

        let depth = match new.parent_id {
            Some(parent_id) => {
                let parent = Sections::find_by_id(parent_id)
                    .one(&txn)
                    .await?
                    .filter(|parent| parent.project_id == project_id)
                    .ok_or_else(|| {
                        StorageError::constraint(
                            "parent_id",
                            format!("Section {} does not exist in project {}", parent_id, project_id),
                        )
                    })?;
                parent.depth + 1
            }
            None => 0,
        };

        let display_order = sections_of(&txn, project_id)
            .await?
            .iter()
            .map(|s| s.display_order)
            .max()
            .unwrap_or(0)
            + 1;

        let section = SectionActiveModel {
            project_id: Set(project_id),
            name: Set(new.name),
            description: Set(new.description),
            parent_id: Set(new.parent_id),
            depth: Set(depth),
            display_order: Set(display_order),
            created_on: Set(now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(section)
    }

    /// Cases of a project in ascending id order
    pub async fn list_cases(&self, project_id: i32, filter: CaseFilter) -> StorageResult<Vec<Case>> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();
        require_project(conn, project_id).await?;

        let section_ids: Vec<i32> = sections_of(conn, project_id).await?.iter().map(|s| s.id).collect();

        let mut query = Cases::find().filter(cases::Column::SectionId.is_in(section_ids));
        if let Some(section_id) = filter.section_id {
            query = query.filter(cases::Column::SectionId.eq(section_id));
        }
        if let Some(type_id) = filter.type_id {
            query = query.filter(cases::Column::TypeId.eq(type_id));
        }
        if let Some(priority_id) = filter.priority_id {
            query = query.filter(cases::Column::PriorityId.eq(priority_id));
        }

        Ok(query.order_by(cases::Column::Id, Order::Asc).all(conn).await?)
    }

    pub async fn get_case(&self, id: i32) -> StorageResult<Case> {
        let _guard = self.gate.shared().await;
        require_case(self.db.get_connection(), id).await
    }

    /// Project that owns a case, through its section
    pub async fn case_project_id(&self, case: &Case) -> StorageResult<i32> {
        let _guard = self.gate.shared().await;
        Ok(require_section(self.db.get_connection(), case.section_id).await?.project_id)
    }

    pub async fn add_case(&self, section_id: i32, new: NewCase) -> StorageResult<Case> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        require_section(&txn, section_id).await?;
        let now = now();

        let case = CaseActiveModel {
            section_id: Set(section_id),
            title: Set(new.title),
            template_id: Set(new.template_id),
            type_id: Set(new.type_id),
            priority_id: Set(new.priority_id),
            steps: Set(new.steps),
            expected_result: Set(new.expected_result),
            preconditions: Set(new.preconditions),
            estimate: Set(new.estimate),
            refs: Set(new.refs),
            created_on: Set(now),
            updated_on: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(case)
    }

    /// Merge `changes` into the case and bump `updated_on`
    pub async fn update_case(&self, id: i32, changes: CaseChanges) -> StorageResult<Case> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        let case = require_case(&txn, id).await?;
        if let Some(section_id) = changes.section_id {
            require_section(&txn, section_id).await?;
        }

        let mut active: CaseActiveModel = case.into();
        if let Some(section_id) = changes.section_id {
            active.section_id = Set(section_id);
        }
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(template_id) = changes.template_id {
            active.template_id = Set(template_id);
        }
        if let Some(type_id) = changes.type_id {
            active.type_id = Set(type_id);
        }
        if let Some(priority_id) = changes.priority_id {
            active.priority_id = Set(priority_id);
        }
        if let Some(steps) = changes.steps {
            active.steps = Set(steps);
        }
        if let Some(expected_result) = changes.expected_result {
            active.expected_result = Set(expected_result);
        }
        if let Some(preconditions) = changes.preconditions {
            active.preconditions = Set(preconditions);
        }
        if let Some(estimate) = changes.estimate {
            active.estimate = Set(estimate);
        }
        if let Some(refs) = changes.refs {
            active.refs = Set(refs);
        }
        active.updated_on = Set(now());

        let case = active.update(&txn).await?;
        txn.commit().await?;
        Ok(case)
    }

    /// Hard delete, removing the case's results and run entries with it
    pub async fn delete_case(&self, id: i32) -> StorageResult<()> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        require_case(&txn, id).await?;
        delete_cases(&txn, &[id]).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Delete every existing case in `ids`; unknown ids are reported, not fatal
    ///
    /// With a project, cases owned by other projects count as unknown. The
    /// scope check and the delete share one transaction.
    pub async fn bulk_delete_cases(&self, project_id: Option<i32>, ids: &[i32]) -> StorageResult<BulkDeleteOutcome> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        let mut query = Cases::find()
            .select_only()
            .column(cases::Column::Id)
            .filter(cases::Column::Id.is_in(ids.to_vec()));
        if let Some(project_id) = project_id {
            require_project(&txn, project_id).await?;
            let section_ids: Vec<i32> = sections_of(&txn, project_id).await?.iter().map(|s| s.id).collect();
            query = query.filter(cases::Column::SectionId.is_in(section_ids));
        }
        let existing: Vec<i32> = query.into_tuple().all(&txn).await?;

        let mut outcome = BulkDeleteOutcome::default();
        for id in ids {
            if existing.contains(id) {
                if !outcome.deleted.contains(id) {
                    outcome.deleted.push(*id);
                }
            } else if !outcome.missing.contains(id) {
                outcome.missing.push(*id);
            }
        }

        delete_cases(&txn, &outcome.deleted).await?;
        txn.commit().await?;
        Ok(outcome)
    }

    /// Results of a case, newest first
    pub async fn list_results(&self, case_id: i32, limit: u64) -> StorageResult<Vec<TestResult>> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();
        require_case(conn, case_id).await?;

        Ok(Results::find()
            .filter(results::Column::CaseId.eq(case_id))
            .order_by(results::Column::CreatedOn, Order::Desc)
            .order_by(results::Column::Id, Order::Desc)
            .limit(limit)
            .all(conn)
            .await?)
    }

    /// Append a result; the case itself is not modified
    pub async fn add_result(&self, case_id: i32, new: NewResult) -> StorageResult<TestResult> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        require_case(&txn, case_id).await?;
        let result = insert_result(&txn, case_id, None, new).await?;

        txn.commit().await?;
        Ok(result)
    }

    pub async fn list_runs(&self, project_id: i32) -> StorageResult<Vec<RunWithEntries>> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();
        require_project(conn, project_id).await?;

        let runs = Runs::find()
            .filter(runs::Column::ProjectId.eq(project_id))
            .order_by(runs::Column::Id, Order::Asc)
            .all(conn)
            .await?;

        let mut entries = entries_by_run(conn, runs.iter().map(|r| r.id).collect()).await?;
        Ok(runs
            .into_iter()
            .map(|run| {
                let run_entries = entries.remove(&run.id).unwrap_or_default();
                (run, run_entries)
            })
            .collect())
    }

    pub async fn get_run(&self, id: i32) -> StorageResult<RunWithEntries> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();
        let run = require_run(conn, id).await?;
        let entries = entries_by_run(conn, vec![id]).await?.remove(&id).unwrap_or_default();
        Ok((run, entries))
    }

    /// Create a run and snapshot its cases as untested entries
    pub async fn add_run(&self, project_id: i32, new: NewRun) -> StorageResult<RunWithEntries> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        require_project(&txn, project_id).await?;
        let section_ids: Vec<i32> = sections_of(&txn, project_id).await?.iter().map(|s| s.id).collect();
        let project_cases = Cases::find()
            .filter(cases::Column::SectionId.is_in(section_ids))
            .order_by(cases::Column::Id, Order::Asc)
            .all(&txn)
            .await?;

        let selected: Vec<&Case> = if new.include_all {
            project_cases.iter().collect()
        } else {
            let mut selected = Vec::with_capacity(new.case_ids.len());
            for case_id in &new.case_ids {
                let case = project_cases.iter().find(|c| c.id == *case_id).ok_or_else(|| {
                    StorageError::constraint(
                        "case_ids",
                        format!("Case {} does not belong to project {}", case_id, project_id),
                    )
                })?;
                if !selected.iter().any(|c: &&Case| c.id == case.id) {
                    selected.push(case);
                }
            }
            selected
        };

        let run = RunActiveModel {
            project_id: Set(project_id),
            name: Set(new.name),
            description: Set(new.description),
            include_all: Set(new.include_all),
            is_completed: Set(false),
            completed_on: Set(None),
            created_on: Set(now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut entries = Vec::with_capacity(selected.len());
        for case in selected {
            let entry = RunEntryActiveModel {
                run_id: Set(run.id),
                case_id: Set(case.id),
                title: Set(case.title.clone()),
                status_id: Set(STATUS_UNTESTED),
                comment: Set(None),
                elapsed: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            entries.push(entry);
        }

        txn.commit().await?;
        Ok((run, entries))
    }

    /// Mark a run completed; closing twice is rejected
    pub async fn close_run(&self, id: i32) -> StorageResult<RunWithEntries> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        let run = require_run(&txn, id).await?;
        if run.is_completed {
            return Err(StorageError::constraint("run_id", format!("Run {} is already completed", id)));
        }

        let mut active: RunActiveModel = run.into();
        active.is_completed = Set(true);
        active.completed_on = Set(Some(now()));
        let run = active.update(&txn).await?;

        let entries = entries_by_run(&txn, vec![id]).await?.remove(&id).unwrap_or_default();
        txn.commit().await?;
        Ok((run, entries))
    }

    /// Entries ("tests") of a run in ascending id order
    pub async fn run_entries(&self, run_id: i32) -> StorageResult<Vec<RunEntry>> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();
        require_run(conn, run_id).await?;
        Ok(entries_by_run(conn, vec![run_id]).await?.remove(&run_id).unwrap_or_default())
    }

    /// Record a result against a case inside an open run
    ///
    /// The run entry takes the new status, comment and elapsed time, and the
    /// result is appended to the case's history with `test_id` set to the entry.
    pub async fn add_result_for_case(
        &self,
        run_id: i32,
        case_id: i32,
        new: NewResult,
    ) -> StorageResult<TestResult> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        let run = require_run(&txn, run_id).await?;
        if run.is_completed {
            return Err(StorageError::constraint(
                "run_id",
                format!("Run {} is completed and no longer accepts results", run_id),
            ));
        }

        let entry = RunEntries::find()
            .filter(run_entries::Column::RunId.eq(run_id))
            .filter(run_entries::Column::CaseId.eq(case_id))
            .one(&txn)
            .await?
            .ok_or_else(|| StorageError::not_found("test", format!("for case {} in run {}", case_id, run_id)))?;
        let entry_id = entry.id;

        let mut active: RunEntryActiveModel = entry.into();
        active.status_id = Set(new.status_id);
        active.comment = Set(new.comment.clone());
        active.elapsed = Set(new.elapsed.clone());
        active.update(&txn).await?;

        let result = insert_result(&txn, case_id, Some(entry_id), new).await?;

        txn.commit().await?;
        Ok(result)
    }

    /// Case counts per section plus latest-result status counts
    pub async fn stats(&self, project_id: i32) -> StorageResult<ProjectStats> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();
        require_project(conn, project_id).await?;

        let sections = sections_of(conn, project_id).await?;
        let section_ids: Vec<i32> = sections.iter().map(|s| s.id).collect();
        let project_cases = Cases::find()
            .filter(cases::Column::SectionId.is_in(section_ids))
            .all(conn)
            .await?;

        let case_ids: Vec<i32> = project_cases.iter().map(|c| c.id).collect();
        let history = Results::find()
            .filter(results::Column::CaseId.is_in(case_ids))
            .order_by(results::Column::CreatedOn, Order::Asc)
            .order_by(results::Column::Id, Order::Asc)
            .all(conn)
            .await?;

        // Ascending order, so the last write per case wins
        let mut latest: HashMap<i32, i32> = HashMap::new();
        for result in history {
            latest.insert(result.case_id, result.status_id);
        }

        let mut overall = BTreeMap::new();
        let mut section_stats = Vec::with_capacity(sections.len());
        for section in sections {
            let mut status_counts = BTreeMap::new();
            let mut case_count = 0;
            for case in project_cases.iter().filter(|c| c.section_id == section.id) {
                let status = latest.get(&case.id).copied().unwrap_or(STATUS_UNTESTED);
                *status_counts.entry(status).or_insert(0) += 1;
                *overall.entry(status).or_insert(0) += 1;
                case_count += 1;
            }
            section_stats.push(SectionStats {
                section_id: section.id,
                section_name: section.name,
                case_count,
                status_counts,
            });
        }

        Ok(ProjectStats {
            project_id,
            total_cases: project_cases.len() as u64,
            sections: section_stats,
            overall_status_counts: overall,
        })
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

async fn require_project<C: ConnectionTrait>(conn: &C, id: i32) -> StorageResult<Project> {
    Projects::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("project", id))
}

async fn require_section<C: ConnectionTrait>(conn: &C, id: i32) -> StorageResult<Section> {
    Sections::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("section", id))
}

async fn require_case<C: ConnectionTrait>(conn: &C, id: i32) -> StorageResult<Case> {
    Cases::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("case", id))
}

async fn require_run<C: ConnectionTrait>(conn: &C, id: i32) -> StorageResult<Run> {
    Runs::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("run", id))
}

async fn sections_of<C: ConnectionTrait>(conn: &C, project_id: i32) -> StorageResult<Vec<Section>> {
    Ok(Sections::find()
        .filter(sections::Column::ProjectId.eq(project_id))
        .order_by(sections::Column::DisplayOrder, Order::Asc)
        .order_by(sections::Column::Id, Order::Asc)
        .all(conn)
        .await?)
}

async fn entries_by_run<C: ConnectionTrait>(
    conn: &C,
    run_ids: Vec<i32>,
) -> StorageResult<HashMap<i32, Vec<RunEntry>>> {
    let entries = RunEntries::find()
        .filter(run_entries::Column::RunId.is_in(run_ids))
        .order_by(run_entries::Column::Id, Order::Asc)
        .all(conn)
        .await?;

    let mut grouped: HashMap<i32, Vec<RunEntry>> = HashMap::new();
    for entry in entries {
        grouped.entry(entry.run_id).or_default().push(entry);
    }
    Ok(grouped)
}

async fn delete_cases<C: ConnectionTrait>(conn: &C, ids: &[i32]) -> StorageResult<()> {
    if ids.is_empty() {
        return Ok(());
    }

    Results::delete_many()
        .filter(results::Column::CaseId.is_in(ids.to_vec()))
        .exec(conn)
        .await?;
    RunEntries::delete_many()
        .filter(run_entries::Column::CaseId.is_in(ids.to_vec()))
        .exec(conn)
        .await?;
    Cases::delete_many()
        .filter(cases::Column::Id.is_in(ids.to_vec()))
        .exec(conn)
        .await?;
    Ok(())
}

async fn insert_result<C: ConnectionTrait>(
    conn: &C,
    case_id: i32,
    test_id: Option<i32>,
    new: NewResult,
) -> StorageResult<TestResult> {
    Ok(ResultActiveModel {
        case_id: Set(case_id),
        test_id: Set(test_id),
        status_id: Set(new.status_id),
        comment: Set(new.comment),
        elapsed: Set(new.elapsed),
        defects: Set(new.defects),
        created_on: Set(now()),
        created_by: Set(new.created_by),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}
