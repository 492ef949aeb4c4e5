//! TestRail store: hierarchy, results, runs and stats

use qa_mocks_storage::testrail::lookups::{STATUS_FAILED, STATUS_PASSED, STATUS_RETEST, STATUS_UNTESTED};
use qa_mocks_storage::testrail::{
    CaseChanges, CaseFilter, Migrator, NewCase, NewProject, NewResult, NewRun, NewSection, TestRailFixture, TestRailRepository,
};
use qa_mocks_storage::{ServiceStore, StorageError};

async fn memory_store() -> (ServiceStore<TestRailFixture>, TestRailRepository) {
    let store = ServiceStore::in_memory::<Migrator>(TestRailFixture).await.unwrap();
    let repo = TestRailRepository::new(store.db.clone(), store.gate.clone());
    (store, repo)
}

fn new_case(title: &str) -> NewCase {
    NewCase {
        title: title.to_string(),
        template_id: 1,
        type_id: 1,
        priority_id: 2,
        steps: None,
        expected_result: None,
        preconditions: None,
        estimate: None,
        refs: None,
    }
}

fn result(status_id: i32) -> NewResult {
    NewResult {
        status_id,
        comment: Some("automated".to_string()),
        elapsed: Some("30s".to_string()),
        defects: None,
        created_by: "tester".to_string(),
    }
}

#[tokio::test]
async fn test_seeded_hierarchy() {
    let (_store, repo) = memory_store().await;

    let projects = repo.list_projects().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Demo Project");

    assert_eq!(repo.list_sections(1).await.unwrap().len(), 5);
    assert_eq!(repo.list_cases(1, CaseFilter::default()).await.unwrap().len(), 7);

    let filtered = repo
        .list_cases(1, CaseFilter { section_id: Some(1), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 2);

    let regression = repo
        .list_cases(1, CaseFilter { type_id: Some(2), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(regression.len(), 1);
    assert_eq!(regression[0].title, "End-to-end user registration and login flow");
}

#[tokio::test]
async fn test_nested_section_depth() {
    let (_store, repo) = memory_store().await;

    let child = repo
        .add_section(1, NewSection { name: "OAuth".to_string(), description: None, parent_id: Some(1) })
        .await
        .unwrap();
    assert_eq!(child.depth, 1);
    assert_eq!(child.display_order, 6);

    let err = repo
        .add_section(1, NewSection { name: "Orphan".to_string(), description: None, parent_id: Some(99) })
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Constraint { .. }));
}

#[tokio::test]
async fn test_results_do_not_touch_case() {
    let (_store, repo) = memory_store().await;
    let before = repo.get_case(1).await.unwrap();

    repo.add_result(1, result(STATUS_FAILED)).await.unwrap();

    let after = repo.get_case(1).await.unwrap();
    assert_eq!(before.updated_on, after.updated_on);

    let history = repo.list_results(1, 50).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status_id, STATUS_FAILED);
}

#[tokio::test]
async fn test_case_in_unknown_section() {
    let (_store, repo) = memory_store().await;
    let err = repo.add_case(42, new_case("Nowhere")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_case_merges() {
    let (_store, repo) = memory_store().await;
    let original = repo.get_case(4).await.unwrap();

    let updated = repo
        .update_case(4, CaseChanges { priority_id: Some(1), ..Default::default() })
        .await
        .unwrap();

    assert_eq!(updated.priority_id, 1);
    assert_eq!(updated.title, original.title);
    assert!(updated.updated_on >= original.updated_on);
}

#[tokio::test]
async fn test_delete_and_bulk_delete() {
    let (_store, repo) = memory_store().await;

    repo.delete_case(1).await.unwrap();
    assert!(repo.get_case(1).await.unwrap_err().is_not_found());
    assert!(repo.list_results(1, 10).await.unwrap_err().is_not_found());
    assert_eq!(repo.run_entries(1).await.unwrap().len(), 4);

    let outcome = repo.bulk_delete_cases(None, &[2, 3, 99, 2]).await.unwrap();
    assert_eq!(outcome.deleted, vec![2, 3]);
    assert_eq!(outcome.missing, vec![99]);
    assert_eq!(repo.list_cases(1, CaseFilter::default()).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_bulk_delete_scoped_to_project() {
    let (_store, repo) = memory_store().await;

    let other = repo
        .add_project(NewProject {
            name: "Mobile".to_string(),
            announcement: None,
            show_announcement: false,
        })
        .await
        .unwrap();
    let section = repo
        .add_section(other.id, NewSection { name: "Smoke".to_string(), description: None, parent_id: None })
        .await
        .unwrap();
    let foreign = repo.add_case(section.id, new_case("Launches")).await.unwrap();

    let outcome = repo.bulk_delete_cases(Some(1), &[6, foreign.id, 99]).await.unwrap();
    assert_eq!(outcome.deleted, vec![6]);
    assert_eq!(outcome.missing, vec![foreign.id, 99]);
    assert_eq!(repo.get_case(foreign.id).await.unwrap().title, "Launches");

    let err = repo.bulk_delete_cases(Some(42), &[7]).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(repo.get_case(7).await.unwrap().id, 7);
}

#[tokio::test]
async fn test_run_lifecycle() {
    let (_store, repo) = memory_store().await;

    let (run, entries) = repo
        .add_run(
            1,
            NewRun {
                name: "Smoke".to_string(),
                description: None,
                include_all: false,
                case_ids: vec![6, 7],
            },
        )
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.status_id == STATUS_UNTESTED));

    let recorded = repo.add_result_for_case(run.id, 7, result(STATUS_PASSED)).await.unwrap();
    assert_eq!(recorded.test_id, Some(entries[1].id));

    let entries = repo.run_entries(run.id).await.unwrap();
    assert_eq!(entries[1].status_id, STATUS_PASSED);

    let (closed, _) = repo.close_run(run.id).await.unwrap();
    assert!(closed.is_completed);
    assert!(closed.completed_on.is_some());

    let err = repo.add_result_for_case(run.id, 7, result(STATUS_FAILED)).await.unwrap_err();
    assert!(matches!(err, StorageError::Constraint { .. }));
}

#[tokio::test]
async fn test_run_rejects_foreign_cases() {
    let (_store, repo) = memory_store().await;
    let err = repo
        .add_run(
            1,
            NewRun { name: "Bad".to_string(), description: None, include_all: false, case_ids: vec![500] },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Constraint { .. }));

    let (_, entries) = repo
        .add_run(1, NewRun { name: "All".to_string(), description: None, include_all: true, case_ids: vec![] })
        .await
        .unwrap();
    assert_eq!(entries.len(), 7);
}

#[tokio::test]
async fn test_stats_use_latest_result() {
    let (_store, repo) = memory_store().await;

    let stats = repo.stats(1).await.unwrap();
    assert_eq!(stats.total_cases, 7);
    assert_eq!(stats.overall_status_counts.get(&STATUS_PASSED), Some(&3));
    assert_eq!(stats.overall_status_counts.get(&STATUS_FAILED), Some(&1));
    assert_eq!(stats.overall_status_counts.get(&STATUS_RETEST), Some(&1));
    assert_eq!(stats.overall_status_counts.get(&STATUS_UNTESTED), Some(&2));

    repo.add_result(3, result(STATUS_PASSED)).await.unwrap();
    let stats = repo.stats(1).await.unwrap();
    assert_eq!(stats.overall_status_counts.get(&STATUS_PASSED), Some(&4));
    assert_eq!(stats.overall_status_counts.get(&STATUS_FAILED), None);

    let auth = &stats.sections[0];
    assert_eq!(auth.section_name, "Authentication");
    assert_eq!(auth.case_count, 2);
}

#[tokio::test]
async fn test_reset_restores_ids() {
    let (store, repo) = memory_store().await;

    repo.add_case(1, new_case("Extra")).await.unwrap();
    store.seed.reset().await.unwrap();

    assert_eq!(repo.list_cases(1, CaseFilter::default()).await.unwrap().len(), 7);
    let case = repo.add_case(1, new_case("After reset")).await.unwrap();
    assert_eq!(case.id, 8);
}
