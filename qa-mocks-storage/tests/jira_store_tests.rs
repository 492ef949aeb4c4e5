//! Jira store: key allocation, seeding and reset

use qa_mocks_config::DatabaseSettings;
use qa_mocks_storage::jira::{IssueChanges, JiraFixture, JiraRepository, Migrator, NewAttachment, NewIssue};
use qa_mocks_storage::ServiceStore;

fn new_issue(summary: &str) -> NewIssue {
    NewIssue {
        project_key: "QA".to_string(),
        summary: summary.to_string(),
        description: None,
        issue_type: "Task".to_string(),
        priority: "Medium".to_string(),
        assignee: None,
        reporter: Some("tester".to_string()),
        labels: vec!["automation".to_string()],
        components: vec![],
    }
}

async fn memory_store() -> (ServiceStore<JiraFixture>, JiraRepository) {
    let store = ServiceStore::in_memory::<Migrator>(JiraFixture).await.unwrap();
    let repo = JiraRepository::new(store.db.clone(), store.gate.clone());
    (store, repo)
}

#[tokio::test]
async fn test_seeded_issues() {
    let (_store, repo) = memory_store().await;

    let issues = repo.list().await.unwrap();
    let keys: Vec<&str> = issues.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["QA-1", "QA-2", "QA-3"]);

    let bug = repo.get("qa-1").await.unwrap();
    assert_eq!(bug.priority, "High");
    assert_eq!(bug.issue_type, "Bug");
    assert_eq!(bug.label_list(), vec!["login", "safari"]);
}

#[tokio::test]
async fn test_deleted_keys_are_never_reused() {
    let (_store, repo) = memory_store().await;

    repo.delete("QA-2").await.unwrap();
    let created = repo.create(new_issue("After delete")).await.unwrap();
    assert_eq!(created.key, "QA-4");

    repo.delete("QA-4").await.unwrap();
    let created = repo.create(new_issue("After second delete")).await.unwrap();
    assert_eq!(created.key, "QA-5");
}

#[tokio::test]
async fn test_new_project_starts_at_one() {
    let (_store, repo) = memory_store().await;

    let mut issue = new_issue("First ops issue");
    issue.project_key = "OPS".to_string();
    assert_eq!(repo.create(issue.clone()).await.unwrap().key, "OPS-1");
    assert_eq!(repo.create(issue).await.unwrap().key, "OPS-2");
    assert_eq!(repo.create(new_issue("qa")).await.unwrap().key, "QA-4");
}

#[tokio::test]
async fn test_reset_is_idempotent_and_restores_counters() {
    let (store, repo) = memory_store().await;
    let before = repo.list().await.unwrap();

    repo.create(new_issue("Temporary")).await.unwrap();
    repo.delete("QA-1").await.unwrap();

    store.seed.reset().await.unwrap();
    let first = repo.list().await.unwrap();
    store.seed.reset().await.unwrap();
    let second = repo.list().await.unwrap();

    assert_eq!(first, before);
    assert_eq!(first, second);
    assert_eq!(repo.create(new_issue("After reset")).await.unwrap().key, "QA-4");
}

#[tokio::test]
async fn test_counters_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("jira.db").display());

    {
        let store = ServiceStore::open::<Migrator>(DatabaseSettings::sqlite(url.clone()), JiraFixture)
            .await
            .unwrap();
        let repo = JiraRepository::new(store.db.clone(), store.gate.clone());
        assert_eq!(repo.create(new_issue("Before restart")).await.unwrap().key, "QA-4");
        store.db.close().await.unwrap();
    }

    let store = ServiceStore::open::<Migrator>(DatabaseSettings::sqlite(url), JiraFixture)
        .await
        .unwrap();
    let repo = JiraRepository::new(store.db.clone(), store.gate.clone());

    assert_eq!(repo.count().await.unwrap(), 4);
    assert_eq!(repo.create(new_issue("After restart")).await.unwrap().key, "QA-5");
}

#[tokio::test]
async fn test_update_merges_fields() {
    let (_store, repo) = memory_store().await;
    let original = repo.get("QA-2").await.unwrap();

    let updated = repo
        .update(
            "QA-2",
            IssueChanges {
                summary: Some("Automate checkout and refund suites".to_string()),
                assignee: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.summary, "Automate checkout and refund suites");
    assert_eq!(updated.assignee, None);
    assert_eq!(updated.priority, original.priority);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at > original.updated_at);
}

#[tokio::test]
async fn test_attachments_cascade_with_issue() {
    let (_store, repo) = memory_store().await;

    let attachments = repo
        .add_attachments(
            "QA-1",
            vec![NewAttachment {
                filename: "screenshot.png".to_string(),
                mime_type: "image/png".to_string(),
                size: 2048,
                author: "tester".to_string(),
            }],
        )
        .await
        .unwrap();
    let attachment_id = attachments[0].id;

    assert_eq!(repo.get_attachment(attachment_id).await.unwrap().filename, "screenshot.png");
    let (issue, listed) = repo.get_with_attachments("QA-1").await.unwrap();
    assert_eq!(issue.key, "QA-1");
    assert_eq!(listed, attachments);
    let (_, grouped) = repo.list_with_attachments().await.unwrap();
    assert_eq!(grouped[&issue.id], attachments);
    assert!(!grouped.contains_key(&repo.get("QA-2").await.unwrap().id));

    repo.delete("QA-1").await.unwrap();
    assert!(repo.get_with_attachments("QA-1").await.unwrap_err().is_not_found());
    assert!(repo.get_attachment(attachment_id).await.unwrap_err().is_not_found());
    assert!(repo.get("QA-1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_updates_on_missing_issue_are_not_found() {
    let (_store, repo) = memory_store().await;

    repo.delete("QA-3").await.unwrap();
    assert!(repo.update("QA-3", IssueChanges::default()).await.unwrap_err().is_not_found());
    assert!(repo.set_status("QA-3", "Done").await.unwrap_err().is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_issue_reads_never_mix_states_across_reset() {
    let (store, repo) = memory_store().await;
    let seeded = repo.get("QA-1").await.unwrap();
    let screenshot = NewAttachment {
        filename: "screenshot.png".to_string(),
        mime_type: "image/png".to_string(),
        size: 2048,
        author: "tester".to_string(),
    };

    for _ in 0..25 {
        repo.add_attachments("QA-1", vec![screenshot.clone()]).await.unwrap();

        let (reset, read, listed) = tokio::join!(
            store.seed.reset(),
            repo.get_with_attachments("QA-1"),
            repo.list_with_attachments()
        );
        reset.unwrap();

        // Attaching bumps `updated_at`, so a fresh seed row has no attachments
        let (issue, attachments) = read.unwrap();
        assert_eq!(attachments.is_empty(), issue.updated_at == seeded.updated_at);

        let (issues, grouped) = listed.unwrap();
        let first = issues.iter().find(|i| i.key == "QA-1").unwrap();
        assert_eq!(grouped.contains_key(&first.id), first.updated_at != seeded.updated_at);
    }
}
