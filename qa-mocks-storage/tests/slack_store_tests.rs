//! Slack store: timestamps, history windows, threads and uploads

use qa_mocks_storage::slack::ts::{format_ts, parse_ts};
use qa_mocks_storage::slack::{
    HistoryWindow, Migrator, NewFile, NewMessage, SlackFixture, SlackRepository, FILE_UPLOADER,
};
use qa_mocks_storage::ServiceStore;

const QA_REPORTS: &str = "C1234567890";

async fn memory_store() -> (ServiceStore<SlackFixture>, SlackRepository) {
    let store = ServiceStore::in_memory::<Migrator>(SlackFixture).await.unwrap();
    let repo = SlackRepository::new(store.db.clone(), store.gate.clone());
    (store, repo)
}

fn message(text: &str) -> NewMessage {
    NewMessage {
        channel_id: QA_REPORTS.to_string(),
        user: "SlackBot".to_string(),
        text: text.to_string(),
        thread_ts: None,
    }
}

#[tokio::test]
async fn test_channel_lookup_by_id_or_name() {
    let (_store, repo) = memory_store().await;

    assert_eq!(repo.get_channel("qa-reports").await.unwrap().id, QA_REPORTS);
    assert_eq!(repo.get_channel("#qa-reports").await.unwrap().id, QA_REPORTS);
    assert_eq!(repo.get_channel(QA_REPORTS).await.unwrap().name, "qa-reports");
    assert!(repo.find_channel("random").await.unwrap().is_none());
    assert_eq!(repo.list_channels().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_timestamps_strictly_increase() {
    let (_store, repo) = memory_store().await;

    let mut last = 0;
    for i in 0..20 {
        let posted = repo.post_message(message(&format!("burst {}", i))).await.unwrap();
        assert!(posted.ts_micros > last);
        last = posted.ts_micros;
    }
}

#[tokio::test]
async fn test_history_is_newest_first_and_hides_replies() {
    let (_store, repo) = memory_store().await;

    let history = repo.history("qa-reports", HistoryWindow::default()).await.unwrap();
    assert_eq!(history.channel.id, QA_REPORTS);
    let stamps: Vec<String> = history.messages.iter().map(|m| m.ts()).collect();
    assert_eq!(stamps, vec!["1700000100.000200", "1700000000.000100"]);
    assert_eq!(history.threads["1700000100.000200"].reply_count, 1);

    assert!(repo
        .history("random", HistoryWindow::default())
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_history_window_bounds() {
    let (_store, repo) = memory_store().await;
    let bound = parse_ts("1700000100.000200");

    let exclusive = repo
        .history(QA_REPORTS, HistoryWindow { oldest: bound, latest: None, inclusive: false })
        .await
        .unwrap()
        .messages;
    assert!(exclusive.is_empty());

    let inclusive = repo
        .history(QA_REPORTS, HistoryWindow { oldest: bound, latest: None, inclusive: true })
        .await
        .unwrap()
        .messages;
    assert_eq!(inclusive.len(), 1);

    let older = repo
        .history(QA_REPORTS, HistoryWindow { oldest: None, latest: bound, inclusive: false })
        .await
        .unwrap()
        .messages;
    assert_eq!(older.len(), 1);
    assert_eq!(older[0].ts(), "1700000000.000100");
}

#[tokio::test]
async fn test_replies_include_parent() {
    let (_store, repo) = memory_store().await;

    let parent = parse_ts("1700000100.000200").unwrap();
    let mut reply = message("Ticket linked");
    reply.thread_ts = Some(format_ts(parent));
    repo.post_message(reply).await.unwrap();

    let thread = repo.replies(QA_REPORTS, parent).await.unwrap();
    assert_eq!(thread.messages.len(), 3);
    assert_eq!(thread.messages[0].ts_micros, parent);
    assert_eq!(thread.messages[2].text, "Ticket linked");
    assert_eq!(thread.threads["1700000100.000200"].reply_count, 2);

    let missing = repo.replies(QA_REPORTS, 42).await.unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn test_upload_posts_notice() {
    let (_store, repo) = memory_store().await;

    let (file, posted) = repo
        .upload_file(NewFile {
            name: "report.html".to_string(),
            title: "Nightly report".to_string(),
            mimetype: "text/html".to_string(),
            filetype: "html".to_string(),
            size: 512,
            user: "U1111111111".to_string(),
            channels: vec![QA_REPORTS.to_string()],
            initial_comment: Some("Nightly results".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(file.public_id(), format!("F{:010}", file.id));
    assert_eq!(file.channel_list(), vec![QA_REPORTS]);
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].user, FILE_UPLOADER);
    assert_eq!(posted[0].text, "Nightly results\n📎 Uploaded: report.html");
    assert_eq!(posted[0].file_id, Some(file.id));

    assert_eq!(repo.get_file(&file.public_id()).await.unwrap(), file);
    assert!(repo.get_file("F9999999999").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_reset_restores_seed_messages() {
    let (store, repo) = memory_store().await;
    let before = repo.history(QA_REPORTS, HistoryWindow::default()).await.unwrap();

    repo.post_message(message("transient")).await.unwrap();
    store.seed.reset().await.unwrap();

    let after = repo.history(QA_REPORTS, HistoryWindow::default()).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_history_never_mixes_states_across_reset() {
    let (store, repo) = memory_store().await;
    let parent = "1700000100.000200";

    for round in 0..25 {
        repo.post_message(message(&format!("top {}", round))).await.unwrap();
        let mut reply = message(&format!("reply {}", round));
        reply.thread_ts = Some(parent.to_string());
        repo.post_message(reply).await.unwrap();

        let (reset, history) = tokio::join!(store.seed.reset(), repo.history(QA_REPORTS, HistoryWindow::default()));
        reset.unwrap();
        let history = history.unwrap();

        // Either both posts are visible or neither is
        let replies = history.threads[parent].reply_count;
        match history.messages.len() {
            3 => assert_eq!(replies, 2),
            2 => assert_eq!(replies, 1),
            other => panic!("unexpected history length {}", other),
        }
    }
}
