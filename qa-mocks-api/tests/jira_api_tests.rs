//! Jira mock over HTTP: issue lifecycle, search, attachments and auth

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use qa_mocks_api::{create_jira_app, AppConfig, JiraContext};
use qa_mocks_config::JiraConfig;
use qa_mocks_storage::jira::{JiraFixture, Migrator};
use qa_mocks_storage::ServiceStore;
use serde_json::{json, Value};

const TOKEN: &str = "test-token";

async fn create_test_server() -> TestServer {
    let store = ServiceStore::in_memory::<Migrator>(JiraFixture).await.unwrap();
    let context = JiraContext::new(&store, JiraConfig::default());
    TestServer::new(create_jira_app(context, &AppConfig::default())).unwrap()
}

fn bug(summary: &str) -> Value {
    json!({
        "fields": {
            "project": {"key": "QA"},
            "summary": summary,
            "issuetype": {"name": "Bug"},
            "priority": {"name": "Highest"},
            "labels": ["regression"],
            "description": "First paragraph\n\nSecond paragraph"
        }
    })
}

#[tokio::test]
async fn test_health_is_public() {
    let server = create_test_server().await;

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "jira-mock");
}

#[tokio::test]
async fn test_missing_token_is_rejected_without_mutation() {
    let server = create_test_server().await;

    let response = server.post("/rest/api/3/issue").json(&bug("Sneaky")).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["errorMessages"][0], "Missing Authorization header");

    let search: Value = server
        .get("/rest/api/3/search")
        .authorization_bearer(TOKEN)
        .await
        .json();
    assert_eq!(search["total"], 3);
}

#[tokio::test]
async fn test_create_then_get_issue() {
    let server = create_test_server().await;

    let response = server
        .post("/rest/api/3/issue")
        .authorization_bearer(TOKEN)
        .json(&bug("Checkout button missing"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["key"], "QA-4");
    assert_eq!(created["id"], "4");
    assert_eq!(created["self"], "http://localhost:4001/rest/api/3/issue/4");

    let issue: Value = server
        .get("/rest/api/3/issue/QA-4")
        .authorization_bearer(TOKEN)
        .await
        .json();
    let fields = &issue["fields"];
    assert_eq!(fields["summary"], "Checkout button missing");
    assert_eq!(fields["issuetype"]["name"], "Bug");
    assert_eq!(fields["priority"]["name"], "Highest");
    assert_eq!(fields["status"]["name"], "To Do");
    assert_eq!(fields["status"]["statusCategory"]["key"], "new");
    assert_eq!(fields["labels"], json!(["regression"]));
    assert_eq!(fields["description"]["type"], "doc");
    assert_eq!(fields["description"]["content"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_validation_names_every_missing_field() {
    let server = create_test_server().await;

    let response = server
        .post("/rest/api/3/issue")
        .authorization_bearer(TOKEN)
        .json(&json!({"fields": {"project": {"key": "QA"}}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["errors"]["summary"].is_string());
    assert!(body["errors"]["issuetype"].is_string());

    let response = server
        .post("/rest/api/3/issue")
        .authorization_bearer(TOKEN)
        .json(&json!({"fields": {"summary": "x", "issuetype": {"name": "Incident"}}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/rest/api/3/issue")
        .authorization_bearer(TOKEN)
        .text("{not json")
        .content_type("application/json")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_merges_fields() {
    let server = create_test_server().await;

    let response = server
        .put("/rest/api/3/issue/QA-1")
        .authorization_bearer(TOKEN)
        .json(&json!({"fields": {"summary": "Login button dead on Safari 17"}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let issue: Value = server
        .get("/rest/api/3/issue/QA-1")
        .authorization_bearer(TOKEN)
        .await
        .json();
    assert_eq!(issue["fields"]["summary"], "Login button dead on Safari 17");
    assert_eq!(issue["fields"]["priority"]["name"], "High");
    assert_eq!(issue["fields"]["labels"], json!(["login", "safari"]));
    assert_ne!(issue["fields"]["updated"], issue["fields"]["created"]);
}

#[tokio::test]
async fn test_deleted_keys_are_never_reused() {
    let server = create_test_server().await;

    let response = server
        .delete("/rest/api/3/issue/QA-3")
        .authorization_bearer(TOKEN)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server
        .get("/rest/api/3/issue/QA-3")
        .authorization_bearer(TOKEN)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let created: Value = server
        .post("/rest/api/3/issue")
        .authorization_bearer(TOKEN)
        .json(&bug("After delete"))
        .await
        .json();
    assert_eq!(created["key"], "QA-4");
}

#[tokio::test]
async fn test_search_pagination_and_jql() {
    let server = create_test_server().await;

    let page: Value = server
        .get("/rest/api/3/search")
        .authorization_bearer(TOKEN)
        .add_query_param("startAt", 2)
        .add_query_param("maxResults", 1)
        .await
        .json();
    assert_eq!(page["total"], 3);
    assert_eq!(page["startAt"], 2);
    assert_eq!(page["maxResults"], 1);
    assert_eq!(page["issues"].as_array().unwrap().len(), 1);
    assert_eq!(page["issues"][0]["key"], "QA-3");

    let beyond: Value = server
        .get("/rest/api/3/search")
        .authorization_bearer(TOKEN)
        .add_query_param("startAt", 50)
        .await
        .json();
    assert_eq!(beyond["total"], 3);
    assert!(beyond["issues"].as_array().unwrap().is_empty());

    let filtered: Value = server
        .get("/rest/api/3/search")
        .authorization_bearer(TOKEN)
        .add_query_param("jql", "project = QA AND status != Done ORDER BY priority DESC")
        .await
        .json();
    let keys: Vec<&str> = filtered["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["QA-1", "QA-2"]);

    let posted: Value = server
        .post("/rest/api/3/search")
        .authorization_bearer(TOKEN)
        .json(&json!({"jql": "labels = safari", "maxResults": 10}))
        .await
        .json();
    assert_eq!(posted["total"], 1);

    let response = server
        .get("/rest/api/3/search")
        .authorization_bearer(TOKEN)
        .add_query_param("jql", "summary ~ \"open")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .get("/rest/api/3/search")
        .authorization_bearer(TOKEN)
        .add_query_param("startAt", -1)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transitions() {
    let server = create_test_server().await;

    let available: Value = server
        .get("/rest/api/3/issue/QA-1/transitions")
        .authorization_bearer(TOKEN)
        .await
        .json();
    let ids: Vec<&str> = available["transitions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["21", "31"]);

    let response = server
        .post("/rest/api/3/issue/QA-1/transitions")
        .authorization_bearer(TOKEN)
        .json(&json!({"transition": {"id": "31"}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let issue: Value = server
        .get("/rest/api/3/issue/QA-1")
        .authorization_bearer(TOKEN)
        .await
        .json();
    assert_eq!(issue["fields"]["status"]["name"], "Done");

    let response = server
        .post("/rest/api/3/issue/QA-1/transitions")
        .authorization_bearer(TOKEN)
        .json(&json!({"transition": {"id": "31"}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_attachments() {
    let server = create_test_server().await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"stack trace".to_vec())
            .file_name("trace.log")
            .mime_type("text/plain"),
    );
    let response = server
        .post("/rest/api/3/issue/QA-2/attachments")
        .authorization_bearer(TOKEN)
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let attachments: Value = response.json();
    assert_eq!(attachments[0]["filename"], "trace.log");
    assert_eq!(attachments[0]["size"], 11);
    assert_eq!(attachments[0]["mimeType"], "text/plain");
    let id = attachments[0]["id"].as_str().unwrap().to_string();

    let issue: Value = server
        .get("/rest/api/3/issue/QA-2")
        .authorization_bearer(TOKEN)
        .await
        .json();
    assert_eq!(issue["fields"]["attachment"].as_array().unwrap().len(), 1);

    let response = server
        .delete(&format!("/rest/api/3/attachment/{}", id))
        .authorization_bearer(TOKEN)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server
        .get(&format!("/rest/api/3/attachment/{}", id))
        .authorization_bearer(TOKEN)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .post("/rest/api/3/issue/QA-2/attachments")
        .authorization_bearer(TOKEN)
        .multipart(MultipartForm::new().add_text("comment", "no file"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_restores_seed_and_counter() {
    let server = create_test_server().await;

    for summary in ["one", "two"] {
        server
            .post("/rest/api/3/issue")
            .authorization_bearer(TOKEN)
            .json(&bug(summary))
            .await;
    }
    server
        .delete("/rest/api/3/issue/QA-1")
        .authorization_bearer(TOKEN)
        .await;

    let response = server.post("/admin/reset").authorization_bearer(TOKEN).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "reset");

    let search: Value = server
        .get("/rest/api/3/search")
        .authorization_bearer(TOKEN)
        .await
        .json();
    assert_eq!(search["total"], 3);

    let created: Value = server
        .post("/rest/api/3/issue")
        .authorization_bearer(TOKEN)
        .json(&bug("after reset"))
        .await
        .json();
    assert_eq!(created["key"], "QA-4");
}

#[tokio::test]
async fn test_unknown_route_and_openapi() {
    let server = create_test_server().await;

    let response = server.get("/rest/api/2/nothing").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server.get("/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let document: Value = server
        .get("/openapi.json")
        .authorization_bearer(TOKEN)
        .await
        .json();
    assert!(document["paths"]["/rest/api/3/issue/{key}"]["get"].is_object());
    assert!(document["components"]["securitySchemes"]["bearer_auth"].is_object());
}
