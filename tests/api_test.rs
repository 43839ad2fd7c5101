//! API integration tests
//!
//! Full router through `axum_test::TestServer` against a temp-file database.

use anyhow::Result;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use sea_orm::Database;
use serde_json::{json, Value};
use taskboard::database::setup_database;
use taskboard::server::app::create_app;
use tempfile::TempDir;

/// Test server plus the directory holding its database
async fn setup_test_server() -> Result<(TestServer, TempDir)> {
    let dir = TempDir::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    let app = create_app(db, None).await?;
    let server = TestServer::new(app)?;

    Ok((server, dir))
}

async fn post_json(server: &TestServer, path: &str, body: Value) -> Value {
    let response = server.post(path).json(&body).await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "POST {}", path);
    response.json()
}

/// Project → phase → bucket, returning the bucket id
async fn seed_bucket(server: &TestServer) -> i64 {
    let project = post_json(server, "/projects", json!({ "name": "Alpha" })).await;
    let phase = post_json(
        server,
        "/phases",
        json!({ "project_id": project["id"], "label": "Plan" }),
    )
    .await;
    let bucket = post_json(
        server,
        "/task-buckets",
        json!({ "phase_id": phase["id"], "name": "Backlog" }),
    )
    .await;
    bucket["id"].as_i64().unwrap()
}

fn task_body(bucket_id: i64, subject: &str) -> Value {
    json!({
        "task_bucket_id": bucket_id,
        "subject": subject,
        "description": "Switch traffic",
        "start_date": "2025-01-01",
        "end_date": "2025-01-10",
        "status_by_day": { "2025-01-05": "Done" }
    })
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "taskboard");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
    assert!(body["version"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_openapi_document() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let doc: Value = response.json();
    assert!(doc["paths"]["/daily-summary"].is_object());
    Ok(())
}

#[tokio::test]
async fn test_teams_crud_api() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let team = post_json(
        &server,
        "/teams",
        json!({ "name": "Ops", "email_to": "ops@example.com" }),
    )
    .await;
    let id = team["id"].as_i64().unwrap();
    assert_eq!(team["email_cc"], Value::Null);

    let listed: Vec<Value> = server.get("/teams").await.json();
    assert_eq!(listed.len(), 1);

    let response = server
        .put(&format!("/teams/{}", id))
        .json(&json!({ "name": "Platform" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Platform");
    assert_eq!(updated["email_to"], Value::Null);

    let response = server.delete(&format!("/teams/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Team deleted successfully");

    let response = server.get(&format!("/teams/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn test_duplicate_name_is_conflict() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    post_json(&server, "/subsystems", json!({ "name": "Billing" })).await;

    let response = server
        .post("/subsystems")
        .json(&json!({ "name": "Billing" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "CONFLICT");

    let listed: Vec<Value> = server.get("/subsystems").await.json();
    assert_eq!(listed.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_bucket_with_missing_phase_is_bad_request() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server
        .post("/task-buckets")
        .json(&json!({ "phase_id": 999, "name": "Backlog" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_REFERENCE");

    let listed: Vec<Value> = server.get("/task-buckets").await.json();
    assert!(listed.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_phase_ordering_and_by_project() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let project = post_json(&server, "/projects", json!({ "name": "Alpha" })).await;

    for (label, expected) in [("Plan", 1), ("Build", 2), ("Ship", 3)] {
        let phase = post_json(
            &server,
            "/phases",
            json!({ "project_id": project["id"], "label": label }),
        )
        .await;
        assert_eq!(phase["order"], expected);
    }

    let response = server
        .get(&format!("/phases/by-project/{}", project["id"]))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let phases: Vec<Value> = response.json();
    let labels: Vec<&str> = phases.iter().map(|p| p["label"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["Plan", "Build", "Ship"]);

    let response = server.get("/phases/by-project/777").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_renumber_endpoint() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let bucket_id = seed_bucket(&server).await;

    let first = post_json(&server, "/tasks", task_body(bucket_id, "One")).await;
    post_json(&server, "/tasks", task_body(bucket_id, "Two")).await;
    server.delete(&format!("/tasks/{}", first["id"])).await;

    let response = server
        .post(&format!("/tasks/by-bucket/{}/renumber", bucket_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let tasks: Vec<Value> = response.json();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["order"], 1);

    let response = server.post("/tasks/by-bucket/999/renumber").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_bucket_with_tasks_cannot_be_deleted() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let bucket_id = seed_bucket(&server).await;
    let task = post_json(&server, "/tasks", task_body(bucket_id, "Blocker")).await;

    let response = server.delete(&format!("/task-buckets/{}", bucket_id)).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "CONFLICT");

    server.delete(&format!("/tasks/{}", task["id"])).await;
    let response = server.delete(&format!("/task-buckets/{}", bucket_id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "TaskBucket deleted successfully");
    Ok(())
}

#[tokio::test]
async fn test_project_delete_cascades() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let bucket_id = seed_bucket(&server).await;
    let task = post_json(&server, "/tasks", task_body(bucket_id, "Gone")).await;
    let projects: Vec<Value> = server.get("/projects").await.json();

    let response = server
        .delete(&format!("/projects/{}", projects[0]["id"]))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.get(&format!("/tasks/{}", task["id"])).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let phases: Vec<Value> = server.get("/phases").await.json();
    assert!(phases.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_task_validation_errors() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let bucket_id = seed_bucket(&server).await;

    let mut reversed = task_body(bucket_id, "Reversed");
    reversed["end_date"] = json!("2024-12-01");
    let response = server.post("/tasks").json(&reversed).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let mut bad_key = task_body(bucket_id, "Bad key");
    bad_key["status_by_day"] = json!({ "someday": "Done" });
    let response = server.post("/tasks").json(&bad_key).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_ARGUMENT");

    let mut missing_team = task_body(bucket_id, "No team");
    missing_team["team_id"] = json!(55);
    let response = server.post("/tasks").json(&missing_team).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_REFERENCE");
    Ok(())
}

#[tokio::test]
async fn test_daily_summary_endpoint() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let bucket_id = seed_bucket(&server).await;
    let task = post_json(&server, "/tasks", task_body(bucket_id, "Cutover")).await;

    let summary: Value = server
        .get("/daily-summary")
        .add_query_param("date_query", "2025-01-05")
        .await
        .json();
    assert_eq!(summary["date"], "2025-01-05");
    assert_eq!(summary["completed_tasks"][0]["id"], task["id"]);
    assert_eq!(summary["pending_tasks"], json!([]));

    let summary: Value = server
        .get("/daily-summary")
        .add_query_param("date_query", "2025-01-06")
        .await
        .json();
    assert_eq!(summary["completed_tasks"], json!([]));
    assert_eq!(summary["pending_tasks"][0]["id"], task["id"]);

    let summary: Value = server
        .get("/daily-summary")
        .add_query_param("date_query", "2024-12-31")
        .await
        .json();
    assert_eq!(summary["completed_tasks"], json!([]));
    assert_eq!(summary["pending_tasks"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_daily_summary_requires_valid_date() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server.get("/daily-summary").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .get("/daily-summary")
        .add_query_param("date_query", "05/01/2025")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_ARGUMENT");
    Ok(())
}

#[tokio::test]
async fn test_unpadded_dates_are_rejected() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let bucket_id = seed_bucket(&server).await;

    let mut body = task_body(bucket_id, "Cutover");
    body["status_by_day"] = json!({ "2025-1-5": "Done" });
    let response = server.post("/tasks").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["code"], "INVALID_ARGUMENT");

    let tasks: Vec<Value> = server.get("/tasks").await.json();
    assert!(tasks.is_empty());

    let response = server
        .get("/daily-summary")
        .add_query_param("date_query", "2025-1-5")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_error_responses_carry_cors_headers() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server
        .get("/teams/4040")
        .add_header(
            header::ORIGIN,
            HeaderValue::from_static("http://localhost:5173"),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        HeaderValue::from_static("*")
    );
    Ok(())
}

#[tokio::test]
async fn test_snapshot_capture_endpoint() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let bucket_id = seed_bucket(&server).await;
    let task = post_json(&server, "/tasks", task_body(bucket_id, "Cutover")).await;

    let response = server
        .post("/task-snapshots/capture")
        .add_query_param("date_query", "2025-01-05")
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let captured: Vec<Value> = response.json();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0]["status"], "Done");

    let listed: Vec<Value> = server
        .get("/task-snapshots")
        .add_query_param("task_id", task["id"].as_i64().unwrap())
        .await
        .json();
    assert_eq!(listed.len(), 1);

    let response = server
        .delete(&format!("/task-snapshots/{}", captured[0]["id"]))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_import_excel_endpoint() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    let rows = [
        ["project", "phase", "bucket", "subject", "description", "start_date"],
        ["Alpha", "Plan", "Backlog", "Scope", "Write scope", "2025-01-01"],
        ["Alpha", "Plan", "Backlog", "Review", "Review scope", "2025-01-02"],
    ];
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet.write_string(r as u32, c as u16, *value)?;
        }
    }
    let bytes = workbook.save_to_buffer()?;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes).file_name("tasks.xlsx"),
    );
    let response = server.post("/import-excel").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let summary: Value = response.json();
    assert_eq!(summary["tasks_created"], 2);
    assert_eq!(summary["projects_created"], 1);

    let tasks: Vec<Value> = server.get("/tasks").await.json();
    assert_eq!(tasks.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_import_without_file_is_bad_request() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let form = MultipartForm::new().add_text("note", "no file here");
    let response = server.post("/import-excel").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    Ok(())
}
