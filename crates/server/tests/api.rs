//! HTTP-level tests for the ticket, board, and sprint endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use db::{
    DBService,
    models::ticket::{CreateTicket, Ticket, TicketStatus, UpdateTicket},
    test_utils::{create_test_pool, seed_ticket},
};
use serde_json::{Value, json};
use server::{AppState, routes};
use services::services::{
    config::{WorkflowSettings, WorkflowUrls},
    store::{StoreError, TicketStore},
};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

async fn test_app() -> (Router, SqlitePool, TempDir) {
    let (pool, dir) = create_test_pool().await;
    let state = AppState::new(
        DBService::from_pool(pool.clone()),
        WorkflowSettings::Fixed(WorkflowUrls::default()),
    );
    (routes::router(state), pool, dir)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Store that fails every call.
struct BrokenStore;

#[async_trait]
impl TicketStore for BrokenStore {
    async fn list_all(&self) -> Result<Vec<Ticket>, StoreError> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }
    async fn list_by_status(&self, _: TicketStatus) -> Result<Vec<Ticket>, StoreError> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }
    async fn get(&self, _: Uuid) -> Result<Option<Ticket>, StoreError> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }
    async fn insert(&self, _: &CreateTicket) -> Result<Ticket, StoreError> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }
    async fn update(&self, _: Uuid, _: &UpdateTicket) -> Result<Ticket, StoreError> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }
    async fn update_status(&self, _: Uuid, _: TicketStatus) -> Result<Ticket, StoreError> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }
    async fn delete(&self, _: Uuid) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }
}

#[tokio::test]
async fn test_health_reports_database_ready() {
    let (app, _pool, _dir) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database_ready"], true);
}

#[tokio::test]
async fn test_create_ticket_returns_row_and_refetched_list() {
    let (app, pool, _dir) = test_app().await;
    seed_ticket(&pool, "older", TicketStatus::Done, Some(1)).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tickets",
        Some(json!({
            "title": "Password reset",
            "description": "",
            "type": "feature",
            "priority": "high",
            "story_points": 5
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["ticket"]["title"], "Password reset");
    assert_eq!(data["ticket"]["status"], "backlog");
    assert_eq!(data["ticket"]["description"], Value::Null);
    assert_eq!(data["tickets"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_ticket_missing_title_is_400() {
    let (app, _pool, _dir) = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tickets",
        Some(json!({ "title": " ", "type": "bug", "priority": "low" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");
}

#[tokio::test]
async fn test_list_tickets_filters_by_status() {
    let (app, pool, _dir) = test_app().await;
    seed_ticket(&pool, "a", TicketStatus::Backlog, None).await;
    seed_ticket(&pool, "b", TicketStatus::InProgress, None).await;

    let (status, body) = send(&app, Method::GET, "/api/tickets?status=backlog", None).await;
    assert_eq!(status, StatusCode::OK);
    let tickets = body["data"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["title"], "a");

    let (status, _) = send(&app, Method::GET, "/api/tickets?status=archived", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_board_groups_lanes_in_order() {
    let (app, pool, _dir) = test_app().await;
    seed_ticket(&pool, "todo", TicketStatus::Backlog, None).await;
    seed_ticket(&pool, "shipped", TicketStatus::Done, None).await;

    let (status, body) = send(&app, Method::GET, "/api/board", None).await;

    assert_eq!(status, StatusCode::OK);
    let lanes = body["data"]["lanes"].as_array().unwrap();
    let ids: Vec<&str> = lanes.iter().map(|l| l["status"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["backlog", "in_sprint", "in_progress", "done"]);
    assert_eq!(lanes[0]["tickets"][0]["title"], "todo");
    assert_eq!(lanes[3]["tickets"][0]["title"], "shipped");
    assert_eq!(lanes[1]["tickets"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_patch_status_persists_drag() {
    let (app, pool, _dir) = test_app().await;
    let ticket = seed_ticket(&pool, "drag", TicketStatus::Backlog, None).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/tickets/{}/status", ticket.id),
        Some(json!({ "status": "in_progress" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");
    let stored = Ticket::find_by_id(&pool, ticket.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TicketStatus::InProgress);
}

#[tokio::test]
async fn test_patch_status_rejects_unknown_lane_and_missing_ticket() {
    let (app, pool, _dir) = test_app().await;
    let ticket = seed_ticket(&pool, "drag", TicketStatus::Backlog, None).await;

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/tickets/{}/status", ticket.id),
        Some(json!({ "status": "archived" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/tickets/{}/status", Uuid::new_v4()),
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_and_update_ticket() {
    let (app, pool, _dir) = test_app().await;
    let ticket = seed_ticket(&pool, "draft", TicketStatus::InSprint, Some(2)).await;

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/tickets/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/tickets/{}", ticket.id),
        Some(json!({
            "title": "final",
            "type": "bug",
            "priority": "critical",
            "story_points": 8
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ticket"]["priority"], "critical");
    assert_eq!(body["data"]["ticket"]["status"], "in_sprint");

    let (status, body) = send(&app, Method::GET, &format!("/api/tickets/{}", ticket.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "final");
}

#[tokio::test]
async fn test_delete_rejects_invalid_ids() {
    let (app, _pool, _dir) = test_app().await;

    for uri in ["/api/tickets/undefined", "/api/tickets/", "/api/tickets/not-a-uuid"] {
        let (status, body) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(body["error"], "Invalid ticket ID");
    }
}

#[tokio::test]
async fn test_delete_valid_id_succeeds() {
    let (app, pool, _dir) = test_app().await;
    let ticket = seed_ticket(&pool, "doomed", TicketStatus::Backlog, None).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/api/tickets/{}", ticket.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    assert!(Ticket::find_by_id(&pool, ticket.id).await.unwrap().is_none());

    // No row left to delete; still a success
    let (status, body) = send(&app, Method::DELETE, &format!("/api/tickets/{}", ticket.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn test_delete_store_failure_is_500() {
    let (pool, _dir) = create_test_pool().await;
    let state = AppState::new(DBService::from_pool(pool), WorkflowSettings::default())
        .with_store(Arc::new(BrokenStore));
    let app = routes::router(state);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/tickets/{}", Uuid::new_v4()), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("database is locked"));
}

#[tokio::test]
async fn test_start_sprint_flips_selected_tickets() {
    let (app, pool, _dir) = test_app().await;
    let a = seed_ticket(&pool, "a", TicketStatus::Backlog, Some(3)).await;
    let b = seed_ticket(&pool, "b", TicketStatus::Backlog, Some(5)).await;
    let untouched = seed_ticket(&pool, "c", TicketStatus::Backlog, Some(2)).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sprints",
        Some(json!({ "capacity": 10, "ticket_ids": [a.id, b.id] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sprint"]["total_story_points"], 8);
    assert_eq!(body["data"]["tickets"].as_array().unwrap().len(), 2);

    let sprint_id = body["data"]["sprint"]["id"].as_str().unwrap().to_string();
    let (status, body) = send(&app, Method::GET, &format!("/api/sprints/{sprint_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tickets"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, Method::GET, "/api/sprints", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let other = Ticket::find_by_id(&pool, untouched.id).await.unwrap().unwrap();
    assert_eq!(other.status, TicketStatus::Backlog);
}

#[tokio::test]
async fn test_start_sprint_validation() {
    let (app, pool, _dir) = test_app().await;
    let a = seed_ticket(&pool, "a", TicketStatus::Backlog, Some(3)).await;

    let cases = [
        (json!({ "capacity": 0, "ticket_ids": [a.id] }), StatusCode::BAD_REQUEST),
        (json!({ "capacity": 5, "ticket_ids": [] }), StatusCode::BAD_REQUEST),
        (json!({ "capacity": 5, "ticket_ids": [a.id, a.id] }), StatusCode::BAD_REQUEST),
        (
            json!({ "capacity": 5, "ticket_ids": [a.id, Uuid::new_v4()] }),
            StatusCode::NOT_FOUND,
        ),
    ];

    for (payload, expected) in cases {
        let (status, _) = send(&app, Method::POST, "/api/sprints", Some(payload.clone())).await;
        assert_eq!(status, expected, "payload: {payload}");
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sprints")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_get_unknown_sprint_is_404() {
    let (app, _pool, _dir) = test_app().await;

    let (status, _) = send(&app, Method::GET, &format!("/api/sprints/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_board_move_persists_and_returns_lanes() {
    let (app, pool, _dir) = test_app().await;
    let ticket = seed_ticket(&pool, "drag", TicketStatus::Backlog, None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/board/move",
        Some(json!({ "ticket_id": ticket.id, "lane": "done" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let lanes = body["data"]["lanes"].as_array().unwrap();
    assert_eq!(lanes[0]["tickets"].as_array().unwrap().len(), 0);
    assert_eq!(lanes[3]["tickets"][0]["id"], ticket.id.to_string());

    let stored = Ticket::find_by_id(&pool, ticket.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TicketStatus::Done);
}

#[tokio::test]
async fn test_board_move_rejects_unknown_lane_and_ticket() {
    let (app, pool, _dir) = test_app().await;
    let ticket = seed_ticket(&pool, "drag", TicketStatus::Backlog, None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/board/move",
        Some(json!({ "ticket_id": ticket.id, "lane": "archived" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown lane: 'archived'");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/board/move",
        Some(json!({ "ticket_id": Uuid::new_v4(), "lane": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let stored = Ticket::find_by_id(&pool, ticket.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TicketStatus::Backlog);
}

#[tokio::test]
async fn test_priorities_carry_badge_labels() {
    let (app, _pool, _dir) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/tickets/priorities", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([
            { "value": "critical", "label": "P0" },
            { "value": "high", "label": "P1" },
            { "value": "medium", "label": "P2" },
            { "value": "low", "label": "P3" },
        ])
    );
}

#[tokio::test]
async fn test_malformed_bodies_use_error_envelope() {
    let (app, _pool, _dir) = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sprints/propose",
        Some(json!({ "capacity": 2.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tickets")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::GET, "/api/sprints/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_start_sprint_point_overflow_is_400() {
    let (app, pool, _dir) = test_app().await;
    let huge = seed_ticket(&pool, "huge", TicketStatus::Backlog, Some(i64::MAX)).await;
    let one = seed_ticket(&pool, "one", TicketStatus::Backlog, Some(1)).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sprints",
        Some(json!({ "capacity": 5, "ticket_ids": [huge.id, one.id] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Total story points of the selected tickets is too large"
    );
}
