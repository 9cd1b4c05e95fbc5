//! End-to-end tests over the HTTP surface: actix service, dispatch pipeline,
//! and the in-memory persistence adapter wired together as in `main`.

use std::sync::Arc;

use actix_web::{App, test, web};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};
use uuid::Uuid;

use backend::api::actor::{ACTOR_ID_HEADER, ACTOR_KIND_HEADER};
use backend::api::health::{HealthState, live, ready};
use backend::api::incidents;
use backend::domain::user::{User, UserKind};
use backend::outbound::memory::{MemoryStore, MemoryUnitOfWorkFactory};
use backend::server::build_dispatcher;

struct FixedClock;

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid fixture time")
    }
}

struct TestUsers {
    requester: User,
    attendant: User,
}

fn users() -> TestUsers {
    TestUsers {
        requester: User {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@example.test".into(),
            kind: UserKind::Requester,
            avatar: None,
        },
        attendant: User {
            id: Uuid::new_v4(),
            name: "Bruno".into(),
            email: "bruno@example.test".into(),
            kind: UserKind::Attendant,
            avatar: None,
        },
    }
}

macro_rules! service {
    ($users:expr) => {{
        let store = MemoryStore::new();
        store.seed_users([$users.requester.clone(), $users.attendant.clone()]);
        let factory = Arc::new(MemoryUnitOfWorkFactory::new(store));
        let dispatcher =
            build_dispatcher(factory, Arc::new(FixedClock)).expect("pipeline wiring succeeds");
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        test::init_service(
            App::new()
                .app_data(web::Data::new(dispatcher))
                .app_data(health)
                .service(incidents::create)
                .service(incidents::list)
                .service(incidents::get_by_id)
                .service(incidents::update)
                .service(incidents::remove)
                .service(incidents::add_comment)
                .service(ready)
                .service(live),
        )
        .await
    }};
}

fn as_actor(request: test::TestRequest, user: &User) -> test::TestRequest {
    let kind = match user.kind {
        UserKind::Requester => "requester",
        UserKind::Attendant => "attendant",
    };
    request
        .insert_header((ACTOR_ID_HEADER, user.id.to_string()))
        .insert_header((ACTOR_KIND_HEADER, kind))
}

fn create_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "The VPN drops every few minutes",
        "priority": "high",
        "category": "Network",
    })
}

#[actix_rt::test]
async fn create_then_fetch_round_trips() {
    let users = users();
    let app = service!(users);

    let request = as_actor(test::TestRequest::post(), &users.requester)
        .uri("/api/incidents")
        .set_json(create_body("VPN keeps dropping"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 201);
    let created: Value = test::read_body_json(response).await;

    assert_eq!(created["status"], "open");
    assert_eq!(created["createdBy"]["id"], users.requester.id.to_string());
    assert_eq!(created["createdAt"], "2024-03-01T12:00:00Z");

    let id = created["id"].as_str().expect("id present");
    let request = test::TestRequest::get()
        .uri(&format!("/api/incidents/{id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(fetched, created);
}

#[actix_rt::test]
async fn blank_fields_are_rejected_with_field_errors() {
    let users = users();
    let app = service!(users);

    let request = as_actor(test::TestRequest::post(), &users.requester)
        .uri("/api/incidents")
        .set_json(json!({
            "title": "  ",
            "description": "",
            "priority": "low",
            "category": " ",
        }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 400);

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "validation");
    let fields: Vec<&str> = body["fieldErrors"]
        .as_array()
        .expect("field errors present")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, ["title", "description", "category"]);
}

#[actix_rt::test]
async fn missing_identity_headers_yield_403() {
    let users = users();
    let app = service!(users);

    let request = test::TestRequest::post()
        .uri("/api/incidents")
        .set_json(create_body("No identity"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 403);
}

#[actix_rt::test]
async fn requester_cannot_triage_but_attendant_can() {
    let users = users();
    let app = service!(users);

    let request = as_actor(test::TestRequest::post(), &users.requester)
        .uri("/api/incidents")
        .set_json(create_body("Printer jams"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, request).await;
    let id = created["id"].as_str().expect("id present").to_owned();

    let request = as_actor(test::TestRequest::put(), &users.requester)
        .uri(&format!("/api/incidents/{id}"))
        .set_json(json!({"status": "inProgress"}))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 403);

    let request = as_actor(test::TestRequest::put(), &users.attendant)
        .uri(&format!("/api/incidents/{id}"))
        .set_json(json!({
            "status": "inProgress",
            "assignedUserId": users.attendant.id,
        }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(updated["status"], "inProgress");
    assert_eq!(updated["assignedTo"]["id"], users.attendant.id.to_string());
}

#[actix_rt::test]
async fn invalid_transition_reports_a_status_field_error() {
    let users = users();
    let app = service!(users);

    let request = as_actor(test::TestRequest::post(), &users.requester)
        .uri("/api/incidents")
        .set_json(create_body("Flaky wifi"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, request).await;
    let id = created["id"].as_str().expect("id present").to_owned();

    let request = as_actor(test::TestRequest::put(), &users.attendant)
        .uri(&format!("/api/incidents/{id}"))
        .set_json(json!({"status": "resolved"}))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 200);

    let request = as_actor(test::TestRequest::put(), &users.attendant)
        .uri(&format!("/api/incidents/{id}"))
        .set_json(json!({"status": "inProgress"}))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 400);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["fieldErrors"][0]["field"], "status");
}

#[actix_rt::test]
async fn explicit_null_unassigns_and_absent_field_keeps_assignment() {
    let users = users();
    let app = service!(users);

    let request = as_actor(test::TestRequest::post(), &users.requester)
        .uri("/api/incidents")
        .set_json(create_body("Monitor flickers"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, request).await;
    let id = created["id"].as_str().expect("id present").to_owned();

    let request = as_actor(test::TestRequest::put(), &users.attendant)
        .uri(&format!("/api/incidents/{id}"))
        .set_json(json!({"assignedUserId": users.attendant.id}))
        .to_request();
    let assigned: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(assigned["assignedTo"]["id"], users.attendant.id.to_string());

    // Absent field: assignment untouched.
    let request = as_actor(test::TestRequest::put(), &users.attendant)
        .uri(&format!("/api/incidents/{id}"))
        .set_json(json!({"priority": "critical"}))
        .to_request();
    let retitled: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(retitled["assignedTo"]["id"], users.attendant.id.to_string());

    // Explicit null: unassigned.
    let request = as_actor(test::TestRequest::put(), &users.attendant)
        .uri(&format!("/api/incidents/{id}"))
        .set_json(json!({"assignedUserId": null}))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 200);
    let unassigned: Value = test::read_body_json(response).await;
    assert!(unassigned.get("assignedTo").is_none());
}

#[actix_rt::test]
async fn listing_pages_and_reports_totals() {
    let users = users();
    let app = service!(users);

    for n in 0..12 {
        let request = as_actor(test::TestRequest::post(), &users.requester)
            .uri("/api/incidents")
            .set_json(create_body(&format!("ticket-{n}")))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), 201);
    }

    let request = test::TestRequest::get()
        .uri("/api/incidents?pageNumber=2&pageSize=5")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["totalCount"], 12);
    assert_eq!(body["items"].as_array().expect("items").len(), 5);
    assert_eq!(body["items"][0]["title"], "ticket-5");

    let request = test::TestRequest::get()
        .uri("/api/incidents?pageNumber=0")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 400);
}

#[actix_rt::test]
async fn comments_append_and_delete_removes() {
    let users = users();
    let app = service!(users);

    let request = as_actor(test::TestRequest::post(), &users.requester)
        .uri("/api/incidents")
        .set_json(create_body("Keyboard dead"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, request).await;
    let id = created["id"].as_str().expect("id present").to_owned();

    let request = as_actor(test::TestRequest::post(), &users.attendant)
        .uri(&format!("/api/incidents/{id}/comments"))
        .set_json(json!({"content": "Swapped the cable"}))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 201);
    let comment: Value = test::read_body_json(response).await;
    assert_eq!(comment["author"]["id"], users.attendant.id.to_string());

    let request = test::TestRequest::get()
        .uri(&format!("/api/incidents/{id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(fetched["comments"][0]["content"], "Swapped the cable");

    let request = as_actor(test::TestRequest::delete(), &users.requester)
        .uri(&format!("/api/incidents/{id}"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 204);

    let request = test::TestRequest::get()
        .uri(&format!("/api/incidents/{id}"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 404);
}

#[actix_rt::test]
async fn health_probes_respond() {
    let users = users();
    let app = service!(users);

    let response = test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(response.status(), 200);
    let response = test::call_service(&app, test::TestRequest::get().uri("/health/live").to_request()).await;
    assert_eq!(response.status(), 200);
}
