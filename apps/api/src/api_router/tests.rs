use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{DateTime, TimeZone, Utc};
use leavedesk_application::Clock;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use super::build_router;
use super::public_auth::LOGIN_MAX_ATTEMPTS;
use crate::api_services::{build_in_memory_app_state, session_layer};

const FRONTEND_URL: &str = "http://localhost:3000";
const BOOTSTRAP_TOKEN: &str = "bootstrap-token-for-tests";
const PASSWORD: &str = "correct-horse-battery";

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

struct TestResponse {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

fn test_app() -> Router {
    // Monday 3 March 2031.
    let now = Utc
        .with_ymd_and_hms(2031, 3, 3, 9, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("valid timestamp"));
    let state = build_in_memory_app_state(FRONTEND_URL, BOOTSTRAP_TOKEN, Arc::new(FixedClock(now)))
        .unwrap_or_else(|error| panic!("failed to build state: {error}"));

    build_router(
        state,
        FRONTEND_URL,
        session_layer(MemoryStore::default(), false),
    )
    .unwrap_or_else(|error| panic!("failed to build router: {error}"))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method.clone()).uri(uri);
    if method != Method::GET {
        builder = builder.header(header::ORIGIN, FRONTEND_URL);
    }
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_else(|error| panic!("failed to build request: {error}"));

    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|error| match error {});

    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(ToOwned::to_owned);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|error| panic!("failed to read body: {error}"));
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|error| panic!("invalid json: {error}"))
    };

    TestResponse {
        status,
        cookie,
        body,
    }
}

async fn bootstrap(app: &Router) -> String {
    let response = send(
        app,
        Method::POST,
        "/auth/bootstrap",
        None,
        Some(json!({
            "token": BOOTSTRAP_TOKEN,
            "name": "Root Admin",
            "email": "root@leavedesk.test",
            "department": "Administration",
            "password": PASSWORD,
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["role"], "super_admin");
    response
        .cookie
        .unwrap_or_else(|| panic!("bootstrap should set a session cookie"))
}

async fn create_user(app: &Router, admin: &str, name: &str, role: &str, department: &str) {
    let response = send(
        app,
        Method::POST,
        "/api/admin/users",
        Some(admin),
        Some(json!({
            "name": name,
            "email": format!("{}@leavedesk.test", name.to_lowercase()),
            "role": role,
            "department": department,
            "password": PASSWORD,
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
}

async fn login(app: &Router, name: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({
            "email": format!("{}@leavedesk.test", name.to_lowercase()),
            "password": PASSWORD,
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    response
        .cookie
        .unwrap_or_else(|| panic!("login should set a session cookie"))
}

async fn review(app: &Router, reviewer: &str, id: &str, action: &str) -> Value {
    let response = send(
        app,
        Method::POST,
        &format!("/api/leaves/{id}/{action}"),
        Some(reviewer),
        None,
    )
    .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    response.body
}

#[tokio::test]
async fn health_reports_disabled_database_without_pool() {
    let app = test_app();

    let response = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["database"]["status"], "disabled");
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = test_app();

    let response = send(&app, Method::GET, "/api/leaves", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "unauthorized: authentication required");
    assert_eq!(response.body["code"], "unauthorized");
}

#[tokio::test]
async fn bootstrap_rejects_wrong_token_and_runs_once() {
    let app = test_app();

    let wrong = send(
        &app,
        Method::POST,
        "/auth/bootstrap",
        None,
        Some(json!({
            "token": "not-the-token",
            "name": "Mallory",
            "email": "mallory@leavedesk.test",
            "department": "Nowhere",
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let admin = bootstrap(&app).await;
    let me = send(&app, Method::GET, "/auth/me", Some(&admin), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["email"], "root@leavedesk.test");
    let permissions = me.body["permissions"]
        .as_array()
        .unwrap_or_else(|| panic!("permissions should be an array"));
    assert!(permissions.contains(&json!("user.manage")));

    let again = send(
        &app,
        Method::POST,
        "/auth/bootstrap",
        None,
        Some(json!({
            "token": BOOTSTRAP_TOKEN,
            "name": "Second Admin",
            "email": "second@leavedesk.test",
            "department": "Administration",
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_email_is_rejected_and_nothing_is_stored() {
    let app = test_app();
    let admin = bootstrap(&app).await;

    let response = send(
        &app,
        Method::POST,
        "/api/admin/users",
        Some(&admin),
        Some(json!({
            "name": "Broken",
            "email": "broken-at-example",
            "role": "employee",
            "department": "Ops",
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let listed = send(&app, Method::GET, "/api/admin/users", Some(&admin), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["total"], 1);
}

#[tokio::test]
async fn employee_cannot_use_admin_routes() {
    let app = test_app();
    let admin = bootstrap(&app).await;
    create_user(&app, &admin, "Esi", "employee", "Ops").await;
    let employee = login(&app, "Esi").await;

    let response = send(&app, Method::GET, "/api/admin/users", Some(&employee), None).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn out_of_range_paging_and_years_are_bad_requests() {
    let app = test_app();
    let admin = bootstrap(&app).await;
    create_user(&app, &admin, "Femi", "employee", "Ops").await;
    let employee = login(&app, "Femi").await;

    let too_deep = format!("/api/leaves?offset={}", usize::MAX);
    for uri in [
        too_deep.as_str(),
        "/api/approvals?offset=100001",
        "/api/leaves/balances?year=-2147483648",
        "/api/leaves/balances?year=300000",
    ] {
        let response = send(&app, Method::GET, uri, Some(&employee), None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.body["code"], "validation", "{uri}");
    }

    let users = format!("/api/admin/users?offset={}", usize::MAX);
    let response = send(&app, Method::GET, &users, Some(&admin), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn leave_moves_through_every_stage_to_approval() {
    let app = test_app();
    let admin = bootstrap(&app).await;
    create_user(&app, &admin, "Eli", "employee", "Ops").await;
    create_user(&app, &admin, "Dana", "department_head", "Ops").await;
    create_user(&app, &admin, "Hamid", "hr_admin", "People").await;
    create_user(&app, &admin, "Helga", "hr_head", "People").await;

    let employee = login(&app, "Eli").await;
    let submitted = send(
        &app,
        Method::POST,
        "/api/leaves",
        Some(&employee),
        Some(json!({
            "leave_type": "annual",
            "start_date": "2031-04-07",
            "end_date": "2031-04-08",
            "reason": "family visit",
        })),
    )
    .await;
    assert_eq!(submitted.status, StatusCode::CREATED, "{}", submitted.body);
    assert_eq!(submitted.body["status"], "submitted");
    assert_eq!(submitted.body["current_stage"], "department_head");
    assert_eq!(submitted.body["working_days"], 2);
    let id = submitted.body["id"]
        .as_str()
        .unwrap_or_else(|| panic!("id should be a string"))
        .to_owned();

    let head = login(&app, "Dana").await;
    let queue = send(&app, Method::GET, "/api/approvals", Some(&head), None).await;
    assert_eq!(queue.body["total"], 1);
    let forwarded = review(&app, &head, &id, "forward").await;
    assert_eq!(forwarded["status"], "pending");
    assert_eq!(forwarded["current_stage"], "hr_admin");

    let hr_admin = login(&app, "Hamid").await;
    let forwarded = review(&app, &hr_admin, &id, "forward").await;
    assert_eq!(forwarded["current_stage"], "final");

    let hr_head = login(&app, "Helga").await;
    let approved = review(&app, &hr_head, &id, "approve").await;
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["current_stage"], Value::Null);
    assert_eq!(
        approved["approvals"]
            .as_array()
            .map(Vec::len)
            .unwrap_or_default(),
        4
    );

    let queue = send(&app, Method::GET, "/api/approvals", Some(&hr_head), None).await;
    assert_eq!(queue.body["total"], 0);

    let balances = send(
        &app,
        Method::GET,
        "/api/leaves/balances?year=2031",
        Some(&employee),
        None,
    )
    .await;
    let annual = balances
        .body
        .as_array()
        .and_then(|items| items.iter().find(|item| item["leave_type"] == "annual"))
        .cloned()
        .unwrap_or_else(|| panic!("annual balance should be listed"));
    assert_eq!(annual["used"], 2);
    assert_eq!(annual["carried"], 5);
    assert_eq!(annual["remaining"], 23);
}

#[tokio::test]
async fn reject_without_comment_is_a_validation_error() {
    let app = test_app();
    let admin = bootstrap(&app).await;
    create_user(&app, &admin, "Ola", "employee", "Sales").await;
    create_user(&app, &admin, "Sven", "department_head", "Sales").await;

    let employee = login(&app, "Ola").await;
    let submitted = send(
        &app,
        Method::POST,
        "/api/leaves",
        Some(&employee),
        Some(json!({
            "leave_type": "annual",
            "start_date": "2031-05-05",
            "end_date": "2031-05-05",
            "reason": "appointment",
        })),
    )
    .await;
    let id = submitted.body["id"].as_str().unwrap_or_default().to_owned();

    let head = login(&app, "Sven").await;
    let response = send(
        &app,
        Method::POST,
        &format!("/api/leaves/{id}/reject"),
        Some(&head),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        Method::POST,
        &format!("/api/leaves/{id}/reject"),
        Some(&head),
        Some(json!({ "comment": "team is short staffed" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "rejected");
}

#[tokio::test]
async fn cross_origin_mutations_are_rejected() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::ORIGIN, "https://evil.example")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "root@leavedesk.test", "password": PASSWORD }).to_string(),
        ))
        .unwrap_or_else(|error| panic!("failed to build request: {error}"));

    let response = app
        .oneshot(request)
        .await
        .unwrap_or_else(|error| match error {});

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_is_rate_limited_per_client() {
    let app = test_app();
    let app_ref = &app;
    let attempt = move || {
        send(
            app_ref,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@leavedesk.test", "password": PASSWORD })),
        )
    };

    for _ in 0..LOGIN_MAX_ATTEMPTS {
        assert_eq!(attempt().await.status, StatusCode::UNAUTHORIZED);
    }

    assert_eq!(attempt().await.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = test_app();
    let admin = bootstrap(&app).await;

    let response = send(&app, Method::POST, "/auth/logout", Some(&admin), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let me = send(&app, Method::GET, "/auth/me", Some(&admin), None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}
