//! Router tests: full request path through auth, handlers and SQLite.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::build_app;
use laundry_core::{Role, UserInput};
use laundry_db::{Database, DbConfig};

fn test_config() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        database_path: ":memory:".to_string(),
        db_max_connections: 1,
        jwt_secret: "router-test-secret".to_string(),
        jwt_lifetime_secs: 3600,
        gemini_api_key: None,
        gemini_model: "gemini-test".to_string(),
        gemini_base_url: "http://127.0.0.1:9".to_string(),
        cors_allow_origin: None,
    }
}

struct TestApp {
    app: Router,
    admin_token: String,
    cashier_token: String,
}

async fn setup() -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let state = AppState::new(db, test_config());

    let admin = state
        .db
        .users()
        .create(&UserInput {
            name: "Administrator".to_string(),
            username: "admin".to_string(),
            password: Some("admin123".to_string()),
            role: Role::Admin,
            outlet_id: None,
        })
        .await
        .unwrap();
    let cashier = state
        .db
        .users()
        .create(&UserInput {
            name: "Kasir Satu".to_string(),
            username: "kasir1".to_string(),
            password: Some("kasir123".to_string()),
            role: Role::Cashier,
            outlet_id: None,
        })
        .await
        .unwrap();

    TestApp {
        admin_token: state.jwt.issue(&admin).unwrap(),
        cashier_token: state.jwt.issue(&cashier).unwrap(),
        app: build_app(state),
    }
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, method, uri, token, body).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

/// Creates an outlet and one per-kilo package priced at 15.000.
async fn seed_outlet_and_package(t: &TestApp) -> (String, String) {
    let (status, outlet) = send(
        &t.app,
        Method::POST,
        "/api/outlets",
        Some(&t.admin_token),
        Some(json!({ "name": "Outlet Pusat", "address": "Jl. Merdeka 1", "phone": "081234567890" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{outlet}");
    let outlet_id = outlet["data"]["id"].as_str().unwrap().to_string();

    let (status, package) = send(
        &t.app,
        Method::POST,
        "/api/packages",
        Some(&t.admin_token),
        Some(json!({
            "outlet_id": outlet_id,
            "name": "Kiloan",
            "category": "per_kilo",
            "price": 15000.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{package}");
    let package_id = package["data"]["id"].as_str().unwrap().to_string();

    (outlet_id, package_id)
}

async fn create_transaction(t: &TestApp, outlet_id: &str, package_id: &str) -> Value {
    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/transactions",
        Some(&t.cashier_token),
        Some(json!({
            "outlet_id": outlet_id,
            "additional_fee": 5000.0,
            "discount": 10.0,
            "discount_type": "percent",
            "tax_percent": 11.0,
            "items": [{ "package_id": package_id, "quantity": 2.0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

// =============================================================================
// Public Routes
// =============================================================================

#[tokio::test]
async fn test_health() {
    let t = setup().await;
    let (status, body) = send(&t.app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_login() {
    let t = setup().await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "admin123", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["user"]["username"], "admin");
    assert!(body["data"]["user"].get("password_hash").is_none());

    // The token works on a protected route
    let token = body["data"]["token"].as_str().unwrap();
    let (status, me) = send(&t.app, Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["role"], "admin");
}

#[tokio::test]
async fn test_login_rejects_wrong_role_and_password() {
    let t = setup().await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "kasir1", "password": "kasir123", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "kasir1", "password": "wrong-pass", "role": "cashier" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Authentication and Capabilities
// =============================================================================

#[tokio::test]
async fn test_protected_routes_need_token() {
    let t = setup().await;

    let (status, body) = send(&t.app, Method::GET, "/api/outlets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&t.app, Method::GET, "/api/outlets", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cashier_cannot_manage_outlets() {
    let t = setup().await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/outlets",
        Some(&t.cashier_token),
        Some(json!({ "name": "Outlet Baru" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // Reading is allowed
    let (status, _) = send(&t.app, Method::GET, "/api/outlets", Some(&t.cashier_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

/// Creates an account through the API and signs in with it.
async fn create_and_login(t: &TestApp, username: &str, role: &str) -> (String, String) {
    let (status, created) = send(
        &t.app,
        Method::POST,
        "/api/users",
        Some(&t.admin_token),
        Some(json!({
            "name": "Staff Baru",
            "username": username,
            "password": "rahasia123",
            "role": role
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, login) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": "rahasia123", "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{login}");
    let token = login["data"]["token"].as_str().unwrap().to_string();

    (id, token)
}

#[tokio::test]
async fn test_demoted_admin_loses_admin_rights() {
    let t = setup().await;
    let (id, token) = create_and_login(&t, "admin2", "admin").await;

    let (status, _) = send(&t.app, Method::GET, "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &t.app,
        Method::PUT,
        &format!("/api/users/{}", id),
        Some(&t.admin_token),
        Some(json!({ "name": "Staff Baru", "username": "admin2", "role": "cashier" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Same token, issued while the account was still admin
    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/users",
        Some(&token),
        Some(json!({
            "name": "Penyusup",
            "username": "admin3",
            "password": "rahasia123",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = send(&t.app, Method::GET, "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, me) = send(&t.app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["role"], "cashier");
}

#[tokio::test]
async fn test_deleted_user_token_rejected() {
    let t = setup().await;
    let (id, token) = create_and_login(&t, "kasir2", "cashier").await;

    let (status, _) = send(&t.app, Method::GET, "/api/outlets", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/users/{}", id),
        Some(&t.admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&t.app, Method::GET, "/api/outlets", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let t = setup().await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/members",
        Some(&t.cashier_token),
        Some(json!({ "address": "no name" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Transactions
// =============================================================================

#[tokio::test]
async fn test_create_transaction_totals() {
    let t = setup().await;
    let (outlet_id, package_id) = seed_outlet_and_package(&t).await;

    let body = create_transaction(&t, &outlet_id, &package_id).await;
    let data = &body["data"];

    assert!(data["invoice_code"].as_str().unwrap().starts_with("INV-"));
    assert_eq!(data["outlet_name"], "Outlet Pusat");
    assert_eq!(data["subtotal"].as_f64().unwrap(), 30_000.0);
    assert_eq!(data["total"].as_f64().unwrap().round(), 34_965.0);
    assert_eq!(data["items"][0]["package_name"], "Kiloan");
    assert_eq!(data["status"], "new");
    assert_eq!(data["payment_status"], "unpaid");

    // Mark as paid
    let id = data["id"].as_str().unwrap();
    let (status, paid) = send(
        &t.app,
        Method::PATCH,
        &format!("/api/transactions/{}/payment", id),
        Some(&t.cashier_token),
        Some(json!({ "payment_status": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["data"]["payment_status"], "paid");
    assert!(paid["data"]["paid_at"].is_string());
}

#[tokio::test]
async fn test_create_transaction_unknown_outlet() {
    let t = setup().await;
    let (_, package_id) = seed_outlet_and_package(&t).await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/transactions",
        Some(&t.cashier_token),
        Some(json!({
            "outlet_id": uuid::Uuid::new_v4().to_string(),
            "items": [{ "package_id": package_id, "quantity": 1.0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid outlet");
}

async fn set_payment(t: &TestApp, uri: &str, payment_status: &str) -> (StatusCode, Value) {
    send(
        &t.app,
        Method::PATCH,
        uri,
        Some(&t.cashier_token),
        Some(json!({ "payment_status": payment_status })),
    )
    .await
}

#[tokio::test]
async fn test_payment_toggle_stamps_paid_at() {
    let t = setup().await;
    let (outlet_id, package_id) = seed_outlet_and_package(&t).await;
    let created = create_transaction(&t, &outlet_id, &package_id).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/transactions/{}/payment", id);

    let (status, paid) = set_payment(&t, &uri, "paid").await;
    assert_eq!(status, StatusCode::OK);
    let first: DateTime<Utc> = paid["data"]["paid_at"].as_str().unwrap().parse().unwrap();

    let (status, unpaid) = set_payment(&t, &uri, "unpaid").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unpaid["data"]["payment_status"], "unpaid");
    assert!(unpaid["data"]["paid_at"].is_null());

    // Cleared in storage too
    let (_, stored) = send(
        &t.app,
        Method::GET,
        &format!("/api/transactions/{}", id),
        Some(&t.cashier_token),
        None,
    )
    .await;
    assert!(stored["data"]["paid_at"].is_null());

    let (status, repaid) = set_payment(&t, &uri, "paid").await;
    assert_eq!(status, StatusCode::OK);
    let second: DateTime<Utc> = repaid["data"]["paid_at"].as_str().unwrap().parse().unwrap();
    assert!(second >= first);
}

#[tokio::test]
async fn test_create_transaction_with_date_only_due() {
    let t = setup().await;
    let (outlet_id, package_id) = seed_outlet_and_package(&t).await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/transactions",
        Some(&t.cashier_token),
        Some(json!({
            "outlet_id": outlet_id,
            "due_at": "2024-05-20",
            "items": [{ "package_id": package_id, "quantity": 1.0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let due: DateTime<Utc> = body["data"]["due_at"].as_str().unwrap().parse().unwrap();
    assert_eq!(due.to_rfc3339(), "2024-05-20T00:00:00+00:00");
}

#[tokio::test]
async fn test_missing_transaction_is_not_found() {
    let t = setup().await;
    let id = uuid::Uuid::new_v4().to_string();

    let (status, body) = send(
        &t.app,
        Method::GET,
        &format!("/api/transactions/{}", id),
        Some(&t.cashier_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_outlet_in_use_conflicts() {
    let t = setup().await;
    let (outlet_id, _) = seed_outlet_and_package(&t).await;

    let (status, body) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/outlets/{}", outlet_id),
        Some(&t.admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn test_period_report_and_dashboard() {
    let t = setup().await;
    let (outlet_id, package_id) = seed_outlet_and_package(&t).await;
    create_transaction(&t, &outlet_id, &package_id).await;

    let (status, body) = send(&t.app, Method::GET, "/api/reports?period=7", Some(&t.cashier_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["period_days"], 7);
    assert_eq!(body["data"]["total_transactions"], 1);
    assert_eq!(body["data"]["chart"].as_array().unwrap().len(), 7);

    let (status, _) = send(&t.app, Method::GET, "/api/reports?period=0", Some(&t.cashier_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&t.app, Method::GET, "/api/dashboard", Some(&t.cashier_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

async fn get_export(t: &TestApp, query: &str) -> axum::response::Response {
    let request = Request::builder()
        .uri(format!("/api/reports/export?{}", query))
        .header(header::AUTHORIZATION, format!("Bearer {}", t.cashier_token))
        .body(Body::empty())
        .unwrap();
    t.app.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_excel_export_is_default() {
    let t = setup().await;
    let (outlet_id, package_id) = seed_outlet_and_package(&t).await;
    create_transaction(&t, &outlet_id, &package_id).await;

    for query in ["period=30", "period=30&format=excel"] {
        let response = get_export(&t, query).await;

        assert_eq!(response.status(), StatusCode::OK, "{query}");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"transactions-report-30-days.xlsx\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}

#[tokio::test]
async fn test_csv_export() {
    let t = setup().await;
    let (outlet_id, package_id) = seed_outlet_and_package(&t).await;
    create_transaction(&t, &outlet_id, &package_id).await;

    let response = get_export(&t, "period=30&format=csv").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"transactions-report-30-days.csv\""
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains(",Guest,"));
    assert!(text.contains(",34965,new,unpaid,-"));
}

#[tokio::test]
async fn test_export_rejects_unknown_format() {
    let t = setup().await;

    let (status, body) = send(
        &t.app,
        Method::GET,
        "/api/reports/export?period=7&format=pdf",
        Some(&t.cashier_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_recap_requires_outlet() {
    let t = setup().await;

    let (status, _) = send(&t.app, Method::GET, "/api/recap", Some(&t.cashier_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (outlet_id, _) = seed_outlet_and_package(&t).await;
    let (status, body) = send(
        &t.app,
        Method::GET,
        &format!("/api/recap?outlet_id={}", outlet_id),
        Some(&t.cashier_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_chat_without_api_key() {
    let t = setup().await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/chat",
        Some(&t.cashier_token),
        Some(json!({ "message": "Bagaimana penjualan bulan ini?" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");

    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/chat",
        Some(&t.cashier_token),
        Some(json!({ "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
