mod helpers;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use helpers::*;
use oxicrm::infrastructure::http::router::build_router;
use oxicrm::infrastructure::persistence::Database;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(db: &Database) -> Router {
    build_router(test_state(db, date(2025, 3, 14)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_public_routes() {
    let test_db = setup_test_db().await;
    let app = app(test_db.db());

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");

    let (status, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "oxicrm");

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_login_and_session_lifecycle() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let app = app(db);
    create_master(db).await;

    let (status, _) = send(
        &app,
        Request::get("/api/auth/me").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/auth/me", "not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app, "master@oxicrm.test").await;
    let (status, me) = send(&app, get("/api/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "master@oxicrm.test");
    assert_eq!(me["profile"], "master");
    assert_eq!(me["permissions"]["manage_users"], true);
    assert!(me.get("password_hash").is_none());

    let (status, _) = send(&app, post_json("/api/auth/logout", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get("/api/auth/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_bad_login_is_unauthorized() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let app = app(db);
    create_master(db).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            json!({ "email": "master@oxicrm.test", "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_seller_permissions_over_http() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let app = app(db);
    create_seller(db, "Maria").await;
    let client = create_test_client(db, "Client", 1, Some("AA")).await;
    let token = login(&app, "maria@oxicrm.test").await;

    let (status, _) = send(&app, get("/api/users", &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, get("/api/spreadsheets/clients/export", &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, clients) = send(&app, get("/api/clients", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clients["pagination"]["total"], 1);

    let (status, contact) = send(
        &app,
        post_json(
            "/api/contacts",
            Some(&token),
            json!({
                "client_id": client.id,
                "contact_type": "A",
                "result": "1",
                "seller": "Maria",
                "contact_date": "2025-03-14",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", contact);
    assert_eq!(contact["next_contact_date"], "2025-03-21");
    assert_eq!(contact["client_name"], "Client");

    let (status, agenda) = send(&app, get("/api/agenda/stats", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agenda["next_7_days"], 1);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_contact_validation_maps_to_bad_request() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let app = app(db);
    create_master(db).await;
    let token = login(&app, "master@oxicrm.test").await;

    let (status, body) = send(
        &app,
        post_json("/api/contacts", Some(&token), json!({ "contact_type": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("client_id"));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_catalogs_are_seeded() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let app = app(db);
    create_seller(db, "Maria").await;
    let token = login(&app, "maria@oxicrm.test").await;

    let (status, types) = send(&app, get("/api/contact-types", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = types
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["A", "A1", "E", "M", "V", "W"]);

    let (status, results) = send(&app, get("/api/contact-results", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results.as_array().unwrap().len(), 7);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_spreadsheet_upload_and_size_limit() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let app = app(db);
    create_master(db).await;
    let token = login(&app, "master@oxicrm.test").await;

    let upload = Request::post("/api/spreadsheets/clients?mode=add")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from("NOME,CODIGO\nAlpha,1\nBeta,2\n"))
        .unwrap();
    let (status, body) = send(&app, upload).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["stats"]["imported"], 2);
    assert_eq!(body["stats"]["mode"], "add");

    let oversized = vec![b'a'; 128 * 1024];
    let upload = Request::post("/api/spreadsheets/clients")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "text/csv")
        .header(header::CONTENT_LENGTH, oversized.len())
        .body(Body::from(oversized))
        .unwrap();
    let (status, _) = send(&app, upload).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let response = app
        .clone()
        .oneshot(get("/api/spreadsheets/clients/template", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));

    teardown_test_db(test_db).await;
}
