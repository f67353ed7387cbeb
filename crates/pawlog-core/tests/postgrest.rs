//! PostgREST gateway against a local stub backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pawlog_core::auth::{AuthSession, AuthUser, SessionSource};
use pawlog_core::config::ClientConfig;
use pawlog_core::gateway::{PostgrestGateway, Query, RemoteGateway};
use pawlog_core::util::unix_timestamp_now;
use pawlog_core::Error;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;

type Hits = Arc<AtomicUsize>;

struct SignedIn;

#[async_trait]
impl SessionSource for SignedIn {
    async fn active_session(&self) -> Option<AuthSession> {
        Some(AuthSession {
            access_token: "owner-a-token".to_string(),
            refresh_token: "owner-a-refresh".to_string(),
            expires_at: unix_timestamp_now() + 3600,
            user: AuthUser {
                id: "owner-a".to_string(),
                email: None,
            },
        })
    }
}

/// Serve `app` on a random local port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}")
}

fn gateway(base_url: &str, timeout_secs: u64, read_retries: u32) -> PostgrestGateway {
    let config = ClientConfig::new(base_url, "anon")
        .unwrap()
        .with_timeout_secs(timeout_secs)
        .with_read_retries(read_retries);
    PostgrestGateway::new(&config, Arc::new(SignedIn)).unwrap()
}

async fn unavailable_once(State(hits): State<Hits>) -> (StatusCode, Json<Value>) {
    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "upstream warming up"})),
        )
    } else {
        (StatusCode::OK, Json(json!([{"id": "pet-1", "name": "Rex"}])))
    }
}

async fn always_unavailable(State(hits): State<Hits>) -> (StatusCode, Json<Value>) {
    hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"message": "upstream unavailable"})),
    )
}

async fn stalled(State(hits): State<Hits>) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!([]))
}

async fn no_rows() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_ACCEPTABLE,
        Json(json!({
            "code": "PGRST116",
            "details": "The result contains 0 rows",
            "message": "JSON object requested, multiple (or no) rows returned"
        })),
    )
}

#[tokio::test]
async fn select_recovers_from_one_server_error() {
    let hits = Hits::default();
    let app = Router::new()
        .route("/rest/v1/pets", get(unavailable_once))
        .with_state(hits.clone());
    let base_url = serve(app).await;

    let rows = gateway(&base_url, 5, 2)
        .select(&Query::table("pets"))
        .await
        .unwrap();

    assert_eq!(rows, vec![json!({"id": "pet-1", "name": "Rex"})]);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn select_gives_up_after_configured_retries() {
    let hits = Hits::default();
    let app = Router::new()
        .route("/rest/v1/pets", get(always_unavailable))
        .with_state(hits.clone());
    let base_url = serve(app).await;

    let error = gateway(&base_url, 5, 1)
        .select(&Query::table("pets"))
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "upstream unavailable");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn insert_is_sent_exactly_once() {
    let hits = Hits::default();
    let app = Router::new()
        .route("/rest/v1/weight_logs", get(no_rows).post(always_unavailable))
        .with_state(hits.clone());
    let base_url = serve(app).await;

    let error = gateway(&base_url, 5, 3)
        .insert("weight_logs", json!({"weight": "4.2"}))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Gateway(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stalled_response_times_out() {
    let hits = Hits::default();
    let app = Router::new()
        .route("/rest/v1/pets", get(stalled))
        .with_state(hits.clone());
    let base_url = serve(app).await;

    let error = gateway(&base_url, 1, 0)
        .select(&Query::table("pets"))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Timeout(1)));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_single_row_is_none() {
    let app = Router::new().route("/rest/v1/pets", get(no_rows));
    let base_url = serve(app).await;

    let row = gateway(&base_url, 5, 0)
        .select_single(&Query::table("pets").eq("id", "missing"))
        .await
        .unwrap();

    assert_eq!(row, None);
}
