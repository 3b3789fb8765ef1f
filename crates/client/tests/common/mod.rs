//! In-process mock banking backend for integration tests.
//!
//! A tiny axum app standing in for the real backend: it issues and rotates
//! opaque tokens, enforces the bearer contract on business endpoints, and
//! exposes counters plus failure toggles so tests can pin down exactly how
//! many refresh/logout calls the client made.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use bankline_client::http::SessionHooks;

/// Shared state of the mock backend.
#[derive(Default)]
pub struct MockBank {
    /// Refresh attempts received (counted before any failure toggle).
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    /// When set, `/auth/refresh` rejects every attempt with 401.
    pub fail_refresh: AtomicBool,
    /// When set, `/auth/logout` answers 500.
    pub fail_logout: AtomicBool,
    /// When set, `/accounts` answers 401 no matter the token.
    pub always_unauthorized: AtomicBool,
    /// When set, `/accounts` answers 403 no matter the token.
    pub forbid_accounts: AtomicBool,
    access: Mutex<String>,
    refresh: Mutex<String>,
    generation: AtomicUsize,
}

impl MockBank {
    /// The access token the backend currently accepts.
    pub fn current_access(&self) -> String {
        self.access.lock().unwrap().clone()
    }

    /// The refresh token the backend currently accepts.
    pub fn current_refresh(&self) -> String {
        self.refresh.lock().unwrap().clone()
    }

    /// Expire the client's access token: the backend moves on to a new
    /// generation while the refresh token stays valid, so the next bearer
    /// the client sends is stale.
    pub fn invalidate_access(&self) {
        let n = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.access.lock().unwrap() = format!("access-{n}");
    }

    fn issue_pair(&self) -> (String, String) {
        let n = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("access-{n}");
        let refresh = format!("refresh-{n}");
        *self.access.lock().unwrap() = access.clone();
        *self.refresh.lock().unwrap() = refresh.clone();
        (access, refresh)
    }

    fn accepts_access(&self, bearer: Option<&str>) -> bool {
        bearer == Some(self.current_access().as_str())
    }
}

/// Start the mock backend on an ephemeral port. Returns its base URL and
/// the shared state handle.
pub async fn spawn_mock_bank() -> (String, Arc<MockBank>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bankline_client=debug".into()),
        )
        .with_test_writer()
        .try_init();

    let state = Arc::new(MockBank::default());
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend serve");
    });

    (format!("http://{addr}"), state)
}

fn router(state: Arc<MockBank>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/accounts", get(accounts))
        .route("/accounts/{id}/transactions", get(transactions))
        .route("/echo-auth", get(echo_auth))
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn unauthorized(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "code": "UNAUTHORIZED", "message": message } })),
    )
}

/// The user every successful login represents. camelCase on purpose: the
/// deployed backend speaks a JS-style wire format, and the client's
/// normalization layer is what these tests exercise end to end.
fn user_json() -> Value {
    json!({
        "id": 7,
        "email": "ada@example.com",
        "displayName": "Ada Lovelace",
        "roles": ["CUSTOMER"]
    })
}

async fn login(
    State(state): State<Arc<MockBank>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.login_calls.fetch_add(1, Ordering::SeqCst);

    if body["username"] != "ada@example.com" || body["password"] != "correct horse" {
        return unauthorized("Invalid username or password");
    }

    let (access, refresh) = state.issue_pair();
    (
        StatusCode::OK,
        Json(json!({
            "accessToken": access,
            "refreshToken": refresh,
            "expiresIn": 900,
            "user": user_json(),
            "permissions": ["ACCOUNT_READ", "TXN_READ", "TRANSFER_CREATE"]
        })),
    )
}

async fn refresh(
    State(state): State<Arc<MockBank>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    if state.fail_refresh.load(Ordering::SeqCst) {
        return unauthorized("Refresh token revoked");
    }
    if bearer(&headers).as_deref() != Some(state.current_refresh().as_str()) {
        return unauthorized("Invalid or expired refresh token");
    }

    // Token rotation: the old refresh token is now dead.
    let (access, refresh) = state.issue_pair();
    (
        StatusCode::OK,
        Json(json!({ "accessToken": access, "refreshToken": refresh, "expiresIn": 900 })),
    )
}

async fn logout(State(state): State<Arc<MockBank>>) -> StatusCode {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_logout.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn me(State(state): State<Arc<MockBank>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !state.accepts_access(bearer(&headers).as_deref()) {
        return unauthorized("Invalid or expired token");
    }
    (
        StatusCode::OK,
        Json(json!({
            "user": user_json(),
            "permissions": ["ACCOUNT_READ", "TXN_READ", "TRANSFER_CREATE"]
        })),
    )
}

async fn accounts(
    State(state): State<Arc<MockBank>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if state.forbid_accounts.load(Ordering::SeqCst) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": { "code": "FORBIDDEN", "message": "insufficient privileges" } })),
        );
    }
    if state.always_unauthorized.load(Ordering::SeqCst)
        || !state.accepts_access(bearer(&headers).as_deref())
    {
        return unauthorized("Invalid or expired token");
    }
    (
        StatusCode::OK,
        Json(json!([
            { "id": 1, "name": "Current", "currency": "EUR", "balance_minor": 125_000 },
            { "id": 2, "name": "Savings", "currency": "EUR", "balance_minor": 9_000_000 }
        ])),
    )
}

async fn transactions(
    State(state): State<Arc<MockBank>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !state.accepts_access(bearer(&headers).as_deref()) {
        return unauthorized("Invalid or expired token");
    }
    if id != 1 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "code": "NOT_FOUND", "message": "account not found" } })),
        );
    }
    (
        StatusCode::OK,
        Json(json!([{
            "id": 900,
            "account_id": 1,
            "amount_minor": -4_250,
            "currency": "EUR",
            "description": "Grocery store",
            "booked_at": "2026-08-28T09:30:00Z"
        }])),
    )
}

/// Echoes the authorization header back, authenticated or not.
async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    Json(json!({ "authorization": bearer(&headers) }))
}

/// Session hook that counts terminal expiries.
#[derive(Default)]
pub struct CountingHooks {
    pub expired: AtomicUsize,
}

impl SessionHooks for CountingHooks {
    fn on_session_expired(&self) {
        self.expired.fetch_add(1, Ordering::SeqCst);
    }
}
