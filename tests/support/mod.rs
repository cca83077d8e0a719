//! In-process estates backend for integration tests.
//!
//! Serves the seven REST endpoints the client talks to from in-memory state,
//! on an ephemeral localhost port. Individual routes can be switched into a
//! failure mode to exercise the client's error paths.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use nova_estates::config::ClientConfig;
use nova_estates::net::HttpSiteApi;
use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const LOFT_ID: &str = "65f1c0ffee1234";

/// How a route misbehaves when switched out of normal operation.
#[derive(Clone, Debug)]
pub enum Fault {
    Status(u16),
    /// 200 with a body that is not JSON.
    Garbage,
    /// 200 with this JSON body.
    Body(Value),
}

#[derive(Debug)]
pub struct Backend {
    pub settings: Map<String, Value>,
    pub properties: Vec<Value>,
    pub offers: Vec<Value>,
    pub revision: u64,
    pub admin_seeded: bool,
    pub seed_calls: usize,
    pub tokens: Vec<String>,
    /// `"METHOD /path"` per request, in arrival order.
    pub requests: Vec<String>,
    /// `Authorization` header values seen on PATCH requests.
    pub patch_auth: Vec<Option<String>>,
    pub faults: HashMap<&'static str, Fault>,
}

impl Default for Backend {
    fn default() -> Self {
        let settings = json!({
            "site_name": "Nova Estates",
            "hero_headline": "Find your next home",
            "hero_subtitle": "Curated listings across the city.",
            "contact_phone": "555-0100",
        });
        let loft = json!({
            "id": LOFT_ID,
            "title": "Loft",
            "description": "Open plan, south light.",
            "price": 250_000,
            "city": "Metropolis",
            "state": "NY",
            "images": [],
        });
        Self {
            settings: settings.as_object().cloned().unwrap_or_default(),
            properties: vec![loft],
            offers: Vec::new(),
            revision: 0,
            admin_seeded: false,
            seed_calls: 0,
            tokens: Vec::new(),
            requests: Vec::new(),
            patch_auth: Vec::new(),
            faults: HashMap::new(),
        }
    }
}

type Shared = Arc<Mutex<Backend>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Backend> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct TestBackend {
    pub base_url: String,
    state: Shared,
    handle: JoinHandle<()>,
}

impl TestBackend {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(Backend::default()));
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base_url: format!("http://{addr}"), state, handle }
    }

    pub fn backend(&self) -> MutexGuard<'_, Backend> {
        lock(&self.state)
    }

    /// Route key is `"METHOD /path"`, e.g. `"GET /api/settings"`.
    pub fn fault(&self, route: &'static str, fault: Fault) {
        self.backend().faults.insert(route, fault);
    }

    pub fn client(&self) -> HttpSiteApi {
        let config = ClientConfig::default().with_base_url(&self.base_url).unwrap();
        HttpSiteApi::new(&config).unwrap()
    }

    pub fn requests_matching(&self, route: &str) -> usize {
        self.backend().requests.iter().filter(|r| *r == route).count()
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A base URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// =============================================================================
// ROUTES
// =============================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/settings", get(get_settings).patch(patch_settings))
        .route("/api/properties", get(get_properties))
        .route("/api/offers", get(get_offers).post(post_offer))
        .route("/api/admin/login", post(admin_login))
        .route("/api/admin/seed", post(admin_seed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Log the request and return the injected fault, if any.
fn enter(backend: &mut Backend, route: &'static str) -> Option<Response> {
    backend.requests.push(route.to_owned());
    match backend.faults.get(route)? {
        Fault::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Some((status, Json(json!({ "detail": "injected failure" }))).into_response())
        }
        Fault::Garbage => Some((StatusCode::OK, "<html>oops</html>").into_response()),
        Fault::Body(body) => Some((StatusCode::OK, Json(body.clone())).into_response()),
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn get_settings(State(state): State<Shared>) -> Response {
    let mut backend = lock(&state);
    if let Some(fault) = enter(&mut backend, "GET /api/settings") {
        return fault;
    }
    Json(Value::Object(backend.settings.clone())).into_response()
}

async fn patch_settings(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut backend = lock(&state);
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    backend.patch_auth.push(auth.clone());
    if let Some(fault) = enter(&mut backend, "PATCH /api/settings") {
        return fault;
    }

    let authorized = auth
        .as_deref()
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| backend.tokens.iter().any(|t| t == token));
    if !authorized {
        return detail(StatusCode::UNAUTHORIZED, "not authenticated");
    }
    let Value::Object(fields) = body else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "expected an object");
    };

    for (key, value) in fields {
        let value = match value {
            Value::String(s) if key == "site_name" => Value::String(s.trim().to_owned()),
            other => other,
        };
        backend.settings.insert(key, value);
    }
    backend.revision += 1;
    let revision = backend.revision;
    backend.settings.insert("revision".to_owned(), json!(revision));
    Json(Value::Object(backend.settings.clone())).into_response()
}

async fn get_properties(State(state): State<Shared>) -> Response {
    let mut backend = lock(&state);
    if let Some(fault) = enter(&mut backend, "GET /api/properties") {
        return fault;
    }
    Json(Value::Array(backend.properties.clone())).into_response()
}

async fn get_offers(State(state): State<Shared>) -> Response {
    let mut backend = lock(&state);
    if let Some(fault) = enter(&mut backend, "GET /api/offers") {
        return fault;
    }
    Json(Value::Array(backend.offers.clone())).into_response()
}

async fn post_offer(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut backend = lock(&state);
    if let Some(fault) = enter(&mut backend, "POST /api/offers") {
        return fault;
    }
    let Value::Object(mut offer) = body else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "expected an object");
    };
    if !offer.get("amount").and_then(Value::as_f64).is_some_and(|a| a >= 0.0) {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "amount must be a non-negative number");
    }
    let property_id = offer.get("property_id").and_then(Value::as_str).unwrap_or_default();
    if !backend.properties.iter().any(|p| p["id"] == property_id) {
        return detail(StatusCode::NOT_FOUND, "property not found");
    }

    offer.insert("id".to_owned(), json!(Uuid::new_v4().to_string()));
    offer.insert("status".to_owned(), json!("pending"));
    let offer = Value::Object(offer);
    backend.offers.push(offer.clone());
    (StatusCode::CREATED, Json(offer)).into_response()
}

async fn admin_login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut backend = lock(&state);
    if let Some(fault) = enter(&mut backend, "POST /api/admin/login") {
        return fault;
    }
    let matches = backend.admin_seeded
        && body["email"] == ADMIN_EMAIL
        && body["password"] == ADMIN_PASSWORD;
    if !matches {
        return detail(StatusCode::UNAUTHORIZED, "invalid credentials");
    }
    let token = Uuid::new_v4().to_string();
    backend.tokens.push(token.clone());
    Json(json!({ "token": token })).into_response()
}

async fn admin_seed(State(state): State<Shared>) -> Response {
    let mut backend = lock(&state);
    backend.seed_calls += 1;
    if let Some(fault) = enter(&mut backend, "POST /api/admin/seed") {
        return fault;
    }
    backend.admin_seeded = true;
    Json(json!({ "status": "ok" })).into_response()
}
