//! In-memory stand-in for the remote API
//!
//! Serves the same routes as the real server under `/api/app` and
//! `/connect/token`. Used by the test suites and by `discipline mock-server`.
//!
//! Behaviour worth knowing:
//! - `GET /discipline/{id}` answers 204 with no body for unknown ids
//! - `PUT` refuses to change a record's code
//! - `/project` requires a bearer token issued by `/connect/token`

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use discipline_config::ApiConfig;
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::wire::{DisciplineDto, Page, ProjectDto, TokenResponse};

/// Credentials the token endpoint accepts
#[derive(Debug, Clone)]
pub struct MockCredentials {
    pub client_id: String,
    pub username: String,
    pub password: String,
}

impl Default for MockCredentials {
    fn default() -> Self {
        Self {
            client_id: "Cxm_App".into(),
            username: "admin".into(),
            password: "1q2w3E*".into(),
        }
    }
}

/// Which listing shape `GET /discipline` answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListShape {
    #[default]
    Paged,
    Bare,
}

/// Shared server state
pub struct MockState {
    credentials: MockCredentials,
    disciplines: RwLock<Vec<DisciplineDto>>,
    projects: RwLock<Vec<ProjectDto>>,
    tokens: RwLock<HashSet<String>>,
    shape: RwLock<ListShape>,
    requests: RwLock<Vec<String>>,
}

impl MockState {
    pub fn new(credentials: MockCredentials) -> Self {
        Self {
            credentials,
            disciplines: RwLock::new(Vec::new()),
            projects: RwLock::new(Vec::new()),
            tokens: RwLock::new(HashSet::new()),
            shape: RwLock::new(ListShape::default()),
            requests: RwLock::new(Vec::new()),
        }
    }

    async fn record(&self, line: String) {
        self.requests.write().await.push(line);
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(rename = "MaxResultCount")]
    max_result_count: Option<usize>,
}

async fn list_disciplines(
    State(state): State<Arc<MockState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    state.record("GET /discipline".into()).await;

    let all = state.disciplines.read().await;
    let items: Vec<DisciplineDto> = all
        .iter()
        .take(query.max_result_count.unwrap_or(10))
        .cloned()
        .collect();

    match *state.shape.read().await {
        ListShape::Paged => Json(Page {
            items,
            total_count: all.len() as u64,
        })
        .into_response(),
        ListShape::Bare => Json(items).into_response(),
    }
}

async fn get_discipline(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    state.record(format!("GET /discipline/{id}")).await;

    let all = state.disciplines.read().await;
    match all.iter().find(|d| d.id.as_deref() == Some(id.as_str())) {
        Some(found) => Json(found.clone()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn create_discipline(
    State(state): State<Arc<MockState>>,
    Json(mut body): Json<DisciplineDto>,
) -> Response {
    state.record("POST /discipline".into()).await;

    if body.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        return (StatusCode::BAD_REQUEST, "name is required").into_response();
    }

    body.id = Some(uuid::Uuid::new_v4().to_string());
    if body.is_active.is_none() {
        body.is_active = Some(true);
    }

    state.disciplines.write().await.push(body.clone());
    Json(body).into_response()
}

async fn update_discipline(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(mut body): Json<DisciplineDto>,
) -> Response {
    state.record(format!("PUT /discipline/{id}")).await;

    let mut all = state.disciplines.write().await;
    let Some(existing) = all.iter_mut().find(|d| d.id.as_deref() == Some(id.as_str())) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if body.code.is_some() && body.code != existing.code {
        return (StatusCode::BAD_REQUEST, "code cannot be changed").into_response();
    }

    body.id = Some(id);
    body.code = existing.code.clone();
    *existing = body.clone();
    Json(body).into_response()
}

async fn delete_discipline(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    state.record(format!("DELETE /discipline/{id}")).await;

    let mut all = state.disciplines.write().await;
    let before = all.len();
    all.retain(|d| d.id.as_deref() != Some(id.as_str()));

    if all.len() < before {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn list_projects(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("GET /project".into()).await;

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let authorized = match token {
        Some(token) => state.tokens.read().await.contains(token),
        None => false,
    };
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let items = state.projects.read().await.clone();
    let total_count = items.len() as u64;
    Json(Page { items, total_count }).into_response()
}

async fn issue_token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.record("POST /connect/token".into()).await;

    fn field<'a>(form: &'a HashMap<String, String>, key: &str) -> &'a str {
        form.get(key).map(String::as_str).unwrap_or_default()
    }
    let creds = &state.credentials;

    let valid = field(&form, "grant_type") == "password"
        && field(&form, "client_id") == creds.client_id
        && field(&form, "username") == creds.username
        && field(&form, "password") == creds.password;

    if !valid {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "invalid_grant" })),
        )
            .into_response();
    }

    let token = uuid::Uuid::new_v4().simple().to_string();
    state.tokens.write().await.insert(token.clone());

    Json(TokenResponse {
        access_token: Some(token),
        token_type: Some("Bearer".into()),
        expires_in: Some(3600),
    })
    .into_response()
}

/// Routes of the stand-in server
pub fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/app/discipline", get(list_disciplines).post(create_discipline))
        .route(
            "/api/app/discipline/:id",
            get(get_discipline).put(update_discipline).delete(delete_discipline),
        )
        .route("/api/app/project", get(list_projects))
        .route("/connect/token", post(issue_token))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Running stand-in server. Stops when dropped.
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Start on an ephemeral localhost port
    pub async fn start(credentials: MockCredentials) -> std::io::Result<Self> {
        Self::bind("127.0.0.1:0", credentials).await
    }

    pub async fn bind(addr: &str, credentials: MockCredentials) -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(MockState::new(credentials));
        let app = router(state.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "mock server stopped");
            }
        });

        tracing::info!(%addr, "mock server listening");
        Ok(Self {
            addr,
            state,
            handle: Some(handle),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client config pointing at this server with valid credentials
    pub fn config(&self) -> ApiConfig {
        let creds = &self.state.credentials;
        ApiConfig {
            client_id: creds.client_id.clone(),
            username: creds.username.clone(),
            password: creds.password.clone(),
            ..ApiConfig::for_host(&self.url())
        }
    }

    /// Insert a record as-is, assigning an id if it has none
    pub async fn seed_discipline(&self, mut record: DisciplineDto) -> String {
        let id = record
            .id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone();
        self.state.disciplines.write().await.push(record);
        id
    }

    pub async fn seed_project(&self, id: &str, name: &str) {
        self.state.projects.write().await.push(ProjectDto {
            id: Some(id.into()),
            name: Some(name.into()),
        });
    }

    pub async fn set_list_shape(&self, shape: ListShape) {
        *self.state.shape.write().await = shape;
    }

    /// `METHOD /path` lines of every request served so far
    pub async fn requests(&self) -> Vec<String> {
        self.state.requests.read().await.clone()
    }

    /// Serve until the process is stopped
    pub async fn run_until_stopped(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "mock server task failed");
            }
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
