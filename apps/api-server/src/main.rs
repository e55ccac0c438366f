//! api-server — HTTP API for the survey backend.
//!
//! Provides registration/login, questionnaire submission, and the
//! supervisor review view:
//! - Auth: username + SHA-256 password digest checked per request; no
//!   tokens or sessions.
//! - Storage: flat-file JSON snapshots (default) or in-memory when
//!   STORAGE_PROVIDER=memory (the `file` cargo feature gates the adapter).
//! - CORS: Configurable via CORS_ALLOW_ORIGIN (origin string), default `*`.
//!
//! Run:
//! ```bash
//! # pretty logs (default); PORT optional, defaults to 5000
//! cargo run -p api-server
//!
//! # in-memory storage, custom supervisor secret
//! STORAGE_PROVIDER=memory SUPERVISOR_PASSWORD=s3cret cargo run -p api-server
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.

mod config;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use domain::adapters::memory_store::MemoryStore;
use domain::service::{AccountService, SurveyService};
use domain::{Answer, CoreError, PasswordHash, ResponseStore, Submission, UserStore};
use serde::Deserialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Local store abstraction supporting memory or json-file (feature-gated).
enum StoreKind {
    Memory(MemoryStore),
    #[cfg(feature = "file")]
    File(json_file_adapter::JsonFileStore),
}

#[derive(Clone)]
struct AnyStore {
    kind: Arc<StoreKind>,
}

impl AnyStore {
    fn memory() -> Self {
        Self {
            kind: Arc::new(StoreKind::Memory(MemoryStore::new())),
        }
    }

    #[cfg(feature = "file")]
    fn file_from_env() -> Result<Self, CoreError> {
        Ok(Self {
            kind: Arc::new(StoreKind::File(
                json_file_adapter::JsonFileStore::from_env()?,
            )),
        })
    }
}

impl UserStore for AnyStore {
    fn load(&self) -> Result<BTreeMap<String, PasswordHash>, CoreError> {
        match &*self.kind {
            StoreKind::Memory(s) => UserStore::load(s),
            #[cfg(feature = "file")]
            StoreKind::File(s) => UserStore::load(s),
        }
    }

    fn save(&self, users: &BTreeMap<String, PasswordHash>) -> Result<(), CoreError> {
        match &*self.kind {
            StoreKind::Memory(s) => UserStore::save(s, users),
            #[cfg(feature = "file")]
            StoreKind::File(s) => UserStore::save(s, users),
        }
    }
}

impl ResponseStore for AnyStore {
    fn load(&self) -> Result<Vec<Submission>, CoreError> {
        match &*self.kind {
            StoreKind::Memory(s) => ResponseStore::load(s),
            #[cfg(feature = "file")]
            StoreKind::File(s) => ResponseStore::load(s),
        }
    }

    fn save(&self, submissions: &[Submission]) -> Result<(), CoreError> {
        match &*self.kind {
            StoreKind::Memory(s) => ResponseStore::save(s, submissions),
            #[cfg(feature = "file")]
            StoreKind::File(s) => ResponseStore::save(s, submissions),
        }
    }

    fn save_report(&self, report: &str) -> Result<(), CoreError> {
        match &*self.kind {
            StoreKind::Memory(s) => s.save_report(report),
            #[cfg(feature = "file")]
            StoreKind::File(s) => s.save_report(report),
        }
    }
}

#[derive(Clone)]
struct AppState {
    accounts: Arc<AccountService<AnyStore>>,
    survey: Arc<SurveyService<AnyStore>>,
    supervisor_password: Arc<String>,
}

impl AppState {
    fn new(store: AnyStore, supervisor_password: String) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(store.clone())),
            survey: Arc::new(SurveyService::new(store)),
            supervisor_password: Arc::new(supervisor_password),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_insecure();

    let store = build_store_from_env(&cfg);
    let state = AppState::new(store, cfg.supervisor_password.clone());

    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    let mut app = router(state)
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    // CORS - already validated in Config::from_env()
    let cors = if cfg.cors_allow_origin == axum::http::HeaderValue::from_static("*") {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([cfg.cors_allow_origin]))
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    };
    app = app.layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(%addr, "api-server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind port");
    axum::serve(listener, app).await.expect("server error");
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/health", get(health))
        .route("/save_responses", post(save_responses))
        .route("/get_all_responses", get(get_all_responses))
        .route("/check_response/:username", get(check_response))
        .route("/verify_supervisor", post(verify_supervisor))
        .with_state(state)
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

// Construct a store instance based on config and feature flags.
fn build_store_from_env(cfg: &config::Config) -> AnyStore {
    match cfg.storage_provider {
        #[cfg(feature = "file")]
        config::StorageProvider::File => match AnyStore::file_from_env() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to init JsonFileStore from env: {e}");
                AnyStore::memory()
            }
        },
        _ => AnyStore::memory(),
    }
}

#[derive(Deserialize)]
struct CredentialsReq {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

// /save_responses keeps the original wire field names.
#[derive(Deserialize)]
struct SaveResponsesReq {
    #[serde(default)]
    username: String,
    #[serde(default)]
    risposte: RisposteReq,
}

#[derive(Deserialize, Default)]
struct RisposteReq {
    #[serde(default)]
    domande: Vec<DomandaReq>,
}

#[derive(Deserialize)]
struct DomandaReq {
    #[serde(default)]
    domanda: String,
    #[serde(default)]
    risposta: String,
}

#[derive(Deserialize)]
struct SupervisorReq {
    #[serde(default)]
    password: String,
}

/// Map a domain error to status plus `{success:false, message}` body.
fn error_response(err: CoreError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        CoreError::MissingCredentials
        | CoreError::DuplicateUser
        | CoreError::WeakPassword(_)
        | CoreError::IncompleteData
        | CoreError::AlreadySubmitted => StatusCode::BAD_REQUEST,
        CoreError::UnknownUser | CoreError::WrongPassword => StatusCode::UNAUTHORIZED,
        CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(err = %err, "store failure");
    }
    (status, Json(http_common::json_fail(&err.to_string())))
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsReq>,
) -> impl IntoResponse {
    match state.accounts.register(&body.username, &body.password) {
        Ok(username) => {
            info!(user = %username, "register ok");
            (
                StatusCode::CREATED,
                Json(http_common::json_ok(&format!(
                    "User {} registered successfully",
                    username
                ))),
            )
        }
        Err(e) => {
            warn!(err = %e, "register rejected");
            error_response(e)
        }
    }
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsReq>,
) -> impl IntoResponse {
    match state.accounts.authenticate(&body.username, &body.password) {
        Ok(username) => {
            info!(user = %username, "login ok");
            (
                StatusCode::OK,
                Json(http_common::json_ok(&format!("Welcome {}", username))),
            )
        }
        Err(e) => {
            warn!(err = %e, "login rejected");
            error_response(e)
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "online"}))
}

async fn save_responses(
    State(state): State<AppState>,
    Json(body): Json<SaveResponsesReq>,
) -> impl IntoResponse {
    let answers: Vec<Answer> = body
        .risposte
        .domande
        .into_iter()
        .map(|d| Answer {
            question: d.domanda,
            answer: d.risposta,
        })
        .collect();

    match state.survey.submit(&body.username, answers) {
        Ok(sub) => {
            info!(user = %sub.username, answers = sub.answers.len(), "response saved");
            (
                StatusCode::CREATED,
                Json(http_common::json_ok("Response saved successfully")),
            )
        }
        Err(e) => {
            warn!(err = %e, "save_responses rejected");
            error_response(e)
        }
    }
}

async fn get_all_responses(State(state): State<AppState>) -> impl IntoResponse {
    match state.survey.list_all() {
        Ok(subs) => match serde_json::to_value(&subs) {
            Ok(value) => (
                StatusCode::OK,
                Json(http_common::json_ok_with("responses", value)),
            ),
            Err(e) => error_response(CoreError::Store(e.to_string())),
        },
        Err(e) => error_response(e),
    }
}

async fn check_response(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    match state.survey.has_submitted(&username) {
        Ok(submitted) => (
            StatusCode::OK,
            Json(http_common::json_ok_with(
                "submitted",
                serde_json::json!(submitted),
            )),
        ),
        Err(e) => error_response(e),
    }
}

async fn verify_supervisor(
    State(state): State<AppState>,
    Json(body): Json<SupervisorReq>,
) -> impl IntoResponse {
    // Exact string equality against the configured shared secret.
    if body.password != *state.supervisor_password {
        warn!("supervisor verification failed");
        return (
            StatusCode::UNAUTHORIZED,
            Json(http_common::json_fail("wrong supervisor password")),
        );
    }
    info!("supervisor verified");
    match state.survey.list_all() {
        Ok(subs) => match serde_json::to_value(&subs) {
            Ok(value) => (
                StatusCode::OK,
                Json(http_common::json_ok_with("responses", value)),
            ),
            Err(e) => error_response(CoreError::Store(e.to_string())),
        },
        Err(e) => error_response(e),
    }
}
