//! WellTrack Sync Server
//!
//! A document store the WellTrack CLI pushes wellness and exercise entries
//! to, enabling multi-device access.
//!
//! # Configuration
//!
//! Environment variables:
//! - `WELLTRACK_SERVER_PORT`: Port to listen on (default: 8080)
//! - `WELLTRACK_SERVER_DATA_DIR`: Directory for the SQLite database
//!   (default: ~/.local/share/welltrack-server)
//!
//! # Endpoints
//!
//! - `GET /health`: Health check endpoint (no auth required)
//! - `POST /auth/register`: Create an account, returns an API key
//! - `POST /auth/login`: Exchange credentials for the API key
//! - `PUT /collections/{collection}/documents/{id}`: Upsert a document
//!   (auth required)

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Extension, Json, Router,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Collections the server accepts writes to.
const COLLECTIONS: [&str; 2] = ["wellness_entries", "exercise_entries"];

// ============================================================================
// Configuration
// ============================================================================

/// Server configuration
#[derive(Debug, Clone)]
struct Config {
    /// Port to listen on
    port: u16,
    /// Directory holding the server database
    data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let port = std::env::var("WELLTRACK_SERVER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let data_dir = std::env::var("WELLTRACK_SERVER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("welltrack-server")
            });

        Self { port, data_dir }
    }
}

// ============================================================================
// Database
// ============================================================================

async fn init_db(data_dir: &std::path::Path) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(data_dir.join("welltrack-server.db"))
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            api_key TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            document_id TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            fields TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (collection, document_id)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

// ============================================================================
// Authentication
// ============================================================================

/// Authenticated user info, added to request extensions after auth
#[derive(Debug, Clone)]
struct AuthUser {
    user_id: String,
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Salted password hash stored as "salt$hash".
fn hash_password(password: &str) -> String {
    let salt = random_hex(16);
    format!("{}${}", salt, digest(&salt, password))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, hash)) => digest(salt, password) == hash,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    pool: SqlitePool,
}

/// Error response body
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

fn error_response(status: StatusCode, error: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error,
            message: message.into(),
        }),
    )
        .into_response()
}

fn internal_error(e: sqlx::Error) -> Response {
    tracing::error!("database error: {}", e);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        "internal server error",
    )
}

/// Authentication middleware
async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let api_key = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        Some(_) => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "invalid_auth",
                "Authorization header must use Bearer scheme",
            );
        }
        None => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Authorization header required",
            );
        }
    };

    let user: Option<(String,)> = match sqlx::query_as("SELECT user_id FROM users WHERE api_key = ?")
        .bind(api_key)
        .fetch_optional(&state.pool)
        .await
    {
        Ok(row) => row,
        Err(e) => return internal_error(e),
    };

    match user {
        Some((user_id,)) => {
            request.extensions_mut().insert(AuthUser { user_id });
            next.run(request).await
        }
        None => error_response(StatusCode::UNAUTHORIZED, "invalid_key", "Invalid API key"),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required)
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct AuthResponse {
    user_id: String,
    api_key: String,
}

/// Create an account and issue an API key
async fn register(State(state): State<AppState>, Json(creds): Json<Credentials>) -> Response {
    if creds.email.is_empty() || creds.password.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "email and password are required",
        );
    }

    let existing: Option<(String,)> =
        match sqlx::query_as("SELECT user_id FROM users WHERE email = ?")
            .bind(&creds.email)
            .fetch_optional(&state.pool)
            .await
        {
            Ok(row) => row,
            Err(e) => return internal_error(e),
        };
    if existing.is_some() {
        return error_response(
            StatusCode::CONFLICT,
            "email_taken",
            "an account with this email already exists",
        );
    }

    let user_id = random_hex(8);
    let api_key = random_hex(32);

    let result =
        sqlx::query("INSERT INTO users (user_id, email, password_hash, api_key) VALUES (?, ?, ?, ?)")
            .bind(&user_id)
            .bind(&creds.email)
            .bind(hash_password(&creds.password))
            .bind(&api_key)
            .execute(&state.pool)
            .await;
    if let Err(e) = result {
        return internal_error(e);
    }

    tracing::info!("registered user {}", user_id);
    (StatusCode::CREATED, Json(AuthResponse { user_id, api_key })).into_response()
}

/// Exchange credentials for the account's API key
async fn login(State(state): State<AppState>, Json(creds): Json<Credentials>) -> Response {
    let row: Option<(String, String, String)> = match sqlx::query_as(
        "SELECT user_id, password_hash, api_key FROM users WHERE email = ?",
    )
    .bind(&creds.email)
    .fetch_optional(&state.pool)
    .await
    {
        Ok(row) => row,
        Err(e) => return internal_error(e),
    };

    match row {
        Some((user_id, password_hash, api_key)) if verify_password(&creds.password, &password_hash) => {
            (StatusCode::OK, Json(AuthResponse { user_id, api_key })).into_response()
        }
        _ => error_response(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid email or password",
        ),
    }
}

/// Upsert a document into a collection (auth required)
async fn upsert_document(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((collection, document_id)): Path<(String, String)>,
    Json(fields): Json<serde_json::Map<String, serde_json::Value>>,
) -> Response {
    if !COLLECTIONS.contains(&collection.as_str()) {
        return error_response(
            StatusCode::NOT_FOUND,
            "unknown_collection",
            format!("unknown collection '{}'", collection),
        );
    }

    let fields_json = match serde_json::to_string(&fields) {
        Ok(json) => json,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                format!("invalid document body: {}", e),
            );
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO documents (collection, document_id, owner_id, fields, updated_at)
        VALUES (?, ?, ?, ?, datetime('now'))
        ON CONFLICT (collection, document_id)
        DO UPDATE SET owner_id = excluded.owner_id,
                      fields = excluded.fields,
                      updated_at = excluded.updated_at
        "#,
    )
    .bind(&collection)
    .bind(&document_id)
    .bind(&user.user_id)
    .bind(&fields_json)
    .execute(&state.pool)
    .await;
    if let Err(e) = result {
        return internal_error(e);
    }

    tracing::debug!("upserted {}/{} for {}", collection, document_id, user.user_id);
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "welltrack_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        tracing::error!("Failed to create data directory: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Data directory: {}", config.data_dir.display());

    let pool = match init_db(&config.data_dir).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState { pool };

    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/collections/{collection}/documents/{document_id}",
            put(upsert_document),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
