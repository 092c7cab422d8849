use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Query, State,
        multipart::{Multipart, MultipartError, MultipartRejection},
    },
    http::{self, HeaderName, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
};
use platform_api::{ApiError, ApiResult};
use platform_db::DbPool;
use products_hr::{Employee, HrModule, ImportSummary};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::AppConfig;

const FILE_FIELD: &str = "file";
const FILE_MISSING: &str = "File not provided.";

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub hr: HrModule,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Arc<AppConfig>) -> Self {
        Self {
            hr: HrModule::new(pool.clone()),
            pool,
            config,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "hr server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/employees", get(search_handler))
        .route("/api/employees/upload", post(upload_handler))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuery {
    search_term: Option<String>,
}

async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Employee>>> {
    let employees = state
        .hr
        .search(query.search_term.as_deref())
        .await
        .map_err(|err| ApiError::internal(err.into()))?;
    Ok(Json(employees))
}

async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportSummary>> {
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::invalid_input(FILE_MISSING));
    };
    let bytes = read_file_field(&mut multipart).await?;
    info!(bytes = bytes.len(), "employee workbook received");
    let summary = state.hr.import_workbook(bytes).await?;
    Ok(Json(summary))
}

/// Bytes of the first non-empty `file` part.
async fn read_file_field(multipart: &mut Multipart) -> ApiResult<Vec<u8>> {
    while let Some(field) = multipart.next_field().await.map_err(unreadable_upload)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let bytes = field.bytes().await.map_err(unreadable_upload)?;
        if !bytes.is_empty() {
            return Ok(bytes.to_vec());
        }
    }
    Err(ApiError::invalid_input(FILE_MISSING))
}

fn unreadable_upload(err: MultipartError) -> ApiError {
    ApiError::invalid_input(format!("Upload could not be read: {}", err.body_text()))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = platform_db::ping(&state.pool).await;
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
