use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use server_api::{
    create_entry, delete_entry, list_entries, reorder_entry, update_entry, ApiContext,
};
use shared::{
    domain::{CollectionKind, EntryId},
    error::{ApiError, ErrorCode},
    protocol::{CreateEntryRequest, EntryPayload, ReorderEntryRequest, UpdateEntryRequest},
};
use storage::Storage;
use tracing::{error, info};

mod config;

use config::{load_settings, normalize_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext { storage };

    let state = AppState { api };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "content server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/collections/:collection/entries", get(http_list_entries))
        .route("/collections/:collection/entries", post(http_create_entry))
        .route(
            "/collections/:collection/entries/:id",
            put(http_update_entry).delete(http_delete_entry),
        )
        .route(
            "/collections/:collection/entries/:id/reorder",
            post(http_reorder_entry),
        )
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn parse_collection(slug: &str) -> Result<CollectionKind, (StatusCode, Json<ApiError>)> {
    CollectionKind::from_slug(slug).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                ErrorCode::NotFound,
                format!("unknown collection '{slug}'"),
            )),
        )
    })
}

fn error_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

async fn http_list_entries(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
) -> Result<Json<Vec<EntryPayload>>, (StatusCode, Json<ApiError>)> {
    let collection = parse_collection(&collection)?;
    let entries = list_entries(&state.api, collection)
        .await
        .map_err(error_response)?;
    Ok(Json(entries))
}

async fn http_create_entry(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Json(request): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryPayload>), (StatusCode, Json<ApiError>)> {
    let collection = parse_collection(&collection)?;
    let entry = create_entry(&state.api, collection, request)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn http_update_entry(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(request): Json<UpdateEntryRequest>,
) -> Result<Json<EntryPayload>, (StatusCode, Json<ApiError>)> {
    let collection = parse_collection(&collection)?;
    let entry = update_entry(&state.api, collection, &EntryId(id), request)
        .await
        .map_err(error_response)?;
    Ok(Json(entry))
}

async fn http_delete_entry(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let collection = parse_collection(&collection)?;
    delete_entry(&state.api, collection, &EntryId(id))
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_reorder_entry(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(request): Json<ReorderEntryRequest>,
) -> Result<Json<Vec<EntryPayload>>, (StatusCode, Json<ApiError>)> {
    let collection = parse_collection(&collection)?;
    let entries = reorder_entry(&state.api, collection, &EntryId(id), request.direction)
        .await
        .map_err(error_response)?;
    Ok(Json(entries))
}
