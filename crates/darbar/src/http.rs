use crate::favorites::{FavoriteItem, FavoriteKind, FavoritesStore};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use darbar_archive::entry::sort_entries;
use darbar_archive::explorer::{Explorer, ExplorerView, LoadOutcome, Selection, Tab};
use darbar_archive::{ArchiveClient, ArchiveRoots, DirectoryEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct HttpState {
    pub client: Arc<ArchiveClient>,
    pub explorer: Arc<Explorer>,
    pub favorites: Arc<FavoritesStore>,
    pub stream_url: String,
}

#[derive(Serialize)]
struct RootsResponse {
    #[serde(flatten)]
    roots: ArchiveRoots,
    stream: String,
}

#[derive(Deserialize)]
struct UrlQuery {
    url: String,
}

#[derive(Deserialize)]
struct FilterQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
struct NewFavorite {
    title: String,
    url: String,
    #[serde(rename = "type", default = "default_kind")]
    kind: FavoriteKind,
}

fn default_kind() -> FavoriteKind {
    FavoriteKind::Remote
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api/roots", get(get_roots))
        .route("/api/directory", get(get_directory))
        .route("/api/explorer", get(get_explorer))
        .route("/api/explorer/tab/:tab", post(select_tab))
        .route("/api/explorer/open", post(open_folder))
        .route("/api/explorer/select/:idx", post(select_entry))
        .route("/api/explorer/back", post(go_back))
        .route("/api/explorer/filter", post(set_filter))
        .route("/api/favorites", get(list_favorites).post(add_favorite))
        .route("/api/favorites/:id", delete(remove_favorite))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn start_server(bind_address: String, port: u16, state: HttpState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let app = router(state);

        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind HTTP server to {}: {}", addr, e);
                return;
            }
        };

        info!("HTTP API server listening on http://{}", addr);

        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    })
}

async fn get_roots(State(state): State<HttpState>) -> Json<RootsResponse> {
    Json(RootsResponse {
        roots: state.client.roots().clone(),
        stream: state.stream_url.clone(),
    })
}

/// Always 200: an unreachable folder is just empty.
async fn get_directory(
    State(state): State<HttpState>,
    Query(query): Query<UrlQuery>,
) -> Json<Vec<DirectoryEntry>> {
    let mut entries = state.client.fetch_directory(&query.url).await;
    sort_entries(&mut entries);
    Json(entries)
}

async fn get_explorer(State(state): State<HttpState>) -> Json<ExplorerView> {
    Json(state.explorer.snapshot().await)
}

async fn select_tab(
    State(state): State<HttpState>,
    Path(tab): Path<String>,
) -> Result<Json<LoadOutcome>, StatusCode> {
    let tab = Tab::from_name(&tab).ok_or(StatusCode::NOT_FOUND)?;
    info!("HTTP API: tab {:?}", tab);
    Ok(Json(state.explorer.select_tab(tab).await))
}

async fn open_folder(
    State(state): State<HttpState>,
    Query(query): Query<UrlQuery>,
) -> Json<LoadOutcome> {
    info!("HTTP API: open {}", query.url);
    Json(state.explorer.open(&query.url).await)
}

async fn select_entry(
    State(state): State<HttpState>,
    Path(idx): Path<usize>,
) -> Result<Json<Selection>, StatusCode> {
    state
        .explorer
        .select(idx)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn go_back(State(state): State<HttpState>) -> Result<Json<LoadOutcome>, StatusCode> {
    state
        .explorer
        .back()
        .await
        .map(Json)
        .ok_or(StatusCode::CONFLICT)
}

async fn set_filter(
    State(state): State<HttpState>,
    Query(query): Query<FilterQuery>,
) -> Json<ExplorerView> {
    state.explorer.set_filter(&query.q).await;
    Json(state.explorer.snapshot().await)
}

async fn list_favorites(
    State(state): State<HttpState>,
) -> Result<Json<Vec<FavoriteItem>>, StatusCode> {
    state.favorites.list().await.map(Json).map_err(|e| {
        error!("Failed to list favorites: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn add_favorite(
    State(state): State<HttpState>,
    Json(body): Json<NewFavorite>,
) -> Result<(StatusCode, Json<FavoriteItem>), StatusCode> {
    let item = state
        .favorites
        .add(&body.title, body.kind, &body.url)
        .await
        .map_err(|e| {
            error!("Failed to add favorite: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn remove_favorite(State(state): State<HttpState>, Path(id): Path<String>) -> StatusCode {
    match state.favorites.remove(&id).await {
        Ok(true) => StatusCode::NO_CONTENT,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(e) => {
            error!("Failed to remove favorite: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
