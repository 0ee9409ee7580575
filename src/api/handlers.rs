//! API Handlers
//!
//! HTTP request handlers exposing the cache facade to local consumers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::{build_key, Identifier, TieredCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::requests::validate_type_tag;
use crate::models::{
    GetResponse, HealthResponse, InvalidateResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::storage::FileStore;

/// Application state shared across all handlers.
///
/// Holds the cache behind a single `RwLock` so each get, set, sweep or
/// invalidation is applied atomically.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RwLock<TieredCache>>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: TieredCache) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Opens the file-backed durable store and builds the cache from it.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = FileStore::open(&config.storage_dir, config.storage_quota_bytes)?;
        let cache = TieredCache::new(&config.cache, Arc::new(store));
        Ok(Self::new(cache))
    }
}

/// Handler for GET /entries/:type_tag/:id
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path((type_tag, id)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    read_entry(&state, &type_tag, Identifier::Id(id)).await
}

/// Handler for GET /entries/:type_tag?param=value
///
/// The query map is the structured identifier.
pub async fn get_entry_by_params_handler(
    State(state): State<AppState>,
    Path(type_tag): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<GetResponse>> {
    read_entry(&state, &type_tag, Identifier::params(&params)).await
}

/// Handler for PUT /entries/:type_tag/:id
pub async fn set_entry_handler(
    State(state): State<AppState>,
    Path((type_tag, id)): Path<(String, String)>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    write_entry(&state, &type_tag, Identifier::Id(id), req).await
}

/// Handler for PUT /entries/:type_tag?param=value
pub async fn set_entry_by_params_handler(
    State(state): State<AppState>,
    Path(type_tag): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    write_entry(&state, &type_tag, Identifier::params(&params), req).await
}

/// Handler for DELETE /entries
pub async fn invalidate_all_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let removed = state.cache.write().await.invalidate_all();
    Json(InvalidateResponse::all(removed))
}

/// Handler for DELETE /entries/:type_tag
pub async fn invalidate_type_handler(
    State(state): State<AppState>,
    Path(type_tag): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = validate_type_tag(&type_tag) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = state.cache.write().await.invalidate_by_type(&type_tag);
    Ok(Json(InvalidateResponse::by_type(&type_tag, removed)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

async fn read_entry(
    state: &AppState,
    type_tag: &str,
    identifier: Identifier,
) -> Result<Json<GetResponse>> {
    if let Some(error_msg) = validate_type_tag(type_tag) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = build_key(type_tag, &identifier);

    // Write lock: a get updates access counters and stats
    let mut cache = state.cache.write().await;
    match cache.get::<Value>(type_tag, identifier) {
        Some(data) => Ok(Json(GetResponse::new(key, data))),
        None => Err(CacheError::NotFound(key)),
    }
}

async fn write_entry(
    state: &AppState,
    type_tag: &str,
    identifier: Identifier,
    req: SetRequest,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = validate_type_tag(type_tag).or_else(|| req.validate()) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = build_key(type_tag, &identifier);

    let mut cache = state.cache.write().await;
    cache.set(type_tag, identifier, &req.data);

    Ok(Json(SetResponse::new(key)))
}
