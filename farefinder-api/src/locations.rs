use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use farefinder_core::LocationCandidate;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub keyword: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/amadeus/locations", get(search_locations))
}

/// GET /api/amadeus/locations?keyword=<text>
/// Airports matching the keyword, best match first
pub async fn search_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Vec<LocationCandidate>>, AppError> {
    let keyword = query.keyword.as_deref().map(str::trim).unwrap_or_default();
    if keyword.is_empty() {
        return Err(AppError::ValidationError("keyword is required".to_string()));
    }

    let candidates = state.source.search_locations(keyword).await?;
    tracing::debug!("{} candidates for {:?}", candidates.len(), keyword);
    Ok(Json(candidates))
}
