use axum::{extract::State, routing::post, Json, Router};
use farefinder_core::{PriceAnalysisRequest, PriceAnalysisResponse};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/amadeus/price", post(analyze_price))
}

/// POST /api/amadeus/price
/// Confirm the price of the selected offers and compare it with the route's market
pub async fn analyze_price(
    State(state): State<AppState>,
    Json(request): Json<PriceAnalysisRequest>,
) -> Result<Json<PriceAnalysisResponse>, AppError> {
    if request.flight_offers.is_empty() {
        return Err(AppError::ValidationError("flightOffers must not be empty".to_string()));
    }

    let mut ids: Vec<&str> = request.flight_offers.iter().filter_map(|t| t.flight_offer.id()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != total || total != request.flight_offers.len() {
        return Err(AppError::ValidationError("flightOffers need unique ids".to_string()));
    }

    let response = state.source.analyze_price(&request).await?;
    Ok(Json(response))
}
