use axum::{extract::State, routing::post, Json, Router};
use farefinder_core::{FlightSearchPayload, FlightSearchResponse};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/amadeus/flightSearch", post(search_flights))
}

/// POST /api/amadeus/flightSearch
/// Raw and decoded offers for one search payload
pub async fn search_flights(
    State(state): State<AppState>,
    Json(payload): Json<FlightSearchPayload>,
) -> Result<Json<FlightSearchResponse>, AppError> {
    payload.validate()?;

    tracing::info!(
        "Flight search {} -> {} on {} (return {:?})",
        payload.origin,
        payload.destination,
        payload.departure_date,
        payload.return_date
    );

    let response = state.source.search_flights(&payload).await?;
    if response.decoded_flight_offers.is_empty() {
        tracing::info!("No offers for {} -> {}", payload.origin, payload.destination);
    }
    Ok(Json(response))
}
