use async_trait::async_trait;

use crate::location::LocationCandidate;
use crate::offer::FlightSearchResponse;
use crate::pricing::{PriceAnalysisRequest, PriceAnalysisResponse};
use crate::search::FlightSearchPayload;
use crate::CoreResult;

/// Anything that can answer the three travel-data calls: the HTTP proxy client
/// on the session side, the provider client on the proxy side, and test fakes.
#[async_trait]
pub trait TravelDataSource: Send + Sync {
    /// Airports matching a free-text keyword, best match first
    async fn search_locations(&self, keyword: &str) -> CoreResult<Vec<LocationCandidate>>;

    /// Offers for a single search payload
    async fn search_flights(&self, payload: &FlightSearchPayload) -> CoreResult<FlightSearchResponse>;

    /// Re-price the selected offers and fetch market price metrics for the route
    async fn analyze_price(&self, request: &PriceAnalysisRequest) -> CoreResult<PriceAnalysisResponse>;
}
