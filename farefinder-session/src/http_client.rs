use async_trait::async_trait;
use farefinder_core::{
    CoreError, CoreResult, FlightSearchPayload, FlightSearchResponse, LocationCandidate,
    PriceAnalysisRequest, PriceAnalysisResponse, TravelDataSource,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::SessionConfig;

/// Talks to the proxy's `/api/amadeus/*` endpoints.
#[derive(Clone)]
pub struct HttpTravelClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTravelClient {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.base_url.clone())
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/amadeus/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Non-2xx becomes an `UpstreamError` carrying the body text.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> CoreResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        warn!("Proxy returned {}: {}", status, message);
        return Err(CoreError::UpstreamError {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| CoreError::DecodeError(e.to_string()))
}

fn network(err: reqwest::Error) -> CoreError {
    CoreError::NetworkError(err.to_string())
}

#[async_trait]
impl TravelDataSource for HttpTravelClient {
    async fn search_locations(&self, keyword: &str) -> CoreResult<Vec<LocationCandidate>> {
        debug!("GET locations keyword={}", keyword);
        let response = self
            .http
            .get(self.endpoint("locations"))
            .query(&[("keyword", keyword)])
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }

    async fn search_flights(&self, payload: &FlightSearchPayload) -> CoreResult<FlightSearchResponse> {
        debug!("POST flightSearch {} -> {}", payload.origin, payload.destination);
        let response = self
            .http
            .post(self.endpoint("flightSearch"))
            .json(payload)
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }

    async fn analyze_price(&self, request: &PriceAnalysisRequest) -> CoreResult<PriceAnalysisResponse> {
        debug!("POST price with {} offers", request.flight_offers.len());
        let response = self
            .http
            .post(self.endpoint("price"))
            .json(request)
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = HttpTravelClient::with_client(reqwest::Client::new(), "http://localhost:3000/");
        assert_eq!(client.endpoint("locations"), "http://localhost:3000/api/amadeus/locations");

        let client = HttpTravelClient::new(&SessionConfig::default());
        assert_eq!(client.endpoint("price"), "http://localhost:3000/api/amadeus/price");
    }
}
