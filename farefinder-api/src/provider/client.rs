use std::sync::Arc;

use async_trait::async_trait;
use farefinder_core::location::rank_candidates;
use farefinder_core::{
    CoreError, CoreResult, FlightSearchPayload, FlightSearchResponse, LocationCandidate,
    PriceAnalysisRequest, PriceAnalysisResponse, TravelDataSource,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::model::{
    decode_offers, priced_total, summarize_metrics, FlightOffersResponse, LocationsResponse,
    MetricsResponse, ProviderLocation,
};
use super::token::TokenProvider;
use crate::app_config::SearchSettings;

/// Amadeus self-service API client. Holds the only copy of the credentials.
pub struct AmadeusClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenProvider>,
    settings: SearchSettings,
}

impl AmadeusClient {
    pub fn new(http: reqwest::Client, base_url: &str, tokens: Arc<TokenProvider>, settings: SearchSettings) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            settings,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send with a bearer token. A 401 drops the cached token and retries once.
    async fn send<T, F>(&self, build: F) -> CoreResult<T>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let mut retried = false;
        loop {
            let token = self.tokens.access_token().await?;
            let response = build(&self.http)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| CoreError::NetworkError(e.to_string()))?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !retried {
                warn!("Provider rejected access token, refreshing");
                self.tokens.invalidate().await;
                retried = true;
                continue;
            }
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(CoreError::UpstreamError { status: status.as_u16(), message });
            }

            return response
                .json::<T>()
                .await
                .map_err(|e| CoreError::DecodeError(e.to_string()));
        }
    }

    async fn price_metrics(&self, request: &PriceAnalysisRequest) -> CoreResult<MetricsResponse> {
        let url = self.url("/v1/analytics/itinerary-price-metrics");
        let query = metrics_query(request, &self.settings.currency);
        self.send(|http| http.get(&url).query(&query)).await
    }
}

fn search_query(payload: &FlightSearchPayload, settings: &SearchSettings) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("originLocationCode", payload.origin.clone()),
        ("destinationLocationCode", payload.destination.clone()),
        ("departureDate", payload.departure_date.clone()),
        ("adults", payload.travelers.adults.to_string()),
    ];
    if let Some(return_date) = &payload.return_date {
        query.push(("returnDate", return_date.clone()));
    }
    if payload.travelers.children > 0 {
        query.push(("children", payload.travelers.children.to_string()));
    }
    if payload.travelers.infants > 0 {
        query.push(("infants", payload.travelers.infants.to_string()));
    }
    if let Some(class) = payload.travel_class {
        query.push(("travelClass", class.as_str().to_string()));
    }
    query.push(("nonStop", payload.non_stop.to_string()));
    query.push(("currencyCode", settings.currency.clone()));
    query.push(("max", settings.max_results.to_string()));
    query
}

fn metrics_query(request: &PriceAnalysisRequest, currency: &str) -> Vec<(&'static str, String)> {
    vec![
        ("originIataCode", request.origin.clone()),
        ("destinationIataCode", request.destination.clone()),
        ("departureDate", request.departure_date.clone()),
        ("currencyCode", currency.to_string()),
        ("oneWay", request.one_way.to_string()),
    ]
}

fn pricing_body(request: &PriceAnalysisRequest) -> Value {
    json!({
        "data": {
            "type": "flight-offers-pricing",
            "flightOffers": request.raw_offers(),
        }
    })
}

#[async_trait]
impl TravelDataSource for AmadeusClient {
    async fn search_locations(&self, keyword: &str) -> CoreResult<Vec<LocationCandidate>> {
        let url = self.url("/v1/reference-data/locations");
        let limit = self.settings.location_limit.to_string();
        let response: LocationsResponse = self
            .send(|http| {
                http.get(&url).query(&[
                    ("subType", "AIRPORT"),
                    ("keyword", keyword),
                    ("page[limit]", limit.as_str()),
                ])
            })
            .await?;

        let candidates = response
            .data
            .into_iter()
            .filter_map(ProviderLocation::into_candidate)
            .collect();
        let ranked = rank_candidates(candidates);
        debug!("Location lookup '{}' returned {} candidates", keyword, ranked.len());
        Ok(ranked)
    }

    async fn search_flights(&self, payload: &FlightSearchPayload) -> CoreResult<FlightSearchResponse> {
        let url = self.url("/v2/shopping/flight-offers");
        let query = search_query(payload, &self.settings);
        let response: FlightOffersResponse = self.send(|http| http.get(&url).query(&query)).await?;

        let offers = decode_offers(response.data, &response.dictionaries);
        info!(
            "Flight search {} -> {} on {} returned {} offers",
            payload.origin,
            payload.destination,
            payload.departure_date,
            offers.decoded_flight_offers.len()
        );
        Ok(offers)
    }

    async fn analyze_price(&self, request: &PriceAnalysisRequest) -> CoreResult<PriceAnalysisResponse> {
        let url = self.url("/v1/shopping/flight-offers/pricing");
        let body = pricing_body(request);
        let flight_offers_price: Value = self.send(|http| http.post(&url).json(&body)).await?;

        // Market comparison is best effort; the confirmed price stands on its own
        let flight_price_analysis = match self.price_metrics(request).await {
            Ok(metrics) => metrics
                .data
                .first()
                .and_then(|m| summarize_metrics(&m.price_metrics, priced_total(&flight_offers_price))),
            Err(err) => {
                warn!("Price metrics unavailable for {} -> {}: {}", request.origin, request.destination, err);
                None
            }
        };

        Ok(PriceAnalysisResponse {
            flight_offers_price,
            flight_price_analysis,
        })
    }
}
