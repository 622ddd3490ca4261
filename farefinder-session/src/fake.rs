use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use farefinder_core::location::Address;
use farefinder_core::offer::{Endpoint, Itinerary, OfferPrice, Segment};
use farefinder_core::pricing::PriceMetrics;
use farefinder_core::{
    CoreError, CoreResult, FlightOffer, FlightSearchPayload, FlightSearchResponse,
    LocationCandidate, LocationSubType, PriceAnalysisRequest, PriceAnalysisResponse, RawOffer,
    SearchForm, SearchRequest, TravelDataSource,
};

/// In-memory source. Flight legs are keyed by origin IATA code; an unknown
/// origin answers like a failing upstream.
#[derive(Default)]
pub struct FakeSource {
    locations: Vec<LocationCandidate>,
    legs: HashMap<String, FlightSearchResponse>,
    fail_locations: bool,
    fail_flights: bool,
    fail_price: bool,
    keywords: Mutex<Vec<String>>,
    payloads: Mutex<Vec<FlightSearchPayload>>,
    price_requests: Mutex<Vec<PriceAnalysisRequest>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locations(mut self, locations: Vec<LocationCandidate>) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_leg(mut self, origin: &str, response: FlightSearchResponse) -> Self {
        self.legs.insert(origin.to_string(), response);
        self
    }

    pub fn failing_locations(mut self) -> Self {
        self.fail_locations = true;
        self
    }

    pub fn failing_flights(mut self) -> Self {
        self.fail_flights = true;
        self
    }

    pub fn failing_price(mut self) -> Self {
        self.fail_price = true;
        self
    }

    pub fn location_keywords(&self) -> Vec<String> {
        self.keywords.lock().unwrap().clone()
    }

    pub fn flight_payloads(&self) -> Vec<FlightSearchPayload> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn price_requests(&self) -> Vec<PriceAnalysisRequest> {
        self.price_requests.lock().unwrap().clone()
    }
}

fn upstream_failure() -> CoreError {
    CoreError::UpstreamError { status: 500, message: "fake failure".to_string() }
}

#[async_trait]
impl TravelDataSource for FakeSource {
    async fn search_locations(&self, keyword: &str) -> CoreResult<Vec<LocationCandidate>> {
        self.keywords.lock().unwrap().push(keyword.to_string());
        if self.fail_locations {
            return Err(upstream_failure());
        }
        let needle = keyword.to_uppercase();
        Ok(self
            .locations
            .iter()
            .filter(|c| c.name.contains(&needle) || c.iata_code.contains(&needle))
            .cloned()
            .collect())
    }

    async fn search_flights(&self, payload: &FlightSearchPayload) -> CoreResult<FlightSearchResponse> {
        self.payloads.lock().unwrap().push(payload.clone());
        if self.fail_flights {
            return Err(upstream_failure());
        }
        self.legs.get(&payload.origin).cloned().ok_or_else(upstream_failure)
    }

    async fn analyze_price(&self, request: &PriceAnalysisRequest) -> CoreResult<PriceAnalysisResponse> {
        self.price_requests.lock().unwrap().push(request.clone());
        if self.fail_price {
            return Err(upstream_failure());
        }
        Ok(PriceAnalysisResponse {
            flight_offers_price: serde_json::json!({ "flightOffers": request.raw_offers() }),
            flight_price_analysis: Some(PriceMetrics {
                average: 250.0,
                lowest: 120.0,
                highest: 600.0,
                number_of_prices: 5,
                price_bucket: farefinder_core::pricing::PriceBucket::Typical,
            }),
        })
    }
}

pub fn airport(iata: &str, name: &str) -> LocationCandidate {
    LocationCandidate {
        id: format!("A{}", iata),
        name: name.to_string(),
        iata_code: iata.to_string(),
        sub_type: LocationSubType::Airport,
        address: Address::default(),
        geo_code: None,
        relevance_score: None,
    }
}

pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn segment(carrier: &str, from: &str, to: &str, dep: NaiveDateTime, arr: NaiveDateTime) -> Segment {
    Segment {
        carrier_code: carrier.to_string(),
        carrier_name: None,
        flight_number: "100".to_string(),
        aircraft: None,
        departure: Endpoint { iata_code: from.to_string(), terminal: None, at: dep },
        arrival: Endpoint { iata_code: to.to_string(), terminal: None, at: arr },
        duration_minutes: (arr - dep).num_minutes() as u32,
    }
}

pub fn offer(id: &str, total: f64, segments: Vec<Segment>) -> FlightOffer {
    let duration = segments.iter().map(|s| s.duration_minutes).sum();
    FlightOffer {
        id: id.to_string(),
        price: OfferPrice { total, currency: "USD".to_string() },
        itineraries: vec![Itinerary { duration_minutes: duration, segments }],
        validating_carriers: vec![],
        seats_available: Some(9),
    }
}

pub fn direct(id: &str, total: f64) -> FlightOffer {
    offer(id, total, vec![segment("AA", "JFK", "LAX", at(1, 8, 0), at(1, 11, 30))])
}

pub fn raw(id: &str) -> RawOffer {
    RawOffer::new(serde_json::json!({
        "type": "flight-offer",
        "id": id,
        "source": "GDS",
        "price": { "currency": "USD", "total": "199.00" }
    }))
}

pub fn leg_response(ids: &[&str]) -> FlightSearchResponse {
    FlightSearchResponse {
        raw_flight_offers: ids.iter().map(|id| raw(id)).collect(),
        decoded_flight_offers: ids.iter().map(|id| direct(id, 100.0)).collect(),
    }
}

pub fn round_trip_request() -> SearchRequest {
    let mut form = SearchForm::new();
    form.set_origin(Some(airport("JFK", "JOHN F KENNEDY INTL")));
    form.set_destination(Some(airport("LAX", "LOS ANGELES INTL")));
    form.set_departure_date(NaiveDate::from_ymd_opt(2025, 6, 1));
    form.set_return_date(NaiveDate::from_ymd_opt(2025, 6, 8));
    form.build().unwrap()
}
