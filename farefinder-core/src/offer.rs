use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Departure,
    Return,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Departure, Direction::Return];
}

/// A provider offer kept byte-for-byte as received, because pricing needs it back verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawOffer(Value);

impl RawOffer {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Copy of this offer carrying a different id. Everything else is untouched.
    pub fn with_id(&self, id: String) -> Self {
        let mut value = self.0.clone();
        if let Some(object) = value.as_object_mut() {
            object.insert("id".to_string(), Value::String(id));
        }
        Self(value)
    }
}

// ============================================================================
// Decoded (display-ready) offers
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferPrice {
    pub total: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub iata_code: String,
    #[serde(default)]
    pub terminal: Option<String>,
    pub at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub carrier_code: String,
    #[serde(default)]
    pub carrier_name: Option<String>,
    pub flight_number: String,
    #[serde(default)]
    pub aircraft: Option<String>,
    pub departure: Endpoint,
    pub arrival: Endpoint,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub duration_minutes: u32,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    pub id: String,
    pub price: OfferPrice,
    pub itineraries: Vec<Itinerary>,
    #[serde(default)]
    pub validating_carriers: Vec<String>,
    #[serde(default)]
    pub seats_available: Option<u32>,
}

impl FlightOffer {
    /// Stops on the worst itinerary of the offer.
    pub fn stops(&self) -> usize {
        self.itineraries
            .iter()
            .map(|it| it.segments.len().saturating_sub(1))
            .max()
            .unwrap_or(0)
    }

    pub fn total_duration_minutes(&self) -> u32 {
        self.itineraries
            .iter()
            .fold(0u32, |total, it| total.saturating_add(it.duration_minutes))
    }

    pub fn departure_time(&self) -> Option<NaiveDateTime> {
        self.itineraries
            .first()
            .and_then(|it| it.segments.first())
            .map(|s| s.departure.at)
    }

    pub fn arrival_time(&self) -> Option<NaiveDateTime> {
        self.itineraries
            .first()
            .and_then(|it| it.segments.last())
            .map(|s| s.arrival.at)
    }

    pub fn departure_hour(&self) -> Option<u32> {
        self.departure_time().map(|at| at.hour())
    }

    pub fn arrival_hour(&self) -> Option<u32> {
        self.arrival_time().map(|at| at.hour())
    }

    /// Operating carriers in flight order, without duplicates.
    pub fn carriers(&self) -> Vec<&str> {
        let mut carriers: Vec<&str> = Vec::new();
        for segment in self.itineraries.iter().flat_map(|it| it.segments.iter()) {
            if !carriers.contains(&segment.carrier_code.as_str()) {
                carriers.push(&segment.carrier_code);
            }
        }
        carriers
    }
}

/// Parse an ISO-8601 duration such as `PT5H20M` or `P1DT2H` into minutes.
pub fn parse_iso_duration(value: &str) -> Option<u32> {
    let rest = value.strip_prefix('P')?;
    let mut minutes: u32 = 0;
    let mut number = String::new();
    let mut in_time = false;

    for ch in rest.chars() {
        match ch {
            'T' => in_time = true,
            '0'..='9' => number.push(ch),
            unit => {
                let n: u32 = number.parse().ok()?;
                number.clear();
                let part = match (in_time, unit) {
                    (false, 'D') => n.checked_mul(24 * 60)?,
                    (true, 'H') => n.checked_mul(60)?,
                    (true, 'M') => n,
                    (true, 'S') => 0,
                    _ => return None,
                };
                minutes = minutes.checked_add(part)?;
            }
        }
    }

    if number.is_empty() {
        Some(minutes)
    } else {
        None
    }
}

// ============================================================================
// Search results
// ============================================================================

/// Response of `POST /api/amadeus/flightSearch` for one leg.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchResponse {
    #[serde(default)]
    pub raw_flight_offers: Vec<RawOffer>,
    #[serde(default)]
    pub decoded_flight_offers: Vec<FlightOffer>,
}

/// Every offer of the current search, both directions, raw and decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferSet {
    pub raw_departure: Vec<RawOffer>,
    pub raw_return: Vec<RawOffer>,
    pub decoded_departure: Vec<FlightOffer>,
    pub decoded_return: Vec<FlightOffer>,
}

impl OfferSet {
    pub fn from_legs(departure: FlightSearchResponse, inbound: Option<FlightSearchResponse>) -> Self {
        let inbound = inbound.unwrap_or_default();
        Self {
            raw_departure: departure.raw_flight_offers,
            raw_return: inbound.raw_flight_offers,
            decoded_departure: departure.decoded_flight_offers,
            decoded_return: inbound.decoded_flight_offers,
        }
    }

    pub fn raw(&self, direction: Direction) -> &[RawOffer] {
        match direction {
            Direction::Departure => &self.raw_departure,
            Direction::Return => &self.raw_return,
        }
    }

    pub fn decoded(&self, direction: Direction) -> &[FlightOffer] {
        match direction {
            Direction::Departure => &self.decoded_departure,
            Direction::Return => &self.decoded_return,
        }
    }

    pub fn find_raw(&self, direction: Direction, id: &str) -> Option<&RawOffer> {
        self.raw(direction).iter().find(|o| o.id() == Some(id))
    }

    pub fn find_decoded(&self, direction: Direction, id: &str) -> Option<&FlightOffer> {
        self.decoded(direction).iter().find(|o| o.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.decoded_departure.is_empty() && self.decoded_return.is_empty()
    }
}
