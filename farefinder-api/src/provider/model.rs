use std::collections::HashMap;

use chrono::NaiveDateTime;
use farefinder_core::location::{Address, GeoCode};
use farefinder_core::offer::{parse_iso_duration, Endpoint, Itinerary, OfferPrice, Segment};
use farefinder_core::pricing::{PriceBucket, PriceMetrics};
use farefinder_core::{
    CoreError, CoreResult, FlightOffer, FlightSearchResponse, LocationCandidate, LocationSubType,
    RawOffer,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

// ============================================================================
// Reference data: locations
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LocationsResponse {
    #[serde(default)]
    pub data: Vec<ProviderLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLocation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub iata_code: Option<String>,
    pub sub_type: String,
    #[serde(default)]
    pub address: Option<ProviderAddress>,
    #[serde(default)]
    pub geo_code: Option<GeoCode>,
    #[serde(default)]
    pub analytics: Option<Analytics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAddress {
    pub city_name: Option<String>,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Analytics {
    pub travelers: Option<TravelerScore>,
}

#[derive(Debug, Deserialize)]
pub struct TravelerScore {
    pub score: f64,
}

impl ProviderLocation {
    /// `None` for records we cannot search on: no IATA code or an unknown sub type.
    pub fn into_candidate(self) -> Option<LocationCandidate> {
        let sub_type = match self.sub_type.as_str() {
            "AIRPORT" => LocationSubType::Airport,
            "CITY" => LocationSubType::City,
            _ => return None,
        };
        let iata_code = self.iata_code.filter(|code| !code.trim().is_empty())?;
        let address = self
            .address
            .map(|a| Address {
                city_name: a.city_name,
                country_name: a.country_name,
                country_code: a.country_code,
            })
            .unwrap_or_default();

        Some(LocationCandidate {
            id: self.id,
            name: self.name,
            iata_code,
            sub_type,
            address,
            geo_code: self.geo_code,
            relevance_score: self.analytics.and_then(|a| a.travelers).map(|t| t.score),
        })
    }
}

// ============================================================================
// Shopping: flight offers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FlightOffersResponse {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub dictionaries: Dictionaries,
}

/// Code-to-name lookups shipped alongside offers.
#[derive(Debug, Default, Deserialize)]
pub struct Dictionaries {
    #[serde(default)]
    pub carriers: HashMap<String, String>,
    #[serde(default)]
    pub aircraft: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOffer {
    id: String,
    price: WirePrice,
    itineraries: Vec<WireItinerary>,
    #[serde(default)]
    validating_airline_codes: Vec<String>,
    #[serde(default)]
    number_of_bookable_seats: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePrice {
    currency: String,
    total: String,
    #[serde(default)]
    grand_total: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireItinerary {
    #[serde(default)]
    duration: Option<String>,
    segments: Vec<WireSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSegment {
    departure: WireEndpoint,
    arrival: WireEndpoint,
    carrier_code: String,
    number: String,
    #[serde(default)]
    aircraft: Option<WireAircraft>,
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEndpoint {
    iata_code: String,
    #[serde(default)]
    terminal: Option<String>,
    at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct WireAircraft {
    code: String,
}

fn parse_amount(value: &str) -> CoreResult<f64> {
    value
        .parse::<f64>()
        .map_err(|_| CoreError::DecodeError(format!("Invalid amount: {}", value)))
}

fn elapsed_minutes(departure: NaiveDateTime, arrival: NaiveDateTime) -> u32 {
    u32::try_from((arrival - departure).num_minutes().max(0)).unwrap_or(u32::MAX)
}

/// Turn one raw provider offer into its display form, resolving names from the dictionaries.
pub fn decode_offer(raw: &Value, dictionaries: &Dictionaries) -> CoreResult<FlightOffer> {
    let wire: WireOffer = serde_json::from_value(raw.clone())
        .map_err(|e| CoreError::DecodeError(e.to_string()))?;

    let total = parse_amount(wire.price.grand_total.as_deref().unwrap_or(&wire.price.total))?;

    let itineraries = wire
        .itineraries
        .into_iter()
        .map(|itinerary| {
            let segments: Vec<Segment> = itinerary
                .segments
                .into_iter()
                .map(|s| {
                    let duration_minutes = s
                        .duration
                        .as_deref()
                        .and_then(parse_iso_duration)
                        .unwrap_or_else(|| elapsed_minutes(s.departure.at, s.arrival.at));
                    let aircraft = s.aircraft.map(|a| {
                        dictionaries.aircraft.get(&a.code).cloned().unwrap_or(a.code)
                    });
                    Segment {
                        carrier_name: dictionaries.carriers.get(&s.carrier_code).cloned(),
                        aircraft,
                        flight_number: format!("{}{}", s.carrier_code, s.number),
                        carrier_code: s.carrier_code,
                        departure: Endpoint {
                            iata_code: s.departure.iata_code,
                            terminal: s.departure.terminal,
                            at: s.departure.at,
                        },
                        arrival: Endpoint {
                            iata_code: s.arrival.iata_code,
                            terminal: s.arrival.terminal,
                            at: s.arrival.at,
                        },
                        duration_minutes,
                    }
                })
                .collect();
            let duration_minutes = itinerary
                .duration
                .as_deref()
                .and_then(parse_iso_duration)
                .unwrap_or_else(|| {
                    segments
                        .iter()
                        .try_fold(0u32, |total, s| total.checked_add(s.duration_minutes))
                        .unwrap_or(u32::MAX)
                });
            Itinerary { duration_minutes, segments }
        })
        .collect();

    Ok(FlightOffer {
        id: wire.id,
        price: OfferPrice { total, currency: wire.price.currency },
        itineraries,
        validating_carriers: wire.validating_airline_codes,
        seats_available: wire.number_of_bookable_seats,
    })
}

/// Decode every offer of one search. An offer that fails to decode is dropped
/// from both lists so raw and decoded stay index-aligned.
pub fn decode_offers(data: Vec<Value>, dictionaries: &Dictionaries) -> FlightSearchResponse {
    let mut response = FlightSearchResponse::default();
    for raw in data {
        match decode_offer(&raw, dictionaries) {
            Ok(offer) => {
                response.decoded_flight_offers.push(offer);
                response.raw_flight_offers.push(RawOffer::new(raw));
            }
            Err(err) => {
                let id = raw.get("id").and_then(Value::as_str).unwrap_or("?");
                warn!("Skipping undecodable offer {}: {}", id, err);
            }
        }
    }
    response
}

// ============================================================================
// Pricing and analytics
// ============================================================================

/// Sum of `grandTotal` (or `total`) over the priced offers.
pub fn priced_total(pricing: &Value) -> Option<f64> {
    let offers = pricing.get("data")?.get("flightOffers")?.as_array()?;
    let mut sum = 0.0;
    for offer in offers {
        let price = offer.get("price")?;
        let amount = price
            .get("grandTotal")
            .or_else(|| price.get("total"))?
            .as_str()?
            .parse::<f64>()
            .ok()?;
        sum += amount;
    }
    Some(sum)
}

#[derive(Debug, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub data: Vec<ItineraryMetrics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryMetrics {
    #[serde(default)]
    pub price_metrics: Vec<PriceMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceMetric {
    pub amount: String,
    pub quartile_ranking: String,
}

/// Reduce the route's quartile ranking to the summary shown next to an offer.
/// Needs at least the minimum, median and maximum points.
pub fn summarize_metrics(metrics: &[PriceMetric], priced_total: Option<f64>) -> Option<PriceMetrics> {
    let point = |rank: &str| {
        metrics
            .iter()
            .find(|m| m.quartile_ranking == rank)
            .and_then(|m| m.amount.parse::<f64>().ok())
    };

    let lowest = point("MINIMUM")?;
    let average = point("MEDIUM")?;
    let highest = point("MAXIMUM")?;
    let first = point("FIRST").unwrap_or(lowest);
    let third = point("THIRD").unwrap_or(highest);

    let price_bucket = match priced_total {
        Some(total) => PriceBucket::classify(total, first, third),
        None => PriceBucket::Typical,
    };

    Some(PriceMetrics {
        average,
        lowest,
        highest,
        number_of_prices: metrics.len() as u32,
        price_bucket,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_offer() -> Value {
        json!({
            "type": "flight-offer",
            "id": "1",
            "source": "GDS",
            "numberOfBookableSeats": 4,
            "itineraries": [{
                "duration": "PT8H10M",
                "segments": [
                    {
                        "departure": { "iataCode": "JFK", "terminal": "8", "at": "2025-06-01T07:00:00" },
                        "arrival": { "iataCode": "ORD", "at": "2025-06-01T09:05:00" },
                        "carrierCode": "AA",
                        "number": "123",
                        "aircraft": { "code": "738" },
                        "duration": "PT3H5M"
                    },
                    {
                        "departure": { "iataCode": "ORD", "at": "2025-06-01T10:30:00" },
                        "arrival": { "iataCode": "LAX", "at": "2025-06-01T12:10:00" },
                        "carrierCode": "AA",
                        "number": "456",
                        "aircraft": { "code": "XYZ" }
                    }
                ]
            }],
            "price": { "currency": "USD", "total": "310.40", "grandTotal": "320.40" },
            "validatingAirlineCodes": ["AA"]
        })
    }

    fn dictionaries() -> Dictionaries {
        Dictionaries {
            carriers: HashMap::from([("AA".to_string(), "AMERICAN AIRLINES".to_string())]),
            aircraft: HashMap::from([("738".to_string(), "BOEING 737-800".to_string())]),
        }
    }

    #[test]
    fn test_decode_offer() {
        let offer = decode_offer(&sample_offer(), &dictionaries()).unwrap();
        assert_eq!(offer.id, "1");
        assert_eq!(offer.price.total, 320.40);
        assert_eq!(offer.stops(), 1);
        assert_eq!(offer.seats_available, Some(4));
        assert_eq!(offer.itineraries[0].duration_minutes, 490);

        let first = &offer.itineraries[0].segments[0];
        assert_eq!(first.carrier_name.as_deref(), Some("AMERICAN AIRLINES"));
        assert_eq!(first.aircraft.as_deref(), Some("BOEING 737-800"));
        assert_eq!(first.flight_number, "AA123");
        assert_eq!(first.departure.terminal.as_deref(), Some("8"));
        assert_eq!(first.duration_minutes, 185);

        let second = &offer.itineraries[0].segments[1];
        assert_eq!(second.aircraft.as_deref(), Some("XYZ"));
        assert_eq!(second.duration_minutes, 100);
    }

    #[test]
    fn test_decode_rejects_malformed_offer() {
        let err = decode_offer(&json!({ "id": "1" }), &Dictionaries::default()).unwrap_err();
        assert!(matches!(err, CoreError::DecodeError(_)));
    }

    #[test]
    fn test_undecodable_offer_is_skipped_from_both_lists() {
        let mut second = sample_offer();
        second["id"] = json!("3");
        let response = decode_offers(
            vec![sample_offer(), json!({ "id": "2", "price": "broken" }), second],
            &dictionaries(),
        );

        let raw_ids: Vec<_> = response.raw_flight_offers.iter().map(|r| r.id()).collect();
        let decoded_ids: Vec<_> = response.decoded_flight_offers.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(raw_ids, vec![Some("1"), Some("3")]);
        assert_eq!(decoded_ids, vec!["1", "3"]);
    }

    #[test]
    fn test_location_conversion() {
        let response: LocationsResponse = serde_json::from_value(json!({
            "data": [
                {
                    "type": "location",
                    "subType": "AIRPORT",
                    "id": "AJFK",
                    "name": "JOHN F KENNEDY INTL",
                    "iataCode": "JFK",
                    "address": { "cityName": "NEW YORK", "countryName": "UNITED STATES OF AMERICA", "countryCode": "US" },
                    "geoCode": { "latitude": 40.63, "longitude": -73.77 },
                    "analytics": { "travelers": { "score": 27 } }
                },
                { "subType": "POINT_OF_INTEREST", "id": "P1", "name": "EMPIRE STATE", "iataCode": "XXX" },
                { "subType": "AIRPORT", "id": "A2", "name": "NO CODE" }
            ]
        }))
        .unwrap();

        let candidates: Vec<LocationCandidate> =
            response.data.into_iter().filter_map(ProviderLocation::into_candidate).collect();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].iata_code, "JFK");
        assert_eq!(candidates[0].relevance_score, Some(27.0));
        assert_eq!(candidates[0].address.country_code.as_deref(), Some("US"));
    }

    #[test]
    fn test_summarize_metrics() {
        let metrics: Vec<PriceMetric> = serde_json::from_value(json!([
            { "amount": "120.00", "quartileRanking": "MINIMUM" },
            { "amount": "200.00", "quartileRanking": "FIRST" },
            { "amount": "260.00", "quartileRanking": "MEDIUM" },
            { "amount": "330.00", "quartileRanking": "THIRD" },
            { "amount": "700.00", "quartileRanking": "MAXIMUM" }
        ]))
        .unwrap();

        let summary = summarize_metrics(&metrics, Some(180.0)).unwrap();
        assert_eq!(summary.lowest, 120.0);
        assert_eq!(summary.average, 260.0);
        assert_eq!(summary.highest, 700.0);
        assert_eq!(summary.number_of_prices, 5);
        assert_eq!(summary.price_bucket, PriceBucket::Low);

        assert_eq!(summarize_metrics(&metrics, Some(400.0)).unwrap().price_bucket, PriceBucket::High);
        assert!(summarize_metrics(&metrics[..2], None).is_none());
    }

    #[test]
    fn test_priced_total() {
        let pricing = json!({
            "data": {
                "type": "flight-offers-pricing",
                "flightOffers": [
                    { "id": "1", "price": { "total": "100.00", "grandTotal": "110.00" } },
                    { "id": "10001", "price": { "total": "90.50" } }
                ]
            }
        });
        assert_eq!(priced_total(&pricing), Some(200.50));
        assert_eq!(priced_total(&json!({})), None);
    }
}
