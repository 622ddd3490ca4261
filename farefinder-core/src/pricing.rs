use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::offer::{Direction, OfferSet, RawOffer};
use crate::search::{format_calendar_date, SearchRequest};
use crate::selection::Selection;
use crate::{CoreError, CoreResult};

/// Added to the return offer's id before pricing. Both legs come from separate
/// searches whose ids start at "1", and the pricing call needs unique ids.
pub const RETURN_ID_OFFSET: u64 = 10_000;

pub fn offset_return_id(id: &str) -> CoreResult<String> {
    let numeric: u64 = id.parse().map_err(|_| {
        CoreError::ValidationError(format!("Offer id {} is not numeric", id))
    })?;
    numeric
        .checked_add(RETURN_ID_OFFSET)
        .map(|offset| offset.to_string())
        .ok_or_else(|| CoreError::ValidationError(format!("Offer id {} is out of range", id)))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaggedOffer {
    pub context: Direction,
    pub flight_offer: RawOffer,
}

/// Body of `POST /api/amadeus/price`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceAnalysisRequest {
    pub flight_offers: Vec<TaggedOffer>,
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub one_way: bool,
}

impl PriceAnalysisRequest {
    /// Collect the raw offers behind the current selection.
    /// Errors without building anything when no direction resolves to a raw offer.
    pub fn build(request: &SearchRequest, offers: &OfferSet, selection: &Selection) -> CoreResult<Self> {
        let mut flight_offers = Vec::new();

        for direction in Direction::ALL {
            let Some(id) = selection.selected_id(direction) else {
                continue;
            };
            let Some(raw) = offers.find_raw(direction, id) else {
                tracing::debug!("No raw offer for selected {:?} id {}", direction, id);
                continue;
            };
            let flight_offer = match direction {
                Direction::Departure => raw.clone(),
                Direction::Return => raw.with_id(offset_return_id(id)?),
            };
            flight_offers.push(TaggedOffer { context: direction, flight_offer });
        }

        if flight_offers.is_empty() {
            return Err(CoreError::ValidationError(
                "Select a flight before analyzing its price".to_string(),
            ));
        }

        Ok(Self {
            flight_offers,
            origin: request.origin().iata_code.clone(),
            destination: request.destination().iata_code.clone(),
            departure_date: format_calendar_date(request.departure_date()),
            return_date: request.return_date().map(format_calendar_date),
            one_way: request.one_way(),
        })
    }

    pub fn offer(&self, direction: Direction) -> Option<&RawOffer> {
        self.flight_offers
            .iter()
            .find(|t| t.context == direction)
            .map(|t| &t.flight_offer)
    }

    /// Untagged offers in departure-then-return order, as the provider expects them.
    pub fn raw_offers(&self) -> Vec<Value> {
        self.flight_offers
            .iter()
            .map(|t| t.flight_offer.as_value().clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceBucket {
    Low,
    Typical,
    High,
}

impl PriceBucket {
    /// Below the first quartile is low, above the third is high.
    pub fn classify(total: f64, first_quartile: f64, third_quartile: f64) -> Self {
        if total < first_quartile {
            PriceBucket::Low
        } else if total > third_quartile {
            PriceBucket::High
        } else {
            PriceBucket::Typical
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceMetrics {
    pub average: f64,
    pub lowest: f64,
    pub highest: f64,
    pub number_of_prices: u32,
    pub price_bucket: PriceBucket,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceAnalysisResponse {
    pub flight_offers_price: Value,
    #[serde(default)]
    pub flight_price_analysis: Option<PriceMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::airport;
    use crate::offer::fixtures::{direct, raw};
    use crate::search::SearchForm;
    use chrono::NaiveDate;

    fn round_trip() -> SearchRequest {
        let mut form = SearchForm::new();
        form.set_origin(Some(airport("JFK", "JOHN F KENNEDY INTL")));
        form.set_destination(Some(airport("LAX", "LOS ANGELES INTL")));
        form.set_departure_date(NaiveDate::from_ymd_opt(2025, 6, 1));
        form.set_return_date(NaiveDate::from_ymd_opt(2025, 6, 8));
        form.build().unwrap()
    }

    fn offers() -> OfferSet {
        OfferSet {
            raw_departure: vec![raw("123"), raw("124")],
            raw_return: vec![raw("123")],
            decoded_departure: vec![direct("123", 100.0), direct("124", 120.0)],
            decoded_return: vec![direct("123", 90.0)],
        }
    }

    #[test]
    fn test_return_offer_id_is_offset() {
        let mut selection = Selection::default();
        selection.toggle(Direction::Departure, direct("123", 100.0));
        selection.toggle(Direction::Return, direct("123", 90.0));

        let request = PriceAnalysisRequest::build(&round_trip(), &offers(), &selection).unwrap();
        assert_eq!(request.offer(Direction::Departure).unwrap().id(), Some("123"));
        assert_eq!(request.offer(Direction::Return).unwrap().id(), Some("10123"));
        assert_eq!(request.return_date.as_deref(), Some("2025-06-08"));
        assert!(!request.one_way);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["flightOffers"][1]["context"], "return");
        assert_eq!(body["flightOffers"][1]["flightOffer"]["id"], "10123");
    }

    #[test]
    fn test_uses_raw_offer_payload() {
        let mut selection = Selection::default();
        selection.toggle(Direction::Departure, direct("124", 120.0));

        let request = PriceAnalysisRequest::build(&round_trip(), &offers(), &selection).unwrap();
        let sent = request.raw_offers();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["source"], "GDS");
        assert_eq!(sent[0]["id"], "124");
    }

    #[test]
    fn test_fails_fast_without_raw_offer() {
        let selection = Selection::default();
        assert!(PriceAnalysisRequest::build(&round_trip(), &offers(), &selection).is_err());

        let mut selection = Selection::default();
        selection.toggle(Direction::Departure, direct("999", 10.0));
        assert!(PriceAnalysisRequest::build(&round_trip(), &offers(), &selection).is_err());
    }

    #[test]
    fn test_offset_rejects_non_numeric_ids() {
        assert_eq!(offset_return_id("1").unwrap(), "10001");
        assert!(offset_return_id("abc").is_err());
    }

    #[test]
    fn test_offset_rejects_overflowing_ids() {
        let err = offset_return_id(&u64::MAX.to_string()).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(offset_return_id(&(u64::MAX - RETURN_ID_OFFSET).to_string()).unwrap(), u64::MAX.to_string());
    }

    #[test]
    fn test_price_bucket_classification() {
        assert_eq!(PriceBucket::classify(80.0, 100.0, 200.0), PriceBucket::Low);
        assert_eq!(PriceBucket::classify(150.0, 100.0, 200.0), PriceBucket::Typical);
        assert_eq!(PriceBucket::classify(250.0, 100.0, 200.0), PriceBucket::High);
    }
}
