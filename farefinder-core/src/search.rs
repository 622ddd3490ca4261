use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::location::LocationCandidate;
use crate::offer::Direction;
use crate::travelers::TravelerCounts;
use crate::{CoreError, CoreResult};

/// Wire format for calendar dates: date portion only.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_calendar_date(value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| CoreError::ValidationError(format!("Invalid date: {}", value)))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl TravelClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelClass::Economy => "ECONOMY",
            TravelClass::PremiumEconomy => "PREMIUM_ECONOMY",
            TravelClass::Business => "BUSINESS",
            TravelClass::First => "FIRST",
        }
    }
}

impl FromStr for TravelClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ECONOMY" => Ok(TravelClass::Economy),
            "PREMIUM_ECONOMY" => Ok(TravelClass::PremiumEconomy),
            "BUSINESS" => Ok(TravelClass::Business),
            "FIRST" => Ok(TravelClass::First),
            other => Err(CoreError::ValidationError(format!("Unknown travel class: {}", other))),
        }
    }
}

// ============================================================================
// Form state
// ============================================================================

/// Editable search form. Nothing here is trusted until `build` validates it.
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    origin: Option<LocationCandidate>,
    destination: Option<LocationCandidate>,
    departure_date: Option<NaiveDate>,
    return_date: Option<NaiveDate>,
    travelers: TravelerCounts,
    travel_class: Option<TravelClass>,
    non_stop: bool,
    one_way: bool,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Option<&LocationCandidate> {
        self.origin.as_ref()
    }

    pub fn destination(&self) -> Option<&LocationCandidate> {
        self.destination.as_ref()
    }

    pub fn departure_date(&self) -> Option<NaiveDate> {
        self.departure_date
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    pub fn travelers(&self) -> &TravelerCounts {
        &self.travelers
    }

    pub fn travelers_mut(&mut self) -> &mut TravelerCounts {
        &mut self.travelers
    }

    pub fn travel_class(&self) -> Option<TravelClass> {
        self.travel_class
    }

    pub fn non_stop(&self) -> bool {
        self.non_stop
    }

    pub fn one_way(&self) -> bool {
        self.one_way
    }

    pub fn set_origin(&mut self, origin: Option<LocationCandidate>) {
        self.origin = origin;
    }

    pub fn set_destination(&mut self, destination: Option<LocationCandidate>) {
        self.destination = destination;
    }

    pub fn swap_locations(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
    }

    pub fn set_departure_date(&mut self, date: Option<NaiveDate>) {
        self.departure_date = date;
    }

    /// Date pickers hand back a local timestamp; only the calendar date is kept.
    pub fn set_departure_at(&mut self, at: DateTime<Local>) {
        self.departure_date = Some(at.date_naive());
    }

    pub fn set_return_date(&mut self, date: Option<NaiveDate>) {
        self.return_date = date;
    }

    pub fn set_return_at(&mut self, at: DateTime<Local>) {
        self.return_date = Some(at.date_naive());
    }

    pub fn set_travel_class(&mut self, travel_class: Option<TravelClass>) {
        self.travel_class = travel_class;
    }

    pub fn set_non_stop(&mut self, non_stop: bool) {
        self.non_stop = non_stop;
    }

    /// Switching to one-way drops the return date so the form stays submittable.
    pub fn set_one_way(&mut self, one_way: bool) {
        self.one_way = one_way;
        if one_way {
            self.return_date = None;
        }
    }

    /// Validate every field and freeze the result into a `SearchRequest`.
    pub fn build(&self) -> CoreResult<SearchRequest> {
        let origin = require_location(self.origin.as_ref(), "Origin")?;
        let destination = require_location(self.destination.as_ref(), "Destination")?;

        if origin.iata_code == destination.iata_code {
            return Err(CoreError::ValidationError(
                "Origin and destination must be different".to_string(),
            ));
        }

        let departure_date = self
            .departure_date
            .ok_or_else(|| CoreError::ValidationError("Departure date is required".to_string()))?;

        let return_date = match (self.one_way, self.return_date) {
            (true, None) => None,
            (true, Some(_)) => {
                return Err(CoreError::ValidationError(
                    "One-way trips cannot have a return date".to_string(),
                ))
            }
            (false, None) => {
                return Err(CoreError::ValidationError("Return date is required".to_string()))
            }
            (false, Some(date)) if date < departure_date => {
                return Err(CoreError::ValidationError(
                    "Return date cannot be before departure date".to_string(),
                ))
            }
            (false, Some(date)) => Some(date),
        };

        self.travelers.validate()?;

        Ok(SearchRequest {
            origin: origin.clone(),
            destination: destination.clone(),
            departure_date,
            return_date,
            travelers: self.travelers,
            travel_class: self.travel_class,
            non_stop: self.non_stop,
            one_way: self.one_way,
        })
    }
}

fn require_location<'a>(
    location: Option<&'a LocationCandidate>,
    field: &str,
) -> CoreResult<&'a LocationCandidate> {
    match location {
        Some(candidate) if candidate.is_resolved() => Ok(candidate),
        Some(_) => Err(CoreError::ValidationError(format!("{} has no IATA code", field))),
        None => Err(CoreError::ValidationError(format!("{} is required", field))),
    }
}

// ============================================================================
// Submitted request
// ============================================================================

/// A validated search. Fields are read-only: a request is never changed once sent.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    origin: LocationCandidate,
    destination: LocationCandidate,
    departure_date: NaiveDate,
    return_date: Option<NaiveDate>,
    travelers: TravelerCounts,
    travel_class: Option<TravelClass>,
    non_stop: bool,
    one_way: bool,
}

impl SearchRequest {
    pub fn origin(&self) -> &LocationCandidate {
        &self.origin
    }

    pub fn destination(&self) -> &LocationCandidate {
        &self.destination
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    pub fn travelers(&self) -> &TravelerCounts {
        &self.travelers
    }

    pub fn travel_class(&self) -> Option<TravelClass> {
        self.travel_class
    }

    pub fn non_stop(&self) -> bool {
        self.non_stop
    }

    pub fn one_way(&self) -> bool {
        self.one_way
    }

    /// Full trip as a wire payload; `returnDate` is only present for round trips.
    pub fn payload(&self) -> FlightSearchPayload {
        FlightSearchPayload {
            origin: self.origin.iata_code.clone(),
            destination: self.destination.iata_code.clone(),
            departure_date: format_calendar_date(self.departure_date),
            return_date: self.return_date.map(format_calendar_date),
            travelers: self.travelers,
            travel_class: self.travel_class,
            non_stop: self.non_stop,
        }
    }

    /// One-way payload for a single direction. The return leg flies the route
    /// backwards on the return date. `None` for the return leg of a one-way trip.
    pub fn leg_payload(&self, direction: Direction) -> Option<FlightSearchPayload> {
        let (origin, destination, date) = match direction {
            Direction::Departure => (&self.origin, &self.destination, self.departure_date),
            Direction::Return => (&self.destination, &self.origin, self.return_date?),
        };
        Some(FlightSearchPayload {
            origin: origin.iata_code.clone(),
            destination: destination.iata_code.clone(),
            departure_date: format_calendar_date(date),
            return_date: None,
            travelers: self.travelers,
            travel_class: self.travel_class,
            non_stop: self.non_stop,
        })
    }
}

/// Body of `POST /api/amadeus/flightSearch`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchPayload {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub travelers: TravelerCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_class: Option<TravelClass>,
    #[serde(default)]
    pub non_stop: bool,
}

impl FlightSearchPayload {
    /// Server-side re-check of a payload that arrived over the wire.
    pub fn validate(&self) -> CoreResult<()> {
        if self.origin.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Origin and destination IATA codes are required".to_string(),
            ));
        }
        let departure = parse_calendar_date(&self.departure_date)?;
        if let Some(return_date) = &self.return_date {
            if parse_calendar_date(return_date)? < departure {
                return Err(CoreError::ValidationError(
                    "Return date cannot be before departure date".to_string(),
                ));
            }
        }
        self.travelers.validate()
    }
}
