use std::cmp::Ordering;

use farefinder_core::FlightOffer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FilterCondition {
    MaxPrice(f64),
    MaxStops(usize),
    /// Any segment operated by one of these carriers.
    Carriers(Vec<String>),
    /// Local hour, inclusive.
    DepartAfterHour(u32),
    /// Local hour, inclusive.
    ArriveBeforeHour(u32),
}

/// Display-side filter over decoded offers. Never touches the stored results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OfferFilter {
    conditions: Vec<FilterCondition>,
}

impl OfferFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn non_stop() -> Self {
        Self::new().with(FilterCondition::MaxStops(0))
    }

    pub fn matches(&self, offer: &FlightOffer) -> bool {
        for condition in &self.conditions {
            match condition {
                FilterCondition::MaxPrice(max) => {
                    if offer.price.total > *max {
                        return false;
                    }
                }
                FilterCondition::MaxStops(max) => {
                    if offer.stops() > *max {
                        return false;
                    }
                }
                FilterCondition::Carriers(codes) => {
                    if !offer.carriers().iter().any(|c| codes.iter().any(|code| code == c)) {
                        return false;
                    }
                }
                FilterCondition::DepartAfterHour(hour) => {
                    if offer.departure_hour().map(|h| h < *hour).unwrap_or(true) {
                        return false;
                    }
                }
                FilterCondition::ArriveBeforeHour(hour) => {
                    if offer.arrival_hour().map(|h| h > *hour).unwrap_or(true) {
                        return false;
                    }
                }
            }
        }
        true
    }

    pub fn apply<'a>(&self, offers: &'a [FlightOffer]) -> Vec<&'a FlightOffer> {
        offers.iter().filter(|o| self.matches(o)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum OfferSort {
    #[default]
    Price,
    Duration,
    Departure,
}

impl OfferSort {
    /// Stable sort, so equal offers keep provider order.
    pub fn sort(&self, offers: &mut [&FlightOffer]) {
        match self {
            OfferSort::Price => offers.sort_by(|a, b| a.price.total.total_cmp(&b.price.total)),
            OfferSort::Duration => offers.sort_by_key(|o| o.total_duration_minutes()),
            OfferSort::Departure => offers.sort_by(|a, b| match (a.departure_time(), b.departure_time()) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
        }
    }
}
