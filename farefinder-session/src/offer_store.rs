use farefinder_core::{CoreError, CoreResult, Direction, FlightOffer, OfferSet, Selection};
use tracing::{debug, info};

use crate::filters::{OfferFilter, OfferSort};

/// Where the current search stands. `Empty` is a successful search with no offers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Empty,
    Failed(String),
}

/// Holds the offers of the latest successful search and the user's selection.
#[derive(Debug, Clone, Default)]
pub struct OfferStore {
    offers: OfferSet,
    selection: Selection,
    status: SearchStatus,
}

impl OfferStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offers(&self) -> &OfferSet {
        &self.offers
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SearchStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Mark a search in flight. Refused while another one is running.
    pub fn begin(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.status = SearchStatus::Loading;
        true
    }

    /// Replace every list in one step. The selection survives only if the
    /// results are exactly the ones already shown.
    pub fn ingest(&mut self, offers: OfferSet) {
        if offers != self.offers {
            self.selection.clear();
        }
        self.offers = offers;
        self.status = if self.offers.is_empty() {
            SearchStatus::Empty
        } else {
            SearchStatus::Loaded
        };
        info!(
            "Stored {} departure and {} return offers",
            self.offers.decoded_departure.len(),
            self.offers.decoded_return.len()
        );
    }

    /// Record a failed search. Offers already on screen stay.
    pub fn fail(&mut self, message: String) {
        self.status = SearchStatus::Failed(message);
    }

    pub fn clear(&mut self) {
        self.offers = OfferSet::default();
        self.selection.clear();
        self.status = SearchStatus::Idle;
    }

    /// Toggle the offer with `id` for `direction`. Returns whether it is selected afterwards.
    pub fn select(&mut self, direction: Direction, id: &str) -> CoreResult<bool> {
        let offer = self
            .offers
            .find_decoded(direction, id)
            .cloned()
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown {:?} offer {}", direction, id)))?;
        let selected = self.selection.toggle(direction, offer);
        debug!("{:?} offer {} selected={}", direction, id, selected);
        Ok(selected)
    }

    /// Decoded offers of one direction, filtered and sorted for display.
    pub fn visible(&self, direction: Direction, filter: &OfferFilter, sort: OfferSort) -> Vec<&FlightOffer> {
        let mut offers = filter.apply(self.offers.decoded(direction));
        sort.sort(&mut offers);
        offers
    }
}
