use std::sync::Arc;

use farefinder_core::{
    CoreError, CoreResult, Direction, LocationCandidate, OfferSet, Operation, SearchForm,
    SearchRequest, TravelDataSource, TravelerCategory,
};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::location_field::{FieldRole, LocationField, NavKey};
use crate::offer_store::OfferStore;
use crate::price_analysis::PriceAnalyzer;
use crate::SessionConfig;

/// One user's search form and everything hanging off it. The session is the
/// only writer of its state; every mutation goes through `&mut self`.
pub struct SearchSession {
    source: Arc<dyn TravelDataSource>,
    origin: LocationField,
    destination: LocationField,
    form: SearchForm,
    store: OfferStore,
    analyzer: PriceAnalyzer,
    last_request: Option<SearchRequest>,
}

impl SearchSession {
    pub fn new(source: Arc<dyn TravelDataSource>, config: &SessionConfig) -> Self {
        Self {
            source,
            origin: LocationField::new(FieldRole::Origin, config.debounce),
            destination: LocationField::new(FieldRole::Destination, config.debounce),
            form: SearchForm::new(),
            store: OfferStore::new(),
            analyzer: PriceAnalyzer::new(),
            last_request: None,
        }
    }

    pub fn field(&self, role: FieldRole) -> &LocationField {
        match role {
            FieldRole::Origin => &self.origin,
            FieldRole::Destination => &self.destination,
        }
    }

    fn field_mut(&mut self, role: FieldRole) -> &mut LocationField {
        match role {
            FieldRole::Origin => &mut self.origin,
            FieldRole::Destination => &mut self.destination,
        }
    }

    pub fn form(&self) -> &SearchForm {
        &self.form
    }

    /// Dates, cabin, non-stop and one-way live directly on the form.
    pub fn form_mut(&mut self) -> &mut SearchForm {
        &mut self.form
    }

    pub fn store(&self) -> &OfferStore {
        &self.store
    }

    pub fn analyzer(&self) -> &PriceAnalyzer {
        &self.analyzer
    }

    pub fn last_request(&self) -> Option<&SearchRequest> {
        self.last_request.as_ref()
    }

    // ------------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------------

    pub fn type_location(&mut self, role: FieldRole, text: &str, now: Instant) {
        self.field_mut(role).input(text, now);
        if self.field(role).selected().is_none() {
            self.set_form_location(role, None);
        }
    }

    /// Run a lookup if the field's debounce has settled by `now`.
    pub async fn resolve_location(&mut self, role: FieldRole, now: Instant) -> bool {
        let source = Arc::clone(&self.source);
        let field = self.field_mut(role);
        if field.tick(now).is_none() {
            return false;
        }
        field.resolve(source.as_ref()).await
    }

    /// Wait for the field's debounce to settle, then look up.
    pub async fn settle_location(&mut self, role: FieldRole) -> bool {
        let source = Arc::clone(&self.source);
        let field = self.field_mut(role);
        if field.settle().await.is_none() {
            return false;
        }
        field.resolve(source.as_ref()).await
    }

    pub fn select_location(&mut self, role: FieldRole, index: usize) -> bool {
        match self.field_mut(role).select(index) {
            Some(candidate) => {
                self.set_form_location(role, Some(candidate));
                true
            }
            None => false,
        }
    }

    pub fn location_key(&mut self, role: FieldRole, key: NavKey) {
        if let Some(candidate) = self.field_mut(role).handle_key(key) {
            self.set_form_location(role, Some(candidate));
        }
    }

    pub fn clear_location(&mut self, role: FieldRole) {
        self.field_mut(role).clear();
        self.set_form_location(role, None);
    }

    pub fn swap_locations(&mut self) {
        self.origin.swap_with(&mut self.destination);
        self.form.swap_locations();
    }

    fn set_form_location(&mut self, role: FieldRole, location: Option<LocationCandidate>) {
        match role {
            FieldRole::Origin => self.form.set_origin(location),
            FieldRole::Destination => self.form.set_destination(location),
        }
    }

    // ------------------------------------------------------------------------
    // Travelers
    // ------------------------------------------------------------------------

    pub fn add_traveler(&mut self, category: TravelerCategory) -> bool {
        self.form.travelers_mut().increment(category)
    }

    pub fn remove_traveler(&mut self, category: TravelerCategory) -> bool {
        self.form.travelers_mut().decrement(category)
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// Validate the form and search every leg. The stored offers change only
    /// when all legs come back. Returns whether new offers were stored.
    pub async fn submit(&mut self) -> bool {
        if self.store.is_loading() {
            warn!("Search already in flight, ignoring submit");
            return false;
        }

        let request = match self.form.build() {
            Ok(request) => request,
            Err(err) => {
                self.store.fail(err.display_message(Operation::SearchFlights));
                return false;
            }
        };

        self.store.begin();
        info!(
            "Searching {} -> {} on {}",
            request.origin().iata_code,
            request.destination().iata_code,
            request.departure_date()
        );

        match search_legs(self.source.as_ref(), &request).await {
            Ok(offers) => {
                self.store.ingest(offers);
                self.analyzer.reset();
                self.last_request = Some(request);
                true
            }
            Err(err) => {
                warn!("Flight search failed: {}", err);
                self.store.fail(err.display_message(Operation::SearchFlights));
                false
            }
        }
    }

    pub fn select_offer(&mut self, direction: Direction, id: &str) -> CoreResult<bool> {
        self.store.select(direction, id)
    }

    pub async fn analyze_price(&mut self) -> bool {
        let Some(request) = self.last_request.as_ref() else {
            return false;
        };
        self.analyzer
            .analyze(
                self.source.as_ref(),
                request,
                self.store.offers(),
                self.store.selection(),
            )
            .await
    }

    pub fn clear_search(&mut self) {
        self.store.clear();
        self.analyzer.reset();
        self.last_request = None;
    }
}

async fn search_legs(source: &dyn TravelDataSource, request: &SearchRequest) -> CoreResult<OfferSet> {
    if request.one_way() {
        let departure = source.search_flights(&request.payload()).await?;
        return Ok(OfferSet::from_legs(departure, None));
    }

    let (Some(outbound), Some(inbound)) = (
        request.leg_payload(Direction::Departure),
        request.leg_payload(Direction::Return),
    ) else {
        return Err(CoreError::ValidationError("Return date is required".to_string()));
    };
    let (departure, inbound) = tokio::try_join!(
        source.search_flights(&outbound),
        source.search_flights(&inbound)
    )?;
    Ok(OfferSet::from_legs(departure, Some(inbound)))
}
