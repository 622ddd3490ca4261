use farefinder_core::pricing::PriceAnalysisRequest;
use farefinder_core::{OfferSet, Operation, PriceAnalysisResponse, SearchRequest, Selection, TravelDataSource};
use tracing::{info, warn};

/// Pricing step for the selected itinerary. Its loading and error are separate
/// from the search's.
#[derive(Debug, Clone, Default)]
pub struct PriceAnalyzer {
    loading: bool,
    error: Option<String>,
    result: Option<PriceAnalysisResponse>,
}

impl PriceAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&PriceAnalysisResponse> {
        self.result.as_ref()
    }

    pub fn reset(&mut self) {
        self.loading = false;
        self.error = None;
        self.result = None;
    }

    /// Price the selection. Nothing is sent when no selected offer maps to a raw offer.
    /// Returns whether a result was stored.
    pub async fn analyze(
        &mut self,
        source: &dyn TravelDataSource,
        request: &SearchRequest,
        offers: &OfferSet,
        selection: &Selection,
    ) -> bool {
        let body = match PriceAnalysisRequest::build(request, offers, selection) {
            Ok(body) => body,
            Err(err) => {
                self.error = Some(err.display_message(Operation::AnalyzePrice));
                return false;
            }
        };

        self.loading = true;
        self.error = None;
        let outcome = source.analyze_price(&body).await;
        self.loading = false;

        match outcome {
            Ok(response) => {
                info!("Price analysis received for {} offers", body.flight_offers.len());
                self.result = Some(response);
                true
            }
            Err(err) => {
                warn!("Price analysis failed: {}", err);
                self.error = Some(err.display_message(Operation::AnalyzePrice));
                false
            }
        }
    }
}
