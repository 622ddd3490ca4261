pub mod debounce;
pub mod location_field;
pub mod filters;
pub mod offer_store;
pub mod price_analysis;
pub mod session;
pub mod http_client;

#[cfg(test)]
pub(crate) mod fake;

use std::time::Duration;

pub use http_client::HttpTravelClient;
pub use location_field::{FieldRole, LocationField, NavKey};
pub use offer_store::{OfferStore, SearchStatus};
pub use session::SearchSession;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Root of the proxy serving `/api/amadeus/*`
    pub base_url: String,
    /// Quiet period before a typed location keyword is looked up
    pub debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            debounce: debounce::DEFAULT_DEBOUNCE,
        }
    }
}
