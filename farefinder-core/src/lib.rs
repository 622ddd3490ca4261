pub mod location;
pub mod travelers;
pub mod search;
pub mod offer;
pub mod selection;
pub mod pricing;
pub mod source;

pub use location::{LocationCandidate, LocationSubType};
pub use offer::{Direction, FlightOffer, FlightSearchResponse, OfferSet, RawOffer};
pub use pricing::{PriceAnalysisRequest, PriceAnalysisResponse};
pub use search::{FlightSearchPayload, SearchForm, SearchRequest, TravelClass};
pub use selection::Selection;
pub use source::TravelDataSource;
pub use travelers::{TravelerCategory, TravelerCounts};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Network request failed: {0}")]
    NetworkError(String),
    #[error("Upstream returned status {status}: {message}")]
    UpstreamError { status: u16, message: String },
    #[error("Failed to decode response: {0}")]
    DecodeError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Remote operations a user can trigger. Each one has its own generic failure text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchLocations,
    SearchFlights,
    AnalyzePrice,
}

impl Operation {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::FetchLocations => "Failed to fetch locations",
            Operation::SearchFlights => "Failed to search flights",
            Operation::AnalyzePrice => "Failed to analyze price",
        }
    }
}

impl CoreError {
    /// Message shown to the user. Validation errors keep their own text,
    /// network and upstream failures collapse to the operation's generic message.
    pub fn display_message(&self, operation: Operation) -> String {
        match self {
            CoreError::ValidationError(msg) => msg.clone(),
            _ => operation.failure_message().to_string(),
        }
    }
}
