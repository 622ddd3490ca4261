use std::sync::Arc;
use farefinder_core::TravelDataSource;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TravelDataSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn TravelDataSource>) -> Self {
        Self { source }
    }
}
