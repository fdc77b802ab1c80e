use std::sync::Arc;

use stockpile_infra::{
    EngineConfig, FanoutNotifier, InMemoryCatalog, InMemoryInventoryStore, InMemoryNotifier, MutationEngine,
    StockListingEngine, TracingNotifier,
};

pub type Engine = MutationEngine<Arc<InMemoryInventoryStore>, Arc<InMemoryCatalog>, Arc<FanoutNotifier>>;
pub type Listing = StockListingEngine<Arc<InMemoryInventoryStore>, Arc<InMemoryCatalog>>;

/// Everything the handlers need, shared across requests.
#[derive(Debug)]
pub struct AppServices {
    pub engine: Engine,
    pub listing: Listing,
    pub store: Arc<InMemoryInventoryStore>,
    pub catalog: Arc<InMemoryCatalog>,
    /// Alerts raised so far (also logged through tracing).
    pub alerts: Arc<InMemoryNotifier>,
    pub config: EngineConfig,
}

pub fn build_services(config: EngineConfig) -> AppServices {
    let store = Arc::new(InMemoryInventoryStore::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let alerts = Arc::new(InMemoryNotifier::new());
    let notifier = Arc::new(
        FanoutNotifier::new()
            .with(alerts.clone())
            .with(Arc::new(TracingNotifier)),
    );

    AppServices {
        engine: MutationEngine::new(store.clone(), catalog.clone(), notifier).with_config(config),
        listing: StockListingEngine::new(store.clone(), catalog.clone()).with_config(config),
        store,
        catalog,
        alerts,
        config,
    }
}
