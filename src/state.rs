use crate::config::PortalConfig;
use crate::gate::SessionGate;
use crate::identity::IdentityProvider;
use crate::page_state::{ClientPageState, Theme};
use crate::storage::KeyValueStore;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// The dashboard currently loaded in the browser.
pub struct PageSlot {
    pub state: ClientPageState,
    /// False until a dashboard load initializes `state`; reset by logout.
    pub loaded: bool,
    /// Cancels timers started by this page load.
    pub token: CancellationToken,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub gate: Arc<SessionGate>,
    pub page: Arc<Mutex<PageSlot>>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: PortalConfig,
        store: Arc<dyn KeyValueStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let config = Arc::new(config);
        let shutdown = CancellationToken::new();
        let gate = SessionGate::new(store, identity, Arc::clone(&config));
        let page = PageSlot {
            state: ClientPageState::new(today(), Theme::default()),
            loaded: false,
            token: shutdown.child_token(),
        };

        Self {
            config,
            gate: Arc::new(gate),
            page: Arc::new(Mutex::new(page)),
            shutdown,
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        &**self.gate.store()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
