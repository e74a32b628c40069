//! Service state shared by every handler.

mod auth_keys;
mod config;

use std::sync::Arc;

use atelier_postgres::PgClient;
use atelier_webhook::WebhookService;

use crate::Result;
use crate::automation::{
    AutomationConfig, EventBus, PgAutomationStore, SharedStore, StepRegistry,
};
pub use crate::service::auth_keys::{AuthKeys, AuthKeysConfig, MIN_AUTH_SECRET_LEN};
pub use crate::service::config::ServiceConfig;

/// Application state, cloned into every request.
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    pub store: SharedStore,
    pub bus: EventBus,
    pub webhook: WebhookService,
    pub auth_keys: AuthKeys,
}

impl ServiceState {
    /// Wires the bus and the step registry over an existing store.
    pub fn new(
        store: SharedStore,
        webhook: WebhookService,
        auth_keys: AuthKeys,
        automation: &AutomationConfig,
    ) -> Self {
        let registry = StepRegistry::with_defaults(webhook.clone());
        let bus = EventBus::new(store.clone(), webhook.clone(), registry, automation);

        Self {
            store,
            bus,
            webhook,
            auth_keys,
        }
    }

    /// Connects to the database and builds the state from configuration.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        let pg_client: PgClient = config.connect_postgres().await?;
        let store: SharedStore = Arc::new(PgAutomationStore::new(pg_client));

        Ok(Self::new(
            store,
            config.build_webhook_service()?,
            config.load_auth_keys()?,
            &config.automation,
        ))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(store: SharedStore);
impl_di!(bus: EventBus);
impl_di!(webhook: WebhookService);
impl_di!(auth_keys: AuthKeys);
