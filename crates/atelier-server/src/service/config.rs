//! Configuration of the service layer.

#[cfg(feature = "config")]
use clap::Args;
use atelier_postgres::{PgClient, PgClientMigrationExt, PgConfig};
use atelier_webhook::WebhookService;
use atelier_webhook::reqwest::{ReqwestClient, ReqwestConfig};
use serde::{Deserialize, Serialize};

use crate::automation::AutomationConfig;
use crate::service::{AuthKeys, AuthKeysConfig};
use crate::{Error, Result, TRACING_TARGET_SERVICE};

/// Everything needed to build a [`ServiceState`](super::ServiceState).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    #[cfg_attr(feature = "config", command(flatten))]
    pub webhook: ReqwestConfig,

    #[cfg_attr(feature = "config", command(flatten))]
    pub automation: AutomationConfig,

    #[cfg_attr(feature = "config", command(flatten))]
    pub auth: AuthKeysConfig,
}

impl ServiceConfig {
    pub fn new(postgres: PgConfig, auth: AuthKeysConfig) -> Self {
        Self {
            postgres,
            webhook: ReqwestConfig::default(),
            automation: AutomationConfig::default(),
            auth,
        }
    }

    pub fn with_webhook(mut self, webhook: ReqwestConfig) -> Self {
        self.webhook = webhook;
        self
    }

    pub fn with_automation(mut self, automation: AutomationConfig) -> Self {
        self.automation = automation;
        self
    }

    /// Checks every section without connecting to anything.
    pub fn validate(&self) -> Result<()> {
        self.postgres
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;
        self.auth.validate()
    }

    /// Connects to PostgreSQL and applies pending migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = self.postgres.clone().build().map_err(|e| {
            Error::external("postgres", "Failed to create database client").with_source(e)
        })?;

        let migrations = pg_client.run_pending_migrations().await.map_err(|e| {
            Error::external("postgres", "Failed to apply database migrations").with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            database_url = %self.postgres.database_url_masked(),
            applied = migrations.processed_versions.len(),
            "Database ready"
        );

        Ok(pg_client)
    }

    /// Builds the HTTP client used for deliveries and `send_webhook` steps.
    pub fn build_webhook_service(&self) -> Result<WebhookService> {
        let client = ReqwestClient::new(self.webhook.clone()).map_err(|e| {
            Error::internal("webhook", "Failed to create HTTP client").with_source(e)
        })?;
        Ok(client.into_service())
    }

    pub fn load_auth_keys(&self) -> Result<AuthKeys> {
        AuthKeys::from_config(&self.auth)
    }
}
