//! Service wiring: builds the application services from configuration.

use std::sync::Arc;

use satchel_auth::PasswordHasher;
use satchel_infra::store::Stores;
use satchel_infra::translator_http::{HttpTranslator, UnconfiguredTranslator};
use satchel_infra::{AccountService, AppConfig, ProductService};
use satchel_translate::Translator;

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub accounts: AccountService,
    pub products: ProductService,
    pub translator: Arc<dyn Translator>,
}

impl AppServices {
    pub fn new(
        config: &AppConfig,
        stores: Stores,
        translator: Arc<dyn Translator>,
    ) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(config.password)?;
        let tokens = config.auth.token_service()?;
        Ok(Self {
            accounts: AccountService::new(stores.users, hasher, tokens),
            products: ProductService::new(stores.products),
            translator,
        })
    }

    /// Configured storage backend and translation backend.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let stores = Stores::connect(&config.storage).await?;
        let configured = HttpTranslator::from_config(&config.translator)?;
        let translator: Arc<dyn Translator> = match configured {
            Some(http) => {
                tracing::info!(translator = ?http, "translation backend configured");
                Arc::new(http)
            }
            None => {
                tracing::warn!(
                    "TRANSLATOR_ENDPOINT not set, translation requests will fail per item"
                );
                Arc::new(UnconfiguredTranslator)
            }
        };
        Self::new(config, stores, translator)
    }

    /// In-memory stores with the given translator (tests and local runs).
    pub fn in_memory(config: &AppConfig, translator: Arc<dyn Translator>) -> anyhow::Result<Self> {
        Self::new(config, Stores::in_memory(), translator)
    }
}
