//! Record stores for users and products.
//!
//! Every read filters out tombstoned records; only the adapters know how the
//! tombstone is stored.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use satchel_auth::{User, Username};
use satchel_core::ProductId;
use satchel_products::{Product, ProductFields};

use crate::config::{StorageBackend, StorageConfig};

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::{InMemoryProductStore, InMemoryUserStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] if the username is taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: Product) -> Result<(), StoreError>;

    /// Live products in id (creation) order.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Full replace of the mutable fields. `None` if missing or deleted.
    async fn update(
        &self,
        id: ProductId,
        fields: ProductFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError>;

    /// Set the tombstone. `false` if missing or already deleted.
    async fn soft_delete(&self, id: ProductId, at: DateTime<Utc>) -> Result<bool, StoreError>;
}

/// The pair of stores a running service uses.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            products: Arc::new(InMemoryProductStore::new()),
        }
    }

    /// Open the configured backend.
    pub async fn connect(config: &StorageConfig) -> anyhow::Result<Self> {
        match config.backend {
            StorageBackend::Memory => {
                tracing::info!(backend = "memory", "using in-memory storage");
                Ok(Self::in_memory())
            }
            StorageBackend::Postgres => Self::connect_postgres(config).await,
        }
    }

    #[cfg(feature = "postgres")]
    async fn connect_postgres(config: &StorageConfig) -> anyhow::Result<Self> {
        let url = config.database_url.as_deref().ok_or_else(|| {
            anyhow::anyhow!("storage.backend is postgres but DATABASE_URL is unset")
        })?;
        let pool = postgres::connect(url, config.max_connections).await?;
        postgres::ensure_schema(&pool).await?;
        tracing::info!(backend = "postgres", "connected to database");
        Ok(Self {
            users: Arc::new(postgres::PostgresUserStore::new(pool.clone())),
            products: Arc::new(postgres::PostgresProductStore::new(pool)),
        })
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect_postgres(_config: &StorageConfig) -> anyhow::Result<Self> {
        tracing::warn!(
            backend = "memory",
            "postgres storage requested without the 'postgres' feature, falling back"
        );
        Ok(Self::in_memory())
    }
}
