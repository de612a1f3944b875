//! Infrastructure layer: configuration, storage adapters, application
//! services and the outbound translation client.

pub mod accounts;
pub mod catalog;
pub mod config;
pub mod error;
pub mod store;
pub mod translator_http;

pub use accounts::AccountService;
pub use catalog::ProductService;
pub use config::AppConfig;
pub use error::ServiceError;
