use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use satchel_products::Product;
use satchel_translate::ItemOutcome;

/// Text returned in place of a translation for a failed batch item.
pub const TRANSLATION_FAILED: &str = "Translation failed";

// -------------------------
// Request DTOs
// -------------------------

/// Register and login body. Missing fields decode as empty and fail
/// validation rather than body decoding.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub from_lang: Option<String>,
    pub to_lang: Option<String>,
    #[serde(default)]
    pub texts: Vec<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name,
            description: p.description,
            price: p.price,
            created_at: p.timestamps.created_at,
            updated_at: p.timestamps.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TranslateResult {
    pub original: String,
    pub translated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ItemOutcome> for TranslateResult {
    fn from(outcome: ItemOutcome) -> Self {
        match outcome {
            ItemOutcome::Translated {
                original,
                translated,
            } => Self {
                original,
                translated,
                error: None,
            },
            ItemOutcome::Failed { original, error } => Self {
                original,
                translated: TRANSLATION_FAILED.to_string(),
                error: Some(error.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub results: Vec<TranslateResult>,
}

/// `{code, msg, data}` success envelope of the versioned API root.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub code: u16,
    pub msg: String,
    pub data: T,
}

/// Body of the catch-all 404.
#[derive(Debug, Serialize)]
pub struct NotFoundBody {
    pub code: u16,
    pub msg: String,
    pub err: String,
}
