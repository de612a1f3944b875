use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use satchel_core::{DomainError, DomainResult, Entity, ProductId, Timestamps};

pub const MAX_NAME_LEN: usize = 200;

/// Raw product fields as submitted by a client (create and update share it).
///
/// Everything is optional here so that a missing field becomes a validation
/// error rather than a body decoding error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// Validated, complete set of mutable product fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductFields {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

impl ProductInput {
    pub fn validate(self) -> DomainResult<ProductFields> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DomainError::validation("name is required"))?;
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let price = self
            .price
            .ok_or_else(|| DomainError::validation("price is required"))?;
        if !price.is_finite() || price < 0.0 {
            return Err(DomainError::validation(
                "price must be a non-negative number",
            ));
        }

        Ok(ProductFields {
            name,
            description: self.description,
            price,
        })
    }
}

/// A product record.
///
/// `id` and `timestamps.created_at` are fixed at creation; name, description
/// and price are replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub timestamps: Timestamps,
}

impl Product {
    pub fn create(fields: ProductFields, at: DateTime<Utc>) -> Self {
        Self {
            id: ProductId::new(),
            name: fields.name,
            description: fields.description,
            price: fields.price,
            timestamps: Timestamps::new(at),
        }
    }

    /// Full replace of the mutable fields.
    pub fn replace_fields(&mut self, fields: ProductFields, at: DateTime<Utc>) -> DomainResult<()> {
        if self.timestamps.is_deleted() {
            return Err(DomainError::not_found());
        }
        self.name = fields.name;
        self.description = fields.description;
        self.price = fields.price;
        self.timestamps.touch(at);
        Ok(())
    }

    /// Soft delete. Deleting twice is `NotFound`, like reading a deleted record.
    pub fn mark_deleted(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        if self.timestamps.mark_deleted(at) {
            Ok(())
        } else {
            Err(DomainError::not_found())
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}
