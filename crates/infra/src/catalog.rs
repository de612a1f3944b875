//! Product CRUD.

use std::sync::Arc;

use chrono::Utc;

use satchel_auth::Identity;
use satchel_core::ProductId;
use satchel_products::{Product, ProductInput};

use crate::error::ServiceError;
use crate::store::ProductStore;

/// Products form one shared pool: any authenticated caller may read or
/// change any record.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductStore>,
}

fn actor(identity: &Identity) -> &str {
    identity.username().unwrap_or("shared-secret")
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    pub async fn create(
        &self,
        identity: &Identity,
        input: ProductInput,
    ) -> Result<Product, ServiceError> {
        let fields = input.validate()?;
        let product = Product::create(fields, Utc::now());
        self.products.insert(product.clone()).await?;
        tracing::info!(actor = actor(identity), product_id = %product.id, "product created");
        Ok(product)
    }

    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.products.list().await?)
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.products.get(id).await?.ok_or(ServiceError::NotFound)
    }

    /// Full replace: an omitted description clears it.
    pub async fn update(
        &self,
        identity: &Identity,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, ServiceError> {
        let fields = input.validate()?;
        let product = self
            .products
            .update(id, fields, Utc::now())
            .await?
            .ok_or(ServiceError::NotFound)?;
        tracing::info!(actor = actor(identity), product_id = %id, "product updated");
        Ok(product)
    }

    pub async fn delete(&self, identity: &Identity, id: ProductId) -> Result<(), ServiceError> {
        if !self.products.soft_delete(id, Utc::now()).await? {
            return Err(ServiceError::NotFound);
        }
        tracing::info!(actor = actor(identity), product_id = %id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryProductStore;

    fn service() -> ProductService {
        ProductService::new(Arc::new(InMemoryProductStore::new()))
    }

    fn ada() -> Identity {
        Identity::User {
            username: "ada".into(),
        }
    }

    fn input(name: &str, description: Option<&str>, price: f64) -> ProductInput {
        ProductInput {
            name: Some(name.into()),
            description: description.map(String::from),
            price: Some(price),
        }
    }

    #[tokio::test]
    async fn lifecycle() {
        let products = service();
        let created = products
            .create(&ada(), input("Lamp", Some("warm light"), 19.5))
            .await
            .unwrap();

        let fetched = products.get(created.id).await.unwrap();
        assert_eq!(fetched, created);

        let updated = products
            .update(&ada(), created.id, input("Desk lamp", None, 21.0))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Desk lamp");
        assert_eq!(updated.description, None);
        assert_eq!(updated.price, 21.0);
        assert_eq!(updated.timestamps.created_at, created.timestamps.created_at);

        products.delete(&ada(), created.id).await.unwrap();
        assert_eq!(products.get(created.id).await, Err(ServiceError::NotFound));
        assert_eq!(
            products.delete(&ada(), created.id).await,
            Err(ServiceError::NotFound)
        );
        assert!(products.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_input_is_not_stored() {
        let products = service();
        let err = products
            .create(&Identity::SharedSecret, ProductInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(products.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let products = service();
        let err = products
            .update(&ada(), ProductId::new(), input("x", None, 1.0))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }
}
