use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use satchel_auth::{User, Username};
use satchel_core::{Entity, ProductId};
use satchel_products::{Product, ProductFields};

use super::{ProductStore, StoreError, UserStore};

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

/// In-memory user store for tests/dev. Deleted users keep their username.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<Username, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&user.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        map.insert(user.username.clone(), user);
        Ok(())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(username).filter(|u| u.is_live()).cloned())
    }
}

/// In-memory product store. Keyed by UUIDv7 id, so iteration is creation order.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&product.id) {
            return Err(StoreError::Conflict(format!("product {} already exists", product.id)));
        }
        map.insert(product.id, product);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().filter(|p| p.is_live()).cloned().collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).filter(|p| p.is_live()).cloned())
    }

    async fn update(
        &self,
        id: ProductId,
        fields: ProductFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let Some(product) = map.get_mut(&id) else {
            return Ok(None);
        };
        match product.replace_fields(fields, at) {
            Ok(()) => Ok(Some(product.clone())),
            Err(_) => Ok(None),
        }
    }

    async fn soft_delete(&self, id: ProductId, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map
            .get_mut(&id)
            .is_some_and(|product| product.mark_deleted(at).is_ok()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn fields(name: &str, price: f64) -> ProductFields {
        ProductFields {
            name: name.to_string(),
            description: None,
            price,
        }
    }

    fn user(name: &str) -> User {
        User::new(Username::parse(name).unwrap(), "$argon2id$stub".into(), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = InMemoryUserStore::new();
        store.insert(user("ada")).await.unwrap();

        let err = store.insert(user("ada")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleted_users_are_not_found() {
        let store = InMemoryUserStore::new();
        let mut ada = user("ada");
        ada.timestamps.mark_deleted(Utc::now());
        store.insert(ada).await.unwrap();

        let found = store
            .find_by_username(&Username::parse("ada").unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn list_is_in_creation_order_and_skips_tombstones() {
        let store = InMemoryProductStore::new();
        let now = Utc::now();
        let a = Product::create(fields("a", 1.0), now);
        let b = Product::create(fields("b", 2.0), now);
        let c = Product::create(fields("c", 3.0), now);
        for p in [c.clone(), a.clone(), b.clone()] {
            store.insert(p).await.unwrap();
        }

        assert!(store.soft_delete(b.id, now).await.unwrap());

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn update_and_delete_respect_tombstone() {
        let store = InMemoryProductStore::new();
        let created = Utc::now();
        let product = Product::create(fields("lamp", 10.0), created);
        let id = product.id;
        store.insert(product).await.unwrap();

        let later = created + Duration::seconds(5);
        let updated = store
            .update(id, fields("desk lamp", 12.5), later)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "desk lamp");
        assert_eq!(updated.timestamps.created_at, created);
        assert_eq!(updated.timestamps.updated_at, later);

        assert!(store.soft_delete(id, later).await.unwrap());
        assert!(!store.soft_delete(id, later).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());
        assert!(store.update(id, fields("x", 1.0), later).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_ids_are_absent() {
        let store = InMemoryProductStore::new();
        let id = ProductId::new();
        assert!(store.get(id).await.unwrap().is_none());
        assert!(store.update(id, fields("x", 1.0), Utc::now()).await.unwrap().is_none());
        assert!(!store.soft_delete(id, Utc::now()).await.unwrap());
    }
}
