use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{Product, ProductFields, ProductRepository, RepositoryError};

/// Vec-backed [`ProductRepository`] for handler tests.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Product>> {
        self.products.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, fields: ProductFields) -> Result<Uuid, RepositoryError> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: fields.name,
            description: fields.description,
            price: fields.price,
            image_url: fields.image_url,
            image_key: fields.image_key,
            created_at: now,
            updated_at: now,
        };
        let id = product.id;
        self.lock().push(product);
        Ok(id)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Product, RepositoryError> {
        self.lock()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn update(
        &self,
        id: Uuid,
        fields: ProductFields,
    ) -> Result<Option<String>, RepositoryError> {
        let mut products = self.lock();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound(id))?;

        let mut replaced = None;
        if let Some(key) = fields.image_key {
            replaced = product.image_key.take().filter(|old| *old != key);
            product.image_key = Some(key);
            product.image_url = fields.image_url;
        }

        product.name = fields.name;
        product.description = fields.description;
        product.price = fields.price;
        product.updated_at = Utc::now().max(product.updated_at + Duration::microseconds(1));
        Ok(replaced)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.lock().retain(|p| p.id != id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.lock().clone())
    }
}
