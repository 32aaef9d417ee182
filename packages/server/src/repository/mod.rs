//! Persistence for the product catalog.
//!
//! Handlers only see [`ProductRepository`]; [`SeaOrmProductRepository`] is the
//! production implementation and the in-memory one backs handler tests.

#[cfg(test)]
pub mod memory;
mod relational;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

pub use relational::SeaOrmProductRepository;

use crate::entity::product;

/// A persisted product.
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-controlled part of a product, written by create and update.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub image_key: Option<String>,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("product {0} not found")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// CRUD over products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product, stamping its id and timestamps. Returns the new id.
    async fn create(&self, fields: ProductFields) -> Result<Uuid, RepositoryError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Product, RepositoryError>;

    /// Overwrite name, description and price of an existing product and refresh
    /// `updated_at`. A `None` image key keeps the current image.
    ///
    /// Read and write happen under a row lock. Returns the image key that was
    /// replaced, so exactly one caller owns deleting it.
    ///
    /// Fails with [`RepositoryError::NotFound`] when no row has this id.
    async fn update(
        &self,
        id: Uuid,
        fields: ProductFields,
    ) -> Result<Option<String>, RepositoryError>;

    /// Remove a product. Deleting a missing id succeeds.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// All products in creation order.
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError>;
}

impl From<product::Model> for Product {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            image_url: m.image_url,
            image_key: m.image_key,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
