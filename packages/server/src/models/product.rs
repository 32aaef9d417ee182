use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::Product;

/// JSON body for create and update. An `id` in the body is ignored.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ProductRequest {
    #[schema(example = "Widget")]
    pub name: String,
    #[schema(example = "A widget")]
    pub description: String,
    /// Non-negative price.
    #[schema(example = 9.99)]
    pub price: f64,
}

/// Returned by create.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateProductResponse {
    pub id: Uuid,
    /// Present when an image was uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Object key or presigned URL, depending on deployment. Presigned URLs expire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            image_url: p.image_url,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
