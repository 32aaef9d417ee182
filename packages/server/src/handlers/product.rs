use axum::Json;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::product_form::{ProductForm, ProductInput};
use crate::images::StoredImage;
use crate::models::product::{CreateProductResponse, ProductRequest, ProductResponse};
use crate::repository::{ProductFields, RepositoryError};
use crate::state::AppState;

/// Room for the text parts and multipart framing on top of the image itself.
const FORM_OVERHEAD: u64 = 1024 * 1024;

pub fn product_body_limit(max_image_size: u64) -> DefaultBodyLimit {
    let limit = max_image_size.saturating_add(FORM_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Create a product",
    description = "Accepts a JSON body, or a `multipart/form-data` form with text parts `name`, \
        `description`, `price` and a required file part `image`. The image is stored first; \
        if the row cannot be written the image is removed again.",
    request_body(content = ProductRequest, content_type = "application/json"),
    responses(
        (status = 201, description = "Product created", body = CreateProductResponse),
        (status = 400, description = "Invalid input or missing image", body = ErrorBody),
        (status = 500, description = "Storage error", body = ErrorBody),
    ),
)]
#[instrument(skip(state, input), fields(name = %input.name, has_image = input.image.is_some()))]
pub async fn create_product(
    State(state): State<AppState>,
    ProductForm(input): ProductForm,
) -> Result<impl IntoResponse, AppError> {
    if input.from_multipart && input.image.is_none() {
        return Err(AppError::Validation("Image is required".into()));
    }

    let stored = upload_image(&state, &input).await?;
    let fields = ProductFields {
        name: input.name,
        description: input.description,
        price: input.price,
        image_url: stored.as_ref().map(|s| s.url.clone()),
        image_key: stored.as_ref().map(|s| s.key.clone()),
    };

    let id = match state.products.create(fields).await {
        Ok(id) => id,
        Err(e) => {
            if let Some(stored) = &stored {
                state.images.discard(&stored.key).await;
            }
            return Err(e.into());
        }
    };

    info!(%id, "Created product");
    Ok((
        StatusCode::CREATED,
        Json(CreateProductResponse {
            id,
            image_url: stored.map(|s| s.url),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List all products",
    description = "Returns every product in creation order. An empty catalog yields `[]`.",
    responses(
        (status = 200, description = "All products", body = Vec<ProductResponse>),
        (status = 500, description = "Storage error", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.products.list_all().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Get a product by ID",
    params(("id" = String, Path, description = "Product ID (UUID)")),
    responses(
        (status = 200, description = "Product details", body = ProductResponse),
        (status = 400, description = "Malformed product ID", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    let id = parse_product_id(&id)?;
    let product = state.products.get_by_id(id).await?;
    Ok(Json(product.into()))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Products",
    operation_id = "updateProduct",
    summary = "Replace a product's fields",
    description = "Replaces name, description and price. The path ID wins over any `id` in the \
        body. A multipart `image` part replaces the stored image and the previous one is \
        deleted; without it the current image is kept.",
    params(("id" = String, Path, description = "Product ID (UUID)")),
    request_body(content = ProductRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid input or malformed product ID", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Storage error", body = ErrorBody),
    ),
)]
#[instrument(skip(state, input), fields(has_image = input.image.is_some()))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ProductForm(input): ProductForm,
) -> Result<Json<ProductResponse>, AppError> {
    let id = parse_product_id(&id)?;
    state.products.get_by_id(id).await?;

    let stored = upload_image(&state, &input).await?;
    let fields = ProductFields {
        name: input.name,
        description: input.description,
        price: input.price,
        image_url: stored.as_ref().map(|s| s.url.clone()),
        image_key: stored.as_ref().map(|s| s.key.clone()),
    };

    match state.products.update(id, fields).await {
        Ok(Some(replaced)) => state.images.discard(&replaced).await,
        Ok(None) => {}
        Err(e) => {
            if let Some(stored) = &stored {
                state.images.discard(&stored.key).await;
            }
            return Err(e.into());
        }
    }

    let updated = state.products.get_by_id(id).await?;
    info!(%id, "Updated product");
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    operation_id = "deleteProduct",
    summary = "Delete a product",
    description = "Idempotent: deleting an unknown ID also returns 200. The product's image is \
        removed after the row.",
    params(("id" = String, Path, description = "Product ID (UUID)")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 400, description = "Malformed product ID", body = ErrorBody),
        (status = 500, description = "Storage error", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_product_id(&id)?;

    let image_key = match state.products.get_by_id(id).await {
        Ok(product) => product.image_key,
        Err(RepositoryError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };

    state.products.delete(id).await?;

    if let Some(key) = image_key {
        state.images.discard(&key).await;
    }

    info!(%id, "Deleted product");
    Ok(StatusCode::OK)
}

fn parse_product_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid product ID".into()))
}

async fn upload_image(
    state: &AppState,
    input: &ProductInput,
) -> Result<Option<StoredImage>, AppError> {
    match &input.image {
        Some(image) => Ok(Some(state.images.upload(image).await?)),
        None => Ok(None),
    }
}
