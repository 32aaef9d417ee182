use std::path::Path;

use axum::extract::multipart::Field;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::json::AppJson;
use crate::images::StagedImage;
use crate::models::product::ProductRequest;
use crate::state::AppState;

/// Product fields decoded from either a JSON body or a multipart form.
#[derive(Debug)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Only multipart requests can carry an image.
    pub image: Option<StagedImage>,
    pub from_multipart: bool,
}

impl ProductInput {
    fn new(
        name: String,
        description: String,
        price: f64,
        image: Option<StagedImage>,
        from_multipart: bool,
    ) -> Result<Self, AppError> {
        validate_price(price)?;
        Ok(Self {
            name,
            description,
            price,
            image,
            from_multipart,
        })
    }
}

/// Price must be a finite, non-negative number.
pub fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation(
            "Price must be a non-negative number".into(),
        ));
    }
    Ok(())
}

/// Extracts a [`ProductInput`], choosing the parser from the `Content-Type` header.
///
/// * `multipart/form-data`: text parts `name`, `description`, `price` and an optional
///   file part `image`, which is streamed to a temporary file.
/// * JSON: `{"name", "description", "price"}`.
pub struct ProductForm(pub ProductInput);

impl FromRequest<AppState> for ProductForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            let input = parse_multipart(
                multipart,
                state.config.storage.max_image_size,
                &std::env::temp_dir(),
            )
            .await?;
            Ok(ProductForm(input))
        } else if content_type.contains("json") {
            let AppJson(body) = AppJson::<ProductRequest>::from_request(req, state).await?;
            let input = ProductInput::new(body.name, body.description, body.price, None, false)?;
            Ok(ProductForm(input))
        } else {
            Err(AppError::Validation(
                "Content-Type must be application/json or multipart/form-data".into(),
            ))
        }
    }
}

async fn parse_multipart(
    mut multipart: Multipart,
    max_image_size: u64,
    staging_dir: &Path,
) -> Result<ProductInput, AppError> {
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut price: Option<String> = None;
    let mut image: Option<StagedImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("name") => name = Some(read_text(field, "name").await?),
            Some("description") => description = Some(read_text(field, "description").await?),
            Some("price") => price = Some(read_text(field, "price").await?),
            Some("image") => image = stage_image(field, max_image_size, staging_dir).await?,
            _ => {} // Ignore unknown fields.
        }
    }

    let name = name.ok_or_else(|| AppError::Validation("Missing 'name' field".into()))?;
    let description =
        description.ok_or_else(|| AppError::Validation("Missing 'description' field".into()))?;
    let price = price
        .ok_or_else(|| AppError::Validation("Missing 'price' field".into()))?
        .trim()
        .parse::<f64>()
        .map_err(|_| AppError::Validation("Invalid price".into()))?;

    ProductInput::new(name, description, price, image, true)
}

async fn read_text(field: Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))
}

/// Stream an image part to a temporary file.
///
/// The file is owned by the returned [`StagedImage`] from the moment it is created, so
/// a cancelled or failed upload never leaves it behind. A part with no bytes counts
/// as absent.
async fn stage_image(
    mut field: Field<'_>,
    max_size: u64,
    staging_dir: &Path,
) -> Result<Option<StagedImage>, AppError> {
    let file_name = field
        .file_name()
        .map(|s| s.to_string())
        .filter(|s| !s.trim().is_empty());
    let content_type = field.content_type().map(|s| s.to_string());
    let temp_path = staging_dir.join(format!("catalog-upload-{}", Uuid::new_v4()));
    let mut staged = StagedImage::new(temp_path.clone(), 0, file_name, content_type);

    let mut temp_file = tokio::fs::File::create(&temp_path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

    let mut total_size: u64 = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        total_size += chunk.len() as u64;
        if total_size > max_size {
            return Err(AppError::Validation(format!(
                "Image exceeds maximum size of {max_size} bytes"
            )));
        }
        temp_file
            .write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
    }

    temp_file
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
    drop(temp_file);

    if total_size == 0 {
        return Ok(None);
    }
    staged.set_size(total_size);
    Ok(Some(staged))
}
