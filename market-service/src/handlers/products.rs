use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    dtos::product::ProductResponse,
    error::AppError,
    middleware::CurrentAdmin,
    models::{NewProduct, ProductUpdate},
    AppState,
};

/// Fields accepted by the create/update multipart forms.
#[derive(Debug, Default)]
struct ListingForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    stock: Option<i32>,
    image: Option<ImageUpload>,
}

#[derive(Debug)]
struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

async fn text_field(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::InvalidOperation(format!("Invalid multipart field: {}", e)))
}

/// Walk the multipart body into a [`ListingForm`]. Unknown fields are ignored.
async fn read_listing_form(mut multipart: Multipart) -> Result<ListingForm, AppError> {
    let mut form = ListingForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidOperation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = Some(text_field(field).await?),
            "description" => form.description = Some(text_field(field).await?),
            "price" => form.price = Some(text_field(field).await?),
            "stock" => {
                let raw = text_field(field).await?;
                let stock: i32 = raw.trim().parse().map_err(|_| {
                    AppError::InvalidOperation(format!("Invalid stock value: {}", raw))
                })?;
                if stock < 0 {
                    return Err(AppError::InvalidOperation(
                        "Stock cannot be negative".to_string(),
                    ));
                }
                form.stock = Some(stock);
            }
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        AppError::InvalidOperation(format!("Failed to read image: {}", e))
                    })?
                    .to_vec();
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Public storefront listing: in-stock products, newest first.
pub async fn available_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.db.list_available_products().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// The caller's own products, newest first.
pub async fn my_products(
    State(state): State<AppState>,
    CurrentAdmin(caller): CurrentAdmin,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.db.list_products_by_owner(caller.admin_id).await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Every product across all sellers. Super-admin gate runs in the middleware
/// chain.
pub async fn all_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.db.list_all_products().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Create a listing. The owner is always the caller; the image is uploaded to
/// the asset host before the row is written.
pub async fn create_product(
    State(state): State<AppState>,
    CurrentAdmin(caller): CurrentAdmin,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_listing_form(multipart).await?;

    let image = form
        .image
        .ok_or_else(|| AppError::InvalidOperation("An image file is required".to_string()))?;
    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::InvalidOperation("A product name is required".to_string()))?;
    let price = form
        .price
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::InvalidOperation("A price is required".to_string()))?;

    let uploaded = state
        .assets
        .upload_image(
            caller.admin_id,
            &image.file_name,
            &image.content_type,
            &image.bytes,
        )
        .await?;

    let product = state
        .db
        .create_product(&NewProduct {
            admin_id: caller.admin_id,
            name,
            description: form.description,
            price,
            image_url: uploaded.url,
            stock: form.stock.unwrap_or(0),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::with_seller(product, &caller)),
    ))
}

/// Partial update of an owned listing. A product owned by someone else is
/// reported exactly like one that does not exist.
pub async fn update_product(
    State(state): State<AppState>,
    CurrentAdmin(caller): CurrentAdmin,
    Path(product_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>, AppError> {
    let form = read_listing_form(multipart).await?;

    let current = state
        .db
        .find_product_owned(product_id, caller.admin_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(
                "Product not found or you do not have permission to edit it".to_string(),
            )
        })?;

    let image_url = match form.image {
        Some(image) => Some(
            state
                .assets
                .upload_image(
                    caller.admin_id,
                    &image.file_name,
                    &image.content_type,
                    &image.bytes,
                )
                .await?
                .url,
        ),
        None => None,
    };

    let changes = ProductUpdate {
        name: form.name,
        description: form.description,
        price: form.price,
        image_url,
        stock: form.stock,
    }
    .merge(&current);

    let updated = state
        .db
        .update_product(product_id, caller.admin_id, &changes)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(
                "Product not found or you do not have permission to edit it".to_string(),
            )
        })?;

    Ok(Json(ProductResponse::with_seller(updated, &caller)))
}

/// Delete a listing. Owners delete their own; super-admins delete anyone's.
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentAdmin(caller): CurrentAdmin,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let product = state
        .db
        .find_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if !caller.is_super_admin && product.admin_id != caller.admin_id {
        return Err(AppError::Forbidden(
            "You can only delete your own products".to_string(),
        ));
    }

    if !state.db.delete_product(product_id).await? {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    tracing::info!(product_id = %product_id, deleted_by = %caller.admin_id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
