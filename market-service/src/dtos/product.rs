use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{AdminProfile, Product, ProductWithSeller};

/// Product view with the owning seller's details denormalized in, as the
/// storefront expects. `adminId` is a string on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub image: String,
    pub stock: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub admin_id: String,
    pub seller_name: String,
    pub seller_phone: Option<String>,
    pub location: Option<String>,
    pub is_super_admin: bool,
}

impl From<ProductWithSeller> for ProductResponse {
    fn from(row: ProductWithSeller) -> Self {
        Self {
            id: row.product_id,
            name: row.name,
            description: row.description,
            price: row.price,
            image: row.image_url,
            stock: row.stock,
            status: row.status,
            created_at: row.created_utc,
            admin_id: row.admin_id.to_string(),
            seller_name: row.seller_name,
            seller_phone: row.seller_phone,
            location: row.seller_location,
            is_super_admin: row.seller_is_super_admin,
        }
    }
}

impl ProductResponse {
    /// Build from a bare product row plus the caller's own profile, for paths
    /// where the seller *is* the authenticated account.
    pub fn with_seller(product: Product, seller: &AdminProfile) -> Self {
        Self {
            id: product.product_id,
            name: product.name,
            description: product.description,
            price: product.price,
            image: product.image_url,
            stock: product.stock,
            status: product.status,
            created_at: product.created_utc,
            admin_id: product.admin_id.to_string(),
            seller_name: seller.name.clone(),
            seller_phone: seller.phone.clone(),
            location: seller.location.clone(),
            is_super_admin: seller.is_super_admin,
        }
    }
}
