//! Product listings and their stock-derived status.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Listing status, always recomputable from stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Available,
    SoldOut,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::SoldOut => "sold_out",
        }
    }

    /// Invariant: `Available` iff `stock > 0`.
    pub fn from_stock(stock: i32) -> Self {
        if stock > 0 {
            ProductStatus::Available
        } else {
            ProductStatus::SoldOut
        }
    }
}

/// Product row. `created_utc` is set once at insert and never updated.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub product_id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub image_url: String,
    pub stock: i32,
    pub status: String,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a product. The owner is the authenticated caller,
/// never client-supplied; status is derived from `stock` at insert.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub admin_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub image_url: String,
    pub stock: i32,
}

/// Partial update. A supplied field wins; an absent field retains the stored
/// value.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub image_url: Option<String>,
    pub stock: Option<i32>,
}

/// Fully resolved field set for an UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductChanges {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub image_url: String,
    pub stock: i32,
    pub status: ProductStatus,
}

impl ProductUpdate {
    /// Merge against the stored row. Status is recomputed from the effective
    /// stock, so it stays consistent whether or not stock was supplied.
    pub fn merge(self, current: &Product) -> ProductChanges {
        let stock = self.stock.unwrap_or(current.stock);
        ProductChanges {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.or_else(|| current.description.clone()),
            price: self.price.unwrap_or_else(|| current.price.clone()),
            image_url: self.image_url.unwrap_or_else(|| current.image_url.clone()),
            stock,
            status: ProductStatus::from_stock(stock),
        }
    }
}

/// Product row joined with the owning seller's public details, for listing
/// responses.
#[derive(Debug, Clone, FromRow)]
pub struct ProductWithSeller {
    pub product_id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub image_url: String,
    pub stock: i32,
    pub status: String,
    pub created_utc: DateTime<Utc>,
    pub seller_name: String,
    pub seller_phone: Option<String>,
    pub seller_location: Option<String>,
    pub seller_is_super_admin: bool,
}
