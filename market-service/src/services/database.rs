//! Database access for market-service.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{
    Admin, AdminProfile, NewAdmin, NewProduct, Product, ProductChanges, ProductStatus,
    ProductWithSeller,
};

/// Product columns joined with the owning seller's public details.
const PRODUCT_WITH_SELLER: &str = r#"
    SELECT p.product_id, p.admin_id, p.name, p.description, p.price, p.image_url,
           p.stock, p.status, p.created_utc,
           a.name AS seller_name, a.phone AS seller_phone,
           a.location AS seller_location, a.is_super_admin AS seller_is_super_admin
    FROM products p
    JOIN admins a ON a.admin_id = p.admin_id
"#;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(config), fields(service = "market-service"))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(&config.url)
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Admin accounts
    // -------------------------------------------------------------------------

    /// Create a new account. The unique email constraint is the backstop for
    /// the handler's pre-check; a violation surfaces as `DuplicateEmail`.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_admin(&self, input: &NewAdmin) -> Result<Admin, AppError> {
        let admin_id = Uuid::new_v4();
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (admin_id, name, email, phone, location, password_hash, is_super_admin)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING admin_id, name, email, phone, location, password_hash, is_super_admin
            "#,
        )
        .bind(admin_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.location)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateEmail
            }
            _ => AppError::Database(anyhow::anyhow!("Failed to create account: {}", e)),
        })?;

        info!(admin_id = %admin.admin_id, "Account created");
        Ok(admin)
    }

    /// Look up an account by email, hash included. Login path only.
    #[instrument(skip(self, email))]
    pub async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        sqlx::query_as::<_, Admin>(
            r#"
            SELECT admin_id, name, email, phone, location, password_hash, is_super_admin
            FROM admins
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to look up account: {}", e)))
    }

    /// Look up an account by id, excluding the password hash. Used after token
    /// verification to attach request context.
    #[instrument(skip(self))]
    pub async fn find_admin_profile(
        &self,
        admin_id: Uuid,
    ) -> Result<Option<AdminProfile>, AppError> {
        sqlx::query_as::<_, AdminProfile>(
            r#"
            SELECT admin_id, name, email, phone, location, is_super_admin
            FROM admins
            WHERE admin_id = $1
            "#,
        )
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to load account: {}", e)))
    }

    /// List every account, ascending by id.
    #[instrument(skip(self))]
    pub async fn list_admins(&self) -> Result<Vec<AdminProfile>, AppError> {
        sqlx::query_as::<_, AdminProfile>(
            r#"
            SELECT admin_id, name, email, phone, location, is_super_admin
            FROM admins
            ORDER BY admin_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list accounts: {}", e)))
    }

    /// Delete an account. Owned products go with it (cascade).
    #[instrument(skip(self))]
    pub async fn delete_admin(&self, admin_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM admins WHERE admin_id = $1")
            .bind(admin_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to delete account: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Insert a product. Status is derived from stock here so the invariant
    /// holds no matter what the caller assembled.
    #[instrument(skip(self, input), fields(admin_id = %input.admin_id))]
    pub async fn create_product(&self, input: &NewProduct) -> Result<Product, AppError> {
        let product_id = Uuid::new_v4();
        let status = ProductStatus::from_stock(input.stock);

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (product_id, admin_id, name, description, price, image_url, stock, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING product_id, admin_id, name, description, price, image_url, stock, status, created_utc
            "#,
        )
        .bind(product_id)
        .bind(input.admin_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.price)
        .bind(&input.image_url)
        .bind(input.stock)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to create product: {}", e)))?;

        info!(product_id = %product.product_id, "Product created");
        Ok(product)
    }

    /// Look up a product by id.
    #[instrument(skip(self))]
    pub async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT product_id, admin_id, name, description, price, image_url, stock, status, created_utc
            FROM products
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to look up product: {}", e)))
    }

    /// Look up a product by id *and* owner. Absence and foreign ownership are
    /// indistinguishable by construction; the update path relies on that.
    #[instrument(skip(self))]
    pub async fn find_product_owned(
        &self,
        product_id: Uuid,
        admin_id: Uuid,
    ) -> Result<Option<Product>, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT product_id, admin_id, name, description, price, image_url, stock, status, created_utc
            FROM products
            WHERE product_id = $1 AND admin_id = $2
            "#,
        )
        .bind(product_id)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to look up product: {}", e)))
    }

    /// Apply a resolved field set to an owned product. Returns `None` when the
    /// row no longer matches (deleted meanwhile, or not the caller's).
    #[instrument(skip(self, changes))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        admin_id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $1, description = $2, price = $3, image_url = $4, stock = $5, status = $6
            WHERE product_id = $7 AND admin_id = $8
            RETURNING product_id, admin_id, name, description, price, image_url, stock, status, created_utc
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.price)
        .bind(&changes.image_url)
        .bind(changes.stock)
        .bind(changes.status.as_str())
        .bind(product_id)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to update product: {}", e)))
    }

    /// Delete a product by id. Ownership is the handler's concern.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to delete product: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    /// In-stock products, newest first. Public listing.
    #[instrument(skip(self))]
    pub async fn list_available_products(&self) -> Result<Vec<ProductWithSeller>, AppError> {
        sqlx::query_as::<_, ProductWithSeller>(&format!(
            "{} WHERE p.stock > 0 ORDER BY p.created_utc DESC",
            PRODUCT_WITH_SELLER
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list products: {}", e)))
    }

    /// One seller's products, newest first.
    #[instrument(skip(self))]
    pub async fn list_products_by_owner(
        &self,
        admin_id: Uuid,
    ) -> Result<Vec<ProductWithSeller>, AppError> {
        sqlx::query_as::<_, ProductWithSeller>(&format!(
            "{} WHERE p.admin_id = $1 ORDER BY p.created_utc DESC",
            PRODUCT_WITH_SELLER
        ))
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list products: {}", e)))
    }

    /// Every product, newest first. Super-admin listing.
    #[instrument(skip(self))]
    pub async fn list_all_products(&self) -> Result<Vec<ProductWithSeller>, AppError> {
        sqlx::query_as::<_, ProductWithSeller>(&format!(
            "{} ORDER BY p.created_utc DESC",
            PRODUCT_WITH_SELLER
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list products: {}", e)))
    }
}
