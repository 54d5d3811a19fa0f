//! Common test utilities for market-service integration tests.

use axum::{routing::post, Json, Router};
use market_service::config::{
    AssetHostConfig, AuthConfig, DatabaseConfig, Environment, MarketConfig, SecurityConfig,
};
use market_service::startup::Application;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Once;
use uuid::Uuid;

static INIT: Once = Once::new();

/// A few bytes standing in for an image file.
pub const FAKE_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,market_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub pool: PgPool,
}

/// Spawn the application on port 0 against `TEST_DATABASE_URL`, with a stub
/// asset host standing in for the real one. Returns `None` when the database
/// is not configured, so tests skip instead of failing on dev machines.
pub async fn spawn_app() -> Option<TestApp> {
    init_tracing();

    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping integration test");
        return None;
    };

    let asset_host_url = spawn_stub_asset_host().await;

    let config = MarketConfig {
        environment: Environment::Dev,
        service_name: "market-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        port: 0,
        database: DatabaseConfig {
            url: database_url.clone(),
            max_connections: 2,
            min_connections: 1,
        },
        auth: AuthConfig {
            token_secret: SecretString::new("integration-test-secret".to_string()),
            token_validity_days: 30,
        },
        assets: AssetHostConfig {
            base_url: asset_host_url,
            folder: "market_products_test".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    };

    let app = Application::build(config)
        .await
        .expect("Failed to build application");
    let port = app.port();

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect test pool");

    Some(TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        pool,
    })
}

/// Minimal asset host: accepts the upload payload and answers with a durable
/// URL derived from the submitted public id.
async fn spawn_stub_asset_host() -> String {
    let router = Router::new().route(
        "/image/upload",
        post(|Json(body): Json<serde_json::Value>| async move {
            let public_id = body["public_id"].as_str().unwrap_or("asset").to_string();
            Json(serde_json::json!({
                "secure_url": format!("https://assets.test/{}.jpg", public_id)
            }))
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub asset host");
    let addr = listener.local_addr().expect("stub asset host addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://{}", addr)
}

/// Unique email per test run so tests never collide on the shared database.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}

impl TestApp {
    pub async fn register(&self, name: &str, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/auth/register", self.address))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "phone": "0812000111",
                "location": "Bandung",
                "password": password,
            }))
            .send()
            .await
            .expect("register request failed")
    }

    /// Register and unwrap the new account id and session token.
    pub async fn register_ok(&self, email: &str) -> (Uuid, String) {
        let response = self.register("Test Seller", email, "pw1").await;
        assert_eq!(response.status().as_u16(), 201);

        let body: serde_json::Value = response.json().await.expect("register body");
        let id = body["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("account id in register response");
        let token = body["token"]
            .as_str()
            .expect("token in register response")
            .to_string();
        (id, token)
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/auth/login", self.address))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed")
    }

    /// Flip the role flag directly in the store; there is deliberately no API
    /// for creating super-admins.
    pub async fn promote_to_super_admin(&self, admin_id: Uuid) {
        sqlx::query("UPDATE admins SET is_super_admin = TRUE WHERE admin_id = $1")
            .bind(admin_id)
            .execute(&self.pool)
            .await
            .expect("promotion failed");
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("get request failed")
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed")
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed")
    }

    pub async fn create_product(
        &self,
        token: &str,
        name: &str,
        price: &str,
        stock: i32,
    ) -> reqwest::Response {
        let image = reqwest::multipart::Part::bytes(FAKE_IMAGE.to_vec())
            .file_name("listing.png")
            .mime_str("image/png")
            .expect("image part");
        let form = reqwest::multipart::Form::new()
            .text("name", name.to_string())
            .text("description", "integration test listing".to_string())
            .text("price", price.to_string())
            .text("stock", stock.to_string())
            .part("image", image);

        self.client
            .post(format!("{}/api/products", self.address))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("create product request failed")
    }

    /// Create a product and unwrap its response body.
    pub async fn create_product_ok(
        &self,
        token: &str,
        name: &str,
        price: &str,
        stock: i32,
    ) -> serde_json::Value {
        let response = self.create_product(token, name, price, stock).await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.expect("create product body")
    }

    /// Partial update: only the given fields go into the multipart form.
    pub async fn update_product(
        &self,
        token: &str,
        product_id: &str,
        fields: &[(&str, &str)],
    ) -> reqwest::Response {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }

        self.client
            .put(format!("{}/api/products/{}", self.address, product_id))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("update product request failed")
    }
}
