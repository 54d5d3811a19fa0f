//! Client for the external asset host that stores product images.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::AssetHostConfig;
use crate::error::AppError;

/// Asset-host client. Images go up as base64 data URIs; the host answers with
/// a durable URL. Single attempt per upload, failures surfaced immediately.
#[derive(Clone)]
pub struct AssetStore {
    http: reqwest::Client,
    base_url: String,
    folder: String,
}

#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl AssetStore {
    pub fn new(config: &AssetHostConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            folder: config.folder.clone(),
        }
    }

    /// Upload an image on behalf of an account and return its durable URL.
    pub async fn upload_image(
        &self,
        owner_id: Uuid,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<UploadedAsset, AppError> {
        let public_id = derive_public_id(owner_id, Utc::now().timestamp_millis(), file_name);
        let body = json!({
            "file": to_data_uri(content_type, bytes),
            "folder": self.folder,
            "public_id": public_id,
        });

        let response = self
            .http
            .post(format!("{}/image/upload", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(anyhow::anyhow!("Asset upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(anyhow::anyhow!(
                "Asset host returned {}",
                response.status()
            )));
        }

        let uploaded: UploadResponse = response.json().await.map_err(|e| {
            AppError::Upstream(anyhow::anyhow!("Invalid asset host response: {}", e))
        })?;

        tracing::info!(owner_id = %owner_id, public_id = %public_id, "Image uploaded");

        Ok(UploadedAsset {
            url: uploaded.secure_url,
            public_id,
        })
    }
}

/// Per-upload identifier: owner id, millisecond timestamp, filename stem.
fn derive_public_id(owner_id: Uuid, timestamp_millis: i64, file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    format!("{}-{}-{}", owner_id, timestamp_millis, stem)
}

fn to_data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, BASE64.encode(bytes))
}
