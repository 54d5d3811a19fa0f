use secrecy::SecretString;
use std::env;

use crate::error::AppError;

/// Process-wide configuration, loaded once before serving traffic.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub assets: AssetHostConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HS256 signing secret. Rotation is out of scope.
    pub token_secret: SecretString,
    pub token_validity_days: i64,
}

#[derive(Debug, Clone)]
pub struct AssetHostConfig {
    pub base_url: String,
    pub folder: String,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl MarketConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::Config(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = MarketConfig {
            environment,
            service_name: get_env("SERVICE_NAME", Some("market-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            port: get_env("PORT", Some("5000"), is_prod)?
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    AppError::Config(anyhow::anyhow!("Invalid PORT: {}", e))
                })?,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: get_env("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?
                    .parse()
                    .unwrap_or(10),
                min_connections: get_env("DATABASE_MIN_CONNECTIONS", Some("1"), is_prod)?
                    .parse()
                    .unwrap_or(1),
            },
            auth: AuthConfig {
                token_secret: SecretString::new(get_env("TOKEN_SECRET", None, is_prod)?),
                token_validity_days: get_env("TOKEN_VALIDITY_DAYS", Some("30"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::Config(anyhow::anyhow!("Invalid TOKEN_VALIDITY_DAYS: {}", e))
                    })?,
            },
            assets: AssetHostConfig {
                base_url: get_env("ASSET_HOST_URL", None, is_prod)?,
                folder: get_env("ASSET_FOLDER", Some("market_products"), is_prod)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("http://localhost:3000"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.port == 0 && self.environment == Environment::Prod {
            return Err(AppError::Config(anyhow::anyhow!(
                "PORT must be greater than 0 in production"
            )));
        }

        if self.auth.token_validity_days <= 0 {
            return Err(AppError::Config(anyhow::anyhow!(
                "TOKEN_VALIDITY_DAYS must be positive"
            )));
        }

        if self.environment == Environment::Prod
            && self.security.allowed_origins.iter().any(|o| o == "*")
        {
            return Err(AppError::Config(anyhow::anyhow!(
                "Wildcard CORS origin not allowed in production"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::Config(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::Config(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
