pub mod assets;
pub mod database;
pub mod token;

pub use assets::{AssetStore, UploadedAsset};
pub use database::Database;
pub use token::{TokenError, TokenService};
