//! Static asset routing.

use std::env;
use std::path::PathBuf;

use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::http::Uri;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::domain::AppError;

/// Default directory holding the widget assets
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Page served for `/`
pub const INDEX_FILE: &str = "index.html";

/// Where the widget assets live
#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub public_dir: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
        }
    }
}

impl AssetConfig {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    pub fn from_env() -> Self {
        env::var("PUBLIC_DIR")
            .ok()
            .filter(|d| !d.is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn index_path(&self) -> PathBuf {
        self.public_dir.join(INDEX_FILE)
    }
}

async fn asset_not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// `GET /` serves the index page; every other path is looked up in the
/// asset directory.
pub fn create_router(config: &AssetConfig) -> Router {
    let assets =
        ServeDir::new(&config.public_dir).not_found_service(asset_not_found.into_service());

    Router::new()
        .route_service("/", ServeFile::new(config.index_path()))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
}
