//! The API layer: static asset routing and error responses.

pub mod handlers;
pub mod router;

pub use router::{AssetConfig, DEFAULT_PUBLIC_DIR, INDEX_FILE, create_router};
