//! HTTP server exposing the storefront operations
//!
//! - Catalog variable endpoints for collection and catalog pages
//! - Newsletter and recently-viewed form actions
//! - Overlay state endpoints scoped to the session cookie

pub mod builder;
pub mod handlers;
pub mod router;
pub mod session;
pub mod state;

pub use builder::{StorefrontServer, StorefrontServerBuilder};
pub use router::build_routes;
pub use state::AppState;
