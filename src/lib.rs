//! # Storefront-RS
//!
//! Server-side plumbing for a headless Shopify storefront.
//!
//! ## Features
//!
//! - **Catalog Filters**: Translate listing URLs (`filter.v.price.gte=10&sort_by=price-ascending`)
//!   into Storefront API `ProductFilter` predicates and sort keys
//! - **Cursor Pagination**: Forward/backward page variables from `cursor` and `direction`
//! - **Overlay Coordination**: One open side panel per page, Escape to close
//! - **Newsletter**: Subscribe shoppers through the Admin API without duplicating customers
//! - **Recently Viewed**: Per-session history turned into a product search query
//! - **Configuration-Based**: Shop, catalog and session settings from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = StorefrontConfig::from_yaml_file("storefront.yaml")?;
//!     let bind = config.server.bind.clone();
//!
//!     StorefrontServer::builder()
//!         .with_config(config)
//!         .serve(&bind)
//!         .await
//! }
//! ```

pub mod admin;
pub mod catalog;
pub mod config;
pub mod core;
pub mod overlay;
pub mod server;
pub mod session;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        PaginationVariables, QueryParams, StorefrontError, StorefrontResult,
    };

    // === Catalog ===
    pub use crate::catalog::{
        CatalogQuery, FilterPredicate, MetaobjectGidCodec, PricePolicy, ReferenceCodec,
        SortContext, SortOption, TranslateOptions, Translator, translate,
    };

    // === Overlay ===
    pub use crate::overlay::{
        OverlayAction, OverlayCoordinator, OverlayKind, OverlayState, ProductRef, VariantRef,
    };

    // === Session ===
    pub use crate::session::{InMemorySessionStore, SessionData, SessionId, SessionStore};

    // === Admin ===
    pub use crate::admin::{
        AdminClient, Customer, CustomerEmailMarketingState, HttpAdminClient, NewsletterForm,
        NewsletterService,
    };

    // === Config ===
    pub use crate::config::StorefrontConfig;

    // === Server ===
    pub use crate::server::{AppState, StorefrontServer, StorefrontServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{
        Router,
        routing::{get, post},
    };
}
