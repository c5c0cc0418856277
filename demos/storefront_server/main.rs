//! Storefront server
//!
//! ```bash
//! STOREFRONT_CONFIG=storefront.yaml SHOPIFY_ADMIN_API_TOKEN=shpat_... \
//!     cargo run --example storefront_server
//! ```
//!
//! Without `STOREFRONT_CONFIG` the built-in defaults are used and the
//! newsletter endpoint answers with a configuration error.

use storefront::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match std::env::var("STOREFRONT_CONFIG") {
        Ok(path) => StorefrontConfig::from_yaml_file(&path)?,
        Err(_) => StorefrontConfig::default_config(),
    };

    if let Ok(token) = std::env::var("SHOPIFY_ADMIN_API_TOKEN") {
        config.shop.admin_access_token = Some(token);
    }

    let bind = config.server.bind.clone();

    println!("🛒 Storefront for {}", config.shop.store_domain);
    println!("   GET  http://{}/catalog/variables?sort_by=price-ascending", bind);
    println!("   GET  http://{}/collections/{{handle}}/variables", bind);
    println!("   GET  http://{}/sort-options/collection", bind);
    println!("   POST http://{}/newsletter", bind);
    println!("   POST http://{}/recent", bind);
    println!("   GET  http://{}/overlay\n", bind);

    StorefrontServer::builder()
        .with_config(config)
        .with_session_store(InMemorySessionStore::new())
        .serve(&bind)
        .await
}
