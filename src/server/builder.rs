//! StorefrontServerBuilder for a fluent server setup

use super::router::build_routes;
use super::state::AppState;
use crate::admin::{AdminClient, HttpAdminClient, NewsletterService};
use crate::config::StorefrontConfig;
use crate::session::{InMemorySessionStore, SessionStore};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Entry point for building a storefront server
pub struct StorefrontServer;

impl StorefrontServer {
    pub fn builder() -> StorefrontServerBuilder {
        StorefrontServerBuilder::new()
    }
}

/// Builder for the storefront HTTP server
///
/// # Example
///
/// ```ignore
/// let app = StorefrontServer::builder()
///     .with_config(StorefrontConfig::from_yaml_file("storefront.yaml")?)
///     .with_session_store(InMemorySessionStore::new())
///     .build()?;
/// ```
pub struct StorefrontServerBuilder {
    config: Option<StorefrontConfig>,
    session_store: Option<Arc<dyn SessionStore>>,
    admin_client: Option<Arc<dyn AdminClient>>,
    custom_routes: Vec<Router>,
}

impl StorefrontServerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            session_store: None,
            admin_client: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the configuration (required)
    pub fn with_config(mut self, config: StorefrontConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the session store; defaults to an [`InMemorySessionStore`] using
    /// `session.idle_ttl_secs`
    pub fn with_session_store(mut self, store: impl SessionStore + 'static) -> Self {
        self.session_store = Some(Arc::new(store));
        self
    }

    /// Set the Admin API client
    ///
    /// Without one, a [`HttpAdminClient`] is created when the configuration
    /// carries an access token; otherwise newsletter subscription is disabled.
    pub fn with_admin_client(mut self, client: impl AdminClient + 'static) -> Self {
        self.admin_client = Some(Arc::new(client));
        self
    }

    /// Merge extra routes into the final router
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Assemble the shared handler state
    pub fn build_state(&mut self) -> Result<AppState> {
        let config = self
            .config
            .take()
            .ok_or_else(|| anyhow::anyhow!("StorefrontConfig is required. Call .with_config()"))?;
        config.validate()?;

        let sessions = self
            .session_store
            .take()
            .unwrap_or_else(|| {
                Arc::new(InMemorySessionStore::with_idle_ttl(config.session.idle_ttl()))
            });

        let admin_client = match self.admin_client.take() {
            Some(client) => Some(client),
            None if config.shop.admin_access_token.is_some() => {
                Some(Arc::new(HttpAdminClient::from_config(&config.shop)?) as Arc<dyn AdminClient>)
            }
            None => {
                tracing::warn!("no Admin API access token configured, newsletter disabled");
                None
            }
        };

        Ok(AppState::new(
            config,
            sessions,
            admin_client.map(NewsletterService::new),
        ))
    }

    /// Build the router
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;
        let custom_routes = std::mem::take(&mut self.custom_routes);
        Ok(build_routes(state, custom_routes))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Storefront listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for StorefrontServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
