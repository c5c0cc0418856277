//! Application state shared across handlers

use std::sync::Arc;

use crate::admin::NewsletterService;
use crate::catalog::{SortContext, Translator};
use crate::config::StorefrontConfig;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<StorefrontConfig>,
    pub sessions: Arc<dyn SessionStore>,
    /// `None` when no Admin API credentials are configured
    pub newsletter: Option<Arc<NewsletterService>>,
    pub collection_translator: Arc<Translator>,
    pub catalog_translator: Arc<Translator>,
}

impl AppState {
    pub fn new(
        config: StorefrontConfig,
        sessions: Arc<dyn SessionStore>,
        newsletter: Option<NewsletterService>,
    ) -> Self {
        let collection_translator = Arc::new(config.catalog.translator(SortContext::Collection));
        let catalog_translator = Arc::new(config.catalog.translator(SortContext::Product));
        Self {
            config: Arc::new(config),
            sessions,
            newsletter: newsletter.map(Arc::new),
            collection_translator,
            catalog_translator,
        }
    }

    pub fn translator(&self, context: SortContext) -> &Translator {
        match context {
            SortContext::Collection => &self.collection_translator,
            SortContext::Product => &self.catalog_translator,
        }
    }
}
