//! Configuration loading and management

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

use crate::catalog::{MetaobjectGidCodec, PricePolicy, SortContext, TranslateOptions, Translator};
use crate::core::{ConfigError, StorefrontResult};

/// Shop and Admin API connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// `my-shop.myshopify.com`
    pub store_domain: String,

    /// Admin API version, e.g. `2025-01`
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Private app access token; newsletter subscription is disabled without it
    #[serde(default)]
    pub admin_access_token: Option<String>,
}

impl ShopConfig {
    pub fn admin_endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }
}

/// Listing pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Products per page on a collection page
    pub collection_page_by: usize,

    /// Products per page on the all-products catalog
    pub catalog_page_by: usize,

    pub price_policy: PricePolicy,

    pub dedupe_predicates: bool,

    /// Prefix applied to metafield filter references
    pub metaobject_gid_prefix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            collection_page_by: 8,
            catalog_page_by: 12,
            price_policy: PricePolicy::default(),
            dedupe_predicates: false,
            metaobject_gid_prefix: MetaobjectGidCodec::DEFAULT_PREFIX.to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn page_by(&self, context: SortContext) -> usize {
        match context {
            SortContext::Collection => self.collection_page_by,
            SortContext::Product => self.catalog_page_by,
        }
    }

    pub fn translate_options(&self) -> TranslateOptions {
        TranslateOptions {
            price_policy: self.price_policy,
            dedupe_predicates: self.dedupe_predicates,
            reference_codec: Arc::new(MetaobjectGidCodec::with_prefix(
                self.metaobject_gid_prefix.clone(),
            )),
        }
    }

    pub fn translator(&self, context: SortContext) -> Translator {
        Translator::new(context, self.translate_options())
    }
}

/// Session cookie and per-session limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub recently_viewed_count: usize,

    /// Seconds without a write after which the in-memory store forgets a session
    pub idle_ttl_secs: u64,
}

impl SessionConfig {
    pub fn idle_ttl(&self) -> chrono::Duration {
        i64::try_from(self.idle_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "storefront_session".to_string(),
            recently_viewed_count: 4,
            idle_ttl_secs: 3600,
        }
    }
}

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Complete storefront configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    pub shop: ShopConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_api_version() -> String {
    "2025-01".to_string()
}

fn api_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4}-(01|04|07|10)|unstable)$").unwrap())
}

impl StorefrontConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> StorefrontResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::ParseError {
                message: e.to_string(),
            },
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> StorefrontResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the storefront cannot work with
    pub fn validate(&self) -> StorefrontResult<()> {
        if self.shop.store_domain.trim().is_empty() {
            return Err(ConfigError::MissingValue {
                field: "shop.store_domain".to_string(),
            }
            .into());
        }
        if !api_version_regex().is_match(&self.shop.api_version) {
            return Err(invalid(
                "shop.api_version",
                format!("'{}' is not a YYYY-MM release", self.shop.api_version),
            ));
        }
        if self.catalog.collection_page_by == 0 {
            return Err(invalid("catalog.collection_page_by", "must be at least 1"));
        }
        if self.catalog.catalog_page_by == 0 {
            return Err(invalid("catalog.catalog_page_by", "must be at least 1"));
        }
        if self.session.recently_viewed_count == 0 {
            return Err(invalid("session.recently_viewed_count", "must be at least 1"));
        }
        if self.session.idle_ttl_secs == 0 {
            return Err(invalid("session.idle_ttl_secs", "must be at least 1"));
        }
        if self.session.cookie_name.is_empty()
            || !self
                .session
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid(
                "session.cookie_name",
                "must be non-empty ASCII alphanumerics, '_' or '-'",
            ));
        }
        Ok(())
    }

    /// Create a default configuration for testing
    pub fn default_config() -> Self {
        Self {
            shop: ShopConfig {
                store_domain: "example.myshopify.com".to_string(),
                api_version: default_api_version(),
                admin_access_token: None,
            },
            catalog: CatalogConfig::default(),
            session: SessionConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> crate::core::StorefrontError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
    .into()
}
