//! Page session state
//!
//! A session is identified by a cookie and holds what the storefront needs
//! to remember between requests: recently viewed products, the shopper's
//! newsletter consent, and the overlay coordinator for the current page.

pub mod in_memory;
pub mod recent;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::admin::CustomerEmailMarketingState;
use crate::core::StorefrontResult;
use crate::overlay::OverlayCoordinator;

pub use in_memory::InMemorySessionStore;
pub use recent::RecentlyViewed;

/// Opaque session identifier carried in the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Everything stored for one shopper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub recently_viewed: RecentlyViewed,

    /// Last known newsletter state, so the footer form can skip an API call
    #[serde(default)]
    pub marketing_state: Option<CustomerEmailMarketingState>,

    /// Page-scoped and never persisted
    #[serde(skip)]
    pub overlay: OverlayCoordinator,
}

/// In-place edit applied by [`SessionStore::update`]; an `Err` discards the edit
pub type SessionUpdate<'a> =
    Box<dyn FnOnce(&mut SessionData) -> StorefrontResult<()> + Send + 'a>;

/// Storage backend for sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session; `None` when it does not exist
    async fn load(&self, id: &SessionId) -> StorefrontResult<Option<SessionData>>;

    /// Insert or replace a session
    async fn save(&self, id: &SessionId, data: SessionData) -> StorefrontResult<()>;

    /// Forget a session
    async fn remove(&self, id: &SessionId) -> StorefrontResult<()>;

    /// Atomically read, edit and write back one session
    ///
    /// Starts from an empty session when none exists and returns the stored
    /// result. Concurrent updates of the same session never lose each other's
    /// changes.
    async fn update(&self, id: &SessionId, edit: SessionUpdate<'_>) -> StorefrontResult<SessionData>;

    /// Fetch a session or start an empty one
    async fn load_or_default(&self, id: &SessionId) -> StorefrontResult<SessionData> {
        Ok(self.load(id).await?.unwrap_or_default())
    }
}
