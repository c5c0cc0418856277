//! In-memory implementation of SessionStore for testing and development

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{SessionData, SessionId, SessionStore, SessionUpdate};
use crate::core::{SessionError, StorefrontResult};

#[derive(Debug, Clone)]
struct Entry {
    data: SessionData,
    last_seen: DateTime<Utc>,
}

/// In-memory session store
///
/// Sessions idle for longer than the configured TTL are treated as missing
/// and evicted on the next write. Uses RwLock for thread-safe access.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Entry>>>,
    idle_ttl: Duration,
}

impl InMemorySessionStore {
    pub const DEFAULT_IDLE_TTL_SECS: i64 = 3600;

    pub fn new() -> Self {
        Self::with_idle_ttl(Duration::seconds(Self::DEFAULT_IDLE_TTL_SECS))
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Number of stored sessions, including idle ones not yet evicted
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every idle session now; returns how many were removed
    pub fn evict_idle(&self) -> StorefrontResult<usize> {
        let mut sessions = self.write()?;
        Ok(self.purge(&mut sessions, Utc::now()))
    }

    fn is_live(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        now - entry.last_seen <= self.idle_ttl
    }

    fn purge(&self, sessions: &mut HashMap<SessionId, Entry>, now: DateTime<Utc>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| self.is_live(entry, now));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted idle sessions");
        }
        evicted
    }

    fn write(
        &self,
    ) -> StorefrontResult<std::sync::RwLockWriteGuard<'_, HashMap<SessionId, Entry>>> {
        Ok(self
            .sessions
            .write()
            .map_err(|e| SessionError::LockPoisoned(e.to_string()))?)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: &SessionId) -> StorefrontResult<Option<SessionData>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| SessionError::LockPoisoned(e.to_string()))?;

        let now = Utc::now();
        Ok(sessions
            .get(id)
            .filter(|entry| self.is_live(entry, now))
            .map(|entry| entry.data.clone()))
    }

    async fn save(&self, id: &SessionId, data: SessionData) -> StorefrontResult<()> {
        let mut sessions = self.write()?;
        let now = Utc::now();
        self.purge(&mut sessions, now);
        sessions.insert(*id, Entry { data, last_seen: now });
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> StorefrontResult<()> {
        let mut sessions = self.write()?;
        sessions.remove(id);
        Ok(())
    }

    async fn update(&self, id: &SessionId, edit: SessionUpdate<'_>) -> StorefrontResult<SessionData> {
        let mut sessions = self.write()?;
        let now = Utc::now();
        self.purge(&mut sessions, now);

        let mut data = sessions
            .get(id)
            .map(|entry| entry.data.clone())
            .unwrap_or_default();
        edit(&mut data)?;

        sessions.insert(
            *id,
            Entry {
                data: data.clone(),
                last_seen: now,
            },
        );
        Ok(data)
    }
}
