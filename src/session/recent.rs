//! Recently viewed products
//!
//! Product pages post the product title here; the list is used to build a
//! `title:` search query for the "recently viewed" carousel.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::{StorefrontResult, ValidationError};

/// Ordered, duplicate-free list of product titles, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentlyViewed {
    titles: IndexSet<String>,
}

impl RecentlyViewed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a view
    ///
    /// A title already present moves to the newest position. When the list is
    /// full the oldest entries are evicted so that at most `capacity` remain.
    pub fn record(&mut self, title: &str, capacity: usize) -> StorefrontResult<()> {
        if title.trim().is_empty() {
            return Err(ValidationError::field("title", "title is required").into());
        }

        self.titles.shift_remove(title);

        let capacity = capacity.max(1);
        while self.titles.len() >= capacity {
            self.titles.shift_remove_index(0);
        }

        self.titles.insert(title.to_string());
        Ok(())
    }

    /// Storefront search syntax, e.g. `title:Shirt OR title:Hat`
    pub fn search_query(&self) -> String {
        self.titles
            .iter()
            .map(|t| format!("title:{}", t))
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    pub fn titles(&self) -> Vec<&str> {
        self.titles.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
