//! Query string and pagination utilities

use serde::Serialize;

/// An ordered multi-map of decoded query string pairs
///
/// Storefront URLs repeat keys freely (`filter.v.option.color=Red&filter.v.option.color=Blue`),
/// so the pairs are kept in request order instead of being folded into a map.
///
/// # Example
/// ```
/// use storefront::core::QueryParams;
///
/// let params = QueryParams::parse("sort_by=price-ascending&filter.v.availability=In+stock");
/// assert_eq!(params.get("sort_by"), Some("price-ascending"));
/// assert_eq!(params.get("filter.v.availability"), Some("In stock"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a raw (form-urlencoded) query string; a leading `?` is ignored
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Build from already decoded pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl From<Vec<(String, String)>> for QueryParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

/// Paging direction requested through the `direction` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageDirection {
    #[default]
    Next,
    Previous,
}

/// Cursor pagination variables for a connection query
///
/// Forward paging produces `{first, endCursor}`, backward paging
/// `{last, startCursor}`; the cursor is `null` on the first page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PaginationVariables {
    Forward {
        first: usize,
        #[serde(rename = "endCursor")]
        end_cursor: Option<String>,
    },
    Backward {
        last: usize,
        #[serde(rename = "startCursor")]
        start_cursor: Option<String>,
    },
}

impl PaginationVariables {
    /// Read `cursor` and `direction` from the query string
    pub fn from_params(params: &QueryParams, page_by: usize) -> Self {
        let page_by = page_by.max(1);
        let cursor = params.get("cursor").map(str::to_string);
        let direction = match params.get("direction") {
            Some(d) if d.eq_ignore_ascii_case("previous") => PageDirection::Previous,
            _ => PageDirection::Next,
        };

        match direction {
            PageDirection::Previous => PaginationVariables::Backward {
                last: page_by,
                start_cursor: cursor,
            },
            PageDirection::Next => PaginationVariables::Forward {
                first: page_by,
                end_cursor: cursor,
            },
        }
    }
}
