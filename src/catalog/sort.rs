//! Sort options exposed through the `sort_by` query parameter
//!
//! Two lookup tables exist: one for product-wide listings and one for
//! collection-scoped listings. They share URL slugs but map to different
//! upstream enums (`ProductSortKeys` vs `ProductCollectionSortKeys`).

use serde::{Deserialize, Serialize};

use crate::core::{RequestError, StorefrontError};

/// Sort keys accepted by the `products` connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSortKey {
    BestSelling,
    CreatedAt,
    Id,
    Price,
    ProductType,
    Relevance,
    Title,
    UpdatedAt,
    Vendor,
}

/// Sort keys accepted by `collection.products`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCollectionSortKey {
    BestSelling,
    CollectionDefault,
    Created,
    Id,
    Manual,
    Price,
    Relevance,
    Title,
}

/// Upstream sort key; serializes to the bare enum value (e.g. `"TITLE"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum SortKey {
    Product(ProductSortKey),
    Collection(ProductCollectionSortKey),
}

/// Which lookup table applies to a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortContext {
    /// The all-products catalog
    Product,
    /// A single collection
    Collection,
}

impl std::str::FromStr for SortContext {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" | "products" | "catalog" => Ok(SortContext::Product),
            "collection" | "collections" => Ok(SortContext::Collection),
            other => Err(RequestError::InvalidPath {
                path: other.to_string(),
                message: "unknown sort context".to_string(),
            }
            .into()),
        }
    }
}

/// A resolved sort choice: what the API receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub reverse: bool,
}

/// One row of a lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOption {
    pub slug: &'static str,
    pub display_name: &'static str,
    #[serde(skip)]
    pub key: SortKey,
    #[serde(skip)]
    pub reverse: bool,
}

impl SortOption {
    pub fn spec(&self) -> SortSpec {
        SortSpec {
            key: self.key,
            reverse: self.reverse,
        }
    }
}

const fn product(
    slug: &'static str,
    display_name: &'static str,
    key: ProductSortKey,
    reverse: bool,
) -> SortOption {
    SortOption {
        slug,
        display_name,
        key: SortKey::Product(key),
        reverse,
    }
}

const fn collection(
    slug: &'static str,
    display_name: &'static str,
    key: ProductCollectionSortKey,
    reverse: bool,
) -> SortOption {
    SortOption {
        slug,
        display_name,
        key: SortKey::Collection(key),
        reverse,
    }
}

pub static PRODUCT_SORT_OPTIONS: [SortOption; 8] = [
    product("manual", "Featured", ProductSortKey::Id, false),
    product("best-selling", "Best selling", ProductSortKey::BestSelling, false),
    product("title-ascending", "Alphabetically, A-Z", ProductSortKey::Title, false),
    product("title-descending", "Alphabetically, Z-A", ProductSortKey::Title, true),
    product("price-ascending", "Price, low to high", ProductSortKey::Price, false),
    product("price-descending", "Price, high to low", ProductSortKey::Price, true),
    product("created-ascending", "Date, old to new", ProductSortKey::CreatedAt, false),
    product("created-descending", "Date, new to old", ProductSortKey::CreatedAt, true),
];

pub static COLLECTION_SORT_OPTIONS: [SortOption; 8] = [
    collection("manual", "Featured", ProductCollectionSortKey::Manual, false),
    collection("best-selling", "Best selling", ProductCollectionSortKey::BestSelling, false),
    collection("title-ascending", "Alphabetically, A-Z", ProductCollectionSortKey::Title, false),
    collection("title-descending", "Alphabetically, Z-A", ProductCollectionSortKey::Title, true),
    collection("price-ascending", "Price, low to high", ProductCollectionSortKey::Price, false),
    collection("price-descending", "Price, high to low", ProductCollectionSortKey::Price, true),
    collection("created-ascending", "Date, old to new", ProductCollectionSortKey::Created, false),
    collection("created-descending", "Date, new to old", ProductCollectionSortKey::Created, true),
];

/// All options for a context, in dropdown order
pub fn options(context: SortContext) -> &'static [SortOption] {
    match context {
        SortContext::Product => &PRODUCT_SORT_OPTIONS,
        SortContext::Collection => &COLLECTION_SORT_OPTIONS,
    }
}

/// Resolve a URL slug; unknown slugs yield `None` (platform default order)
pub fn lookup(context: SortContext, slug: &str) -> Option<&'static SortOption> {
    options(context).iter().find(|o| o.slug == slug)
}
