//! Catalog listing parameters: filters, sort options and their URL encoding

pub mod filter;
pub mod sort;
pub mod translate;

pub use filter::{FilterPredicate, MetaobjectGidCodec, ReferenceCodec};
pub use sort::{
    ProductCollectionSortKey, ProductSortKey, SortContext, SortKey, SortOption, SortSpec,
};
pub use translate::{CatalogQuery, PricePolicy, TranslateOptions, Translator, translate};
