//! Structured filter predicates sent to the catalog search API

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// A single constraint on a product listing
///
/// Serializes to the upstream `ProductFilter` input object:
///
/// | variant       | JSON                                                   |
/// |---------------|--------------------------------------------------------|
/// | `Availability`| `{"available": true}`                                  |
/// | `Option`      | `{"variantOption": {"name": "Color", "value": "Red"}}` |
/// | `PriceRange`  | `{"price": {"min": 10.0, "max": 50.0}}`                |
/// | `Metafield`   | `{"productMetafield": {"namespace", "key", "value"}}`  |
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    Availability {
        available: bool,
    },
    Option {
        name: String,
        value: String,
    },
    PriceRange {
        min: Option<f64>,
        max: Option<f64>,
    },
    Metafield {
        namespace: String,
        key: String,
        value: String,
    },
}

#[derive(Serialize)]
struct VariantOption<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct PriceBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
}

#[derive(Serialize)]
struct ProductMetafield<'a> {
    namespace: &'a str,
    key: &'a str,
    value: &'a str,
}

impl Serialize for FilterPredicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            FilterPredicate::Availability { available } => {
                map.serialize_entry("available", available)?;
            }
            FilterPredicate::Option { name, value } => {
                map.serialize_entry("variantOption", &VariantOption { name, value })?;
            }
            FilterPredicate::PriceRange { min, max } => {
                map.serialize_entry(
                    "price",
                    &PriceBounds {
                        min: *min,
                        max: *max,
                    },
                )?;
            }
            FilterPredicate::Metafield {
                namespace,
                key,
                value,
            } => {
                map.serialize_entry(
                    "productMetafield",
                    &ProductMetafield {
                        namespace,
                        key,
                        value,
                    },
                )?;
            }
        }
        map.end()
    }
}

impl FilterPredicate {
    /// Identity used for optional de-duplication; price ranges are never merged
    pub(crate) fn dedupe_key(&self) -> Option<(u8, &str, &str, &str)> {
        match self {
            FilterPredicate::Availability { available } => {
                Some((0, if *available { "1" } else { "0" }, "", ""))
            }
            FilterPredicate::Option { name, value } => Some((1, name.as_str(), value.as_str(), "")),
            FilterPredicate::Metafield {
                namespace,
                key,
                value,
            } => Some((2, namespace.as_str(), key.as_str(), value.as_str())),
            FilterPredicate::PriceRange { .. } => None,
        }
    }
}

/// Encodes the value of a `filter.p.m.*` parameter into an upstream reference
///
/// Metafield filter values in URLs look like `cotton-12345`: a handle-ish
/// prefix and a trailing id. The codec turns that into whatever opaque
/// reference the API expects.
pub trait ReferenceCodec: Send + Sync + std::fmt::Debug {
    fn encode(&self, raw: &str) -> String;
}

/// Default codec: trailing token after the last `-` wrapped as a Metaobject GID
#[derive(Debug, Clone)]
pub struct MetaobjectGidCodec {
    prefix: String,
}

impl MetaobjectGidCodec {
    pub const DEFAULT_PREFIX: &'static str = "gid://shopify/Metaobject/";

    pub fn new() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for MetaobjectGidCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceCodec for MetaobjectGidCodec {
    fn encode(&self, raw: &str) -> String {
        // rsplit always yields at least one item
        let token = raw.rsplit('-').next().unwrap_or(raw);
        format!("{}{}", self.prefix, token)
    }
}
