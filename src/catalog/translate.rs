//! Translation of storefront URL parameters into catalog query variables
//!
//! Collection and catalog pages encode the shopper's filter and sort choices
//! in the query string:
//!
//! ```text
//! /collections/shirts?sort_by=price-ascending
//!     &filter.v.availability=In+stock
//!     &filter.v.option.color=Red
//!     &filter.v.price.gte=10&filter.v.price.lte=50
//!     &filter.p.m.custom.material=cotton-12345
//! ```
//!
//! Each key is classified by an ordered list of matchers; every match yields a
//! typed [`FilterPredicate`] or a [`SortSpec`]. Keys nobody claims are skipped so
//! that newer URLs keep working against older builds.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use super::filter::{FilterPredicate, MetaobjectGidCodec, ReferenceCodec};
use super::sort::{self, SortContext, SortSpec};
use crate::core::{PaginationVariables, QueryParams, StorefrontResult, ValidationError};

/// What to do with a price bound that is not a finite number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// Treat the malformed bound as "no bound"; the other bound still applies
    #[default]
    DropBound,
    /// Drop the whole price filter if any bound is malformed
    DropFilter,
    /// Fail the translation with a validation error
    Reject,
}

/// Tunables for [`Translator`]
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub price_policy: PricePolicy,
    /// Collapse identical option/metafield/availability predicates
    pub dedupe_predicates: bool,
    pub reference_codec: Arc<dyn ReferenceCodec>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            price_policy: PricePolicy::default(),
            dedupe_predicates: false,
            reference_codec: Arc::new(MetaobjectGidCodec::new()),
        }
    }
}

/// Filters and sort order for one catalog request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogQuery {
    pub filters: Vec<FilterPredicate>,
    pub sort: Option<SortSpec>,
}

impl CatalogQuery {
    /// GraphQL variables for a paginated products query
    ///
    /// `sortKey`/`reverse` are omitted when no sort was requested so that the
    /// platform default ordering applies.
    pub fn variables(&self, pagination: &PaginationVariables) -> Value {
        let mut vars = Map::new();
        vars.insert("filters".to_string(), json!(self.filters));

        if let Some(sort) = &self.sort {
            vars.insert("sortKey".to_string(), json!(sort.key));
            vars.insert("reverse".to_string(), json!(sort.reverse));
        }
        if let Value::Object(page) = json!(pagination) {
            vars.extend(page);
        }
        Value::Object(vars)
    }
}

/// A classified query parameter key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKey<'k> {
    Sort,
    PriceMin,
    PriceMax,
    Availability,
    Option { name: &'k str },
    Metafield { namespace: &'k str, key: &'k str },
}

type Matcher = for<'k> fn(&'k str) -> Option<ParamKey<'k>>;

fn price_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^filter\.v\.price(.*)$").unwrap())
}

fn option_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^filter\.v\.option\.([^.]+)").unwrap())
}

fn metafield_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^filter\.p\.m\.([^.]+)\.([^.]+)").unwrap())
}

fn match_sort(key: &str) -> Option<ParamKey<'_>> {
    (key == "sort_by").then_some(ParamKey::Sort)
}

fn match_price(key: &str) -> Option<ParamKey<'_>> {
    let caps = price_regex().captures(key)?;
    match caps.get(1).map(|m| m.as_str()) {
        Some(".gte") => Some(ParamKey::PriceMin),
        _ => Some(ParamKey::PriceMax),
    }
}

fn match_availability(key: &str) -> Option<ParamKey<'_>> {
    key.starts_with("filter.v.availability")
        .then_some(ParamKey::Availability)
}

fn match_option(key: &str) -> Option<ParamKey<'_>> {
    let caps = option_regex().captures(key)?;
    Some(ParamKey::Option {
        name: caps.get(1)?.as_str(),
    })
}

fn match_metafield(key: &str) -> Option<ParamKey<'_>> {
    let caps = metafield_regex().captures(key)?;
    Some(ParamKey::Metafield {
        namespace: caps.get(1)?.as_str(),
        key: caps.get(2)?.as_str(),
    })
}

const MATCHERS: &[Matcher] = &[
    match_sort,
    match_price,
    match_availability,
    match_option,
    match_metafield,
];

fn classify(key: &str) -> Option<ParamKey<'_>> {
    MATCHERS.iter().find_map(|m| m(key))
}

#[derive(Debug, Default)]
struct PriceAccumulator {
    min: Option<f64>,
    max: Option<f64>,
    min_malformed: bool,
    max_malformed: bool,
}

impl PriceAccumulator {
    fn into_filter(self, policy: PricePolicy) -> Option<FilterPredicate> {
        if (self.min_malformed || self.max_malformed) && policy == PricePolicy::DropFilter {
            tracing::warn!("dropping price filter with malformed bound");
            return None;
        }
        if self.min.is_none() && self.max.is_none() {
            return None;
        }
        Some(FilterPredicate::PriceRange {
            min: self.min,
            max: self.max,
        })
    }
}

/// Returns the bound (`None` = no bound) and whether the raw value was malformed
fn parse_bound(key: &str, raw: &str, policy: PricePolicy) -> StorefrontResult<(Option<f64>, bool)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok((None, false));
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok((Some(v), false)),
        _ => match policy {
            PricePolicy::Reject => Err(ValidationError::field(
                key,
                format!("'{}' is not a valid price", raw),
            )
            .into()),
            PricePolicy::DropBound | PricePolicy::DropFilter => {
                tracing::warn!(key, value = raw, "ignoring malformed price bound");
                Ok((None, true))
            }
        },
    }
}

fn dedupe(filters: Vec<FilterPredicate>) -> Vec<FilterPredicate> {
    let keep: Vec<bool> = {
        let mut seen = HashSet::new();
        filters
            .iter()
            .map(|f| f.dedupe_key().is_none_or(|k| seen.insert(k)))
            .collect()
    };
    filters
        .into_iter()
        .zip(keep)
        .filter_map(|(f, keep)| keep.then_some(f))
        .collect()
}

/// Converts URL parameters into a [`CatalogQuery`] for one sort context
#[derive(Debug, Clone)]
pub struct Translator {
    context: SortContext,
    options: TranslateOptions,
}

impl Translator {
    pub fn new(context: SortContext, options: TranslateOptions) -> Self {
        Self { context, options }
    }

    pub fn context(&self) -> SortContext {
        self.context
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    pub fn translate(&self, params: &QueryParams) -> StorefrontResult<CatalogQuery> {
        let policy = self.options.price_policy;
        let mut filters = Vec::new();
        let mut sort = None;
        let mut price = PriceAccumulator::default();

        for (key, value) in params.iter() {
            let Some(param) = classify(key) else {
                tracing::trace!(key, "ignoring unrecognized query parameter");
                continue;
            };

            match param {
                ParamKey::Sort => match sort::lookup(self.context, value) {
                    Some(option) => sort = Some(option.spec()),
                    None => tracing::debug!(slug = value, "unknown sort slug, using default order"),
                },
                ParamKey::PriceMin => {
                    let (bound, malformed) = parse_bound(key, value, policy)?;
                    price.min = bound;
                    price.min_malformed = malformed;
                }
                ParamKey::PriceMax => {
                    let (bound, malformed) = parse_bound(key, value, policy)?;
                    price.max = bound;
                    price.max_malformed = malformed;
                }
                ParamKey::Availability => filters.push(FilterPredicate::Availability {
                    available: value == "In stock",
                }),
                ParamKey::Option { name } => filters.push(FilterPredicate::Option {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
                ParamKey::Metafield {
                    namespace,
                    key: field,
                } => {
                    filters.push(FilterPredicate::Metafield {
                        namespace: namespace.to_string(),
                        key: field.to_string(),
                        value: self.options.reference_codec.encode(value),
                    })
                }
            }
        }

        if let Some(range) = price.into_filter(policy) {
            filters.push(range);
        }

        if self.options.dedupe_predicates {
            filters = dedupe(filters);
        }

        tracing::debug!(
            context = ?self.context,
            filters = filters.len(),
            sorted = sort.is_some(),
            "translated catalog parameters"
        );

        Ok(CatalogQuery { filters, sort })
    }
}

/// Translate with default options
pub fn translate(params: &QueryParams, context: SortContext) -> StorefrontResult<CatalogQuery> {
    Translator::new(context, TranslateOptions::default()).translate(params)
}
