//! Product catalog loaded once at startup and shared read-only.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::numbers::{cents_to_f64, price_to_cents};

const DEFAULT_CATALOG_DATA: &str = include_str!("../data/products.json");

/// Shelf price stored in whole cents to avoid floating-point drift.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(i64);

/// Rejected price value.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("price must be a non-negative finite number (got {0})")]
pub struct InvalidPrice(pub f64);

impl Price {
    /// Price of zero.
    pub const ZERO: Self = Self(0);

    /// Build a price from whole cents, clamping negatives to zero.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        if cents < 0 { Self(0) } else { Self(cents) }
    }

    /// Build a price from a currency amount rounded to cents.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        price_to_cents(value).map(Self)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        cents_to_f64(self.0)
    }

    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl TryFrom<f64> for Price {
    type Error = InvalidPrice;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value).ok_or(InvalidPrice(value))
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.as_f64()
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Optional upstream identifier; products are addressed by catalog index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
}

impl Product {
    /// Convenience constructor used by fixtures and hosts building catalogs in code.
    #[must_use]
    pub fn new(name: &str, price: Price, category: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            price,
            image_url: String::new(),
            category: category.to_string(),
        }
    }
}

/// Category restriction applied before a mode starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Parse a category key; `"all"` and blank keys select the whole catalog.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        let key = key.trim();
        if key.is_empty() || key.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(key.to_string())
        }
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Named(category) => product.category == *category,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogRepr {
    List(Vec<Product>),
    Wrapped { products: Vec<Product> },
}

impl From<CatalogRepr> for Catalog {
    fn from(value: CatalogRepr) -> Self {
        match value {
            CatalogRepr::List(products) | CatalogRepr::Wrapped { products } => {
                Self { products }
            }
        }
    }
}

/// Immutable product list backing every mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "CatalogRepr")]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    #[must_use]
    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Load a catalog from a JSON array or a `{ "products": [...] }` document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into products with valid prices.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Bundled sample catalog shipped with the crate.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_CATALOG_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Product> {
        self.products.get(index)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Products matching `filter`, preserving catalog order.
    #[must_use]
    pub fn filter_by_category(&self, filter: &CategoryFilter) -> Self {
        let products = self
            .products
            .iter()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect::<Vec<_>>();
        log::debug!(
            "category filter {filter:?} kept {} of {} products",
            products.len(),
            self.products.len()
        );
        Self { products }
    }

    /// Distinct non-empty categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in &self.products {
            let category = product.category.as_str();
            if !category.is_empty() && !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    /// Number of distinct prices; pairing modes need at least two.
    #[must_use]
    pub fn distinct_price_count(&self) -> usize {
        let mut prices = self.products.iter().map(|p| p.price).collect::<Vec<_>>();
        prices.sort_unstable();
        prices.dedup();
        prices.len()
    }
}
