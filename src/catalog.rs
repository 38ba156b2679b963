// 🌐 Product Catalog - remote listing → in-memory catalog map
// One blocking GET with a bounded timeout; failures degrade to "no products"

use crate::config::CatalogConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// ============================================================================
// WIRE TYPES
// ============================================================================

/// One entry of the catalog listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Missing ids decode as 0, which never matches
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Entries are decoded one by one so a single malformed product is skipped
/// instead of failing the whole listing
#[derive(Debug, Deserialize)]
struct ProductListing {
    #[serde(default)]
    products: Vec<serde_json::Value>,
}

impl ProductListing {
    fn into_entries(self) -> Vec<CatalogEntry> {
        self.products
            .into_iter()
            .enumerate()
            .filter_map(|(position, value)| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("Skipping malformed catalog product #{}: {}", position, err);
                    None
                }
            })
            .collect()
    }
}

// ============================================================================
// CATALOG MAP
// ============================================================================

/// Attributes kept locally for enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub rating: Option<f64>,
}

/// Numeric catalog id → retained attributes
pub type CatalogMap = HashMap<u64, CatalogInfo>;

/// Build the lookup map. Id 0 is never a usable key and is skipped;
/// a repeated id keeps its last entry.
pub fn create_product_mapping(entries: &[CatalogEntry]) -> CatalogMap {
    entries
        .iter()
        .filter(|entry| entry.id != 0)
        .map(|entry| {
            (
                entry.id,
                CatalogInfo {
                    category: entry.category.clone(),
                    brand: entry.brand.clone(),
                    rating: entry.rating,
                },
            )
        })
        .collect()
}

// ============================================================================
// CATALOG SOURCE
// ============================================================================

/// Anything that can list catalog products
pub trait CatalogSource {
    fn fetch_products(&self) -> Result<Vec<CatalogEntry>>;
}

/// Fetch products, logging and returning an empty list on any failure
pub fn fetch_all_products(source: &dyn CatalogSource) -> Vec<CatalogEntry> {
    match source.fetch_products() {
        Ok(products) => products,
        Err(err) => {
            log::warn!("Error fetching catalog data: {:#}", err);
            Vec::new()
        }
    }
}

/// Fixed, in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub products: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(products: Vec<CatalogEntry>) -> Self {
        StaticCatalog { products }
    }
}

impl CatalogSource for StaticCatalog {
    fn fetch_products(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.products.clone())
    }
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

/// Blocking client for a `{"products": [...]}` listing endpoint
pub struct HttpCatalogClient {
    http: reqwest::blocking::Client,
    url: String,
}

impl HttpCatalogClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sales-analytics/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build catalog HTTP client")?;

        Ok(HttpCatalogClient {
            http,
            url: url.into(),
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(config.url.clone(), config.timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CatalogSource for HttpCatalogClient {
    fn fetch_products(&self) -> Result<Vec<CatalogEntry>> {
        log::info!("Requesting catalog products from {}...", self.url);

        let response = self
            .http
            .get(&self.url)
            .send()
            .with_context(|| format!("Catalog request to {} failed", self.url))?
            .error_for_status()
            .context("Catalog endpoint returned an error status")?;

        let listing: ProductListing = response
            .json()
            .context("Catalog response is not a valid product listing")?;

        let products = listing.into_entries();
        log::info!("Requesting catalog products...done ({} products)", products.len());
        Ok(products)
    }
}

// ============================================================================
// TESTS
// ============================================================================
