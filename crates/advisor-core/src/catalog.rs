//! Catalog loading.
//!
//! The product document is fetched once per process and cached; later
//! `load` calls never touch the source again. Failures propagate to the
//! caller with no retry and no fallback data.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::CatalogConfig;
use crate::error::{AdvisorError, Result};
use crate::types::Product;

/// Shape of the static product document.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    products: Vec<Product>,
}

/// Parse a `{ "products": [...] }` document.
pub fn parse_catalog(raw: &str) -> Result<Vec<Product>> {
    let doc: CatalogDocument = serde_json::from_str(raw)?;
    Ok(doc.products)
}

/// Something that can produce the raw catalog document.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable location, used in logs.
    fn location(&self) -> String;

    /// Fetch the raw document text.
    async fn fetch(&self) -> Result<String>;
}

/// Catalog read from a local file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AdvisorError::Catalog(format!("Failed to read {}: {}", self.path.display(), e))
        })
    }
}

/// Catalog fetched over HTTP. Without a timeout a stalled server leaves the
/// load pending.
pub struct HttpSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("routine-advisor/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url,
        })
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    fn location(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Pick a source for the configured location: http(s) URLs go over the
/// network, anything else is a filesystem path.
pub fn source_from_config(config: &CatalogConfig) -> Result<Box<dyn CatalogSource>> {
    let source = config.source.trim();
    if source.is_empty() {
        return Err(AdvisorError::Config("catalog.source is empty".into()));
    }
    if source.starts_with("http://") || source.starts_with("https://") {
        let url = Url::parse(source)?;
        let timeout = config.timeout_secs.map(Duration::from_secs);
        Ok(Box::new(HttpSource::new(url, timeout)?))
    } else {
        Ok(Box::new(FileSource::new(source)))
    }
}

/// Loads the catalog on first use and serves the cached list afterwards.
pub struct CatalogLoader {
    source: Box<dyn CatalogSource>,
    cache: Option<Vec<Product>>,
}

impl CatalogLoader {
    pub fn new(source: Box<dyn CatalogSource>) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Ok(Self::new(source_from_config(config)?))
    }

    /// Return the product list, fetching it on the first call.
    pub async fn load(&mut self) -> Result<&[Product]> {
        if self.cache.is_none() {
            let location = self.source.location();
            let raw = self.source.fetch().await?;
            let products = parse_catalog(&raw).map_err(|e| {
                AdvisorError::Catalog(format!("Malformed catalog at {}: {}", location, e))
            })?;
            info!("Loaded {} products from {}", products.len(), location);
            self.cache = Some(products);
        } else {
            debug!("Catalog served from cache");
        }
        Ok(self.cache.as_deref().unwrap_or_default())
    }

    /// The cached list, if a load already succeeded.
    pub fn cached(&self) -> Option<&[Product]> {
        self.cache.as_deref()
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in self.cached().unwrap_or_default() {
            if !seen.contains(&product.category.as_str()) {
                seen.push(product.category.as_str());
            }
        }
        seen
    }
}
