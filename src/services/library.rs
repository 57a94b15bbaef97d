//! Saved product library
//!
//! Every operation is scoped to one owner. Another user's product behaves
//! exactly like a missing one.

use crate::db::repositories::{ProductQuery, ProductRepository};
use crate::models::{
    GeneratedContent, ProductFilter, ProductMetadata, ProductStats, ProductUpdate, SavedProduct,
    LIBRARY_LIST_LIMIT,
};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Revenue estimate for a product whose price range has no amounts
const DEFAULT_PRODUCT_VALUE: f64 = 25.0;

const RECENT_PRODUCTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

pub struct LibraryService {
    products: Arc<dyn ProductRepository>,
    price: Regex,
}

impl LibraryService {
    pub fn new(products: Arc<dyn ProductRepository>) -> anyhow::Result<Self> {
        Ok(Self {
            products,
            price: Regex::new(r"\$(\d+(?:\.\d{2})?)")
                .map_err(|e| anyhow::anyhow!("Regex error: {}", e))?,
        })
    }

    /// Store a generated product and return its id
    pub async fn save(
        &self,
        user_id: i64,
        content: &GeneratedContent,
        metadata: &ProductMetadata,
    ) -> Result<String> {
        let product = SavedProduct::new(user_id, content, metadata);
        self.products.create(&product).await?;
        tracing::info!("Saved product {} for user {}", product.id, user_id);
        Ok(product.id)
    }

    /// Newest first, at most [`LIBRARY_LIST_LIMIT`] before the text filter
    pub async fn list(&self, user_id: i64, filter: &ProductFilter) -> Result<Vec<SavedProduct>> {
        let query = ProductQuery {
            product_type: filter.product_type.as_deref().filter(|s| !s.is_empty()),
            niche: filter.niche.as_deref().filter(|s| !s.is_empty()),
            limit: Some(LIBRARY_LIST_LIMIT),
        };
        let products = self.products.list(user_id, query).await?;
        Ok(products
            .into_iter()
            .filter(|p| filter.matches_query(p))
            .collect())
    }

    pub async fn get(&self, user_id: i64, id: &str) -> Result<Option<SavedProduct>> {
        Ok(self.products.get(user_id, id).await?)
    }

    async fn require(&self, user_id: i64, id: &str) -> Result<SavedProduct> {
        self.get(user_id, id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    pub async fn update(
        &self,
        user_id: i64,
        id: &str,
        update: ProductUpdate,
    ) -> Result<SavedProduct> {
        let mut product = self.require(user_id, id).await?;
        product.apply(update);
        if !self.products.update(&product).await? {
            return Err(LibraryError::NotFound(id.to_string()));
        }
        Ok(product)
    }

    pub async fn delete(&self, user_id: i64, id: &str) -> Result<()> {
        if !self.products.delete(user_id, id).await? {
            return Err(LibraryError::NotFound(id.to_string()));
        }
        tracing::info!("Deleted product {} for user {}", id, user_id);
        Ok(())
    }

    pub async fn stats(&self, user_id: i64) -> Result<ProductStats> {
        let products = self.list(user_id, &ProductFilter::default()).await?;

        let mut products_by_type = BTreeMap::new();
        for product in &products {
            *products_by_type
                .entry(product.product_type.clone())
                .or_insert(0) += 1;
        }

        let revenue: f64 = products
            .iter()
            .map(|p| self.estimated_value(&p.price_range))
            .sum();

        Ok(ProductStats {
            total_products: products.len(),
            products_by_type,
            recent_products: products.iter().take(RECENT_PRODUCTS).cloned().collect(),
            total_revenue_potential: format!("${:.2}", revenue),
        })
    }

    /// Mean of the dollar amounts in a price range
    fn estimated_value(&self, price_range: &str) -> f64 {
        let prices: Vec<f64> = self
            .price
            .captures_iter(price_range)
            .filter_map(|c| c[1].parse().ok())
            .collect();
        if prices.is_empty() {
            DEFAULT_PRODUCT_VALUE
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        }
    }

    /// Remember that `format` was exported; each format is listed once
    pub async fn record_export(&self, user_id: i64, id: &str, format: &str) -> Result<SavedProduct> {
        let product = self.require(user_id, id).await?;
        if product.export_formats.iter().any(|f| f == format) {
            return Ok(product);
        }

        let mut formats = product.export_formats.clone();
        formats.push(format.to_string());
        self.update(
            user_id,
            id,
            ProductUpdate {
                export_formats: Some(formats),
                ..Default::default()
            },
        )
        .await
    }
}
