//! Catalog query layer plus admin product mutations.
//!
//! Read-mostly: product and category fetches are cached for five
//! minutes. Search queries bypass the cache, and any admin mutation
//! invalidates it wholesale. No coordination beyond simple
//! request/response; pagination is server-driven.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use clementine_core::{NewProduct, Product, ProductId, ProductPage, ProductUpdate};

use crate::api::ApiClient;
use crate::error::ApiError;

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Filters for a product listing request. Unset fields are omitted
/// from the query string.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ProductQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

/// Explicit witness that the user confirmed a destructive action.
///
/// `delete_product` takes this by value, so the confirmation step
/// structurally precedes the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
}

#[derive(Clone)]
enum CacheValue {
    Page(ProductPage),
    Product(Box<Product>),
    Categories(Vec<String>),
}

/// Client for the product catalog.
///
/// Cheaply cloneable; all clones share one response cache.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    api: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl Catalog {
    /// Create the catalog layer.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogInner { api, cache }),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Get a paginated product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let cache_key = format!(
            "products:{}:{}:{}",
            query.page.unwrap_or(1),
            query.limit.unwrap_or(0),
            query.category.as_deref().unwrap_or("")
        );

        // Check cache (only for queries without search)
        if query.search.is_none()
            && let Some(CacheValue::Page(page)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let page: ProductPage = self
            .inner
            .api
            .get_with_query("api/products", &query.to_params())
            .await?;

        if query.search.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Page(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or
    /// an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .inner
            .api
            .get(&format!("api/products/{product_id}"))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the distinct category list, exactly as the server provides
    /// it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, ApiError> {
        let cache_key = "categories".to_owned();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<String> = self.inner.api.get("api/products/categories").await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Admin mutations (thin pass-throughs)
    // =========================================================================

    /// Create a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the caller is not
    /// an admin.
    #[instrument(skip(self, product))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let created: Product = self.inner.api.post("api/products", product).await?;
        self.invalidate_all().await;
        Ok(created)
    }

    /// Update a product (admin). Only set fields are sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the caller is not
    /// an admin.
    #[instrument(skip(self, update), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, ApiError> {
        let updated: Product = self
            .inner
            .api
            .put(&format!("api/products/{product_id}"), update)
            .await?;
        self.invalidate_all().await;
        Ok(updated)
    }

    /// Delete a product (admin). The [`DeleteConfirmation`] witness
    /// keeps the request behind an explicit confirmation step.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the caller is not
    /// an admin.
    #[instrument(skip(self, _confirmation), fields(product_id = %product_id))]
    pub async fn delete_product(
        &self,
        product_id: &ProductId,
        _confirmation: DeleteConfirmation,
    ) -> Result<(), ApiError> {
        self.inner
            .api
            .delete_no_content(&format!("api/products/{product_id}"))
            .await?;
        self.invalidate_all().await;
        Ok(())
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_omit_unset() {
        let query = ProductQuery {
            page: Some(2),
            category: Some("fruit".to_owned()),
            ..ProductQuery::default()
        };
        let params = query.to_params();
        assert_eq!(
            params,
            vec![("page", "2".to_owned()), ("category", "fruit".to_owned())]
        );
    }

    #[test]
    fn test_empty_query_has_no_params() {
        assert!(ProductQuery::default().to_params().is_empty());
    }
}
