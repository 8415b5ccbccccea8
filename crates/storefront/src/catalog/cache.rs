//! Cache types for catalog responses.

use std::sync::Arc;

use ng_store_core::{Category, Product};

/// Cached value types, keyed by request path and query.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Arc<Product>),
    Products(Arc<Vec<Product>>),
    Categories(Arc<Vec<Category>>),
}

/// Conversion between a decoded response and its cache slot.
pub trait Cached: Sized {
    fn into_cache(self) -> CacheValue;
    fn from_cache(value: CacheValue) -> Option<Self>;
}

impl Cached for Product {
    fn into_cache(self) -> CacheValue {
        CacheValue::Product(Arc::new(self))
    }

    fn from_cache(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Product(product) => Some(Arc::unwrap_or_clone(product)),
            _ => None,
        }
    }
}

impl Cached for Vec<Product> {
    fn into_cache(self) -> CacheValue {
        CacheValue::Products(Arc::new(self))
    }

    fn from_cache(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Products(products) => Some(Arc::unwrap_or_clone(products)),
            _ => None,
        }
    }
}

impl Cached for Vec<Category> {
    fn into_cache(self) -> CacheValue {
        CacheValue::Categories(Arc::new(self))
    }

    fn from_cache(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Categories(categories) => Some(Arc::unwrap_or_clone(categories)),
            _ => None,
        }
    }
}
