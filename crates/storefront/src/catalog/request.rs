//! Catalog request construction.

use url::Url;
use url::form_urlencoded;

/// Path prefix shared by every catalog endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Category filters for product listings.
///
/// Both filters are optional and independent; the server decides whether
/// they agree. An empty string means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    /// Category id filter, sent as `categoryId`.
    pub category_id: Option<String>,
    /// Category slug filter, sent as `categorySlug`.
    pub category_slug: Option<String>,
}

impl ProductFilter {
    /// Filter by category id only.
    #[must_use]
    pub fn by_category_id(id: impl Into<String>) -> Self {
        Self {
            category_id: Some(id.into()),
            category_slug: None,
        }
    }

    /// Filter by category slug only.
    #[must_use]
    pub fn by_category_slug(slug: impl Into<String>) -> Self {
        Self {
            category_id: None,
            category_slug: Some(slug.into()),
        }
    }

    /// Query pairs for this filter, `categoryId` first.
    ///
    /// Absent and empty values are omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("categoryId", self.category_id.as_deref()),
            ("categorySlug", self.category_slug.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| match value {
            Some(value) if !value.is_empty() => Some((key, value.to_string())),
            _ => None,
        })
        .collect()
    }

    /// Whether the filter selects every product.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

/// A parameterized read against the catalog API.
///
/// Path segments are inserted verbatim, so an empty slug still produces a
/// request (`/products/slug/`) and the server decides the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogRequest {
    path: String,
    query: Vec<(&'static str, String)>,
}

impl CatalogRequest {
    /// A request for `path`, relative to [`API_PREFIX`].
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// `GET /categories`
    #[must_use]
    pub fn categories() -> Self {
        Self::new("categories")
    }

    /// `GET /products` with the filter's query parameters.
    #[must_use]
    pub fn products(filter: &ProductFilter) -> Self {
        Self {
            path: "products".to_string(),
            query: filter.query_pairs(),
        }
    }

    /// `GET /products/{id}`
    #[must_use]
    pub fn product(id: &str) -> Self {
        Self::new(format!("products/{id}"))
    }

    /// `GET /products/slug/{slug}`
    #[must_use]
    pub fn product_by_slug(slug: &str) -> Self {
        Self::new(format!("products/slug/{slug}"))
    }

    /// `GET /products/slug/{slug}/related`
    #[must_use]
    pub fn related_products(slug: &str) -> Self {
        Self::new(format!("products/slug/{slug}/related"))
    }

    /// Path and query string, e.g. `/api/v1/products?categoryId=123`.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        let mut target = format!("{API_PREFIX}/{}", self.path);
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter().map(|(k, v)| (*k, v.as_str())))
                .finish();
            target.push('?');
            target.push_str(&query);
        }
        target
    }

    /// Absolute URL of this request under `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL does not parse.
    pub fn url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let base = base.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{}", self.path_and_query()))
    }
}
