//! Page metadata publishing.
//!
//! The document head is an external collaborator reached through
//! [`MetaTagSink`]. [`MetaTagsService`] fills in store defaults and pushes
//! the title plus six tags, always in the same order: `title`,
//! `description`, `og:title`, `og:description`, `og:image`, `og:url`.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};

use ng_store_core::Product;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used when a page provides none.
pub const DEFAULT_TITLE: &str = "Ng Store";

/// Description used when a page provides none.
pub const DEFAULT_DESCRIPTION: &str = "Ng Store is a store for Ng products";

/// Error raised by a [`MetaTagSink`].
#[derive(Debug, Error)]
#[error("Meta tag update failed: {0}")]
pub struct MetaSinkError(pub String);

/// Partial page metadata. Absent or empty fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
}

impl PageMetadata {
    /// Metadata for a product detail page.
    #[must_use]
    pub fn for_product(product: &Product, domain: &str) -> Self {
        Self {
            title: Some(product.title.clone()),
            description: Some(product.description.clone()),
            image: product.first_image().map(str::to_string),
            url: Some(format!(
                "{}/product/{}",
                domain.trim_end_matches('/'),
                product.slug
            )),
        }
    }
}

/// Which attribute identifies a meta tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaAttribute {
    /// `<meta name="...">`
    Name,
    /// `<meta property="...">`
    Property,
}

impl MetaAttribute {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Property => "property",
        }
    }
}

/// A single meta tag update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub attribute: MetaAttribute,
    pub key: &'static str,
    pub content: String,
}

impl MetaTag {
    /// A `name` tag.
    #[must_use]
    pub fn name(key: &'static str, content: impl Into<String>) -> Self {
        Self {
            attribute: MetaAttribute::Name,
            key,
            content: content.into(),
        }
    }

    /// A `property` tag.
    #[must_use]
    pub fn property(key: &'static str, content: impl Into<String>) -> Self {
        Self {
            attribute: MetaAttribute::Property,
            key,
            content: content.into(),
        }
    }
}

/// Receives title and meta tag updates for the current document.
pub trait MetaTagSink: Send + Sync {
    /// Set the document title.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be updated.
    fn set_title(&self, title: &str) -> Result<(), MetaSinkError>;

    /// Add or replace a meta tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be updated.
    fn update_tag(&self, tag: &MetaTag) -> Result<(), MetaSinkError>;
}

// =============================================================================
// MetaTagsService
// =============================================================================

/// Applies page metadata to a [`MetaTagSink`].
#[derive(Clone)]
pub struct MetaTagsService {
    sink: Arc<dyn MetaTagSink>,
    domain: String,
}

impl MetaTagsService {
    /// Create a service writing to `sink`; `domain` is the default `og:url`.
    #[must_use]
    pub fn new(sink: Arc<dyn MetaTagSink>, domain: impl Into<String>) -> Self {
        Self {
            sink,
            domain: domain.into(),
        }
    }

    /// The configured public domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The six tags for `data`, with defaults applied, in publishing order.
    #[must_use]
    pub fn tags_for(&self, data: &PageMetadata) -> [MetaTag; 6] {
        let title = or_default(data.title.as_deref(), DEFAULT_TITLE);
        let description = or_default(data.description.as_deref(), DEFAULT_DESCRIPTION);
        let image = or_default(data.image.as_deref(), "");
        let url = or_default(data.url.as_deref(), &self.domain);

        [
            MetaTag::name("title", title),
            MetaTag::name("description", description),
            MetaTag::property("og:title", title),
            MetaTag::property("og:description", description),
            MetaTag::property("og:image", image),
            MetaTag::property("og:url", url),
        ]
    }

    /// Publish `data` to the sink.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the sink; later tags are not sent.
    pub fn update_meta_tags(&self, data: &PageMetadata) -> Result<(), MetaSinkError> {
        self.sink
            .set_title(or_default(data.title.as_deref(), DEFAULT_TITLE))?;
        for tag in &self.tags_for(data) {
            self.sink.update_tag(tag)?;
        }
        Ok(())
    }
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => default,
    }
}

// =============================================================================
// HeadTagsSink
// =============================================================================

/// A sink that keeps the document head in memory and renders it as HTML.
#[derive(Debug, Default)]
pub struct HeadTagsSink {
    head: Mutex<Head>,
}

#[derive(Debug, Default)]
struct Head {
    title: Option<String>,
    tags: Vec<MetaTag>,
}

impl HeadTagsSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `<title>` and `<meta>` elements, one per line.
    #[must_use]
    pub fn render(&self) -> String {
        let head = self.head.lock().unwrap_or_else(PoisonError::into_inner);
        let mut html = String::new();
        if let Some(title) = &head.title {
            let _ = writeln!(html, "<title>{}</title>", escape_html(title));
        }
        for tag in &head.tags {
            let _ = writeln!(
                html,
                r#"<meta {}="{}" content="{}">"#,
                tag.attribute.as_str(),
                tag.key,
                escape_html(&tag.content)
            );
        }
        html
    }
}

impl MetaTagSink for HeadTagsSink {
    fn set_title(&self, title: &str) -> Result<(), MetaSinkError> {
        self.head
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .title = Some(title.to_string());
        Ok(())
    }

    fn update_tag(&self, tag: &MetaTag) -> Result<(), MetaSinkError> {
        let mut head = self.head.lock().unwrap_or_else(PoisonError::into_inner);
        match head
            .tags
            .iter_mut()
            .find(|t| t.attribute == tag.attribute && t.key == tag.key)
        {
            Some(existing) => existing.content.clone_from(&tag.content),
            None => head.tags.push(tag.clone()),
        }
        Ok(())
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
