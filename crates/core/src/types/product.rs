//! Catalog product.

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::id::ProductId;
use super::price::Price;

/// A product as served by the catalog API.
///
/// Products are immutable value objects on the client. The API always
/// sends at least one image in practice, but nothing here relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product id.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Long-form description.
    pub description: String,
    /// Category the product belongs to.
    pub category: Category,
    /// Image URLs in display order.
    pub images: Vec<String>,
    /// Creation timestamp, ISO-8601 as sent by the API. Not validated.
    pub creation_at: String,
    /// URL slug.
    pub slug: String,
}

impl Product {
    /// The image at `index`, if any.
    #[must_use]
    pub fn image(&self, index: usize) -> Option<&str> {
        self.images.get(index).map(String::as_str)
    }

    /// The first image, used as the initial cover.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.image(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PRODUCT_JSON: &str = r#"{
        "id": 1,
        "title": "Producto de Prueba",
        "price": 100,
        "description": "Descripción de Prueba",
        "category": {
            "id": 1,
            "name": "Categoría de Prueba",
            "image": "test.jpg",
            "slug": "categoria-prueba"
        },
        "images": ["test.jpg", "second.jpg"],
        "creationAt": "2025-02-14T10:30:00.000Z",
        "slug": "producto-prueba"
    }"#;

    #[test]
    fn test_deserialize_api_payload() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_units(100));
        assert_eq!(product.category.slug, "categoria-prueba");
        assert_eq!(product.slug, "producto-prueba");
        assert_eq!(product.creation_at, "2025-02-14T10:30:00.000Z");
    }

    #[test]
    fn test_creation_timestamp_is_kept_verbatim() {
        for timestamp in [
            "2025-02-14T10:30:00",
            "2025-02-14T10:30:00.000+02:00",
            "2025-02-14",
        ] {
            let json = PRODUCT_JSON.replace("2025-02-14T10:30:00.000Z", timestamp);
            let product: Product = serde_json::from_str(&json).unwrap();
            assert_eq!(product.creation_at, timestamp);

            let value = serde_json::to_value(&product).unwrap();
            assert_eq!(value["creationAt"], timestamp);
        }
    }

    #[test]
    fn test_image_accessors() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        assert_eq!(product.first_image(), Some("test.jpg"));
        assert_eq!(product.image(1), Some("second.jpg"));
        assert_eq!(product.image(2), None);
    }

    #[test]
    fn test_no_images_has_no_cover() {
        let mut product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        product.images.clear();
        assert_eq!(product.first_image(), None);
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let err = serde_json::from_str::<Product>(r#"{"id": 1}"#).unwrap_err();
        assert!(err.to_string().contains("missing field"));
    }
}
