//! Product category.

use serde::{Deserialize, Serialize};

use super::id::CategoryId;

/// A catalog category.
///
/// Addressable both by `id` and by `slug`; the server keeps the two in
/// agreement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// Category id.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Image URL.
    pub image: String,
    /// URL slug.
    pub slug: String,
}
