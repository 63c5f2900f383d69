use serde::{Deserialize, Serialize};

use forgepos_core::{Entity, ProductId};

/// A catalog product with its last known stock figure at the source location.
///
/// The stock figure may be stale; the inventory service is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sku: Option<String>,
    #[serde(default)]
    available_stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, available_stock: u32) -> Self {
        Self {
            id,
            name: name.into(),
            sku: None,
            available_stock,
            image_url: None,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    pub fn available_stock(&self) -> u32 {
        self.available_stock
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .sku
                .as_deref()
                .is_some_and(|sku| sku.to_lowercase().contains(needle))
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Products whose name or SKU contains `query` (case-insensitive), in input order.
///
/// A blank query matches everything.
pub fn search_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }
    products.iter().filter(|p| p.matches(&needle)).collect()
}
