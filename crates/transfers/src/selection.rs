//! The in-progress set of products chosen for a transfer.

use forgepos_catalog::Product;
use forgepos_core::{Entity, ProductId};

use crate::stock::StockLimit;

/// One selected product and its quantity.
///
/// The stock limit is captured when the product is selected and is not
/// refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    product_id: ProductId,
    product_name: String,
    product_sku: Option<String>,
    quantity: u32,
    limit: StockLimit,
}

impl SelectionEntry {
    fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id(),
            product_name: product.name().to_string(),
            product_sku: product.sku().map(str::to_string),
            quantity: StockLimit::MIN_QUANTITY,
            limit: StockLimit::of(product),
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn product_sku(&self) -> Option<&str> {
        self.product_sku.as_deref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn max_quantity(&self) -> u32 {
        self.limit.max()
    }

    pub fn can_increment(&self) -> bool {
        self.quantity
            .checked_add(1)
            .is_some_and(|next| self.limit.allows(next))
    }

    pub fn can_decrement(&self) -> bool {
        self.quantity
            .checked_sub(1)
            .is_some_and(|next| self.limit.allows(next))
    }

    fn set_clamped(&mut self, requested: i64) -> u32 {
        self.quantity = self.limit.clamp(requested);
        self.quantity
    }
}

/// A selected entry whose quantity exceeds the freshest known stock figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleEntry {
    pub product_id: ProductId,
    pub selected: u32,
    pub available: u32,
}

/// Ordered set of selected products, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    entries: Vec<SelectionEntry>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `product` if selected, otherwise select it with quantity 1.
    ///
    /// Returns whether the product is selected afterwards.
    pub fn toggle(&mut self, product: &Product) -> bool {
        let id = product.id();
        if self.remove(id).is_some() {
            false
        } else {
            self.entries.push(SelectionEntry::from_product(product));
            true
        }
    }

    /// Set the quantity of a selected product, clamped to its stock limit.
    ///
    /// Returns the stored quantity, or `None` when the product is not selected.
    pub fn set_quantity(&mut self, product_id: ProductId, value: i64) -> Option<u32> {
        self.entry_mut(product_id).map(|e| e.set_clamped(value))
    }

    pub fn increment(&mut self, product_id: ProductId) -> Option<u32> {
        self.entry_mut(product_id)
            .map(|e| e.set_clamped(i64::from(e.quantity) + 1))
    }

    /// Decrease by one, stopping at 1. Never removes the entry.
    pub fn decrement(&mut self, product_id: ProductId) -> Option<u32> {
        self.entry_mut(product_id)
            .map(|e| e.set_clamped(i64::from(e.quantity) - 1))
    }

    pub fn remove(&mut self, product_id: ProductId) -> Option<SelectionEntry> {
        let idx = self.entries.iter().position(|e| e.product_id == product_id)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in selection order.
    pub fn items(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn get(&self, product_id: ProductId) -> Option<&SelectionEntry> {
        self.entries.iter().find(|e| e.product_id == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all selected quantities.
    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    /// Entries whose quantity is above the stock reported in `live`.
    ///
    /// Products missing from `live` are not reported. Nothing is modified.
    pub fn stale_entries(&self, live: &[Product]) -> Vec<StaleEntry> {
        self.entries
            .iter()
            .filter_map(|e| {
                let product = live.iter().find(|p| p.id() == e.product_id)?;
                let available = product.available_stock();
                (e.quantity > available).then_some(StaleEntry {
                    product_id: e.product_id,
                    selected: e.quantity,
                    available,
                })
            })
            .collect()
    }

    fn entry_mut(&mut self, product_id: ProductId) -> Option<&mut SelectionEntry> {
        self.entries.iter_mut().find(|e| e.product_id == product_id)
    }
}
