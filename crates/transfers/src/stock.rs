//! Quantity bounds for a product in a transfer.
//!
//! The upper bound comes from the locally known stock figure, which may be
//! stale. A quantity of 1 is always selectable; the inventory service makes the
//! authoritative stock check when the transfer is created.

use forgepos_catalog::Product;

/// Legal quantity range `[1, max]` derived from a stock snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StockLimit {
    available: u32,
}

impl StockLimit {
    pub const MIN_QUANTITY: u32 = 1;

    pub fn new(available: u32) -> Self {
        Self { available }
    }

    /// Snapshot the product's current stock figure.
    pub fn of(product: &Product) -> Self {
        Self::new(product.available_stock())
    }

    /// Stock figure this limit was taken from.
    pub fn available(&self) -> u32 {
        self.available
    }

    pub fn max(&self) -> u32 {
        self.available.max(Self::MIN_QUANTITY)
    }

    /// Clamp any requested value (including negative ones) into `[1, max]`.
    pub fn clamp(&self, requested: i64) -> u32 {
        let clamped = requested.clamp(i64::from(Self::MIN_QUANTITY), i64::from(self.max()));
        // In range of u32 after clamping.
        clamped as u32
    }

    pub fn allows(&self, quantity: u32) -> bool {
        (Self::MIN_QUANTITY..=self.max()).contains(&quantity)
    }
}

/// Largest quantity of `product` that may be placed in a transfer. Never 0.
pub fn max_quantity(product: &Product) -> u32 {
    StockLimit::of(product).max()
}

/// Clamp `requested` into `[1, max_quantity(product)]`.
pub fn clamp_quantity(product: &Product, requested: i64) -> u32 {
    StockLimit::of(product).clamp(requested)
}
