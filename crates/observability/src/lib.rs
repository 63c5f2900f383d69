//! Tracing/logging setup shared by ForgePOS binaries and test suites.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize human-readable logging routed through the test harness.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_for_tests() {
    tracing::init_for_tests();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
