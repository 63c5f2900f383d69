//! Catalog snapshots consumed by the transfer workflow.
//!
//! Locations and products are fetched by the caller and handed to the workflow
//! as read-only values; nothing in this crate performs IO.

pub mod location;
pub mod product;

pub use location::{Location, active_locations_except};
pub use product::{Product, search_products};
