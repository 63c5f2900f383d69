//! Assembling a submittable transfer request.

use serde::{Deserialize, Serialize};

use forgepos_catalog::{Location, active_locations_except};
use forgepos_core::{DomainError, DomainResult, Entity, LocationId, ProductId};

use crate::selection::SelectionSet;

/// One line of a transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Validated payload sent to the inventory service.
///
/// Only `TransferRequestBuilder::build` produces one, so every request has a
/// destination and at least one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    source_location_id: LocationId,
    destination_location_id: LocationId,
    items: Vec<TransferLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl TransferRequest {
    pub fn source_location_id(&self) -> LocationId {
        self.source_location_id
    }

    pub fn destination_location_id(&self) -> LocationId {
        self.destination_location_id
    }

    pub fn items(&self) -> &[TransferLine] {
        &self.items
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// Collects destination, products and notes for a transfer out of `source`.
#[derive(Debug, Clone)]
pub struct TransferRequestBuilder {
    source: Location,
    destination: Option<Location>,
    selection: SelectionSet,
    notes: Option<String>,
}

impl TransferRequestBuilder {
    pub fn new(source: Location) -> Self {
        Self {
            source,
            destination: None,
            selection: SelectionSet::new(),
            notes: None,
        }
    }

    pub fn source(&self) -> &Location {
        &self.source
    }

    pub fn destination(&self) -> Option<&Location> {
        self.destination.as_ref()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Store trimmed notes; blank input clears them.
    pub fn set_notes(&mut self, notes: &str) {
        let trimmed = notes.trim();
        self.notes = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    /// Choose where the stock goes. Refuses the source itself and inactive sites.
    ///
    /// On refusal the previous destination is kept.
    pub fn set_destination(&mut self, location: &Location) -> DomainResult<()> {
        if location.same_identity_as(&self.source) {
            return Err(DomainError::validation(
                "destination must differ from the source location",
            ));
        }
        if !location.is_active() {
            return Err(DomainError::validation(format!(
                "destination '{}' is not active",
                location.name()
            )));
        }
        self.destination = Some(location.clone());
        Ok(())
    }

    /// Forget the chosen destination. Selection and notes stay.
    pub fn clear_destination(&mut self) -> Option<Location> {
        self.destination.take()
    }

    /// Locations that may be chosen as destination, in input order.
    pub fn candidate_destinations<'a>(&self, all_locations: &'a [Location]) -> Vec<&'a Location> {
        active_locations_except(all_locations, self.source.id())
    }

    /// Drop destination, selection and notes. The source stays.
    pub fn reset(&mut self) {
        self.destination = None;
        self.selection.clear();
        self.notes = None;
    }

    pub fn can_build(&self) -> bool {
        self.destination.is_some() && self.selection.total_quantity() > 0
    }

    /// Snapshot the current state into a request.
    ///
    /// The returned value owns its lines; later selection changes do not affect it.
    pub fn build(&self) -> DomainResult<TransferRequest> {
        let destination = self
            .destination
            .as_ref()
            .ok_or_else(|| DomainError::validation("no destination selected"))?;

        if self.selection.total_quantity() == 0 {
            return Err(DomainError::validation("no products selected"));
        }

        let items = self
            .selection
            .items()
            .iter()
            .map(|e| TransferLine {
                product_id: e.product_id(),
                quantity: e.quantity(),
            })
            .collect();

        Ok(TransferRequest {
            source_location_id: self.source.id(),
            destination_location_id: destination.id(),
            items,
            notes: self.notes.clone(),
        })
    }
}
