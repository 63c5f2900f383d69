use serde::{Deserialize, Serialize};

use forgepos_core::{Entity, LocationId};

/// A physical site holding inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    id: LocationId,
    name: String,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Location {
    /// An active location without an address.
    pub fn new(id: LocationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: true,
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> LocationId {
        self.id
    }
}

/// Active locations other than `excluded`, in input order.
pub fn active_locations_except<'a>(
    locations: &'a [Location],
    excluded: LocationId,
) -> Vec<&'a Location> {
    locations
        .iter()
        .filter(|l| l.is_active && l.id != excluded)
        .collect()
}
