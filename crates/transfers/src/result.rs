//! Transfer record returned by the inventory service.

use serde::{Deserialize, Serialize};

use forgepos_core::TransferId;

/// Lifecycle status reported by the service. The workflow only displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    InTransit,
    Received,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::InTransit => "in_transit",
            TransferStatus::Received => "received",
            TransferStatus::Cancelled => "cancelled",
            TransferStatus::Unknown => "unknown",
        }
    }
}

/// A transfer created by the inventory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub id: TransferId,
    pub display_number: String,
    pub qr_code: String,
    pub status: TransferStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_is_tolerated() {
        let id = TransferId::new();
        let json = format!(
            r#"{{"id":"{id}","display_number":"TRF-009","qr_code":"qr","status":"on_hold"}}"#
        );
        let result: TransferResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.status, TransferStatus::Unknown);
        assert_eq!(result.display_number, "TRF-009");
    }

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&TransferStatus::InTransit).unwrap();
        assert_eq!(json, "\"in_transit\"");
        assert_eq!(TransferStatus::InTransit.as_str(), "in_transit");
    }
}
