use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry. Prices are in minor currency units.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub product_id: Uuid,
    pub merchant_ref: String,
    pub amount_paid: i64,
    pub status: TransactionStatus,
    pub invoice_url: String,
    /// Tripay reference; unique and assigned once at creation.
    pub reference: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Paid,
    Failed,
    Expired,
    Refund,
}

impl TransactionStatus {
    /// Map a Tripay callback status, ignoring case.
    ///
    /// `PENDING` is never reported by a callback and is not accepted here.
    pub fn from_callback(status: &str) -> Option<Self> {
        match status.to_ascii_uppercase().as_str() {
            "PAID" => Some(Self::Paid),
            "FAILED" => Some(Self::Failed),
            "EXPIRED" => Some(Self::Expired),
            "REFUND" => Some(Self::Refund),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
            Self::Expired => "EXPIRED",
            Self::Refund => "REFUND",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_status_is_case_insensitive() {
        assert_eq!(TransactionStatus::from_callback("paid"), Some(TransactionStatus::Paid));
        assert_eq!(TransactionStatus::from_callback("Expired"), Some(TransactionStatus::Expired));
        assert_eq!(TransactionStatus::from_callback("REFUND"), Some(TransactionStatus::Refund));
        assert_eq!(TransactionStatus::from_callback("failed"), Some(TransactionStatus::Failed));
    }

    #[test]
    fn unknown_callback_status_is_rejected() {
        assert_eq!(TransactionStatus::from_callback("CANCELLED"), None);
        assert_eq!(TransactionStatus::from_callback("PENDING"), None);
        assert_eq!(TransactionStatus::from_callback(""), None);
    }

    #[test]
    fn status_serializes_upper_case() {
        assert_eq!(
            serde_json::to_value(TransactionStatus::Refund).unwrap(),
            serde_json::json!("REFUND")
        );
        assert_eq!(TransactionStatus::Pending.to_string(), "PENDING");
    }
}
