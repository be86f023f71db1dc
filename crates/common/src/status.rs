//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Transitions:
/// ```text
/// Pending ──┬──► Confirmed   (item list may still be replaced)
///           └──► Deleted     (eventually purged in bulk)
/// ```
///
/// Both `Confirmed` and `Deleted` are terminal; an order never leaves
/// them except by hard deletion of `Deleted` orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting an admin decision. The initial state of every order.
    #[default]
    Pending,

    /// Accepted by an admin (terminal state).
    Confirmed,

    /// Rejected by an admin, awaiting purge (terminal state).
    Deleted,
}

impl OrderStatus {
    /// Returns true if the order can still be confirmed or rejected.
    pub fn can_transition(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the item list can be replaced in this status.
    pub fn can_edit_items(&self) -> bool {
        matches!(self, OrderStatus::Confirmed)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Deleted)
    }

    /// Returns the status as its storage column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "deleted" => Ok(OrderStatus::Deleted),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl std::fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown order status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_only_pending_can_transition() {
        assert!(OrderStatus::Pending.can_transition());
        assert!(!OrderStatus::Confirmed.can_transition());
        assert!(!OrderStatus::Deleted.can_transition());
    }

    #[test]
    fn test_only_confirmed_can_edit_items() {
        assert!(!OrderStatus::Pending.can_edit_items());
        assert!(OrderStatus::Confirmed.can_edit_items());
        assert!(!OrderStatus::Deleted.can_edit_items());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Confirmed.is_terminal());
        assert!(OrderStatus::Deleted.is_terminal());
    }

    #[test]
    fn test_display_matches_column_value() {
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(OrderStatus::Confirmed.to_string(), "confirmed");
        assert_eq!(OrderStatus::Deleted.to_string(), "deleted");
    }

    #[test]
    fn test_from_str_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Deleted,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serialization_is_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
        let back: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OrderStatus::Confirmed);
    }
}
