//! Transfer State Definitions
//!
//! The status lifecycle is deliberately tiny: `pending` is the only initial
//! state, `approved`/`rejected` are terminal, and terminal states are never
//! re-entered. Stored as TEXT in Postgres.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// StudentTransfer status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Initial state on create
    Pending,
    /// Terminal: student moved (when a destination district was set)
    Approved,
    /// Terminal: no student mutation
    Rejected,
}

impl TransferStatus {
    /// Terminal states accept no further transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Approved | TransferStatus::Rejected)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Approved => "approved",
            TransferStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransferStatus::Pending),
            "approved" => Some(TransferStatus::Approved),
            "rejected" => Some(TransferStatus::Rejected),
            _ => None,
        }
    }

    /// Is `self -> next` a legal transition?
    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        matches!(
            (self, next),
            (TransferStatus::Pending, TransferStatus::Approved)
                | (TransferStatus::Pending, TransferStatus::Rejected)
        )
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TransferStatus::Approved.is_terminal());
        assert!(TransferStatus::Rejected.is_terminal());
        assert!(!TransferStatus::Pending.is_terminal());
    }

    #[test]
    fn test_transitions() {
        assert!(TransferStatus::Pending.can_transition_to(TransferStatus::Approved));
        assert!(TransferStatus::Pending.can_transition_to(TransferStatus::Rejected));

        // Terminal states never move again, in any direction.
        for from in [TransferStatus::Approved, TransferStatus::Rejected] {
            for to in [
                TransferStatus::Pending,
                TransferStatus::Approved,
                TransferStatus::Rejected,
            ] {
                assert!(!from.can_transition_to(to));
            }
        }
        assert!(!TransferStatus::Pending.can_transition_to(TransferStatus::Pending));
    }

    #[test]
    fn test_parse_roundtrip() {
        for status in [
            TransferStatus::Pending,
            TransferStatus::Approved,
            TransferStatus::Rejected,
        ] {
            assert_eq!(TransferStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TransferStatus::parse("cancelled"), None);
        assert_eq!(TransferStatus::parse(""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferStatus::Pending.to_string(), "pending");
        assert_eq!(TransferStatus::Approved.to_string(), "approved");
    }
}
