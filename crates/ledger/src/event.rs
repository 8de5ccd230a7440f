use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loyalty_core::{AccountId, Points};
use loyalty_events::Event;

/// Event: points were added to an account.
///
/// Emitted for every successful award, including awards of zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsAwarded {
    pub account: AccountId,
    pub amount: Points,
    pub occurred_at: DateTime<Utc>,
}

/// Event: an account's full balance was redeemed for a barcode token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsRedeemed {
    pub account: AccountId,
    /// The balance captured immediately before it was reset to zero.
    pub amount: Points,
    /// The token handed to the caller; derived, never stored.
    pub barcode: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    PointsAwarded(PointsAwarded),
    PointsRedeemed(PointsRedeemed),
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::PointsAwarded(_) => "loyalty.points.awarded",
            LedgerEvent::PointsRedeemed(_) => "loyalty.points.redeemed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::PointsAwarded(e) => e.occurred_at,
            LedgerEvent::PointsRedeemed(e) => e.occurred_at,
        }
    }
}
