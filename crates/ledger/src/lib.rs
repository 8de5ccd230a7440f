//! `loyalty-ledger` — the authoritative points ledger.
//!
//! One service value owns the account → balance mapping. Mutations are
//! owner-gated and serialized per account; queries are open and
//! read-committed. Every committed mutation produces a [`LedgerEvent`] that
//! is handed to a best-effort dispatcher after the account lock is released.

pub mod event;
pub mod ledger;

pub use event::{LedgerEvent, PointsAwarded, PointsRedeemed};
pub use ledger::{PointsLedger, RedeemPolicy};
