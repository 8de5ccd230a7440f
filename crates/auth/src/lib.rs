//! `loyalty-auth` — caller identity and the owner gate.
//!
//! This crate is intentionally decoupled from HTTP and storage: whatever
//! transport authenticates a request resolves it to a [`CallerId`] before
//! the ledger is involved.

pub mod caller;
pub mod gate;

pub use caller::CallerId;
pub use gate::OwnerGate;
