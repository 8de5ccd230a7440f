//! `loyalty-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod account;
pub mod error;
pub mod points;

pub use account::AccountId;
pub use error::{DomainError, DomainResult};
pub use points::Points;
