//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures. Both variants are
/// synchronous rejections: the operation that raised them left state unchanged.
/// Infrastructure concerns (event delivery, transport) belong elsewhere.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DomainError {
    /// The caller is not the owner of the ledger.
    #[error("not owner")]
    Unauthorized,

    /// Redemption was attempted against a zero balance.
    #[error("no points to redeem")]
    NothingToRedeem,
}
