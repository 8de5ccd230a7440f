//! `loyalty-barcode` — redemption token codec.

pub mod codec;

pub use codec::{TOKEN_PREFIX, format_token};
