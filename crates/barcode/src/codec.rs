//! Deterministic formatting of redemption tokens.

use loyalty_core::{AccountId, Points};

/// Leading marker of every redemption token.
pub const TOKEN_PREFIX: &str = "BAR-";

/// Format the single-use token handed out when `account` redeems `amount`
/// points: `BAR-<account>-<amount>`.
///
/// The account id is inserted verbatim (no escaping) and the amount as its
/// plain base-10 value. Pure and deterministic: equal inputs always format
/// to equal tokens, and the token is derived only from its two inputs — it
/// is never stored.
///
/// The `-` separator is not escaped, so a token does not unambiguously
/// encode its pair: account ids that contain `-` or consist of digits yield
/// tokens whose internal boundaries cannot be recovered (`("7-1", 5)` and
/// `("7", 1)` produce `BAR-7-1-5` and `BAR-7-1`, and nothing in the text
/// marks which dashes belong to the account). Scanners treat the token as an
/// opaque string and no parser is provided, so the ambiguity is accepted
/// rather than "fixed" with an escaping rule.
pub fn format_token(account: &AccountId, amount: &Points) -> String {
    format!("{TOKEN_PREFIX}{account}-{amount}")
}
