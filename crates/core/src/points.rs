//! Point balances.

use core::ops::{Add, AddAssign};
use core::str::FromStr;

use num_bigint::{BigUint, ParseBigIntError};
use serde::{Deserialize, Serialize};

/// A non-negative loyalty point total.
///
/// Backed by [`BigUint`], so a balance is non-negative by construction and
/// addition can never wrap or truncate, whatever the magnitude. `Display`
/// renders the plain base-10 value: no sign, no grouping, no leading zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(BigUint);

impl Points {
    pub fn zero() -> Self {
        Self(BigUint::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::ZERO
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }
}

impl core::fmt::Display for Points {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<BigUint> for Points {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Points {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Points {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl FromStr for Points {
    type Err = ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(BigUint::from_str(s)?))
    }
}

impl Add for Points {
    type Output = Points;

    fn add(self, rhs: Points) -> Points {
        Points(self.0 + rhs.0)
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Points) {
        self.0 += rhs.0;
    }
}
