//! Scorebook: Rate Arithmetic
//!
//! Batting rates are kept as integer thousandths (SCALE = 1_000) so that
//! stats lines compare and hash exactly. No float in the stored value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed-point scale factor. A rate of `0.333` is stored as `333`.
pub const SCALE: u64 = 1_000;

/// A non-negative ratio rounded half-up to three decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(u64);

impl Rate {
    pub const ZERO: Rate = Rate(0);

    /// `numerator / denominator`; zero when the denominator is zero.
    pub fn of(numerator: u32, denominator: u32) -> Rate {
        if denominator == 0 {
            return Rate::ZERO;
        }
        let num = u64::from(numerator) * SCALE;
        let den = u64::from(denominator);
        Rate((num + den / 2) / den)
    }

    pub fn thousandths(self) -> u64 {
        self.0
    }
}

/// Scorebook style: `.333` below one, `1.000` and up otherwise.
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if whole == 0 {
            write!(f, ".{:03}", frac)
        } else {
            write!(f, "{}.{:03}", whole, frac)
        }
    }
}
