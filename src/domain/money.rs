//! Fixed-precision quantities used throughout the core.
//!
//! Binary floats would silently break associativity of the monthly sum
//! (§9 design notes); everything here rides on `rust_decimal::Decimal`,
//! which carries up to 28 significant digits and an explicit scale.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A monetary amount in US dollars.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Eq, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usd(pub Decimal);

/// Energy delivered in a single interval, kWh.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kwh(pub Decimal);

/// Instantaneous demand within an interval, kW.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kw(pub Decimal);

/// A rate, expressed per kWh or per kW depending on context.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(pub Decimal);

macro_rules! decimal_newtype {
    ($t:ident) => {
        impl $t {
            pub const ZERO: $t = $t(Decimal::ZERO);

            pub fn is_negative(&self) -> bool {
                self.0.is_sign_negative() && !self.0.is_zero()
            }
        }

        impl Add for $t {
            type Output = $t;
            fn add(self, rhs: $t) -> $t {
                $t(self.0 + rhs.0)
            }
        }

        impl AddAssign for $t {
            fn add_assign(&mut self, rhs: $t) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $t {
            type Output = $t;
            fn sub(self, rhs: $t) -> $t {
                $t(self.0 - rhs.0)
            }
        }

        impl Sum for $t {
            fn sum<I: Iterator<Item = $t>>(iter: I) -> $t {
                iter.fold($t::ZERO, |a, b| a + b)
            }
        }

        impl From<Decimal> for $t {
            fn from(d: Decimal) -> $t {
                $t(d)
            }
        }
    };
}

decimal_newtype!(Usd);
decimal_newtype!(Kwh);
decimal_newtype!(Kw);

impl Mul<Rate> for Kwh {
    type Output = Usd;
    fn mul(self, rhs: Rate) -> Usd {
        Usd(self.0 * rhs.0)
    }
}

impl Mul<Rate> for Kw {
    type Output = Usd;
    fn mul(self, rhs: Rate) -> Usd {
        Usd(self.0 * rhs.0)
    }
}

/// Rounds a dollar total to 2 fractional digits using round-half-even
/// ("banker's rounding"), per §4.5: final totals are rounded this way,
/// line items are summed at full precision first.
pub fn round_half_even_2dp(amount: Usd) -> Usd {
    Usd(amount.0.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn half_even_rounds_to_nearest_even_cent() {
        assert_eq!(round_half_even_2dp(Usd(dec!(1.005))).0, dec!(1.00));
        assert_eq!(round_half_even_2dp(Usd(dec!(1.015))).0, dec!(1.02));
        assert_eq!(round_half_even_2dp(Usd(dec!(84.40))).0, dec!(84.40));
    }

    #[test]
    fn sum_is_associative_regardless_of_order() {
        let values = [Usd(dec!(0.1)), Usd(dec!(0.2)), Usd(dec!(0.3))];
        let forward: Usd = values.iter().copied().sum();
        let reversed: Usd = values.iter().rev().copied().sum();
        assert_eq!(forward, reversed);
    }
}
