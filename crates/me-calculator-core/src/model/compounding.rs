//! Compounding primitives shared by every loan formula.
//!
//! Each formula is written once in terms of the growth factor `G(t)` and the
//! per-period log growth `λ`; the convention only changes those two:
//!
//! | convention | `G(t)`        | `λ`          |
//! |------------|---------------|--------------|
//! | discrete   | `(1 + r)^t`   | `ln(1 + r)`  |
//! | continuous | `e^(r t)`     | `r`          |

use crate::config::Compounding;
use crate::types::{Money, Rate, Years};

impl Compounding {
    /// Growth of one unit of debt over `periods` at `rate`.
    pub fn growth_factor(self, rate: Rate, periods: Years) -> f64 {
        match self {
            Compounding::Discrete => (1.0 + rate).powf(periods),
            Compounding::Continuous => (rate * periods).exp(),
        }
    }

    /// Logarithm of the one-period growth factor.
    pub fn log_growth(self, rate: Rate) -> f64 {
        match self {
            Compounding::Discrete => rate.ln_1p(),
            Compounding::Continuous => rate,
        }
    }

    /// Accumulated value of a unit payment stream over `periods`: `(G - 1) / r`.
    pub fn accumulation_factor(self, rate: Rate, periods: Years) -> f64 {
        (self.growth_factor(rate, periods) - 1.0) / rate
    }

    /// Outstanding balance after `periods` when `payment` services `principal`.
    ///
    /// Positive when the payment is too small to retire the loan in time.
    pub fn projected_balance(
        self,
        principal: Money,
        payment: Money,
        rate: Rate,
        periods: Years,
    ) -> Money {
        let growth = self.growth_factor(rate, periods);
        principal * growth - payment * (growth - 1.0) / rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_growth_integer_periods() {
        let g = Compounding::Discrete.growth_factor(0.1, 10.0);
        assert!((g - 2.593_742_460_1).abs() < 1e-9);
    }

    #[test]
    fn test_continuous_growth() {
        let g = Compounding::Continuous.growth_factor(0.05, 20.0);
        assert!((g - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_log_growth_inverts_growth() {
        for compounding in [Compounding::Discrete, Compounding::Continuous] {
            let rate = 0.037;
            let g = compounding.growth_factor(rate, 7.5);
            assert!((g.ln() / compounding.log_growth(rate) - 7.5).abs() < 1e-10);
        }
    }

    #[test]
    fn test_projected_balance_zero_periods_is_principal() {
        let balance = Compounding::Discrete.projected_balance(100_000.0, 9_000.0, 0.04, 0.0);
        assert!((balance - 100_000.0).abs() < 1e-9);
    }
}
