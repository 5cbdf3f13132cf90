//! Interest rate implied by a payment schedule.
//!
//! There is no closed form, so candidate rates `k * RATE_STEP` for
//! `k = 1..=MAX_RATE_STEPS` are searched for the first one at which the
//! projected balance after the full schedule turns positive. The projected
//! balance has the sign of `payment(r) - payment`, and the amortising payment
//! is strictly increasing in `r`, so the predicate is monotone in `k` and a
//! binary search over the index finds the same first crossing as a linear scan.

use crate::config::Compounding;
use crate::types::{Money, Rate, Years};

/// Resolution of the rate search.
pub const RATE_STEP: Rate = 0.001;

/// Largest candidate index; the search covers rates up to `19.999`.
pub const MAX_RATE_STEPS: u32 = 19_999;

fn candidate(k: u32) -> Rate {
    f64::from(k) * RATE_STEP
}

/// Sign of the projected balance, tested on the balance divided by the
/// growth factor. Long schedules at high candidate rates overflow `G` to
/// infinity, where the undivided form is `inf - inf`; divided, it tends to
/// `principal - payment / r` and stays finite.
fn crosses(
    compounding: Compounding,
    principal: Money,
    payment: Money,
    duration: Years,
    k: u32,
) -> bool {
    let rate = candidate(k);
    let growth = compounding.growth_factor(rate, duration);
    principal - payment * (1.0 - growth.recip()) / rate > 0.0
}

/// First candidate rate whose projected balance is positive, or `None` when
/// no candidate in range crosses.
pub fn first_crossing(
    compounding: Compounding,
    principal: Money,
    payment: Money,
    duration: Years,
) -> Option<Rate> {
    let check = |k| crosses(compounding, principal, payment, duration, k);

    if check(1) {
        return Some(candidate(1));
    }
    if !check(MAX_RATE_STEPS) {
        return None;
    }

    // Invariant: check(lo) is false, check(hi) is true.
    let (mut lo, mut hi) = (1, MAX_RATE_STEPS);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if check(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Some(candidate(hi))
}
