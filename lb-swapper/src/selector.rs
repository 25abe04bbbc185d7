//! Selection of the best trade among the quoted candidates

use std::cmp::Ordering;

use crate::{
    error::{SwapError, SwapResult},
    types::Trade,
};

/// Pick the best trade: the largest output for exact-in trades, the smallest
/// input for exact-out trades
///
/// Ties go to the trade with fewer hops, then to the earlier candidate
pub fn choose_best(trades: Vec<Trade>, exact_in: bool) -> SwapResult<Trade> {
    let mut best: Option<Trade> = None;
    for trade in trades {
        let replace = match &best {
            None => true,
            Some(current) => compare_trades(&trade, current, exact_in) == Ordering::Greater,
        };

        if replace {
            best = Some(trade);
        }
    }

    best.ok_or(SwapError::NoViableRoute)
}

/// Order two trades by preference, `Greater` meaning `a` is preferred
fn compare_trades(a: &Trade, b: &Trade, exact_in: bool) -> Ordering {
    let by_amount = if exact_in {
        a.output_amount.raw().cmp(&b.output_amount.raw())
    } else {
        b.input_amount.raw().cmp(&a.input_amount.raw())
    };

    by_amount.then_with(|| b.hops().cmp(&a.hops()))
}
