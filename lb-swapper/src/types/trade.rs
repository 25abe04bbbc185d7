//! Priced trades along a single route

use std::fmt::Display;

use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;

use crate::types::{token::to_big_decimal, Route, TokenAmount};

// -------------
// | Constants |
// -------------

/// The fixed point precision of fees and price impact, 1e18
pub const PRECISION: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);
/// The scale of a `PRECISION`-denominated fraction when read as a percentage
const PERCENT_SCALE: i64 = 16;
/// The basis point denominator
pub const BPS_DENOMINATOR: U256 = U256::from_limbs([10_000, 0, 0, 0]);

// ---------
// | Types |
// ---------

/// Which side of the trade the user fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeType {
    /// The input amount is fixed, the output is quoted
    ExactIn,
    /// The output amount is fixed, the input is quoted
    ExactOut,
}

impl Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeType::ExactIn => write!(f, "exact in"),
            TradeType::ExactOut => write!(f, "exact out"),
        }
    }
}

/// User preferences applied when turning a trade into swap instructions
#[derive(Debug, Clone)]
pub struct TradeOptions {
    /// The maximum adverse price movement accepted, in basis points
    pub allowed_slippage_bps: u32,
    /// How long the swap stays valid after submission, in seconds
    pub ttl_secs: u64,
    /// The address receiving the output tokens
    pub recipient: Address,
    /// Whether a token on the path charges a fee on transfer
    pub fee_on_transfer: bool,
}

/// The fees paid along a trade's route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeFee {
    /// The compounded fee fraction across all hops, scaled by `PRECISION`
    pub total_fee_pct: U256,
    /// The portion of the input amount paid as fees
    pub fee_amount_in: TokenAmount,
}

impl TradeFee {
    /// The fee fraction as a percentage
    pub fn total_fee_percent(&self) -> BigDecimal {
        to_big_decimal(self.total_fee_pct, PERCENT_SCALE)
    }
}

/// A quoted execution of the swap along one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    /// The route traded along
    pub route: Route,
    /// Which side of the trade was fixed
    pub trade_type: TradeType,
    /// The amount sold; quoted for exact-out trades
    pub input_amount: TokenAmount,
    /// The amount bought; quoted for exact-in trades
    pub output_amount: TokenAmount,
    /// The pair traded through at each hop
    pub pairs: Vec<Address>,
    /// The bin step of the pair at each hop
    pub bin_steps: Vec<U256>,
    /// The pair version at each hop
    pub versions: Vec<u8>,
    /// The fee charged at each hop, scaled by `PRECISION`
    pub fees: Vec<u128>,
    /// The quoted amount had the trade moved no bins
    pub quoted_amount_without_slippage: U256,
    /// Whether the input is paid in the chain's native asset
    pub is_native_in: bool,
    /// Whether the output is paid out in the chain's native asset
    pub is_native_out: bool,
}

impl Trade {
    /// Whether the input amount was fixed
    pub fn is_exact_in(&self) -> bool {
        self.trade_type == TradeType::ExactIn
    }

    /// The number of pairs traversed
    pub fn hops(&self) -> usize {
        self.route.hops()
    }

    /// The quoted side of the trade
    pub fn quoted_amount(&self) -> &TokenAmount {
        match self.trade_type {
            TradeType::ExactIn => &self.output_amount,
            TradeType::ExactOut => &self.input_amount,
        }
    }

    /// The price in output tokens per input token, in whole units
    pub fn execution_price(&self) -> Option<BigDecimal> {
        if self.input_amount.is_zero() {
            return None;
        }

        Some(self.output_amount.to_decimal() / self.input_amount.to_decimal())
    }

    /// The fraction of the quote lost to moving through bins, scaled by
    /// `PRECISION`
    pub fn price_impact(&self) -> U256 {
        let without_slippage = self.quoted_amount_without_slippage;
        let quoted = self.quoted_amount().raw();

        // Exact-in trades receive less than the no-slippage amount, exact-out
        // trades pay more
        let (reference, loss) = match self.trade_type {
            TradeType::ExactIn => (without_slippage, without_slippage.saturating_sub(quoted)),
            TradeType::ExactOut => (quoted, quoted.saturating_sub(without_slippage)),
        };

        if reference.is_zero() {
            return U256::ZERO;
        }

        loss * PRECISION / reference
    }

    /// The price impact as a percentage
    pub fn price_impact_percent(&self) -> BigDecimal {
        to_big_decimal(self.price_impact(), PERCENT_SCALE)
    }

    /// Compound the per-hop fees into a total fee and the amount of input
    /// token it represents
    pub fn trade_fee(&self) -> TradeFee {
        let remaining = self.fees.iter().fold(PRECISION, |remaining, fee| {
            let fee = U256::from(*fee).min(PRECISION);
            remaining * (PRECISION - fee) / PRECISION
        });

        let total_fee_pct = PRECISION - remaining;
        let fee_amount = self.input_amount.raw() * total_fee_pct / PRECISION;
        let fee_amount_in = TokenAmount::new(self.input_amount.token().clone(), fee_amount);

        TradeFee { total_fee_pct, fee_amount_in }
    }

    /// The least output accepted under the given slippage tolerance
    pub fn minimum_amount_out(&self, slippage_bps: u32) -> U256 {
        if !self.is_exact_in() {
            return self.output_amount.raw();
        }

        let slippage = U256::from(slippage_bps);
        self.output_amount.raw() * BPS_DENOMINATOR / (BPS_DENOMINATOR + slippage)
    }

    /// The most input paid under the given slippage tolerance
    pub fn maximum_amount_in(&self, slippage_bps: u32) -> U256 {
        if self.is_exact_in() {
            return self.input_amount.raw();
        }

        let slippage = U256::from(slippage_bps);
        self.input_amount.raw() * (BPS_DENOMINATOR + slippage) / BPS_DENOMINATOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{mock_trade, usdc};

    /// A fee of 0.1% scaled by `PRECISION`
    const TENTH_PERCENT: u128 = 1_000_000_000_000_000;

    #[test]
    fn fees_compound_across_hops() {
        let mut trade = mock_trade(&[usdc()], 10_000, 400);
        trade.fees = vec![TENTH_PERCENT, TENTH_PERCENT];

        let fee = trade.trade_fee();
        // 1 - 0.999^2 = 0.001999
        assert_eq!(fee.total_fee_pct, U256::from(1_999_000_000_000_000u128));
        assert_eq!(fee.fee_amount_in.raw(), U256::from(19u64));
        assert_eq!(fee.total_fee_percent().normalized().to_plain_string(), "0.1999");
    }

    #[test]
    fn slippage_bounds() {
        let trade = mock_trade(&[], 10_000, 10_050);
        // 10050 / 1.005
        assert_eq!(trade.minimum_amount_out(50), U256::from(10_000u64));
        assert_eq!(trade.maximum_amount_in(50), U256::from(10_000u64));

        let mut exact_out = trade.clone();
        exact_out.trade_type = TradeType::ExactOut;
        assert_eq!(exact_out.maximum_amount_in(50), U256::from(10_050u64));
        assert_eq!(exact_out.minimum_amount_out(50), U256::from(10_050u64));
    }

    #[test]
    fn price_impact_against_no_slippage_quote() {
        let mut trade = mock_trade(&[], 10_000, 990);
        trade.quoted_amount_without_slippage = U256::from(1_000u64);
        assert_eq!(trade.price_impact_percent().normalized().to_plain_string(), "1");
    }
}
