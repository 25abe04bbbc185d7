//! Human readable summaries of a quoted trade

use std::fmt::Display;

use crate::types::{token::to_significant, token::DISPLAY_SIGNIFICANT_DIGITS, Trade};

/// A single labelled line of a trade report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// What the line describes
    pub label: &'static str,
    /// The rendered value
    pub value: String,
}

impl ReportLine {
    /// Create a new report line
    fn new(label: &'static str, value: impl ToString) -> Self {
        Self { label, value: value.to_string() }
    }
}

impl Display for ReportLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// Summarize a trade: its route, amounts, price, price impact, and fees
pub fn report(trade: &Trade) -> Vec<ReportLine> {
    let execution_price = match trade.execution_price() {
        Some(price) => format!(
            "{} {} per {}",
            to_significant(&price, DISPLAY_SIGNIFICANT_DIGITS),
            trade.output_amount.token(),
            trade.input_amount.token(),
        ),
        None => "n/a".to_string(),
    };

    let fee = trade.trade_fee();
    vec![
        ReportLine::new("Route", &trade.route),
        ReportLine::new("Trade type", trade.trade_type),
        ReportLine::new("Input", &trade.input_amount),
        ReportLine::new("Output", &trade.output_amount),
        ReportLine::new("Execution price", execution_price),
        ReportLine::new(
            "Price impact",
            format!(
                "{}%",
                to_significant(&trade.price_impact_percent(), DISPLAY_SIGNIFICANT_DIGITS)
            ),
        ),
        ReportLine::new(
            "Total fees",
            format!(
                "{}%",
                to_significant(&fee.total_fee_percent(), DISPLAY_SIGNIFICANT_DIGITS)
            ),
        ),
        ReportLine::new("Fee amount", &fee.fee_amount_in),
    ]
}
