//! Value types shared across the swap workflow

pub mod route;
pub mod token;
pub mod trade;

pub use route::Route;
pub use token::{Token, TokenAmount};
pub use trade::{Trade, TradeFee, TradeOptions, TradeType};
