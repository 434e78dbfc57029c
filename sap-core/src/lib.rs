#![allow(clippy::missing_errors_doc)]
#![allow(clippy::wildcard_imports)]

pub mod amm;
pub mod asset;
pub mod basket_context;
pub mod conversion;
pub mod decimals;
pub mod error;
pub mod exchange_math;
pub mod fee_controller;
pub mod fee_discount;
pub mod hold_price;
pub mod oracle;
pub mod share_supply;
pub mod slippage;
