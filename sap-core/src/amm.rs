use anchor_lang::prelude::*;
use fix::prelude::*;

use crate::decimals::{to_canonical, unit_amount};
use crate::error::CoreError::SpotPriceQuote;

/// Quote side of an AMM router, shaped after UniswapV2's `getAmountsOut`.
/// Returns one amount per hop of `path`, the first being `amount_in`.
pub trait SpotPriceQuoter {
  fn get_amounts_out(
    &self,
    amount_in: u128,
    path: &[Pubkey],
  ) -> Result<Vec<u128>>;
}

impl<T: SpotPriceQuoter + ?Sized> SpotPriceQuoter for &T {
  fn get_amounts_out(
    &self,
    amount_in: u128,
    path: &[Pubkey],
  ) -> Result<Vec<u128>> {
    (**self).get_amounts_out(amount_in, path)
  }
}

/// Spot price of one whole `asset` unit in `quote` units, at N9.
///
/// Quotes `10^asset_decimals` minor units through the router and rescales the
/// output from the quote token's decimals. A zero quote is rejected.
pub fn spot_price<Q: SpotPriceQuoter + ?Sized>(
  quoter: &Q,
  asset: &Pubkey,
  asset_decimals: u8,
  quote: &Pubkey,
  quote_decimals: u8,
) -> Result<UFix64<N9>> {
  let amount_in = unit_amount(asset_decimals)?;
  let amounts = quoter.get_amounts_out(amount_in, &[*asset, *quote])?;
  let amount_out = amounts
    .last()
    .copied()
    .filter(|out| amounts.len() > 1 && *out > 0)
    .ok_or(SpotPriceQuote)?;
  to_canonical(amount_out, quote_decimals)
}
