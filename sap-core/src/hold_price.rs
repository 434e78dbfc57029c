use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use fix::prelude::*;

use crate::exchange_math::weighted_hold_price;

/// Per-holder weighted average acquisition share price.
/// Holders without an open position have no entry and report zero.
#[derive(Clone, Debug, Default)]
pub struct HoldPriceBook {
  prices: BTreeMap<Pubkey, UFix64<N9>>,
}

impl HoldPriceBook {
  #[must_use]
  pub fn hold_price(&self, holder: &Pubkey) -> UFix64<N9> {
    self
      .prices
      .get(holder)
      .copied()
      .unwrap_or(UFix64::zero())
  }

  /// Hold price `holder` would have after buying `new_shares` at
  /// `buy_price` on top of `old_shares`.
  pub fn next_hold_price(
    &self,
    holder: &Pubkey,
    old_shares: UFix64<N9>,
    buy_price: UFix64<N9>,
    new_shares: UFix64<N9>,
  ) -> Result<UFix64<N9>> {
    weighted_hold_price(
      self.hold_price(holder),
      old_shares,
      buy_price,
      new_shares,
    )
  }

  pub fn set(&mut self, holder: Pubkey, hold_price: UFix64<N9>) {
    self.prices.insert(holder, hold_price);
  }

  /// Folds a purchase into the holder's cost basis.
  pub fn record_purchase(
    &mut self,
    holder: Pubkey,
    old_shares: UFix64<N9>,
    buy_price: UFix64<N9>,
    new_shares: UFix64<N9>,
  ) -> Result<UFix64<N9>> {
    let hold =
      self.next_hold_price(&holder, old_shares, buy_price, new_shares)?;
    self.set(holder, hold);
    Ok(hold)
  }

  /// Drops the cost basis of a closed position.
  pub fn reset(&mut self, holder: &Pubkey) {
    self.prices.remove(holder);
  }
}
