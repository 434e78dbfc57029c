//! Basket context trait and implementation.
//!
//! [`BasketContext`] abstracts over where balances and prices come from and
//! provides default implementations for share price, buy and sell quotes
//! and fees.

mod snapshot;

use anchor_lang::prelude::*;
use fix::prelude::*;

pub use self::snapshot::{BasketSnapshot, SnapshotAsset};
use crate::conversion::ExchangeConversion;
use crate::decimals::{from_canonical_ceil, from_canonical_floor, to_canonical};
use crate::error::CoreError::UnknownAsset;
use crate::exchange_math::{basket_value, share_price, AssetQuote};
use crate::fee_controller::{FeeConfig, FeeExtract};
use crate::fee_discount::FeeDiscountTable;

/// Shared interface for basket pricing.
pub trait BasketContext {
  /// Number of whitelisted assets.
  fn asset_count(&self) -> usize;

  /// Decimals of the asset token at `index`.
  fn asset_decimals(&self, index: usize) -> Result<u8>;

  /// Raw basket balance of the asset at `index`.
  fn asset_balance(&self, index: usize) -> Result<u128>;

  /// Unit price of the asset at `index` in N9.
  fn asset_price(&self, index: usize) -> Result<UFix64<N9>>;

  /// Outstanding shares.
  fn share_supply(&self) -> UFix64<N9>;

  fn fee_config(&self) -> &FeeConfig;

  fn fee_discounts(&self) -> &FeeDiscountTable;

  /// Unit price of a basket asset, rejecting unknown indices.
  ///
  /// # Errors
  /// * Index out of range or price source failure
  fn get_asset_price(&self, index: usize) -> Result<UFix64<N9>> {
    if index < self.asset_count() {
      self.asset_price(index)
    } else {
      Err(UnknownAsset.into())
    }
  }

  /// Total value held by the basket in N9.
  ///
  /// # Errors
  /// * Price resolution, rescaling or overflow
  fn basket_value(&self) -> Result<UFix64<N9>> {
    let quotes = (0..self.asset_count())
      .map(|index| {
        let balance = to_canonical(
          self.asset_balance(index)?,
          self.asset_decimals(index)?,
        )?;
        Ok(AssetQuote::new(balance, self.asset_price(index)?))
      })
      .collect::<Result<Vec<_>>>()?;
    basket_value(&quotes)
  }

  /// Share price, basket value over share supply.
  ///
  /// # Errors
  /// * Zero share supply or arithmetic failure
  fn get_price(&self) -> Result<UFix64<N9>> {
    share_price(self.basket_value()?, self.share_supply())
  }

  /// Conversion between shares and the asset at `index`.
  ///
  /// # Errors
  /// * Share or asset price failure
  fn conversion(&self, index: usize) -> Result<ExchangeConversion> {
    Ok(ExchangeConversion::new(
      self.get_price()?,
      self.get_asset_price(index)?,
    ))
  }

  /// Shares minted for `pay_amount` raw units of the asset at `index`.
  ///
  /// # Errors
  /// * Unknown asset or conversion failure
  fn get_buy_amount(
    &self,
    pay_amount: u128,
    index: usize,
  ) -> Result<UFix64<N9>> {
    let pay = to_canonical(pay_amount, self.asset_decimals(index)?)?;
    self.conversion(index)?.shares_for_payment(pay)
  }

  /// Raw units of the asset at `index` needed to mint `shares`, rounded up.
  ///
  /// # Errors
  /// * Unknown asset or conversion failure
  fn get_pay_amount(
    &self,
    shares: UFix64<N9>,
    index: usize,
  ) -> Result<u128> {
    let pay = self.conversion(index)?.payment_for_shares(shares)?;
    from_canonical_ceil(pay, self.asset_decimals(index)?)
  }

  /// Gross redemption of `shares` split into the performance fee and the
  /// amount paid out, both in canonical asset units.
  ///
  /// # Errors
  /// * Unknown asset, conversion or fee failure
  fn redemption(
    &self,
    shares: UFix64<N9>,
    index: usize,
    hold_price: UFix64<N9>,
    staked: u128,
  ) -> Result<FeeExtract<N9>> {
    let conversion = self.conversion(index)?;
    let gross = conversion.gross_redemption(shares)?;
    let gain = conversion.realized_gain(shares, hold_price)?;
    let fee = self.fee_config().fee(self.fee_discounts(), staked, gain)?;
    FeeExtract::new(fee, gross)
  }

  /// Net raw units of the asset at `index` paid for `shares`.
  ///
  /// # Errors
  /// * Unknown asset, conversion or fee failure
  fn get_receive_amount(
    &self,
    shares: UFix64<N9>,
    index: usize,
    hold_price: UFix64<N9>,
    staked: u128,
  ) -> Result<u128> {
    let redemption = self.redemption(shares, index, hold_price, staked)?;
    from_canonical_floor(
      redemption.amount_remaining,
      self.asset_decimals(index)?,
    )
  }

  /// Shares to sell so that the net payout covers `receive_amount` raw
  /// units of the asset at `index`.
  ///
  /// # Errors
  /// * Unknown asset, fee or conversion failure
  fn get_sell_amount(
    &self,
    receive_amount: u128,
    index: usize,
    hold_price: UFix64<N9>,
    staked: u128,
  ) -> Result<UFix64<N9>> {
    let receive = to_canonical(receive_amount, self.asset_decimals(index)?)?;
    let fee_rate = self
      .fee_config()
      .discounted_rate(self.fee_discounts(), staked)?;
    self
      .conversion(index)?
      .shares_for_redemption(receive, hold_price, fee_rate)
  }

  /// Flat fee on `amount` raw units of the asset at `index` after the
  /// staking discount, in the same raw units and rounded up.
  ///
  /// # Errors
  /// * Unknown asset, rescaling or fee arithmetic
  fn get_fee(&self, amount: u128, index: usize, staked: u128) -> Result<u128> {
    let decimals = self.asset_decimals(index)?;
    let amount = to_canonical(amount, decimals)?;
    let fee = self.fee_config().fee(self.fee_discounts(), staked, amount)?;
    from_canonical_ceil(fee, decimals)
  }
}
