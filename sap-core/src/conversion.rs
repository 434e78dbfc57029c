use crate::error::CoreError::{BuyAmount, PayAmount, ReceiveAmount, SellAmount};

use anchor_lang::prelude::*;
use fix::prelude::*;

/// Conversions between basket shares and one basket asset, all at N9.
pub struct ExchangeConversion {
  pub share_price: UFix64<N9>,
  pub asset_price: UFix64<N9>,
}

impl ExchangeConversion {
  #[must_use]
  pub fn new(share_price: UFix64<N9>, asset_price: UFix64<N9>) -> Self {
    ExchangeConversion {
      share_price,
      asset_price,
    }
  }

  /// Shares minted for a deposit of the asset.
  ///   `pay * asset_price / share_price`
  pub fn shares_for_payment(&self, pay: UFix64<N9>) -> Result<UFix64<N9>> {
    pay
      .mul_div_floor(self.asset_price, self.share_price)
      .ok_or(BuyAmount.into())
  }

  /// Deposit needed to mint `shares`, rounded up.
  ///   `shares * share_price / asset_price`
  pub fn payment_for_shares(&self, shares: UFix64<N9>) -> Result<UFix64<N9>> {
    shares
      .mul_div_ceil(self.share_price, self.asset_price)
      .ok_or(PayAmount.into())
  }

  /// Asset owed for `shares` before any fee.
  pub fn gross_redemption(&self, shares: UFix64<N9>) -> Result<UFix64<N9>> {
    shares
      .mul_div_floor(self.share_price, self.asset_price)
      .ok_or(ReceiveAmount.into())
  }

  /// Share price gain over `hold_price`, zero for loss positions.
  #[must_use]
  pub fn gain_per_share(&self, hold_price: UFix64<N9>) -> UFix64<N9> {
    self
      .share_price
      .checked_sub(&hold_price)
      .unwrap_or(UFix64::zero())
  }

  /// Realized gain on `shares` expressed in the asset.
  ///   `max(0, share_price - hold_price) * shares / asset_price`
  pub fn realized_gain(
    &self,
    shares: UFix64<N9>,
    hold_price: UFix64<N9>,
  ) -> Result<UFix64<N9>> {
    shares
      .mul_div_floor(self.gain_per_share(hold_price), self.asset_price)
      .ok_or(ReceiveAmount.into())
  }

  /// Shares to burn so that the net redemption covers `receive`, given the
  /// fee rate already discounted for the holder.
  ///
  /// ```txt
  ///                    receive * asset_price
  /// shares = ---------------------------------------------
  ///          share_price - (share_price - hold_price) * fee
  /// ```
  pub fn shares_for_redemption(
    &self,
    receive: UFix64<N9>,
    hold_price: UFix64<N9>,
    fee_rate: UFix64<N6>,
  ) -> Result<UFix64<N9>> {
    let fee_per_share = self
      .gain_per_share(hold_price)
      .mul_div_ceil(fee_rate, UFix64::one())
      .ok_or(SellAmount)?;
    let net_price = self
      .share_price
      .checked_sub(&fee_per_share)
      .filter(|price| *price > UFix64::zero())
      .ok_or(SellAmount)?;
    receive
      .mul_div_ceil(self.asset_price, net_price)
      .ok_or(SellAmount.into())
  }
}
