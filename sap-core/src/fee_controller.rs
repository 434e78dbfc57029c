use anchor_lang::prelude::*;
use fix::prelude::*;

use crate::error::CoreError::{FeeExtraction, InvalidFeeRate};
use crate::fee_discount::FeeDiscountTable;

/// Performance fee charged on realized gains at redemption.
/// The rate is at N6 to match discount rates, e.g. `60_000` is 6%.
#[derive(Copy, Clone, Debug, AnchorSerialize, AnchorDeserialize)]
pub struct FeeConfig {
  fee_rate: UFixValue64,
}

impl FeeConfig {
  pub fn new(fee_rate: UFix64<N6>) -> Result<FeeConfig> {
    Self::validate_rate(fee_rate)?;
    Ok(FeeConfig {
      fee_rate: fee_rate.into(),
    })
  }

  pub fn fee_rate(&self) -> Result<UFix64<N6>> {
    self.fee_rate.try_into()
  }

  /// Updates fee rate.
  pub fn update(&mut self, new_rate: UFix64<N6>) -> Result<()> {
    Self::validate_rate(new_rate)?;
    self.fee_rate = new_rate.into();
    Ok(())
  }

  /// Fee rate must not exceed 100%.
  fn validate_rate(rate: UFix64<N6>) -> Result<()> {
    if rate <= UFix64::one() {
      Ok(())
    } else {
      Err(InvalidFeeRate.into())
    }
  }

  /// Rejects a stored rate above 100%, for configs built without `new`.
  pub fn validate(&self) -> Result<()> {
    Self::validate_rate(self.fee_rate()?)
  }

  /// Fee rate after the holder's staking discount.
  ///   `fee_rate * (1 - discount)`
  pub fn discounted_rate(
    &self,
    discounts: &FeeDiscountTable,
    staked: u128,
  ) -> Result<UFix64<N6>> {
    discounts.discounted_amount(staked, self.fee_rate()?)
  }

  /// Flat fee owed on `amount`, before subtraction.
  ///   `amount * fee_rate * (1 - discount)`
  pub fn fee<Exp>(
    &self,
    discounts: &FeeDiscountTable,
    staked: u128,
    amount: UFix64<Exp>,
  ) -> Result<UFix64<Exp>> {
    let gross_fee = amount
      .mul_div_ceil(self.fee_rate()?, UFix64::<N6>::one())
      .ok_or(FeeExtraction)?;
    discounts.discounted_amount(staked, gross_fee)
  }
}

/// Splits an amount into the fee taken and the remainder paid out.
pub struct FeeExtract<Exp> {
  pub fees_extracted: UFix64<Exp>,
  pub amount_remaining: UFix64<Exp>,
}

impl<Exp> FeeExtract<Exp> {
  pub fn new(
    fees_extracted: UFix64<Exp>,
    amount_in: UFix64<Exp>,
  ) -> Result<FeeExtract<Exp>> {
    let amount_remaining = amount_in
      .checked_sub(&fees_extracted)
      .ok_or(FeeExtraction)?;
    Ok(FeeExtract {
      fees_extracted,
      amount_remaining,
    })
  }
}
