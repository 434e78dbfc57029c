use anchor_lang::prelude::*;
use fix::prelude::*;
use itertools::Itertools;

use crate::error::CoreError::{
  FeeDiscountArithmetic, FeeDiscountLength, FeeDiscountOrder,
  InvalidDiscountRate,
};

/// Staked balance threshold granting a fractional fee discount.
/// Rates are at N6, e.g. `200_000` is a 20% discount.
#[derive(Clone, Copy, Debug, AnchorSerialize, AnchorDeserialize)]
pub struct FeeDiscountTier {
  pub threshold: u128,
  pub rate: UFixValue64,
}

impl FeeDiscountTier {
  pub fn rate(&self) -> Result<UFix64<N6>> {
    self.rate.try_into()
  }
}

/// Tiered fee discounts keyed by staked balance, sorted by strictly
/// descending threshold. Always replaced wholesale.
#[derive(Clone, Debug, Default, AnchorSerialize, AnchorDeserialize)]
pub struct FeeDiscountTable {
  tiers: Vec<FeeDiscountTier>,
}

impl FeeDiscountTable {
  pub fn new(
    thresholds: &[u128],
    rates: &[UFix64<N6>],
  ) -> Result<FeeDiscountTable> {
    let mut table = FeeDiscountTable::default();
    table.set_tiers(thresholds, rates)?;
    Ok(table)
  }

  /// Replaces every tier at once.
  ///
  /// # Errors
  /// * Threshold and rate counts differ
  /// * Thresholds not strictly descending
  /// * Any rate above 100%
  pub fn set_tiers(
    &mut self,
    thresholds: &[u128],
    rates: &[UFix64<N6>],
  ) -> Result<()> {
    if thresholds.len() != rates.len() {
      return Err(FeeDiscountLength.into());
    }
    if !thresholds.iter().tuple_windows().all(|(hi, lo)| hi > lo) {
      return Err(FeeDiscountOrder.into());
    }
    if rates.iter().any(|rate| *rate > UFix64::one()) {
      return Err(InvalidDiscountRate.into());
    }
    self.tiers = thresholds
      .iter()
      .zip(rates)
      .map(|(threshold, rate)| FeeDiscountTier {
        threshold: *threshold,
        rate: (*rate).into(),
      })
      .collect();
    Ok(())
  }

  pub fn tiers(&self) -> &[FeeDiscountTier] {
    &self.tiers
  }

  /// Rate of the highest tier whose threshold is at most `staked`.
  /// Zero if `staked` is below every threshold.
  pub fn discount(&self, staked: u128) -> Result<UFix64<N6>> {
    self
      .tiers
      .iter()
      .find(|tier| tier.threshold <= staked)
      .map_or(Ok(UFix64::zero()), FeeDiscountTier::rate)
  }

  /// Reduces `fee` by the discount earned with `staked`.
  ///   `fee * (1 - discount)`
  pub fn discounted_amount<Exp>(
    &self,
    staked: u128,
    fee: UFix64<Exp>,
  ) -> Result<UFix64<Exp>> {
    let one = UFix64::<N6>::one();
    one
      .checked_sub(&self.discount(staked)?)
      .and_then(|keep| fee.mul_div_ceil(keep, one))
      .ok_or(FeeDiscountArithmetic.into())
  }
}
