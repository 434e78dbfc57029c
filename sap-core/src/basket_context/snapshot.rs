use anchor_lang::prelude::*;
use fix::prelude::*;

use super::BasketContext;
use crate::amm::SpotPriceQuoter;
use crate::asset::Basket;
use crate::error::CoreError::UnknownAsset;
use crate::fee_controller::FeeConfig;
use crate::fee_discount::FeeDiscountTable;
use crate::oracle::PriceOracle;

/// Balance and resolved price of one basket asset.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotAsset {
  pub decimals: u8,
  pub balance: u128,
  pub price: UFix64<N9>,
}

/// Basket state with every asset price resolved once, so a single call
/// prices against one consistent view.
#[derive(Clone, Debug)]
pub struct BasketSnapshot<'a> {
  pub assets: Vec<SnapshotAsset>,
  pub share_supply: UFix64<N9>,
  fee_config: &'a FeeConfig,
  fee_discounts: &'a FeeDiscountTable,
}

impl BasketContext for BasketSnapshot<'_> {
  fn asset_count(&self) -> usize {
    self.assets.len()
  }

  fn asset_decimals(&self, index: usize) -> Result<u8> {
    self.asset(index).map(|asset| asset.decimals)
  }

  fn asset_balance(&self, index: usize) -> Result<u128> {
    self.asset(index).map(|asset| asset.balance)
  }

  fn asset_price(&self, index: usize) -> Result<UFix64<N9>> {
    self.asset(index).map(|asset| asset.price)
  }

  fn share_supply(&self) -> UFix64<N9> {
    self.share_supply
  }

  fn fee_config(&self) -> &FeeConfig {
    self.fee_config
  }

  fn fee_discounts(&self) -> &FeeDiscountTable {
    self.fee_discounts
  }
}

impl<'a> BasketSnapshot<'a> {
  #[must_use]
  pub fn new(
    assets: Vec<SnapshotAsset>,
    share_supply: UFix64<N9>,
    fee_config: &'a FeeConfig,
    fee_discounts: &'a FeeDiscountTable,
  ) -> BasketSnapshot<'a> {
    BasketSnapshot {
      assets,
      share_supply,
      fee_config,
      fee_discounts,
    }
  }

  /// Reads every basket balance through `balance_of` and resolves each
  /// asset's price from its configured source.
  ///
  /// # Errors
  /// * Balance lookup or price source failure
  pub fn load<O, Q, F>(
    basket: &Basket,
    balance_of: F,
    oracle: &O,
    quoter: &Q,
    share_supply: UFix64<N9>,
    fee_config: &'a FeeConfig,
    fee_discounts: &'a FeeDiscountTable,
  ) -> Result<BasketSnapshot<'a>>
  where
    O: PriceOracle + ?Sized,
    Q: SpotPriceQuoter + ?Sized,
    F: Fn(&Pubkey) -> Result<u128>,
  {
    let assets = basket
      .iter()
      .enumerate()
      .map(|(index, asset)| {
        Ok(SnapshotAsset {
          decimals: asset.decimals,
          balance: balance_of(&asset.token)?,
          price: basket.unit_price(index, oracle, quoter)?,
        })
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(BasketSnapshot::new(
      assets,
      share_supply,
      fee_config,
      fee_discounts,
    ))
  }

  fn asset(&self, index: usize) -> Result<&SnapshotAsset> {
    self.assets.get(index).ok_or(UnknownAsset.into())
  }
}
