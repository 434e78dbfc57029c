//! JSON configuration for a Sap deployment.

use std::str::FromStr;

use anchor_lang::prelude::*;
use fix::prelude::*;
use pyth_solana_receiver_sdk::price_update::get_feed_id_from_hex;
use sap_core::asset::AssetConfig;
use sap_core::decimals::{parse_fix, to_token_amount};
use sap_core::fee_controller::FeeConfig;
use sap_core::fee_discount::FeeDiscountTable;
use sap_core::oracle::NULL_FEED_ID;
use serde::{Deserialize, Serialize};

use crate::error::ExchangeError::InvalidConfig;

fn default_staking_decimals() -> u8 {
  9
}

/// Basket asset listing. A missing feed id prices the asset from the AMM.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AssetEntry {
  pub token: String,
  #[serde(default)]
  pub pyth_price_id: Option<String>,
}

/// Discount tier with the threshold in whole staking tokens and the rate as
/// a fraction, e.g. `{ "threshold": "2000", "rate": "0.2" }`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FeeDiscountEntry {
  pub threshold: String,
  pub rate: String,
}

/// Deployment configuration as written by operators.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SapConfig {
  pub name: String,
  pub symbol: String,
  pub owner: String,
  pub address: String,
  pub fee_rate: String,
  pub assets: Vec<AssetEntry>,
  #[serde(default = "default_staking_decimals")]
  pub staking_decimals: u8,
  #[serde(default)]
  pub fee_discounts: Vec<FeeDiscountEntry>,
}

/// Validated configuration ready to construct an exchange.
#[derive(Clone, Debug)]
pub struct SapSettings {
  pub name: String,
  pub symbol: String,
  pub owner: Pubkey,
  pub address: Pubkey,
  pub assets: Vec<AssetConfig>,
  pub fee_config: FeeConfig,
  pub fee_discounts: FeeDiscountTable,
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey> {
  Pubkey::from_str(value).map_err(|err| {
    tracing::warn!(field, value, %err, "invalid public key in config");
    InvalidConfig.into()
  })
}

impl SapConfig {
  pub fn from_json(json: &str) -> Result<SapConfig> {
    serde_json::from_str(json).map_err(|err| {
      tracing::warn!(%err, "failed to parse sap config");
      InvalidConfig.into()
    })
  }

  /// Parses keys, feed ids, rates and tiers.
  ///
  /// # Errors
  /// * Malformed keys, feed ids or decimals
  /// * Fee rate or discount tiers out of bounds
  pub fn settings(&self) -> Result<SapSettings> {
    if self.name.is_empty() || self.symbol.is_empty() {
      return Err(InvalidConfig.into());
    }
    let assets = self
      .assets
      .iter()
      .map(|entry| {
        let token = parse_pubkey("assets.token", &entry.token)?;
        let pyth_price_id = match &entry.pyth_price_id {
          Some(hex) => get_feed_id_from_hex(hex)?,
          None => NULL_FEED_ID,
        };
        Ok(AssetConfig::new(token, pyth_price_id))
      })
      .collect::<Result<Vec<_>>>()?;
    let thresholds = self
      .fee_discounts
      .iter()
      .map(|tier| to_token_amount(&tier.threshold, self.staking_decimals))
      .collect::<Result<Vec<_>>>()?;
    let rates = self
      .fee_discounts
      .iter()
      .map(|tier| parse_fix::<N6>(&tier.rate))
      .collect::<Result<Vec<UFix64<N6>>>>()?;
    Ok(SapSettings {
      name: self.name.clone(),
      symbol: self.symbol.clone(),
      owner: parse_pubkey("owner", &self.owner)?,
      address: parse_pubkey("address", &self.address)?,
      assets,
      fee_config: FeeConfig::new(parse_fix(&self.fee_rate)?)?,
      fee_discounts: FeeDiscountTable::new(&thresholds, &rates)?,
    })
  }
}
