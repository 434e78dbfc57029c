//! Whitelisted basket assets and their price sources.

use anchor_lang::prelude::*;
use fix::prelude::*;
use itertools::Itertools;
use pyth_solana_receiver_sdk::price_update::FeedId;

use crate::amm::{spot_price, SpotPriceQuoter};
use crate::error::CoreError::{
  AmmQuoteAsset, DuplicateAsset, EmptyBasket, UnknownAsset,
};
use crate::oracle::{
  is_null_feed, normalize_oracle_price, PriceOracle, NULL_FEED_ID,
};

/// Asset listing as supplied at construction: a token and its Pyth feed id.
/// The null feed id prices the asset from the AMM instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct AssetConfig {
  pub token: Pubkey,
  pub pyth_price_id: FeedId,
}

impl AssetConfig {
  #[must_use]
  pub fn new(token: Pubkey, pyth_price_id: FeedId) -> AssetConfig {
    AssetConfig {
      token,
      pyth_price_id,
    }
  }
}

/// Where an asset's unit price comes from, fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceSource {
  Oracle { feed_id: FeedId },
  Amm { quote_token: Pubkey },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasketAsset {
  pub token: Pubkey,
  pub decimals: u8,
  pub price_source: PriceSource,
}

impl BasketAsset {
  /// Feed id as originally listed; AMM priced assets report the null id.
  #[must_use]
  pub fn pyth_price_id(&self) -> FeedId {
    match self.price_source {
      PriceSource::Oracle { feed_id } => feed_id,
      PriceSource::Amm { .. } => NULL_FEED_ID,
    }
  }
}

/// Ordered, immutable asset list. The index is the stable handle.
#[derive(Clone, Debug)]
pub struct Basket {
  assets: Vec<BasketAsset>,
}

impl Basket {
  /// Resolves every listing into a [`BasketAsset`], looking up decimals
  /// through `decimals_of`.
  ///
  /// # Errors
  /// * Empty list or duplicate tokens
  /// * An AMM priced asset without an oracle priced quote asset at index 0
  pub fn new<F>(configs: &[AssetConfig], decimals_of: F) -> Result<Basket>
  where
    F: Fn(&Pubkey) -> Result<u8>,
  {
    let quote = configs.first().ok_or(EmptyBasket)?;
    if !configs.iter().map(|config| config.token).all_unique() {
      return Err(DuplicateAsset.into());
    }
    let needs_quote = configs
      .iter()
      .any(|config| is_null_feed(&config.pyth_price_id));
    if needs_quote && is_null_feed(&quote.pyth_price_id) {
      return Err(AmmQuoteAsset.into());
    }
    let assets = configs
      .iter()
      .map(|config| {
        let price_source = if is_null_feed(&config.pyth_price_id) {
          PriceSource::Amm {
            quote_token: quote.token,
          }
        } else {
          PriceSource::Oracle {
            feed_id: config.pyth_price_id,
          }
        };
        Ok(BasketAsset {
          token: config.token,
          decimals: decimals_of(&config.token)?,
          price_source,
        })
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Basket { assets })
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.assets.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.assets.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &BasketAsset> {
    self.assets.iter()
  }

  pub fn get(&self, index: usize) -> Result<&BasketAsset> {
    self.assets.get(index).ok_or(UnknownAsset.into())
  }

  pub fn index_of(&self, token: &Pubkey) -> Result<usize> {
    self
      .assets
      .iter()
      .position(|asset| asset.token == *token)
      .ok_or(UnknownAsset.into())
  }

  pub fn token(&self, index: usize) -> Result<Pubkey> {
    self.get(index).map(|asset| asset.token)
  }

  pub fn pyth_price_id(&self, index: usize) -> Result<FeedId> {
    self.get(index).map(BasketAsset::pyth_price_id)
  }

  #[must_use]
  pub fn contains(&self, token: &Pubkey) -> bool {
    self.assets.iter().any(|asset| asset.token == *token)
  }

  /// Unit price of the asset at `index` in N9, from its configured source.
  pub fn unit_price<O, Q>(
    &self,
    index: usize,
    oracle: &O,
    quoter: &Q,
  ) -> Result<UFix64<N9>>
  where
    O: PriceOracle + ?Sized,
    Q: SpotPriceQuoter + ?Sized,
  {
    let asset = self.get(index)?;
    match asset.price_source {
      PriceSource::Oracle { feed_id } => {
        normalize_oracle_price(oracle.get_price(&feed_id)?)
      }
      PriceSource::Amm { quote_token } => {
        let quote = self.get(self.index_of(&quote_token)?)?;
        spot_price(
          quoter,
          &asset.token,
          asset.decimals,
          &quote.token,
          quote.decimals,
        )
      }
    }
  }
}
