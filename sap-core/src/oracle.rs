//! Push oracle price source.
//!
//! [`PriceOracle`] is the narrow capability the basket needs from a Pyth
//! style feed: a mantissa and exponent per feed id. [`normalize_oracle_price`]
//! lifts that pair into the canonical N9 precision, and [`PythPriceBook`]
//! serves prices out of posted `PriceUpdateV2` accounts with the usual
//! verification and staleness checks.

use anchor_lang::prelude::*;
use fix::prelude::*;
use pyth_solana_receiver_sdk::price_update::{
  FeedId, PriceUpdateV2, VerificationLevel,
};

use crate::decimals::SHARE_DECIMALS;
use crate::error::CoreError::{
  OracleExponent, OracleFeedNotFound, OracleNegativePrice,
  OracleNegativeTime, OracleOutdated, OraclePriceRange,
  OracleVerificationLevel,
};

/// Feed id marking an asset without an oracle feed.
pub const NULL_FEED_ID: FeedId = [0; 32];

/// Largest decimal shift accepted between an oracle exponent and N9.
const MAX_EXPONENT_SHIFT: u32 = 18;

/// Raw oracle quote, meaning `price * 10^exponent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OraclePrice {
  pub price: i64,
  pub exponent: i32,
}

impl OraclePrice {
  #[must_use]
  pub fn new(price: i64, exponent: i32) -> OraclePrice {
    OraclePrice { price, exponent }
  }
}

/// Read-only push oracle keyed by feed id.
pub trait PriceOracle {
  fn get_price(&self, feed_id: &FeedId) -> Result<OraclePrice>;
}

impl<T: PriceOracle + ?Sized> PriceOracle for &T {
  fn get_price(&self, feed_id: &FeedId) -> Result<OraclePrice> {
    (**self).get_price(feed_id)
  }
}

#[must_use]
pub fn is_null_feed(feed_id: &FeedId) -> bool {
  *feed_id == NULL_FEED_ID
}

/// Rescales an oracle quote to N9, flooring when the oracle carries more
/// precision. Rejects non-positive prices.
pub fn normalize_oracle_price(
  OraclePrice { price, exponent }: OraclePrice,
) -> Result<UFix64<N9>> {
  if price <= 0 {
    return Err(OracleNegativePrice.into());
  }
  let mantissa = u128::from(price.unsigned_abs());
  let shift = exponent
    .checked_add(i32::from(SHARE_DECIMALS))
    .ok_or(OracleExponent)?;
  let magnitude = shift.unsigned_abs();
  if magnitude > MAX_EXPONENT_SHIFT {
    return Err(OracleExponent.into());
  }
  let factor = 10u128.pow(magnitude);
  let scaled = if shift >= 0 {
    mantissa.checked_mul(factor).ok_or(OraclePriceRange)?
  } else {
    mantissa / factor
  };
  u64::try_from(scaled)
    .map(UFix64::new)
    .map_err(|_| OraclePriceRange.into())
}

#[derive(Copy, Clone, Debug)]
pub struct OracleConfig {
  pub max_age_secs: u64,
}

impl OracleConfig {
  #[must_use]
  pub fn new(max_age_secs: u64) -> OracleConfig {
    OracleConfig { max_age_secs }
  }
}

/// Ensures the oracle's publish time is within the inclusive range:
///   `[clock_time - max_age, clock_time]`
fn validate_publish_time(
  publish_time: i64,
  max_age_secs: u64,
  clock_time: i64,
) -> Result<()> {
  let (publish_time, clock_time) =
    if publish_time.is_positive() && clock_time.is_positive() {
      Ok((publish_time.unsigned_abs(), clock_time.unsigned_abs()))
    } else {
      Err(OracleNegativeTime)
    }?;
  if publish_time.saturating_add(max_age_secs) >= clock_time {
    Ok(())
  } else {
    Err(OracleOutdated.into())
  }
}

/// Checks Pythnet verification level for the price update.
fn validate_verification_level(level: VerificationLevel) -> Result<()> {
  if level == VerificationLevel::Full {
    Ok(())
  } else {
    Err(OracleVerificationLevel.into())
  }
}

/// Serves oracle prices from a set of posted Pyth price updates.
pub struct PythPriceBook<'a> {
  updates: &'a [PriceUpdateV2],
  unix_timestamp: i64,
  config: OracleConfig,
}

impl<'a> PythPriceBook<'a> {
  #[must_use]
  pub fn new(
    updates: &'a [PriceUpdateV2],
    unix_timestamp: i64,
    config: OracleConfig,
  ) -> PythPriceBook<'a> {
    PythPriceBook {
      updates,
      unix_timestamp,
      config,
    }
  }
}

impl PriceOracle for PythPriceBook<'_> {
  fn get_price(&self, feed_id: &FeedId) -> Result<OraclePrice> {
    let update = self
      .updates
      .iter()
      .find(|update| update.price_message.feed_id == *feed_id)
      .ok_or(OracleFeedNotFound)?;
    validate_verification_level(update.verification_level)?;
    validate_publish_time(
      update.price_message.publish_time,
      self.config.max_age_secs,
      self.unix_timestamp,
    )?;
    Ok(OraclePrice::new(
      update.price_message.price,
      update.price_message.exponent,
    ))
  }
}
