//! Conversions between human-readable decimals, token minor units, and the
//! canonical N9 precision every basket quantity is aggregated in.

use std::cmp::Ordering;

use anchor_lang::prelude::*;
use fix::prelude::*;
use rust_decimal::Decimal;

use crate::error::CoreError::{
  DecimalPrecision, DecimalRescale, InvalidDecimal, NegativeAmount,
};

/// Decimal places of the share token, and of every canonical basket value.
pub const SHARE_DECIMALS: u8 = 9;

/// Largest scale representable by `rust_decimal`.
const MAX_PLACES: u32 = 28;

/// Parses a decimal string into integer minor units at `places` decimals.
/// Extra fractional digits are truncated, never rounded; shorter fractions are
/// padded with zeros. Any sign is accepted.
///   `to_minor_units("6.25", 6) == 6_250_000`
pub fn to_minor_units(value: &str, places: u32) -> Result<i128> {
  if places > MAX_PLACES {
    return Err(DecimalPrecision.into());
  }
  let parsed =
    Decimal::from_str_exact(value.trim()).map_err(|_| InvalidDecimal)?;
  let mut minor = parsed.trunc_with_scale(places);
  minor.rescale(places);
  if minor.scale() == places {
    Ok(minor.mantissa())
  } else {
    Err(DecimalPrecision.into())
  }
}

/// Renders integer minor units as a decimal string, placing the point
/// `places` digits from the right and dropping trailing fractional zeros.
///   `to_decimal(6_250_000, 6) == "6.25"`
pub fn to_decimal(value: i128, places: u32) -> Result<String> {
  if places > MAX_PLACES {
    return Err(DecimalPrecision.into());
  }
  let decimal = Decimal::try_from_i128_with_scale(value, places)
    .map_err(|_| DecimalPrecision)?;
  Ok(decimal.normalize().to_string())
}

/// Parses a non-negative decimal string into a raw token amount.
pub fn to_token_amount(value: &str, decimals: u8) -> Result<u128> {
  let minor = to_minor_units(value, u32::from(decimals))?;
  u128::try_from(minor).map_err(|_| NegativeAmount.into())
}

/// Parses a decimal string directly into a canonical fixed point value.
pub fn parse_fix<Exp: fix::typenum::Integer>(
  value: &str,
) -> Result<UFix64<Exp>> {
  let places = u32::try_from(-Exp::to_i32()).map_err(|_| DecimalPrecision)?;
  let minor = to_minor_units(value, places)?;
  if minor.is_negative() {
    Err(NegativeAmount.into())
  } else {
    u64::try_from(minor)
      .map(UFix64::new)
      .map_err(|_| DecimalPrecision.into())
  }
}

fn pow10(exp: u8) -> Result<u128> {
  10u128.checked_pow(u32::from(exp)).ok_or(DecimalRescale.into())
}

/// Moves an integer amount between decimal precisions.
/// Narrowing divides, rounding up only when `ceil` is set.
fn rescale(amount: u128, from: u8, to: u8, ceil: bool) -> Result<u128> {
  match from.cmp(&to) {
    Ordering::Equal => Ok(amount),
    Ordering::Less => amount
      .checked_mul(pow10(to - from)?)
      .ok_or(DecimalRescale.into()),
    Ordering::Greater => {
      let divisor = pow10(from - to)?;
      let quotient = amount / divisor;
      if ceil && amount % divisor != 0 {
        quotient.checked_add(1).ok_or(DecimalRescale.into())
      } else {
        Ok(quotient)
      }
    }
  }
}

/// Raw token amount at `decimals` to canonical N9, flooring excess digits.
/// Raw amounts are `u128` so 18 decimal tokens hold realistic balances.
pub fn to_canonical(amount: u128, decimals: u8) -> Result<UFix64<N9>> {
  let bits = rescale(amount, decimals, SHARE_DECIMALS, false)?;
  u64::try_from(bits)
    .map(UFix64::new)
    .map_err(|_| DecimalRescale.into())
}

/// Canonical N9 value to a raw token amount, rounding down.
pub fn from_canonical_floor(value: UFix64<N9>, decimals: u8) -> Result<u128> {
  rescale(u128::from(value.bits), SHARE_DECIMALS, decimals, false)
}

/// Canonical N9 value to a raw token amount, rounding up.
pub fn from_canonical_ceil(value: UFix64<N9>, decimals: u8) -> Result<u128> {
  rescale(u128::from(value.bits), SHARE_DECIMALS, decimals, true)
}

/// One whole token unit in minor units, e.g. `10^6` for a 6 decimal token.
pub fn unit_amount(decimals: u8) -> Result<u128> {
  pow10(decimals)
}
