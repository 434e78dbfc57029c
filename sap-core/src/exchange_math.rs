use crate::error::CoreError::{
  BasketValue, HoldPrice, SharePrice, ZeroShareSupply,
};

use anchor_lang::prelude::*;
use fix::prelude::*;

/// Canonical balance of one basket asset with its unit price.
#[derive(Clone, Copy, Debug)]
pub struct AssetQuote {
  pub balance: UFix64<N9>,
  pub price: UFix64<N9>,
}

impl AssetQuote {
  #[must_use]
  pub fn new(balance: UFix64<N9>, price: UFix64<N9>) -> AssetQuote {
    AssetQuote { balance, price }
  }
}

/// Value of an asset balance at the given unit price.
///   `balance * price`
pub fn asset_value(
  balance: UFix64<N9>,
  price: UFix64<N9>,
) -> Result<UFix64<N9>> {
  balance
    .mul_div_floor(price, UFix64::one())
    .ok_or(BasketValue.into())
}

/// Sums the value of every asset held by the basket.
pub fn basket_value(quotes: &[AssetQuote]) -> Result<UFix64<N9>> {
  quotes.iter().try_fold(UFix64::zero(), |total, quote| {
    let value = asset_value(quote.balance, quote.price)?;
    total.checked_add(&value).ok_or(BasketValue.into())
  })
}

/// Value of one share, which must be positive.
///   `basket_value / total_supply`
pub fn share_price(
  basket_value: UFix64<N9>,
  total_supply: UFix64<N9>,
) -> Result<UFix64<N9>> {
  if total_supply == UFix64::zero() {
    Err(ZeroShareSupply.into())
  } else {
    basket_value
      .mul_div_floor(UFix64::one(), total_supply)
      .filter(|price| *price > UFix64::zero())
      .ok_or(SharePrice.into())
  }
}

/// Cost basis after adding `new_shares` bought at `buy_price` to a position
/// of `old_shares` held at `old_price`, floored.
///
/// ```txt
///         old_price * old_shares + buy_price * new_shares
/// hold = -------------------------------------------------
///                    old_shares + new_shares
/// ```
///
/// An empty prior position takes the buy price as is.
pub fn weighted_hold_price(
  old_price: UFix64<N9>,
  old_shares: UFix64<N9>,
  buy_price: UFix64<N9>,
  new_shares: UFix64<N9>,
) -> Result<UFix64<N9>> {
  if old_shares == UFix64::zero() {
    return Ok(buy_price);
  }
  let old_cost = u128::from(old_price.bits) * u128::from(old_shares.bits);
  let new_cost = u128::from(buy_price.bits) * u128::from(new_shares.bits);
  let total_shares = u128::from(old_shares.bits) + u128::from(new_shares.bits);
  old_cost
    .checked_add(new_cost)
    .map(|cost| cost / total_shares)
    .and_then(|hold| u64::try_from(hold).ok())
    .map(UFix64::new)
    .ok_or(HoldPrice.into())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::proptest::*;
  use proptest::prelude::*;

  #[test]
  fn basket_of_two() -> Result<()> {
    let quotes = [
      // 100 USDC at 0.9999
      AssetQuote::new(
        UFix64::new(100_000_000_000),
        UFix64::new(999_900_000),
      ),
      // 1 BTC at 41671.75
      AssetQuote::new(
        UFix64::new(1_000_000_000),
        UFix64::new(41_671_750_000_000),
      ),
    ];
    let value = basket_value(&quotes)?;
    assert_eq!(value, UFix64::new(41_771_740_000_000));
    let price = share_price(value, UFix64::new(100_000_000_000))?;
    assert_eq!(price, UFix64::new(417_717_400_000));
    Ok(())
  }

  #[test]
  fn empty_basket_is_worthless() -> Result<()> {
    assert_eq!(basket_value(&[])?, UFix64::zero());
    Ok(())
  }

  #[test]
  fn share_price_zero_supply() {
    let out = share_price(UFix64::new(1), UFix64::zero());
    assert_eq!(out, Err(ZeroShareSupply.into()));
  }

  #[test]
  fn basket_value_overflow() {
    let max = UFix64::new(u64::MAX);
    let quote = AssetQuote::new(max, max);
    assert_eq!(basket_value(&[quote]), Err(BasketValue.into()));
  }

  #[test]
  fn hold_price_equal_buys() -> Result<()> {
    let p1 = UFix64::<N9>::new(10_000_000_000);
    let p2 = UFix64::<N9>::new(12_000_000_000);
    let shares = UFix64::<N9>::new(5_000_000_000);
    let hold = weighted_hold_price(p1, shares, p2, shares)?;
    assert_eq!(hold, UFix64::new(11_000_000_000));
    Ok(())
  }

  #[test]
  fn hold_price_first_buy() -> Result<()> {
    let buy = UFix64::<N9>::new(3_141_592_653);
    let (old, none) = (UFix64::new(99), UFix64::zero());
    let hold = weighted_hold_price(old, none, buy, UFix64::new(7))?;
    assert_eq!(hold, buy);
    Ok(())
  }

  #[test]
  fn hold_price_floors() -> Result<()> {
    let hold = weighted_hold_price(
      UFix64::new(1),
      UFix64::new(2),
      UFix64::new(2),
      UFix64::new(1),
    )?;
    assert_eq!(hold, UFix64::new(1));
    Ok(())
  }

  proptest! {
    #[test]
    fn hold_price_between_prices(
      old_price in unit_price(),
      buy_price in unit_price(),
      old_shares in share_amount(),
      new_shares in share_amount(),
    ) {
      let hold =
        weighted_hold_price(old_price, old_shares, buy_price, new_shares)?;
      let (lo, hi) = if old_price <= buy_price {
        (old_price, buy_price)
      } else {
        (buy_price, old_price)
      };
      prop_assert!(lo <= hold && hold <= hi);
    }

    #[test]
    fn share_price_of_own_value(
      supply in share_amount(),
      price in unit_price(),
    ) {
      let value = asset_value(supply, price)?;
      let out = share_price(value, supply)?;
      prop_assert!(out <= price);
      prop_assert!(price.bits - out.bits <= 2);
    }
  }
}
