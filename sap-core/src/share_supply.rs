use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use fix::prelude::*;

use crate::error::CoreError::{InsufficientShares, ShareMint};

/// Balances of the basket share token.
#[derive(Clone, Debug, Default)]
pub struct ShareLedger {
  total_supply: UFix64<N9>,
  balances: BTreeMap<Pubkey, UFix64<N9>>,
}

impl ShareLedger {
  #[must_use]
  pub fn total_supply(&self) -> UFix64<N9> {
    self.total_supply
  }

  #[must_use]
  pub fn balance_of(&self, holder: &Pubkey) -> UFix64<N9> {
    self
      .balances
      .get(holder)
      .copied()
      .unwrap_or(UFix64::zero())
  }

  /// Credits `amount` new shares to `holder`, returning the new balance.
  pub fn mint(
    &mut self,
    holder: Pubkey,
    amount: UFix64<N9>,
  ) -> Result<UFix64<N9>> {
    let total_supply = self
      .total_supply
      .checked_add(&amount)
      .ok_or(ShareMint)?;
    let balance = self
      .balance_of(&holder)
      .checked_add(&amount)
      .ok_or(ShareMint)?;
    self.total_supply = total_supply;
    self.balances.insert(holder, balance);
    Ok(balance)
  }

  /// Destroys `amount` of `holder`'s shares, returning the remaining
  /// balance. Emptied accounts are removed.
  pub fn burn(
    &mut self,
    holder: &Pubkey,
    amount: UFix64<N9>,
  ) -> Result<UFix64<N9>> {
    let balance = self
      .balance_of(holder)
      .checked_sub(&amount)
      .ok_or(InsufficientShares)?;
    let total_supply = self
      .total_supply
      .checked_sub(&amount)
      .ok_or(InsufficientShares)?;
    self.total_supply = total_supply;
    if balance == UFix64::zero() {
      self.balances.remove(holder);
    } else {
      self.balances.insert(*holder, balance);
    }
    Ok(balance)
  }

  /// Number of accounts holding shares.
  #[must_use]
  pub fn holders(&self) -> usize {
    self.balances.len()
  }
}
