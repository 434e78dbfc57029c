//! Collaborators the exchange is composed with.
//!
//! Each trait is the narrow capability the controller needs from an
//! external program. Implementations are injected at construction.

use anchor_lang::prelude::*;

pub use sap_core::amm::SpotPriceQuoter;
pub use sap_core::oracle::{OraclePrice, PriceOracle};

/// Fungible token balances across every basket mint.
pub trait TokenLedger {
  fn decimals(&self, mint: &Pubkey) -> Result<u8>;

  /// Raw balance in the mint's minor units.
  fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> Result<u128>;

  fn transfer(
    &mut self,
    mint: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    amount: u128,
  ) -> Result<()>;
}

/// UniswapV2 style router, quoting and swapping along a token path.
pub trait SwapRouter: SpotPriceQuoter {
  /// Swaps exactly `amount_in` of `path[0]` held by `sender` for the last
  /// token of `path`, paid to `to`. Returns the amount at every hop.
  fn swap_exact_tokens_for_tokens<L: TokenLedger>(
    &mut self,
    ledger: &mut L,
    amount_in: u128,
    amount_out_min: u128,
    path: &[Pubkey],
    sender: &Pubkey,
    to: &Pubkey,
  ) -> Result<Vec<u128>>;
}

/// Staked balance source for fee discounts.
pub trait StakingBalance {
  fn staked_balance_of(&self, holder: &Pubkey) -> Result<u128>;
}
