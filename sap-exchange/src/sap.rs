use std::fmt::Debug;

use anchor_lang::prelude::*;
use fix::prelude::*;
use pyth_solana_receiver_sdk::price_update::FeedId;
use sap_core::asset::Basket;
use sap_core::basket_context::{BasketContext, BasketSnapshot};
use sap_core::decimals::{from_canonical_floor, SHARE_DECIMALS};
use sap_core::error::CoreError::{BasketValue, InsufficientShares};
use sap_core::fee_controller::FeeConfig;
use sap_core::fee_discount::FeeDiscountTable;
use sap_core::hold_price::HoldPriceBook;
use sap_core::share_supply::ShareLedger;
use sap_core::slippage::check_min_out;

use crate::config::{SapConfig, SapSettings};
use crate::error::ExchangeError::{
  AlreadyInitialized, InitAmountsLength, InsufficientBalance, InvalidSwapPath,
  NotInitialized, Unauthorized, ZeroAmount,
};
use crate::interfaces::{PriceOracle, StakingBalance, SwapRouter, TokenLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SapState {
  Uninitialized,
  Initialized,
}

/// Basket share token exchange.
///
/// Deposits of any whitelisted asset mint shares at the current share price.
/// Redemptions pay out one asset net of a performance fee on the gain over
/// the holder's hold price. Every mutating call validates first and only then
/// moves tokens, so a failed call leaves no trace.
pub struct Sap<L, O, R, S> {
  name: String,
  symbol: String,
  owner: Pubkey,
  address: Pubkey,
  basket: Basket,
  fee_config: FeeConfig,
  fee_discounts: FeeDiscountTable,
  shares: ShareLedger,
  hold_prices: HoldPriceBook,
  state: SapState,
  ledger: L,
  oracle: O,
  router: R,
  staking: S,
}

impl<L, O, R, S> Sap<L, O, R, S>
where
  L: TokenLedger,
  O: PriceOracle,
  R: SwapRouter,
  S: StakingBalance,
{
  /// Resolves the asset list against the ledger's decimals.
  ///
  /// # Errors
  /// * Fee rate above 100%
  /// * Invalid asset list or unknown mint decimals
  pub fn new(
    settings: SapSettings,
    ledger: L,
    oracle: O,
    router: R,
    staking: S,
  ) -> Result<Self> {
    settings.fee_config.validate()?;
    let basket = Basket::new(&settings.assets, |mint| ledger.decimals(mint))?;
    tracing::info!(
      name = %settings.name,
      symbol = %settings.symbol,
      owner = %settings.owner,
      address = %settings.address,
      assets = basket.len(),
      "sap created"
    );
    Ok(Sap {
      name: settings.name,
      symbol: settings.symbol,
      owner: settings.owner,
      address: settings.address,
      basket,
      fee_config: settings.fee_config,
      fee_discounts: settings.fee_discounts,
      shares: ShareLedger::default(),
      hold_prices: HoldPriceBook::default(),
      state: SapState::Uninitialized,
      ledger,
      oracle,
      router,
      staking,
    })
  }

  pub fn from_config(
    config: &SapConfig,
    ledger: L,
    oracle: O,
    router: R,
    staking: S,
  ) -> Result<Self> {
    Self::new(config.settings()?, ledger, oracle, router, staking)
  }

  fn only_owner(&self, caller: &Pubkey, action: &str) -> Result<()> {
    if *caller == self.owner {
      Ok(())
    } else {
      tracing::warn!(%caller, action, "rejected non-owner call");
      Err(Unauthorized.into())
    }
  }

  fn require_initialized(&self) -> Result<()> {
    match self.state {
      SapState::Initialized => Ok(()),
      SapState::Uninitialized => Err(NotInitialized.into()),
    }
  }

  fn require_balance(
    &self,
    mint: &Pubkey,
    owner: &Pubkey,
    amount: u128,
  ) -> Result<()> {
    if self.ledger.balance_of(mint, owner)? >= amount {
      Ok(())
    } else {
      Err(InsufficientBalance.into())
    }
  }

  fn check_slippage<T: PartialOrd + Debug>(
    caller: &Pubkey,
    amount_out: T,
    min_out: T,
  ) -> Result<()> {
    check_min_out(&amount_out, &min_out).map_err(|err| {
      tracing::warn!(%caller, ?amount_out, ?min_out, "slippage exceeded");
      err
    })
  }

  /// Basket balances and prices, each resolved once.
  ///
  /// # Errors
  /// * Ledger or price source failure
  pub fn snapshot(&self) -> Result<BasketSnapshot<'_>> {
    let snapshot = BasketSnapshot::load(
      &self.basket,
      |mint| self.ledger.balance_of(mint, &self.address),
      &self.oracle,
      &self.router,
      self.shares.total_supply(),
      &self.fee_config,
      &self.fee_discounts,
    )?;
    for (asset, resolved) in self.basket.iter().zip(&snapshot.assets) {
      tracing::debug!(
        token = %asset.token,
        balance = resolved.balance,
        price = ?resolved.price,
        "resolved basket asset"
      );
    }
    Ok(snapshot)
  }

  /// Seeds the basket with one amount per asset and mints `share_amount`
  /// to the caller, whose hold price becomes the implied share price.
  ///
  /// # Errors
  /// * Already initialized
  /// * Amount count differs from the asset count, or zero shares
  /// * Caller lacks any of the amounts
  pub fn init(
    &mut self,
    caller: &Pubkey,
    asset_amounts: &[u128],
    share_amount: UFix64<N9>,
  ) -> Result<()> {
    if self.state == SapState::Initialized {
      return Err(AlreadyInitialized.into());
    }
    if asset_amounts.len() != self.basket.len() {
      return Err(InitAmountsLength.into());
    }
    if share_amount == UFix64::zero() {
      return Err(ZeroAmount.into());
    }
    for (asset, amount) in self.basket.iter().zip(asset_amounts) {
      self.require_balance(&asset.token, caller, *amount)?;
    }
    let share_price = {
      let mut snapshot = self.snapshot()?;
      for (resolved, amount) in snapshot.assets.iter_mut().zip(asset_amounts) {
        resolved.balance = resolved
          .balance
          .checked_add(*amount)
          .ok_or(BasketValue)?;
      }
      snapshot.share_supply = share_amount;
      snapshot.get_price()?
    };
    for (asset, amount) in self.basket.iter().zip(asset_amounts) {
      self
        .ledger
        .transfer(&asset.token, caller, &self.address, *amount)?;
    }
    self.shares.mint(*caller, share_amount)?;
    self.hold_prices.set(*caller, share_price);
    self.state = SapState::Initialized;
    tracing::info!(
      %caller,
      ?asset_amounts,
      shares = ?share_amount,
      price = ?share_price,
      "sap initialized"
    );
    Ok(())
  }

  /// Deposits `pay_amount` of `pay_token` for newly minted shares.
  ///
  /// # Errors
  /// * Not initialized, zero amounts or unknown token
  /// * Fewer shares than `min_share_out`
  /// * Caller lacks the payment
  pub fn buy(
    &mut self,
    caller: &Pubkey,
    pay_amount: u128,
    pay_token: &Pubkey,
    min_share_out: UFix64<N9>,
  ) -> Result<UFix64<N9>> {
    self.require_initialized()?;
    if pay_amount == 0 {
      return Err(ZeroAmount.into());
    }
    let index = self.basket.index_of(pay_token)?;
    let (share_price, share_amount) = {
      let snapshot = self.snapshot()?;
      (
        snapshot.get_price()?,
        snapshot.get_buy_amount(pay_amount, index)?,
      )
    };
    Self::check_slippage(caller, share_amount, min_share_out)?;
    if share_amount == UFix64::zero() {
      return Err(ZeroAmount.into());
    }
    self.require_balance(pay_token, caller, pay_amount)?;
    let hold_price = self.hold_prices.next_hold_price(
      caller,
      self.shares.balance_of(caller),
      share_price,
      share_amount,
    )?;
    self
      .ledger
      .transfer(pay_token, caller, &self.address, pay_amount)?;
    self.shares.mint(*caller, share_amount)?;
    self.hold_prices.set(*caller, hold_price);
    tracing::info!(
      %caller,
      token = %pay_token,
      pay_amount,
      shares = ?share_amount,
      price = ?share_price,
      hold_price = ?hold_price,
      "bought shares"
    );
    Ok(share_amount)
  }

  /// Redeems `share_amount` for `receive_token`, net of the performance fee.
  /// The fee stays in the basket.
  ///
  /// # Errors
  /// * Not initialized, zero amounts or unknown token
  /// * Caller holds fewer shares
  /// * Net payout below `min_receive_out`
  /// * Basket lacks the payout
  pub fn sell(
    &mut self,
    caller: &Pubkey,
    share_amount: UFix64<N9>,
    receive_token: &Pubkey,
    min_receive_out: u128,
  ) -> Result<u128> {
    self.require_initialized()?;
    if share_amount == UFix64::zero() {
      return Err(ZeroAmount.into());
    }
    let index = self.basket.index_of(receive_token)?;
    if self.shares.balance_of(caller) < share_amount {
      return Err(InsufficientShares.into());
    }
    let hold_price = self.hold_prices.hold_price(caller);
    let staked = self.staking.staked_balance_of(caller)?;
    let (share_price, fee, receive_amount) = {
      let snapshot = self.snapshot()?;
      let redemption =
        snapshot.redemption(share_amount, index, hold_price, staked)?;
      let receive_amount = from_canonical_floor(
        redemption.amount_remaining,
        snapshot.asset_decimals(index)?,
      )?;
      (snapshot.get_price()?, redemption.fees_extracted, receive_amount)
    };
    Self::check_slippage(caller, receive_amount, min_receive_out)?;
    self.require_balance(receive_token, &self.address, receive_amount)?;
    let remaining = self.shares.burn(caller, share_amount)?;
    self
      .ledger
      .transfer(receive_token, &self.address, caller, receive_amount)?;
    if remaining == UFix64::zero() {
      self.hold_prices.reset(caller);
    }
    tracing::info!(
      %caller,
      token = %receive_token,
      shares = ?share_amount,
      receive_amount,
      fee = ?fee,
      staked,
      price = ?share_price,
      hold_price = ?hold_price,
      "sold shares"
    );
    Ok(receive_amount)
  }

  /// Rebalances basket holdings through the router, basket to basket.
  ///
  /// # Errors
  /// * Caller is not the owner
  /// * Path shorter than two tokens or leaving the basket
  /// * Basket lacks `amount` of the first token
  pub fn swap(
    &mut self,
    caller: &Pubkey,
    amount: u128,
    path: &[Pubkey],
  ) -> Result<Vec<u128>> {
    self.only_owner(caller, "swap")?;
    let token_in = match path {
      [first, _, ..] if path.iter().all(|t| self.basket.contains(t)) => *first,
      _ => return Err(InvalidSwapPath.into()),
    };
    if amount == 0 {
      return Err(ZeroAmount.into());
    }
    self.require_balance(&token_in, &self.address, amount)?;
    let amounts = self.router.swap_exact_tokens_for_tokens(
      &mut self.ledger,
      amount,
      0,
      path,
      &self.address,
      &self.address,
    )?;
    tracing::info!(%caller, ?path, ?amounts, "swapped basket assets");
    Ok(amounts)
  }

  /// # Errors
  /// * Caller is not the owner or rate above 100%
  pub fn set_fee_rate(
    &mut self,
    caller: &Pubkey,
    fee_rate: UFix64<N6>,
  ) -> Result<()> {
    self.only_owner(caller, "set_fee_rate")?;
    self.fee_config.update(fee_rate)?;
    tracing::info!(%caller, fee_rate = ?fee_rate, "fee rate updated");
    Ok(())
  }

  /// Replaces the discount tiers.
  ///
  /// # Errors
  /// * Caller is not the owner or tiers fail validation
  pub fn set_fee_discounts(
    &mut self,
    caller: &Pubkey,
    thresholds: &[u128],
    rates: &[UFix64<N6>],
  ) -> Result<()> {
    self.only_owner(caller, "set_fee_discounts")?;
    self.fee_discounts.set_tiers(thresholds, rates)?;
    tracing::info!(%caller, ?thresholds, ?rates, "fee discounts updated");
    Ok(())
  }

  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  #[must_use]
  pub fn symbol(&self) -> &str {
    &self.symbol
  }

  #[must_use]
  pub fn decimals(&self) -> u8 {
    SHARE_DECIMALS
  }

  #[must_use]
  pub fn owner(&self) -> Pubkey {
    self.owner
  }

  /// Account holding the basket's assets.
  #[must_use]
  pub fn address(&self) -> Pubkey {
    self.address
  }

  #[must_use]
  pub fn state(&self) -> SapState {
    self.state
  }

  #[must_use]
  pub fn is_initialized(&self) -> bool {
    self.state == SapState::Initialized
  }

  #[must_use]
  pub fn asset_count(&self) -> usize {
    self.basket.len()
  }

  pub fn fee_rate(&self) -> Result<UFix64<N6>> {
    self.fee_config.fee_rate()
  }

  pub fn fee_discount(&self, staked: u128) -> Result<UFix64<N6>> {
    self.fee_discounts.discount(staked)
  }

  #[must_use]
  pub fn total_supply(&self) -> UFix64<N9> {
    self.shares.total_supply()
  }

  #[must_use]
  pub fn balance_of(&self, holder: &Pubkey) -> UFix64<N9> {
    self.shares.balance_of(holder)
  }

  #[must_use]
  pub fn get_hold_price(&self, holder: &Pubkey) -> UFix64<N9> {
    self.hold_prices.hold_price(holder)
  }

  pub fn get_price(&self) -> Result<UFix64<N9>> {
    self.snapshot()?.get_price()
  }

  pub fn get_asset_price(&self, index: usize) -> Result<UFix64<N9>> {
    self.basket.unit_price(index, &self.oracle, &self.router)
  }

  pub fn get_asset_token(&self, index: usize) -> Result<Pubkey> {
    self.basket.token(index)
  }

  pub fn get_asset_pyth_price_id(&self, index: usize) -> Result<FeedId> {
    self.basket.pyth_price_id(index)
  }

  pub fn get_buy_amount(
    &self,
    pay_amount: u128,
    pay_token: &Pubkey,
  ) -> Result<UFix64<N9>> {
    let index = self.basket.index_of(pay_token)?;
    self.snapshot()?.get_buy_amount(pay_amount, index)
  }

  pub fn get_pay_amount(
    &self,
    share_amount: UFix64<N9>,
    pay_token: &Pubkey,
  ) -> Result<u128> {
    let index = self.basket.index_of(pay_token)?;
    self.snapshot()?.get_pay_amount(share_amount, index)
  }

  pub fn get_receive_amount(
    &self,
    share_amount: UFix64<N9>,
    receive_token: &Pubkey,
    hold_price: UFix64<N9>,
    staked: u128,
  ) -> Result<u128> {
    let index = self.basket.index_of(receive_token)?;
    self
      .snapshot()?
      .get_receive_amount(share_amount, index, hold_price, staked)
  }

  pub fn get_sell_amount(
    &self,
    receive_amount: u128,
    receive_token: &Pubkey,
    hold_price: UFix64<N9>,
    staked: u128,
  ) -> Result<UFix64<N9>> {
    let index = self.basket.index_of(receive_token)?;
    self
      .snapshot()?
      .get_sell_amount(receive_amount, index, hold_price, staked)
  }

  /// Flat fee on `amount` raw units of `token` for a holder with `staked`
  /// staking tokens. The fee is in the same raw units of `token`.
  pub fn get_fee(
    &self,
    amount: u128,
    token: &Pubkey,
    staked: u128,
  ) -> Result<u128> {
    let index = self.basket.index_of(token)?;
    self.snapshot()?.get_fee(amount, index, staked)
  }
}
