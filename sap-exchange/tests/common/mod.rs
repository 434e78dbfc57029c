#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anchor_lang::prelude::*;
use fix::prelude::*;
use pyth_solana_receiver_sdk::price_update::{get_feed_id_from_hex, FeedId};
use sap_core::decimals::to_token_amount;
use sap_core::error::CoreError::{
  OracleFeedNotFound, SlippageExceeded, SpotPriceQuote, UnknownAsset,
};
use sap_exchange::config::{AssetEntry, FeeDiscountEntry, SapConfig};
use sap_exchange::error::ExchangeError::InsufficientBalance;
use sap_exchange::interfaces::{
  OraclePrice, PriceOracle, SpotPriceQuoter, StakingBalance, SwapRouter,
  TokenLedger,
};
use sap_exchange::Sap;

pub type TestSap = Sap<MockLedger, MockOracle, MockRouter, MockStaking>;

#[derive(Default)]
struct LedgerState {
  decimals: HashMap<Pubkey, u8>,
  balances: HashMap<(Pubkey, Pubkey), u128>,
}

/// In-memory SPL-like token balances shared between test and exchange.
#[derive(Clone, Default)]
pub struct MockLedger(Rc<RefCell<LedgerState>>);

impl MockLedger {
  pub fn create_mint(&self, decimals: u8) -> Pubkey {
    let mint = Pubkey::new_unique();
    self.0.borrow_mut().decimals.insert(mint, decimals);
    mint
  }

  pub fn mint_to(&self, mint: &Pubkey, owner: &Pubkey, amount: u128) {
    *self
      .0
      .borrow_mut()
      .balances
      .entry((*mint, *owner))
      .or_default() += amount;
  }

  pub fn balance(&self, mint: &Pubkey, owner: &Pubkey) -> u128 {
    self
      .0
      .borrow()
      .balances
      .get(&(*mint, *owner))
      .copied()
      .unwrap_or(0)
  }
}

impl TokenLedger for MockLedger {
  fn decimals(&self, mint: &Pubkey) -> Result<u8> {
    self
      .0
      .borrow()
      .decimals
      .get(mint)
      .copied()
      .ok_or(UnknownAsset.into())
  }

  fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> Result<u128> {
    Ok(self.balance(mint, owner))
  }

  fn transfer(
    &mut self,
    mint: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    amount: u128,
  ) -> Result<()> {
    let left = self
      .balance(mint, from)
      .checked_sub(amount)
      .ok_or(InsufficientBalance)?;
    let mut state = self.0.borrow_mut();
    state.balances.insert((*mint, *from), left);
    *state.balances.entry((*mint, *to)).or_default() += amount;
    Ok(())
  }
}

/// Push oracle whose prices tests can move.
#[derive(Clone, Default)]
pub struct MockOracle(Rc<RefCell<HashMap<FeedId, OraclePrice>>>);

impl MockOracle {
  pub fn put_price(&self, feed_id: FeedId, price: i64, exponent: i32) {
    self
      .0
      .borrow_mut()
      .insert(feed_id, OraclePrice::new(price, exponent));
  }
}

impl PriceOracle for MockOracle {
  fn get_price(&self, feed_id: &FeedId) -> Result<OraclePrice> {
    self
      .0
      .borrow()
      .get(feed_id)
      .copied()
      .ok_or(OracleFeedNotFound.into())
  }
}

type Reserves = HashMap<(Pubkey, Pubkey), (u128, u128)>;

/// Constant product router with the UniswapV2 0.3% pool fee. Every pool's
/// tokens sit in one `pool` account on the ledger.
#[derive(Clone)]
pub struct MockRouter {
  pub pool: Pubkey,
  reserves: Rc<RefCell<Reserves>>,
}

fn pair_key(a: &Pubkey, b: &Pubkey) -> ((Pubkey, Pubkey), bool) {
  if a < b {
    ((*a, *b), false)
  } else {
    ((*b, *a), true)
  }
}

/// UniswapV2 `getAmountOut`.
pub fn amount_out(
  amount_in: u128,
  reserve_in: u128,
  reserve_out: u128,
) -> u128 {
  let in_with_fee = amount_in * 997;
  in_with_fee * reserve_out / (reserve_in * 1000 + in_with_fee)
}

impl MockRouter {
  pub fn new() -> MockRouter {
    MockRouter {
      pool: Pubkey::new_unique(),
      reserves: Rc::default(),
    }
  }

  pub fn add_liquidity(
    &self,
    ledger: &MockLedger,
    (token_a, amount_a): (Pubkey, u128),
    (token_b, amount_b): (Pubkey, u128),
  ) {
    ledger.mint_to(&token_a, &self.pool, amount_a);
    ledger.mint_to(&token_b, &self.pool, amount_b);
    let (key, flipped) = pair_key(&token_a, &token_b);
    let mut reserves = self.reserves.borrow_mut();
    let entry = reserves.entry(key).or_default();
    if flipped {
      entry.0 += amount_b;
      entry.1 += amount_a;
    } else {
      entry.0 += amount_a;
      entry.1 += amount_b;
    }
  }

  pub fn reserves(
    &self,
    token_in: &Pubkey,
    token_out: &Pubkey,
  ) -> Result<(u128, u128)> {
    let (key, flipped) = pair_key(token_in, token_out);
    let (r0, r1) = self
      .reserves
      .borrow()
      .get(&key)
      .copied()
      .ok_or(SpotPriceQuote)?;
    Ok(if flipped { (r1, r0) } else { (r0, r1) })
  }

  fn set_reserves(
    &self,
    token_in: &Pubkey,
    token_out: &Pubkey,
    reserve_in: u128,
    reserve_out: u128,
  ) {
    let (key, flipped) = pair_key(token_in, token_out);
    let value = if flipped {
      (reserve_out, reserve_in)
    } else {
      (reserve_in, reserve_out)
    };
    self.reserves.borrow_mut().insert(key, value);
  }
}

impl SpotPriceQuoter for MockRouter {
  fn get_amounts_out(
    &self,
    amount_in: u128,
    path: &[Pubkey],
  ) -> Result<Vec<u128>> {
    let mut amounts = vec![amount_in];
    for hop in path.windows(2) {
      let (reserve_in, reserve_out) = self.reserves(&hop[0], &hop[1])?;
      let last = amounts[amounts.len() - 1];
      amounts.push(amount_out(last, reserve_in, reserve_out));
    }
    Ok(amounts)
  }
}

impl SwapRouter for MockRouter {
  fn swap_exact_tokens_for_tokens<L: TokenLedger>(
    &mut self,
    ledger: &mut L,
    amount_in: u128,
    amount_out_min: u128,
    path: &[Pubkey],
    sender: &Pubkey,
    to: &Pubkey,
  ) -> Result<Vec<u128>> {
    let amounts = self.get_amounts_out(amount_in, path)?;
    let out = amounts[amounts.len() - 1];
    if out < amount_out_min {
      return Err(SlippageExceeded.into());
    }
    ledger.transfer(&path[0], sender, &self.pool, amount_in)?;
    for (hop, pair) in path.windows(2).enumerate() {
      let (reserve_in, reserve_out) = self.reserves(&pair[0], &pair[1])?;
      self.set_reserves(
        &pair[0],
        &pair[1],
        reserve_in + amounts[hop],
        reserve_out - amounts[hop + 1],
      );
    }
    ledger.transfer(&path[path.len() - 1], &self.pool, to, out)?;
    Ok(amounts)
  }
}

#[derive(Clone, Default)]
pub struct MockStaking(Rc<RefCell<HashMap<Pubkey, u128>>>);

impl MockStaking {
  pub fn stake(&self, holder: &Pubkey, amount: u128) {
    *self.0.borrow_mut().entry(*holder).or_default() += amount;
  }
}

impl StakingBalance for MockStaking {
  fn staked_balance_of(&self, holder: &Pubkey) -> Result<u128> {
    Ok(self.0.borrow().get(holder).copied().unwrap_or(0))
  }
}

pub const USDC_FEED: &str =
  "0xeaa020c61cc479712813461ce153894a96a6c00b21ed0cfc2798d1f9a9e9c94a";
pub const BTC_FEED: &str =
  "0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43";
pub const WETH_FEED: &str =
  "0xff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace";
pub const BNB_FEED: &str =
  "0x2f95862b045670cd22bee3114c39763a4a08beeb663b145d283c31d7d1101c4f";
pub const SOL_FEED: &str =
  "0xef0d8b6fda2ceba41da15d4095d1da392a0d2f8ed0c6c7bc0f4cfac8c280b56d";

/// Oracle mantissas at exponent -6.
pub const USDC_PRICE: i64 = 999_900;
pub const BTC_PRICE: i64 = 41_671_750_000;
pub const WETH_PRICE: i64 = 2_474_970_000;
pub const BNB_PRICE: i64 = 317_950_000;
pub const SOL_PRICE: i64 = 91_550_000;

pub const USDC_DECIMALS: u8 = 6;
pub const BTC_DECIMALS: u8 = 8;
/// WETH, BNB and JOEY, as on EVM chains.
pub const WEI_DECIMALS: u8 = 18;
pub const JOEY_DECIMALS: u8 = WEI_DECIMALS;

pub fn tokens(value: &str, decimals: u8) -> u128 {
  to_token_amount(value, decimals).expect("token amount")
}

pub fn shares(value: &str) -> UFix64<N9> {
  let bits = u64::try_from(tokens(value, 9)).expect("share bits");
  UFix64::new(bits)
}

pub fn feed(hex: &str) -> FeedId {
  get_feed_id_from_hex(hex).expect("feed id")
}

/// `value * numerator / denominator` on raw bits, floored.
pub fn mul_div(value: u64, numerator: u64, denominator: u64) -> u64 {
  let out =
    u128::from(value) * u128::from(numerator) / u128::from(denominator);
  u64::try_from(out).expect("fits u64")
}

pub struct Fixture {
  pub owner: Pubkey,
  pub other: Pubkey,
  pub usdc: Pubkey,
  pub btc: Pubkey,
  pub weth: Pubkey,
  pub bnb: Pubkey,
  pub sol: Pubkey,
  pub joey: Pubkey,
  pub ledger: MockLedger,
  pub oracle: MockOracle,
  pub router: MockRouter,
  pub staking: MockStaking,
  pub sap: TestSap,
}

impl Fixture {
  pub fn mints(&self) -> [Pubkey; 6] {
    [self.usdc, self.btc, self.weth, self.bnb, self.sol, self.joey]
  }

  /// Raw amounts seeded by `init`.
  pub fn init_amounts(&self) -> Result<[u128; 6]> {
    let amounts = ["100", "1", "2", "3", "4", "100"];
    let mut out = [0; 6];
    let slots = out.iter_mut().zip(self.mints()).zip(amounts);
    for ((slot, mint), amount) in slots {
      *slot = tokens(amount, self.ledger.decimals(&mint)?);
    }
    Ok(out)
  }

  pub fn basket_balance(&self, mint: &Pubkey) -> u128 {
    self.ledger.balance(mint, &self.sap.address())
  }

  pub fn move_btc_price(&self, percent: i64) {
    let price = BTC_PRICE * (100 + percent) / 100;
    self.oracle.put_price(feed(BTC_FEED), price, -6);
  }
}

fn asset_entry(token: &Pubkey, feed: Option<&str>) -> AssetEntry {
  AssetEntry {
    token: token.to_string(),
    pyth_price_id: feed.map(str::to_string),
  }
}

pub fn sap_config(
  owner: &Pubkey,
  address: &Pubkey,
  mints: &[Pubkey; 6],
) -> SapConfig {
  let feeds = [
    Some(USDC_FEED),
    Some(BTC_FEED),
    Some(WETH_FEED),
    Some(BNB_FEED),
    Some(SOL_FEED),
    None,
  ];
  SapConfig {
    name: "Sap".to_string(),
    symbol: "SAP".to_string(),
    owner: owner.to_string(),
    address: address.to_string(),
    fee_rate: "0.06".to_string(),
    assets: mints
      .iter()
      .zip(feeds)
      .map(|(mint, feed)| asset_entry(mint, feed))
      .collect(),
    staking_decimals: JOEY_DECIMALS,
    fee_discounts: vec![
      FeeDiscountEntry {
        threshold: "2000".to_string(),
        rate: "0.2".to_string(),
      },
      FeeDiscountEntry {
        threshold: "1000".to_string(),
        rate: "0.1".to_string(),
      },
    ],
  }
}

/// Five oracle priced assets plus JOEY, priced from a 1 USDC : 100 JOEY pool.
pub fn deploy() -> Result<Fixture> {
  let owner = Pubkey::new_unique();
  let other = Pubkey::new_unique();
  let address = Pubkey::new_unique();
  let ledger = MockLedger::default();
  let usdc = ledger.create_mint(USDC_DECIMALS);
  let btc = ledger.create_mint(BTC_DECIMALS);
  let weth = ledger.create_mint(WEI_DECIMALS);
  let bnb = ledger.create_mint(WEI_DECIMALS);
  let sol = ledger.create_mint(9);
  let joey = ledger.create_mint(JOEY_DECIMALS);
  let mints = [usdc, btc, weth, bnb, sol, joey];
  for mint in &mints {
    let decimals = ledger.decimals(mint)?;
    ledger.mint_to(mint, &owner, tokens("1000", decimals));
    ledger.mint_to(mint, &other, tokens("1000", decimals));
  }
  ledger.mint_to(&joey, &owner, tokens("99000", JOEY_DECIMALS));

  let oracle = MockOracle::default();
  oracle.put_price(feed(USDC_FEED), USDC_PRICE, -6);
  oracle.put_price(feed(BTC_FEED), BTC_PRICE, -6);
  oracle.put_price(feed(WETH_FEED), WETH_PRICE, -6);
  oracle.put_price(feed(BNB_FEED), BNB_PRICE, -6);
  oracle.put_price(feed(SOL_FEED), SOL_PRICE, -6);

  let router = MockRouter::new();
  router.add_liquidity(
    &ledger,
    (usdc, tokens("1", USDC_DECIMALS)),
    (joey, tokens("100", JOEY_DECIMALS)),
  );
  let staking = MockStaking::default();

  let config = sap_config(&owner, &address, &mints);
  let sap = Sap::from_config(
    &config,
    ledger.clone(),
    oracle.clone(),
    router.clone(),
    staking.clone(),
  )?;
  Ok(Fixture {
    owner,
    other,
    usdc,
    btc,
    weth,
    bnb,
    sol,
    joey,
    ledger,
    oracle,
    router,
    staking,
    sap,
  })
}

/// Deployed and seeded with 100 USDC, 1 BTC, 2 WETH, 3 BNB, 4 SOL and
/// 100 JOEY for 100 shares.
pub fn init() -> Result<Fixture> {
  let mut fixture = deploy()?;
  let amounts = fixture.init_amounts()?;
  let owner = fixture.owner;
  fixture.sap.init(&owner, &amounts, shares("100"))?;
  Ok(fixture)
}
