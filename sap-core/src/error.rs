use anchor_lang::prelude::error_code;

#[error_code]
pub enum CoreError {
  // `decimals`
  #[msg("Value is not a valid decimal number.")]
  InvalidDecimal = 7000,
  #[msg("Decimal places or magnitude exceed the supported precision.")]
  DecimalPrecision,
  #[msg("Overflow while rescaling a token amount between decimal precisions.")]
  DecimalRescale,
  #[msg("Token amounts cannot be negative.")]
  NegativeAmount,
  // `oracle`
  #[msg("Oracle exponent is out of range.")]
  OracleExponent,
  #[msg("Oracle yielded a negative price which can't be unsigned.")]
  OracleNegativePrice,
  #[msg("Oracle price is out of range.")]
  OraclePriceRange,
  #[msg("Oracle has no price for the requested feed.")]
  OracleFeedNotFound,
  #[msg("Oracle time is negative.")]
  OracleNegativeTime,
  #[msg("Oracle did not yield a price within the configured age window.")]
  OracleOutdated,
  #[msg("Oracle price update is not fully verified.")]
  OracleVerificationLevel,
  // `amm`
  #[msg("AMM router returned no output amount for the quoted route.")]
  SpotPriceQuote,
  // `asset`
  #[msg("Basket must contain at least one asset.")]
  EmptyBasket,
  #[msg("Basket asset tokens must be unique.")]
  DuplicateAsset,
  #[msg("Asset is not part of the basket.")]
  UnknownAsset,
  #[msg("AMM priced assets need an oracle priced quote asset at index 0.")]
  AmmQuoteAsset,
  // `fee_discount`
  #[msg("Fee discount thresholds and rates differ in length.")]
  FeeDiscountLength,
  #[msg("Fee discount thresholds must be strictly descending.")]
  FeeDiscountOrder,
  #[msg("Fee discount rate must not exceed 100%.")]
  InvalidDiscountRate,
  #[msg("Arithmetic error while applying fee discount.")]
  FeeDiscountArithmetic,
  // `fee_controller`
  #[msg("Fee rate must not exceed 100%.")]
  InvalidFeeRate,
  #[msg("Arithmetic error while extracting fees.")]
  FeeExtraction,
  // `exchange_math`
  #[msg("Overflow while computing basket value.")]
  BasketValue,
  #[msg("Share price is undefined while share supply is zero.")]
  ZeroShareSupply,
  #[msg("Arithmetic error while computing share price.")]
  SharePrice,
  #[msg("Arithmetic error while computing hold price.")]
  HoldPrice,
  // `conversion`
  #[msg("Arithmetic error in conversion from payment to shares.")]
  BuyAmount,
  #[msg("Arithmetic error in conversion from shares to payment.")]
  PayAmount,
  #[msg("Arithmetic error in conversion from shares to redemption.")]
  ReceiveAmount,
  #[msg("Arithmetic error in conversion from redemption to shares.")]
  SellAmount,
  // `share_supply`
  #[msg("Overflow while minting shares.")]
  ShareMint,
  #[msg("Holder does not own enough shares.")]
  InsufficientShares,
  // `slippage`
  #[msg("Token output amount is below the requested minimum.")]
  SlippageExceeded,
}
