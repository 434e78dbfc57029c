use anchor_lang::prelude::error_code;

#[error_code]
pub enum ExchangeError {
  #[msg("Basket has already been initialized.")]
  AlreadyInitialized = 6000,
  #[msg("Basket has not been initialized.")]
  NotInitialized,
  #[msg("Only the owner may call this instruction.")]
  Unauthorized,
  #[msg("Init needs exactly one amount per basket asset.")]
  InitAmountsLength,
  #[msg("Account balance is too low for the requested transfer.")]
  InsufficientBalance,
  #[msg("Swap path must list at least two basket assets.")]
  InvalidSwapPath,
  #[msg("Amount must be greater than zero.")]
  ZeroAmount,
  #[msg("Configuration is invalid.")]
  InvalidConfig,
}
