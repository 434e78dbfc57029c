use anchor_lang::prelude::*;

use crate::error::CoreError::SlippageExceeded;

/// Checks an output amount against the caller's declared minimum.
pub fn check_min_out<T: PartialOrd>(amount_out: T, min_out: T) -> Result<()> {
  if amount_out >= min_out {
    Ok(())
  } else {
    Err(SlippageExceeded.into())
  }
}
