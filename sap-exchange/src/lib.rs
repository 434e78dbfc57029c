#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod interfaces;
mod sap;

pub use crate::sap::{Sap, SapState};
