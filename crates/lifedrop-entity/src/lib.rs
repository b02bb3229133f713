//! # lifedrop-entity
//!
//! Domain entity models for the Lifedrop platform: donor accounts,
//! stored credentials, and one-time activation codes.

pub mod account;
pub mod otp;

pub use account::{Account, Credential, Gender};
pub use otp::{Otp, OtpKind};
