//! # lifedrop-service
//!
//! Business flows composing the trust core: account registration,
//! OTP activation, and credential-based authentication. Persistence is
//! consumed through the store traits in [`store`]; concrete
//! implementations live in `lifedrop-database`.

pub mod account;
pub mod store;

pub use account::AccountService;
pub use store::{AccountStore, NewAccount, OtpStore};
