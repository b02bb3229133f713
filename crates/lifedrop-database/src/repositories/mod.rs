//! Concrete store implementations over PostgreSQL.

pub mod account;
pub mod otp;

pub use account::PgAccountStore;
pub use otp::PgOtpStore;
