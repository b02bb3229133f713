//! Argon2id credential hashing with a server-wide pepper.
//!
//! Hashes are encoded as a single self-describing string so that cost
//! parameters can be raised over time without invalidating existing
//! records; verification always re-derives with the parameters embedded
//! in the stored hash.

pub mod encoding;
pub mod hasher;

pub use encoding::EncodedHash;
pub use hasher::CredentialHasher;
