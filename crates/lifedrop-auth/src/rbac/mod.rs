//! Role/permission/domain policy engine.
//!
//! The engine owns an in-memory rule set synchronized from a pluggable
//! persistence adapter and is the single source of truth for
//! authorization decisions. Mutations persist through the adapter before
//! they are considered committed; a persistence failure leaves the
//! in-memory set untouched.

pub mod adapter;
pub mod engine;
pub mod memory;
pub mod rule;

pub use adapter::PolicyAdapter;
pub use engine::PolicyEngine;
pub use memory::MemoryAdapter;
pub use rule::{PolicyRule, RuleFilter, RuleType};
