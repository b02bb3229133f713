//! Persistence adapter seam for the policy engine.

use async_trait::async_trait;

use lifedrop_core::result::AppResult;

use super::rule::{PolicyRule, RuleFilter};

/// Durable storage for policy rules.
///
/// The engine treats every operation as transactional: it either fully
/// applies or leaves the store unchanged. Implementations must uphold
/// the uniqueness of (rule_type, v0..v5); inserting a duplicate is a
/// conflict error, not a silent no-op.
#[async_trait]
pub trait PolicyAdapter: Send + Sync {
    /// Loads every rule in insertion order.
    async fn load_all(&self) -> AppResult<Vec<PolicyRule>>;

    /// Loads the rules matching a filter, in insertion order.
    async fn load_filtered(&self, filter: &RuleFilter) -> AppResult<Vec<PolicyRule>>;

    /// Replaces the entire store with the given rules.
    async fn save_all(&self, rules: &[PolicyRule]) -> AppResult<()>;

    /// Inserts one rule.
    async fn insert(&self, rule: &PolicyRule) -> AppResult<()>;

    /// Deletes all rules matching a filter; returns the count removed.
    async fn delete_matching(&self, filter: &RuleFilter) -> AppResult<u64>;

    /// Rewrites the value slots of all rules matching a filter; returns
    /// the count updated.
    async fn update_matching(&self, filter: &RuleFilter, new: &PolicyRule) -> AppResult<u64>;
}
