//! In-memory policy adapter for tests and seed tooling.

use async_trait::async_trait;
use tokio::sync::Mutex;

use lifedrop_core::error::AppError;
use lifedrop_core::result::AppResult;

use super::adapter::PolicyAdapter;
use super::rule::{PolicyRule, RuleFilter};

/// A `PolicyAdapter` backed by a plain in-memory vector.
///
/// Keeps insertion order, enforces rule uniqueness, and is trivially
/// transactional since every operation happens under one lock.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    rules: Mutex<Vec<PolicyRule>>,
}

impl MemoryAdapter {
    /// Creates an empty adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter preloaded with rules.
    pub fn with_rules(rules: Vec<PolicyRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
        }
    }
}

#[async_trait]
impl PolicyAdapter for MemoryAdapter {
    async fn load_all(&self) -> AppResult<Vec<PolicyRule>> {
        Ok(self.rules.lock().await.clone())
    }

    async fn load_filtered(&self, filter: &RuleFilter) -> AppResult<Vec<PolicyRule>> {
        Ok(self
            .rules
            .lock()
            .await
            .iter()
            .filter(|rule| filter.matches(rule))
            .cloned()
            .collect())
    }

    async fn save_all(&self, rules: &[PolicyRule]) -> AppResult<()> {
        *self.rules.lock().await = rules.to_vec();
        Ok(())
    }

    async fn insert(&self, rule: &PolicyRule) -> AppResult<()> {
        let mut rules = self.rules.lock().await;
        if rules.contains(rule) {
            return Err(AppError::conflict("duplicate policy rule"));
        }
        rules.push(rule.clone());
        Ok(())
    }

    async fn delete_matching(&self, filter: &RuleFilter) -> AppResult<u64> {
        let mut rules = self.rules.lock().await;
        let before = rules.len();
        rules.retain(|rule| !filter.matches(rule));
        Ok((before - rules.len()) as u64)
    }

    async fn update_matching(&self, filter: &RuleFilter, new: &PolicyRule) -> AppResult<u64> {
        let mut rules = self.rules.lock().await;
        let mut updated = 0u64;
        for rule in rules.iter_mut() {
            if filter.matches(rule) {
                *rule = new.clone();
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::rule::RuleType;

    #[tokio::test]
    async fn test_insert_and_load() {
        let adapter = MemoryAdapter::new();
        let rule = PolicyRule::policy("donor", "*", "/account/v1/self", "GET");
        adapter.insert(&rule).await.unwrap();
        assert_eq!(adapter.load_all().await.unwrap(), vec![rule]);
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let adapter = MemoryAdapter::new();
        let rule = PolicyRule::grouping("u1", "donor", "region:east");
        adapter.insert(&rule).await.unwrap();
        assert!(adapter.insert(&rule).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_matching_counts() {
        let adapter = MemoryAdapter::with_rules(vec![
            PolicyRule::grouping("u1", "donor", "region:east"),
            PolicyRule::grouping("u2", "donor", "region:west"),
            PolicyRule::policy("donor", "*", "/account/v1/self", "GET"),
        ]);

        let removed = adapter
            .delete_matching(&RuleFilter::of_type(RuleType::Grouping))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(adapter.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_matching() {
        let adapter = MemoryAdapter::with_rules(vec![PolicyRule::grouping(
            "u1",
            "donor",
            "region:east",
        )]);

        let filter = RuleFilter::any().with_v0("u1");
        let new = PolicyRule::grouping("u1", "coordinator", "region:east");
        assert_eq!(adapter.update_matching(&filter, &new).await.unwrap(), 1);
        assert_eq!(adapter.load_all().await.unwrap(), vec![new]);
    }
}
