//! In-memory authorization decision engine.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use lifedrop_core::error::AppError;
use lifedrop_core::pattern;
use lifedrop_core::result::AppResult;

use super::adapter::PolicyAdapter;
use super::rule::{PolicyRule, RuleFilter, RuleType};

#[derive(Debug, Default)]
struct RuleSet {
    policies: Vec<PolicyRule>,
    groupings: Vec<PolicyRule>,
}

impl RuleSet {
    fn from_rules(rules: Vec<PolicyRule>) -> Self {
        let mut set = Self::default();
        for rule in rules {
            match rule.rule_type {
                RuleType::Policy => set.policies.push(rule),
                RuleType::Grouping => set.groupings.push(rule),
            }
        }
        set
    }

    fn all(&self) -> Vec<PolicyRule> {
        let mut rules = Vec::with_capacity(self.policies.len() + self.groupings.len());
        rules.extend_from_slice(&self.policies);
        rules.extend_from_slice(&self.groupings);
        rules
    }
}

/// Authorization decision engine over role/permission/domain tuples.
///
/// Owns the in-memory rule set exclusively; the persistence adapter is a
/// one-way sync target. Enforcement reads run under a shared lock and
/// always observe a fully-applied rule set; mutations serialize on the
/// write lock and commit to the adapter before touching memory, so an
/// adapter failure can never leave memory ahead of the durable record.
pub struct PolicyEngine {
    adapter: Arc<dyn PolicyAdapter>,
    rules: RwLock<RuleSet>,
}

impl std::fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEngine").finish()
    }
}

impl PolicyEngine {
    /// Creates an engine and loads the full rule set from the adapter.
    pub async fn new(adapter: Arc<dyn PolicyAdapter>) -> AppResult<Self> {
        let engine = Self {
            adapter,
            rules: RwLock::new(RuleSet::default()),
        };
        engine.load_policy().await?;
        Ok(engine)
    }

    /// Replaces the in-memory rule set from the adapter.
    pub async fn load_policy(&self) -> AppResult<()> {
        let rules = self.adapter.load_all().await?;
        let count = rules.len();
        *self.rules.write().await = RuleSet::from_rules(rules);
        info!(rules = count, "policy rules loaded");
        Ok(())
    }

    /// Streams the full in-memory rule set back to the adapter.
    ///
    /// Adapters are responsible for chunking large sets into bounded
    /// transactions.
    pub async fn save_policy(&self) -> AppResult<()> {
        let rules = self.rules.read().await.all();
        self.adapter.save_all(&rules).await
    }

    /// Decides whether `subject` may perform `action` on `resource`
    /// within `domain`.
    ///
    /// Permitted iff a permission rule is reachable from the subject's
    /// roles (transitively over role parent edges) whose domain is `*`
    /// or pattern-matches the request domain, whose resource
    /// pattern-matches the request path, and whose action equals the
    /// request method exactly.
    pub async fn enforce(
        &self,
        subject: &str,
        domain: &str,
        resource: &str,
        action: &str,
    ) -> bool {
        let rules = self.rules.read().await;
        let reachable = reachable_roles(&rules.groupings, subject, domain);

        rules.policies.iter().any(|p| {
            reachable.contains(p.v0.as_str())
                && domain_applies(&p.v1, domain)
                && pattern::matches(resource, &p.v2)
                && p.v3 == action
        })
    }

    /// Resolves the subject's enforcement domain: the domain of the
    /// first grouping rule (in rule order) naming the subject.
    ///
    /// Returns `None` when the subject has no grouping rule; callers
    /// must treat that as forbidden, never as implicit full access.
    pub async fn domain_for_subject(&self, subject: &str) -> Option<String> {
        self.rules
            .read()
            .await
            .groupings
            .iter()
            .find(|g| g.v0 == subject)
            .map(|g| g.v2.clone())
    }

    /// Whether the subject holds the role in the domain (exact match, no
    /// hierarchy traversal).
    pub async fn has_role(&self, subject: &str, role: &str, domain: &str) -> bool {
        self.rules
            .read()
            .await
            .groupings
            .iter()
            .any(|g| g.v0 == subject && g.v1 == role && g.v2 == domain)
    }

    /// Adds a permission rule. Returns false when it already exists.
    pub async fn add_policy(
        &self,
        role: &str,
        domain: &str,
        resource: &str,
        action: &str,
    ) -> AppResult<bool> {
        let rule = PolicyRule::policy(role, domain, resource, action);
        let mut rules = self.rules.write().await;
        if rules.policies.contains(&rule) {
            return Ok(false);
        }

        self.adapter.insert(&rule).await?;
        rules.policies.push(rule);
        debug!(role, domain, resource, action, "policy added");
        Ok(true)
    }

    /// Removes a permission rule. Returns false when it was absent.
    pub async fn remove_policy(
        &self,
        role: &str,
        domain: &str,
        resource: &str,
        action: &str,
    ) -> AppResult<bool> {
        let rule = PolicyRule::policy(role, domain, resource, action);
        let mut rules = self.rules.write().await;
        let Some(index) = rules.policies.iter().position(|r| *r == rule) else {
            return Ok(false);
        };

        self.adapter.delete_matching(&RuleFilter::exact(&rule)).await?;
        rules.policies.remove(index);
        debug!(role, domain, resource, action, "policy removed");
        Ok(true)
    }

    /// Assigns a role to a subject within a domain. Returns false when
    /// the assignment already exists.
    ///
    /// Rejects assignments that would make a role its own ancestor.
    pub async fn add_role_for_user(
        &self,
        subject: &str,
        role: &str,
        domain: &str,
    ) -> AppResult<bool> {
        let rule = PolicyRule::grouping(subject, role, domain);
        let mut rules = self.rules.write().await;
        if rules.groupings.contains(&rule) {
            return Ok(false);
        }

        if subject == role || ancestors_of(&rules.groupings, role).contains(subject) {
            return Err(AppError::validation(format!(
                "cyclic role assignment: '{role}' would become its own ancestor"
            )));
        }

        self.adapter.insert(&rule).await?;
        rules.groupings.push(rule);
        debug!(subject, role, domain, "role assigned");
        Ok(true)
    }

    /// Revokes a role assignment. Returns false when it was absent.
    pub async fn remove_role_for_user(
        &self,
        subject: &str,
        role: &str,
        domain: &str,
    ) -> AppResult<bool> {
        let rule = PolicyRule::grouping(subject, role, domain);
        let mut rules = self.rules.write().await;
        let Some(index) = rules.groupings.iter().position(|r| *r == rule) else {
            return Ok(false);
        };

        self.adapter.delete_matching(&RuleFilter::exact(&rule)).await?;
        rules.groupings.remove(index);
        debug!(subject, role, domain, "role revoked");
        Ok(true)
    }

    /// Number of rules currently held in memory.
    pub async fn rule_count(&self) -> usize {
        let rules = self.rules.read().await;
        rules.policies.len() + rules.groupings.len()
    }
}

/// Collects the subject itself plus every role reachable through
/// grouping edges applicable in `domain`.
fn reachable_roles<'a>(
    groupings: &'a [PolicyRule],
    subject: &'a str,
    domain: &str,
) -> HashSet<&'a str> {
    let mut reachable: HashSet<&str> = HashSet::new();
    reachable.insert(subject);
    let mut queue = vec![subject];

    while let Some(current) = queue.pop() {
        for edge in groupings {
            if edge.v0 == current
                && domain_applies(&edge.v2, domain)
                && reachable.insert(edge.v1.as_str())
            {
                queue.push(edge.v1.as_str());
            }
        }
    }

    reachable
}

/// Every role reachable upward from `role` through grouping edges,
/// ignoring domains. Used for structural cycle detection.
fn ancestors_of<'a>(groupings: &'a [PolicyRule], role: &'a str) -> HashSet<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue = vec![role];

    while let Some(current) = queue.pop() {
        for edge in groupings {
            if edge.v0 == current && seen.insert(edge.v1.as_str()) {
                queue.push(edge.v1.as_str());
            }
        }
    }

    seen
}

/// A rule domain applies when it is `*`, equals the request domain, or
/// pattern-matches it.
fn domain_applies(rule_domain: &str, domain: &str) -> bool {
    rule_domain == "*" || rule_domain == domain || pattern::matches(domain, rule_domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::memory::MemoryAdapter;
    use async_trait::async_trait;

    async fn engine() -> PolicyEngine {
        PolicyEngine::new(Arc::new(MemoryAdapter::new())).await.unwrap()
    }

    #[tokio::test]
    async fn test_grant_then_enforce_then_revoke() {
        let engine = engine().await;
        engine
            .add_role_for_user("u1", "donor", "region:east")
            .await
            .unwrap();
        engine
            .add_policy("donor", "*", "/account/v1/self", "GET")
            .await
            .unwrap();

        assert!(engine.enforce("u1", "region:east", "/account/v1/self", "GET").await);
        assert!(!engine.enforce("u1", "region:east", "/admin/v1/users", "GET").await);

        engine
            .remove_policy("donor", "*", "/account/v1/self", "GET")
            .await
            .unwrap();
        assert!(!engine.enforce("u1", "region:east", "/account/v1/self", "GET").await);
    }

    #[tokio::test]
    async fn test_revoking_role_denies() {
        let engine = engine().await;
        engine
            .add_role_for_user("u1", "donor", "region:east")
            .await
            .unwrap();
        engine
            .add_policy("donor", "*", "/account/v1/self", "GET")
            .await
            .unwrap();
        engine
            .remove_role_for_user("u1", "donor", "region:east")
            .await
            .unwrap();

        assert!(!engine.enforce("u1", "region:east", "/account/v1/self", "GET").await);
    }

    #[tokio::test]
    async fn test_subject_without_grouping_is_denied_everything() {
        let engine = engine().await;
        engine
            .add_policy("donor", "*", "/account/v1/self", "GET")
            .await
            .unwrap();

        assert!(!engine.enforce("ghost", "region:east", "/account/v1/self", "GET").await);
        assert_eq!(engine.domain_for_subject("ghost").await, None);
    }

    #[tokio::test]
    async fn test_action_is_matched_exactly() {
        let engine = engine().await;
        engine
            .add_role_for_user("u1", "donor", "region:east")
            .await
            .unwrap();
        engine
            .add_policy("donor", "*", "/account/v1/self", "GET")
            .await
            .unwrap();

        assert!(!engine.enforce("u1", "region:east", "/account/v1/self", "POST").await);
        assert!(!engine.enforce("u1", "region:east", "/account/v1/self", "get").await);
    }

    #[tokio::test]
    async fn test_domain_and_resource_patterns() {
        let engine = engine().await;
        engine
            .add_role_for_user("u1", "coordinator", "region:east")
            .await
            .unwrap();
        engine
            .add_policy("coordinator", "region:*", "/donation/*", "POST")
            .await
            .unwrap();

        assert!(engine.enforce("u1", "region:east", "/donation/v1/schedule", "POST").await);
        assert!(!engine.enforce("u1", "region:east", "/donation", "POST").await);
    }

    #[tokio::test]
    async fn test_role_hierarchy_is_transitive_one_way() {
        let engine = engine().await;
        // u1 holds child; child's parent is coordinator.
        engine
            .add_role_for_user("u1", "donor", "region:east")
            .await
            .unwrap();
        engine
            .add_role_for_user("donor", "coordinator", "region:east")
            .await
            .unwrap();
        engine
            .add_policy("coordinator", "*", "/campaign/v1/list", "GET")
            .await
            .unwrap();
        engine
            .add_policy("donor", "*", "/account/v1/self", "GET")
            .await
            .unwrap();

        // Child inherits the parent's permission.
        assert!(engine.enforce("u1", "region:east", "/campaign/v1/list", "GET").await);

        // The parent does not inherit the child's permission.
        engine
            .add_role_for_user("u2", "coordinator", "region:east")
            .await
            .unwrap();
        assert!(!engine.enforce("u2", "region:east", "/account/v1/self", "GET").await);
    }

    #[tokio::test]
    async fn test_cyclic_assignment_rejected() {
        let engine = engine().await;
        engine
            .add_role_for_user("donor", "coordinator", "region:east")
            .await
            .unwrap();
        engine
            .add_role_for_user("coordinator", "admin", "region:east")
            .await
            .unwrap();

        // admin -> donor would close the loop donor -> coordinator -> admin -> donor.
        let err = engine
            .add_role_for_user("admin", "donor", "region:east")
            .await
            .unwrap_err();
        assert!(err.message.contains("cyclic"));

        // Direct self-assignment is also a cycle.
        assert!(engine.add_role_for_user("donor", "donor", "*").await.is_err());
    }

    #[tokio::test]
    async fn test_first_matching_grouping_wins_domain_resolution() {
        let engine = engine().await;
        engine
            .add_role_for_user("u1", "donor", "region:east")
            .await
            .unwrap();
        engine
            .add_role_for_user("u1", "coordinator", "region:west")
            .await
            .unwrap();

        assert_eq!(
            engine.domain_for_subject("u1").await.as_deref(),
            Some("region:east")
        );
    }

    #[tokio::test]
    async fn test_duplicate_mutations_are_no_ops() {
        let engine = engine().await;
        assert!(engine.add_role_for_user("u1", "donor", "*").await.unwrap());
        assert!(!engine.add_role_for_user("u1", "donor", "*").await.unwrap());
        assert!(!engine.remove_role_for_user("u1", "ghost", "*").await.unwrap());
        assert!(engine.add_policy("donor", "*", "/x", "GET").await.unwrap());
        assert!(!engine.add_policy("donor", "*", "/x", "GET").await.unwrap());
    }

    #[tokio::test]
    async fn test_has_role_is_exact() {
        let engine = engine().await;
        engine
            .add_role_for_user("u1", "donor", "region:east")
            .await
            .unwrap();

        assert!(engine.has_role("u1", "donor", "region:east").await);
        assert!(!engine.has_role("u1", "donor", "region:west").await);
        assert!(!engine.has_role("u1", "coordinator", "region:east").await);
    }

    #[tokio::test]
    async fn test_load_policy_replaces_memory() {
        let adapter = Arc::new(MemoryAdapter::with_rules(vec![
            PolicyRule::grouping("u1", "donor", "region:east"),
            PolicyRule::policy("donor", "*", "/account/v1/self", "GET"),
        ]));
        let engine = PolicyEngine::new(adapter.clone()).await.unwrap();
        assert_eq!(engine.rule_count().await, 2);
        assert!(engine.enforce("u1", "region:east", "/account/v1/self", "GET").await);

        adapter
            .save_all(&[PolicyRule::grouping("u2", "donor", "region:west")])
            .await
            .unwrap();
        engine.load_policy().await.unwrap();
        assert_eq!(engine.rule_count().await, 1);
        assert!(!engine.enforce("u1", "region:east", "/account/v1/self", "GET").await);
    }

    #[tokio::test]
    async fn test_save_policy_round_trip() {
        let adapter = Arc::new(MemoryAdapter::new());
        let engine = PolicyEngine::new(adapter.clone()).await.unwrap();
        engine.add_role_for_user("u1", "donor", "*").await.unwrap();
        engine.add_policy("donor", "*", "/x", "GET").await.unwrap();

        engine.save_policy().await.unwrap();
        let rules = adapter.load_all().await.unwrap();
        assert_eq!(rules.len(), 2);
    }

    /// Adapter that fails every mutation, for rollback tests.
    #[derive(Debug, Default)]
    struct FailingAdapter;

    #[async_trait]
    impl PolicyAdapter for FailingAdapter {
        async fn load_all(&self) -> AppResult<Vec<PolicyRule>> {
            Ok(Vec::new())
        }
        async fn load_filtered(&self, _: &RuleFilter) -> AppResult<Vec<PolicyRule>> {
            Ok(Vec::new())
        }
        async fn save_all(&self, _: &[PolicyRule]) -> AppResult<()> {
            Err(AppError::database("write failed"))
        }
        async fn insert(&self, _: &PolicyRule) -> AppResult<()> {
            Err(AppError::database("write failed"))
        }
        async fn delete_matching(&self, _: &RuleFilter) -> AppResult<u64> {
            Err(AppError::database("write failed"))
        }
        async fn update_matching(&self, _: &RuleFilter, _: &PolicyRule) -> AppResult<u64> {
            Err(AppError::database("write failed"))
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_rolls_back_memory() {
        let engine = PolicyEngine::new(Arc::new(FailingAdapter)).await.unwrap();

        assert!(engine.add_role_for_user("u1", "donor", "*").await.is_err());
        assert!(engine.add_policy("donor", "*", "/x", "GET").await.is_err());
        assert_eq!(engine.rule_count().await, 0);
        assert!(!engine.enforce("u1", "*", "/x", "GET").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_see_consistent_snapshots() {
        let engine = Arc::new(engine().await);
        engine
            .add_role_for_user("u1", "donor", "region:east")
            .await
            .unwrap();
        engine
            .add_policy("donor", "*", "/account/v1/self", "GET")
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let _ = engine
                        .enforce("u1", "region:east", "/account/v1/self", "GET")
                        .await;
                }
            }));
        }

        for _ in 0..20 {
            engine
                .remove_role_for_user("u1", "donor", "region:east")
                .await
                .unwrap();
            engine
                .add_role_for_user("u1", "donor", "region:east")
                .await
                .unwrap();
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert!(engine.enforce("u1", "region:east", "/account/v1/self", "GET").await);
    }
}
