//! Fixed-width policy rule records.
//!
//! Every persisted authorization fact is one record: a type discriminant
//! plus up to six positional string slots (unused slots stay empty).
//! Permission rules use (role, domain, resource, action); grouping rules
//! use (subject, role, domain). The tuple (type, v0..v5) is unique.

use serde::{Deserialize, Serialize};

use lifedrop_core::error::AppError;
use lifedrop_core::result::AppResult;

/// Discriminates permission rules from grouping (role assignment) rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// A permission rule: (role, domain, resource, action).
    Policy,
    /// A grouping rule: (subject, role, domain).
    Grouping,
}

impl RuleType {
    /// Single-letter tag used in persisted form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => "p",
            Self::Grouping => "g",
        }
    }

    /// Parses the persisted single-letter tag.
    pub fn parse(tag: &str) -> AppResult<Self> {
        match tag {
            "p" => Ok(Self::Policy),
            "g" => Ok(Self::Grouping),
            other => Err(AppError::validation(format!(
                "unknown policy rule type '{other}'"
            ))),
        }
    }
}

/// One policy rule record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Record type.
    pub rule_type: RuleType,
    pub v0: String,
    pub v1: String,
    pub v2: String,
    pub v3: String,
    pub v4: String,
    pub v5: String,
}

impl PolicyRule {
    /// Builds a permission rule: `role` may perform `action` on
    /// `resource` within `domain`.
    pub fn policy(role: &str, domain: &str, resource: &str, action: &str) -> Self {
        Self {
            rule_type: RuleType::Policy,
            v0: role.to_string(),
            v1: domain.to_string(),
            v2: resource.to_string(),
            v3: action.to_string(),
            v4: String::new(),
            v5: String::new(),
        }
    }

    /// Builds a grouping rule: `subject` holds `role` within `domain`.
    pub fn grouping(subject: &str, role: &str, domain: &str) -> Self {
        Self {
            rule_type: RuleType::Grouping,
            v0: subject.to_string(),
            v1: role.to_string(),
            v2: domain.to_string(),
            v3: String::new(),
            v4: String::new(),
            v5: String::new(),
        }
    }

    /// Positional values in slot order.
    pub fn values(&self) -> [&str; 6] {
        [&self.v0, &self.v1, &self.v2, &self.v3, &self.v4, &self.v5]
    }
}

/// A match predicate over rule records; `None` slots match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    pub rule_type: Option<RuleType>,
    pub v0: Option<String>,
    pub v1: Option<String>,
    pub v2: Option<String>,
    pub v3: Option<String>,
    pub v4: Option<String>,
    pub v5: Option<String>,
}

impl RuleFilter {
    /// A filter matching every rule.
    pub fn any() -> Self {
        Self::default()
    }

    /// A filter matching exactly one rule record.
    pub fn exact(rule: &PolicyRule) -> Self {
        Self {
            rule_type: Some(rule.rule_type),
            v0: Some(rule.v0.clone()),
            v1: Some(rule.v1.clone()),
            v2: Some(rule.v2.clone()),
            v3: Some(rule.v3.clone()),
            v4: Some(rule.v4.clone()),
            v5: Some(rule.v5.clone()),
        }
    }

    /// A filter matching all rules of one type.
    pub fn of_type(rule_type: RuleType) -> Self {
        Self {
            rule_type: Some(rule_type),
            ..Self::default()
        }
    }

    /// Restricts slot 0.
    pub fn with_v0(mut self, value: &str) -> Self {
        self.v0 = Some(value.to_string());
        self
    }

    /// Restricts slot 1.
    pub fn with_v1(mut self, value: &str) -> Self {
        self.v1 = Some(value.to_string());
        self
    }

    /// Restricts slot 2.
    pub fn with_v2(mut self, value: &str) -> Self {
        self.v2 = Some(value.to_string());
        self
    }

    /// Whether the rule satisfies every restricted slot.
    pub fn matches(&self, rule: &PolicyRule) -> bool {
        if let Some(rule_type) = self.rule_type {
            if rule.rule_type != rule_type {
                return false;
            }
        }

        let slots = [&self.v0, &self.v1, &self.v2, &self.v3, &self.v4, &self.v5];
        slots
            .iter()
            .zip(rule.values())
            .all(|(want, have)| want.as_deref().is_none_or(|w| w == have))
    }
}
