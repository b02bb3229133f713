//! Durable PostgreSQL adapter for the policy engine.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use lifedrop_auth::rbac::adapter::PolicyAdapter;
use lifedrop_auth::rbac::rule::{PolicyRule, RuleFilter, RuleType};
use lifedrop_core::error::{AppError, ErrorKind};
use lifedrop_core::result::AppResult;

/// Bulk saves are split into transactions of at most this many rows.
const SAVE_BATCH_SIZE: usize = 5_000;

/// `PolicyAdapter` backed by the `policy_rules` table.
///
/// Insertion order is preserved through the serial primary key; every
/// operation is a single statement or an explicit transaction, so the
/// engine observes each call as all-or-nothing.
#[derive(Debug, Clone)]
pub struct PostgresPolicyAdapter {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct RuleRow {
    rule_type: String,
    v0: String,
    v1: String,
    v2: String,
    v3: String,
    v4: String,
    v5: String,
}

impl TryFrom<RuleRow> for PolicyRule {
    type Error = AppError;

    fn try_from(row: RuleRow) -> AppResult<Self> {
        Ok(PolicyRule {
            rule_type: RuleType::parse(&row.rule_type)?,
            v0: row.v0,
            v1: row.v1,
            v2: row.v2,
            v3: row.v3,
            v4: row.v4,
            v5: row.v5,
        })
    }
}

impl PostgresPolicyAdapter {
    /// Creates an adapter over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PolicyAdapter for PostgresPolicyAdapter {
    async fn load_all(&self) -> AppResult<Vec<PolicyRule>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            "SELECT rule_type, v0, v1, v2, v3, v4, v5 FROM policy_rules ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load policy rules", e))?;

        rows.into_iter().map(PolicyRule::try_from).collect()
    }

    async fn load_filtered(&self, filter: &RuleFilter) -> AppResult<Vec<PolicyRule>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT rule_type, v0, v1, v2, v3, v4, v5 FROM policy_rules WHERE TRUE",
        );
        push_filter(&mut query, filter);
        query.push(" ORDER BY id");

        let rows = query
            .build_query_as::<RuleRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load filtered rules", e)
            })?;

        rows.into_iter().map(PolicyRule::try_from).collect()
    }

    async fn save_all(&self, rules: &[PolicyRule]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("DELETE FROM policy_rules")
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear policy rules", e)
            })?;

        for chunk in rules.chunks(SAVE_BATCH_SIZE) {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO policy_rules (rule_type, v0, v1, v2, v3, v4, v5) ",
            );
            query.push_values(chunk, |mut row, rule| {
                row.push_bind(rule.rule_type.as_str())
                    .push_bind(&rule.v0)
                    .push_bind(&rule.v1)
                    .push_bind(&rule.v2)
                    .push_bind(&rule.v3)
                    .push_bind(&rule.v4)
                    .push_bind(&rule.v5);
            });

            query.build().execute(&mut *tx).await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert policy rules", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit policy save", e)
        })?;

        debug!(rules = rules.len(), "policy rules saved");
        Ok(())
    }

    async fn insert(&self, rule: &PolicyRule) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO policy_rules (rule_type, v0, v1, v2, v3, v4, v5) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(rule.rule_type.as_str())
        .bind(&rule.v0)
        .bind(&rule.v1)
        .bind(&rule.v2)
        .bind(&rule.v3)
        .bind(&rule.v4)
        .bind(&rule.v5)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                AppError::conflict("duplicate policy rule")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to insert policy rule", e)
            }
        })?;

        Ok(())
    }

    async fn delete_matching(&self, filter: &RuleFilter) -> AppResult<u64> {
        let mut query = QueryBuilder::<Postgres>::new("DELETE FROM policy_rules WHERE TRUE");
        push_filter(&mut query, filter);

        let result = query.build().execute(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete policy rules", e)
        })?;

        Ok(result.rows_affected())
    }

    async fn update_matching(&self, filter: &RuleFilter, new: &PolicyRule) -> AppResult<u64> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE policy_rules SET rule_type = ");
        query.push_bind(new.rule_type.as_str());
        for (column, value) in [
            ("v0", &new.v0),
            ("v1", &new.v1),
            ("v2", &new.v2),
            ("v3", &new.v3),
            ("v4", &new.v4),
            ("v5", &new.v5),
        ] {
            query.push(format!(", {column} = "));
            query.push_bind(value);
        }
        query.push(" WHERE TRUE");
        push_filter(&mut query, filter);

        let result = query.build().execute(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update policy rules", e)
        })?;

        Ok(result.rows_affected())
    }
}

/// Appends `AND column = value` conditions for every restricted slot.
fn push_filter<'a>(query: &mut QueryBuilder<'a, Postgres>, filter: &'a RuleFilter) {
    if let Some(rule_type) = filter.rule_type {
        query.push(" AND rule_type = ");
        query.push_bind(rule_type.as_str());
    }

    for (column, value) in [
        ("v0", &filter.v0),
        ("v1", &filter.v1),
        ("v2", &filter.v2),
        ("v3", &filter.v3),
        ("v4", &filter.v4),
        ("v5", &filter.v5),
    ] {
        if let Some(value) = value {
            query.push(format!(" AND {column} = "));
            query.push_bind(value);
        }
    }
}
