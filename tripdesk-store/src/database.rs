use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;
use serde_json::Value;

use tripdesk_core::repository::RepoError;

use crate::app_config::BusinessRules;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Overlay rows of `business_rules` on the file configuration.
    pub async fn fetch_business_rules(&self, defaults: BusinessRules) -> Result<BusinessRules, sqlx::Error> {
        let rows: Vec<(String, Value)> = sqlx::query_as("SELECT rule_key, rule_value FROM business_rules")
            .fetch_all(&self.pool)
            .await?;

        let mut rules = defaults;
        for (key, value) in rows {
            apply_rule(&mut rules, &key, &value);
        }

        Ok(rules)
    }
}

/// Expected value shape: `{"value": <number|string>}`. Unknown keys are ignored.
fn apply_rule(rules: &mut BusinessRules, key: &str, value: &Value) {
    let Some(v) = value.get("value") else {
        return;
    };

    match key {
        "idempotency_ttl_seconds" => {
            if let Some(u) = v.as_u64() {
                rules.idempotency_ttl_seconds = u;
            }
        }
        "rate_limit_per_minute" => {
            if let Some(i) = v.as_i64() {
                rules.rate_limit_per_minute = i;
            }
        }
        "currency" => {
            if let Some(s) = v.as_str() {
                rules.currency = s.to_string();
            }
        }
        _ => {}
    }
}

/// Counts are `u32` in the model and `INTEGER` in Postgres.
pub(crate) fn db_count(value: u32, column: &str) -> Result<i32, RepoError> {
    i32::try_from(value).map_err(|_| format!("{} {} does not fit an INTEGER column", column, value).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_rule_overrides() {
        let mut rules = BusinessRules::default();
        apply_rule(&mut rules, "rate_limit_per_minute", &json!({"value": 20}));
        apply_rule(&mut rules, "currency", &json!({"value": "USD"}));
        apply_rule(&mut rules, "idempotency_ttl_seconds", &json!({"value": "soon"}));
        apply_rule(&mut rules, "unknown", &json!({"value": 1}));

        assert_eq!(rules.rate_limit_per_minute, 20);
        assert_eq!(rules.currency, "USD");
        assert_eq!(rules.idempotency_ttl_seconds, 86_400);
    }

    #[test]
    fn test_db_count_rejects_values_past_integer_range() {
        assert_eq!(db_count(8, "available_slots").unwrap(), 8);
        assert_eq!(db_count(i32::MAX as u32, "available_slots").unwrap(), i32::MAX);

        let err = db_count(u32::MAX, "available_slots").unwrap_err();
        assert!(err.to_string().contains("available_slots"));
    }
}
