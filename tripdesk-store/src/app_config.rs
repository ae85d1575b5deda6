use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// How long an idempotency key blocks a repeated booking request
    pub idempotency_ttl_seconds: u64,
    /// Requests per client IP per minute
    pub rate_limit_per_minute: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String { "GHS".to_string() }

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            idempotency_ttl_seconds: 86_400,
            rate_limit_per_minute: 100,
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Serve from in-memory repositories instead of Postgres/Redis
    #[serde(default)]
    pub in_memory: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `TRIPDESK_SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("TRIPDESK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
