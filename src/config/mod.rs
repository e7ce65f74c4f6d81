//! Application configuration

use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    // Server
    pub port: u16,
    pub environment: String,

    pub database: DatabaseConfig,
    pub webhook: WebhookConfig,
    pub scheduler: SchedulerConfig,
    pub redis: RedisConfig,
}

/// PostgreSQL connection settings
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
}

/// Downstream webhook endpoint settings
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub url: String,
    /// Per-request timeout applied to the HTTP client
    pub timeout: Duration,
}

/// Outbox scheduler settings
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Delay between outbox processing ticks
    pub interval: Duration,
    /// Maximum outbox entries fetched per tick
    pub batch_size: i64,
    /// Deadline for a whole tick; entries not started by then wait for the
    /// next one
    pub send_timeout: Duration,
    /// Start the sender on boot
    pub enabled: bool,
}

/// Redis connection and receipt settings
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    pub connect_timeout: Duration,
    pub response_timeout: Duration,
    /// TTL applied to delivery receipts
    pub ttl: Duration,
}

impl RedisConfig {
    /// Connection URL assembled from the configured parts
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) if !password.is_empty() => format!(
                "redis://:{}@{}:{}/{}",
                urlencoding::encode(password),
                self.host,
                self.port,
                self.db
            ),
            _ => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database: DatabaseConfig {
                host: std::env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: std::env::var("DATABASE_PORT")
                    .unwrap_or_else(|_| "5432".to_string())
                    .parse()
                    .context("Invalid DATABASE_PORT")?,
                user: std::env::var("DATABASE_USER").unwrap_or_else(|_| "postgres".to_string()),
                password: std::env::var("DATABASE_PASSWORD").unwrap_or_default(),
                dbname: std::env::var("DATABASE_NAME")
                    .unwrap_or_else(|_| "message_sender".to_string()),
                sslmode: std::env::var("DATABASE_SSLMODE")
                    .unwrap_or_else(|_| "disable".to_string()),
            },

            webhook: WebhookConfig {
                url: std::env::var("WEBHOOK_URL").context("WEBHOOK_URL required")?,
                timeout: Duration::from_secs(
                    std::env::var("WEBHOOK_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "10".to_string())
                        .parse()
                        .context("Invalid WEBHOOK_TIMEOUT_SECS")?,
                ),
            },

            scheduler: SchedulerConfig {
                interval: Duration::from_secs(
                    std::env::var("SCHEDULER_INTERVAL_SECS")
                        .unwrap_or_else(|_| "10".to_string())
                        .parse()
                        .context("Invalid SCHEDULER_INTERVAL_SECS")?,
                ),
                batch_size: std::env::var("SCHEDULER_BATCH_SIZE")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()
                    .context("Invalid SCHEDULER_BATCH_SIZE")?,
                send_timeout: Duration::from_millis(
                    std::env::var("SCHEDULER_SEND_TIMEOUT_MS")
                        .unwrap_or_else(|_| "30000".to_string())
                        .parse()
                        .context("Invalid SCHEDULER_SEND_TIMEOUT_MS")?,
                ),
                enabled: std::env::var("SCHEDULER_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .context("Invalid SCHEDULER_ENABLED")?,
            },

            redis: RedisConfig {
                host: std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: std::env::var("REDIS_PORT")
                    .unwrap_or_else(|_| "6379".to_string())
                    .parse()
                    .context("Invalid REDIS_PORT")?,
                password: std::env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
                db: std::env::var("REDIS_DB")
                    .unwrap_or_else(|_| "0".to_string())
                    .parse()
                    .context("Invalid REDIS_DB")?,
                connect_timeout: Duration::from_secs(
                    std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "5".to_string())
                        .parse()
                        .context("Invalid REDIS_CONNECT_TIMEOUT_SECS")?,
                ),
                response_timeout: Duration::from_secs(
                    std::env::var("REDIS_RESPONSE_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "3".to_string())
                        .parse()
                        .context("Invalid REDIS_RESPONSE_TIMEOUT_SECS")?,
                ),
                ttl: Duration::from_secs(
                    std::env::var("REDIS_TTL_SECS")
                        .unwrap_or_else(|_| "86400".to_string())
                        .parse()
                        .context("Invalid REDIS_TTL_SECS")?,
                ),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the scheduler busy-loop or never send
    fn validate(&self) -> Result<()> {
        if self.scheduler.interval.is_zero() {
            bail!("SCHEDULER_INTERVAL_SECS must be positive");
        }
        if self.scheduler.batch_size <= 0 {
            bail!("SCHEDULER_BATCH_SIZE must be positive");
        }
        if self.scheduler.send_timeout.is_zero() {
            bail!("SCHEDULER_SEND_TIMEOUT_MS must be positive");
        }
        if self.webhook.timeout.is_zero() {
            bail!("WEBHOOK_TIMEOUT_SECS must be positive");
        }
        if self.webhook.url.is_empty() {
            bail!("WEBHOOK_URL must not be empty");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
