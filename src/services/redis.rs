//! Redis service - delivery receipt store connection

use anyhow::Result;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands,
};

use crate::config::RedisConfig;

#[derive(Clone)]
pub struct RedisService {
    conn: ConnectionManager,
}

impl RedisService {
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url())?;
        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(config.connect_timeout)
            .set_response_timeout(config.response_timeout);
        let conn = ConnectionManager::new_with_config(client, manager_config).await?;
        Ok(Self { conn })
    }

    /// Get a value; `None` when the key is absent or expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    /// Set a value with an expiration in seconds
    pub async fn set_ex(
        &self,
        key: &str,
        value: &str,
        expire_seconds: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, expire_seconds).await?;
        Ok(())
    }
}
