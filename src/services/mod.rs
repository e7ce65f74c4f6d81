//! External services

pub mod redis;
pub mod webhook;

use anyhow::Result;

use crate::config::Config;

/// Container for all external services
#[derive(Clone)]
pub struct Services {
    pub redis: redis::RedisService,
    pub webhook: webhook::WebhookSender,
}

impl Services {
    pub async fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            redis: redis::RedisService::new(&config.redis).await?,
            webhook: webhook::WebhookSender::new(&config.webhook)?,
        })
    }
}
