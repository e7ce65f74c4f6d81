//! Message Sender API - Library exports for testing
//!
//! Messages accepted over HTTP are persisted together with an outbox row in
//! one transaction; a background worker drains the outbox to a downstream
//! webhook and records delivery receipts in Redis. The actual application
//! entry point is in main.rs.

pub mod cache;
pub mod config;
pub mod db;
pub mod docs;
pub mod messages;
pub mod models;
pub mod queue;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod utils;

use cache::DeliveryCache;
use messages::MessageStore;
use scheduler::control::SenderControl;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: db::Database,
    pub config: config::Config,
    pub store: MessageStore,
    pub control: SenderControl,
    pub deliveries: DeliveryCache,
}
