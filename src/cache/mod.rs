//! Delivery receipt cache

pub mod keys;
pub mod service;

pub use service::{CacheError, DeliveryCache, DeliveryRecord};
