//! Session pooling
//!
//! This module provides session pooling with configurable sizes, a
//! blocking-with-timeout acquire path, and statistics tracking.
//!
//! # Example
//!
//! ```ignore
//! use tarn_pool::{Pool, PoolConfig};
//!
//! let config = PoolConfig::new(5, 20).with_acquire_timeout_ms(5000);
//! let pool = Pool::new(config, factory);
//! pool.warm_up().await;
//!
//! let session = pool.acquire().await?;
//! // Use session...
//! pool.release(session).await;
//! ```

mod config;
mod pool;
mod stats;


pub use config::PoolConfig;
pub use pool::Pool;
pub use stats::PoolStats;
