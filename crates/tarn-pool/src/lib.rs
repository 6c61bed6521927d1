//! tarn-pool - Bounded session pooling with liveness-gated reuse
//!
//! This crate owns the pool core: acquisition and release of backend
//! sessions, dynamic growth up to a maximum, blocking admission with a
//! timeout, warm-up, teardown, and the statement executor built on scoped
//! acquisition.

mod executor;
pub mod pool;

pub use pool::{Pool, PoolConfig, PoolStats};
