//! tarn-core - Core abstractions for the tarn pooled database layer
//!
//! This crate provides the fundamental traits and types the pool and the
//! backend driver depend on. It defines:
//!
//! - `Session` - Trait for one live backend connection
//! - `SessionFactory` - Trait for opening sessions and probing liveness
//! - `DbConfig` - Connection parameters with file/env loaders
//! - Common types like `Value`, `Row`, and the `DbError` family

mod config;
mod error;
mod session;
mod types;

pub use config::DbConfig;
pub use error::{DbError, Result};
pub use session::{Session, SessionFactory};
pub use types::{Row, Value};
