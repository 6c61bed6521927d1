//! MySQL/MariaDB session backend
//!
//! Implements the `tarn_core::Session` and `SessionFactory` traits on top of
//! `mysql_async`. Sessions are opened with autocommit disabled and the
//! configured character set, so the pool's executor controls transaction
//! boundaries explicitly.

mod factory;
mod session;

pub use factory::MySqlSessionFactory;
pub use session::MySqlSession;
