//! Connects to a MySQL server described by MYSQL_* environment variables,
//! warms the pool, runs a probe query, and prints pool statistics.
//!
//! ```sh
//! MYSQL_HOST=localhost MYSQL_USER=root MYSQL_PASSWORD=secret \
//!     MYSQL_DATABASE=test cargo run -p tarn-mysql --example pool_demo
//! ```

use tarn_core::DbConfig;
use tarn_mysql::MySqlSessionFactory;
use tarn_pool::{Pool, PoolConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = DbConfig::from_env()?;
    tracing::info!(config = ?config, "connecting");

    let pool = Pool::new(
        PoolConfig::new(2, 5).with_acquire_timeout_ms(5_000),
        MySqlSessionFactory::new(config),
    );
    pool.warm_up().await;

    let rows = pool.query("SELECT VERSION(), NOW()", &[]).await?;
    for row in &rows {
        println!("server: {} at {}", row.get(0).unwrap(), row.get(1).unwrap());
    }

    let stats = pool.stats();
    println!(
        "pool: total={} idle={} active={} utilization={:.0}%",
        stats.total(),
        stats.idle(),
        stats.active(),
        stats.utilization() * 100.0
    );

    pool.shutdown().await;
    Ok(())
}
