//! Build caches from environment settings
//!
//! ```sh
//! CACHE_SYSTEM=redis REDIS_CACHE_CONNECTION_STRING=localhost:6379 \
//!     cargo run --example selector
//! ```
//!
//! Without a reachable Redis the selector falls back to local caches.

use std::sync::Arc;
use std::time::Duration;
use strata_cache::prelude::*;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Report {
    rows: Vec<u32>,
}

impl TypeName for Report {
    fn type_name() -> String {
        "Report".to_string()
    }
}

async fn build_report() -> Result<Report> {
    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(Report {
        rows: (1..=5).collect(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CacheError::Internal(e.to_string()))?;

    let selector = Arc::new(CacheSelector::from_env());
    println!("Configured backend: {}", selector.config().kind);

    let registry = CacheRegistry::with_standard_profiles(selector.clone())
        .with_profile("reports", CacheProfile::new().prefix("reports"));
    let cache = registry.resolve("reports").await?;
    println!("Using {} cache (downgraded: {})", cache.backend(), selector.is_downgraded());

    for attempt in 1..=2 {
        let started = std::time::Instant::now();
        let report = cache.get_async("daily", build_report).await?;
        println!(
            "Attempt {}: {} rows in {:?}",
            attempt,
            report.rows.len(),
            started.elapsed()
        );
    }

    let removed = cache.remove::<Report>("daily").await;
    println!("Removed: {}", removed);

    Ok(())
}
