//! SheSecure Risk Monitor
//!
//! Runs periodic risk assessments until Ctrl+C, then prints and exports
//! the session telemetry.

use shesecure_risk::core::engine::RiskEngine;
use shesecure_risk::core::history::{FileHistory, HistoryStore, MemoryHistory};
use shesecure_risk::models::config::MonitorConfig;
use shesecure_risk::monitor::RiskMonitor;
use shesecure_risk::providers::{
    LocationProvider, SimulatedBehavior, SimulatedLocationSignals, SimulatedWeather,
    StaticLocation,
};
use shesecure_risk::utils::cache::CachedSignals;
use shesecure_risk::utils::constants::{APP_NAME, APP_VERSION};
use shesecure_risk::utils::telemetry::TelemetryCollector;

use eyre::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    println!("\n    🛡️  {} v{}\n", APP_NAME, APP_VERSION);

    let config = MonitorConfig::from_env()?;

    let signals = Arc::new(CachedSignals::new(SimulatedLocationSignals));
    let cleanup = signals.spawn_cleanup(Duration::from_secs(60));

    let engine = RiskEngine::builder()
        .with_shared_signals(signals.clone())
        .with_weather(SimulatedWeather::new(config.simulation_seed))
        .with_behavior(SimulatedBehavior::new(config.simulation_seed))
        .build();

    let history: Arc<dyn HistoryStore> = match &config.history_path {
        Some(path) => {
            info!("💾 History persisted to {}", path.display());
            Arc::new(FileHistory::new(path.clone()))
        }
        None => Arc::new(MemoryHistory::new()),
    };

    // No positioning hardware here: report the configured coordinate.
    let location: Arc<dyn LocationProvider> =
        Arc::new(StaticLocation::new(config.default_location, None));

    let telemetry = Arc::new(TelemetryCollector::new());
    let monitor = RiskMonitor::new(config, engine, location, history, telemetry.clone());

    monitor
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("❌ Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await;

    println!("\n🛑 Shutting down gracefully...");
    cleanup.abort();

    if let Some(latest) = monitor.latest() {
        println!("\n{}", latest.assessment.summary());
    }

    let cache = signals.stats();
    println!(
        "   Signal cache: {} entries, {} hits, {} misses ({:.1}% hit rate)",
        cache.entries, cache.hits, cache.misses, cache.hit_rate
    );

    let stats = telemetry.get_stats();
    println!("{}", stats.summary());

    match telemetry.export_stats_json(Path::new("telemetry")) {
        Ok(path) => println!("   ✅ JSON exported to: {}", path.display()),
        Err(e) => println!("   ❌ JSON export failed: {}", e),
    }

    Ok(())
}
