//! Vigil CLI
//!
//! Hybrid surveillance alerting: weapon + behavior signal fusion.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use vigil_core::EngineConfig;
use vigil_detect::{
    EvidenceStore, FileEvidenceStore, IncidentLog, JsonlIncidentLog, SimulatedBehaviorClassifier,
    SimulatedWeaponDetector,
};
use vigil_engine::Trend;
use vigil_runtime::{FeedConfig, FeedRunner, FramePipeline};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(author, version, about = "Vigil: weapon + behavior signal fusion for surveillance feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated surveillance feed through the fusion pipeline
    Simulate {
        /// Configuration preset (balanced, high_security, low_false_positives)
        #[arg(short, long, default_value = "balanced")]
        preset: String,

        /// Number of synthetic frames to process
        #[arg(long, default_value = "300")]
        frames: u64,

        /// Milliseconds between frames
        #[arg(long, default_value = "33")]
        tick: u64,

        /// Per-frame weapon detection probability for the simulator
        #[arg(long, default_value = "0.05")]
        weapon_rate: f64,

        /// Per-window behavior detection probability for the simulator
        #[arg(long, default_value = "0.08")]
        behavior_rate: f64,

        /// Directory for evidence frames
        #[arg(long, default_value = "alerts")]
        evidence_dir: PathBuf,

        /// Incident log file (default: incidents_<timestamp>.jsonl)
        #[arg(long)]
        incident_log: Option<PathBuf>,
    },

    /// Print the resolved configuration for a preset
    Config {
        /// Configuration preset name
        #[arg(short, long, default_value = "balanced")]
        preset: String,
    },

    /// List available configuration presets
    Presets,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Simulate {
            preset,
            frames,
            tick,
            weapon_rate,
            behavior_rate,
            evidence_dir,
            incident_log,
        } => {
            run_simulation(
                &preset,
                frames,
                tick,
                weapon_rate,
                behavior_rate,
                evidence_dir,
                incident_log,
            )
            .await?;
        }
        Commands::Config { preset } => {
            print_config(&preset)?;
        }
        Commands::Presets => {
            println!("Available presets:\n");
            println!("  balanced             adaptive fusion, base thresholds");
            println!("  high_security        aggressive fusion, lower thresholds, more alerts");
            println!("  low_false_positives  conservative fusion, raised thresholds, fewer alerts");
        }
    }

    Ok(())
}

fn resolve_preset(name: &str) -> Result<EngineConfig> {
    EngineConfig::preset(name).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown preset '{}' (expected one of: {})",
            name,
            EngineConfig::preset_names().join(", ")
        )
    })
}

async fn run_simulation(
    preset: &str,
    frames: u64,
    tick: u64,
    weapon_rate: f64,
    behavior_rate: f64,
    evidence_dir: PathBuf,
    incident_log: Option<PathBuf>,
) -> Result<()> {
    let config = resolve_preset(preset)?;

    println!("🛡️  Vigil - Hybrid Surveillance Alerting\n");
    println!("⚙️  Preset: {} | Mode: {:?}", preset, config.mode);
    println!(
        "🎯 Thresholds: weapon {:.0}% | behavior {:.0}%",
        config.weapon_threshold * 100.0,
        config.behavior_threshold * 100.0
    );
    println!(
        "🎞️  Feed: {} frames @ {}ms | weapon rate {:.1}% | behavior rate {:.1}%",
        frames,
        tick,
        weapon_rate * 100.0,
        behavior_rate * 100.0
    );

    let incident_path = incident_log.unwrap_or_else(|| {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
        PathBuf::from(format!("incidents_{}.jsonl", timestamp))
    });
    println!(
        "💾 Evidence: {} | Incidents: {}\n",
        evidence_dir.display(),
        incident_path.display()
    );

    let incidents: Arc<dyn IncidentLog> = Arc::new(JsonlIncidentLog::new(&incident_path));
    let evidence: Arc<dyn EvidenceStore> = Arc::new(FileEvidenceStore::new(&evidence_dir));

    let pipeline = Arc::new(FramePipeline::new(
        config,
        Arc::new(SimulatedWeaponDetector::new(weapon_rate)),
        Arc::new(SimulatedBehaviorClassifier::new(behavior_rate)),
        incidents,
        evidence,
    )?);

    // Print alerts as the dispatcher delivers them
    let mut subscription = pipeline.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(alert) = subscription.receiver.recv().await {
            println!(
                "🚨 [{:?}] {} (confidence {:.0}%)",
                alert.severity,
                alert.description,
                alert.confidence * 100.0
            );
        }
    });

    let runner = FeedRunner::new(
        pipeline.clone(),
        FeedConfig {
            frames,
            tick_interval_ms: tick,
        },
    );
    let summary = runner.run().await?;

    let stats = pipeline.stats();
    let status = pipeline.status();
    let trend = pipeline.engine().trend();

    println!("\n✅ Feed complete");
    println!("📊 Frames: {} | Alerts: {} | Suppressed by cooldown: {}",
        summary.frames, summary.alerts, summary.suppressed);
    println!("   Cache hits: {} | Lifetime alerts: {}", stats.cache_hits, status.total_alerts);

    match trend.trend {
        Trend::Escalating => println!(
            "📈 Trend: ESCALATING ({}/{} recent frames alerted)",
            trend.recent_alerts, trend.examined
        ),
        Trend::Normal => println!("📉 Trend: normal"),
        Trend::Idle => println!("💤 Trend: idle"),
    }

    drop(pipeline);
    printer.abort();

    Ok(())
}

fn print_config(preset: &str) -> Result<()> {
    let config = resolve_preset(preset)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
