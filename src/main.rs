// src/main.rs

use anyhow::{Context, Result};
use courtside_events::{
    find_detection_files, Config, DetectionAdapter, DetectionLog, EventType, GameReport,
    GameSession, Team,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path =
        std::env::var("COURTSIDE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config_found = Path::new(&config_path).exists();
    let config = if config_found {
        Config::load(&config_path)?
    } else {
        Config::default()
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏀 Courtside event engine starting");
    if config_found {
        info!("✓ Configuration loaded from {}", config_path);
    } else {
        warn!("{} not found, using built-in defaults", config_path);
    }
    info!(
        "Possession: radius={:.0}px, change={:.2}s, timeout={:.1}s | window={} @ {:.1} fps",
        config.possession.match_radius,
        config.possession.change_threshold_secs,
        config.possession.no_possession_timeout_secs,
        config.video.window_size,
        config.video.frame_rate
    );

    let logs = find_detection_files(&config.video.input_dir)?;
    if logs.is_empty() {
        error!("No detection logs found in {}", config.video.input_dir);
        return Ok(());
    }

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⏹️  Ctrl-C received, stopping after the current frame");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let output_dir = PathBuf::from(&config.video.output_dir);
    let mut succeeded = 0usize;

    for (idx, log_path) in logs.iter().enumerate() {
        info!("\n========================================");
        info!(
            "Processing detection log {}/{}: {}",
            idx + 1,
            logs.len(),
            log_path.display()
        );
        info!("========================================\n");

        match process_log(log_path.clone(), config.clone(), cancel.clone()).await {
            Ok(report) => {
                print_summary(&report);
                let stem = log_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("game");
                match report.write_json(&output_dir, stem) {
                    Ok(_) => succeeded += 1,
                    Err(e) => error!("Failed to write report for {}: {:#}", log_path.display(), e),
                }
            }
            Err(e) => error!("Failed to process {}: {:#}", log_path.display(), e),
        }

        if cancel.load(Ordering::Relaxed) {
            warn!("Stopping batch, {} log(s) left unprocessed", logs.len() - idx - 1);
            break;
        }
    }

    info!("✓ {}/{} detection logs processed", succeeded, logs.len());
    Ok(())
}

/// One run per worker thread; the async side only waits
async fn process_log(path: PathBuf, config: Config, cancel: Arc<AtomicBool>) -> Result<GameReport> {
    tokio::task::spawn_blocking(move || -> Result<GameReport> {
        let adapter = DetectionAdapter::new(&config.detection);
        let mut log = DetectionLog::open(&path, adapter)?;
        let mut session = GameSession::new(&config);
        session
            .run(&mut log, &cancel)
            .with_context(|| format!("Run over {} failed", path.display()))?;
        Ok(session.finish(path.display().to_string()))
    })
    .await
    .context("Processing worker panicked")?
}

fn print_summary(report: &GameReport) {
    info!("\n✓ Detection log processed successfully!");
    info!(
        "  Frames: {} ({:.1}s of video @ {:.1} fps)",
        report.frames_processed, report.duration_secs, report.frame_rate
    );
    info!(
        "  Frames with ball: {} ({:.1}%)",
        report.metrics.frames_with_ball,
        100.0 * report.metrics.frames_with_ball as f64 / report.frames_processed.max(1) as f64
    );
    info!("  Events: {}", report.events.len());
    for event_type in [
        EventType::Pass,
        EventType::Shot,
        EventType::Rebound,
        EventType::Steal,
        EventType::Turnover,
        EventType::Dribble,
    ] {
        let count = report.count_of(event_type);
        if count > 0 {
            info!("    {:<9} {}", event_type.as_str(), count);
        }
    }
    for team in [Team::Home, Team::Away] {
        info!("  🏆 {:<4} {} pts", team.as_str(), report.score(team));
    }
    for p in report.leaders(3) {
        info!(
            "  Player {:>3}: {} pts, {} ast, {} reb, {} stl, {} to",
            p.player_id,
            p.points,
            p.assists,
            p.rebounds(),
            p.steals,
            p.turnovers
        );
    }
}
