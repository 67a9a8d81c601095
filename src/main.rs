//! # Analog Watch Application Entry Point
//!
//! This binary crate wires the clock library to its surroundings: command
//! line, configuration, logging, the preference file and the window host.
//! It supports the desktop widget (feature `window`) and terminal modes for
//! development without a desktop session.

// Test modules
#[cfg(test)]
mod tests;

use analog_watch_lib::{
    config::{Config, CONFIG_FILE},
    preferences::TomlPreferences,
    renderer::draw_ascii,
    ClockRenderer, ClockTime, DisplayPreferences, LayoutMetrics, WindowGeometry,
};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Redraw interval of the terminal preview.
const WATCH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "analog-watch")]
#[command(about = "Borderless, always-on-top analog clock widget")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Print one ASCII frame to stdout and exit
    #[arg(long)]
    stdout: bool,

    /// Redraw the ASCII frame in the terminal until Ctrl-C
    #[arg(long, conflicts_with_all = ["stdout", "json"])]
    watch: bool,

    /// Print the draw commands of one frame as JSON and exit
    #[arg(long, conflicts_with = "stdout")]
    json: bool,
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analog_watch=info,analog_watch_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load_from_path(&cli.config);
    let preferences_path = config.preferences_path();
    tracing::debug!(path = %preferences_path.display(), "preference file");

    if cli.stdout || cli.watch || cli.json {
        let prefs = TomlPreferences::open(&preferences_path);
        let display = DisplayPreferences::load(&prefs);
        let renderer = ClockRenderer::new()?;

        if cli.json {
            // JSON reflects the real widget size, not the preview size
            let metrics = LayoutMetrics::recompute(WindowGeometry::load(&prefs).size);
            let frame = renderer.render(&metrics, &ClockTime::now(), &display);
            println!("{}", serde_json::to_string_pretty(&frame)?);
            return Ok(());
        }

        let metrics = LayoutMetrics::recompute(config.preview.ascii_size);
        if cli.watch {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            return rt.block_on(watch(&renderer, &metrics, &display));
        }

        let frame = renderer.render(&metrics, &ClockTime::now(), &display);
        draw_ascii(&frame, renderer.label_font());
        return Ok(());
    }

    run_window(&config, preferences_path)
}

/// Redraw the ASCII dial every second until interrupted.
async fn watch(
    renderer: &ClockRenderer,
    metrics: &LayoutMetrics,
    display: &DisplayPreferences,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(WATCH_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let frame = renderer.render(metrics, &ClockTime::now(), display);
                // clear screen, cursor home
                print!("\x1b[2J\x1b[H");
                draw_ascii(&frame, renderer.label_font());
                io::stdout().flush()?;
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("interrupted, leaving preview");
                return Ok(());
            }
        }
    }
}

#[cfg(feature = "window")]
fn run_window(config: &Config, preferences_path: PathBuf) -> anyhow::Result<()> {
    let prefs = TomlPreferences::open(preferences_path);
    let controller = analog_watch_lib::ClockController::new(prefs)?;
    analog_watch_lib::window::run(controller, config.tick())?;
    Ok(())
}

#[cfg(not(feature = "window"))]
fn run_window(_config: &Config, _preferences_path: PathBuf) -> anyhow::Result<()> {
    tracing::error!(
        "desktop window support not enabled. Rebuild with --features window, or use --stdout for a terminal preview."
    );
    Err(anyhow::anyhow!("window mode not supported in this build"))
}
