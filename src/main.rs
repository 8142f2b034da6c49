//! # Tide Info Application Entry Point
//!
//! This binary crate wires the library together behind a small CLI:
//! - `show` (default): print the report once
//! - `watch`: live countdowns to the next high and low, refreshed every second
//! - `alert`: wait for the next tide event and announce it
//! - `clear`: forget the stored location and tide data


use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tide_info_lib::alert::TideAlert;
use tide_info_lib::app::{TideApp, TideReport};
use tide_info_lib::config::{Config, CONFIG_FILE};
use tide_info_lib::extrema::ExtremumPolicy;
use tide_info_lib::renderer::{clock_line, countdown_line, render_report};
use tide_info_lib::watch::TideWatch;
use tide_info_lib::Coordinates;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Parser)]
#[command(
    name = "tide-info",
    version = env!("CARGO_PKG_VERSION"),
    about = "Nearest coast, next high/low tide and live countdowns",
    long_about = None
)]
struct Cli {
    /// Configuration file
    #[arg(global = true, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Latitude of your position (decimal degrees)
    #[arg(global = true, long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of your position (decimal degrees)
    #[arg(global = true, long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Override how the next high and low are picked
    #[arg(global = true, long, value_enum)]
    policy: Option<ExtremumPolicy>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Print the tide report once
    Show,
    /// Keep counting down to the next high and low tide until Ctrl-C
    Watch,
    /// Wait for the next high or low tide and announce it
    Alert,
    /// Clear the stored location and tide data
    Clear,
}

/// Logging defaults to warnings so stdout stays readable; `RUST_LOG` overrides.
fn logger_builder() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env();
    builder
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    logger_builder().init();

    let cli = Cli::parse();
    let config = Config::load_from_path(&cli.config);
    let policy = cli.policy.unwrap_or(config.tides.policy);
    let position = cli.lat.zip(cli.lon).map(|(lat, lon)| Coordinates::new(lat, lon));

    let app = TideApp::new(config).context("failed to build HTTP client")?;

    if let Some(Command::Clear) = cli.command {
        app.clear_session()?;
        println!("Stored location cleared.");
        return Ok(());
    }

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let report = app.prepare(position).await?;
        let now = app.now();
        let extrema = report.extrema(now, policy);
        print!(
            "{}",
            render_report(&report, &extrema, now, &chrono::Local, &app.config().display)
        );

        match cli.command.unwrap_or(Command::Show) {
            Command::Show | Command::Clear => Ok(()),
            Command::Watch => watch(&app, &report, policy).await,
            Command::Alert => alert(&app, &report, policy).await,
        }
    })
}

/// Run one countdown per upcoming extremum, refreshing the clock line on the
/// same period. When a target is reached the extrema are recomputed and fresh
/// countdowns replace the old ones.
async fn watch(app: &TideApp, report: &TideReport, policy: ExtremumPolicy) -> anyhow::Result<()> {
    let period = app.config().tick();
    let Some(mut tides) = TideWatch::start(report.tide_data.clone(), policy, app.clock(), period)
    else {
        return Ok(());
    };
    println!();

    let mut clock_ticker = time::interval_at(Instant::now() + period, period);
    clock_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted, stopping countdowns");
                break;
            }
            _ = clock_ticker.tick() => println!("{}", clock_line(app.now(), &chrono::Local)),
            line = tides.next() => match line {
                Some((kind, display)) => println!("{}", countdown_line(kind, &display)),
                None => {
                    println!("No more upcoming tides in the loaded data.");
                    break;
                }
            },
        }
    }

    tides.stop();
    Ok(())
}

/// Schedule an alert for whichever extremum comes first and wait for it.
async fn alert(app: &TideApp, report: &TideReport, policy: ExtremumPolicy) -> anyhow::Result<()> {
    let Some(event) = report.extrema(app.now(), policy).next_event() else {
        println!("No upcoming tide events.");
        return Ok(());
    };

    let local = event.time.with_timezone(&chrono::Local);
    let pending = TideAlert::schedule(event, app.clock(), move |e| {
        println!(
            "Tide Alert! Event at {} ({:+.2} m)",
            local.format("%Y-%m-%d %H:%M"),
            e.height
        );
    });
    println!("\nAlert set for next tide event at {}", local.format("%Y-%m-%d %H:%M"));

    // Dropping the unfinished alert on Ctrl-C cancels it
    tokio::select! {
        _ = tokio::signal::ctrl_c() => println!("Alert cancelled."),
        _ = pending.fired() => {}
    }
    Ok(())
}
