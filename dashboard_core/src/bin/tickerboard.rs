use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand};
use dashboard_core::{
    config::{DashboardConfig, REFRESH_INTERVALS},
    display::render_panel,
    pipeline::{Dashboard, Providers},
    window::{WindowLabel, WindowSource},
};
use market_feed::providers::{
    HeadlineProvider, WeatherProvider, openweather::OpenWeatherProvider,
    tool_service::ToolServiceProvider, yahoo_chart::YahooChartProvider,
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt::time::UtcTime};

/// Headlines printed per symbol.
const HEADLINES_PER_SYMBOL: usize = 3;

#[derive(Parser)]
#[command(version, about = "Terminal stock dashboard")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Refresh the panels on an interval until interrupted.
    Watch(WatchArgs),
    /// Run a single refresh pass.
    Once(PassArgs),
    /// List the timeframe windows.
    Windows,
}

#[derive(Args)]
struct PassArgs {
    /// Ticker symbols, space or comma separated.
    #[arg(long, num_args = 1.., required = true)]
    symbols: Vec<String>,
    /// Window label, e.g. "Today" or "Last Month".
    #[arg(long, default_value = "Today")]
    timeframe: String,
    /// TOML config file; environment variables override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Show current weather for this city.
    #[arg(long)]
    city: Option<String>,
    /// Show recent headlines under each panel.
    #[arg(long)]
    headlines: bool,
}

#[derive(Args)]
struct WatchArgs {
    #[command(flatten)]
    pass: PassArgs,
    /// Seconds between passes; defaults to the configured interval.
    #[arg(long)]
    interval: Option<u64>,
    /// Stop after this many passes.
    #[arg(long)]
    passes: Option<u64>,
}

struct App {
    dashboard: Dashboard,
    tools: Arc<ToolServiceProvider>,
    weather: Option<OpenWeatherProvider>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_timer(UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
}

fn log_dotenv(loaded: dotenvy::Result<PathBuf>) {
    match loaded {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "ignoring unreadable .env"),
    }
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    let mut cfg = match path {
        Some(p) => DashboardConfig::load_path(p)?,
        None => DashboardConfig::default(),
    };
    cfg.apply_env();
    cfg.validate()?;
    debug!(config = ?cfg, "configuration loaded");
    Ok(cfg)
}

fn build_app(cfg: &DashboardConfig) -> Result<App> {
    let options = cfg.client_options();
    let tools = Arc::new(
        ToolServiceProvider::new(&cfg.tool_service_url, &options)
            .context("building tool service client")?,
    );
    let history = Arc::new(
        YahooChartProvider::new(&cfg.history_base_url, &options)
            .context("building history client")?,
    );
    let weather = cfg
        .weather_api_key()
        .map(|key| OpenWeatherProvider::new(&cfg.weather_base_url, key, &options))
        .transpose()
        .context("building weather client")?;

    let providers = Providers {
        quotes: tools.clone(),
        history,
        reference: tools.clone(),
    };
    Ok(App {
        dashboard: Dashboard::new(providers, cfg.settings()?),
        tools,
        weather,
    })
}

async fn run_pass(app: &mut App, args: &PassArgs) {
    let panels = app.dashboard.refresh(&args.symbols, &args.timeframe).await;

    for panel in &panels {
        print!("{}", render_panel(panel));
        for warning in &panel.warnings {
            debug!(symbol = %panel.symbol, %warning, "panel warning");
        }
        if args.headlines {
            match app.tools.headlines(&panel.symbol).await {
                Ok(items) => {
                    for h in items.iter().take(HEADLINES_PER_SYMBOL) {
                        println!("    - {} <{}>", h.title, h.link);
                    }
                }
                Err(err) => warn!(symbol = %panel.symbol, error = %err, "headlines unavailable"),
            }
        }
        println!();
    }

    if let (Some(city), Some(weather)) = (&args.city, &app.weather) {
        match weather.current_weather(city).await {
            Ok(w) => println!(
                "{}: {:.0}°F, {} ({})",
                w.city,
                w.temperature_f,
                w.description,
                w.icon_url()
            ),
            Err(err) => warn!(city = %city, error = %err, "weather unavailable"),
        }
    }
}

fn print_windows() {
    println!("{:<18} {:<12} {:>6} {:>9}  market hours only", "window", "source", "period", "interval");
    for label in WindowLabel::ALL {
        let spec = label.spec();
        let source = match spec.source {
            WindowSource::LiveSeries { lookback_minutes } => format!("live {lookback_minutes}m"),
            WindowSource::Historical => "history".to_string(),
        };
        println!(
            "{:<18} {:<12} {:>6} {:>9}  {}",
            label.as_str(),
            source,
            spec.period.to_string(),
            spec.interval.to_string(),
            spec.market_hours_only
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` may set RUST_LOG, so it is loaded before the subscriber.
    let dotenv = dotenvy::dotenv();
    init_tracing();
    log_dotenv(dotenv);

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Windows => print_windows(),
        Cmd::Once(args) => {
            let cfg = load_config(args.config.as_deref())?;
            let mut app = build_app(&cfg)?;
            if args.city.is_some() && app.weather.is_none() {
                warn!("no weather API key configured, skipping weather");
            }
            run_pass(&mut app, &args).await;
        }
        Cmd::Watch(WatchArgs {
            pass,
            interval,
            passes,
        }) => {
            let cfg = load_config(pass.config.as_deref())?;
            let secs = interval.unwrap_or(cfg.refresh_interval_secs);
            ensure!(
                REFRESH_INTERVALS.contains(&secs),
                "refresh interval must be one of {REFRESH_INTERVALS:?} seconds, got {secs}"
            );
            let mut app = build_app(&cfg)?;
            if pass.city.is_some() && app.weather.is_none() {
                warn!("no weather API key configured, skipping weather");
            }

            let mut ticker = tokio::time::interval(Duration::from_secs(secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(every = secs, timeframe = %pass.timeframe, "watching {:?}", pass.symbols);

            let mut done = 0u64;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        run_pass(&mut app, &pass).await;
                        done += 1;
                        if passes.is_some_and(|n| done >= n) {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("interrupted, stopping");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
