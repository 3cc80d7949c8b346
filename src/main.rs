//! campus-paths - find walking routes between campus buildings
//!
//! Talks to the pathfinder server and draws the route in the terminal.

use anyhow::{Context, Result};
use campus_paths::{
    app::App, config::Config, logging::HeldLog, tui, Controller, HttpPathService, ResponseParser, Route, WireFormat,
};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "campus-paths")]
#[command(version, about = "Find walking routes between campus buildings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Pathfinder server base URL (overrides config)
    #[arg(short, long)]
    server: Option<String>,

    /// Wire format of the server responses: json or legacy
    #[arg(long)]
    wire_format: Option<WireFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive map (default)
    Tui,

    /// List the buildings the server knows about
    Buildings {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Find the path and directions between two buildings
    Route {
        /// Short name of the start building
        start: String,

        /// Short name of the end building
        end: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Convert campus coordinates to latitude/longitude
    Project {
        x: f64,
        y: f64,
    },

    /// Show configuration
    Config {
        /// Edit configuration
        #[arg(long)]
        edit: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));

    let held = init_logging(cli.verbose, interactive, cli.log_file.as_deref())?;
    let result = run(cli).await;

    // The terminal is ours again
    if let Some(held) = held {
        held.release().context("writing held log output")?;
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.api.base_url = server;
    }
    if let Some(format) = cli.wire_format {
        config.api.wire_format = format;
    }

    match cli.command {
        None | Some(Commands::Tui) => cmd_tui(config).await,
        Some(Commands::Buildings { format }) => cmd_buildings(config, format).await,
        Some(Commands::Route { start, end, format }) => cmd_route(config, start, end, format).await,
        Some(Commands::Project { x, y }) => cmd_project(config, x, y),
        Some(Commands::Config { edit }) => cmd_config(cli.config.as_deref(), config, edit),
    }
}

type StderrLog = HeldLog<fn() -> io::Stderr>;

/// Setup logging. The TUI owns the terminal, so without a log file it only
/// logs warnings, held back until the terminal is restored.
fn init_logging(
    verbose: bool,
    interactive: bool,
    log_file: Option<&Path>,
) -> Result<Option<StderrLog>> {
    let log_level = match (verbose, interactive && log_file.is_none()) {
        (_, true) => "warn",
        (true, false) => "debug",
        (false, false) => "info",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
            Ok(None)
        }
        None if interactive => {
            let held: StderrLog = HeldLog::new(io::stderr as fn() -> io::Stderr);
            builder.with_writer(held.clone()).init();
            Ok(Some(held))
        }
        None => {
            builder.with_writer(io::stderr).init();
            Ok(None)
        }
    }
}

fn controller(config: &Config) -> Result<Controller<HttpPathService>> {
    let service = HttpPathService::new(config)?;
    info!("Using server {} ({})", service.base_url(), config.api.wire_format);
    Ok(Controller::new(service, ResponseParser::new(config.api.wire_format)))
}

/// Start the interactive map
async fn cmd_tui(config: Config) -> Result<()> {
    let controller = controller(&config)?;
    let app = App::new(controller, config);
    tui::run(app).await
}

/// List buildings
async fn cmd_buildings(config: Config, format: String) -> Result<()> {
    let mut controller = controller(&config)?;
    controller.load_buildings().await?;
    let buildings = controller.session().buildings();

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(buildings)?),
        _ => {
            println!("Buildings ({}):\n", buildings.len());
            for building in buildings {
                println!("  {:<8} {}", building.short_name, building.long_name);
            }
        }
    }
    Ok(())
}

/// Resolve and print one route
async fn cmd_route(config: Config, start: String, end: String, format: String) -> Result<()> {
    let mut controller = controller(&config)?;
    controller.load_buildings().await?;
    controller.select_start(&start)?;
    controller.select_end(&end)?;
    controller.find_path().await?;

    let Some(route) = controller.session().route() else {
        anyhow::bail!("no route resolved for {} -> {}", start, end);
    };

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(route)?),
        _ => print_route(&config, route),
    }
    Ok(())
}

fn print_route(config: &Config, route: &Route) {
    let projection = &config.map.projection;

    println!("Route {}\n", route.request);
    if route.path.is_empty() {
        println!("  (no path)");
        return;
    }

    for segment in &route.path.segments {
        let from = projection.project(segment.x1, segment.y1);
        let to = projection.project(segment.x2, segment.y2);
        println!(
            "  {:>3}. ({:.1}, {:.1}) -> ({:.1}, {:.1})   [{:.6}, {:.6}] -> [{:.6}, {:.6}]",
            segment.label,
            segment.x1,
            segment.y1,
            segment.x2,
            segment.y2,
            from.lat,
            from.lon,
            to.lat,
            to.lon,
        );
    }

    println!();
    for (name, waypoint) in ["Start", "End"].iter().zip(&route.path.waypoints) {
        let at = projection.project(waypoint.x, waypoint.y);
        println!("  {:<5} {:<20} [{:.6}, {:.6}]", name, waypoint.label, at.lat, at.lon);
    }

    println!("\nWalking directions:");
    for (i, step) in route.directions.lines().enumerate() {
        println!("  {:>2}. {}", i + 1, step);
    }
}

/// Print the latitude/longitude for a campus coordinate
fn cmd_project(config: Config, x: f64, y: f64) -> Result<()> {
    let at = config.map.projection.project(x, y);
    println!("{:.8}, {:.8}", at.lat, at.lon);
    Ok(())
}

/// Show/edit configuration
fn cmd_config(path: Option<&Path>, config: Config, edit: bool) -> Result<()> {
    let path = path.map(PathBuf::from).unwrap_or_else(Config::default_path);

    if edit {
        if !path.exists() {
            config.save(Some(&path))?;
        }
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());
        std::process::Command::new(&editor).arg(&path).status()?;
        return Ok(());
    }

    println!("Configuration file: {}", path.display());
    println!();
    if path.exists() {
        println!("{}", std::fs::read_to_string(&path)?);
    } else {
        println!("# Default configuration (not yet saved)");
        println!("{}", config.to_toml()?);
    }
    Ok(())
}
