use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use hikemap::api::{MapboxGeocoder, fetch_page};
use hikemap::{Config, QueryService, Resolver, Server, TrailCache, extract_trails};

/// Scrape hiking trails into JSON, geocode them, and serve the result
///
/// Examples:
///   # Re-scrape after the listing page changes
///   hikemap scrape
///
///   # Preview the scrape without touching the cache file
///   hikemap scrape --no_write
///
///   # Print every hike with coordinates
///   MAPBOX_TOKEN=pk.xxx hikemap hikes
///
///   # Serve on all interfaces and keep geocoded coordinates
///   hikemap serve --bind 0.0.0.0:8000 --write-back
#[derive(Parser, Debug)]
#[command(name = "hikemap")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (optional, auto-searches hikemap.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape hikes from the listing page. Re-run if content is updated on site.
    Scrape {
        /// Link to the hikes listing page
        #[arg(long = "hikes_url", visible_alias = "hikes-url")]
        hikes_url: Option<String>,

        /// Output to stdout rather than a file
        #[arg(long = "no_write", visible_alias = "no-write")]
        no_write: bool,

        /// Path to output file (defaults to the configured cache file)
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,
    },

    /// Print all hikes with resolved locations as JSON
    Hikes {
        /// Path to the cache file
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,
    },

    /// Serve {"hikes": [...]} over HTTP
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,

        /// Path to the cache file
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,

        /// Write geocoded coordinates back to the cache file
        #[arg(long)]
        write_back: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Scrape {
            hikes_url,
            no_write,
            file,
        } => scrape(&config, hikes_url, no_write, file),
        Command::Hikes { file } => print_hikes(&config, file),
        Command::Serve {
            bind,
            file,
            write_back,
        } => serve(&config, bind, file, write_back),
    }
}

fn scrape(
    config: &Config,
    hikes_url: Option<String>,
    no_write: bool,
    file: Option<PathBuf>,
) -> Result<()> {
    let url = hikes_url.unwrap_or_else(|| config.hikes_url.clone());

    let spinner = create_spinner("Fetching hikes page...");
    let start = Instant::now();
    let html = fetch_page(&url, &config.user_agent, config.fetch_timeout())?;
    spinner.finish_with_message(format!(
        "Fetched {} ({:.1} KB) [{:.1}s]",
        url,
        html.len() as f64 / 1024.0,
        start.elapsed().as_secs_f32()
    ));

    let trails =
        extract_trails(&html).with_context(|| format!("Failed to extract hikes from {}", url))?;

    if no_write {
        println!("{}", serde_json::to_string_pretty(&trails)?);
        return Ok(());
    }

    let path = file.unwrap_or_else(|| config.cache_file.clone());
    TrailCache::new(&path)
        .store(&trails)
        .context("Failed to write hikes file")?;

    println!("Wrote {} hikes to {}", trails.len(), path.display());
    Ok(())
}

fn print_hikes(config: &Config, file: Option<PathBuf>) -> Result<()> {
    let service = query_service(config, file)?;
    let hikes = service.hikes().context("Failed to load hikes")?;
    println!("{}", serde_json::to_string_pretty(&hikes)?);
    Ok(())
}

fn serve(
    config: &Config,
    bind: Option<String>,
    file: Option<PathBuf>,
    write_back: bool,
) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let service =
        query_service(config, file)?.with_write_back(write_back || config.server.write_back);

    let server = Server::bind(
        &bind,
        service,
        Duration::from_secs(config.server.read_timeout_secs),
    )?;
    server.run()
}

fn query_service(config: &Config, file: Option<PathBuf>) -> Result<QueryService<MapboxGeocoder>> {
    if config.geocoding.token.is_none() {
        tracing::warn!(
            "no geocoding token configured (set {}); place names will not be resolved",
            hikemap::config::TOKEN_ENV
        );
    }

    let geocoder = MapboxGeocoder::new(&config.geocoding, &config.user_agent)
        .context("Failed to set up geocoder")?;
    let cache = TrailCache::new(file.unwrap_or_else(|| config.cache_file.clone()));

    Ok(QueryService::new(cache, Resolver::new(geocoder)))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "hikemap=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
