//! marquee - terminal movie browser for TMDB.

/// Startup sequence for the interactive browser.
mod bootstrap;
/// Application configuration (TOML).
mod config;
#[cfg(test)]
mod fake_api;
/// Terminal UI components.
mod tui;

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{API_KEY_ENV, AppConfig, resolve_config_dir, resolve_config_path};
use crate::tui::detail::{render_similar, render_trailer};
use crate::tui::list::ListSettings;
use marquee_api::tmdb::{LocalMovieApi, MoviePage, SearchMovieParams, TmdbClient};

/// Log file written while the TUI owns the terminal.
const LOG_FILE_NAME: &str = "marquee.log";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse now-playing movies and search interactively (TUI).
    Browse,
    /// List movies now playing in theaters.
    NowPlaying(PageArgs),
    /// Search movies by title.
    Search(SearchArgs),
    /// List movie genres.
    Genres,
    /// Show the image configuration.
    Configuration,
    /// Show movie details.
    Details(MovieIdArgs),
    /// List user reviews for a movie.
    Reviews(MovieIdArgs),
    /// List videos (trailers, teasers) for a movie.
    Videos(MovieIdArgs),
    /// List movies similar to a movie.
    Similar(MovieIdArgs),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Arguments for paginated listings.
#[derive(clap::Args)]
struct PageArgs {
    /// Result page (starting at 1).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (movie title).
    #[arg(long)]
    query: String,

    /// Result page (starting at 1).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

/// Arguments for per-movie subcommands.
#[derive(clap::Args)]
struct MovieIdArgs {
    /// TMDB movie ID.
    #[arg(long)]
    id: u64,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write a config file with default settings.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration (API key redacted).
    Show,
}

/// Loads the config file under `dir` (or the default config directory).
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or the file is invalid.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Builds a `TmdbClient` from config, with `TMDB_API_KEY` overriding the stored key.
///
/// # Errors
///
/// Returns an error if no API key is available or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &AppConfig) -> Result<TmdbClient> {
    let api_key = config.resolve_api_key(std::env::var(API_KEY_ENV).ok())?;

    let mut builder = TmdbClient::builder()
        .api_key(api_key)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(config.browser.request_timeout());
    if let Some(base_url) = config.base_url()? {
        builder = builder.base_url(base_url);
    }
    builder.build().context("failed to build TMDB client")
}

/// Prints one page of a movie listing.
fn print_movie_page(response: &MoviePage) {
    tracing::info!(
        "Page {}/{} ({} results)",
        response.page,
        response.total_pages,
        response.total_results
    );
    tracing::info!("ID\tTitle\t\t\tReleaseDate\tRating");
    for movie in &response.results {
        tracing::info!(
            "{}\t{}\t{}\t{:.1}",
            movie.id,
            movie.title,
            movie
                .release_date
                .map_or_else(|| String::from("-"), |d| d.to_string()),
            movie.vote_average,
        );
    }
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built, startup data fails to
/// load, or the terminal fails.
#[instrument(skip_all)]
async fn run_browse(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config)?;
    let settings = ListSettings::from(&config.browser);
    bootstrap::run(Arc::new(client), settings).await
}

/// Runs the `now-playing` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_now_playing(args: &PageArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(&load_config(dir)?)?;

    let response = client
        .now_playing(args.page)
        .await
        .context("TMDB movie/now_playing request failed")?;

    print_movie_page(&response);
    Ok(())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    if args.query.trim().is_empty() {
        bail!("--query must not be empty");
    }
    let client = build_tmdb_client(&load_config(dir)?)?;

    let params = SearchMovieParams::new(args.query.as_str()).page(args.page);
    let response = client
        .search_movie(&params)
        .await
        .context("TMDB search/movie request failed")?;

    print_movie_page(&response);
    Ok(())
}

/// Runs the `genres` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_genres(dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(&load_config(dir)?)?;

    let response = client
        .genres()
        .await
        .context("TMDB genre/movie/list request failed")?;

    tracing::info!("ID\tName");
    for genre in &response.genres {
        tracing::info!("{}\t{}", genre.id, genre.name);
    }
    tracing::info!("Total: {} genres", response.genres.len());
    Ok(())
}

/// Runs the `configuration` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_configuration(dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(&load_config(dir)?)?;

    let response = client
        .configuration()
        .await
        .context("TMDB configuration request failed")?;

    tracing::info!("Base URL: {}", response.images.base_url);
    tracing::info!("Secure Base URL: {}", response.images.secure_base_url);
    tracing::info!("Poster Sizes: {}", response.images.poster_sizes.join(", "));
    tracing::info!(
        "List Poster Size: {}",
        response.list_poster_size().unwrap_or("-")
    );
    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_details(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(&load_config(dir)?)?;

    let details = client
        .movie_details(args.id)
        .await
        .context("TMDB movie details request failed")?;

    let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
    tracing::info!("ID: {}", details.id);
    tracing::info!("Title: {}", details.title);
    tracing::info!("Tagline: {}", details.tagline.as_deref().unwrap_or("-"));
    tracing::info!(
        "Release Date: {}",
        details
            .release_date
            .map_or_else(|| String::from("-"), |d| d.to_string())
    );
    tracing::info!(
        "Runtime: {}",
        details
            .runtime
            .map_or_else(|| String::from("-"), |m| format!("{m} min"))
    );
    tracing::info!("Status: {}", details.status.as_deref().unwrap_or("-"));
    tracing::info!("Genres: {}", genres.join(", "));
    tracing::info!("Rating: {:.1}", details.vote_average);
    tracing::info!("Homepage: {}", details.homepage.as_deref().unwrap_or("-"));
    tracing::info!("Overview: {}", details.overview.as_deref().unwrap_or("-"));
    Ok(())
}

/// Runs the `reviews` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_reviews(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(&load_config(dir)?)?;

    let response = client
        .movie_reviews(args.id)
        .await
        .context("TMDB movie reviews request failed")?;

    tracing::info!("Total reviews: {}", response.total_results);
    for review in &response.results {
        tracing::info!("by {}: {}", review.author, review.url.as_deref().unwrap_or("-"));
    }
    Ok(())
}

/// Runs the `videos` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_videos(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(&load_config(dir)?)?;

    let response = client
        .movie_videos(args.id)
        .await
        .context("TMDB movie videos request failed")?;

    tracing::info!("Type\tSite\tKey\t\tName");
    for video in &response.results {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            video.video_type,
            video.site,
            video.key,
            video.name
        );
    }
    match render_trailer(&response.results) {
        Some(trailer) => tracing::info!("Trailer: {} (key {})", trailer.url, trailer.key),
        None => tracing::info!("Trailer: -"),
    }
    Ok(())
}

/// Runs the `similar` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_similar(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(&load_config(dir)?)?;

    let response = client
        .similar_movies(args.id)
        .await
        .context("TMDB similar movies request failed")?;

    print_movie_page(&response);
    if let Some(similar) = render_similar(&response.results) {
        tracing::info!("{}: {}", similar.heading, similar.text);
    }
    Ok(())
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file exists (without `--force`) or cannot be written.
#[instrument(skip_all)]
fn run_config_init(force: bool, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    if config_path.exists() && !force {
        bail!(
            "config file already exists: {} (use --force to overwrite)",
            config_path.display()
        );
    }
    AppConfig::default()
        .save(&config_path)
        .context("failed to save config")?;
    tracing::info!("Wrote {}", config_path.display());
    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or serialized.
#[instrument(skip_all)]
fn run_config_show(dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let mut config = AppConfig::load(&config_path).context("failed to load config")?;

    if config_path.exists() {
        tracing::info!("Config file: {}", config_path.display());
    } else {
        tracing::info!("Config file: {} (not found, using defaults)", config_path.display());
    }
    if config.api.api_key.is_some() {
        config.api.api_key = Some(String::from("********"));
    }
    let content = toml::to_string_pretty(&config).context("failed to serialize config to TOML")?;
    for line in content.lines() {
        tracing::info!("{line}");
    }
    Ok(())
}

/// Opens the TUI log file in the config directory, creating it if needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
fn open_log_file(dir: Option<&PathBuf>) -> Result<File> {
    let config_dir = resolve_config_dir(dir).context("failed to resolve config directory")?;
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("failed to create directory {}", config_dir.display()))?;
    let path = config_dir.join(LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Initializes tracing. Events go to `log_file` when given, stdout otherwise.
fn init_tracing(log_file: Option<File>) {
    let ansi = log_file.is_none();
    let writer = log_file.map_or_else(
        || BoxMakeWriter::new(std::io::stdout),
        |file| BoxMakeWriter::new(Mutex::new(file)),
    );

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = cli.dir.as_ref();

    let log_file = match cli.command {
        Commands::Browse => Some(open_log_file(dir)?),
        _ => None,
    };
    init_tracing(log_file);

    match &cli.command {
        Commands::Browse => run_browse(dir).await,
        Commands::NowPlaying(args) => run_now_playing(args, dir).await,
        Commands::Search(args) => run_search(args, dir).await,
        Commands::Genres => run_genres(dir).await,
        Commands::Configuration => run_configuration(dir).await,
        Commands::Details(args) => run_details(args, dir).await,
        Commands::Reviews(args) => run_reviews(args, dir).await,
        Commands::Videos(args) => run_videos(args, dir).await,
        Commands::Similar(args) => run_similar(args, dir).await,
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Init { force } => run_config_init(force, dir),
            ConfigSubcommands::Show => run_config_show(dir),
        },
    }
}
