//! cinepulse - movie search, details and favorites CLI.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cinepulse_api::{LocalMovieProvider, Movie, MovieDetail, Provider, load_listing};
use cinepulse_db::FavoritesStore;
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{API_KEY_ENV, AppConfig, resolve_config_path};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search movies by title. An empty query lists popular movies.
    Search(SearchArgs),
    /// List popular movies.
    Popular,
    /// Show full details for one movie.
    Details(IdArgs),
    /// Manage favorite movies.
    Favorites(FavoritesCommand),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "batman").
    #[arg(long, required = true, allow_hyphen_values = true)]
    query: String,
}

/// Arguments carrying a single movie ID.
#[derive(clap::Args)]
struct IdArgs {
    /// Provider movie ID (IMDb ID for OMDb, numeric ID for TMDB).
    #[arg(long, required = true)]
    id: String,
}

/// Arguments for the `favorites` subcommand.
#[derive(clap::Args)]
struct FavoritesCommand {
    /// Favorites subcommand to run.
    #[command(subcommand)]
    command: FavoritesSubcommands,
}

/// Available favorites subcommands.
#[derive(Subcommand)]
enum FavoritesSubcommands {
    /// List favorite movies.
    List,
    /// Check whether a movie is a favorite.
    Check(IdArgs),
    /// Add a movie to favorites, or remove it if already present.
    Toggle(IdArgs),
}

/// Loads the config for `dir`.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or parsed.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Builds the configured provider.
///
/// # Errors
///
/// Returns an error if the client fails to build.
#[instrument(skip_all)]
fn build_provider(config: &AppConfig) -> Result<Provider> {
    let settings = config.provider_settings();
    if settings.api_key.is_empty() {
        tracing::warn!(
            "no API key configured; set provider.api_key or {}",
            API_KEY_ENV
        );
    }
    Provider::from_settings(&settings).context("failed to build movie provider")
}

/// Opens the favorites store for `dir`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
fn open_store(config: &AppConfig, dir: Option<&PathBuf>) -> Result<FavoritesStore> {
    FavoritesStore::open(dir, config.favorites.on_corrupt).context("failed to open favorites store")
}

/// Logs one listing row.
fn log_movie(movie: &Movie) {
    tracing::info!(
        "{}\t{:.1}\t{}\t{}",
        movie.id,
        movie.rating,
        movie.duration,
        movie.title
    );
}

/// Logs a list of movies under a heading.
fn log_movies(heading: &str, movies: &[Movie]) {
    tracing::info!("{heading} ({})", movies.len());
    tracing::info!("ID\tRating\tMinutes\tTitle");
    for movie in movies {
        log_movie(movie);
    }
}

/// Logs a full detail record.
fn log_detail(detail: &MovieDetail) {
    tracing::info!("{} ({})", detail.title, detail.id);
    tracing::info!("Rating:   {:.1}", detail.rating);
    tracing::info!("Minutes:  {}", detail.duration);
    if !detail.genres.is_empty() {
        tracing::info!("Genres:   {}", detail.genres.join(", "));
    }
    if !detail.cast.is_empty() {
        tracing::info!("Cast:     {}", detail.cast.join(", "));
    }
    if let Some(ref url) = detail.poster_url {
        tracing::info!("Poster:   {url}");
    }
    if let Some(ref url) = detail.trailer_url {
        tracing::info!("Trailer:  {url}");
    }
    if let Some(ref plot) = detail.plot {
        tracing::info!("Plot:     {plot}");
    }
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the provider fails to build or the request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let provider = build_provider(&config)?;

    let (heading, movies) = load_listing(&provider, &args.query)
        .await
        .context("movie search failed")?;

    log_movies(&heading, &movies);
    Ok(())
}

/// Runs the `popular` subcommand.
///
/// # Errors
///
/// Returns an error if the provider fails to build or the request fails.
#[instrument(skip_all)]
async fn run_popular(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let provider = build_provider(&config)?;

    let movies = provider
        .fetch_popular()
        .await
        .context("popular listing request failed")?;

    log_movies(cinepulse_api::provider::POPULAR_TITLE, &movies);
    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the provider fails to build or the request fails.
#[instrument(skip_all)]
async fn run_details(args: &IdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let provider = build_provider(&config)?;

    let detail = provider
        .fetch_details(&args.id)
        .await
        .context("details request failed")?;

    log_detail(&detail);
    Ok(())
}

/// Runs the `favorites list` subcommand.
///
/// # Errors
///
/// Returns an error if config or DB setup fails.
#[instrument(skip_all)]
fn run_favorites_list(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = open_store(&config, dir)?;

    let mut favorites = store.all_favorites();
    if favorites.is_empty() {
        tracing::info!("No favorites yet. Run `favorites toggle --id <ID>` to add one.");
        return Ok(());
    }

    favorites.sort_by(|a, b| a.title.cmp(&b.title));
    log_movies("Favorites", &favorites);
    Ok(())
}

/// Runs the `favorites check` subcommand.
///
/// # Errors
///
/// Returns an error if config or DB setup fails.
#[instrument(skip_all)]
fn run_favorites_check(args: &IdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = open_store(&config, dir)?;

    if store.is_favorite(&args.id) {
        tracing::info!("{} is a favorite", args.id);
    } else {
        tracing::info!("{} is not a favorite", args.id);
    }
    Ok(())
}

/// Runs the `favorites toggle` subcommand.
///
/// Removing uses the stored summary and never touches the network. Adding
/// fetches the movie first so the stored summary is complete.
///
/// # Errors
///
/// Returns an error if setup fails or, when adding, the details request fails.
#[instrument(skip_all)]
async fn run_favorites_toggle(args: &IdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = open_store(&config, dir)?;

    let stored = store
        .all_favorites()
        .into_iter()
        .find(|movie| movie.id == args.id);
    let movie = match stored {
        Some(movie) => movie,
        None => {
            let provider = build_provider(&config)?;
            provider
                .fetch_details(&args.id)
                .await
                .context("details request failed")?
                .summary()
        }
    };

    if store.toggle_favorite(&movie) {
        tracing::info!("Added {} ({}) to favorites", movie.title, movie.id);
    } else {
        tracing::info!("Removed {} ({}) from favorites", movie.title, movie.id);
    }
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

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

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Search(args) => run_search(&args, dir).await,
        Commands::Popular => run_popular(dir).await,
        Commands::Details(args) => run_details(&args, dir).await,
        Commands::Favorites(fav) => match fav.command {
            FavoritesSubcommands::List => run_favorites_list(dir),
            FavoritesSubcommands::Check(args) => run_favorites_check(&args, dir),
            FavoritesSubcommands::Toggle(args) => run_favorites_toggle(&args, dir).await,
        },
    }
}
