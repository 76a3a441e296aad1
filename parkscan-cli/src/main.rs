//! parkscan CLI - capture a viewport and detect parking spaces.
//!
//! This binary drives the parkscan library: it plans a tile grid over the
//! requested viewport, fetches satellite imagery, runs detection, and prints
//! the resulting markers as JSON. Annotated tile images can optionally be
//! exported to disk.

mod error;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use parkscan::aggregate::CaptureSession;
use parkscan::config::CaptureConfig;
use parkscan::coord::{GeoPoint, Viewport};
use parkscan::detect::{from_data_uri, HttpDetector};
use parkscan::grid::TileSize;
use parkscan::http::AsyncReqwestClient;
use parkscan::provider::{ProviderConfig, ProviderFactory};
use parkscan::reproject::Projection;

use error::CliError;

/// Default detection service endpoint.
const DEFAULT_DETECT_URL: &str = "http://127.0.0.1:5000/process-image";

/// Imagery provider selection for CLI arguments.
#[derive(Debug, Clone, ValueEnum, PartialEq)]
enum ProviderType {
    /// Azure Maps static imagery (requires subscription key)
    Azure,
    /// Google Maps Static API satellite imagery (requires API key)
    Google,
}

impl ProviderType {
    /// Convert to a ProviderConfig, requiring the matching key.
    fn to_config(&self, api_key: Option<String>) -> Result<ProviderConfig, CliError> {
        let key = api_key.ok_or_else(|| {
            CliError::Config(format!(
                "the {} provider requires an API key; pass --api-key",
                match self {
                    ProviderType::Azure => "Azure Maps",
                    ProviderType::Google => "Google Maps",
                }
            ))
        })?;
        Ok(match self {
            ProviderType::Azure => ProviderConfig::azure(key),
            ProviderType::Google => ProviderConfig::google(key),
        })
    }
}

/// Reprojection strategy selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProjectionType {
    /// Linear interpolation across the viewport box (default)
    Linear,
    /// Mercator-correct interpolation
    Mercator,
}

impl From<ProjectionType> for Projection {
    fn from(p: ProjectionType) -> Self {
        match p {
            ProjectionType::Linear => Projection::Linear,
            ProjectionType::Mercator => Projection::Mercator,
        }
    }
}

/// Detect parking spaces in satellite imagery of a geographic viewport.
#[derive(Debug, Parser)]
#[command(name = "parkscan", version, about)]
struct Cli {
    /// Northeast corner latitude
    #[arg(long)]
    ne_lat: f64,

    /// Northeast corner longitude
    #[arg(long)]
    ne_lon: f64,

    /// Southwest corner latitude
    #[arg(long)]
    sw_lat: f64,

    /// Southwest corner longitude
    #[arg(long)]
    sw_lon: f64,

    /// Map zoom level
    #[arg(long, default_value_t = 18)]
    zoom: u8,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 1280)]
    height: u32,

    /// Imagery provider
    #[arg(long, value_enum, default_value_t = ProviderType::Azure)]
    provider: ProviderType,

    /// API key for the selected provider
    #[arg(long, env = "PARKSCAN_API_KEY")]
    api_key: Option<String>,

    /// Detection service endpoint
    #[arg(long, default_value = DEFAULT_DETECT_URL)]
    detect_url: String,

    /// Target tile edge length in pixels
    #[arg(long, default_value_t = parkscan::grid::DEFAULT_TILE_EDGE)]
    tile_size: u32,

    /// Maximum number of tiles processed in parallel
    #[arg(long, default_value_t = parkscan::config::DEFAULT_MAX_CONCURRENT_TILES)]
    parallel: usize,

    /// Reprojection strategy
    #[arg(long, value_enum, default_value_t = ProjectionType::Linear)]
    projection: ProjectionType,

    /// Directory to export annotated tile images into
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let viewport = Viewport::new(
        GeoPoint::new(cli.ne_lat, cli.ne_lon),
        GeoPoint::new(cli.sw_lat, cli.sw_lon),
        cli.zoom,
        cli.width,
        cli.height,
    );

    let provider_config = cli.provider.to_config(cli.api_key)?;
    tracing::info!(
        provider = provider_config.name(),
        detect_url = %cli.detect_url,
        "starting capture"
    );

    let http_client = AsyncReqwestClient::new()?;
    let provider = ProviderFactory::new(http_client.clone()).create(&provider_config);
    let detector = HttpDetector::new(http_client, cli.detect_url.clone());

    let config = CaptureConfig::new()
        .with_tile_size(TileSize::square(cli.tile_size))
        .with_max_concurrent_tiles(cli.parallel)
        .with_projection(cli.projection.into());

    println!("parkscan v{}", env!("CARGO_PKG_VERSION"));
    println!("==================");
    println!();
    println!("Viewport:  ({}, {}) .. ({}, {})", cli.sw_lat, cli.sw_lon, cli.ne_lat, cli.ne_lon);
    println!("Zoom:      {}", cli.zoom);
    println!("Provider:  {}", provider_config.name());
    println!("Detector:  {}", cli.detect_url);
    println!();

    let session = CaptureSession::new(provider, detector, config);
    let summary = session.run(viewport).await?;

    println!(
        "Tiles: {} succeeded, {} failed of {}",
        summary.tiles_succeeded, summary.tiles_failed, summary.tiles_total
    );
    for failure in &summary.failures {
        println!("  {}", failure);
    }
    if summary.markers_rejected > 0 {
        println!("Markers dropped out of range: {}", summary.markers_rejected);
    }
    println!();

    let state = session.state();
    let markers: Vec<serde_json::Value> = state
        .markers
        .iter()
        .map(|m| serde_json::json!({ "lat": m.lat, "lon": m.lon }))
        .collect();
    println!("{}", serde_json::json!({ "markers": markers }));

    if let Some(dir) = cli.export_dir {
        let written = export_artifacts(&dir, &state)?;
        println!();
        println!("Exported {} images to {}", written, dir.display());
    }

    Ok(())
}

/// Write each tile's annotated and incoming images as PNG files.
///
/// Returns the number of files written. Artifacts with missing or
/// undecodable payloads are skipped.
fn export_artifacts(
    dir: &std::path::Path,
    state: &parkscan::AggregateState,
) -> Result<usize, CliError> {
    std::fs::create_dir_all(dir)?;

    let mut written = 0;
    for (tile_id, artifacts) in &state.images {
        let pairs = [
            ("annotated", artifacts.annotated.as_deref()),
            ("incoming", artifacts.incoming.as_deref()),
        ];
        for (kind, uri) in pairs {
            let Some(bytes) = uri.and_then(from_data_uri) else {
                continue;
            };
            let path = dir.join(format!("tile-{}-{}.png", tile_id, kind));
            std::fs::write(&path, bytes)?;
            written += 1;
        }
    }

    Ok(written)
}
