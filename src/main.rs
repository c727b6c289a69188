use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use claimwatch::api;
use claimwatch::models::{
    build_comparer, AppConfig, CheckOutcome, CheckRecord, ConfigSource, DetectionOverrides,
    MapId, PreprocessOverrides, DEFAULT_CONFIG_FILE,
};
use claimwatch::rendering::{decode_png, encode_rgb_png, optimize_png};
use claimwatch::server;
use claimwatch::services::{
    file_watcher::DEFAULT_DEBOUNCE, DataLayout, MapMonitor, PngBaselineStore, ReportCache,
    ScreenshotWatcher,
};

#[derive(Parser)]
#[command(name = "claimwatch")]
#[command(about = "Detects disappeared land claims in dynmap screenshots")]
struct Cli {
    /// Configuration file (default: $CONFIG_FILE or claimwatch.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two screenshots directly, without touching any baseline
    Compare {
        /// Newer screenshot
        #[arg(long)]
        current: PathBuf,

        /// Older screenshot
        #[arg(long)]
        previous: PathBuf,

        /// Write the findings report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the highlighted current frame as PNG
        #[arg(long)]
        visualization: Option<PathBuf>,

        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Check one screenshot of a map against its baseline
    Check {
        /// Map identifier
        #[arg(short, long)]
        map: String,

        /// Screenshot PNG
        #[arg(short, long)]
        image: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Check the newest screenshot of configured maps
    Run {
        /// Only this map
        #[arg(short, long, conflicts_with = "all_maps")]
        map: Option<String>,

        /// Every configured map (the default)
        #[arg(long)]
        all_maps: bool,

        /// Comma-separated processing order, overriding map_order
        #[arg(long, value_delimiter = ',')]
        map_order: Vec<String>,

        /// Keep going when a map fails
        #[arg(long)]
        continue_on_error: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Watch the screenshots directory and check new captures
    Watch {
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Start the HTTP server
    Serve {
        /// Also watch the screenshots directory
        #[arg(long)]
        watch: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Detection and preprocessing flags, applied on top of the configuration
#[derive(Args, Debug, Default)]
struct SettingsArgs {
    /// Smallest region, in pixels, that is reported
    #[arg(long)]
    min_area: Option<usize>,

    /// Per-channel difference above which a pixel counts as changed
    #[arg(long)]
    threshold: Option<u8>,

    /// Per-channel tolerance for palette matching
    #[arg(long)]
    color_tolerance: Option<u8>,

    /// Percent decrease of a color that flags it (pixel-count mode)
    #[arg(long)]
    percent_threshold: Option<f64>,

    /// Only consider pixels of claim colors
    #[arg(long)]
    focus_on_claims: bool,

    /// Use palette-aware pixel counting instead of blob differencing
    #[arg(long)]
    use_pixel_count: bool,

    /// Flag any decrease, ignoring the percent threshold
    #[arg(long)]
    detect_any_change: bool,

    /// Write per-color mask images
    #[arg(long)]
    debug: bool,

    /// Crop to the red marker border
    #[arg(long)]
    crop: bool,

    /// Posterize to N levels per channel before comparing
    #[arg(long)]
    posterize: Option<u16>,
}

impl SettingsArgs {
    fn detection(&self) -> DetectionOverrides {
        DetectionOverrides {
            min_area: self.min_area,
            pixel_diff_threshold: self.threshold,
            color_tolerance: self.color_tolerance,
            percent_threshold: self.percent_threshold,
            detect_any_change: self.detect_any_change.then_some(true),
            focus_on_claim_colors: self.focus_on_claims.then_some(true),
            use_pixel_count_mode: self.use_pixel_count.then_some(true),
            debug: self.debug.then_some(true),
        }
    }

    fn preprocess(&self) -> PreprocessOverrides {
        PreprocessOverrides {
            crop: self.crop.then_some(true),
            crop_margin: None,
            posterize: self.posterize,
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Claimwatch API",
        description = "Detects disappeared land claims in dynmap screenshots",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_list_maps,
        api::handle_check,
        api::handle_report,
        api::handle_visualization,
    ),
    components(schemas(
        api::MapListResponse,
        api::MapSummary,
        CheckRecord,
        CheckOutcome,
    )),
    tags(
        (name = "Maps", description = "Screenshot checks and results per map")
    )
)]
struct ApiDoc;

/// Exit code for failures; 0 means no changes and 1 means changes found.
const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var("CONFIG_FILE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let result = match cli.command {
        Some(Commands::Compare {
            current,
            previous,
            json,
            visualization,
            settings,
        }) => run_compare_command(
            &config_path,
            &current,
            &previous,
            json.as_deref(),
            visualization.as_deref(),
            &settings,
        ),
        Some(Commands::Check {
            map,
            image,
            settings,
        }) => run_check_command(&config_path, &map, &image, &settings).await,
        Some(Commands::Run {
            map,
            all_maps: _,
            map_order,
            continue_on_error,
            settings,
        }) => {
            run_maps_command(&config_path, map, map_order, continue_on_error, &settings).await
        }
        Some(Commands::Watch { settings }) => run_watch_command(&config_path, &settings).await,
        Some(Commands::Serve { watch, settings }) => {
            run_server(&config_path, watch, &settings).await
        }
        None => {
            run_status_command(&config_path);
            Ok(0)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Minimal logging for one-shot commands
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claimwatch=warn,claim_diff=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Logging for long-running commands
fn init_service_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claimwatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load configuration, letting DATA_DIR override the configured data directory
fn load_config(path: &Path) -> anyhow::Result<(AppConfig, ConfigSource)> {
    let (mut config, source) = AppConfig::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    if let Ok(dir) = std::env::var("DATA_DIR") {
        config.data_dir = Some(PathBuf::from(dir));
    }
    Ok((config, source))
}

fn create_monitor(config: AppConfig, settings: &SettingsArgs) -> Arc<MapMonitor> {
    let layout = DataLayout::new(config.data_dir());
    Arc::new(
        MapMonitor::new(
            Arc::new(config),
            Arc::new(PngBaselineStore::new(layout.baselines_root())),
            Arc::new(ReportCache::new()),
        )
        .with_overrides(settings.detection(), settings.preprocess()),
    )
}

fn print_record(record: &CheckRecord) {
    match record.outcome {
        CheckOutcome::FirstRun => {
            println!("{}: no baseline yet, stored this frame", record.map_id)
        }
        CheckOutcome::Rebaselined => println!(
            "{}: frame size changed to {}x{}, baseline replaced",
            record.map_id, record.dimensions.0, record.dimensions.1
        ),
        CheckOutcome::Compared if record.changes_detected => {
            println!("{}: {} change(s) detected", record.map_id, record.num_changes);
            if let Some(report) = &record.report {
                print_findings(report);
            }
            if let Some(file) = &record.result_file {
                println!("  report: {file}");
            }
        }
        CheckOutcome::Compared => println!("{}: no changes", record.map_id),
    }
    if record.crop_fallback {
        println!("  (border not found, compared uncropped frame)");
    }
}

fn print_findings(report: &claim_diff::Report) {
    for finding in &report.findings {
        let bbox = finding.bounding_box;
        println!(
            "  {} {}: {} px, rows {}..={}, cols {}..={}",
            finding.kind,
            finding.color_name.as_deref().unwrap_or("unclassified"),
            finding.pixel_count,
            bbox.row_min,
            bbox.row_max,
            bbox.col_min,
            bbox.col_max,
        );
    }
}

/// Compare two screenshots (no baseline, no artifacts unless requested)
fn run_compare_command(
    config_path: &Path,
    current: &Path,
    previous: &Path,
    json: Option<&Path>,
    visualization: Option<&Path>,
    settings: &SettingsArgs,
) -> anyhow::Result<u8> {
    init_cli_logging();

    let (config, _) = load_config(config_path)?;
    let detection = settings.detection().apply(&config.detection);
    detection.validate()?;
    let preprocess = settings.preprocess().apply(&config.preprocess);
    let comparer = build_comparer(config.palette(&detection)?, detection, &preprocess)?;

    let load = |path: &Path| -> anyhow::Result<claim_diff::RgbImage> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let image =
            decode_png(&bytes).with_context(|| format!("Failed to decode {}", path.display()))?;
        if preprocess.crop && preprocess.crop_fallback {
            let (image, crop_error) = comparer.preprocess_or_uncropped(&image);
            if let Some(e) = crop_error {
                tracing::warn!(path = %path.display(), error = %e, "Comparing uncropped frame");
            }
            Ok(image)
        } else {
            Ok(comparer.preprocess(&image)?)
        }
    };

    let current_image = load(current)?;
    let previous_image = load(previous)?;
    let comparison = comparer.compare(&current_image, &previous_image)?;

    if comparison.has_findings() {
        println!("{} change(s) detected", comparison.findings.len());
        print_findings(&comparison.report);
    } else {
        println!("No changes");
    }

    if let Some(path) = json {
        std::fs::write(path, serde_json::to_vec_pretty(&comparison.report)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(path) = visualization {
        let png_bytes = optimize_png(encode_rgb_png(&comparison.visualization)?);
        std::fs::write(path, png_bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(u8::from(comparison.has_findings()))
}

/// Check one screenshot against the map's baseline
async fn run_check_command(
    config_path: &Path,
    map: &str,
    image: &Path,
    settings: &SettingsArgs,
) -> anyhow::Result<u8> {
    init_cli_logging();

    let map_id = MapId::parse(map)?;
    let (config, _) = load_config(config_path)?;
    let monitor = create_monitor(config, settings);

    let record = monitor.check_file(&map_id, image).await?;
    print_record(&record);
    Ok(record.exit_code())
}

/// Check the newest screenshot of each selected map, in order
async fn run_maps_command(
    config_path: &Path,
    map: Option<String>,
    map_order: Vec<String>,
    continue_on_error: bool,
    settings: &SettingsArgs,
) -> anyhow::Result<u8> {
    init_cli_logging();

    let (config, _) = load_config(config_path)?;
    let ids: Vec<MapId> = match map {
        Some(map) => vec![MapId::parse(map)?],
        None if !map_order.is_empty() => {
            let mut ids = map_order
                .into_iter()
                .map(MapId::parse)
                .collect::<Result<Vec<_>, _>>()?;
            for id in config.ordered_map_ids() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            ids
        }
        None => config.ordered_map_ids(),
    };

    if ids.is_empty() {
        anyhow::bail!("No maps configured; add maps to the configuration or pass --map");
    }

    let monitor = create_monitor(config, settings);
    let mut changed = false;
    let mut failed = 0usize;

    for id in &ids {
        match monitor.check_latest(id).await {
            Ok(record) => {
                print_record(&record);
                changed |= record.changes_detected;
            }
            Err(e) if continue_on_error => {
                tracing::error!(map_id = %id, error = %e, "Check failed");
                eprintln!("{id}: {e}");
                failed += 1;
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("Check of map '{id}' failed")))
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} map(s) failed", ids.len());
        return Ok(EXIT_FAILURE);
    }
    Ok(u8::from(changed))
}

/// Check every screenshot the watcher reports until the channel closes
async fn watch_loop(monitor: Arc<MapMonitor>, watcher: ScreenshotWatcher) {
    let mut events = watcher.subscribe();
    loop {
        match events.recv().await {
            Ok(event) => match monitor.check_file(&event.map_id, &event.path).await {
                Ok(record) => print_record(&record),
                Err(e) => {
                    tracing::error!(map_id = %event.map_id, path = %event.path.display(), error = %e, "Check failed")
                }
            },
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Watcher fell behind, some screenshots were skipped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn start_watcher(layout: &DataLayout) -> anyhow::Result<ScreenshotWatcher> {
    let root = layout.screenshots_root();
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create {}", root.display()))?;
    Ok(ScreenshotWatcher::new(&root, DEFAULT_DEBOUNCE)?)
}

/// Watch the screenshots directory until interrupted
async fn run_watch_command(config_path: &Path, settings: &SettingsArgs) -> anyhow::Result<u8> {
    init_service_logging();

    let (config, source) = load_config(config_path)?;
    tracing::info!(config = %source, data_dir = %config.data_dir().display(), "Starting watcher");

    let monitor = create_monitor(config, settings);
    let watcher = start_watcher(monitor.layout())?;

    tokio::select! {
        _ = watch_loop(monitor, watcher) => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted, stopping watcher"),
    }
    Ok(0)
}

/// Run the HTTP server
async fn run_server(config_path: &Path, watch: bool, settings: &SettingsArgs) -> anyhow::Result<u8> {
    init_service_logging();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let (config, source) = load_config(config_path)?;
    let layout = DataLayout::new(config.data_dir());

    tracing::info!(
        config = %source,
        data_dir = %layout.root().display(),
        maps = config.maps.len(),
        "Configuration loaded"
    );

    let state = server::create_app_state_with_overrides(
        Arc::new(config),
        settings.detection(),
        settings.preprocess(),
    );

    if watch {
        let watcher = start_watcher(&layout)?;
        tokio::spawn(watch_loop(state.monitor.clone(), watcher));
    }

    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Change artifacts (production only)
        .nest_service("/artifacts", ServeDir::new(layout.disappearances_root()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Claimwatch server listening");

    axum::serve(listener, app).await?;

    Ok(0)
}

/// Display status and configuration information
fn run_status_command(config_path: &Path) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let data_dir_env = std::env::var("DATA_DIR").ok();

    println!("Claimwatch v{VERSION}");
    println!("Detects disappeared land claims in dynmap screenshots\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  DATA_DIR    = {}",
        data_dir_env.as_deref().unwrap_or("(not set)")
    );
    println!("  CONFIG_FILE = {}", config_path.display());

    println!("\nConfiguration:");
    match AppConfig::load(config_path) {
        Ok((mut config, source)) => {
            if let Some(dir) = data_dir_env {
                config.data_dir = Some(PathBuf::from(dir));
            }
            let layout = DataLayout::new(config.data_dir());
            let baselines = PngBaselineStore::new(layout.baselines_root());

            println!("  Source:    {source}");
            println!("  Data dir:  {}", layout.root().display());
            println!(
                "  Mode:      {}",
                if config.detection.use_pixel_count_mode {
                    "pixel count"
                } else {
                    "blob difference"
                }
            );

            let ids = config.ordered_map_ids();
            if ids.is_empty() {
                println!("  Maps:      (none configured)");
            } else {
                println!("  Maps:");
                for id in ids {
                    let baseline = if baselines.path_for(&id).exists() {
                        "baseline stored"
                    } else {
                        "no baseline"
                    };
                    let map = config.maps.get(&id);
                    let location = match map.map(|m| (m.x, m.z, m.zoom_out)) {
                        Some((Some(x), Some(z), zoom)) => {
                            format!("  x={x} z={z} zoom_out={}", zoom.unwrap_or(0))
                        }
                        _ => String::new(),
                    };
                    let url = map.and_then(|m| m.url.as_deref()).unwrap_or("");
                    println!("    {id:<16} {baseline:<16}{location}  {url}");
                }
            }
        }
        Err(e) => println!("  Error: {e}"),
    }

    println!("\nCommands:");
    println!("  claimwatch compare   Compare two screenshots");
    println!("  claimwatch check     Check one screenshot against a map baseline");
    println!("  claimwatch run       Check the newest screenshot of each map");
    println!("  claimwatch watch     Check screenshots as they arrive");
    println!("  claimwatch serve     Start the HTTP server");
    println!("\nRun 'claimwatch --help' for more details.");
}
