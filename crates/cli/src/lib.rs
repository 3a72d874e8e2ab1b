use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use doc_model::content_path;
use docpreview_client::{DirBackend, Driver, HttpBackend, PreviewBackend, RequestStats};
use log::{debug, info};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use storage::{ConfigStore, ViewerConfig};
use viewer_core::{FullscreenIcon, ToolbarState, ViewerEvent, ViewerOptions, Viewport};

/// Content id used when reading a downloaded preview without `--content`.
const LOCAL_CONTENT_ID: &str = "local";

#[derive(Debug, Parser)]
#[command(name = "docpreview-cli")]
#[command(about = "Headless document preview pager")]
pub struct Cli {
    /// Directory holding config.json instead of the platform config dir.
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the content metadata as JSON.
    Info {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Page through a document and print where the viewer ended up.
    View {
        #[command(flatten)]
        source: SourceArgs,
        /// Jump to this page once the first pages are in.
        #[arg(long)]
        page: Option<u32>,
        #[arg(long, value_name = "STEPS", default_value_t = 0)]
        zoom_in: u32,
        #[arg(long, value_name = "STEPS", default_value_t = 0)]
        zoom_out: u32,
        #[arg(long)]
        fullscreen: bool,
        #[arg(long, value_name = "WxH", value_parser = parse_viewport)]
        viewport: Option<Viewport>,
    },
    /// Show the stored configuration, updating it with any given values.
    Config {
        #[arg(long, value_name = "URL")]
        server: Option<String>,
        #[arg(long, value_name = "WxH", value_parser = parse_viewport)]
        viewport: Option<Viewport>,
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Read a downloaded preview from this directory.
    #[arg(long, value_name = "DIR", conflicts_with = "server")]
    dir: Option<PathBuf>,
    /// Base url of the content REST API.
    #[arg(long, value_name = "URL")]
    server: Option<String>,
    #[arg(long, value_name = "ID")]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    css_scope_class: Option<String>,
    id: String,
    latest_revision_id: String,
    page_count: u32,
    signed: bool,
}

#[derive(Debug, Serialize)]
struct ViewReport {
    content_id: String,
    page_count: u32,
    loaded_pages: Vec<u32>,
    failed_pages: Vec<u32>,
    current_page: u32,
    zoom: f32,
    scroll_top: f32,
    scroll_height: f32,
    toolbar: ToolbarOutput,
    requests: RequestStats,
}

#[derive(Debug, Serialize)]
struct ToolbarOutput {
    page_number: u32,
    page_count: u32,
    zoom_in_enabled: bool,
    zoom_out_enabled: bool,
    prev_enabled: bool,
    next_enabled: bool,
    fullscreen_visible: bool,
    fullscreen_icon: &'static str,
    preloading: bool,
}

impl From<ToolbarState> for ToolbarOutput {
    fn from(state: ToolbarState) -> Self {
        Self {
            page_number: state.page_number,
            page_count: state.page_count,
            zoom_in_enabled: state.zoom_in_enabled,
            zoom_out_enabled: state.zoom_out_enabled,
            prev_enabled: state.prev_enabled,
            next_enabled: state.next_enabled,
            fullscreen_visible: state.fullscreen_visible,
            fullscreen_icon: match state.fullscreen_icon {
                FullscreenIcon::Expand => "expand",
                FullscreenIcon::Compress => "compress",
            },
            preloading: state.preloading,
        }
    }
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let config_dir = cli.config_dir.as_deref();

    match cli.command {
        Commands::Info { source } => run_info(&source, &load_config(config_dir)?),
        Commands::View { source, page, zoom_in, zoom_out, fullscreen, viewport } => {
            let mut config = load_config(config_dir)?;
            if let Some(viewport) = viewport {
                config.viewport_width = viewport.width;
                config.viewport_height = viewport.height;
            }
            let steps = ViewSteps { page, zoom_in, zoom_out, fullscreen };
            run_view(&source, &config, steps)
        }
        Commands::Config { server, viewport, timeout } => {
            run_config(config_dir, server, viewport, timeout)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn config_store(config_dir: Option<&Path>) -> Result<ConfigStore> {
    match config_dir {
        Some(dir) => Ok(ConfigStore::with_root(dir)),
        None => ConfigStore::from_default_project().context("failed to locate config directory"),
    }
}

fn load_config(config_dir: Option<&Path>) -> Result<ViewerConfig> {
    let store = match config_store(config_dir) {
        Ok(store) => store,
        Err(error) if config_dir.is_none() => {
            debug!("{error:#}, using default config");
            return Ok(ViewerConfig::default());
        }
        Err(error) => return Err(error),
    };

    store
        .load()
        .with_context(|| format!("failed to read config from {}", store.config_path().display()))
}

fn open_backend(
    source: &SourceArgs,
    config: &ViewerConfig,
) -> Result<(Box<dyn PreviewBackend>, String)> {
    if let Some(dir) = &source.dir {
        let backend = DirBackend::new(dir)?;
        let content_id = source.content.clone().unwrap_or_else(|| LOCAL_CONTENT_ID.to_owned());
        return Ok((Box::new(backend), content_id));
    }

    let Some(server) = source.server.as_deref().or(config.server.as_deref()) else {
        anyhow::bail!(
            "either --dir or --server is required (or set a server with `config --server`)"
        );
    };
    let Some(content_id) = source.content.clone() else {
        anyhow::bail!("--content is required when reading from a server");
    };

    let backend = HttpBackend::new(server, config.request_timeout())?;
    info!("using server {}", backend.base());
    Ok((Box::new(backend), content_id))
}

fn run_info(source: &SourceArgs, config: &ViewerConfig) -> Result<()> {
    let (mut backend, content_id) = open_backend(source, config)?;

    let metadata = backend
        .fetch_metadata(&content_path(&content_id))
        .with_context(|| format!("failed to load metadata for {content_id}"))?;
    metadata.validate()?;

    let payload = InfoOutput {
        css_scope_class: metadata.previews.css_scope_class.clone(),
        id: metadata.id.clone(),
        latest_revision_id: metadata.latest_revision_id.clone(),
        page_count: metadata.page_count(),
        signed: !metadata.signature.is_empty(),
    };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");
    Ok(())
}

struct ViewSteps {
    page: Option<u32>,
    zoom_in: u32,
    zoom_out: u32,
    fullscreen: bool,
}

fn run_view(source: &SourceArgs, config: &ViewerConfig, steps: ViewSteps) -> Result<()> {
    let (backend, content_id) = open_backend(source, config)?;

    let options = ViewerOptions {
        viewport: Viewport { width: config.viewport_width, height: config.viewport_height },
        placeholder_height: config.placeholder_height,
        scroll_throttle: config.scroll_throttle(),
        ..ViewerOptions::default()
    };

    let mut driver = Driver::open(backend, &content_id, options)
        .with_context(|| format!("failed to open {content_id}"))?;
    let mut events = driver.run_until_idle()?;

    if steps.fullscreen {
        driver.viewer_mut().toggle_fullscreen();
        events.extend(driver.run_until_idle()?);
    }

    if let Some(page) = steps.page {
        let page_count = driver.viewer().page_count();
        if !driver.viewer_mut().goto_page(page) {
            anyhow::bail!("page {page} is out of range (document has {page_count} pages)");
        }
        events.extend(driver.run_until_idle()?);
    }

    for _ in 0..steps.zoom_in {
        driver.viewer_mut().zoom_in();
        events.extend(driver.run_until_idle()?);
    }
    for _ in 0..steps.zoom_out {
        driver.viewer_mut().zoom_out();
        events.extend(driver.run_until_idle()?);
    }

    let viewer = driver.viewer();
    let failed_pages = still_failed(&events, &viewer.pages().loaded_pages());
    let report = ViewReport {
        content_id: viewer.metadata().id.clone(),
        page_count: viewer.page_count(),
        loaded_pages: viewer.pages().loaded_pages(),
        failed_pages,
        current_page: viewer.current_page(),
        zoom: viewer.zoom().factor(),
        scroll_top: viewer.scroll_top(),
        scroll_height: viewer.scroll_height(),
        toolbar: viewer.toolbar().into(),
        requests: driver.stats(),
    };

    let json = serde_json::to_string_pretty(&report)?;
    println!("{json}");
    Ok(())
}

fn run_config(
    config_dir: Option<&Path>,
    server: Option<String>,
    viewport: Option<Viewport>,
    timeout: Option<u64>,
) -> Result<()> {
    let store = config_store(config_dir)?;
    let mut config = store
        .load()
        .with_context(|| format!("failed to read config from {}", store.config_path().display()))?;

    let changed = server.is_some() || viewport.is_some() || timeout.is_some();
    if let Some(server) = server {
        url::Url::parse(&server).with_context(|| format!("invalid server url: {server}"))?;
        config.server = Some(server);
    }
    if let Some(viewport) = viewport {
        config.viewport_width = viewport.width;
        config.viewport_height = viewport.height;
    }
    if let Some(timeout) = timeout {
        config.request_timeout_secs = timeout;
    }

    if changed {
        let path = store.config_path();
        store
            .save(&config)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
    }

    let json = serde_json::to_string_pretty(&config)?;
    println!("{json}");
    Ok(())
}

/// Pages that failed at some point and are not loaded now, ascending.
fn still_failed(events: &[ViewerEvent], loaded_pages: &[u32]) -> Vec<u32> {
    let mut failed: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            ViewerEvent::PageFailed { page, .. } => Some(*page),
            _ => None,
        })
        .filter(|page| !loaded_pages.contains(page))
        .collect();
    failed.sort_unstable();
    failed.dedup();
    failed
}

fn parse_viewport(value: &str) -> Result<Viewport, String> {
    let (width, height) =
        value.split_once(['x', 'X']).ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value}"))?;

    let parse = |part: &str| match part.trim().parse::<f32>() {
        Ok(size) if size.is_finite() && size > 0.0 => Ok(size),
        _ => Err(format!("invalid viewport size: {value}")),
    };

    Ok(Viewport { width: parse(width)?, height: parse(height)? })
}
