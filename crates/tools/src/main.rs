use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Parser, Subcommand};
use engine::{ConfigError, DIAGNOSTIC, Engine, EngineConfig, EngineEvent, RenderReport};
use foundation::math::great_circle_distance_km;
use layers::{MapSnapshot, Primitive, RecordingMap};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trip::{ItemRef, TripData, ViewMode, load_trip};

#[derive(Parser, Debug)]
#[command(author, version, about = "Render a trip itinerary onto an in-memory map")]
struct Args {
    /// Engine config JSON (region preset, intercontinental rule, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one render pass and print the resulting map state as JSON
    Render {
        /// Trip JSON file
        #[arg(long)]
        trip: PathBuf,

        /// world, region or local
        #[arg(long, default_value = "world")]
        mode: ViewMode,

        /// Focused item: `segment:<id>`, `stay:<index>` or a bare segment id
        #[arg(long)]
        focus: Option<ItemRef>,

        /// Viewport size in pixels, e.g. `1280x720`
        #[arg(long)]
        viewport: Option<String>,

        #[arg(long)]
        pretty: bool,
    },

    /// List segments with distance and intercontinental classification
    Segments {
        #[arg(long)]
        trip: PathBuf,
    },

    /// Print the effective engine config
    Config,
}

#[derive(Serialize)]
struct RenderOutput<'a> {
    pass_index: u64,
    mode: ViewMode,
    diagnostics: Vec<String>,
    render_error: Option<&'a str>,
    groups: Vec<GroupSummary>,
    map: MapSnapshot,
}

#[derive(Serialize)]
struct GroupSummary {
    name: String,
    markers: usize,
    polylines: usize,
}

#[derive(Serialize)]
struct SegmentRow {
    id: String,
    class: &'static str,
    transport: String,
    distance_km: Option<f64>,
    intercontinental: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Render {
            trip,
            mode,
            focus,
            viewport,
            pretty,
        } => {
            let data = load_trip(&trip)?;
            info!(
                path = %trip.display(),
                segments = data.segments.len(),
                stays = data.stays.len(),
                "trip loaded"
            );
            let viewport = viewport.as_deref().map(parse_viewport).transpose()?;
            render(config, data, mode, focus, viewport, pretty)?;
        }
        Command::Segments { trip } => {
            let data = load_trip(&trip)?;
            let rows: Vec<SegmentRow> = data
                .segments
                .iter()
                .map(|s| SegmentRow {
                    id: s.id.to_string(),
                    class: s.class.as_str(),
                    transport: s.transport.clone(),
                    distance_km: s.endpoints().map(|(a, b)| great_circle_distance_km(a, b)),
                    intercontinental: config.intercontinental.matches(s),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Config => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    match path {
        Some(path) => {
            let config = EngineConfig::load(path)?;
            info!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn parse_viewport(raw: &str) -> Result<[f64; 2], String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("viewport must look like 1280x720, got {raw:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("invalid viewport dimension {v:?}"))
    };
    Ok([parse(w)?, parse(h)?])
}

fn render(
    config: EngineConfig,
    data: TripData,
    mode: ViewMode,
    focus: Option<ItemRef>,
    viewport: Option<[f64; 2]>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let map = Rc::new(RefCell::new(RecordingMap::new()));
    if viewport.is_some() {
        map.borrow_mut().set_viewport(viewport);
    }

    let mut engine = Engine::create(&map, config);
    engine.on(DIAGNOSTIC, |event| {
        if let EngineEvent::Diagnostic { category, message } = event {
            warn!(category, "{message}");
        }
    });
    engine.set_trip_data(data);
    engine.set_view_mode(mode);
    engine.set_focused_item(focus);
    engine.host_ready();

    if let Some(report) = engine.last_report() {
        log_view(report);
    }
    let pass_index = engine.last_report().map_or(0, |r| r.pass_index);
    let render_error = engine.render_error().map(str::to_owned);
    let diagnostics = engine
        .drain_events()
        .into_iter()
        .filter_map(|e| match e.payload {
            EngineEvent::Diagnostic { category, message } => Some(format!("{category}: {message}")),
            _ => None,
        })
        .collect();
    let snapshot = map.borrow().snapshot();
    engine.dispose();

    let output = RenderOutput {
        pass_index,
        mode,
        diagnostics,
        render_error: render_error.as_deref(),
        groups: summarize(&snapshot),
        map: snapshot,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");

    match render_error {
        Some(message) => Err(message.into()),
        None => Ok(()),
    }
}

fn log_view(report: &RenderReport) {
    if let Some(v) = report.view.as_fixed() {
        info!(lat = v.center.lat, lng = v.center.lng, zoom = v.zoom, "fixed view");
    } else if let Some(v) = report.view.as_fit() {
        info!(
            south = v.bounds.south(),
            west = v.bounds.west(),
            north = v.bounds.north(),
            east = v.bounds.east(),
            max_zoom = v.max_zoom,
            "fit view"
        );
    }
}

fn summarize(snapshot: &MapSnapshot) -> Vec<GroupSummary> {
    snapshot
        .groups
        .iter()
        .map(|g| GroupSummary {
            name: g.name.clone(),
            markers: g.primitives.iter().filter_map(Primitive::as_marker).count(),
            polylines: g.primitives.iter().filter_map(Primitive::as_polyline).count(),
        })
        .collect()
}
