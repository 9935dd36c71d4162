use std::path::{Path, PathBuf};
use std::time::Duration;

use cad_lasso::calibrate::parse_distance;
use cad_lasso::config::parse_downsample;
use cad_lasso::export::next_free_path;
use cad_lasso::import::{read_points, ImportSettings};
use cad_lasso::render::save_png;
use cad_lasso::{LoopExit, NullSink, OutputUnit, ScriptedEvents, SessionConfig, Viewer, Workspace};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cad-lasso", about = "Trace a part outline from a photo into a CAD point file")]
struct Cli {
    /// Input image path (PNG, JPEG, BMP)
    #[arg(short, long)]
    input: PathBuf,

    /// Lasso event script (move/click/undo/key lines)
    #[arg(short, long)]
    trace_events: PathBuf,

    /// Calibration event script: two clicks on the ends of a known span
    #[arg(long)]
    scale_events: Option<PathBuf>,

    /// Real-world length of the calibration span in mm
    #[arg(short = 'k', long, value_parser = parse_distance)]
    known_distance: Option<f64>,

    /// Millimetres per working pixel. Skips calibration.
    #[arg(long)]
    scale_factor: Option<f64>,

    /// Downsample factor applied after decode (>= 1, anything else uses 1)
    #[arg(short, long)]
    downsample: Option<String>,

    /// Outline offset in mm (negative shrinks)
    #[arg(long, allow_hyphen_values = true)]
    tolerance: Option<f64>,

    /// Output point file (defaults to the next free output/point_data_N.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Unit of the written coordinates: mm or cm [default: cm]
    #[arg(short, long)]
    unit: Option<OutputUnit>,

    /// JSON session preset; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write confirm-time previews into this directory
    #[arg(long)]
    preview_dir: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(text) = &cli.downsample {
        config.downsample = parse_downsample(text).unwrap_or_else(|e| {
            log::warn!("{e}; using 1");
            1.0
        });
    }
    if let Some(k) = cli.known_distance {
        config.known_distance = Some(k);
    }
    if let Some(s) = cli.scale_factor {
        config.scale_factor = Some(s);
    }
    if let Some(t) = cli.tolerance {
        config.tolerance = t;
    }
    if let Some(u) = cli.unit {
        config.output_unit = u;
    }
    let poll = Duration::from_millis(config.poll_interval_ms);

    // Header
    eprintln!();
    eprintln!("  cad-lasso \u{00b7} {}", cli.input.display());
    eprintln!();

    let mut ws = Workspace::new(config);
    ws.load_image(&cli.input)?;
    if let (Some((rw, rh)), Some((ww, wh))) = (ws.raw_size(), ws.working_size()) {
        eprintln!("  Load        {rw}x{rh} px, working {ww}x{wh} px");
    }

    // Scale
    if ws.config().scale_factor.is_none() {
        let script = cli
            .scale_events
            .as_deref()
            .ok_or("no --scale-factor given and no --scale-events to calibrate from")?;
        let mut events = ScriptedEvents::load(script)?;
        let viewer = ws.calibrator_mut()?;
        if viewer.run(&mut events, &mut NullSink, poll)? == LoopExit::Cancelled {
            eprintln!("  Cancelled   during calibration");
            return Ok(());
        }
        save_preview(viewer, cli.preview_dir.as_deref(), "calibration")?;
    }
    let scale = ws.scale_factor()?;
    eprintln!("  Scale       {scale:.5} mm/px");

    // Trace
    let mut events = ScriptedEvents::load(&cli.trace_events)?;
    let viewer = ws.tracer_mut()?;
    let exit = viewer.run(&mut events, &mut NullSink, poll)?;
    if exit == LoopExit::Cancelled {
        eprintln!("  Cancelled   during tracing");
        return Ok(());
    }
    save_preview(viewer, cli.preview_dir.as_deref(), "lasso")?;
    let anchors = viewer
        .mode()
        .as_tracer()
        .map_or(0, |t| t.lasso().anchors().len());
    eprintln!("  Trace       {anchors} anchors");

    // Export
    let output = match cli.output {
        Some(path) => path,
        None => {
            let dir = Path::new("output");
            std::fs::create_dir_all(dir)?;
            next_free_path(dir, "point_data")
        }
    };
    let points = ws.export_to(&output)?;
    eprintln!(
        "  Export      {} points, tolerance {:+} mm, {:?}",
        points.len(),
        ws.config().tolerance,
        ws.config().output_unit
    );

    // What the CAD host will build from the file
    let reader = std::io::BufReader::new(std::fs::File::open(&output)?);
    let plan = read_points(reader, &ImportSettings::from(ws.config()))?;
    eprintln!(
        "  Import      {} points{}, {} dimensions",
        plan.sample_count(),
        if plan.closed_spline { " on a closed spline" } else { "" },
        plan.dimensions.len()
    );

    // Footer
    eprintln!();
    eprintln!("  \u{2713} {}", output.display());
    eprintln!();

    Ok(())
}

fn save_preview(viewer: &Viewer, dir: Option<&Path>, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(dir) = dir else {
        return Ok(());
    };
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}_preview.png"));
    save_png(&path, &viewer.confirm_preview()?)?;
    eprintln!("  Preview     {}", path.display());
    Ok(())
}
