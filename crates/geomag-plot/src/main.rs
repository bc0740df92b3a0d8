//! Geomagnetic map generator.
//!
//! Evaluates a spherical-harmonic field model on a global grid and writes
//! one north/south/global contour figure per requested component.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geomag_common::parse_time;
use geomag_model::ModelReference;
use geomag_plot::{contours_north_south_moll, grid, eval_model, FieldComponent, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "geomag-maps")]
#[command(about = "Contour maps of a geomagnetic field model")]
struct Args {
    /// Evaluation time (RFC 3339, YYYY-MM-DD or decimal year)
    #[arg(short, long, env = "GEOMAG_TIME", default_value = "2020-01-01T00:00:00Z")]
    time: String,

    /// SHC model file (default: built-in IGRF-13 truncation)
    #[arg(short, long, env = "GEOMAG_MODEL")]
    model: Option<PathBuf>,

    /// Number of latitude intervals
    #[arg(long, default_value_t = 180)]
    nlats: usize,

    /// Number of longitude intervals
    #[arg(long, default_value_t = 360)]
    nlons: usize,

    /// Height above WGS84 in km
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    height: f64,

    /// Components to draw
    #[arg(short, long, value_delimiter = ',', default_value = "X,Y,Z,I,D,F")]
    components: Vec<FieldComponent>,

    /// JSON file of render option overrides
    #[arg(long, env = "GEOMAG_RENDER_OPTIONS")]
    render_options: Option<PathBuf>,

    /// Disable inline contour labels
    #[arg(long)]
    no_labels: bool,

    /// Output directory for PNG files
    #[arg(short, long, env = "GEOMAG_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let time = parse_time(&args.time)?;
    let model = match &args.model {
        Some(path) => ModelReference::Path(path.clone()),
        None => ModelReference::default(),
    };

    let mut options = match &args.render_options {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading render options {}", path.display()))?;
            serde_json::from_str::<RenderOptions>(&text)
                .with_context(|| format!("parsing render options {}", path.display()))?
        }
        None => RenderOptions::default(),
    };
    if args.no_labels {
        options.labels = Some(false);
    }

    info!(time = %time, model = %model, nlats = args.nlats, nlons = args.nlons, "Starting geomag-maps");

    let coords = grid(args.nlats, args.nlons, args.height)?;
    let field = eval_model(&time, &coords, &model)?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let date = time.format("%Y-%m-%d");
    for component in &args.components {
        let title = format!("{} ({}), {}, {}", component.description(), component, model, date);
        let (fig, _) = contours_north_south_moll(
            &coords,
            &field.get(*component).view(),
            component.units(),
            &title,
            &options,
        )?;
        let path = args.output_dir.join(format!("{}_{}.png", component, time.format("%Y%m%d")));
        fig.save_png(&path)?;
        info!(component = %component, path = %path.display(), "Wrote map");
    }

    Ok(())
}
