use anyhow::Result;
use clap::{Parser, Subcommand};
use ecgen_lib::{
    compose::{generate_strip, generate_strip_seeded},
    plot::{figure_from_path, figure_from_strip, grid_series, Figure, Series},
    rhythm::Rhythm,
    signal::{Sample, Strip},
    timebase::TimeBase,
    window::{crop_seconds, to_path},
};
use log::info;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Rendered strip height: 40 minor boxes, baseline at mid-height.
const STRIP_HEIGHT_BOXES: f64 = 40.0;

#[derive(Parser)]
#[command(
    name = "ecgen",
    version,
    about = "Synthetic single-lead ECG strip generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a full strip for a rhythm; JSON samples on stdout or a PNG with --out
    Strip {
        #[arg(long)]
        rhythm: String,
        /// Seed for the irregular rhythm generators (reproducible output)
        #[arg(long)]
        seed: Option<u64>,
        /// Strip duration in seconds
        #[arg(long, default_value_t = 6.0)]
        seconds: f64,
        /// Paper speed in pixels per second
        #[arg(long, default_value_t = 150.0)]
        paper_speed: f64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Crop a magnified window out of a generated strip
    Zoom {
        #[arg(long)]
        rhythm: String,
        /// Window start within the strip, seconds
        #[arg(long)]
        start: f64,
        /// Window length, seconds
        #[arg(long, default_value_t = 2.0)]
        span: f64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Emit the ruled-paper grid lines as JSON
    Grid {
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
    },
    /// List the supported rhythm identifiers
    Rhythms,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Strip {
            rhythm,
            seed,
            seconds,
            paper_speed,
            out,
        } => cmd_strip(&rhythm, seed, seconds, paper_speed, out.as_deref())?,
        Commands::Zoom {
            rhythm,
            start,
            span,
            seed,
            out,
        } => cmd_zoom(&rhythm, start, span, seed, out.as_deref())?,
        Commands::Grid { width, height } => cmd_grid(width, height)?,
        Commands::Rhythms => cmd_rhythms(),
    }
    Ok(())
}

fn cmd_rhythms() {
    for rhythm in Rhythm::ALL {
        println!("{}", rhythm);
    }
}

fn make_strip(rhythm: Rhythm, timebase: &TimeBase, seed: Option<u64>) -> Strip {
    match seed {
        Some(seed) => generate_strip_seeded(rhythm, timebase, seed),
        None => generate_strip(rhythm, timebase),
    }
}

fn cmd_strip(
    rhythm: &str,
    seed: Option<u64>,
    seconds: f64,
    paper_speed: f64,
    out: Option<&Path>,
) -> Result<()> {
    let rhythm: Rhythm = rhythm.parse()?;
    let timebase = TimeBase {
        strip_seconds: seconds,
        px_per_second: paper_speed,
        ..TimeBase::default()
    };
    let strip = make_strip(rhythm, &timebase, seed);
    match out {
        Some(path) => {
            let height = STRIP_HEIGHT_BOXES * timebase.minor_box;
            let fig = strip_figure(rhythm.name(), &strip, &timebase, timebase.strip_width(), height);
            render_figure_png(path, &fig, (timebase.strip_width() as u32, height as u32))?;
            info!("wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string(&strip)?),
    }
    Ok(())
}

fn cmd_zoom(
    rhythm: &str,
    start: f64,
    span: f64,
    seed: Option<u64>,
    out: Option<&Path>,
) -> Result<()> {
    let rhythm: Rhythm = rhythm.parse()?;
    let timebase = TimeBase::default();
    let strip = make_strip(rhythm, &timebase, seed);
    let window = crop_seconds(&strip.samples, start, start + span, &timebase);
    let path_cmds = to_path(&window);
    match out {
        Some(path) => {
            let height = STRIP_HEIGHT_BOXES * timebase.minor_box;
            let width = timebase.seconds_to_px(span);
            let baseline = height / 2.0;
            let screen: Vec<Sample> = window
                .iter()
                .map(|s| Sample::new(s.x, baseline + s.y))
                .collect();
            let mut fig = figure_from_path(rhythm.name(), &to_path(&screen));
            let mut series = grid_series(&timebase.grid_lines(width, height));
            series.extend(fig.series.drain(..));
            fig.series = series;
            render_figure_png(path, &fig, (width as u32, height as u32))?;
            info!("wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string(&path_cmds)?),
    }
    Ok(())
}

fn cmd_grid(width: Option<f64>, height: Option<f64>) -> Result<()> {
    let timebase = TimeBase::default();
    let width = width.unwrap_or_else(|| timebase.strip_width());
    let height = height.unwrap_or(STRIP_HEIGHT_BOXES * timebase.minor_box);
    let lines = timebase.grid_lines(width, height);
    println!("{}", serde_json::to_string(&lines)?);
    Ok(())
}

/// Grid plus trace, in screen coordinates with the baseline at mid-height.
/// The engine's positive-is-elevation convention maps to "up" here.
fn strip_figure(title: &str, strip: &Strip, timebase: &TimeBase, width: f64, height: f64) -> Figure {
    let baseline = height / 2.0;
    let screen = Strip {
        samples: strip
            .samples
            .iter()
            .map(|s| Sample::new(s.x, baseline + s.y))
            .collect(),
    };
    let mut fig = figure_from_strip(title, &screen);
    let mut series = grid_series(&timebase.grid_lines(width, height));
    series.extend(fig.series.drain(..));
    fig.series = series;
    fig
}

fn render_figure_png(path: &Path, fig: &Figure, size: (u32, u32)) -> Result<()> {
    let backend = BitMapBackend::new(path, size);
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart =
        ChartBuilder::on(&root).build_cartesian_2d(0.0..size.0 as f64, 0.0..size.1 as f64)?;
    for series in &fig.series {
        let Series::Line(line) = series;
        let color = rgb(line.style.color.0);
        let stroke = (line.style.width.round() as u32).max(1);
        chart.draw_series(LineSeries::new(
            line.points.iter().map(|p| (p[0], p[1])),
            color.stroke_width(stroke),
        ))?;
    }
    root.present()?;
    Ok(())
}

fn rgb(color: u32) -> RGBColor {
    RGBColor(
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    )
}
