use crate::config::load_config;
use crate::ir::{GraphSnapshot, RoutePath};
use crate::layout::compute_layout;
use crate::layout_dump::{FrameDump, write_frame_dump};
use crate::layout_rng;
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ridemap", version, about = "Lay out and render a ride-sharing road map")]
pub struct Args {
    /// Graph JSON ({"places": [...], "roads": [...]}) or '-' for stdin
    #[arg(short = 'g', long = "graph")]
    pub graph: PathBuf,

    /// Route JSON ({"path": [...], "totalCost": n} or a bare array of names)
    #[arg(short = 'r', long = "route")]
    pub route: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Seed for the force layout's initial placement
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Write positions and draw calls as JSON
    #[arg(long = "dump")]
    pub dump: Option<PathBuf>,

    /// Log layout decisions to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let graph = GraphSnapshot::from_json(&read_input(&args.graph)?)?;
    let route = match args.route.as_deref() {
        Some(path) => RoutePath::from_json(&std::fs::read_to_string(path)?)?,
        None => RoutePath::default(),
    };
    tracing::info!(
        places = graph.places.len(),
        roads = graph.roads.len(),
        route = route.len(),
        "loaded map"
    );

    let mut rng = layout_rng(args.seed);
    let layout = compute_layout(
        &graph,
        config.render.width,
        config.render.height,
        &config.layout,
        &mut rng,
    );
    let svg = render_svg(&graph, &layout, &route, &config.theme);

    if let Some(path) = args.dump.as_deref() {
        let dump = FrameDump::from_layout(&graph, &layout, &route, &config.theme);
        write_frame_dump(path, &dump)?;
    }

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output)?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path) -> Result<()> {
    crate::render::write_output_png(svg, output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
