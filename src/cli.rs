use crate::config::{load_config_with_theme, Config};
use crate::controller::ClickOutcome;
use crate::map::SvgMap;
use crate::render::write_output_svg;
use crate::station::discover_stations;
use crate::stats::{render_html, render_json, render_text};
use crate::Tracker;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cta-tracker", version, about = "Mark visited stations on an SVG transit map")]
pub struct Args {
    /// Map SVG file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Annotated map output (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (line catalog, asset conventions, theme)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Click the element with this id (repeatable, applied in order)
    #[arg(long = "click", value_name = "ELEMENT_ID")]
    pub clicks: Vec<String>,

    /// Click the station with this identifier, as printed by --list
    #[arg(long = "station", value_name = "STATION_ID")]
    pub stations: Vec<String>,

    /// List the stations found in the map and exit
    #[arg(long = "list")]
    pub list: bool,

    /// How to print the stats panel (to stderr when the map goes to stdout)
    #[arg(long = "stats", value_enum, default_value = "text")]
    pub stats: StatsFormat,

    /// Theme preset, in place of the config file's (its themeVariables still apply)
    #[arg(long = "theme")]
    pub theme: Option<String>,

    /// Log clicks and resolved stations
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StatsFormat {
    Text,
    Html,
    Json,
    None,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config_with_theme(args.config.as_deref(), args.theme.as_deref())?;

    let source = read_input(args.input.as_deref())?;
    let map = SvgMap::parse(&source)?;

    if args.list {
        print_station_list(&map, &config);
        return Ok(());
    }

    let mut tracker = Tracker::with_config(config);
    for element_id in &args.clicks {
        let target = map.find_by_id(element_id)?;
        report(element_id, tracker.click(&map, target)?);
    }
    for station_id in &args.stations {
        report(station_id, tracker.click_station(&map, map.elements(), station_id)?);
    }

    let annotated = tracker.annotated_svg(&source)?;
    let stats_to_stdout = args.output.is_some();
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&annotated, args.output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&annotated, &output)?;
        }
    }

    let snapshot = tracker.snapshot();
    let theme = &tracker.config().theme;
    let panel = match args.stats {
        StatsFormat::Text => render_text(&snapshot, theme),
        StatsFormat::Html => render_html(&snapshot, theme) + "\n",
        StatsFormat::Json => render_json(&snapshot)? + "\n",
        StatsFormat::None => return Ok(()),
    };
    if stats_to_stdout {
        print!("{panel}");
    } else {
        eprint!("{panel}");
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn report(clicked: &str, outcome: ClickOutcome) {
    if outcome == ClickOutcome::Ignored {
        warn!(clicked, "click did not hit a labelled station");
    }
}

fn print_station_list(map: &SvgMap, config: &Config) {
    for station in discover_stations(map, map.elements(), config) {
        println!("{}\t{}", station.id, station.lines.join(","));
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path) -> Result<()> {
    crate::render::write_output_png(svg, output)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the 'png' feature"))
}
