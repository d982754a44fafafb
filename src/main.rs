use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use vizdash::config::DashboardConfig;
use vizdash::csv_reader;
use vizdash::data::PlotData;
use vizdash::parser;
use vizdash::preprocessor::expand_variables;
use vizdash::render::render_chart;
use vizdash::session::{load_table, Session};
use vizdash::OutputFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Svg,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Which {
    Primary,
    Auxiliary,
}

#[derive(Parser, Debug)]
#[command(name = "vizdash")]
#[command(about = "Render dashboard views of tabular data", long_about = None)]
struct Args {
    /// View script (e.g., 'x(Platelets) | y("Red blood Cells") | scatter() | color(Group)')
    view: String,

    /// Data file (.csv or .json); CSV is read from stdin when omitted
    #[arg(long)]
    data: Option<PathBuf>,

    /// Dashboard configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format; defaults to the configured render type
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Which chart of the final view to output
    #[arg(long, value_enum, default_value_t = Which::Primary)]
    chart: Which,

    /// Script variable, as name=value (repeatable)
    #[arg(long = "var", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Write output here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", s))
}

fn read_data(path: Option<&Path>) -> Result<PlotData> {
    match path {
        Some(path) if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            let value: serde_json::Value =
                serde_json::from_str(&text).context("Failed to parse JSON data")?;
            PlotData::from_json(&value)
        }
        Some(path) => Ok(PlotData::from_csv(csv_reader::read_csv_from_path(path)?)),
        None => Ok(PlotData::from_csv(
            csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?,
        )),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };

    let data = read_data(args.data.as_deref())?;
    let table = load_table(&data, &config.dataset)?;

    // Expand variables, then parse the script
    let variables: HashMap<String, String> = args.vars.iter().cloned().collect();
    let source = expand_variables(&args.view, &variables)?;
    let script = match parser::parse_script(&source) {
        Ok((_, script)) => script,
        Err(e) => {
            eprintln!("Parse error: {:?}", e);
            std::process::exit(1);
        }
    };

    match args.format {
        Some(Format::Png) => config.render.format = OutputFormat::Png,
        Some(Format::Svg) => config.render.format = OutputFormat::Svg,
        Some(Format::Json) | None => {}
    }
    let render = config.render.clone();
    // Replay every request; the last one is the view we output
    let mut session = Session::new(table, config);
    let mut dashboard = None;
    for request in &script {
        dashboard = Some(session.update(request));
    }
    let dashboard = dashboard.ok_or_else(|| anyhow!("Script contains no views"))?;

    let chart = match args.chart {
        Which::Primary => dashboard.primary,
        Which::Auxiliary => dashboard
            .auxiliary
            .ok_or_else(|| anyhow!("No auxiliary chart: enable cluster(...) on a scatter view"))?,
    };

    let bytes = match args.format {
        Some(Format::Json) => {
            serde_json::to_vec_pretty(&chart).context("Failed to serialize chart")?
        }
        _ => render_chart(&chart, &render).context("Failed to render chart")?,
    };

    match &args.output {
        Some(path) => fs::write(path, &bytes)
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&bytes)
                .context("Failed to write output to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
