//! RideHist - ride data distributions
//!
//! Command line entry point.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use ridehist::histogram::{
    BinConfig, CompareResult, CompareSet, CurveStyle, DisplayFlags, DistributionResult, HistData, HistogramEngine,
    PlotPoint, SeriesKind, Units,
};
use ridehist::storage::{self, config::AppConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ride data distribution histograms", long_about = None)]
struct Cli {
    /// Config file (defaults to config.toml in the data directory)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Distribution of one ride's samples
    Ride(RideArgs),
    /// Distribution from a pre-aggregated cache
    Cache(CacheArgs),
    /// Distribution of a metric across rides
    Metrics(MetricsArgs),
    /// Several caches side by side
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
struct HistArgs {
    /// Series to distribute (power, power_per_kg, alt_power, torque, heart_rate, cadence, speed)
    #[arg(long)]
    series: Option<SeriesKind>,

    /// Bin width in series units
    #[arg(long)]
    bin_width: Option<f64>,

    /// Aggregate into training zones (power and heart rate only)
    #[arg(long, action = ArgAction::SetTrue)]
    zoned: bool,

    /// Count zero values
    #[arg(long, action = ArgAction::SetTrue)]
    with_zeros: bool,

    /// Report percent of total time instead of minutes
    #[arg(long, action = ArgAction::SetTrue)]
    percent: bool,

    /// Show torque and speed in imperial units
    #[arg(long, action = ArgAction::SetTrue)]
    imperial: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct RideArgs {
    /// Ride JSON document
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    #[command(flatten)]
    hist: HistArgs,
}

#[derive(Args, Debug)]
struct CacheArgs {
    /// Distribution cache JSON document
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    #[command(flatten)]
    hist: HistArgs,
}

#[derive(Args, Debug)]
struct MetricsArgs {
    /// Metric JSON document
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    /// Decimal places of the distributed metric (overrides the document)
    #[arg(long)]
    precision: Option<u32>,

    /// Distributed metric is in seconds
    #[arg(long, action = ArgAction::SetTrue)]
    value_seconds: bool,

    /// Totalled metric is in seconds
    #[arg(long, action = ArgAction::SetTrue)]
    total_seconds: bool,

    #[command(flatten)]
    hist: HistArgs,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Distribution cache JSON documents
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    files: Vec<PathBuf>,

    /// Names of sets to compute but leave out of the column layout and Y range
    #[arg(long)]
    hide: Vec<String>,

    #[command(flatten)]
    hist: HistArgs,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

/// Settings after merging the config file with command line flags.
struct Resolved {
    series: SeriesKind,
    config: BinConfig,
    units: Units,
    display: DisplayFlags,
    format: OutputFormat,
}

impl HistArgs {
    fn resolve(&self, app: &AppConfig) -> Resolved {
        let settings = &app.histogram;
        let mut config = settings.bin_config();
        if let Some(width) = self.bin_width {
            config.bin_width = width;
        }
        config.zoned |= self.zoned;
        config.include_zeros |= self.with_zeros;
        config.percent |= self.percent;

        let units = if self.imperial {
            Units::Imperial
        } else {
            app.athlete.units
        };

        Resolved {
            series: self.series.unwrap_or(settings.series),
            config: config.sanitized(),
            units,
            display: DisplayFlags {
                log_y: settings.log_y,
                shade_zones: settings.shade_zones,
            },
            format: self.format,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!("Starting RideHist v{}", env!("CARGO_PKG_VERSION"));

    let app = match cli.config.as_deref() {
        Some(path) => storage::config::load_config_from(path),
        None => storage::config::load_config(),
    }
    .context("failed to load configuration")?;

    match cli.command {
        Command::Ride(args) => run_ride(&app, &args),
        Command::Cache(args) => run_cache(&app, &args),
        Command::Metrics(args) => run_metrics(&app, &args),
        Command::Compare(args) => run_compare(&app, &args),
    }
}

fn run_ride(app: &AppConfig, args: &RideArgs) -> Result<()> {
    let resolved = args.hist.resolve(app);
    let mut ride = storage::load_ride(&args.file).with_context(|| format!("failed to load ride {}", args.file.display()))?;
    if ride.weight_kg <= 0.0 {
        ride.weight_kg = app.athlete.weight_kg;
    }

    let power_zones = app.athlete.power_schedule().context("invalid power zones")?;
    let hr_zones = app.athlete.hr_schedule().context("invalid heart rate zones")?;
    let data = HistData::from_ride(&ride, &power_zones, &hr_zones, resolved.units);

    emit_distribution(&data, &resolved)
}

fn run_cache(app: &AppConfig, args: &CacheArgs) -> Result<()> {
    let resolved = args.hist.resolve(app);
    let cache = storage::load_cache(&args.file).with_context(|| format!("failed to load cache {}", args.file.display()))?;
    let data = HistData::from_cache(&cache, resolved.units);

    emit_distribution(&data, &resolved)
}

fn run_metrics(app: &AppConfig, args: &MetricsArgs) -> Result<()> {
    let resolved = args.hist.resolve(app);
    let mut doc = storage::load_metrics(&args.file)
        .with_context(|| format!("failed to load metrics {}", args.file.display()))?;
    if let Some(precision) = args.precision {
        doc.spec.precision = precision;
    }
    doc.spec.value_in_seconds |= args.value_seconds;
    doc.spec.total_in_seconds |= args.total_seconds;

    let data = HistData::from_metrics(&doc.records, &doc.spec);
    emit_distribution(&data, &resolved)
}

fn run_compare(app: &AppConfig, args: &CompareArgs) -> Result<()> {
    let resolved = args.hist.resolve(app);
    let sets = args
        .files
        .iter()
        .map(|path| load_compare_set(path, resolved.units, &args.hide))
        .collect::<Result<Vec<_>>>()?;

    let engine = HistogramEngine::new(resolved.series, resolved.config);
    let result = engine.compare(&sets);
    tracing::info!(series = %resolved.series, curves = result.curves.len(), "Compared distributions");

    let mut out = io::stdout().lock();
    match resolved.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &result).context("failed to write JSON")?;
            writeln!(out)?;
        }
        OutputFormat::Table => write_compare_table(&mut out, &result, &resolved)?,
    }
    Ok(())
}

fn load_compare_set(path: &Path, units: Units, hidden: &[String]) -> Result<CompareSet> {
    let cache = storage::load_cache(path).with_context(|| format!("failed to load cache {}", path.display()))?;
    let mut set = CompareSet::new(cache.name.clone(), HistData::from_cache(&cache, units));
    set.checked = !hidden.iter().any(|name| *name == set.name);
    Ok(set)
}

fn emit_distribution(data: &HistData, resolved: &Resolved) -> Result<()> {
    let engine = HistogramEngine::new(resolved.series, resolved.config);
    let result = engine.distribution(data);
    if result.is_empty() {
        tracing::warn!(series = %resolved.series, "No data for series");
    }

    let mut out = io::stdout().lock();
    match resolved.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &result).context("failed to write JSON")?;
            writeln!(out)?;
        }
        OutputFormat::Table => write_table(&mut out, &result, resolved)?,
    }
    Ok(())
}

fn y_label(resolved: &Resolved) -> &'static str {
    if resolved.config.percent {
        "percent"
    } else {
        "minutes"
    }
}

// Columns carry four points per zone; the second is the top-left corner.
fn column_heights(points: &[PlotPoint]) -> impl Iterator<Item = f64> + '_ {
    points.chunks(4).map(|c| c.get(1).map_or(0.0, |p| p.y))
}

fn write_table(out: &mut impl Write, result: &DistributionResult, resolved: &Resolved) -> io::Result<()> {
    let x_label = resolved.series.axis_label(resolved.units, resolved.config.zoned);
    let y_label = y_label(resolved);

    match result.style {
        CurveStyle::Steps => {
            match result.selected.as_ref() {
                Some(_) => writeln!(out, "{:>12}  {:>10}  {:>10}", x_label, y_label, "selected")?,
                None => writeln!(out, "{:>12}  {:>10}", x_label, y_label)?,
            }
            for (i, point) in result.full.iter().enumerate() {
                match result.selected.as_ref().and_then(|sel| sel.get(i)) {
                    Some(sel) => writeln!(out, "{:>12.2}  {:>10.3}  {:>10.3}", point.x, point.y, sel.y)?,
                    None => writeln!(out, "{:>12.2}  {:>10.3}", point.x, point.y)?,
                }
            }
        }
        CurveStyle::Columns => {
            writeln!(out, "{:>6}  {:>10}", "zone", y_label)?;
            for (zone, height) in column_heights(&result.full).enumerate() {
                writeln!(out, "{:>6}  {:>10.3}", format!("Z{}", zone + 1), height)?;
            }
        }
    }

    let (y_min, y_max) = result.bounds.y_range(resolved.display.log_y);
    writeln!(
        out,
        "x: {:.2} .. {:.2} (significant to {:.2})  y: {:.3} .. {:.3}",
        result.bounds.min_x, result.bounds.max_x, result.bounds.truncated_max_x, y_min, y_max
    )
}

fn write_compare_table(out: &mut impl Write, result: &CompareResult, resolved: &Resolved) -> io::Result<()> {
    let y_label = y_label(resolved);
    for curve in &result.curves {
        let marker = if curve.checked { "" } else { " (hidden)" };
        writeln!(out, "# {}{}", curve.name, marker)?;
        match curve.style {
            CurveStyle::Steps => {
                for point in &curve.points {
                    writeln!(out, "{:>12.2}  {:>10.3}", point.x, point.y)?;
                }
            }
            CurveStyle::Columns => {
                for (zone, height) in column_heights(&curve.points).enumerate() {
                    writeln!(out, "{:>6}  {:>10.3}", format!("Z{}", zone + 1), height)?;
                }
            }
        }
    }
    let (y_min, y_max) = result.bounds.y_range(resolved.display.log_y);
    writeln!(
        out,
        "x: {:.2} .. {:.2}  y ({}): {:.3} .. {:.3}",
        result.bounds.min_x, result.bounds.max_x, y_label, y_min, y_max
    )
}
