//! Command-line entry point: read the price table, forecast, write JSON.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use price_outlook::io::{publish_outputs, read_table, OutputPaths, DEFAULT_DELIMITER};
use price_outlook::models::Damping;
use price_outlook::pipeline::{run, PipelineConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "price-outlook")]
#[command(about = "Forecast monthly price series and derive percent changes", long_about = None)]
struct Cli {
    /// Input table with a Date column and one column per entity
    #[arg(short, long, default_value = "Price Dataset.csv")]
    input: PathBuf,

    /// Field delimiter: "tab", "comma", or a single character
    #[arg(short, long, default_value = "tab")]
    delimiter: String,

    /// Combined history + forecast output
    #[arg(long, default_value = "data_combined.json")]
    combined: PathBuf,

    /// Year-over-year change output
    #[arg(long, default_value = "yoy_change.json")]
    yoy: PathBuf,

    /// Month-over-month change output
    #[arg(long, default_value = "mom_change.json")]
    mom: PathBuf,

    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Months to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Damping policy: "optimized" or a factor in (0, 1]
    #[arg(long)]
    damping: Option<Damping>,

    /// Fit on raw values instead of their logarithm
    #[arg(long)]
    no_log_transform: bool,

    /// Do not cap forecasts by historical growth
    #[arg(long)]
    no_growth_cap: bool,

    /// Decimal places in the published values
    #[arg(long)]
    decimals: Option<u32>,

    /// Iteration budget of the parameter search per entity
    #[arg(long)]
    max_iterations: Option<usize>,
}

impl Cli {
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if let Some(damping) = self.damping {
            config.damping = damping;
        }
        if let Some(decimals) = self.decimals {
            config.decimals = decimals;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if self.no_log_transform {
            config.use_log_transform = false;
        }
        if self.no_growth_cap {
            config.apply_growth_cap = false;
        }
        config.validate()?;
        Ok(config)
    }

    fn delimiter(&self) -> anyhow::Result<u8> {
        match self.delimiter.as_str() {
            "tab" | "\\t" => Ok(DEFAULT_DELIMITER),
            "comma" => Ok(b','),
            other if other.len() == 1 => Ok(other.as_bytes()[0]),
            other => bail!("unsupported delimiter '{other}'"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = cli.pipeline_config()?;
    let delimiter = cli.delimiter()?;

    let table = read_table(&cli.input, delimiter)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let output = run(&table, &config).context("forecast run aborted")?;

    let paths = OutputPaths {
        combined: cli.combined,
        year_over_year: cli.yoy,
        month_over_month: cli.mom,
    };
    publish_outputs(&output, &paths).context("writing outputs")?;

    if output.report.is_clean() {
        info!("{}", output.report);
    } else {
        warn!("{}", output.report);
    }
    Ok(())
}
