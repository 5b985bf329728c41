use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use dengue_stats::{Dimension, ProcessorConfig, inspect, process};
use log::info;

#[derive(Parser)]
#[command(name = "dengue-stats")]
#[command(about = "Aggregate dengue notification records into a dashboard statistics bundle")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a source, compute every requested block and write the bundle
    Process {
        /// CSV or Parquet file with notification records
        source: PathBuf,
        /// Where the JSON bundle is written
        #[arg(short, long, default_value = "dashboard_stats.json")]
        output: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
        /// Blocks to compute (comma-separated bundle keys, e.g. by_region,age_bands)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
        /// National population used for incidence figures
        #[arg(long)]
        national_population: Option<u64>,
        /// Number of symptom pairs reported
        #[arg(long)]
        top_pairs: Option<usize>,
        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Load a source and print load and age statistics without aggregating
    Inspect {
        /// CSV or Parquet file with notification records
        source: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// JSON configuration file; absent keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Worker threads for aggregation
    #[arg(short, long)]
    threads: Option<usize>,
    /// Hide the load spinner
    #[arg(short, long)]
    quiet: bool,
}

impl CommonArgs {
    /// File, then environment, then command line
    fn load_config(&self) -> Result<ProcessorConfig> {
        let config = match &self.config {
            Some(path) => ProcessorConfig::from_json_file(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => ProcessorConfig::default(),
        };
        let mut config = config
            .apply_env_overrides()
            .context("applying environment overrides")?;
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }
        if self.quiet {
            config.show_progress = false;
        }
        Ok(config)
    }
}

fn parse_dimensions(keys: &[String]) -> Result<Vec<Dimension>> {
    keys.iter()
        .map(|key| {
            let key = key.trim();
            match Dimension::ALL.into_iter().find(|d| d.bundle_key() == key) {
                Some(dimension) => Ok(dimension),
                None => bail!(
                    "unknown block '{key}'; expected one of {}",
                    Dimension::ALL.map(Dimension::bundle_key).join(", ")
                ),
            }
        })
        .collect()
}

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Process {
            source,
            output,
            common,
            only,
            national_population,
            top_pairs,
            compact,
        } => {
            let mut config = common.load_config()?;
            if !only.is_empty() {
                config = config.with_dimensions(&parse_dimensions(&only)?);
            }
            if let Some(population) = national_population {
                config = config.with_national_population(population);
            }
            if let Some(pairs) = top_pairs {
                config.top_symptom_pairs = pairs;
            }
            if compact {
                config.pretty_json = false;
            }
            config.validate().context("invalid configuration")?;
            info!("Running with {config}");

            let bundle = process(&source, &output, &config)
                .with_context(|| format!("processing {}", source.display()))?;

            info!(
                "Wrote {} records and {} blocks to {} in {:?}",
                bundle.metadata.total_records,
                bundle.computed_keys().len(),
                output.display(),
                start.elapsed()
            );
            for skipped in &bundle.data_quality.dimensions_skipped {
                println!(
                    "skipped {}: missing {}",
                    skipped.dimension.bundle_key(),
                    skipped.missing_columns.join(", ")
                );
            }
        }
        Commands::Inspect { source, common } => {
            let config = common.load_config()?;
            config.validate().context("invalid configuration")?;

            let report = inspect(&source, &config)
                .with_context(|| format!("inspecting {}", source.display()))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("rendering report")?
            );
        }
    }

    Ok(())
}
