use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use probetiming::{analyze_file, parse_stats, AnalysisConfig, AnalysisReport, ConfigFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "probetiming")]
#[command(author, version, about = "Function timing from a logic-analyzer capture", long_about = None)]
struct Cli {
    /// Capture exports to analyze (.csv, .xlsx, .xls)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Minimum full period in microseconds for the threshold statistics
    #[arg(short, long, allow_hyphen_values = true)]
    threshold: Option<String>,

    /// Name of the time column (seconds)
    #[arg(long)]
    time_column: Option<String>,

    /// Name of the digital channel column
    #[arg(long)]
    channel_column: Option<String>,

    /// Comma-separated statistics: mean,stdev,min,max,median,mode
    #[arg(long)]
    stats: Option<String>,

    /// JSON file with default settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let file = match &self.config {
            Some(path) => ConfigFile::from_json_file(path)?,
            None => ConfigFile::default(),
        };
        let mut config = file.into_config(self.threshold.as_deref())?;

        if let Some(stats) = &self.stats {
            config.stats = parse_stats(stats)?;
        }
        if let Some(name) = &self.time_column {
            config.time_column = name.clone();
        }
        if let Some(name) = &self.channel_column {
            config.channel_column = name.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => report.to_string(),
        OutputFormat::Json => report.to_json().context("Failed to serialize report")?,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.analysis_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    // Captures are independent; analyze them side by side and report in argument order.
    let results: Vec<Result<AnalysisReport>> = std::thread::scope(|scope| {
        let handles: Vec<_> = cli
            .files
            .iter()
            .map(|path| {
                let config = &config;
                scope.spawn(move || {
                    analyze_file(path, config)
                        .with_context(|| format!("Failed to analyze {}", path.display()))
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("Analysis thread panicked")),
            })
            .collect()
    });

    let mut failed = false;
    for result in results {
        match result.and_then(|report| render(&report, cli.format)) {
            Ok(output) => println!("{output}"),
            Err(e) => {
                tracing::error!("{e:#}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
