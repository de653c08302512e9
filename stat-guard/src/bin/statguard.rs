//! StatGuard command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

use stat_guard::compare::compare;
use stat_guard::core::ValidationOptions;
use stat_guard::error::{GuardError, Result};
use stat_guard::logging::{init_logging, LoggingConfig};
use stat_guard::profile::{DataProfiler, ProfilerConfig};
use stat_guard::reporters;
use stat_guard::sources::load_path;

#[derive(Parser)]
#[command(
    name = "statguard",
    version,
    about = "StatGuard: statistical data validation",
    after_help = "Examples:\n  \
        statguard validate data.csv --target metric --group treatment\n  \
        statguard profile data.csv --output profile.json\n  \
        statguard compare train.csv test.csv --target metric"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data for statistical analysis
    Validate {
        /// Input data file (CSV, Parquet, NDJSON)
        file: PathBuf,
        /// Target column to validate
        #[arg(short, long)]
        target: String,
        /// Grouping column
        #[arg(short, long)]
        group: Option<String>,
        /// Unit identifier column
        #[arg(short, long)]
        unit: Option<String>,
        /// Validation policy
        #[arg(short, long, default_value = "default")]
        policy: String,
        /// Output file for the report (.html, .json, or .md)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Stop on the first error
        #[arg(long)]
        fail_fast: bool,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate a data profile
    Profile {
        /// Input data file
        file: PathBuf,
        /// Target column that must be present in the data
        #[arg(short, long)]
        target: Option<String>,
        /// Output file (.json)
        #[arg(short, long)]
        output: PathBuf,
        /// Skip correlation computation
        #[arg(long)]
        no_correlations: bool,
    },
    /// Compare two datasets for drift
    Compare {
        /// First data file
        file1: PathBuf,
        /// Second data file
        file2: PathBuf,
        /// Target column to compare
        #[arg(short, long)]
        target: String,
        /// Grouping column
        #[arg(short, long)]
        group: Option<String>,
        /// Output file (.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(
        cli.command,
        Commands::Validate { verbose: true, .. }
    );
    let logging = if verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::default().with_level(Level::WARN)
    };
    if let Err(e) = init_logging(logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Validate {
            file,
            target,
            group,
            unit,
            policy,
            output,
            fail_fast,
            verbose,
        } => {
            let data = load_path(&file).await?;
            if verbose {
                println!(
                    "Loaded {} rows, {} columns",
                    data.num_rows(),
                    data.num_columns()
                );
                println!("Validating column: {target}");
            }

            let mut options = ValidationOptions::new(&target)
                .policy(policy.as_str())
                .fail_fast(fail_fast);
            if let Some(group) = group {
                options = options.group(group);
            }
            if let Some(unit) = unit {
                options = options.unit(unit);
            }

            let report = stat_guard::validate(&data, &options)?;
            println!("{report}");

            if let Some(output) = output {
                reporters::save(&report, &output)?;
                println!("\nReport saved to: {}", output.display());
            }

            Ok(exit_for(report.is_valid()))
        }

        Commands::Profile {
            file,
            target,
            output,
            no_correlations,
        } => {
            let data = load_path(&file).await?;
            if let Some(target) = target {
                if !data.has_column(&target) {
                    return Err(GuardError::ColumnNotFound(target));
                }
            }
            println!(
                "Profiling {} rows, {} columns...",
                data.num_rows(),
                data.num_columns()
            );

            let profiler = DataProfiler::with_config(ProfilerConfig {
                compute_correlations: !no_correlations,
                ..ProfilerConfig::default()
            });
            let profile = profiler.profile(&data);

            save_json(&output, &profile.to_json_value())?;
            println!("Profile saved to: {}", output.display());
            Ok(ExitCode::SUCCESS)
        }

        Commands::Compare {
            file1,
            file2,
            target,
            group,
            output,
        } => {
            let data1 = load_path(&file1).await?;
            let data2 = load_path(&file2).await?;
            println!("Comparing datasets...");
            println!("  File 1: {} rows", data1.num_rows());
            println!("  File 2: {} rows", data2.num_rows());

            let result = compare(&data1, &data2, &target, group.as_deref())?;

            println!("\nComparison Results:");
            println!("  Drift Detected: {}", result.drift_detected);
            if let Some(ks) = &result.ks_test {
                println!(
                    "  KS Test: statistic={:.4}, p-value={:.4}",
                    ks.statistic, ks.p_value
                );
            }
            if let Some(t) = &result.t_test {
                println!(
                    "  T-Test: statistic={:.4}, p-value={:.4}",
                    t.statistic, t.p_value
                );
            }

            if let Some(output) = output {
                save_json(&output, &result.to_json_value())?;
                println!("\nComparison saved to: {}", output.display());
            }

            Ok(exit_for(!result.drift_detected))
        }
    }
}

fn save_json(path: &PathBuf, value: &serde_json::Value) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if !ext.eq_ignore_ascii_case("json") {
        return Err(GuardError::UnknownFormat(ext.to_string()));
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn exit_for(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
