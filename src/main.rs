//! CLI entry point for the JIT emissions tool.
//!
//! Each subcommand is one batch job: analyse the before-JIT totals, compute
//! after-JIT emissions from AIS data, or compute the savings between the two.

use anyhow::Result;
use clap::{Parser, Subcommand};
use jit_emissions::config::RunConfig;
use jit_emissions::jobs::{
    after_jit::{self, AfterJitPaths},
    before_jit::{self, BeforeJitPaths},
    savings::{self, SavingsPaths},
};
use jit_emissions::report::{NoPrompt, Prompt, StdinPrompt};
use std::ffi::OsStr;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "jit_emissions")]
#[command(about = "Vessel emissions before and after Just-In-Time arrival", long_about = None)]
struct Cli {
    /// Directory the input CSVs are read from
    #[arg(long, global = true, env = "JIT_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Directory the output CSVs are written to
    #[arg(long, global = true, env = "JIT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Optional JSON file overriding emission constants and report layout
    #[arg(long, global = true, env = "JIT_CONFIG")]
    config: Option<PathBuf>,

    /// Do not wait for Enter between pages of the vessel listings
    #[arg(long, global = true, default_value_t = false)]
    no_pause: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse the precomputed before-JIT emissions table
    BeforeJit {
        #[arg(long, default_value = "anc_before_jit.csv")]
        input: PathBuf,
    },
    /// Compute per-vessel emissions with the JIT duration cap applied
    AfterJit {
        #[arg(long, default_value = "ais_dataset.csv")]
        ais: PathBuf,

        #[arg(long, default_value = "auxiliary_engine_emission_factors.csv")]
        aux_factors: PathBuf,

        #[arg(long, default_value = "boiler_engine_emission_factors.csv")]
        boiler_factors: PathBuf,
    },
    /// Compute per-vessel savings between the before- and after-JIT totals
    Savings {
        #[arg(long, default_value = "anc_before_jit_cleaned.csv")]
        before: PathBuf,

        #[arg(long, default_value = "anc_after_jit.csv")]
        after: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/jit_emissions.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("jit_emissions.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = RunConfig::load_or_default(cli.config.as_deref())?;

    let mut prompt: Box<dyn Prompt> = if cli.no_pause || !std::io::stdin().is_terminal() {
        Box::new(NoPrompt)
    } else {
        Box::new(StdinPrompt)
    };
    let mut stdout = std::io::stdout().lock();
    let data = |file: PathBuf| cli.data_dir.join(file);

    match cli.command {
        Commands::BeforeJit { input } => {
            let paths = BeforeJitPaths {
                input: data(input),
                output_dir: cli.output_dir.clone(),
            };
            let rows = before_jit::run(&paths, &config, &mut stdout, prompt.as_mut())?;
            info!(vessels = rows.len(), "Before-JIT job finished");
        }
        Commands::AfterJit {
            ais,
            aux_factors,
            boiler_factors,
        } => {
            let paths = AfterJitPaths {
                ais: data(ais),
                aux_factors: data(aux_factors),
                boiler_factors: data(boiler_factors),
                output_dir: cli.output_dir.clone(),
            };
            let rows = after_jit::run(&paths, &config, &mut stdout, prompt.as_mut())?;
            info!(vessels = rows.len(), "After-JIT job finished");
        }
        Commands::Savings { before, after } => {
            let paths = SavingsPaths {
                before: data(before),
                after: data(after),
                output_dir: cli.output_dir.clone(),
            };
            let rows = savings::run(&paths, &config, &mut stdout, prompt.as_mut())?;
            info!(vessels = rows.len(), "Savings job finished");
        }
    }

    Ok(())
}
