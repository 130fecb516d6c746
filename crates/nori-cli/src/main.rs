//! NORI CLI
//!
//! Command-line interface for the NORI PHP tooling suite.

mod commands;
mod discovery;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;

use anyhow::Context;

use nori_core::config::ConfigLoader;
use nori_core::diagnostics::OutputFormat;
use nori_core::{init_tracing, Console};

#[derive(Parser)]
#[command(name = "nori")]
#[command(about = "NORI: fast PHP formatter and linter built on a lossless syntax tree")]
#[command(version = nori_core::VERSION)]
#[command(
    long_about = "NORI parses PHP into a lossless concrete syntax tree and uses it to\n\
format and lint without ever corrupting code it does not understand.\n\
\n\
Examples:\n  \
nori fmt                     # Format the current directory in place\n  \
nori fmt --check src/        # Diff without writing, exit 1 when dirty\n  \
nori lint                    # Lint the current directory\n  \
nori lint --format json app/ # Machine-readable findings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to nori.toml (default: discovered upward from the cwd)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads (default: number of CPU cores)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Format PHP files according to the configured style
    #[command(alias = "format")]
    Fmt {
        /// Files or directories to format (default: current directory)
        paths: Vec<PathBuf>,

        /// Check formatting without modifying files; exit 1 when any file
        /// would change or fails to parse
        #[arg(long, conflicts_with = "write")]
        check: bool,

        /// Write changes to files (the default behavior, kept explicit
        /// for scripting clarity)
        #[arg(long)]
        write: bool,
    },

    /// Lint PHP files for syntax errors and rule violations
    #[command(alias = "check")]
    Lint {
        /// Files or directories to lint (default: current directory)
        paths: Vec<PathBuf>,

        /// Output format for diagnostics
        #[arg(short, long, value_enum, default_value_t = DiagnosticFormat::Text)]
        format: DiagnosticFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DiagnosticFormat {
    Text,
    Json,
}

impl From<DiagnosticFormat> for OutputFormat {
    fn from(format: DiagnosticFormat) -> Self {
        match format {
            DiagnosticFormat::Text => OutputFormat::Text,
            DiagnosticFormat::Json => OutputFormat::JsonPretty,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(threads) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            error!("failed to configure thread pool: {e}");
            std::process::exit(2);
        }
    }

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    // invalid config aborts before any file is touched
    let config = ConfigLoader::load(cli.config.as_deref(), None)
        .context("could not load configuration")?;

    let mut console = Console::new();
    if cli.no_color {
        console = Console::no_colors();
    }

    let code = match cli.command {
        Commands::Fmt { paths, check, .. } => commands::fmt::run(
            &config,
            &commands::fmt::FmtOptions {
                paths,
                check,
                console,
            },
        )?,
        Commands::Lint { paths, format } => {
            let colors = !cli.no_color && console.colors_enabled();
            commands::lint::run(
                &config,
                &commands::lint::LintOptions {
                    paths,
                    format: format.into(),
                    colors,
                },
            )?
        }
    };
    Ok(code)
}
