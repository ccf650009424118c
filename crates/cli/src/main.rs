use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};

use ngram_core::report::ReportFlags;
use pe_ngram::commands::{analyze_command, list_strategies_command, sections_command, AnalyzeOptions};
use pe_ngram::logging::init_logging;

/// Entropy profiles and bit-granular n-gram distributions for PE files.
///
/// This CLI is a thin wrapper around `ngram-core` (exposed in code as `ngram_core`).
/// Without a subcommand it runs the full extraction pipeline on one sample.
#[derive(Parser, Debug)]
#[command(
    name = "pe-ngram",
    version,
    about = "Entropy profiles and bit-granular n-gram distributions for PE files",
    long_about = None,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, default_value_t = false, global = true)]
    log_json: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the PE sample.
    #[arg(short, long, required = true)]
    input: Option<String>,

    /// Directory receiving the reports (created if missing).
    #[arg(short, long, required = true)]
    output: Option<String>,

    /// N-gram width in bytes (1-4; 3 is the practical cap for memory).
    #[arg(
        short,
        long,
        required_unless_present = "config",
        value_parser = clap::value_parser!(u8).range(1..=4)
    )]
    dimension: Option<u8>,

    /// Reports to produce: any of `e` (entropy), `t` (n-gram text), `i` (image). Empty means all.
    #[arg(short, long, value_parser = parse_report_flags)]
    report: Option<String>,

    /// Region selection strategy (see `strategies`).
    #[arg(long)]
    region: Option<String>,

    /// Model building strategy (see `strategies`).
    #[arg(long)]
    model: Option<String>,

    /// Drop slices whose score falls below this ratio.
    #[arg(long)]
    truncate: Option<f64>,

    /// Ring buffer capacity in bytes.
    #[arg(long)]
    ring_capacity: Option<usize>,

    /// YAML or JSON settings file; explicit flags override its values.
    #[arg(long)]
    config: Option<String>,

    /// Emit a JSON run summary instead of human-readable text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered region selectors and model builders.
    Strategies {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the section table of a sample with entropy summaries.
    Sections {
        /// Path to the PE sample.
        #[arg(short, long)]
        input: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn parse_report_flags(value: &str) -> Result<String, String> {
    ReportFlags::parse(value).map(|_| value.to_string()).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Some(Command::Strategies { json }) => list_strategies_command(json)?,
        Some(Command::Sections { input, json }) => sections_command(&input, json)?,
        None => {
            let run = cli.run;
            let opts = AnalyzeOptions {
                input: run.input.unwrap_or_default(),
                output: run.output.unwrap_or_default(),
                dimension: run.dimension,
                report: run.report,
                region: run.region,
                model: run.model,
                truncate: run.truncate,
                ring_capacity: run.ring_capacity,
                config: run.config,
                json: run.json,
            };
            analyze_command(&opts)?
        }
    }

    Ok(())
}
