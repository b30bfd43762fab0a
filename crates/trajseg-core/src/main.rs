//! Trajectory Segmentation CLI
//!
//! The main entry point for trajseg, handling:
//! - Transition graph construction (count, probabilities, regularize)
//! - Trajectory transformation into dissimilarity signals
//! - MDL segmentation of those signals
//! - Configuration management

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use trajseg_common::{format_error_human, Error, OutputFormat, StructuredError, SCHEMA_VERSION};
use trajseg_config::{
    config_json_schema, load_config, ConfigError, ConfigOptions, ConfigSnapshot, ConfigSource,
    ResolvedConfig,
};
use trajseg_core::exit_codes::ExitCode;
use trajseg_core::io::{self, Artifact};
use trajseg_core::log_event;
use trajseg_core::logging::{
    event_names, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use trajseg_core::state::StateInterner;
use trajseg_core::summary::{RunReport, RunSummary};
use trajseg_core::Pipeline;

/// Trajectory segmentation via transition graphs and MDL
#[derive(Parser)]
#[command(name = "trajseg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to config.json (overrides TRAJSEG_CONFIG and XDG lookup)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run summary format on stdout
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Count transitions between consecutive samples
    Count(StageArgs),

    /// Turn a transition frequency table into probabilities
    Probabilities(StageArgs),

    /// Regularize a probability table over state neighborhoods
    Regularize(StageArgs),

    /// Count, estimate and regularize in one go
    BuildGraph(BuildGraphArgs),

    /// Transform trajectories into dissimilarity signals
    Transform(TransformArgs),

    /// Segment dissimilarity signals
    Segment(StageArgs),

    /// Full pipeline: build the graph, transform and segment
    Run(RunArgs),

    /// Configuration management
    Config(ConfigArgs),
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct StageArgs {
    /// Input table
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Output table
    #[arg(long, short = 'o')]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct BuildGraphArgs {
    /// Raw trajectory table
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Directory for transitions.csv, probabilities.csv and regularized.csv
    #[arg(long)]
    output_dir: PathBuf,
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// Raw trajectory table
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Regularized probability table
    #[arg(long, short = 'g')]
    graph: PathBuf,

    /// Dissimilarity table to write
    #[arg(long, short = 'o')]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Raw trajectories used to build the graph
    #[arg(long)]
    graph_input: PathBuf,

    /// Raw trajectories to segment (defaults to --graph-input)
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Directory for every intermediate and final table
    #[arg(long)]
    output_dir: PathBuf,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Print the JSON schema of config.json
    Schema,

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the resolved config)
        path: Option<PathBuf>,
    },
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Count(args) => run_count(&cli.global, args),
        Commands::Probabilities(args) => run_probabilities(&cli.global, args),
        Commands::Regularize(args) => run_regularize(&cli.global, args),
        Commands::BuildGraph(args) => run_build_graph(&cli.global, args),
        Commands::Transform(args) => run_transform(&cli.global, args),
        Commands::Segment(args) => run_segment(&cli.global, args),
        Commands::Run(args) => run_pipeline(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Stage commands
// ============================================================================

/// Load config, run `body` and print the run summary.
fn execute<F>(global: &GlobalOpts, command: &str, body: F) -> ExitCode
where
    F: FnOnce(&Pipeline, &mut RunReport) -> trajseg_common::Result<()>,
{
    let started_at = Utc::now();
    let ctx = LogContext::generate();

    let resolved = match resolve_config(global) {
        Ok(resolved) => resolved,
        Err(e) => {
            log_event!(ctx, ERROR, event_names::CONFIG_ERROR, Stage::Init, e.to_string());
            return output_config_error(global, e);
        }
    };
    log_event!(
        ctx,
        INFO,
        event_names::CONFIG_LOADED,
        Stage::Init,
        "Configuration loaded",
        source = tracing::field::display(resolved.source)
    );
    log_event!(
        ctx,
        INFO,
        event_names::RUN_STARTED,
        Stage::Init,
        "Run started",
        command = command
    );

    let pipeline = Pipeline::new(resolved.config.clone(), ctx.clone());
    let mut report = RunReport::new();
    let exit_code = match body(&pipeline, &mut report) {
        Ok(()) => ExitCode::Clean,
        Err(err) => {
            let code = ExitCode::from(&err);
            if code.is_operational() {
                log_event!(ctx, WARN, event_names::RUN_NOTHING_TO_PROCESS, Stage::Init, err.to_string());
            } else if code.is_internal_error() && !matches!(err, Error::Io(_)) {
                log_event!(ctx, ERROR, event_names::INTERNAL_ERROR, Stage::Init, err.to_string());
            } else {
                log_event!(ctx, ERROR, event_names::RUN_FAILED, Stage::Init, err.to_string());
            }
            output_error(global, &err);
            code
        }
    };

    log_event!(
        ctx,
        INFO,
        event_names::RUN_FINISHED,
        Stage::Write,
        "Run finished",
        exit_code = exit_code.as_i32() as i64
    );

    let summary = RunSummary::new(
        ctx.run_id.clone(),
        command,
        started_at,
        resolved.snapshot(),
        report,
        exit_code,
    );
    match print_summary(global.format, &summary) {
        Ok(()) => exit_code,
        Err(_) => ExitCode::InternalError,
    }
}

fn run_count(global: &GlobalOpts, args: &StageArgs) -> ExitCode {
    execute(global, "count", |p, report| {
        let trips = p.load_trajectories(&args.input, Stage::Count, report)?;
        let mut interner = StateInterner::new();
        let counts = p.count(&trips, &mut interner, report)?;
        p.write_artifact(Artifact::Transitions, &args.output, report, |w| {
            io::write_counts(w, &counts, &interner)
        })?;
        Ok(())
    })
}

fn run_probabilities(global: &GlobalOpts, args: &StageArgs) -> ExitCode {
    execute(global, "probabilities", |p, report| {
        let mut interner = StateInterner::new();
        let counts = p.load_counts(&args.input, &mut interner, report)?;
        let model = p.estimate(&counts, &interner, report)?;
        p.write_artifact(Artifact::Probabilities, &args.output, report, |w| {
            io::write_probabilities(w, &model, &interner)
        })?;
        Ok(())
    })
}

fn run_regularize(global: &GlobalOpts, args: &StageArgs) -> ExitCode {
    execute(global, "regularize", |p, report| {
        let mut interner = StateInterner::new();
        let model = p.load_probabilities(&args.input, &mut interner, report)?;
        let graph = p.regularize(&model.graph, &mut interner, report)?;
        p.write_artifact(Artifact::Regularized, &args.output, report, |w| {
            io::write_graph(w, &graph, &interner)
        })?;
        Ok(())
    })
}

fn run_build_graph(global: &GlobalOpts, args: &BuildGraphArgs) -> ExitCode {
    execute(global, "build-graph", |p, report| {
        let trips = p.load_trajectories(&args.input, Stage::Count, report)?;
        let built = p.build_graph(&trips, report)?;
        p.write_graph_artifacts(&built, &args.output_dir, report)
    })
}

fn run_transform(global: &GlobalOpts, args: &TransformArgs) -> ExitCode {
    execute(global, "transform", |p, report| {
        let mut interner = StateInterner::new();
        let graph = p.load_graph(&args.graph, &mut interner, report)?;
        let trips = p.load_trajectories(&args.input, Stage::Transform, report)?;
        let signals = p.transform(&trips, &graph, &interner, report)?;
        p.write_artifact(Artifact::Dissimilarities, &args.output, report, |w| {
            io::write_signals(w, &signals)
        })?;
        Ok(())
    })
}

fn run_segment(global: &GlobalOpts, args: &StageArgs) -> ExitCode {
    execute(global, "segment", |p, report| {
        let signals = p.load_signals(&args.input, report)?;
        let segmented = p.segment(&signals, report)?;
        p.write_artifact(Artifact::Segmentation, &args.output, report, |w| {
            io::write_segmentation(w, &segmented)
        })?;
        Ok(())
    })
}

fn run_pipeline(global: &GlobalOpts, args: &RunArgs) -> ExitCode {
    execute(global, "run", |p, report| {
        let segment_input = args.input.as_deref().unwrap_or(args.graph_input.as_path());
        p.run(&args.graph_input, segment_input, &args.output_dir, report)?;
        Ok(())
    })
}

// ============================================================================
// Config commands
// ============================================================================

fn resolve_config(global: &GlobalOpts) -> Result<ResolvedConfig, ConfigError> {
    load_config(&ConfigOptions {
        config_path: global.config.clone(),
    })
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => run_config_show(global),
        ConfigCommands::Schema => emit_json(global.format, &config_json_schema()),
        ConfigCommands::Validate { path } => run_config_validate(global, path.as_deref()),
    }
}

/// Display the effective configuration (defaults if no file is found).
fn run_config_show(global: &GlobalOpts) -> ExitCode {
    let resolved = match resolve_config(global) {
        Ok(c) => c,
        Err(e) => return output_config_error(global, e),
    };
    let snapshot = resolved.snapshot();

    if global.format == OutputFormat::Summary {
        let path = snapshot
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in defaults".to_string());
        println!(
            "config: source={} path={} hash={}",
            snapshot.source, path, snapshot.effective_hash
        );
        return ExitCode::Clean;
    }

    let response = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": Utc::now().to_rfc3339(),
        "snapshot": snapshot,
        "config": &resolved.config,
    });
    emit_json(global.format, &response)
}

/// Validate a configuration file (or the resolved one).
fn run_config_validate(global: &GlobalOpts, path: Option<&Path>) -> ExitCode {
    let resolved = match path {
        Some(path) => trajseg_config::load::load_config_file(path).map(|(config, raw)| {
            ConfigSnapshot::new(
                &config,
                ConfigSource::CliArgument,
                Some(path.to_path_buf()),
                Some(&raw),
            )
        }),
        None => resolve_config(global).map(|r| r.snapshot()),
    };

    match resolved {
        Ok(snapshot) => {
            if global.format == OutputFormat::Summary {
                println!("config validate: OK ({})", snapshot.source);
                return ExitCode::Clean;
            }
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "generated_at": Utc::now().to_rfc3339(),
                "status": "valid",
                "snapshot": snapshot,
            });
            emit_json(global.format, &response)
        }
        Err(e) => output_config_error(global, e),
    }
}

// ============================================================================
// Output helpers
// ============================================================================

fn emit_json<T: Serialize>(format: OutputFormat, value: &T) -> ExitCode {
    let rendered = match format {
        OutputFormat::Exitcode => return ExitCode::Clean,
        OutputFormat::Jsonl => serde_json::to_string(value),
        OutputFormat::Json | OutputFormat::Summary => serde_json::to_string_pretty(value),
    };
    match rendered {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(e) => {
            eprintln!("failed to serialize output: {}", e);
            ExitCode::InternalError
        }
    }
}

fn print_summary(format: OutputFormat, summary: &RunSummary) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Jsonl => println!("{}", serde_json::to_string(summary)?),
        OutputFormat::Summary => println!("{}", summary.one_line()),
        OutputFormat::Exitcode => {}
    }
    Ok(())
}

/// Report a stage error on stderr in the requested format.
fn output_error(global: &GlobalOpts, err: &Error) {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            eprintln!("{}", StructuredError::from(err).to_json());
        }
        OutputFormat::Summary => {
            use std::io::IsTerminal;
            eprintln!("{}", format_error_human(err, std::io::stderr().is_terminal()));
        }
        OutputFormat::Exitcode => {}
    }
}

/// Output a config error in the appropriate format.
fn output_config_error(global: &GlobalOpts, error: ConfigError) -> ExitCode {
    let message = error.to_string();
    let err = Error::from(error);
    let response = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": Utc::now().to_rfc3339(),
        "status": "error",
        "error": {
            "code": err.code(),
            "category": err.category(),
            "message": message,
        }
    });

    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => match serde_json::to_string(&response) {
            Ok(text) => eprintln!("{}", text),
            Err(_) => eprintln!("config error: {}", message),
        },
        OutputFormat::Summary => eprintln!("config error: {}", message),
        OutputFormat::Exitcode => {}
    }

    ExitCode::ConfigError
}
