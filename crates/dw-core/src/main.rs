//! dumpwatch - thread dump time-series analysis
//!
//! The main entry point for dw-core, handling:
//! - Loading an already-parsed snapshot series
//! - CPU consumer ranking
//! - Lock contention (monitor) reports
//! - Series summaries and configuration inspection

use clap::{Args, Parser, Subcommand};
use dw_common::{CpuMode, OutputFormat, SnapshotSeries, StructuredError, SCHEMA_VERSION};
use dw_config::validate::validate_analysis;
use dw_core::config::{load_config, AnalysisConfig, ResolvedConfig};
use dw_core::contention::MonitorFilter;
use dw_core::exit_codes::ExitCode;
use dw_core::input::load_series;
use dw_core::log_event;
use dw_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use dw_core::report::{CpuReport, MonitorReport, Render, SummaryReport};
use std::path::{Path, PathBuf};

/// dumpwatch - CPU and lock contention analysis over thread dump series
#[derive(Parser)]
#[command(name = "dw-core")]
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
    /// Path to analysis.json (overrides DW_CONFIG and the config directories)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank threads by aggregated CPU usage
    Cpu(CpuArgs),

    /// Show contended locks
    Monitors(MonitorsArgs),

    /// Summarize the snapshot series
    Summary(InputArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Snapshot series JSON document ("-" for stdin)
    file: PathBuf,
}

#[derive(Args, Debug)]
struct CpuArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Aggregation mode
    #[arg(long)]
    mode: Option<CpuMode>,

    /// Maximum number of consumers to show
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
struct MonitorsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Only locks that had an owner at some point
    #[arg(long)]
    with_owner: bool,

    /// Only locks that never had an owner
    #[arg(long)]
    without_owner: bool,

    /// Keep locks that look like idle worker queues
    #[arg(long)]
    include_idle: bool,

    /// Waiter stack depth above which contention is considered real
    #[arg(long)]
    queue_stack_depth: Option<usize>,
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
    let cli = Cli::parse();

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let ctx = LogContext::new(generate_run_id());
    log_event!(ctx, DEBUG, event_names::RUN_STARTED, Stage::Init, "dw-core starting");

    let result = match &cli.command {
        Commands::Cpu(args) => run_cpu(&cli.global, args, &ctx),
        Commands::Monitors(args) => run_monitors(&cli.global, args, &ctx),
        Commands::Summary(args) => run_summary(&cli.global, args, &ctx),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Version => version_payload(&cli.global),
    };

    let exit_code = match result {
        Ok(payload) => {
            if !payload.is_empty() {
                println!("{}", payload.trim_end());
            }
            ExitCode::Clean
        }
        Err(err) => output_error(&cli.global, &ctx, &err),
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Report,
        "dw-core finished",
        exit_code = exit_code.as_i32()
    );
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_cpu(global: &GlobalOpts, args: &CpuArgs, ctx: &LogContext) -> dw_common::Result<String> {
    let mut config = effective_config(global, ctx)?;
    if let Some(mode) = args.mode {
        config.cpu.mode = mode;
    }
    if let Some(limit) = args.limit {
        config.cpu.limit = limit;
    }
    validate_analysis(&config)?;

    let ctx = ctx.clone().with_input(args.input.file.display().to_string());
    let series = load(&args.input.file, &ctx)?;

    let report = CpuReport::build(&series.snapshots, config.cpu.mode, config.cpu.limit);
    log_event!(
        ctx,
        INFO,
        event_names::CPU_RANKED,
        Stage::Cpu,
        "CPU consumers ranked",
        mode = report.mode.to_string().as_str(),
        consumers = report.total_consumers,
        shown = report.consumers.len()
    );
    report.render(global.format)
}

fn run_monitors(
    global: &GlobalOpts,
    args: &MonitorsArgs,
    ctx: &LogContext,
) -> dw_common::Result<String> {
    let mut config = effective_config(global, ctx)?;
    let settings = &mut config.monitors;
    if args.with_owner {
        settings.with_owner = true;
    }
    if args.without_owner {
        settings.without_owner = true;
    }
    if args.include_idle {
        settings.without_idle = false;
    }
    if let Some(depth) = args.queue_stack_depth {
        settings.queue_stack_depth = depth;
    }
    validate_analysis(&config)?;

    let ctx = ctx.clone().with_input(args.input.file.display().to_string());
    let series = load(&args.input.file, &ctx)?;

    let report = MonitorReport::build(&series.snapshots, MonitorFilter::from(&config.monitors));
    log_event!(
        ctx,
        INFO,
        event_names::MONITORS_FILTERED,
        Stage::Monitors,
        "Monitors filtered",
        total = report.total_monitors,
        shown = report.monitors.len()
    );
    report.render(global.format)
}

fn run_summary(global: &GlobalOpts, args: &InputArgs, ctx: &LogContext) -> dw_common::Result<String> {
    let ctx = ctx.clone().with_input(args.file.display().to_string());
    let series = load(&args.file, &ctx)?;

    let report = SummaryReport::build(&series.snapshots);
    log_event!(
        ctx,
        INFO,
        event_names::SUMMARY_BUILT,
        Stage::Summary,
        "Series summarized",
        threads = report.summary.distinct_threads,
        locks = report.summary.distinct_locks
    );
    report.render(global.format)
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> dw_common::Result<String> {
    match &args.command {
        ConfigCommands::Show => {
            let resolved = load_config(global.config.as_deref())?;
            config_payload(global, &resolved, "show")
        }
        ConfigCommands::Validate { path } => {
            let path = path.as_deref().or(global.config.as_deref());
            let resolved = load_config(path)?;
            config_payload(global, &resolved, "valid")
        }
    }
}

fn version_payload(global: &GlobalOpts) -> dw_common::Result<String> {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "dw_core_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    Ok(match global.format {
        OutputFormat::Json => serde_json::to_string_pretty(&version_info)?,
        _ => format!(
            "dw-core {}\nschema version: {}",
            env!("CARGO_PKG_VERSION"),
            SCHEMA_VERSION
        ),
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn effective_config(global: &GlobalOpts, ctx: &LogContext) -> dw_common::Result<AnalysisConfig> {
    let resolved = load_config(global.config.as_deref())?;
    log_event!(
        ctx,
        DEBUG,
        event_names::CONFIG_LOADED,
        Stage::Init,
        "Configuration loaded",
        source = resolved.source.to_string().as_str()
    );
    Ok(resolved.config)
}

fn load(path: &Path, ctx: &LogContext) -> dw_common::Result<SnapshotSeries> {
    let series = load_series(path)?;
    if series.is_empty() {
        log_event!(
            ctx,
            WARN,
            event_names::SERIES_EMPTY,
            Stage::Load,
            "Snapshot series contains no dumps"
        );
    } else {
        log_event!(
            ctx,
            INFO,
            event_names::SERIES_LOADED,
            Stage::Load,
            "Snapshot series loaded",
            dumps = series.len()
        );
    }
    Ok(series)
}

fn config_payload(
    global: &GlobalOpts,
    resolved: &ResolvedConfig,
    status: &str,
) -> dw_common::Result<String> {
    let path = resolved.path.as_ref().map(|p| p.display().to_string());
    Ok(match global.format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "status": status,
            "source": resolved.source.to_string(),
            "path": path,
            "config": resolved.config,
        }))?,
        OutputFormat::Summary => format!(
            "config {} ({}{})",
            status,
            resolved.source,
            path.map(|p| format!(": {}", p)).unwrap_or_default()
        ),
        OutputFormat::Md => {
            let body = serde_json::to_string_pretty(&resolved.config)?;
            format!(
                "# Configuration\nSource: {}\n\n```json\n{}\n```",
                resolved.source, body
            )
        }
    })
}

/// Report an error on stderr and map it to an exit code.
fn output_error(global: &GlobalOpts, ctx: &LogContext, error: &dw_common::Error) -> ExitCode {
    let exit_code = ExitCode::from(error);
    let message = error.to_string();

    match exit_code {
        ExitCode::ArgsError => log_event!(
            ctx,
            WARN,
            event_names::CONFIG_ERROR,
            Stage::Init,
            "Configuration rejected",
            error = message.as_str()
        ),
        ExitCode::InputError | ExitCode::IoError => log_event!(
            ctx,
            WARN,
            event_names::INPUT_ERROR,
            Stage::Load,
            "Input rejected",
            error = message.as_str()
        ),
        _ => log_event!(
            ctx,
            ERROR,
            event_names::INTERNAL_ERROR,
            Stage::Report,
            "Command failed",
            error = message.as_str()
        ),
    }

    match global.format {
        OutputFormat::Json => {
            let structured = StructuredError::from(error)
                .with_context("run_id", &ctx.run_id)
                .with_context("exit_code", exit_code.as_i32());
            eprintln!("{}", structured.to_json());
        }
        OutputFormat::Summary => {
            eprintln!("[{}] {}: {}", ctx.run_id, exit_code.code_name(), error);
        }
        OutputFormat::Md => {
            eprintln!("{}", error.format_human());
        }
    }

    exit_code
}
