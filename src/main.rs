//! CLI entry point for statdiff

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use statdiff::output::{ChangeOutput, write_changes};
use statdiff::{
    Change, ComparisonPolicy, CompareConfig, ErrorMode, JsonFormatter, OutputConfig,
    TextFormatter, TreeDiff, compare_parallel,
};
use tracing::debug;

/// Exit status when the trees are identical.
const EXIT_SAME: i32 = 0;
/// Exit status when differences were found.
const EXIT_DIFFERENT: i32 = 1;
/// Exit status for usage, policy and I/O errors, including entries that
/// were skipped under `--keep-going`.
const EXIT_TROUBLE: i32 = 2;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "statdiff")]
#[command(about = "Compare two directory trees: permissions, ownership, links and content")]
#[command(version)]
struct Args {
    /// Old (reference) tree
    old: PathBuf,

    /// New tree
    new: PathBuf,

    /// Explain why entries differ (attribute values, link targets)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Do not compare owner ids
    #[arg(long = "ignore-owner")]
    ignore_owner: bool,

    /// Do not compare group ids
    #[arg(long = "ignore-group")]
    ignore_group: bool,

    /// Do not compare permission bits
    #[arg(long = "ignore-perms")]
    ignore_perms: bool,

    /// Exclude an attribute from comparison: mode, owner, group, size
    /// (can be used multiple times)
    #[arg(short = 'x', long = "exclude", value_name = "ATTR")]
    exclude: Vec<String>,

    /// Skip entries whose name matches pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Output one JSON object per change
    #[arg(long = "json")]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Number of parallel workers
    /// (1 = sequential streaming, 0 = auto-detect, N = use N workers)
    #[arg(short = 'j', long = "jobs", default_value = "1")]
    jobs: usize,

    /// Give up after DURATION (e.g. 30s, 5m)
    #[arg(long = "timeout", value_name = "DURATION")]
    timeout: Option<String>,

    /// Report unreadable entries and keep comparing instead of stopping
    #[arg(short = 'k', long = "keep-going")]
    keep_going: bool,

    /// Diagnostic log level (written to stderr)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    log_level: LogLevel,
}

/// Parse a duration string like "30s", "5m" into a Duration.
fn parse_duration_string(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim()).map_err(|e| e.to_string())
}

fn setup_tracing(level: LogLevel) {
    if let Some(level) = level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}

/// Map the outcome of a run to its exit status.
fn exit_code(result: &statdiff::Result<usize>, unreadable: usize) -> i32 {
    match result {
        Err(_) => EXIT_TROUBLE,
        Ok(_) if unreadable > 0 => EXIT_TROUBLE,
        Ok(0) => EXIT_SAME,
        Ok(_) => EXIT_DIFFERENT,
    }
}

/// Collect exclusions from the dedicated flags and `--exclude`.
fn build_policy(args: &Args) -> Result<ComparisonPolicy, statdiff::PolicyError> {
    let flags = [
        (args.ignore_perms, "mode"),
        (args.ignore_owner, "owner"),
        (args.ignore_group, "group"),
    ];
    let excluded = flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| name.to_string())
        .chain(args.exclude.iter().cloned());
    ComparisonPolicy::excluding(excluded)
}

fn main() {
    let args = Args::parse();
    setup_tracing(args.log_level);
    debug!("Parsed CLI arguments: {args:?}");

    let policy = build_policy(&args).unwrap_or_else(|e| {
        eprintln!("statdiff: {}", e);
        process::exit(EXIT_TROUBLE);
    });

    let timeout = args.timeout.as_ref().map(|s| {
        parse_duration_string(s).unwrap_or_else(|e| {
            eprintln!("statdiff: invalid --timeout duration '{}': {}", s, e);
            process::exit(EXIT_TROUBLE);
        })
    });

    let compare_config = CompareConfig {
        policy: policy.clone(),
        ignore_patterns: args.ignore.clone(),
        parallel_workers: args.jobs,
        timeout,
        error_mode: if args.keep_going {
            ErrorMode::Report
        } else {
            ErrorMode::Abort
        },
        ..Default::default()
    };

    let output_config = OutputConfig {
        use_color: !args.json && should_use_color(args.color),
        verbosity: args.verbose,
        policy,
    };

    let mut output: Box<dyn ChangeOutput> = if args.json {
        Box::new(JsonFormatter::stdout(output_config))
    } else {
        Box::new(TextFormatter::stdout(output_config))
    };

    let changes: Box<dyn Iterator<Item = statdiff::Result<Change>>> =
        if compare_config.is_parallel() {
            match compare_parallel(&args.old, &args.new, &compare_config) {
                Ok(changes) => Box::new(changes.into_iter().map(Ok)),
                Err(e) => Box::new(std::iter::once(Err(e))),
            }
        } else {
            Box::new(TreeDiff::new(&args.old, &args.new, compare_config))
        };

    let mut unreadable = 0;
    let result = write_changes(
        changes.inspect(|change| {
            if matches!(change, Ok(Change::Unreadable { .. })) {
                unreadable += 1;
            }
        }),
        output.as_mut(),
    );

    match &result {
        Ok(count) => debug!(count, unreadable, "comparison finished"),
        Err(e) => eprintln!("statdiff: {}", e),
    }
    let code = exit_code(&result, unreadable);
    if code != EXIT_SAME {
        process::exit(code);
    }
}
