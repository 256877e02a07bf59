//! Mindwell CLI - Command-line interface for the Mindwell engine
//!
//! Commands:
//! - record: Append a mood check-in or feature use to the behavior log
//! - profile / recommend / reminders / quote: Personalization output
//! - score: Calculate and store a wellness score
//! - history: Show stored daily scores
//! - doctor: Diagnose configuration and stored state

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use mindwell::behavior::BehaviorLog;
use mindwell::config::EngineConfig;
use mindwell::history::ScoreSnapshot;
use mindwell::pipeline::{ScoreRequest, WellnessProcessor};
use mindwell::storage::{JsonFileStore, MemoryStore, WellnessStore};
use mindwell::types::{Mood, Trend};
use mindwell::{WellnessError, MINDWELL_VERSION, PRODUCER_NAME};

/// Mindwell - On-device personalization and wellness scoring
#[derive(Parser)]
#[command(name = "mindwell")]
#[command(version = MINDWELL_VERSION)]
#[command(about = "Personalized recommendations and wellness scores from your mood log", long_about = None)]
struct Cli {
    /// Directory holding the behavior log and score history
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use this behavior log file instead of the data directory
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Reference time (RFC 3339), defaults to now
    #[arg(long, global = true)]
    now: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "json-pretty")]
    format: OutputFormat,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a behavior event
    Record {
        #[command(subcommand)]
        event: RecordEvent,
    },

    /// Print the derived behavior profile
    Profile,

    /// Print ranked recommendations
    Recommend,

    /// Print the adaptive reminder schedule
    Reminders,

    /// Print the quote of the day
    Quote,

    /// Calculate a wellness score and store today's snapshot
    Score {
        /// Score request file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show stored daily scores
    History {
        /// Number of most recent days to show
        #[arg(long, default_value = "30")]
        days: usize,
    },

    /// Diagnose configuration and stored state
    Doctor,
}

#[derive(Subcommand)]
enum RecordEvent {
    /// Record a mood check-in
    Mood {
        #[arg(value_enum)]
        mood: MoodArg,

        /// Contributing factor (repeatable)
        #[arg(long = "factor")]
        factors: Vec<String>,
    },

    /// Record use of an app feature (e.g. journal, gratitude)
    Feature { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum MoodArg {
    Happy,
    Excited,
    Calm,
    Neutral,
    Anxious,
    Sad,
    Angry,
}

impl From<MoodArg> for Mood {
    fn from(arg: MoodArg) -> Self {
        match arg {
            MoodArg::Happy => Mood::Happy,
            MoodArg::Excited => Mood::Excited,
            MoodArg::Calm => Mood::Calm,
            MoodArg::Neutral => Mood::Neutral,
            MoodArg::Anxious => Mood::Anxious,
            MoodArg::Sad => Mood::Sad,
            MoodArg::Angry => Mood::Angry,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), MindwellCliError> {
    let now = parse_now(cli.now.as_deref())?;
    let format = cli.format;

    if let Commands::Doctor = cli.command {
        return cmd_doctor(&cli, format);
    }

    let config = load_config(cli.config.as_deref())?;
    let mut processor = open_processor(&cli, config)?;

    match cli.command {
        Commands::Record { event } => {
            match event {
                RecordEvent::Mood { mood, factors } => {
                    processor.record_mood(mood.into(), factors, now)?
                }
                RecordEvent::Feature { name } => processor.record_feature_use(&name, now)?,
            }
            if let Some(path) = &cli.log {
                fs::write(path, processor.save_log()?)?;
            }
            emit(&processor.behavior(now), format)
        }
        Commands::Profile => emit(&processor.behavior(now), format),
        Commands::Recommend => emit(&processor.recommendations(now), format),
        Commands::Reminders => emit(&processor.reminders(now), format),
        Commands::Quote => emit(&processor.quote(now), format),
        Commands::Score { input } => {
            let request: ScoreRequest = serde_json::from_str(&read_input(&input)?)?;
            // A log in the request only informs this calculation; the stored log stays as is
            let behavior = match &request.log {
                Some(log) => {
                    debug!(events = log.len(), "using behavior log from score request");
                    processor.behavior_of(log, now)
                }
                None => processor.behavior(now),
            };
            let score = processor.calculate_score_with(
                &request.mood_entries,
                &request.journal_entries,
                &request.mindfulness_sessions,
                behavior.as_ref(),
                now,
            )?;
            emit(&score, format)
        }
        Commands::History { days } => {
            let history = processor.history();
            emit(
                &HistoryReport {
                    trend: history.overall_trend(),
                    snapshots: history.recent(days),
                },
                format,
            )
        }
        Commands::Doctor => Ok(()),
    }
}

/// Processor backed by the data directory, or by `--log` kept in memory
fn open_processor(
    cli: &Cli,
    config: EngineConfig,
) -> Result<WellnessProcessor<Box<dyn WellnessStore>>, MindwellCliError> {
    let store: Box<dyn WellnessStore> = match &cli.log {
        Some(path) => {
            let mut store = MemoryStore::new();
            if path.exists() {
                store.save_log(&BehaviorLog::from_json(&fs::read_to_string(path)?)?)?;
            }
            Box::new(store)
        }
        None => Box::new(JsonFileStore::new(data_dir(cli)?)),
    };
    Ok(WellnessProcessor::with_config(store, config)?)
}

fn data_dir(cli: &Cli) -> Result<PathBuf, MindwellCliError> {
    match &cli.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(JsonFileStore::default_location()?),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, MindwellCliError> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>, MindwellCliError> {
    match now {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| MindwellCliError::InvalidTime(format!("{s}: {e}"))),
        None => Ok(Utc::now()),
    }
}

fn read_input(input: &Path) -> Result<String, MindwellCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn emit<T: Serialize>(value: &T, format: OutputFormat) -> Result<(), MindwellCliError> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    println!("{output}");
    Ok(())
}

fn cmd_doctor(cli: &Cli, format: OutputFormat) -> Result<(), MindwellCliError> {
    let mut checks = Vec::new();

    match &cli.config {
        None => checks.push(DoctorCheck::ok("config", "Using default configuration")),
        Some(path) => checks.push(match load_config(Some(path)) {
            Ok(_) => DoctorCheck::ok("config", &format!("{} is valid", path.display())),
            Err(e) => DoctorCheck::error("config", &CliError::from(e).message),
        }),
    }

    match &cli.log {
        Some(path) => checks.push(check_log_file(path)),
        None => match data_dir(cli) {
            Ok(dir) => {
                let store = JsonFileStore::new(&dir);
                if dir.exists() {
                    checks.push(DoctorCheck::ok(
                        "data_dir",
                        &format!("{} exists", dir.display()),
                    ));
                } else {
                    checks.push(DoctorCheck::warning(
                        "data_dir",
                        &format!("{} does not exist yet", dir.display()),
                    ));
                }
                checks.push(match store.load_log() {
                    Ok(Some(log)) => {
                        DoctorCheck::ok("behavior_log", &format!("{} events", log.len()))
                    }
                    Ok(None) => DoctorCheck::warning("behavior_log", "No events recorded yet"),
                    Err(e) => DoctorCheck::error("behavior_log", &e.to_string()),
                });
                checks.push(match store.load_history() {
                    Ok(Some(history)) => DoctorCheck::ok(
                        "score_history",
                        &format!("{} daily snapshots", history.len()),
                    ),
                    Ok(None) => DoctorCheck::warning("score_history", "No scores stored yet"),
                    Err(e) => DoctorCheck::error("score_history", &e.to_string()),
                });
            }
            Err(e) => checks.push(DoctorCheck::error("data_dir", &CliError::from(e).message)),
        },
    }

    checks.push(if atty::is(atty::Stream::Stdin) {
        DoctorCheck::ok("stdin", "stdin is a TTY (use --input <file> for scores)")
    } else {
        DoctorCheck::ok("stdin", "stdin is a pipe (score --input - ready)")
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: MINDWELL_VERSION.to_string(),
        checks,
    };
    emit(&report, format)?;

    if report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error))
    {
        Err(MindwellCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_log_file(path: &Path) -> DoctorCheck {
    if !path.exists() {
        return DoctorCheck::warning("behavior_log", "Log file does not exist");
    }
    match fs::read_to_string(path)
        .map_err(WellnessError::from)
        .and_then(|json| BehaviorLog::from_json(&json))
    {
        Ok(log) => DoctorCheck::ok("behavior_log", &format!("{} events", log.len())),
        Err(e) => DoctorCheck::error("behavior_log", &e.to_string()),
    }
}

// Error types

#[derive(Debug)]
enum MindwellCliError {
    Io(io::Error),
    Engine(WellnessError),
    Json(serde_json::Error),
    InvalidTime(String),
    DoctorFailed,
}

impl From<io::Error> for MindwellCliError {
    fn from(e: io::Error) -> Self {
        MindwellCliError::Io(e)
    }
}

impl From<WellnessError> for MindwellCliError {
    fn from(e: WellnessError) -> Self {
        MindwellCliError::Engine(e)
    }
}

impl From<serde_json::Error> for MindwellCliError {
    fn from(e: serde_json::Error) -> Self {
        MindwellCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(code: &str, message: String, hint: &str) -> Self {
        Self {
            code: code.to_string(),
            message,
            hint: Some(hint.to_string()),
        }
    }
}

impl From<MindwellCliError> for CliError {
    fn from(e: MindwellCliError) -> Self {
        match e {
            MindwellCliError::Io(e) => {
                CliError::new("IO_ERROR", e.to_string(), "Check file paths and permissions")
            }
            MindwellCliError::Json(e) => CliError::new("JSON_ERROR", e.to_string(), "Check JSON syntax"),
            MindwellCliError::InvalidTime(msg) => CliError::new(
                "INVALID_TIME",
                msg,
                "Use an RFC 3339 timestamp, e.g. 2024-05-20T09:00:00Z",
            ),
            MindwellCliError::DoctorFailed => CliError::new(
                "DOCTOR_FAILED",
                "One or more health checks failed".to_string(),
                "Review the doctor report for details",
            ),
            MindwellCliError::Engine(e) => {
                let message = e.to_string();
                match e {
                    WellnessError::InvalidConfig(_) => {
                        CliError::new("CONFIG_ERROR", message, "Fix the configuration file")
                    }
                    WellnessError::InvalidEvent(_) => {
                        CliError::new("INVALID_EVENT", message, "Feature names must not be empty")
                    }
                    WellnessError::StorageError(_) | WellnessError::Io(_) => CliError::new(
                        "STORAGE_ERROR",
                        message,
                        "Pass --data-dir to choose a writable directory",
                    ),
                    WellnessError::JsonError(_) => CliError::new(
                        "PARSE_ERROR",
                        message,
                        "Stored state or input is not valid Mindwell JSON",
                    ),
                }
            }
        }
    }
}

// Report types

#[derive(Serialize)]
struct HistoryReport<'a> {
    trend: Trend,
    snapshots: Vec<&'a ScoreSnapshot>,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

impl DoctorCheck {
    fn new(name: &str, status: CheckStatus, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.to_string(),
        }
    }

    fn ok(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Ok, message)
    }

    fn warning(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Warning, message)
    }

    fn error(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Error, message)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
