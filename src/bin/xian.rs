//! Xian CLI - Command-line interface for Xian Universe
//!
//! Commands:
//! - profile: Compute trait vectors for a users document
//! - match: Analyze the compatibility of two users
//! - rank: List the users most similar to one user
//! - validate: Report events the engine would skip
//! - classify: Assign a category to a video by keywords
//! - config: Print the effective engine configuration
//! - doctor: Diagnose installation and configuration

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use xian_universe::adapter::{parse_users, validate_users, UserIssue};
use xian_universe::classifier::classify_video;
use xian_universe::encoder::SCHEMA_VERSION;
use xian_universe::types::{MatchPayload, ProfilesPayload};
use xian_universe::{EngineConfig, UniverseError, UniverseProcessor, PRODUCER_NAME, XIAN_VERSION};

/// Xian - Trait-vector profiles and match scores from watch histories
#[derive(Parser)]
#[command(name = "xian")]
#[command(version = XIAN_VERSION)]
#[command(about = "Turn watch histories into cognition/empathy/pleasure profiles", long_about = None)]
struct Cli {
    /// Engine configuration file (category table and behavior weighting)
    #[arg(long, global = true, env = "XIAN_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute profiles for every user in a document
    Profile {
        /// Users document (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Analyze two users
    Match {
        /// Users document (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// First user id
        user_a: String,

        /// Second user id
        user_b: String,

        /// Print a human-readable summary instead of JSON
        #[arg(long)]
        text: bool,
    },

    /// Rank users by similarity to one user
    Rank {
        /// Users document (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Subject user id
        #[arg(short, long)]
        user: String,

        /// Number of matches to return
        #[arg(long, default_value = "5")]
        top: usize,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Check a users document against the category table
    Validate {
        /// Users document (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assign a content category to a video from its text
    Classify {
        /// Video title
        #[arg(short, long)]
        title: String,

        /// Video description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Video tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Print the effective engine configuration as JSON
    Config,

    /// Diagnose installation and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

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

fn run(cli: Cli) -> Result<(), XianCliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Profile {
            input,
            output,
            output_format,
        } => cmd_profile(config_path, &input, &output, &output_format),

        Commands::Match {
            input,
            user_a,
            user_b,
            text,
        } => cmd_match(config_path, &input, &user_a, &user_b, text),

        Commands::Rank {
            input,
            user,
            top,
            output_format,
        } => cmd_rank(config_path, &input, &user, top, &output_format),

        Commands::Validate { input, json } => cmd_validate(config_path, &input, json),

        Commands::Classify {
            title,
            description,
            tags,
        } => cmd_classify(&title, &description, &tags),

        Commands::Config => cmd_config(config_path),

        Commands::Doctor { json } => cmd_doctor(config_path, json),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, XianCliError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading engine configuration");
            Ok(EngineConfig::from_path(path)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_input(input: &Path) -> Result<String, XianCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), XianCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn load_processor(
    config_path: Option<&Path>,
    input: &Path,
) -> Result<UniverseProcessor, XianCliError> {
    let mut processor = UniverseProcessor::with_config(load_config(config_path)?)?;
    let count = processor.load_users(&read_input(input)?)?;
    if count == 0 {
        return Err(XianCliError::NoUsers);
    }
    Ok(processor)
}

fn cmd_profile(
    config_path: Option<&Path>,
    input: &Path,
    output: &Path,
    output_format: &OutputFormat,
) -> Result<(), XianCliError> {
    let processor = load_processor(config_path, input)?;
    let payload_json = processor.profiles()?;

    let data = match output_format {
        OutputFormat::JsonPretty => payload_json + "\n",
        format => {
            let payload: ProfilesPayload = serde_json::from_str(&payload_json)?;
            format_output(&payload.profiles, format)?
        }
    };

    write_output(output, &data)
}

fn cmd_match(
    config_path: Option<&Path>,
    input: &Path,
    user_a: &str,
    user_b: &str,
    text: bool,
) -> Result<(), XianCliError> {
    let processor = load_processor(config_path, input)?;
    let payload_json = processor.match_pair(user_a, user_b, None)?;

    if !text {
        println!("{}", payload_json);
        return Ok(());
    }

    let analysis = serde_json::from_str::<MatchPayload>(&payload_json)?.analysis;
    println!("{} × {}: {}% match", analysis.user_a, analysis.user_b, analysis.percentage);
    println!("{}", analysis.summary);
    println!();
    for gap in &analysis.gaps {
        println!(
            "  {:<10} {:.2} ({:?})",
            gap.dimension.label(),
            gap.difference,
            gap.level
        );
    }
    println!();
    for highlight in &analysis.highlights {
        println!("  * {}", highlight);
    }
    println!();
    println!("{}", analysis.chemistry);

    Ok(())
}

fn cmd_rank(
    config_path: Option<&Path>,
    input: &Path,
    user: &str,
    top: usize,
    output_format: &OutputFormat,
) -> Result<(), XianCliError> {
    let processor = load_processor(config_path, input)?;
    let ranked = processor.rank(user, top)?;
    print!("{}", format_output(&ranked, output_format)?);
    Ok(())
}

fn cmd_validate(config_path: Option<&Path>, input: &Path, json: bool) -> Result<(), XianCliError> {
    let config = load_config(config_path)?;
    let users = parse_users(&read_input(input)?)?;
    let issues = validate_users(&users, &config.category_profile);

    let report = ValidationReport {
        total_users: users.len(),
        total_events: users.iter().map(|u| u.watch_history.len()).sum(),
        issue_count: issues.len(),
        issues,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total users:  {}", report.total_users);
        println!("Total events: {}", report.total_events);
        println!("Issues:       {}", report.issue_count);

        if !report.issues.is_empty() {
            println!("\nIssues:");
            for issue in &report.issues {
                println!("  - {}", issue);
            }
        }
    }

    if report.issue_count > 0 {
        Err(XianCliError::ValidationFailed(report.issue_count))
    } else {
        Ok(())
    }
}

fn cmd_classify(title: &str, description: &str, tags: &[String]) -> Result<(), XianCliError> {
    let classification = classify_video(title, description, tags);
    println!("{}", serde_json::to_string_pretty(&classification)?);
    Ok(())
}

fn cmd_config(config_path: Option<&Path>) -> Result<(), XianCliError> {
    println!("{}", load_config(config_path)?.to_json()?);
    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), XianCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "xian_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Xian version {}", XIAN_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Payload schema: {}", SCHEMA_VERSION),
    });

    let config_check = match config_path {
        None => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Using standard tables ({} categories)",
                EngineConfig::default().category_profile.len()
            ),
        },
        Some(path) if !path.exists() => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: format!("Config file {} does not exist", path.display()),
        },
        Some(path) => match EngineConfig::from_path(path) {
            Ok(config) if config.category_profile.is_empty() => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Category table is empty; every user will be neutral".to_string(),
            },
            Ok(config) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Config valid ({} categories, {} behavior rules)",
                    config.category_profile.len(),
                    config.behavior_weighting.rules.len()
                ),
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        },
    };
    checks.push(config_check);

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass documents with --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: XIAN_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Xian Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    if report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error))
    {
        Err(XianCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn format_output<T: Serialize>(records: &[T], format: &OutputFormat) -> Result<String, XianCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut out = String::new();
            for record in records {
                out.push_str(&serde_json::to_string(record)?);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)? + "\n"),
    }
}

// Error types

#[derive(Debug)]
enum XianCliError {
    Io(io::Error),
    Engine(UniverseError),
    Json(serde_json::Error),
    NoUsers,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for XianCliError {
    fn from(e: io::Error) -> Self {
        XianCliError::Io(e)
    }
}

impl From<UniverseError> for XianCliError {
    fn from(e: UniverseError) -> Self {
        XianCliError::Engine(e)
    }
}

impl From<serde_json::Error> for XianCliError {
    fn from(e: serde_json::Error) -> Self {
        XianCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<XianCliError> for CliError {
    fn from(e: XianCliError) -> Self {
        match e {
            XianCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            XianCliError::Engine(e) => {
                let (code, hint) = match &e {
                    UniverseError::ParseError(_) | UniverseError::JsonError(_) => (
                        "PARSE_ERROR",
                        "Input must be a JSON array of users with watchHistory",
                    ),
                    UniverseError::InvalidConfig(_) => (
                        "CONFIG_ERROR",
                        "Run 'xian config' to print a valid configuration to start from",
                    ),
                    UniverseError::UnknownUser(_) => {
                        ("UNKNOWN_USER", "Check the user id against the input document")
                    }
                    UniverseError::EncodingError(_) => ("ENCODING_ERROR", "Report this as a bug"),
                    UniverseError::NarrationError(_) => {
                        ("NARRATION_ERROR", "The local narration is used when this happens")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            XianCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            XianCliError::NoUsers => CliError {
                code: "NO_USERS".to_string(),
                message: "No users found in input".to_string(),
                hint: Some("Ensure the input array is not empty".to_string()),
            },
            XianCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} issues found", count),
                hint: Some("Unknown categories are skipped when computing profiles".to_string()),
            },
            XianCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_users: usize,
    total_events: usize,
    issue_count: usize,
    issues: Vec<UserIssue>,
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

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
