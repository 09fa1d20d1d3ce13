//! Top-level CLI definition and dispatch.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use source_file_scanner::core::config::Config;
use source_file_scanner::core::errors::SfsError;
use source_file_scanner::logger::jsonl::{JsonlConfig, JsonlWriter, LogEntry};
use source_file_scanner::scanner::listing::{ListingRequest, list_source_files_with};

/// Source File Scanner: lists raw data files awaiting upload.
#[derive(Debug, Parser)]
#[command(
    name = "sfs",
    author,
    version,
    about = "Source File Scanner - list data files, skipping the upload template",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Print a summary line to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List matching files in the source directory.
    List(ListArgs),
    /// View and validate configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct ListArgs {
    /// Directory to list (defaults to RAW_DATA_BASE_DIR).
    #[arg(short, long, value_name = "DIR")]
    dir: Option<String>,
    /// File name to skip (defaults to UPLOAD_TEMPLATE).
    #[arg(short, long, value_name = "NAME")]
    exclude: Option<String>,
    /// Required name suffix, case-sensitive.
    #[arg(short = 'x', long, value_name = "EXT")]
    extension: Option<String>,
    /// Print bare file names instead of directory + name.
    #[arg(long, conflicts_with = "full_path")]
    bare: bool,
    /// Print directory + name even if the config says otherwise.
    #[arg(long)]
    full_path: bool,
    /// Sort names lexicographically instead of directory order.
    #[arg(long)]
    sort: bool,
    /// Exit non-zero when the directory cannot be listed.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

impl From<&SfsError> for CliError {
    fn from(err: &SfsError) -> Self {
        match err {
            SfsError::InvalidConfig { .. }
            | SfsError::MissingConfig { .. }
            | SfsError::ConfigParse { .. }
            | SfsError::DirectoryUnset => Self::User(err.to_string()),
            _ => Self::Runtime(err.to_string()),
        }
    }
}

impl From<SfsError> for CliError {
    fn from(err: SfsError) -> Self {
        Self::from(&err)
    }
}

/// What a failed listing leaves behind for output, logging and the exit code.
struct ListingFailure {
    diagnostic: String,
    error: Value,
    log_entry: LogEntry,
    cli_error: CliError,
}

impl ListingFailure {
    fn new(request: &ListingRequest, err: &SfsError) -> Self {
        Self {
            diagnostic: err.diagnostic(),
            error: json!({
                "code": err.code(),
                "message": err.to_string(),
                "diagnostic": err.diagnostic(),
            }),
            log_entry: LogEntry::listing_failed(request, err),
            cli_error: CliError::from(err),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::List(args) => run_list(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn run_list(cli: &Cli, args: &ListArgs) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let request = resolve_request(&config, args);
    let mut log = JsonlConfig::from_logging(&config.logging).map(JsonlWriter::open);

    let mut failure = None;
    let mut skipped = Vec::new();
    let mut files = list_source_files_with(&request, |err| {
        if err.is_skipped_entry() {
            skipped.push(LogEntry::entry_skipped(&request, err));
        } else {
            failure = Some(ListingFailure::new(&request, err));
        }
    });
    if args.strict && failure.is_some() {
        files.clear();
    }

    if args.sort {
        files.sort();
    }

    if let Some(writer) = log.as_mut() {
        for entry in &skipped {
            writer.write_entry(entry);
        }
        match &failure {
            Some(f) => writer.write_entry(&f.log_entry),
            None => writer.write_entry(&LogEntry::listing_complete(&request, files.len())),
        }
    }

    match output_mode(cli) {
        OutputMode::Human => {
            for entry in &skipped {
                if let Some(message) = &entry.error_message {
                    eprintln!("{} {message}", "sfs: warning:".yellow());
                }
            }
            let mut stdout = io::stdout().lock();
            if let Some(f) = &failure {
                writeln!(stdout, "[SFS-SCANNER] {}", f.diagnostic)?;
            }
            for file in &files {
                writeln!(stdout, "{file}")?;
            }
            if cli.verbose {
                let dir = request.directory.as_deref().unwrap_or("<unset>");
                eprintln!(
                    "{} {} matching '{}' in {}",
                    "sfs:".bold(),
                    files.len(),
                    request.extension,
                    dir
                );
            }
        }
        OutputMode::Json => {
            let error = failure.as_ref().map_or(Value::Null, |f| f.error.clone());
            let skipped: Vec<&str> = skipped
                .iter()
                .filter_map(|entry| entry.error_message.as_deref())
                .collect();
            let payload = json!({
                "command": "list",
                "directory": request.directory,
                "exclude_name": request.exclude_name,
                "extension": request.extension,
                "full_path": request.full_path,
                "count": files.len(),
                "files": files,
                "skipped": skipped,
                "error": error,
            });
            write_json_line(&payload)?;
        }
    }

    match failure {
        Some(f) if args.strict => Err(f.cli_error),
        _ => Ok(()),
    }
}

/// Flags win over env, env over the config file, the file over defaults.
fn resolve_request(config: &Config, args: &ListArgs) -> ListingRequest {
    let mut request = ListingRequest::from(&config.scanner);
    if let Some(dir) = &args.dir {
        request.directory = Some(dir.clone());
    }
    if let Some(name) = &args.exclude {
        request.exclude_name = Some(name.clone());
    }
    if let Some(ext) = &args.extension {
        request.extension.clone_from(ext);
    }
    if args.bare {
        request.full_path = false;
    } else if args.full_path {
        request.full_path = true;
    }
    request
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", config.to_toml()?);
                }
                OutputMode::Json => {
                    let value = serde_json::to_value(&config)?;
                    let payload = json!({
                        "command": "config show",
                        "config": value,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("{}", "Configuration is valid.".green());
                        println!("  Source: {}", config.paths.config_file.display());
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("{} {e}", "Configuration is INVALID:".red());
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("SFS_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

// Human (one name per line) unless JSON is requested, TTY or not.
fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Human,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_args(argv: &[&str]) -> ListArgs {
        let mut full = vec!["sfs", "list"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).expect("parse").command {
            Command::List(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_global_flags_before_and_after_subcommand() {
        let before = Cli::try_parse_from([
            "sfs",
            "--config",
            "/tmp/sfs.toml",
            "--json",
            "--no-color",
            "-v",
            "list",
        ]);
        assert!(before.is_ok());

        let after = Cli::try_parse_from(["sfs", "list", "--json", "--no-color", "-v"]);
        assert!(after.is_ok());
    }

    #[test]
    fn parses_subcommands() {
        let cases = [
            vec!["sfs", "list", "--dir", "/data/", "--exclude", "t.xlsx"],
            vec!["sfs", "list", "-d", "/data/", "-x", ".csv", "--bare", "--sort"],
            vec!["sfs", "list", "--strict", "--full-path"],
            vec!["sfs", "config"],
            vec!["sfs", "config", "path"],
            vec!["sfs", "config", "show"],
            vec!["sfs", "config", "validate"],
        ];

        for case in cases {
            let parsed = Cli::try_parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse case: {case:?}");
        }
    }

    #[test]
    fn bare_conflicts_with_full_path() {
        assert!(Cli::try_parse_from(["sfs", "list", "--bare", "--full-path"]).is_err());
    }

    #[test]
    fn completions_support_bash_zsh_and_fish() {
        for shell in ["bash", "zsh", "fish"] {
            let parsed = Cli::try_parse_from(["sfs", "completions", shell]);
            assert!(parsed.is_ok(), "failed shell parse for {shell}");
        }
    }

    #[test]
    fn flags_override_config_values() {
        let mut config = Config::default();
        config.scanner.directory = Some("/from/config/".to_string());
        config.scanner.exclude_name = Some("template.xlsx".to_string());

        let request = resolve_request(
            &config,
            &list_args(&["--dir", "/from/flag/", "--extension", ".csv", "--bare"]),
        );

        assert_eq!(request.directory.as_deref(), Some("/from/flag/"));
        assert_eq!(request.exclude_name.as_deref(), Some("template.xlsx"));
        assert_eq!(request.extension, ".csv");
        assert!(!request.full_path);
    }

    #[test]
    fn full_path_flag_restores_prefixing() {
        let mut config = Config::default();
        config.scanner.full_path = false;
        let request = resolve_request(&config, &list_args(&["--full-path"]));
        assert!(request.full_path);

        let request = resolve_request(&config, &list_args(&[]));
        assert!(!request.full_path);
    }

    #[test]
    fn output_mode_resolution_honors_precedence() {
        assert_eq!(resolve_output_mode(true, Some("human")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("json")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some(" JSON ")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("auto")), OutputMode::Human);
        assert_eq!(resolve_output_mode(false, None), OutputMode::Human);
    }

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(CliError::from(SfsError::DirectoryUnset).exit_code(), 1);
        assert_eq!(
            CliError::from(SfsError::DirectoryNotFound {
                path: PathBuf::from("/nonexistent/path")
            })
            .exit_code(),
            2
        );
    }

    #[test]
    fn failure_report_carries_code_and_diagnostic() {
        let request = ListingRequest::default().with_directory("/nonexistent/path");
        let err = SfsError::DirectoryNotFound {
            path: PathBuf::from("/nonexistent/path"),
        };
        let failure = ListingFailure::new(&request, &err);
        assert_eq!(failure.error["code"], "SFS-3001");
        assert_eq!(
            failure.diagnostic,
            "directory not found or RAW_DATA_BASE_DIR not set"
        );
        assert_eq!(failure.cli_error.exit_code(), 2);
    }
}
