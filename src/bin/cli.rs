//! Command-line front end: pipes standard input into the log manager.
//!
//! Each input line becomes one Info record. A line of the form
//! `tag<TAB>message` carries its own tag; other lines use `--tag`.

use std::ffi::OsString;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::builder::OsStringValueParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use logging::{ConfigError, LogConfig};
use manager::{ConfigurationError, LogManager, ManagerLayer};
use tracing_subscriber::filter::{EnvFilter, filter_fn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

/// Environment variable holding the diagnostics filter.
const TRACE_ENV: &str = "MIDILOG_TRACE";

/// Tag used for input lines without one.
const DEFAULT_INPUT_TAG: &str = "stdin";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read config file {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Start(#[from] ConfigurationError),
    #[error("failed to read standard input: {0}")]
    Input(#[source] io::Error),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

/// Installs stderr diagnostics filtered by `MIDILOG_TRACE` and routes this
/// binary's own events into `manager`.
pub fn init_tracing(manager: Arc<LogManager>) {
    let filter = EnvFilter::try_from_env(TRACE_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let diagnostics = fmt::layer().with_writer(io::stderr).with_filter(filter);
    let own_events = ManagerLayer::new(manager)
        .with_filter(filter_fn(|metadata| metadata.target().starts_with("midilog")));

    let _ = tracing_subscriber::registry()
        .with(diagnostics)
        .with(own_events)
        .try_init();
}

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new("midilog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Append standard input to the midilog destinations.")
        .after_help(
            "Input lines of the form TAG<TAB>MESSAGE use their own tag.\n\
             Settings are read from MIDILOG_* variables, then --config, then flags.",
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Read settings from a TOML file.")
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("dir")
                .long("dir")
                .short('d')
                .value_name("DIR")
                .help("Directory of the log file.")
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("destination")
                .long("destination")
                .value_name("NAME")
                .help("Enable a destination (asl, tty, os, file); repeatable.")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("level")
                .long("level")
                .short('l')
                .value_name("LEVEL")
                .help("Highest severity to record (off, error, warning, info, debug, verbose, all)."),
        )
        .arg(
            Arg::new("tag")
                .long("tag")
                .short('t')
                .value_name("TAG")
                .default_value(DEFAULT_INPUT_TAG)
                .help("Tag for lines without one."),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("KEY=VALUE")
                .help("Apply a configuration directive; repeatable.")
                .action(ArgAction::Append),
        )
}

/// Layers the config file and flags over the environment.
fn build_config(matches: &ArgMatches) -> Result<LogConfig, CliError> {
    let mut config = match matches.get_one::<OsString>("config") {
        Some(path) => read_config_file(PathBuf::from(path))?,
        None => LogConfig::from_env()?,
    };

    if let Some(dir) = matches.get_one::<OsString>("dir") {
        config.file_directory = Some(PathBuf::from(dir));
    }
    if let Some(destinations) = matches.get_many::<String>("destination") {
        let joined = destinations.map(String::as_str).collect::<Vec<_>>().join(",");
        config.apply_directive(&format!("destinations={joined}"))?;
    }
    if let Some(level) = matches.get_one::<String>("level") {
        config.threshold = level.parse().map_err(ConfigError::from)?;
    }
    for directive in matches.get_many::<String>("set").into_iter().flatten() {
        config.apply_directive(directive)?;
    }
    Ok(config)
}

fn read_config_file(path: PathBuf) -> Result<LogConfig, CliError> {
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(source) => return Err(CliError::ReadConfig { path, source }),
    };
    toml::from_str(&text).map_err(|source| CliError::ParseConfig { path, source })
}

/// Splits an input line into its tag and message.
fn split_line<'a>(line: &'a str, default_tag: &'a str) -> (&'a str, &'a str) {
    match line.split_once('\t') {
        Some((tag, message)) if !tag.is_empty() => (tag, message),
        _ => (default_tag, line),
    }
}

fn pipe<In, Out>(
    manager: &LogManager,
    config: LogConfig,
    default_tag: &str,
    input: In,
    stdout: &mut Out,
) -> Result<(), CliError>
where
    In: BufRead,
    Out: Write,
{
    manager.start(config)?;
    tracing::debug!(target: "midilog", "reading standard input");

    let mut lines = 0_u64;
    let mut read_error = None;
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                read_error = Some(error);
                break;
            }
        };
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let (tag, message) = split_line(line, default_tag);
        manager.write(tag, message);
        lines += 1;
    }

    let path = manager.current_file_path();
    let report = manager.stop();
    if !report.is_clean() {
        tracing::warn!(
            target: "midilog",
            failures = report.failures.len() as u64 + report.deferred_failures,
            "some records did not reach every destination"
        );
    }
    if let Some(error) = read_error {
        return Err(CliError::Input(error));
    }

    tracing::debug!(target: "midilog", lines, "input exhausted");
    if let Some(path) = path {
        writeln!(stdout, "{}", path.display()).map_err(CliError::Output)?;
    }
    Ok(())
}

/// Parses `args`, then logs every line of `input` through `manager`.
pub fn run_with<I, In, Out, Err>(
    manager: &LogManager,
    args: I,
    input: In,
    stdout: &mut Out,
    stderr: &mut Err,
) -> ExitCode
where
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
    In: BufRead,
    Out: Write,
    Err: Write,
{
    let matches = match clap_command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(error) => {
            use clap::error::ErrorKind;
            return match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = write!(stdout, "{error}");
                    ExitCode::SUCCESS
                }
                _ => {
                    let _ = write!(stderr, "{error}");
                    ExitCode::from(2)
                }
            };
        }
    };

    let default_tag = matches
        .get_one::<String>("tag")
        .map_or(DEFAULT_INPUT_TAG, String::as_str);
    let result =
        build_config(&matches).and_then(|config| pipe(manager, config, default_tag, input, stdout));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "midilog: {error}");
            ExitCode::FAILURE
        }
    }
}
