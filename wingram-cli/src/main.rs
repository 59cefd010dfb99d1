//! Command-line interface for wingram
//! This binary validates window layout documents and writes one trace file per document.
//!
//! Usage:
//!   wingram --file `<file>` [--output `<dir>`] [--print]        - Validate a single document
//!   wingram --directory `<dir>` [--output `<dir>`] [--print]    - Validate every document in a directory
//!   wingram                                                   - Validate the configured input directory

mod batch;

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use wingram_config::{
    ConfigError, LogLevel, Loader, ReportFormat, WingramConfig, USER_CONFIG_FILE,
};

fn main() {
    let matches = Command::new("wingram")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lexer/parser for window layout documents")
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .value_name("FILE")
                .help("Validate only this document")
                .conflicts_with("directory"),
        )
        .arg(
            Arg::new("directory")
                .long("directory")
                .short('d')
                .value_name("DIRECTORY")
                .help("Directory holding the documents to validate (default from config)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("DIRECTORY")
                .help("Directory for trace files (default from config)"),
        )
        .arg(
            Arg::new("print")
                .long("print")
                .short('p')
                .help("Print every trace line to the screen as well")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("FORMAT")
                .help("Batch summary format")
                .value_parser(["text", "json"]),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log verbosity (repeatable)")
                .action(ArgAction::Count),
        )
        .get_matches();

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(2);
    });

    let level = config.logging.level.raised(matches.get_count("verbose"));
    init_logging(level);

    let code = handle_validate_command(&matches, &config);
    std::process::exit(code);
}

/// Defaults, then the user's file, then command-line flags.
///
/// Without `--config`, a `wingram.toml` in the working directory is layered if present.
fn load_config(matches: &ArgMatches) -> Result<WingramConfig, ConfigError> {
    let mut loader = match matches.get_one::<String>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(USER_CONFIG_FILE),
    };
    if let Some(dir) = matches.get_one::<String>("directory") {
        loader = loader.set_override("input.directory", dir.as_str())?;
    }
    if let Some(dir) = matches.get_one::<String>("output") {
        loader = loader.set_override("output.directory", dir.as_str())?;
    }
    if matches.get_flag("print") {
        loader = loader.set_override("output.echo", true)?;
    }
    if let Some(format) = matches.get_one::<String>("report") {
        loader = loader.set_override("report.format", format.as_str())?;
    }
    loader.build()
}

fn init_logging(level: LogLevel) {
    let filter = match level {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Handle validation of a single file or a directory; returns the process exit code.
fn handle_validate_command(matches: &ArgMatches, config: &WingramConfig) -> i32 {
    let jobs = match matches.get_one::<String>("file") {
        Some(file) => vec![batch::Job::new(PathBuf::from(file), &config.output)],
        None => batch::discover(&config.input.directory, &config.output).unwrap_or_else(|e| {
            eprintln!(
                "Error reading directory {}: {}",
                config.input.directory.display(),
                e
            );
            std::process::exit(1);
        }),
    };

    if jobs.is_empty() {
        eprintln!(
            "No documents found in {}",
            config.input.directory.display()
        );
    }

    let echo = match (config.output.echo, config.report.format) {
        (false, _) => batch::Echo::Off,
        (true, ReportFormat::Text) => batch::Echo::Stdout,
        (true, ReportFormat::Json) => batch::Echo::Stderr,
    };
    let report = batch::run(&jobs, echo);

    match config.report.format {
        ReportFormat::Text => {
            print!("{}", report.render_text());
            println!(
                "... Finished\nCheck {} for all output files.",
                config.output.directory.display()
            );
        }
        ReportFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error formatting report: {}", e);
                return 1;
            }
        },
    }

    if report.is_complete() {
        0
    } else {
        1
    }
}
