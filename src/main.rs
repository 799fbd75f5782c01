//! Command-line front end for plainup.
//!
//! Usage:
//!   plainup [INPUT] [-o PATH] [-t TYPE] [--entities MODE] [--detect] [--clipboard] [--paste]
//!
//! Reads INPUT (or stdin), converts it to plain text and prints it, writes
//! it to a file or copies it to the system clipboard.

use clap::{Arg, ArgAction, ArgMatches, Command};
use plainup::config::{self, Settings};
use plainup::{ContentType, ConvertError, ConvertOptions, ConverterFile, EntityDecoding};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Input(#[from] ConvertError),

    #[error("{0}")]
    Output(String),
}

fn main() {
    let matches = Command::new("plainup")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert HTML or Markdown selections into clean plain text")
        .arg(
            Arg::new("input")
                .help("Input file path, or - for stdin")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Output file path"),
        )
        .arg(
            Arg::new("type")
                .short('t')
                .long("type")
                .value_name("TYPE")
                .value_parser(["html", "markdown", "md", "plain", "text"])
                .help("Skip detection and treat the input as TYPE"),
        )
        .arg(
            Arg::new("entities")
                .long("entities")
                .value_name("MODE")
                .value_parser(["token", "sequential"])
                .help("How HTML character entities are decoded"),
        )
        .arg(
            Arg::new("detect")
                .long("detect")
                .action(ArgAction::SetTrue)
                .help("Print the detected content type and exit"),
        )
        .arg(
            Arg::new("clipboard")
                .short('c')
                .long("clipboard")
                .action(ArgAction::SetTrue)
                .help("Copy the result to the system clipboard"),
        )
        .arg(
            Arg::new("paste")
                .short('p')
                .long("paste")
                .action(ArgAction::SetTrue)
                .conflicts_with("input")
                .help("Read the input from the system clipboard"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Extra configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("More log output on stderr (repeatable)"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let loaded = config::reload(config_path.as_deref());
    // an explicit --config that cannot be loaded is fatal
    if let (Err(err), Some(_)) = (&loaded, &config_path) {
        eprintln!("Failed to load configuration: {}", err);
        std::process::exit(1);
    }

    // Collect CLI overrides
    let content_type = matches
        .get_one::<String>("type")
        .and_then(|t| t.parse::<ContentType>().ok());
    let entity_decoding = matches
        .get_one::<String>("entities")
        .and_then(|m| m.parse::<EntityDecoding>().ok());
    let output_path = matches.get_one::<String>("output").map(PathBuf::from);
    let copy_to_clipboard = matches.get_flag("clipboard").then_some(true);

    config::update_settings_with_cli_args(
        content_type,
        entity_decoding,
        output_path,
        copy_to_clipboard,
    );

    let settings = config::get_settings();
    init_logging(matches.get_count("verbose"), &settings.log_level);
    if let Err(err) = loaded {
        warn!("Failed to load configuration, using defaults: {}", err);
    }

    if let Err(err) = run(&matches, &settings) {
        match err {
            CliError::Input(
                e @ (ConvertError::NoSource | ConvertError::Empty | ConvertError::WhitespaceOnly),
            ) => eprintln!("Warning: {}", e),
            other => eprintln!("Failed to copy: {}", other),
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(matches: &ArgMatches, settings: &Settings) -> Result<(), CliError> {
    if matches.get_flag("detect") {
        let file = match input_path(matches) {
            Some(path) => ConverterFile::from_path(path)?,
            None => read_stream(matches)?,
        };
        let text = String::from_utf8_lossy(&file.file_stream);
        println!("{}", plainup::classify(&text));
        return Ok(());
    }

    let options = ConvertOptions::from(settings);
    let conversion = match input_path(matches) {
        Some(path) => plainup::convert_from_path(path, &options)?,
        None => plainup::convert_file(read_stream(matches)?, &options)?,
    };
    info!(
        content_type = %conversion.content_type,
        len = conversion.text.len(),
        "converted"
    );

    if settings.copy_to_clipboard {
        copy_to_clipboard(&conversion.text)?;
        eprintln!("Copied as plain text");
    } else if let Some(output_path) = &settings.output_path {
        std::fs::write(output_path, &conversion.text).map_err(|e| {
            CliError::Output(format!("cannot write {}: {}", output_path.display(), e))
        })?;
        eprintln!("Output written to: {}", output_path.display());
    } else {
        println!("{}", conversion.text);
    }

    Ok(())
}

/// The INPUT argument, unless it is `-` for stdin.
fn input_path(matches: &ArgMatches) -> Option<&str> {
    matches
        .get_one::<String>("input")
        .map(String::as_str)
        .filter(|path| *path != "-")
}

/// Read the selection from the clipboard (`--paste`) or stdin.
fn read_stream(matches: &ArgMatches) -> Result<ConverterFile, CliError> {
    let file_stream = if matches.get_flag("paste") {
        paste_from_clipboard()?.into_bytes()
    } else {
        let mut stdin = io::stdin();
        if stdin.is_terminal() {
            return Err(ConvertError::NoSource.into());
        }
        let mut buf = Vec::new();
        stdin.read_to_end(&mut buf).map_err(|source| ConvertError::Io {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
        buf
    };

    Ok(ConverterFile {
        file_path: None,
        file_stream,
    })
}

#[cfg(feature = "clipboard")]
fn copy_to_clipboard(text: &str) -> Result<(), CliError> {
    plainup::clipboard::set(text).map_err(|e| CliError::Output(e.to_string()))
}

#[cfg(feature = "clipboard")]
fn paste_from_clipboard() -> Result<String, CliError> {
    plainup::clipboard::get().map_err(|e| CliError::Output(e.to_string()))
}

#[cfg(not(feature = "clipboard"))]
fn copy_to_clipboard(_text: &str) -> Result<(), CliError> {
    Err(clipboard_unavailable())
}

#[cfg(not(feature = "clipboard"))]
fn paste_from_clipboard() -> Result<String, CliError> {
    Err(clipboard_unavailable())
}

#[cfg(not(feature = "clipboard"))]
fn clipboard_unavailable() -> CliError {
    CliError::Output("clipboard support is not built in (enable the `clipboard` feature)".to_string())
}
