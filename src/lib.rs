//! Turn HTML or Markdown selections into clean plain text.
//!
//! [`classify`] picks a content type, then the matching generator strips
//! markup while keeping line breaks, list indentation and table rows.
//! Plain text passes through untouched.

pub mod config;
pub mod converter;
pub mod detector;
pub mod error;
pub mod generator;
#[cfg(feature = "clipboard")]
pub mod clipboard;

use std::path::PathBuf;

use tracing::debug;

pub use converter::entities::EntityDecoding;
pub use detector::{ContentType, classify};
pub use error::ConvertError;

/// Knobs for a single conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Skip detection and use this converter.
    pub content_type: Option<ContentType>,
    pub entity_decoding: EntityDecoding,
}

impl From<&config::Settings> for ConvertOptions {
    fn from(settings: &config::Settings) -> Self {
        Self {
            content_type: settings.content_type,
            entity_decoding: settings.entity_decoding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The converter that ran.
    pub content_type: ContentType,
    pub text: String,
}

/// Raw input as handed over by a host: a file, stdin or the clipboard.
pub struct ConverterFile {
    pub file_path: Option<String>,
    pub file_stream: Vec<u8>,
}

impl ConverterFile {
    pub fn from_path(file_path: &str) -> Result<Self, ConvertError> {
        let file_stream = std::fs::read(file_path).map_err(|source| ConvertError::Io {
            path: PathBuf::from(file_path),
            source,
        })?;

        Ok(Self {
            file_path: Some(file_path.to_string()),
            file_stream,
        })
    }
}

pub fn html_to_plain_text(text: &str) -> String {
    generator::html2txt::run(text)
}

pub fn markdown_to_plain_text(text: &str) -> String {
    generator::md2txt::run(text)
}

/// Detect and convert with default options.
pub fn convert(text: &str) -> String {
    convert_with(text, &ConvertOptions::default()).text
}

pub fn convert_with(text: &str, options: &ConvertOptions) -> Conversion {
    let content_type = options.content_type.unwrap_or_else(|| classify(text));
    debug!(
        %content_type,
        forced = options.content_type.is_some(),
        len = text.len(),
        "converting selection"
    );

    let text = match content_type {
        ContentType::Html => generator::html2txt::run_with_mode(text, options.entity_decoding),
        ContentType::Markdown => generator::md2txt::run(text),
        ContentType::Plain => text.to_string(),
    };

    Conversion { content_type, text }
}

// byte_stream -> plain text
pub fn convert_file(
    file: ConverterFile,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    if file.file_stream.is_empty() {
        return Err(ConvertError::Empty);
    }

    let text = String::from_utf8(file.file_stream)?;
    if text.trim().is_empty() {
        return Err(ConvertError::WhitespaceOnly);
    }

    if let Some(path) = &file.file_path {
        debug!(path = %path, "read input");
    }

    Ok(convert_with(&text, options))
}

pub fn convert_from_path(
    file_path: &str,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    convert_file(ConverterFile::from_path(file_path)?, options)
}
