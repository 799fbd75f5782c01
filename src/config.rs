//! Global configuration management
//! Settings are layered from the built-in `Config.toml`, an optional
//! `Config.toml` next to the executable, an optional explicit file,
//! `PLAINUP__*` environment variables and finally CLI overrides.
//! Nothing is read until [`reload`] runs; before that the defaults apply.
//! Usage:
//! ```rust
//! use plainup::config;
//! // fn main() {
//! //     config::reload(None).ok();
//! //     let cfg = config::get_settings();
//! //     println!("{:?}", cfg.entity_decoding);
//! // }
//! ```

use config::{Config, ConfigError, Environment, File, FileFormat};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::{env, fs};

use crate::converter::entities::EntityDecoding;
use crate::detector::ContentType;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub entity_decoding: EntityDecoding,
    /// Forced content type; `None` means detect.
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub copy_to_clipboard: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            entity_decoding: EntityDecoding::default(),
            content_type: None,
            output_path: None,
            copy_to_clipboard: false,
            log_level: default_log_level(),
        }
    }
}

pub static SETTINGS: Lazy<RwLock<Settings>> = Lazy::new(|| RwLock::new(Settings::default()));

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // 1. built-in default config
        let mut builder = Config::builder().add_source(File::from_str(
            include_str!("../Config.toml"),
            FileFormat::Toml,
        ));

        // 2. try to load external config file
        if let Ok(exe_path) = env::current_exe() {
            if let Some(dir) = exe_path.parent() {
                let external = dir.join("Config.toml");
                if fs::metadata(&external).is_ok() {
                    builder = builder.add_source(File::from(external.as_path()).required(false));
                }
            }
        }

        // 3. file named on the command line
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        // 4. load environment variables
        builder = builder.add_source(
            Environment::with_prefix("PLAINUP")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

/// Snapshot of the current settings.
pub fn get_settings() -> Settings {
    SETTINGS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Reload every layer, adding `explicit` on top of the defaults. On error
/// the current settings are left as they were.
pub fn reload(explicit: Option<&Path>) -> Result<(), ConfigError> {
    let settings = Settings::load(explicit)?;
    *SETTINGS.write().unwrap_or_else(PoisonError::into_inner) = settings;
    Ok(())
}

/// Apply command-line overrides; `None` keeps the configured value.
pub fn update_settings_with_cli_args(
    content_type: Option<ContentType>,
    entity_decoding: Option<EntityDecoding>,
    output_path: Option<PathBuf>,
    copy_to_clipboard: Option<bool>,
) {
    let mut settings = SETTINGS.write().unwrap_or_else(PoisonError::into_inner);
    if content_type.is_some() {
        settings.content_type = content_type;
    }
    if let Some(mode) = entity_decoding {
        settings.entity_decoding = mode;
    }
    if output_path.is_some() {
        settings.output_path = output_path;
    }
    if let Some(copy) = copy_to_clipboard {
        settings.copy_to_clipboard = copy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn built_in_defaults() {
        let settings = Settings::new().unwrap();
        assert_eq!(settings.entity_decoding, EntityDecoding::Token);
        assert_eq!(settings.content_type, None);
        assert!(!settings.copy_to_clipboard);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "entity_decoding = \"sequential\"").unwrap();
        writeln!(file, "content_type = \"markdown\"").unwrap();
        writeln!(file, "output_path = \"out.txt\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.entity_decoding, EntityDecoding::Sequential);
        assert_eq!(settings.content_type, Some(ContentType::Markdown));
        assert_eq!(settings.output_path, Some(PathBuf::from("out.txt")));
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/plainup.toml"))).is_err());
    }

    // the only test touching the global settings
    #[test]
    fn reload_and_cli_overrides_update_global_settings() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "entity_decoding = \"sequential\"").unwrap();

        reload(Some(file.path())).unwrap();
        assert_eq!(get_settings().entity_decoding, EntityDecoding::Sequential);

        assert!(reload(Some(Path::new("/nonexistent/plainup.toml"))).is_err());
        assert_eq!(get_settings().entity_decoding, EntityDecoding::Sequential);

        update_settings_with_cli_args(Some(ContentType::Html), Some(EntityDecoding::Token), None, None);
        let settings = get_settings();
        assert_eq!(settings.entity_decoding, EntityDecoding::Token);
        assert_eq!(settings.content_type, Some(ContentType::Html));

        reload(None).unwrap();
        let settings = get_settings();
        assert_eq!(settings.entity_decoding, EntityDecoding::Token);
        assert_eq!(settings.content_type, None);
    }
}
