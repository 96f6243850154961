//! User settings, persisted by eframe between sessions.

use serde::{Deserialize, Serialize};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const ALL: [Self; 5] = [Self::Error, Self::Warn, Self::Info, Self::Debug, Self::Trace];

    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// We derive Deserialize/Serialize so eframe can persist the settings on shutdown.
/// The theme is deliberately not part of it: every launch starts light.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct StudioSettings {
    pub log_level: LogLevel,

    /// Show the captured name position under the preview.
    pub show_coordinates: bool,

    /// Reload the stored template and position on startup.
    pub restore_on_launch: bool,

    /// Where the native build keeps its records. `None` uses eframe's storage directory.
    pub storage_dir: Option<String>,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            show_coordinates: true,
            restore_on_launch: true,
            storage_dir: None,
        }
    }
}

impl StudioSettings {
    pub fn apply_log_level(&self) {
        log::set_max_level(self.log_level.to_level_filter());
    }
}

/// Native logger that lets everything through unless `RUST_LOG` says otherwise,
/// so `log::max_level` (set from [`StudioSettings::log_level`]) does the filtering.
#[cfg(not(target_arch = "wasm32"))]
pub fn native_logger() -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = StudioSettings::default();
        assert_eq!(settings.log_level, LogLevel::Info);
        assert!(settings.show_coordinates);
        assert!(settings.restore_on_launch);
        assert_eq!(settings.storage_dir, None);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: StudioSettings =
            serde_json::from_str(r#"{"log_level":"debug","show_coordinates":false}"#).unwrap();
        assert_eq!(settings.log_level, LogLevel::Debug);
        assert!(!settings.show_coordinates);
        assert!(settings.restore_on_launch);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_logger_does_not_cap_verbosity() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(native_logger().build().filter(), log::LevelFilter::Trace);
    }

    #[test]
    fn test_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::ALL.len(), 5);
    }
}
