use std::path::PathBuf;

use super::ConfigError;

/// Runtime settings, read once in `main` and passed down.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Database name; also the stem of the snapshot file.
    pub database: String,
    /// Directory holding the snapshot. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    pub channel_buffer: usize,
    pub default_log_filter: String,
    pub clear_screen: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: "comerciotech".to_string(),
            data_dir: Some(PathBuf::from("data")),
            channel_buffer: 32,
            default_log_filter: "warn".to_string(),
            clear_screen: true,
        }
    }
}

impl AppConfig {
    /// Reads `ORDER_DESK_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database = lookup("ORDER_DESK_DATABASE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.database);

        let data_dir = match lookup("ORDER_DESK_DATA_DIR") {
            Some(dir) if dir.trim().is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => defaults.data_dir,
        };

        let channel_buffer = match lookup("ORDER_DESK_CHANNEL_BUFFER") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::InvalidValue {
                        var: "ORDER_DESK_CHANNEL_BUFFER",
                        reason: "must be at least 1".to_string(),
                    })
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        var: "ORDER_DESK_CHANNEL_BUFFER",
                        reason: e.to_string(),
                    })
                }
            },
            None => defaults.channel_buffer,
        };

        let default_log_filter = lookup("ORDER_DESK_LOG").unwrap_or(defaults.default_log_filter);

        let clear_screen = match lookup("ORDER_DESK_CLEAR_SCREEN") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
                var: "ORDER_DESK_CLEAR_SCREEN",
                reason: format!("expected true or false, got '{}'", raw),
            })?,
            None => defaults.clear_screen,
        };

        Ok(Self {
            database,
            data_dir,
            channel_buffer,
            default_log_filter,
            clear_screen,
        })
    }

    /// Where the snapshot lives, if persistence is enabled.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", self.database)))
    }

    /// Purely in-memory settings, used by tests.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            data_dir: None,
            clear_screen: false,
            ..Self::default()
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.snapshot_path(), Some(PathBuf::from("data/comerciotech.json")));
    }

    #[test]
    fn test_empty_data_dir_disables_persistence() {
        let config = config_from(&[("ORDER_DESK_DATA_DIR", "")]).unwrap();
        assert_eq!(config.snapshot_path(), None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ORDER_DESK_DATABASE", "shop"),
            ("ORDER_DESK_DATA_DIR", "/tmp/desk"),
            ("ORDER_DESK_CHANNEL_BUFFER", "8"),
            ("ORDER_DESK_CLEAR_SCREEN", "no"),
        ])
        .unwrap();
        assert_eq!(config.snapshot_path(), Some(PathBuf::from("/tmp/desk/shop.json")));
        assert_eq!(config.channel_buffer, 8);
        assert!(!config.clear_screen);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config_from(&[("ORDER_DESK_CHANNEL_BUFFER", "0")]).is_err());
        assert!(config_from(&[("ORDER_DESK_CHANNEL_BUFFER", "lots")]).is_err());
        assert!(config_from(&[("ORDER_DESK_CLEAR_SCREEN", "maybe")]).is_err());
    }
}
