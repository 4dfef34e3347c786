use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};

/// Runtime settings, loaded from `config.toml`.
///
/// ```toml
/// sequencer = "default"
/// client_name = "ALSA Connector"
/// settle_delay_ms = 500
/// log_level = "warn"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// ALSA sequencer device name. Default: "default".
    pub sequencer: String,
    /// Name this tool registers under while connected. Default: "ALSA Connector".
    pub client_name: String,
    /// Pause between connect calls during a restore. Default: 500.
    pub settle_delay_ms: u64,
    /// Log filter used when neither `--log-level` nor `RUST_LOG` is set.
    pub log_level: String,
}

fn default_settle_delay_ms() -> u64 {
    500
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sequencer: "default".into(),
            client_name: "ALSA Connector".into(),
            settle_delay_ms: default_settle_delay_ms(),
            log_level: "warn".into(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Settings> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => {
                return Err(RouteError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        toml::from_str(&contents).map_err(|e| RouteError::Config {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.sequencer, "default");
        assert_eq!(s.client_name, "ALSA Connector");
        assert_eq!(s.settle_delay(), Duration::from_millis(500));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let s: Settings = toml::from_str("settle_delay_ms = 20").unwrap();
        assert_eq!(s.settle_delay_ms, 20);
        assert_eq!(s.client_name, "ALSA Connector");
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "settle_delay_ms = \"soon\"").unwrap();
        assert!(matches!(Settings::load(&path), Err(RouteError::Config { .. })));
    }
}
