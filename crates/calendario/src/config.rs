//! Configuration loading from environment variables.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;
const DB_FILE_NAME: &str = "calendario.db";

/// Runtime settings; command-line flags take precedence over these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub port: u16,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// Reads `CALENDARIO_DATA_DIR`, `CALENDARIO_PORT` and `CALENDARIO_LOG`,
    /// either from the environment or from a `.env` file. Unset variables
    /// fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(dir) = lookup("CALENDARIO_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }

        if let Some(port) = lookup("CALENDARIO_PORT") {
            settings.port = port
                .trim()
                .parse()
                .with_context(|| format!("CALENDARIO_PORT is not a valid port: {port:?}"))?;
        }

        if let Some(level) = lookup("CALENDARIO_LOG") {
            settings.log_level = level;
        }

        Ok(settings)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.db_path(), PathBuf::from("./calendario.db"));
    }

    #[test]
    fn test_reads_all_variables() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("CALENDARIO_DATA_DIR", "/var/lib/calendario"),
            ("CALENDARIO_PORT", "9000"),
            ("CALENDARIO_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(settings.data_dir, PathBuf::from("/var/lib/calendario"));
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(
            settings.db_path(),
            PathBuf::from("/var/lib/calendario/calendario.db")
        );
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = Settings::from_lookup(lookup_from(&[("CALENDARIO_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("CALENDARIO_PORT"));
    }
}
