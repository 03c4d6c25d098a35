//! Process configuration for the taskwheel server.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Environment variable overriding the listen port.
const PORT_ENV: &str = "TASKWHEEL_PORT";
/// Environment variable overriding the database file.
const DB_FILE_ENV: &str = "TASKWHEEL_DBFILE";

const DEFAULT_PORT: u16 = 7540;
const DEFAULT_DB_FILE: &str = "scheduler.db";

/// Resolved server configuration. Flags win over the environment, the
/// environment wins over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// TCP port the API listens on.
    pub port: u16,
    /// Path of the SQLite database file.
    pub db_file: PathBuf,
}

impl ServerConfig {
    /// Resolve the configuration from CLI flags and the process environment.
    ///
    /// # Errors
    /// Returns an error when the port environment variable is set but is not
    /// a port number.
    pub fn load(port: Option<u16>, db_file: Option<PathBuf>) -> Result<Self> {
        Self::resolve(
            port,
            db_file,
            env::var(PORT_ENV).ok(),
            env::var(DB_FILE_ENV).ok(),
        )
    }

    fn resolve(
        port_flag: Option<u16>,
        db_flag: Option<PathBuf>,
        port_env: Option<String>,
        db_env: Option<String>,
    ) -> Result<Self> {
        let port = match (port_flag, port_env) {
            (Some(port), _) => port,
            (None, Some(raw)) if !raw.is_empty() => raw
                .parse()
                .with_context(|| format!("{PORT_ENV} must be a port number, got {raw:?}"))?,
            _ => DEFAULT_PORT,
        };

        let db_file = db_flag
            .or_else(|| db_env.filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));

        Ok(Self { port, db_file })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_flags_or_environment() {
        let config = ServerConfig::resolve(None, None, None, None).expect("resolve");
        assert_eq!(config.port, 7540);
        assert_eq!(config.db_file, PathBuf::from("scheduler.db"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ServerConfig::resolve(
            None,
            None,
            Some("8080".to_owned()),
            Some("/tmp/tasks.db".to_owned()),
        )
        .expect("resolve");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_file, PathBuf::from("/tmp/tasks.db"));
    }

    #[test]
    fn flags_override_the_environment() {
        let config = ServerConfig::resolve(
            Some(9000),
            Some(PathBuf::from("flag.db")),
            Some("8080".to_owned()),
            Some("env.db".to_owned()),
        )
        .expect("resolve");
        assert_eq!(config.port, 9000);
        assert_eq!(config.db_file, PathBuf::from("flag.db"));
    }

    #[test]
    fn empty_environment_values_fall_back_to_defaults() {
        let config =
            ServerConfig::resolve(None, None, Some(String::new()), Some(String::new()))
                .expect("resolve");
        assert_eq!(config.port, 7540);
        assert_eq!(config.db_file, PathBuf::from("scheduler.db"));
    }

    #[test]
    fn a_malformed_port_is_an_error() {
        assert!(ServerConfig::resolve(None, None, Some("many".to_owned()), None).is_err());
        assert!(ServerConfig::resolve(None, None, Some("70000".to_owned()), None).is_err());
    }
}
