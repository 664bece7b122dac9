//! Configuration types.
//!
//! A node is configured either from two Java-style properties files (one for
//! the satellite itself, one for the code-distribution service) or from
//! environment variables. Any missing or malformed value is a [`ConfigError`],
//! which the binaries treat as fatal.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default bind host when the satellite configuration names none.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default upper bound on a single wire frame (16 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Default timeout for code-distribution fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A network endpoint: host, port and an optional human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub host: Option<String>,
    pub port: u16,
    pub name: Option<String>,
}

impl AddressRecord {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `host:port`, falling back to `default_host` when no host is set.
    pub fn authority(&self, default_host: &str) -> String {
        let host = self
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(default_host);
        format!("{}:{}", host, self.port)
    }

    /// Name for log output.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

/// What a connection handler sends when a job cannot be resolved or executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorReplyPolicy {
    /// Close the connection without writing anything.
    #[default]
    Silent,
    /// Write a bare `{"error": {...}}` value, then close.
    Explicit,
}

impl std::str::FromStr for ErrorReplyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "explicit" => Ok(Self::Explicit),
            other => Err(format!("expected 'silent' or 'explicit', got '{}'", other)),
        }
    }
}

/// Satellite node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// This node's listening endpoint. Only `port` is required.
    pub satellite: AddressRecord,
    /// The code-distribution service endpoint. `host` and `port` are required.
    pub code_server: AddressRecord,
    /// Per read/write timeout on client connections (None = wait forever).
    pub io_timeout: Option<Duration>,
    /// Maximum number of connections served at once (None = unbounded).
    pub max_connections: Option<usize>,
    /// Behavior on resolution/execution failure.
    pub error_replies: ErrorReplyPolicy,
    /// Largest accepted request frame.
    pub max_frame_len: usize,
    /// Timeout for a single code-distribution fetch.
    pub fetch_timeout: Duration,
}

impl NodeConfig {
    /// Configuration with the two endpoints and every hardening option at its default.
    pub fn new(satellite: AddressRecord, code_server: AddressRecord) -> Self {
        Self {
            satellite,
            code_server,
            io_timeout: None,
            max_connections: None,
            error_replies: ErrorReplyPolicy::default(),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Load from a satellite properties file (`PORT`, optional `NAME`/`HOST`)
    /// and a code-server properties file (`HOST`, `PORT`).
    pub fn from_properties_files(
        satellite_path: &Path,
        code_server_path: &Path,
    ) -> Result<Self, ConfigError> {
        let satellite_props = Properties::load(satellite_path)?;
        let code_server_props = Properties::load(code_server_path)?;

        let satellite = AddressRecord {
            host: satellite_props.get("HOST").map(str::to_string),
            port: parse_port("PORT", satellite_props.require("PORT")?)?,
            name: satellite_props.get("NAME").map(str::to_string),
        };
        let code_server = AddressRecord {
            host: Some(code_server_props.require("HOST")?.to_string()),
            port: parse_port("PORT", code_server_props.require("PORT")?)?,
            name: None,
        };

        Ok(Self::new(satellite, code_server))
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup using the environment variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str, hint: &str| {
            lookup(key).ok_or_else(|| ConfigError::MissingRequired {
                key: key.to_string(),
                hint: hint.to_string(),
            })
        };

        let satellite = AddressRecord {
            host: lookup("SATELLITE_HOST"),
            port: parse_port(
                "SATELLITE_PORT",
                &require("SATELLITE_PORT", "Set the port this satellite listens on.")?,
            )?,
            name: lookup("SATELLITE_NAME"),
        };
        let code_server = AddressRecord {
            host: Some(require(
                "CODE_SERVER_HOST",
                "Set the host of the code-distribution service.",
            )?),
            port: parse_port(
                "CODE_SERVER_PORT",
                &require(
                    "CODE_SERVER_PORT",
                    "Set the port of the code-distribution service.",
                )?,
            )?,
            name: None,
        };

        let mut config = Self::new(satellite, code_server);

        if let Some(raw) = lookup("SATELLITE_IO_TIMEOUT_SECS") {
            let secs: u64 = parse_value("SATELLITE_IO_TIMEOUT_SECS", &raw)?;
            config.io_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(raw) = lookup("SATELLITE_MAX_CONNECTIONS") {
            let max: usize = parse_value("SATELLITE_MAX_CONNECTIONS", &raw)?;
            config.max_connections = (max > 0).then_some(max);
        }
        if let Some(raw) = lookup("SATELLITE_ERROR_REPLIES") {
            config.error_replies = raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "SATELLITE_ERROR_REPLIES".to_string(),
                message,
            })?;
        }

        Ok(config)
    }
}

/// A parsed `KEY=VALUE` properties file.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse properties text. Blank lines and lines starting with `#` or `!`
    /// are skipped; `:` is accepted as a separator as well as `=`.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
            .filter_map(|line| {
                let split = line.find(['=', ':'])?;
                let (key, value) = line.split_at(split);
                Some((key.trim().to_string(), value[1..].trim().to_string()))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingRequired {
            key: key.to_string(),
            hint: "Add it to the properties file.".to_string(),
        })
    }
}

fn parse_port(key: &str, raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "port must be between 1 and 65535".to_string(),
        }),
        Ok(port) => Ok(port),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{}' is not a valid port: {}", raw, e),
        }),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
}
