use crate::error::ConfigError;

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Per-call record limit of the document store.
pub const MAX_BATCH_SIZE: usize = 450;
pub const DEFAULT_YIELD_EVERY: usize = 10;
pub const DEFAULT_STORE_PATH: &str = "shopdesk.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Viewer,
    Admin,
}

impl Role {
    pub fn can_write(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Viewer => f.write_str("viewer"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub batch_size: usize,
    pub yield_every: usize,
    pub store: StoreBackend,
    pub role: Role,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            yield_every: DEFAULT_YIELD_EVERY,
            store: StoreBackend::Memory,
            role: Role::Admin,
        }
    }
}

impl Config {
    /// Reads `SHOPDESK_*` variables, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = lookup("SHOPDESK_BATCH_SIZE") {
            let size = parse_usize("SHOPDESK_BATCH_SIZE", &raw)?;
            config.batch_size = size.clamp(1, MAX_BATCH_SIZE);
        }

        if let Some(raw) = lookup("SHOPDESK_YIELD_EVERY") {
            config.yield_every = parse_usize("SHOPDESK_YIELD_EVERY", &raw)?;
        }

        if let Some(raw) = lookup("SHOPDESK_ROLE") {
            config.role = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SHOPDESK_ROLE",
                value: raw.clone(),
            })?;
        }

        let path = lookup("SHOPDESK_STORE_PATH").unwrap_or_else(|| DEFAULT_STORE_PATH.to_string());
        if let Some(raw) = lookup("SHOPDESK_STORE") {
            config.store = match raw.trim().to_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "file" => StoreBackend::File(PathBuf::from(path)),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "SHOPDESK_STORE",
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }
}

fn parse_usize(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
