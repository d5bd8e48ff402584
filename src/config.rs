use std::{env, fmt::Display, str::FromStr};

use anyhow::{anyhow, bail, Context};
use tracing::{info, warn};

use crate::domain::order::StatusPolicy;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read once at startup from the process environment. A `.env` file in the
// working directory is loaded first (see `main`), so local runs need no
// exported variables.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("unknown storage backend '{other}' (expected postgres or memory)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    /// Only present (and required) for the postgres backend.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub strict_status_transitions: bool,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let storage: StorageBackend = try_load(&lookup, "STORAGE_BACKEND", "postgres")?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND=postgres");
        }

        let database_max_connections: u32 = try_load(&lookup, "DATABASE_MAX_CONNECTIONS", "5")?;
        if database_max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        Ok(Self {
            host: try_load(&lookup, "HOST", "0.0.0.0")?,
            port: try_load(&lookup, "PORT", "8000")?,
            storage,
            database_url,
            database_max_connections,
            strict_status_transitions: try_load(&lookup, "STRICT_STATUS_TRANSITIONS", "false")?,
            argon2_memory_kib: try_load(&lookup, "ARGON2_MEMORY_KIB", "19456")?,
            argon2_iterations: try_load(&lookup, "ARGON2_ITERATIONS", "2")?,
        })
    }

    pub fn status_policy(&self) -> StatusPolicy {
        if self.strict_status_transitions {
            StatusPolicy::Lifecycle
        } else {
            StatusPolicy::Unrestricted
        }
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn try_load<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            anyhow!("{e}")
        })
        .with_context(|| format!("invalid value for {key}: '{raw}'"))
}
