//! # Engine Configuration
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! ## Variables
//! ```text
//! ┌──────────────────────────────┬───────────────┬──────────────────────────┐
//! │ Variable                     │ Default       │ Used by                  │
//! ├──────────────────────────────┼───────────────┼──────────────────────────┤
//! │ SLOTWISE_DATABASE_PATH       │ slotwise.db   │ DbConfig                 │
//! │ SLOTWISE_MAX_CONNECTIONS     │ 5             │ DbConfig                 │
//! │ SLOTWISE_BUSY_TIMEOUT_MS     │ 5000          │ DbConfig (SQLite)        │
//! │ SLOTWISE_TX_TIMEOUT_MS       │ 10000         │ EngineConfig             │
//! │ SLOTWISE_OPEN                │ 09:00         │ EngineConfig hours       │
//! │ SLOTWISE_CLOSE               │ 18:00         │ EngineConfig hours       │
//! │ SLOTWISE_SLOT_INTERVAL_MIN   │ 30            │ EngineConfig hours       │
//! │ SLOTWISE_BREAK               │ (none)        │ "12:00-13:00"            │
//! └──────────────────────────────┴───────────────┴──────────────────────────┘
//! ```

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slotwise_core::{BusinessHours, TimeOfDay};

use crate::pool::DbConfig;

/// Default deadline for one reservation unit of work.
pub const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_DATABASE_PATH: &str = "slotwise.db";

/// Settings the coordinator needs beyond the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Every store unit of work is abandoned after this long.
    pub tx_timeout: Duration,

    /// Hours used to build the slot picker grid.
    pub business_hours: BusinessHours,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tx_timeout: DEFAULT_TX_TIMEOUT,
            business_hours: BusinessHours::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = BusinessHours::default();

        let tx_timeout = Duration::from_millis(parse_or(
            &lookup,
            "SLOTWISE_TX_TIMEOUT_MS",
            DEFAULT_TX_TIMEOUT.as_millis() as u64,
        )?);
        if tx_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("SLOTWISE_TX_TIMEOUT_MS".to_string()));
        }

        let open = parse_or(&lookup, "SLOTWISE_OPEN", defaults.open)?;
        let close = parse_or(&lookup, "SLOTWISE_CLOSE", defaults.close)?;
        if open >= close {
            return Err(ConfigError::InvalidHours {
                open: open.to_string(),
                close: close.to_string(),
            });
        }

        let interval = parse_or(
            &lookup,
            "SLOTWISE_SLOT_INTERVAL_MIN",
            defaults.slot_interval_minutes,
        )?;
        if interval == 0 {
            return Err(ConfigError::InvalidValue("SLOTWISE_SLOT_INTERVAL_MIN".to_string()));
        }

        let mut business_hours = BusinessHours::new(open, close).with_interval(interval);
        if let Some(raw) = lookup("SLOTWISE_BREAK") {
            let (start, end) = parse_break(&raw)?;
            business_hours = business_hours.with_break(start, end);
        }

        Ok(EngineConfig {
            tx_timeout,
            business_hours,
        })
    }
}

impl DbConfig {
    /// Load the pool configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = lookup("SLOTWISE_DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
        let base = DbConfig::new(path);

        let max_connections = parse_or(&lookup, "SLOTWISE_MAX_CONNECTIONS", base.max_connections)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("SLOTWISE_MAX_CONNECTIONS".to_string()));
        }

        let busy_timeout_ms = parse_or(
            &lookup,
            "SLOTWISE_BUSY_TIMEOUT_MS",
            base.busy_timeout.as_millis() as u64,
        )?;

        Ok(base
            .max_connections(max_connections)
            .busy_timeout(Duration::from_millis(busy_timeout_ms)))
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// `"12:00-13:00"` → (12:00, 13:00)
fn parse_break(raw: &str) -> Result<(TimeOfDay, TimeOfDay), ConfigError> {
    let invalid = || ConfigError::InvalidValue("SLOTWISE_BREAK".to_string());

    let (start, end) = raw.split_once('-').ok_or_else(invalid)?;
    let start: TimeOfDay = start.trim().parse().map_err(|_| invalid())?;
    let end: TimeOfDay = end.trim().parse().map_err(|_| invalid())?;

    if start >= end {
        return Err(invalid());
    }

    Ok((start, end))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Opening time {open} must be before closing time {close}")]
    InvalidHours { open: String, close: String },
}

// =============================================================================
// Unit Tests
// =============================================================================
