// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging for the objproxy workspace
//!
//! Usage:
//! - Set OBJPROXY_LOG=off (default) - no logs
//! - Set OBJPROXY_LOG=info - fetches, uploads and discarded edits
//! - Set OBJPROXY_LOG=debug - overlay and cache decisions

use std::str::FromStr;
use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable consulted by [`init_diagnostics`].
pub const LOG_ENV: &str = "OBJPROXY_LOG";

static INIT: Once = Once::new();

/// Minimum level written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

/// Returned when a level name is not one of off, error, warn, info, debug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevel(pub String);

impl std::fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown log level '{}'", self.0)
    }
}

impl std::error::Error for UnknownLevel {}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    fn filter(self) -> Option<emit::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(emit::Level::Error),
            LogLevel::Warn => Some(emit::Level::Warn),
            LogLevel::Info => Some(emit::Level::Info),
            LogLevel::Debug => Some(emit::Level::Debug),
        }
    }
}

/// Initialize diagnostics from the OBJPROXY_LOG environment variable.
///
/// Safe to call multiple times; only the first call (of this or
/// [`init_with_level`]) has any effect. An unrecognized value falls back to
/// `info`.
pub fn init_diagnostics() {
    let raw = std::env::var(LOG_ENV).ok();
    let (level, unknown) = env_level(raw.as_deref());
    init_with_level(level);
    if let Some(UnknownLevel(raw)) = unknown {
        emit::warn!("Unknown {env} value '{raw}', using 'info'", env: LOG_ENV, raw: raw);
    }
}

/// Level selected by an OBJPROXY_LOG value. Unset means off; an unknown name
/// selects info and is returned so the caller can report it.
fn env_level(raw: Option<&str>) -> (LogLevel, Option<UnknownLevel>) {
    match raw.unwrap_or("off").parse::<LogLevel>() {
        Ok(level) => (level, None),
        Err(unknown) => (LogLevel::Info, Some(unknown)),
    }
}

/// Initialize diagnostics with an explicit minimum level.
pub fn init_with_level(level: LogLevel) {
    INIT.call_once(|| {
        let Some(min) = level.filter() else {
            return;
        };
        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min))
            .init();

        // The runtime must outlive every emitter; keep it for the process lifetime.
        std::mem::forget(rt);
    });
}

/// Log basic operations (uploads, fetches, reconciles).
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (overlay merges, cache hits).
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable problems.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures surfaced to callers.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Using "error" instead of "fatal" for consistency with emit-rs
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_with_level(LogLevel::Off);
        init_diagnostics();
        init_with_level(LogLevel::Debug);
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(" WARN ".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("".parse::<LogLevel>(), Ok(LogLevel::Off));
        assert_eq!(
            "verbose".parse::<LogLevel>(),
            Err(UnknownLevel("verbose".to_string()))
        );
    }

    #[test]
    fn test_env_level_fallback() {
        assert_eq!(env_level(None), (LogLevel::Off, None));
        assert_eq!(env_level(Some("debug")), (LogLevel::Debug, None));
        assert_eq!(
            env_level(Some("loud")),
            (LogLevel::Info, Some(UnknownLevel("loud".to_string())))
        );
    }

    #[test]
    fn test_macros_compile() {
        log_info!("Test message");
        log_debug!("Debug message with {value}", value: 42);
        log_warn!("Warning message");
        log_error!("Error message");

        info!("Test message");
        debug!("Debug message with {value}", value: 42);
        warn!("Warning message");
        error!("Error message");
    }

    #[test]
    fn test_macros_take_local_properties() {
        let name = "obj";
        let size = 42u64;
        debug!("Fetched {name} ({size} bytes)", name: name, size: size);
        warn!("Retrying {name}", name: name);
    }
}
