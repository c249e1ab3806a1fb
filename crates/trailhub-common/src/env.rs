//! Environment variable helpers
//!
//! Settings are read from the process environment. Blank values count as unset so
//! that `FOO=` in a `.env` file falls back to the default.

use crate::error::{Result, TrailHubError};
use std::str::FromStr;

/// Read a variable, treating unset and blank values as `None`
pub fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a variable that has no default
pub fn required_var(name: &str) -> Result<String> {
    optional_var(name).ok_or_else(|| TrailHubError::MissingSetting(name.to_string()))
}

/// Read and parse a variable; an unparseable value is an error, not a silent default
pub fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_var(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| TrailHubError::invalid_setting(name, format!("'{}': {}", raw, e)))
        })
        .transpose()
}

/// Read a boolean flag
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off` in any case.
pub fn flag_var(name: &str) -> Result<Option<bool>> {
    optional_var(name)
        .map(|raw| {
            parse_flag(&raw).ok_or_else(|| {
                TrailHubError::invalid_setting(name, format!("'{}' is not a boolean", raw))
            })
        })
        .transpose()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
