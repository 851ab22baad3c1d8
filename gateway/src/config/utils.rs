use std::fmt::Display;
use std::str::FromStr;

/// Read an environment variable, treating empty or whitespace-only values as unset.
pub(crate) fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse a boolean flag the way operators tend to write them in `.env` files.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read and parse an environment variable.
///
/// Returns `Ok(None)` when the variable is unset and an error naming the
/// variable when the value cannot be parsed.
pub(crate) fn parse_env<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    match env_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {name}: '{raw}' ({e})")),
        None => Ok(None),
    }
}

/// Read a boolean environment variable.
pub(crate) fn parse_env_bool(name: &str) -> Result<Option<bool>, String> {
    match env_var(name) {
        Some(raw) => parse_bool(&raw)
            .map(Some)
            .ok_or_else(|| format!("Invalid boolean for {name}: '{raw}'")),
        None => Ok(None),
    }
}
