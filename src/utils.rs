//! Utility functions for the chain RPC MCP server

use ethers_core::types::U256;
use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::blockchain::models::ChainError;

/// Block tags accepted verbatim wherever a block number is expected.
pub const BLOCK_TAGS: [&str; 5] = ["latest", "earliest", "pending", "safe", "finalized"];

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(args: &Value, key: &str) -> Result<T, ChainError> {
    match args.get(key) {
        None | Some(Value::Null) => Err(ChainError::invalid(format!(
            "Missing required argument: '{}'",
            key
        ))),
        Some(v) => from_value(v.clone()).map_err(|e| {
            ChainError::invalid(format!("Invalid value for argument '{}': {}", key, e))
        }),
    }
}

/// Like [`get_required_arg`] but a missing or `null` value yields `None`.
pub fn get_optional_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
) -> Result<Option<T>, ChainError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => from_value(v.clone()).map(Some).map_err(|e| {
            ChainError::invalid(format!("Invalid value for argument '{}': {}", key, e))
        }),
    }
}

/// Reads a string argument, accepting JSON numbers as well (agents often send
/// `5` where `"5"` is declared).
pub fn get_string_like(args: &Value, key: &str) -> Result<Option<String>, ChainError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(ChainError::invalid(format!(
            "Argument '{}' must be a string or number, got {}",
            key, other
        ))),
    }
}

pub fn require_string_like(args: &Value, key: &str) -> Result<String, ChainError> {
    get_string_like(args, key)?
        .ok_or_else(|| ChainError::invalid(format!("Missing required argument: '{}'", key)))
}

/// Parses a decimal or `0x`-prefixed hex integer.
pub fn parse_u256(input: &str) -> Result<U256, ChainError> {
    let trimmed = input.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None => U256::from_dec_str(trimmed).ok(),
    };
    parsed.ok_or_else(|| ChainError::invalid(format!("'{}' is not a valid integer", input)))
}

/// Converts a decimal or hex quantity into the lowercase `0x` form EVM nodes
/// expect. Block tags pass through unchanged.
pub fn to_quantity(input: &str) -> Result<String, ChainError> {
    let trimmed = input.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if BLOCK_TAGS.contains(&lowered.as_str()) {
        return Ok(lowered);
    }
    Ok(format!("0x{:x}", parse_u256(trimmed)?))
}

/// Text form used in tool envelopes: strings are emitted bare, everything
/// else as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Formats a float the way the existing tool callers parse it: integral values
/// keep a trailing `.0`, very small or very large magnitudes use a signed
/// two-digit exponent (`1e-09`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let abs = value.abs();
    if !(1e-4..1e16).contains(&abs) {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            None => formatted,
        };
    }

    let formatted = format!("{}", value);
    if formatted.contains('.') {
        formatted
    } else {
        format!("{}.0", formatted)
    }
}

/// Scheme and host only. Node URLs routinely carry API keys in the path or
/// query string.
pub fn redact_endpoint(endpoint: &str) -> String {
    match url::Url::parse(endpoint) {
        Ok(url) => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}://{}:{}/***", url.scheme(), host, port),
            (Some(host), None) => format!("{}://{}/***", url.scheme(), host),
            _ => format!("{}://***", url.scheme()),
        },
        Err(_) => "<invalid url>".to_string(),
    }
}

pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...({} more chars)", head, total - max_chars)
}
