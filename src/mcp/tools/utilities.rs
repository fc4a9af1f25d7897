//! Local conversions for post-processing RPC results. No network access.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use ethers_core::types::U256;
use serde_json::Value;

use super::params::{ParamKind as K, ParamSpec as P};
use super::{Handler, ToolSpec};
use crate::blockchain::models::ChainError;
use crate::utils::{format_float, parse_u256, require_string_like};

const WEI_PER_ETH: f64 = 1e18;
const WEI_PER_GWEI: f64 = 1e9;
const LAMPORTS_PER_SOL: f64 = 1e9;
const MICROLAMPORTS_PER_LAMPORT: f64 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utility {
    HexToInt,
    IntToHex,
    WeiToEth,
    GasPriceInGwei,
    TimestampToDatetime,
    DatetimeToTimestamp,
    LamportsToSol,
    SolToLamports,
    MicrolamportsToLamports,
    LamportsToMicrolamports,
    Base58ToBase64,
    Base64ToBase58,
}

fn tool(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    param: P,
    utility: Utility,
) -> ToolSpec {
    ToolSpec::new(name, title, description, vec![param], Handler::Utility(utility))
}

fn timestamp_tools() -> Vec<ToolSpec> {
    vec![
        tool(
            "convert_timestamp_to_datetime",
            "Unix timestamp to ISO-8601",
            "Converts a Unix timestamp in seconds (decimal or hex) into an ISO-8601 UTC datetime.\n\
             Example: convert_timestamp_to_datetime(\"0x5f5e100\") -> \"1973-03-03T09:46:40Z\"",
            P::req("timestamp", K::String, "Unix seconds, decimal or 0x-prefixed hex."),
            Utility::TimestampToDatetime,
        ),
        tool(
            "convert_datetime_to_timestamp",
            "ISO-8601 to Unix timestamp",
            "Converts an ISO-8601 datetime into Unix seconds. Values without an offset are read as UTC.\n\
             Example: convert_datetime_to_timestamp(\"2024-01-01T00:00:00Z\") -> 1704067200",
            P::req("datetime", K::String, "Datetime such as 2024-01-01T00:00:00Z."),
            Utility::DatetimeToTimestamp,
        ),
    ]
}

pub fn evm_tools() -> Vec<ToolSpec> {
    let mut tools = vec![
        tool(
            "convert_hex_to_int",
            "Hex to integer",
            "Converts a hexadecimal quantity into a decimal integer.\n\
             Example: convert_hex_to_int(\"0x10\") -> 16",
            P::req("value", K::String, "Hex string, with or without 0x."),
            Utility::HexToInt,
        ),
        tool(
            "convert_int_to_hex",
            "Integer to hex",
            "Converts a decimal integer into a 0x-prefixed hexadecimal quantity.\n\
             Example: convert_int_to_hex(\"16\") -> \"0x10\"",
            P::req("value", K::String, "Non-negative decimal integer."),
            Utility::IntToHex,
        ),
        tool(
            "convert_hex_wei_to_decimal_eth",
            "Converts Wei amount (hexadecimal) into Ether amount (decimal)",
            "Converts Wei amount (in hexadecimal format) into Ether (ETH) in decimal format.",
            P::req("wei", K::String, "Amount in wei, 0x-prefixed hex."),
            Utility::WeiToEth,
        ),
        tool(
            "format_gas_price_in_gwei",
            "Gas price in Gwei",
            "Converts a gas price in wei (hexadecimal, as returned by eth_gasPrice) into Gwei.\n\
             Example: format_gas_price_in_gwei(\"0x3b9aca00\") -> 1.0",
            P::req("gas_price", K::String, "Gas price in wei, 0x-prefixed hex."),
            Utility::GasPriceInGwei,
        ),
    ];
    tools.extend(timestamp_tools());
    tools
}

pub fn solana_tools() -> Vec<ToolSpec> {
    let mut tools = vec![
        tool(
            "convert_lamports_to_sol",
            "Lamports to SOL",
            "Converts lamport amount (int or string) into SOL (decimal).\n\
             Example: convert_lamports_to_sol(\"1000000000\") -> 1.0",
            P::req("lamports", K::String, "Integer amount of lamports."),
            Utility::LamportsToSol,
        ),
        tool(
            "convert_sol_to_lamports",
            "SOL to Lamports",
            "Converts SOL amount (decimal string or float) into lamports (integer).\n\
             Example: convert_sol_to_lamports(\"1.5\") -> 1500000000",
            P::req("sol", K::String, "Amount of SOL."),
            Utility::SolToLamports,
        ),
        tool(
            "convert_microlamports_to_lamports",
            "Microlamports to Lamports",
            "Converts microlamport amount (int or string) into lamports (decimal).\n\
             Example: convert_microlamports_to_lamports(\"1000000\") -> 1.0",
            P::req("microlamports", K::String, "Integer amount of microlamports."),
            Utility::MicrolamportsToLamports,
        ),
        tool(
            "convert_lamports_to_microlamports",
            "Lamports to Microlamports",
            "Converts lamport amount (int or string) into microlamports (integer).\n\
             Example: convert_lamports_to_microlamports(\"2.5\") -> 2500000",
            P::req("lamports", K::String, "Amount of lamports, fractions allowed."),
            Utility::LamportsToMicrolamports,
        ),
        tool(
            "base58_to_base64",
            "Base58 to Base64",
            "Converts a base58 string into a base64-encoded string.\n\
             Example: base58_to_base64(\"3mJr7AoUCHxNqd\") -> \"MTIzNDU2Nzg5MA==\"",
            P::req("value", K::String, "Base58 text."),
            Utility::Base58ToBase64,
        ),
        tool(
            "base64_to_base58",
            "Base64 to Base58",
            "Converts a base64 string into a base58-encoded string.\n\
             Example: base64_to_base58(\"MTIzNDU2Nzg5MA==\") -> \"3mJr7AoUCHxNqd\"",
            P::req("value", K::String, "Base64 text."),
            Utility::Base64ToBase58,
        ),
    ];
    tools.extend(timestamp_tools());
    tools
}

impl Utility {
    pub fn run(&self, args: &Value) -> Result<String, ChainError> {
        match self {
            Utility::HexToInt => hex_to_int(&require_string_like(args, "value")?),
            Utility::IntToHex => int_to_hex(&require_string_like(args, "value")?),
            Utility::WeiToEth => {
                let wei = hex_amount(&require_string_like(args, "wei")?)?;
                Ok(format_float(wei / WEI_PER_ETH))
            }
            Utility::GasPriceInGwei => {
                let wei = hex_amount(&require_string_like(args, "gas_price")?)?;
                Ok(format_float(wei / WEI_PER_GWEI))
            }
            Utility::TimestampToDatetime => {
                timestamp_to_datetime(&require_string_like(args, "timestamp")?)
            }
            Utility::DatetimeToTimestamp => {
                datetime_to_timestamp(&require_string_like(args, "datetime")?)
            }
            Utility::LamportsToSol => {
                let lamports = integer(&require_string_like(args, "lamports")?)?;
                Ok(format_float(lamports as f64 / LAMPORTS_PER_SOL))
            }
            Utility::SolToLamports => {
                let sol = decimal(&require_string_like(args, "sol")?)?;
                Ok(truncate(sol * LAMPORTS_PER_SOL))
            }
            Utility::MicrolamportsToLamports => {
                let micro = integer(&require_string_like(args, "microlamports")?)?;
                Ok(format_float(micro as f64 / MICROLAMPORTS_PER_LAMPORT))
            }
            Utility::LamportsToMicrolamports => {
                let lamports = decimal(&require_string_like(args, "lamports")?)?;
                Ok(truncate(lamports * MICROLAMPORTS_PER_LAMPORT))
            }
            Utility::Base58ToBase64 => {
                let value = require_string_like(args, "value")?;
                let bytes = bs58::decode(value.trim())
                    .into_vec()
                    .map_err(|e| ChainError::invalid(format!("Invalid base58 '{}': {}", value, e)))?;
                Ok(STANDARD.encode(bytes))
            }
            Utility::Base64ToBase58 => {
                let value = require_string_like(args, "value")?;
                let bytes = STANDARD
                    .decode(value.trim())
                    .map_err(|e| ChainError::invalid(format!("Invalid base64 '{}': {}", value, e)))?;
                Ok(bs58::encode(bytes).into_string())
            }
        }
    }
}

fn parse_hex(input: &str) -> Result<U256, ChainError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(ChainError::invalid(format!("'{}' is not a hex number", input)));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|_| ChainError::invalid(format!("'{}' is not a hex number", input)))
}

fn hex_to_int(input: &str) -> Result<String, ChainError> {
    Ok(parse_hex(input)?.to_string())
}

fn int_to_hex(input: &str) -> Result<String, ChainError> {
    let value = U256::from_dec_str(input.trim())
        .map_err(|_| ChainError::invalid(format!("'{}' is not a decimal integer", input)))?;
    Ok(format!("0x{:x}", value))
}

fn hex_amount(input: &str) -> Result<f64, ChainError> {
    let value = parse_hex(input)?;
    value
        .to_string()
        .parse::<f64>()
        .map_err(|e| ChainError::invalid(format!("'{}' cannot be represented: {}", input, e)))
}

fn integer(input: &str) -> Result<i128, ChainError> {
    input
        .trim()
        .parse::<i128>()
        .map_err(|_| ChainError::invalid(format!("'{}' is not an integer", input)))
}

fn decimal(input: &str) -> Result<f64, ChainError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ChainError::invalid(format!("'{}' is not a number", input)))
}

/// Drops the fractional part, toward zero.
fn truncate(value: f64) -> String {
    format!("{}", value.trunc() as i128)
}

fn timestamp_to_datetime(input: &str) -> Result<String, ChainError> {
    let seconds = parse_u256(input)?;
    if seconds > U256::from(i64::MAX as u64) {
        return Err(ChainError::invalid(format!("timestamp '{}' is out of range", input)));
    }
    let datetime = DateTime::<Utc>::from_timestamp(seconds.as_u64() as i64, 0)
        .ok_or_else(|| ChainError::invalid(format!("timestamp '{}' is out of range", input)))?;
    Ok(datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

fn datetime_to_timestamp(input: &str) -> Result<String, ChainError> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.timestamp().to_string());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc().timestamp().to_string());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp().to_string());
        }
    }
    Err(ChainError::invalid(format!(
        "'{}' is not an ISO-8601 datetime",
        input
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(utility: Utility, key: &str, value: &str) -> Result<String, ChainError> {
        utility.run(&json!({ key: value }))
    }

    #[test]
    fn wei_and_gwei() {
        assert_eq!(run(Utility::WeiToEth, "wei", "0xde0b6b3a7640000").unwrap(), "1.0");
        assert_eq!(run(Utility::WeiToEth, "wei", "0x0").unwrap(), "0.0");
        assert_eq!(run(Utility::GasPriceInGwei, "gas_price", "0x3b9aca00").unwrap(), "1.0");
        assert_eq!(run(Utility::GasPriceInGwei, "gas_price", "0x1").unwrap(), "1e-09");
        assert!(run(Utility::WeiToEth, "wei", "wei").is_err());
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(run(Utility::HexToInt, "value", "0x10").unwrap(), "16");
        assert_eq!(run(Utility::HexToInt, "value", "ff").unwrap(), "255");
        assert_eq!(run(Utility::IntToHex, "value", "16").unwrap(), "0x10");
        let back = run(Utility::HexToInt, "value", "0x10").unwrap();
        assert_eq!(run(Utility::IntToHex, "value", &back).unwrap(), "0x10");
        let err = run(Utility::HexToInt, "value", "0xzz").unwrap_err();
        assert_eq!(err.kind(), "invalid_params");
    }

    #[test]
    fn lamport_conversions() {
        assert_eq!(run(Utility::LamportsToSol, "lamports", "1000000000").unwrap(), "1.0");
        assert_eq!(run(Utility::SolToLamports, "sol", "1.5").unwrap(), "1500000000");
        assert_eq!(
            run(Utility::MicrolamportsToLamports, "microlamports", "1000000").unwrap(),
            "1.0"
        );
        assert_eq!(
            run(Utility::LamportsToMicrolamports, "lamports", "2.5").unwrap(),
            "2500000"
        );
        assert!(run(Utility::LamportsToSol, "lamports", "1.5").is_err());
        assert_eq!(
            Utility::LamportsToSol.run(&json!({"lamports": 500000000})).unwrap(),
            "0.5"
        );
    }

    #[test]
    fn base58_base64() {
        assert_eq!(
            run(Utility::Base58ToBase64, "value", "3mJr7AoUCHxNqd").unwrap(),
            "MTIzNDU2Nzg5MA=="
        );
        assert_eq!(
            run(Utility::Base64ToBase58, "value", "MTIzNDU2Nzg5MA==").unwrap(),
            "3mJr7AoUCHxNqd"
        );
        assert!(run(Utility::Base58ToBase64, "value", "0OIl").is_err());
    }

    #[test]
    fn timestamps() {
        assert_eq!(
            run(Utility::TimestampToDatetime, "timestamp", "1704067200").unwrap(),
            "2024-01-01T00:00:00Z"
        );
        assert_eq!(
            run(Utility::TimestampToDatetime, "timestamp", "0x5f5e100").unwrap(),
            "1973-03-03T09:46:40Z"
        );
        assert_eq!(
            run(Utility::DatetimeToTimestamp, "datetime", "2024-01-01T00:00:00Z").unwrap(),
            "1704067200"
        );
        assert_eq!(
            run(Utility::DatetimeToTimestamp, "datetime", "2024-01-01T02:00:00+02:00").unwrap(),
            "1704067200"
        );
        assert_eq!(
            run(Utility::DatetimeToTimestamp, "datetime", "2024-01-01 00:00:00").unwrap(),
            "1704067200"
        );
        assert!(run(Utility::DatetimeToTimestamp, "datetime", "yesterday").is_err());
    }

    #[test]
    fn missing_argument_is_invalid() {
        let err = Utility::HexToInt.run(&json!({})).unwrap_err();
        assert!(err.to_string().contains("value"));
    }
}
