//! Pump.fun bonding curve helpers: address derivation, account decoding and
//! the filters used to find curves close to graduation.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::VerifyingKey;
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::params::{DefaultArg, ParamKind as K, ParamSpec as P};
use super::{Handler, ToolSpec};
use crate::blockchain::models::ChainError;
use crate::utils::{format_float, get_string_like, require_string_like};

pub const PUMP_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const ATA_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Anchor account discriminator of `BondingCurve`.
pub const DISCRIMINATOR: [u8; 8] = 6966180631402821399u64.to_le_bytes();

const LAMPORTS_PER_SOL: f64 = 1e9;
const TOKEN_DECIMALS_FACTOR: f64 = 1e6;
const TOTAL_SUPPLY: u64 = 1_000_000_000_000_000;
/// Tokens held back for migration; never sold on the curve.
const RESERVED_TOKENS: u64 = 206_900_000_000_000;
const GRADUATION_THRESHOLD: u64 = 100_000_000_000_000;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";
/// Discriminator plus five u64 fields and the `complete` flag.
const CURVE_STATE_LEN: usize = 8 + 5 * 8 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpTool {
    BondingCurveAddress,
    AssociatedBondingCurveAddress,
    BondingCurveData,
    BondingCurvePrice,
    BondingCurveProgress,
    GraduatingFilters,
}

const MINT: P = P::req("mint", K::Pubkey, "The base-58 mint address.");
const DATA: P = P::req(
    "data",
    K::String,
    "Bonding curve account data as returned by getAccountInfo.",
);
const ENCODING: P = P::opt("encoding", K::String, "One of 'base64' or 'hex'.")
    .or(DefaultArg::Str("base64"));

fn tool(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    params: Vec<P>,
    pump: PumpTool,
) -> ToolSpec {
    ToolSpec::new(name, title, description, params, Handler::Pumpfun(pump))
}

pub fn tools() -> Vec<ToolSpec> {
    vec![
        tool(
            "calculate_bonding_curve_address",
            "Calculate bonding curve address",
            "Derive the bonding curve PDA for a Pump.fun token mint. \
             Returns an object with 'bonding_curve_address' and 'bump'.",
            vec![MINT],
            PumpTool::BondingCurveAddress,
        ),
        tool(
            "calculate_associated_bonding_curve_address",
            "Associated bonding curve ATA",
            "Calculate the associated token account of the bonding curve for a Pump.fun mint. \
             Returns the base-58 address.",
            vec![MINT],
            PumpTool::AssociatedBondingCurveAddress,
        ),
        tool(
            "get_bonding_curve_data",
            "Parse bonding curve state",
            "Parse Pump.fun bonding curve state from raw account data (base64 or hex).",
            vec![DATA, ENCODING],
            PumpTool::BondingCurveData,
        ),
        tool(
            "calculate_bonding_curve_price",
            "Token price from curve",
            "Calculate the token price in SOL from bonding curve account data.",
            vec![DATA, ENCODING],
            PumpTool::BondingCurvePrice,
        ),
        tool(
            "calculate_bonding_curve_progress",
            "Bonding curve progress %",
            "Calculate bonding curve completion percent (0-100) from account data.",
            vec![DATA, ENCODING],
            PumpTool::BondingCurveProgress,
        ),
        tool(
            "get_graduating_bonding_curves",
            "Find graduating Pump.fun tokens (coarse filter)",
            "Returns memcmp filters for getProgramAccounts on the Pump.fun program that match \
             incomplete bonding curves whose real token reserves are below a coarse threshold. \
             Matches may still hold up to ~281M tokens; filter further client-side.",
            vec![],
            PumpTool::GraduatingFilters,
        ),
    ]
}

impl PumpTool {
    pub fn run(&self, args: &Value) -> Result<String, ChainError> {
        match self {
            PumpTool::BondingCurveAddress => {
                let mint = pubkey(&require_string_like(args, "mint")?)?;
                let (curve, bump) = bonding_curve_address(&mint)?;
                Ok(json!({
                    "bonding_curve_address": bs58::encode(curve).into_string(),
                    "bump": bump,
                })
                .to_string())
            }
            PumpTool::AssociatedBondingCurveAddress => {
                let mint = pubkey(&require_string_like(args, "mint")?)?;
                let address = associated_bonding_curve_address(&mint)?;
                Ok(bs58::encode(address).into_string())
            }
            PumpTool::BondingCurveData => {
                let state = BondingCurveState::from_args(args)?;
                serde_json::to_string(&state).map_err(|e| ChainError::Decode(e.to_string()))
            }
            PumpTool::BondingCurvePrice => {
                let state = BondingCurveState::from_args(args)?;
                Ok(format_float(state.price_in_sol()?))
            }
            PumpTool::BondingCurveProgress => {
                let state = BondingCurveState::from_args(args)?;
                Ok(format_float(state.progress_percent()))
            }
            PumpTool::GraduatingFilters => Ok(graduating_filters().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BondingCurveState {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    pub complete: bool,
}

impl BondingCurveState {
    fn from_args(args: &Value) -> Result<Self, ChainError> {
        let data = require_string_like(args, "data")?;
        let encoding = get_string_like(args, "encoding")?
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "base64".to_string());
        Self::parse(&decode_account_data(&data, &encoding)?)
    }

    /// Decodes the account layout; trailing bytes are ignored.
    pub fn parse(raw: &[u8]) -> Result<Self, ChainError> {
        if raw.len() < 8 || raw[..8] != DISCRIMINATOR {
            return Err(ChainError::invalid("Invalid discriminator for bonding curve"));
        }
        if raw.len() < CURVE_STATE_LEN {
            return Err(ChainError::invalid(format!(
                "Bonding curve data too short: {} bytes, need {}",
                raw.len(),
                CURVE_STATE_LEN
            )));
        }
        let field = |i: usize| {
            let start = 8 + i * 8;
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&raw[start..start + 8]);
            u64::from_le_bytes(bytes)
        };
        Ok(Self {
            virtual_token_reserves: field(0),
            virtual_sol_reserves: field(1),
            real_token_reserves: field(2),
            real_sol_reserves: field(3),
            token_total_supply: field(4),
            complete: raw[48] != 0,
        })
    }

    /// SOL per whole token.
    pub fn price_in_sol(&self) -> Result<f64, ChainError> {
        if self.virtual_token_reserves == 0 {
            return Err(ChainError::invalid("virtual token reserves are zero"));
        }
        let sol = self.virtual_sol_reserves as f64 / LAMPORTS_PER_SOL;
        let tokens = self.virtual_token_reserves as f64 / TOKEN_DECIMALS_FACTOR;
        Ok(sol / tokens)
    }

    pub fn progress_percent(&self) -> f64 {
        if self.complete {
            return 100.0;
        }
        let initial = (TOTAL_SUPPLY - RESERVED_TOKENS) as f64;
        let sold = (self.real_token_reserves as u128 * 100) as f64 / initial;
        (100.0 - sold).clamp(0.0, 100.0)
    }
}

fn decode_account_data(data: &str, encoding: &str) -> Result<Vec<u8>, ChainError> {
    match encoding {
        "base64" => STANDARD
            .decode(data.trim())
            .map_err(|e| ChainError::invalid(format!("Invalid base64 account data: {}", e))),
        "hex" => {
            let trimmed = data.trim();
            hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
                .map_err(|e| ChainError::invalid(format!("Invalid hex account data: {}", e)))
        }
        other => Err(ChainError::invalid(format!(
            "Unsupported encoding '{}'; use 'base64' or 'hex'",
            other
        ))),
    }
}

fn pubkey(text: &str) -> Result<[u8; 32], ChainError> {
    let bytes = bs58::decode(text.trim())
        .into_vec()
        .map_err(|e| ChainError::invalid(format!("Invalid public key '{}': {}", text, e)))?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        ChainError::invalid(format!(
            "Invalid public key '{}': expected 32 bytes, got {}",
            text,
            bytes.len()
        ))
    })
}

fn is_on_curve(bytes: &[u8; 32]) -> bool {
    VerifyingKey::from_bytes(bytes).is_ok()
}

/// `None` when the hash lands on the ed25519 curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    bump: u8,
    program_id: &[u8; 32],
) -> Option<[u8; 32]> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);
    let hash: [u8; 32] = hasher.finalize().into();
    if is_on_curve(&hash) {
        None
    } else {
        Some(hash)
    }
}

/// First off-curve address searching the bump seed from 255 down.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), ChainError> {
    (0..=u8::MAX)
        .rev()
        .find_map(|bump| create_program_address(seeds, bump, program_id).map(|a| (a, bump)))
        .ok_or_else(|| ChainError::invalid("Unable to find a viable program address bump seed"))
}

pub fn bonding_curve_address(mint: &[u8; 32]) -> Result<([u8; 32], u8), ChainError> {
    let program = pubkey(PUMP_PROGRAM_ID)?;
    find_program_address(&[b"bonding-curve".as_ref(), mint.as_ref()], &program)
}

pub fn associated_bonding_curve_address(mint: &[u8; 32]) -> Result<[u8; 32], ChainError> {
    let (curve, _) = bonding_curve_address(mint)?;
    let token_program = pubkey(TOKEN_PROGRAM_ID)?;
    let ata_program = pubkey(ATA_PROGRAM_ID)?;
    let (address, _) = find_program_address(
        &[curve.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ata_program,
    )?;
    Ok(address)
}

/// memcmp filters: discriminator at 0, the two high bytes of
/// `real_token_reserves` at 30, `complete == false` at 48.
pub fn graduating_filters() -> Value {
    let threshold = GRADUATION_THRESHOLD.to_le_bytes();
    json!([
        {"memcmp": {"offset": 0, "bytes": bs58::encode(DISCRIMINATOR).into_string()}},
        {"memcmp": {"offset": 30, "bytes": bs58::encode(&threshold[6..]).into_string()}},
        {"memcmp": {"offset": 48, "bytes": bs58::encode([0u8]).into_string()}},
    ])
}
