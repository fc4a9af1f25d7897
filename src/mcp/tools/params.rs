//! Parameter declarations and the rules that turn tool arguments into
//! positional JSON-RPC params.

use serde_json::{json, Map, Value};

use crate::blockchain::models::ChainError;
use crate::utils::to_quantity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    /// Block number, index or amount; decimal input is converted to `0x` hex,
    /// block tags pass through.
    Quantity,
    /// Base58 account key (32 bytes once decoded).
    Pubkey,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamKind::String | ParamKind::Quantity | ParamKind::Pubkey => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Array => "array",
            ParamKind::Object => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultArg {
    Str(&'static str),
    Bool(bool),
    Strs(&'static [&'static str]),
}

impl DefaultArg {
    pub fn to_value(&self) -> Value {
        match self {
            DefaultArg::Str(s) => json!(s),
            DefaultArg::Bool(b) => json!(b),
            DefaultArg::Strs(items) => json!(items),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
    pub default: Option<DefaultArg>,
}

impl ParamSpec {
    pub const fn req(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
            default: None,
        }
    }

    pub const fn opt(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
            default: None,
        }
    }

    /// Marks the parameter optional with a fallback value.
    pub const fn or(self, default: DefaultArg) -> Self {
        Self {
            name: self.name,
            kind: self.kind,
            required: false,
            description: self.description,
            default: Some(default),
        }
    }

    fn schema(&self) -> Value {
        let mut prop = json!({
            "type": self.kind.json_type(),
            "description": self.description,
        });
        if let Some(default) = &self.default {
            prop["default"] = default.to_value();
        }
        prop
    }
}

pub const CHAIN_PARAM: ParamSpec = ParamSpec::req(
    "chain",
    ParamKind::String,
    "Blockchain name. Run get_supported_blockchains to list the supported chains.",
);

/// JSON schema for a tool's `inputSchema`.
pub fn input_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for spec in params {
        properties.insert(spec.name.to_string(), spec.schema());
        if spec.required {
            required.push(json!(spec.name));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Reads one argument, applying the declared default and kind coercion.
/// Empty strings count as absent for optional parameters.
pub fn read(args: &Value, spec: &ParamSpec) -> Result<Option<Value>, ChainError> {
    let raw = match args.get(spec.name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() && !spec.required => None,
        Some(v) => Some(v),
    };
    match raw {
        Some(value) => coerce(spec.name, spec.kind, value).map(Some),
        None if spec.required => Err(ChainError::invalid(format!(
            "Missing required argument: '{}'",
            spec.name
        ))),
        None => Ok(spec.default.map(|d| d.to_value())),
    }
}

fn coerce(name: &str, kind: ParamKind, value: &Value) -> Result<Value, ChainError> {
    let wrong = |expected: &str| {
        ChainError::invalid(format!(
            "Argument '{}' must be {}, got {}",
            name, expected, value
        ))
    };
    match kind {
        ParamKind::String => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) => Ok(json!(n.to_string())),
            _ => Err(wrong("a string")),
        },
        ParamKind::Quantity => {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err(wrong("a number, hex string or block tag")),
            };
            to_quantity(&text)
                .map(Value::String)
                .map_err(|_| wrong("a number, hex string or block tag"))
        }
        ParamKind::Pubkey => {
            let text = value.as_str().ok_or_else(|| wrong("a base58 public key"))?;
            match bs58::decode(text).into_vec() {
                Ok(bytes) if bytes.len() == 32 => Ok(value.clone()),
                _ => Err(ChainError::invalid(format!(
                    "Argument '{}' is not a valid base58 public key: '{}'",
                    name, text
                ))),
            }
        }
        ParamKind::Integer => match value {
            Value::Number(n) if n.is_u64() => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<u64>()
                .map(|n| json!(n))
                .map_err(|_| wrong("a non-negative integer")),
            _ => Err(wrong("a non-negative integer")),
        },
        ParamKind::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| json!(f))
                .ok_or_else(|| wrong("a number")),
            _ => Err(wrong("a number")),
        },
        ParamKind::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(json!(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(json!(false)),
            _ => Err(wrong("a boolean")),
        },
        // Agents frequently send structured values as JSON text.
        ParamKind::Array => match value {
            Value::Array(_) => Ok(value.clone()),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(parsed @ Value::Array(_)) => Ok(parsed),
                _ => Err(wrong("an array")),
            },
            _ => Err(wrong("an array")),
        },
        ParamKind::Object => match value {
            Value::Object(_) => Ok(value.clone()),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(parsed @ Value::Object(_)) => Ok(parsed),
                _ => Err(wrong("an object")),
            },
            _ => Err(wrong("an object")),
        },
    }
}

/// Declared order, trailing absent params dropped, interior gaps sent as
/// `null`.
pub fn positional(args: &Value, specs: &[ParamSpec]) -> Result<Vec<Value>, ChainError> {
    let mut values = Vec::with_capacity(specs.len());
    for spec in specs {
        values.push(read(args, spec)?);
    }
    while matches!(values.last(), Some(None)) {
        values.pop();
    }
    Ok(values
        .into_iter()
        .map(|v| v.unwrap_or(Value::Null))
        .collect())
}

/// How a method's arguments become its positional params.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Positional,
    /// `[call, block, overrides?]`
    Call,
    /// `[call, block, tracerOptions]`
    DebugTraceCall,
    /// `[first param, tracerOptions?]`
    Traced,
    /// `[call, traceTypes, block]`
    TraceCall,
    /// `[[call, traceTypes]..., block]`
    TraceCallMany,
    /// `[filter]`
    LogFilter,
    /// `[payload, block]`
    Simulate,
}

impl Shape {
    pub fn build(&self, specs: &[ParamSpec], args: &Value) -> Result<Vec<Value>, ChainError> {
        // Builders read fields by name; required ones are enforced up front.
        for spec in specs.iter().filter(|s| s.required) {
            read(args, spec)?;
        }
        match self {
            Shape::Positional => positional(args, specs),
            Shape::Call => {
                let mut params = vec![call_object(args)?, block(args)?];
                if let Some(overrides) = state_overrides(args)? {
                    params.push(overrides);
                }
                Ok(params)
            }
            Shape::DebugTraceCall => Ok(vec![call_object(args)?, block(args)?, tracer_options(args)?]),
            Shape::Traced => {
                let mut params = positional(args, &specs[..1.min(specs.len())])?;
                let options = tracer_options(args)?;
                if options.as_object().map_or(false, |o| !o.is_empty()) {
                    params.push(options);
                }
                Ok(params)
            }
            Shape::TraceCall => Ok(vec![call_object(args)?, trace_types(args)?, block(args)?]),
            Shape::TraceCallMany => Ok(vec![call_many(args)?, block(args)?]),
            Shape::LogFilter => Ok(vec![log_filter(args)?]),
            Shape::Simulate => Ok(vec![simulate_payload(args)?, block(args)?]),
        }
    }
}

// --- Shared parameter groups ---

pub const BLOCK: ParamSpec = ParamSpec::opt(
    "block",
    ParamKind::Quantity,
    "Block number (decimal or hex) or tag: latest, earliest, pending, safe, finalized.",
)
.or(DefaultArg::Str("latest"));

pub fn call_object_params(to_required: bool) -> Vec<ParamSpec> {
    let to = if to_required {
        ParamSpec::req("to_address", ParamKind::String, "Recipient contract or account address.")
    } else {
        ParamSpec::opt("to_address", ParamKind::String, "Recipient address; omit for contract creation.")
    };
    vec![
        ParamSpec::opt("from_address", ParamKind::String, "Sender address."),
        to,
        ParamSpec::opt("gas", ParamKind::Quantity, "Gas limit."),
        ParamSpec::opt("gas_price", ParamKind::Quantity, "Gas price in wei."),
        ParamSpec::opt("value", ParamKind::Quantity, "Value to send in wei."),
        ParamSpec::opt("data", ParamKind::String, "ABI-encoded call data (0x-prefixed)."),
    ]
}

pub fn state_override_params() -> Vec<ParamSpec> {
    vec![
        ParamSpec::opt("override_address", ParamKind::String, "Address whose state is overridden for this call."),
        ParamSpec::opt("override_balance", ParamKind::Quantity, "Fake balance for that address."),
        ParamSpec::opt("override_nonce", ParamKind::Quantity, "Fake nonce."),
        ParamSpec::opt("override_code", ParamKind::String, "Fake bytecode."),
        ParamSpec::opt("override_state", ParamKind::Object, "Complete storage override."),
        ParamSpec::opt("override_state_diff", ParamKind::Object, "Partial storage override."),
    ]
}

pub fn tracer_params() -> Vec<ParamSpec> {
    vec![
        ParamSpec::opt("tracer", ParamKind::String, "Tracer name, e.g. callTracer or prestateTracer."),
        ParamSpec::opt("only_top_call", ParamKind::Boolean, "callTracer: trace only the top-level call."),
        ParamSpec::opt("diff_mode", ParamKind::Boolean, "prestateTracer: return a state diff."),
        ParamSpec::opt("timeout", ParamKind::String, "Tracer timeout, e.g. \"10s\"."),
    ]
}

pub const TRACE_TYPES: ParamSpec = ParamSpec::opt(
    "trace_types",
    ParamKind::Array,
    "Trace types: trace, vmTrace, stateDiff.",
)
.or(DefaultArg::Strs(&["trace"]));

// --- Builders ---

fn field(args: &Value, name: &'static str, kind: ParamKind) -> Result<Option<Value>, ChainError> {
    read(args, &ParamSpec::opt(name, kind, ""))
}

fn block(args: &Value) -> Result<Value, ChainError> {
    Ok(read(args, &BLOCK)?.unwrap_or_else(|| json!("latest")))
}

fn trace_types(args: &Value) -> Result<Value, ChainError> {
    Ok(read(args, &TRACE_TYPES)?.unwrap_or_else(|| json!(["trace"])))
}

pub fn call_object(args: &Value) -> Result<Value, ChainError> {
    let mut call = Map::new();
    let fields = [
        ("to_address", "to", ParamKind::String),
        ("from_address", "from", ParamKind::String),
        ("gas", "gas", ParamKind::Quantity),
        ("gas_price", "gasPrice", ParamKind::Quantity),
        ("value", "value", ParamKind::Quantity),
        ("data", "data", ParamKind::String),
    ];
    for (arg, key, kind) in fields {
        if let Some(v) = field(args, arg, kind)? {
            call.insert(key.to_string(), v);
        }
    }
    Ok(Value::Object(call))
}

pub fn state_overrides(args: &Value) -> Result<Option<Value>, ChainError> {
    let address = match field(args, "override_address", ParamKind::String)? {
        Some(Value::String(address)) => address,
        _ => return Ok(None),
    };
    let mut account = Map::new();
    let fields = [
        ("override_balance", "balance", ParamKind::Quantity),
        ("override_nonce", "nonce", ParamKind::Quantity),
        ("override_code", "code", ParamKind::String),
        ("override_state", "state", ParamKind::Object),
        ("override_state_diff", "stateDiff", ParamKind::Object),
    ];
    for (arg, key, kind) in fields {
        if let Some(v) = field(args, arg, kind)? {
            account.insert(key.to_string(), v);
        }
    }
    let mut overrides = Map::new();
    overrides.insert(address, Value::Object(account));
    Ok(Some(Value::Object(overrides)))
}

pub fn tracer_options(args: &Value) -> Result<Value, ChainError> {
    let mut options = Map::new();
    if let Some(tracer) = field(args, "tracer", ParamKind::String)? {
        options.insert("tracer".into(), tracer);
    }
    let mut config = Map::new();
    if let Some(v) = field(args, "only_top_call", ParamKind::Boolean)? {
        config.insert("onlyTopCall".into(), v);
    }
    if let Some(v) = field(args, "diff_mode", ParamKind::Boolean)? {
        config.insert("diffMode".into(), v);
    }
    if !config.is_empty() {
        options.insert("tracerConfig".into(), Value::Object(config));
    }
    if let Some(timeout) = field(args, "timeout", ParamKind::String)? {
        options.insert("timeout".into(), timeout);
    }
    Ok(Value::Object(options))
}

pub fn log_filter(args: &Value) -> Result<Value, ChainError> {
    let mut filter = Map::new();
    let fields = [
        ("from_block", "fromBlock", ParamKind::Quantity),
        ("to_block", "toBlock", ParamKind::Quantity),
        ("address", "address", ParamKind::String),
        ("topics", "topics", ParamKind::Array),
        ("block_hash", "blockHash", ParamKind::String),
    ];
    for (arg, key, kind) in fields {
        if let Some(v) = field(args, arg, kind)? {
            filter.insert(key.to_string(), v);
        }
    }
    if filter.contains_key("blockHash")
        && (filter.contains_key("fromBlock") || filter.contains_key("toBlock"))
    {
        return Err(ChainError::invalid(
            "block_hash cannot be combined with from_block/to_block",
        ));
    }
    Ok(Value::Object(filter))
}

/// `calls` is a list of `{call, trace_types}` objects; the node wants pairs.
pub fn call_many(args: &Value) -> Result<Value, ChainError> {
    let calls = read(
        args,
        &ParamSpec::req("calls", ParamKind::Array, ""),
    )?
    .unwrap_or_else(|| json!([]));
    let items = calls.as_array().map(Vec::as_slice).unwrap_or(&[]);
    let mut pairs = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let call = item
            .get("call")
            .filter(|c| c.is_object())
            .ok_or_else(|| ChainError::invalid(format!("calls[{}] needs a 'call' object", i)))?;
        let types = match item.get("trace_types") {
            None | Some(Value::Null) => json!(["trace"]),
            Some(t @ Value::Array(_)) => t.clone(),
            Some(_) => {
                return Err(ChainError::invalid(format!(
                    "calls[{}].trace_types must be an array",
                    i
                )))
            }
        };
        pairs.push(json!([call, types]));
    }
    Ok(Value::Array(pairs))
}

pub fn simulate_payload(args: &Value) -> Result<Value, ChainError> {
    let source = read(
        args,
        &ParamSpec::req("block_state_calls", ParamKind::Object, ""),
    )?
    .unwrap_or_else(|| json!({}));
    let validation = field(args, "validation", ParamKind::Boolean)?.unwrap_or(json!(true));
    let trace_transfers = field(args, "trace_transfers", ParamKind::Boolean)?.unwrap_or(json!(false));

    let mut payload = json!({
        "blockStateCalls": source.get("blockStateCalls").cloned().unwrap_or_else(|| json!([])),
        "validation": validation,
        "traceTransfers": trace_transfers,
    });
    for key in ["stateOverrides", "blockOverrides"] {
        if let Some(v) = source.get(key) {
            payload[key] = v.clone();
        }
    }
    Ok(payload)
}
