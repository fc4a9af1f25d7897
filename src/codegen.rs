//! Offline generator for method tables.
//!
//! Reads OpenAPI-shaped JSON-RPC documentation, where each operation's request
//! body schema carries `method` and `params` properties with `default`
//! examples, and renders a `tools()` table in the shape of
//! `mcp::tools::solana_methods`.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::blockchain::models::ChainFamily;

const METHOD_PATTERN: &str = r#"(?s)"method":\s*\{[^}]*"default":\s*"([^"]+)"[^}]*\}.*?"params":\s*\{[^}]*"default":\s*(\[[^\]]*\])"#;
const FILE_DELIMITER: &str = r"={10,}\nFILE:.*\n={10,}\n";

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub method: String,
    /// Example params from the documentation; only their count and JSON
    /// types matter.
    pub params: Vec<Value>,
}

/// Walks `paths.*.*.requestBody.content["application/json"].schema.properties`.
pub fn extract_from_json(doc: &Value) -> Vec<MethodInfo> {
    let mut methods = Vec::new();
    let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
        return methods;
    };
    for path_item in paths.values() {
        let Some(operations) = path_item.as_object() else {
            continue;
        };
        for operation in operations.values() {
            let props = operation
                .pointer("/requestBody/content/application~1json/schema/properties");
            let Some(props) = props else {
                continue;
            };
            let method = props
                .get("method")
                .and_then(|m| m.get("default"))
                .and_then(Value::as_str);
            let params = props
                .get("params")
                .and_then(|p| p.get("default"))
                .and_then(Value::as_array);
            if let (Some(method), Some(params)) = (method, params) {
                methods.push(MethodInfo {
                    method: method.to_string(),
                    params: params.clone(),
                });
            }
        }
    }
    methods
}

/// Regex scan for documents that are not valid JSON (concatenated or
/// truncated exports). Entries whose params do not parse are skipped.
pub fn extract_from_text(text: &str) -> Result<Vec<MethodInfo>> {
    let pattern = Regex::new(METHOD_PATTERN).context("invalid method pattern")?;
    let mut methods = Vec::new();
    for captures in pattern.captures_iter(text) {
        let method = &captures[1];
        let cleaned = captures[2].replace('\n', "").replace("\\\"", "\"");
        match serde_json::from_str::<Vec<Value>>(&cleaned) {
            Ok(params) => methods.push(MethodInfo {
                method: method.to_string(),
                params,
            }),
            Err(e) => debug!(method, "skipping unparsable params example: {}", e),
        }
    }
    Ok(methods)
}

/// JSON first, regex scan when the text is not JSON or yields nothing.
pub fn extract_from_document(text: &str) -> Result<Vec<MethodInfo>> {
    if let Ok(doc) = serde_json::from_str::<Value>(text) {
        let methods = extract_from_json(&doc);
        if !methods.is_empty() {
            return Ok(methods);
        }
    }
    extract_from_text(text)
}

/// Handles combined exports where several JSON files are concatenated
/// behind `FILE:` banners.
pub fn extract_from_file_contents(text: &str) -> Result<Vec<MethodInfo>> {
    if !text.contains("================================================") {
        return extract_from_document(text);
    }
    let delimiter = Regex::new(FILE_DELIMITER).context("invalid delimiter pattern")?;
    let mut methods = Vec::new();
    for part in delimiter.split(text) {
        if part.trim().is_empty() {
            continue;
        }
        methods.extend(extract_from_document(part)?);
    }
    Ok(methods)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json") | Some("txt")
        ) {
            files.push(path);
        }
    }
    Ok(())
}

/// Reads one document or every `.json`/`.txt` file under a directory.
/// Repeated method names keep their first definition.
pub fn load_methods(path: &Path) -> Result<Vec<MethodInfo>> {
    let mut files = Vec::new();
    if path.is_dir() {
        collect_files(path, &mut files)?;
        files.sort();
    } else {
        files.push(path.to_path_buf());
    }

    let mut seen = HashSet::new();
    let mut methods = Vec::new();
    for file in files {
        let text =
            fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
        for info in extract_from_file_contents(&text)? {
            if seen.insert(info.method.clone()) {
                methods.push(info);
            } else {
                warn!(method = %info.method, file = %file.display(), "duplicate method ignored");
            }
        }
    }
    Ok(methods)
}

fn kind_of(example: &Value) -> &'static str {
    match example {
        Value::Bool(_) => "Boolean",
        Value::Number(n) if n.is_u64() => "Integer",
        Value::Number(_) => "Number",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
        Value::String(_) | Value::Null => "String",
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders the table in the shape of the family's method module. Solana tool
/// names are the lower-cased method, EVM tools keep the method name.
/// Parameters are `param0..paramN`, all required except a trailing config
/// object.
pub fn render_method_table(methods: &[MethodInfo], family: ChainFamily) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// Generated by gen_method_table; review parameter kinds before use.");
    let _ = writeln!(out, "// Family: {}", family);
    let _ = writeln!(out, "pub fn tools() -> Vec<ToolSpec> {{");
    let _ = writeln!(out, "    vec![");
    for info in methods {
        let last = info.params.len().saturating_sub(1);
        let params: Vec<String> = info
            .params
            .iter()
            .enumerate()
            .map(|(i, example)| {
                let kind = kind_of(example);
                let ctor = if i == last && kind == "Object" { "opt" } else { "req" };
                format!(
                    "P::{}(\"param{}\", K::{}, \"Positional parameter {}.\")",
                    ctor, i, kind, i
                )
            })
            .collect();
        let method = escape(&info.method);
        let params = params.join(", ");
        let _ = match family {
            // `evm_methods::rpc(method, description, params, shape)`
            ChainFamily::Evm => writeln!(
                out,
                "        rpc(\"{}\", \"Auto-generated tool for {}\", vec![{}], Shape::Positional),",
                method, method, params
            ),
            // `solana_methods::rpc(tool, method, description, params)`
            ChainFamily::Solana => writeln!(
                out,
                "        rpc(\"{}\", \"{}\", \"Auto-generated tool for {}\", vec![{}]),",
                escape(&info.method.to_lowercase()),
                method,
                method,
                params
            ),
        };
    }
    let _ = writeln!(out, "    ]");
    let _ = writeln!(out, "}}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn openapi(method: &str, params: Value) -> Value {
        json!({
            "openapi": "3.0.0",
            "paths": {
                format!("/{}", method): {
                    "post": {
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "id": {"type": "integer", "default": 1},
                                            "jsonrpc": {"type": "string", "default": "2.0"},
                                            "method": {"type": "string", "default": method},
                                            "params": {"type": "array", "default": params}
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn reads_request_body_defaults() {
        let doc = openapi("getBalance", json!(["83astBRguLMdt2h5U1Tpdq5tjFoJ6noeGwaY3mDLVcri", {"commitment": "finalized"}]));
        let methods = extract_from_json(&doc);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].method, "getBalance");
        assert_eq!(methods[0].params.len(), 2);
    }

    #[test]
    fn falls_back_to_regex_for_broken_json() {
        let text = r#"{ "properties": { "method": { "type": "string", "default": "eth_getCode" },
            "params": { "type": "array", "default": ["0xabc", "latest"] } } ,,, trailing"#;
        let methods = extract_from_document(text).unwrap();
        assert_eq!(
            methods,
            vec![MethodInfo {
                method: "eth_getCode".into(),
                params: vec![json!("0xabc"), json!("latest")],
            }]
        );
    }

    #[test]
    fn splits_combined_exports() {
        let banner = "================================================\nFILE: a.json\n================================================\n";
        let text = format!(
            "{}{}\n{}{}\n",
            banner,
            openapi("getSlot", json!([])),
            banner.replace("a.json", "b.json"),
            openapi("getBlockTime", json!([5]))
        );
        let methods = extract_from_file_contents(&text).unwrap();
        let names: Vec<_> = methods.iter().map(|m| m.method.as_str()).collect();
        assert_eq!(names, vec!["getSlot", "getBlockTime"]);
    }

    #[test]
    fn loads_directories_and_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), openapi("getSlot", json!([])).to_string()).unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("b.json"), openapi("getSlot", json!([{}])).to_string()).unwrap();
        fs::write(nested.join("c.txt"), openapi("getHealth", json!([])).to_string()).unwrap();
        fs::write(nested.join("ignored.md"), "nothing").unwrap();

        let methods = load_methods(dir.path()).unwrap();
        let names: Vec<_> = methods.iter().map(|m| m.method.as_str()).collect();
        assert_eq!(names, vec!["getSlot", "getHealth"]);
        assert!(methods[0].params.is_empty());
    }

    #[test]
    fn renders_positional_table() {
        let methods = vec![
            MethodInfo {
                method: "getBlock".into(),
                params: vec![json!(430), json!({"encoding": "json"})],
            },
            MethodInfo {
                method: "getHealth".into(),
                params: vec![],
            },
        ];
        let table = render_method_table(&methods, ChainFamily::Solana);
        assert!(table.contains(
            "rpc(\"getblock\", \"getBlock\", \"Auto-generated tool for getBlock\", vec![P::req(\"param0\", K::Integer, \"Positional parameter 0.\"), P::opt(\"param1\", K::Object, \"Positional parameter 1.\")]),"
        ));
        assert!(table.contains("rpc(\"gethealth\", \"getHealth\", \"Auto-generated tool for getHealth\", vec![]),"));
        assert!(table.contains("// Family: solana"));
    }

    #[test]
    fn renders_evm_table_with_shape() {
        let methods = vec![MethodInfo {
            method: "eth_getCode".into(),
            params: vec![json!("0xabc"), json!("latest")],
        }];
        let table = render_method_table(&methods, ChainFamily::Evm);
        assert!(table.contains(
            "rpc(\"eth_getCode\", \"Auto-generated tool for eth_getCode\", vec![P::req(\"param0\", K::String, \"Positional parameter 0.\"), P::req(\"param1\", K::String, \"Positional parameter 1.\")], Shape::Positional),"
        ));
        assert!(!table.contains("eth_getcode"));
        assert!(table.contains("// Family: evm"));
    }
}
