// src/mcp/protocol.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::models::ChainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

impl Request {
    pub fn is_notification(&self) -> bool {
        self.id.is_null()
    }

    /// Decodes one frame. Text that is not JSON is a parse error; JSON that
    /// is not a request object is an invalid request.
    pub fn parse(frame: &str) -> Result<Self, Response> {
        let value: Value = serde_json::from_str(frame).map_err(|e| {
            Response::error(
                Value::Null,
                error_codes::PARSE_ERROR,
                format!("Parse error: {}", e),
            )
        })?;
        serde_json::from_value(value).map_err(|e| {
            Response::error(
                Value::Null,
                error_codes::INVALID_REQUEST,
                format!("Invalid request: {}", e),
            )
        })
    }
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(ErrorObject {
                code,
                message,
                data: None,
            }),
        }
    }
}

// Standard JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

// --- Tool and prompt payloads ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// The only shape a tool call ever produces: one text item plus an error
/// flag. `errorKind` is an optional machine-readable addition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<Content>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl ToolResult {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: false,
            error_kind: None,
        }
    }

    pub fn error(text: impl Into<String>, kind: &str) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: true,
            error_kind: Some(kind.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self.content.first() {
            Some(Content::Text { text }) => text,
            None => "",
        }
    }
}

impl From<&ChainError> for ToolResult {
    fn from(err: &ChainError) -> Self {
        ToolResult::error(err.to_string(), err.kind())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    pub title: String,
    pub read_only_hint: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub annotations: ToolAnnotations,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    pub description: String,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: Content,
}

impl PromptMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Content::Text { text: text.into() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_result_wire_shape() {
        let ok = serde_json::to_value(ToolResult::ok("0x1")).unwrap();
        assert_eq!(
            ok,
            json!({"content": [{"type": "text", "text": "0x1"}], "isError": false})
        );

        let err = ChainError::UnsupportedChain("doesnotexist".into());
        let value = serde_json::to_value(ToolResult::from(&err)).unwrap();
        assert_eq!(value["isError"], true);
        assert_eq!(value["errorKind"], "unsupported_chain");
        assert_eq!(value["content"][0]["text"], "Unsupported blockchain: doesnotexist");
    }

    #[test]
    fn frame_errors_are_told_apart() {
        let err = Request::parse("{not json").unwrap_err();
        assert_eq!(err.error.unwrap().code, error_codes::PARSE_ERROR);

        let err = Request::parse(r#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert_eq!(err.error.unwrap().code, error_codes::INVALID_REQUEST);

        let req = Request::parse(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
        assert_eq!(req.method, "ping");
    }

    #[test]
    fn requests_without_id_are_notifications() {
        let req: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(req.is_notification());
        assert!(req.params.is_none());
    }

    #[test]
    fn error_response_omits_result() {
        let resp = Response::error(json!(7), error_codes::METHOD_NOT_FOUND, "nope".into());
        let value = serde_json::to_value(resp).unwrap();
        assert!(value.get("result").is_none());
        assert_eq!(value["error"]["code"], -32601);
    }
}
