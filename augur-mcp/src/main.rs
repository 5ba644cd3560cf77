//! Augur MCP Server
//!
//! Line-delimited JSON-RPC 2.0 over stdio.
//!
//! Tools:
//! - predict_next: Predict the next value of a sequence
//! - describe_pattern: Describe a sequence's pattern in one sentence
//! - detect_pattern: Full detection result with evidence
//! - help: Documentation for a function
//! - list_functions: List available functions
//!
//! With `AUGUR_TRACE_REASONING=1` every function result also carries the
//! reasoning steps recorded during the call under `reasoning`.

use augur_core::Value;
use augur_inductive::{load_inductive_library, EngineConfig};
use augur_plugin::{CallContext, PluginRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "augur";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// JSON-RPC error codes
const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

// MCP Protocol types
#[derive(Debug, Deserialize)]
struct McpRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

#[derive(Debug, Serialize)]
struct McpError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl McpError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }
}

impl McpResponse {
    fn from_result(id: Option<JsonValue>, result: Result<JsonValue, McpError>) -> Self {
        match result {
            Ok(r) => Self {
                jsonrpc: "2.0".to_string(),
                id,
                result: Some(r),
                error: None,
            },
            Err(e) => Self {
                jsonrpc: "2.0".to_string(),
                id,
                result: None,
                error: Some(e),
            },
        }
    }
}

struct Server {
    registry: PluginRegistry,
    trace_reasoning: bool,
}

impl Server {
    fn new(config: EngineConfig) -> Self {
        Self {
            registry: load_inductive_library(PluginRegistry::new(), config),
            trace_reasoning: false,
        }
    }

    fn with_reasoning(mut self, enabled: bool) -> Self {
        self.trace_reasoning = enabled;
        self
    }

    /// Handle one raw line. None for notifications.
    fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let request: McpRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!("Error parsing request: {}", e);
                return Some(McpResponse::from_result(
                    None,
                    Err(McpError::new(PARSE_ERROR, format!("Parse error: {}", e))),
                ));
            }
        };

        debug!(method = %request.method, "processing");
        let response = self.handle_request(&request);

        // Notifications (no id) do not receive a response
        if request.id.is_none() {
            debug!(method = %request.method, "notification processed");
            return None;
        }
        Some(response)
    }

    fn handle_request(&self, request: &McpRequest) -> McpResponse {
        let result = match request.method.as_str() {
            // Lifecycle
            "initialize" => handle_initialize(&request.params),
            "initialized" | "notifications/initialized" => Ok(json!({})),
            "ping" => Ok(json!({})),

            // Tools
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tool_call(&request.params),

            _ => Err(McpError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };
        McpResponse::from_result(request.id.clone(), result)
    }

    fn handle_tools_list(&self) -> JsonValue {
        let mut tools = self.registry.tool_schemas();
        tools.push(json!({
            "name": "help",
            "description": "Get documentation for a function, or general help.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Function name. Omit for general help."
                    }
                }
            }
        }));
        tools.push(json!({
            "name": "list_functions",
            "description": "List available functions, optionally filtered by category.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "description": "Category filter, e.g. 'inductive'"
                    }
                }
            }
        }));
        json!({ "tools": tools })
    }

    fn handle_tool_call(&self, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
        let params = params
            .as_ref()
            .ok_or_else(|| McpError::invalid_params("Missing params"))?;

        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

        let args = params.get("arguments").cloned().unwrap_or(json!({}));
        if !args.is_object() {
            return Err(McpError::invalid_params("Tool arguments must be an object"));
        }

        let mut ctx = CallContext::new().with_tracing(self.trace_reasoning);
        let value = match name {
            "help" => self.registry.help(args.get("name").and_then(|v| v.as_str())),
            "list_functions" => self
                .registry
                .list_functions(args.get("category").and_then(|v| v.as_str())),
            _ => self.call_function(name, &args, &mut ctx)?,
        };

        let mut result = tool_result(&value)?;
        if self.trace_reasoning && !ctx.chain.is_empty() {
            let chain = serde_json::to_value(ctx.chain.steps())
                .map_err(|e| McpError::new(INTERNAL_ERROR, format!("Serialization failed: {}", e)))?;
            if let Some(obj) = result.as_object_mut() {
                obj.insert("reasoning".to_string(), chain);
            }
        }
        Ok(result)
    }

    /// Map named JSON arguments onto the function's positional arguments
    fn call_function(&self, name: &str, args: &JsonValue, ctx: &mut CallContext) -> Result<Value, McpError> {
        let func = self
            .registry
            .get_function(name)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown tool: {}", name)))?;
        let meta = func.meta();

        let mut positional = Vec::with_capacity(meta.args.len());
        for arg in meta.args {
            match args.get(arg.name) {
                Some(v) => positional.push(Value::from_json(v)),
                None if arg.optional => positional.push(Value::Null),
                None => {
                    return Err(McpError::invalid_params(format!(
                        "Missing argument '{}' for {}",
                        arg.name, meta.name
                    )))
                }
            }
        }
        // Drop trailing omitted optionals
        while matches!(positional.last(), Some(Value::Null)) && positional.len() > 1 {
            positional.pop();
        }

        Ok(self.registry.call_function(name, &positional, ctx))
    }
}

/// Wrap a function result as MCP tool content
fn tool_result(value: &Value) -> Result<JsonValue, McpError> {
    let data = value.to_json();
    let text = match value {
        Value::Error(e) => e.to_string(),
        Value::Text(s) => s.clone(),
        _ => serde_json::to_string(&data)
            .map_err(|e| McpError::new(INTERNAL_ERROR, format!("Serialization failed: {}", e)))?,
    };
    let error = value.as_error().map(|e| serde_json::to_value(e).unwrap_or(JsonValue::Null));

    let mut result = json!({
        "content": [{ "type": "text", "text": text }],
        "data": data,
        "isError": value.is_error()
    });
    if let (Some(obj), Some(err)) = (result.as_object_mut(), error) {
        obj.insert("error".to_string(), err);
    }
    Ok(result)
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params
        .as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Use client's protocol version for compatibility
    let client_protocol = params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    info!("Client connected: {} (protocol: {})", client_info, client_protocol);

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Sequence pattern detection with calibrated confidence"
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "instructions": "Augur recognises arithmetic, geometric, Fibonacci-family, polynomial, exponential and periodic sequences. Use predict_next for the next value, describe_pattern for a sentence, detect_pattern for full evidence. A confidence of 0 means no pattern was found."
    }))
}

fn write_response(response: &McpResponse) -> io::Result<()> {
    let json = serde_json::to_string(response).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    stdout.flush()
}

fn main() {
    // Logs go to stderr; stdout is the protocol channel
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let config = EngineConfig::from_env();
    info!(
        max_sequence_length = config.max_sequence_length,
        timeout_seconds = config.timeout_seconds,
        "Augur MCP Server v{} started (protocol {})",
        SERVER_VERSION,
        PROTOCOL_VERSION
    );
    let trace_reasoning = std::env::var("AUGUR_TRACE_REASONING")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);
    let server = Server::new(config).with_reasoning(trace_reasoning);

    let stdin = io::stdin();
    let reader = io::BufReader::new(stdin.lock());

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Error reading input: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(response) = server.handle_line(line) {
            if let Err(e) = write_response(&response) {
                error!("Error writing response: {}", e);
                break;
            }
        }
    }

    info!("Server shutting down");
}
