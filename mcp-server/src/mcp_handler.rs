use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use tracing::{info, warn};

use crate::use_cases::{DrawUseCase, IngestUseCase, StatsUseCase, ToolError};

#[derive(Debug, serde::Deserialize)]
struct JsonRpcRequest {
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            result: Some(result),
            error: None,
            id,
        }
    }

    fn failure(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
            id,
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct Tool {
    name: &'static str,
    description: &'static str,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

pub struct MCPHandler {
    draw_use_case: Arc<DrawUseCase>,
    stats_use_case: Arc<StatsUseCase>,
    ingest_use_case: Arc<IngestUseCase>,
}

impl MCPHandler {
    pub fn new(
        draw_use_case: Arc<DrawUseCase>,
        stats_use_case: Arc<StatsUseCase>,
        ingest_use_case: Arc<IngestUseCase>,
    ) -> Self {
        Self {
            draw_use_case,
            stats_use_case,
            ingest_use_case,
        }
    }

    /// Answers one JSON-RPC request per input line until the reader is exhausted.
    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => {
                    // notifications get no response
                    if request.id.is_none() || request.method.starts_with("notifications/") {
                        if request.method == "notifications/initialized" {
                            info!("🎱 Client initialized");
                        }
                        continue;
                    }
                    self.handle_request(request).await
                }
                Err(e) => {
                    warn!(error = %e, "failed to parse request");
                    let mut response = JsonRpcResponse::failure(None, -32700, "Parse error".to_string());
                    if let Some(error) = response.error.as_mut() {
                        error.data = Some(json!(e.to_string()));
                    }
                    response
                }
            };

            writeln!(writer, "{}", serde_json::to_string(&response)?)?;
            writer.flush()?;
        }

        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => {
                info!("🎱 Initializing lotto MCP server");
                JsonRpcResponse::success(
                    request.id,
                    json!({
                        "protocolVersion": "2024-11-05",
                        "capabilities": { "tools": {} },
                        "serverInfo": {
                            "name": "lotto-mcp-server",
                            "version": env!("CARGO_PKG_VERSION")
                        }
                    }),
                )
            }
            "tools/list" => JsonRpcResponse::success(request.id, json!({ "tools": tools() })),
            "tools/call" => self.handle_call_tool(request.params, request.id).await,
            other => JsonRpcResponse::failure(request.id, -32601, format!("Method not found: {}", other)),
        }
    }

    async fn handle_call_tool(&self, params: Option<Value>, id: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::failure(id, -32602, "Missing params".to_string());
        };
        let Some(tool_name) = params.get("name").and_then(|n| n.as_str()) else {
            return JsonRpcResponse::failure(id, -32602, "Missing tool name".to_string());
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
        let arguments: HashMap<String, Value> = serde_json::from_value(arguments).unwrap_or_default();

        match self.execute_tool(tool_name, &arguments).await {
            Ok(content) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": content
                        }
                    ]
                }),
            ),
            Err(e) => {
                warn!(tool = tool_name, error = %e, "tool call failed");
                let message = match &e {
                    ToolError::InvalidParams(_) => format!("Invalid params: {}", e),
                    _ => format!("Tool execution error: {}", e),
                };
                JsonRpcResponse::failure(id, e.code(), message)
            }
        }
    }

    async fn execute_tool(
        &self,
        tool_name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<String, ToolError> {
        match tool_name {
            "get_current_draw" => self.draw_use_case.get_current_draw(arguments).await,
            "get_recent_draws" => self.draw_use_case.get_recent_draws(arguments).await,
            "get_draw" => self.draw_use_case.get_draw(arguments).await,
            "list_draws" => self.draw_use_case.list_draws(arguments).await,
            "get_landing_bundle" => self.stats_use_case.get_landing_bundle(arguments).await,
            "get_number_detail" => self.stats_use_case.get_number_detail(arguments).await,
            "get_extended_recommendations" => {
                self.stats_use_case.get_extended_recommendations(arguments).await
            }
            "fetch_latest" => self.ingest_use_case.fetch_latest(arguments).await,
            _ => Err(ToolError::InvalidParams(format!("Unknown tool: {}", tool_name))),
        }
    }
}

fn date_property() -> Value {
    json!({
        "type": "string",
        "description": "Day in YYYY-MM-DD format (default: today)"
    })
}

fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "get_current_draw",
            description: "Get the most recent stored draw (placeholder data when the store is empty)",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        Tool {
            name: "get_landing_bundle",
            description: "Get the current draw, number statistics, recommendations, recent draws and hot/cold numbers in one call",
            input_schema: json!({
                "type": "object",
                "properties": { "date": date_property() }
            }),
        },
        Tool {
            name: "get_number_detail",
            description: "Get appearance counts, trend, last appearance and companion numbers for one number",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "number": {
                        "type": "integer",
                        "description": "Ball number between 1 and 45"
                    }
                },
                "required": ["number"]
            }),
        },
        Tool {
            name: "get_extended_recommendations",
            description: "Get up to ten recommendation sets, one per strategy, seeded by the day",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "count": {
                        "type": "integer",
                        "description": "Number of sets, 1-10 (default: 10)"
                    },
                    "date": date_property()
                }
            }),
        },
        Tool {
            name: "get_recent_draws",
            description: "Get the most recent draws, newest first",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Number of draws to return (default: 5)"
                    }
                }
            }),
        },
        Tool {
            name: "get_draw",
            description: "Get one draw with its previous and next stored draws",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "draw_no": {
                        "type": "integer",
                        "description": "Draw number"
                    }
                },
                "required": ["draw_no"]
            }),
        },
        Tool {
            name: "list_draws",
            description: "List stored draws newest first, 20 per page",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page": {
                        "type": "integer",
                        "description": "Page number starting at 1 (default: 1)"
                    }
                }
            }),
        },
        Tool {
            name: "fetch_latest",
            description: "Fetch missing draws from the operator and store them",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "from": {
                        "type": "integer",
                        "description": "First draw number (default: newest stored + 1)"
                    },
                    "to": {
                        "type": "integer",
                        "description": "Last draw number (default: latest available)"
                    }
                }
            }),
        },
    ]
}

pub fn stdio() -> (BufReader<io::Stdin>, io::Stdout) {
    (BufReader::new(io::stdin()), io::stdout())
}
