//! HTTP 网关：GET /discovery、POST /execute-tool、GET /tools
//!
//! 缺少工具名或请求体不是合法 JSON 返回 400；其余任何失败（tool 类型不对、参数校验、本地工具、代理、未知工具）统一 500 `{ "error": ... }`。
//! 不排队、不限流，每个请求立即独立分发。

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error::GatewayError;
use crate::proxy::{ToolInvocation, EXECUTE_TOOL_PATH};
use crate::router::Router as ToolRouter;

pub const MISSING_TOOL_NAME: &str = "Missing tool name";
pub const TOOL_NAME_NOT_STRING: &str = "Tool name must be a string";

/// 服务状态
pub struct GatewayState {
    pub router: ToolRouter,
}

#[derive(Debug, Deserialize)]
struct ExecuteToolRequest {
    #[serde(default)]
    tool: Value,
    #[serde(default)]
    args: Value,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(kind = self.kind(), error = %self, "tool request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// 创建网关路由
pub fn create_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/discovery", get(discovery))
        .route(EXECUTE_TOOL_PATH, post(execute_tool))
        .route("/tools", get(list_tools))
        .with_state(state)
}

/// 监听直到 shutdown 被取消
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn discovery(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    let services = state.router.registry().snapshot().addresses();
    Json(json!({ "services": services }))
}

async fn list_tools(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    Json(json!({ "tools": state.router.tools().schemas() }))
}

/// 不强制 Content-Type：空体与 `{}` 一样视为缺少工具名
fn parse_request(body: &[u8]) -> Result<ToolInvocation, GatewayError> {
    let req: ExecuteToolRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ExecuteToolRequest {
            tool: Value::Null,
            args: Value::Null,
        }
    } else {
        serde_json::from_slice(body)
            .map_err(|e| GatewayError::Validation(format!("Invalid JSON body: {}", e)))?
    };
    let tool = match req.tool {
        Value::Null => None,
        Value::String(name) => Some(name),
        _ => return Err(GatewayError::InvalidRequest(TOOL_NAME_NOT_STRING.to_string())),
    };
    let tool = tool
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| GatewayError::Validation(MISSING_TOOL_NAME.to_string()))?;
    Ok(ToolInvocation::new(tool, req.args))
}

async fn execute_tool(
    State(state): State<Arc<GatewayState>>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let invocation = parse_request(&body)?;
    let result = state.router.dispatch(invocation).await?;
    Ok(Json(json!({ "result": result })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_missing_tool() {
        for body in ["", "{}", r#"{"tool": ""}"#, r#"{"args": {}}"#, r#"{"tool": null}"#] {
            let err = parse_request(body.as_bytes()).unwrap_err();
            assert_eq!(err.to_string(), MISSING_TOOL_NAME, "{body}");
        }
    }

    #[test]
    fn test_non_string_tool_is_server_error() {
        for body in [r#"{"tool": 5, "args": {}}"#, r#"{"tool": ["readFile"]}"#, r#"{"tool": {}}"#] {
            let err = parse_request(body.as_bytes()).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidRequest(_)), "{body}");
            assert_eq!(
                err.into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "{body}"
            );
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_request(b"{not json").unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
        assert!(err.to_string().starts_with("Invalid JSON body"));
    }

    #[test]
    fn test_parse_defaults_args_to_object() {
        let inv = parse_request(br#"{"tool": "heartbeat"}"#).unwrap();
        assert_eq!(inv.tool, "heartbeat");
        assert_eq!(inv.args, json!({}));
    }
}
