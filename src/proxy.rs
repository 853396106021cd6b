//! 代理客户端：把工具调用转发到兄弟服务的 `/execute-tool`
//!
//! 非 2xx 视为远端应用错误，优先解析响应体中的 `{ "error": ... }`，否则回退为状态描述；
//! 连接失败、超时、响应体不是合法 JSON 归为 Transport。两者都只以一条消息返回给调用方。

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProxyError, SetupError};

/// 工具调用固定子路径（下游协议与本网关一致）
pub const EXECUTE_TOOL_PATH: &str = "/execute-tool";

/// 一次工具调用
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInvocation {
    pub tool: String,
    #[serde(default = "empty_args")]
    pub args: Value,
}

fn empty_args() -> Value {
    Value::Object(serde_json::Map::new())
}

impl ToolInvocation {
    /// null 参数规范化为空对象，下游总是收到 object
    pub fn new(tool: impl Into<String>, args: Value) -> Self {
        Self {
            tool: tool.into(),
            args: if args.is_null() { empty_args() } else { args },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SuccessBody {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `<base>/execute-tool`，容忍 base 末尾的斜杠
pub fn execute_url(base_address: &str) -> String {
    format!("{}{}", base_address.trim_end_matches('/'), EXECUTE_TOOL_PATH)
}

#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
}

impl ProxyClient {
    pub fn new(request_timeout: Duration) -> Result<Self, SetupError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }

    /// 转发并返回远端 result（原样透传）
    pub async fn invoke(
        &self,
        base_address: &str,
        invocation: &ToolInvocation,
    ) -> Result<Value, ProxyError> {
        let url = execute_url(base_address);
        tracing::debug!(url = %url, tool = %invocation.tool, "proxy tool call");

        let resp = self
            .client
            .post(&url)
            .json(invocation)
            .send()
            .await
            .map_err(|e| ProxyError::Transport(format!("Request to {} failed: {}", url, e)))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ProxyError::Transport(format!("Read body from {} failed: {}", url, e)))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("Remote service responded with {}", status));
            return Err(ProxyError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SuccessBody = serde_json::from_slice(&body).map_err(|e| {
            ProxyError::Transport(format!("Malformed response from {}: {}", url, e))
        })?;
        Ok(parsed.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_url() {
        assert_eq!(
            execute_url("http://localhost:3001"),
            "http://localhost:3001/execute-tool"
        );
        assert_eq!(
            execute_url("http://localhost:3001/"),
            "http://localhost:3001/execute-tool"
        );
    }

    #[test]
    fn test_invocation_wire_shape() {
        let inv = ToolInvocation::new("git_status", serde_json::json!({"repo": "."}));
        let v = serde_json::to_value(&inv).unwrap();
        assert_eq!(v, serde_json::json!({"tool": "git_status", "args": {"repo": "."}}));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // 端口 1 上通常没有服务
        let client = ProxyClient::new(Duration::from_secs(2)).unwrap();
        let err = client
            .invoke("http://127.0.0.1:1", &ToolInvocation::new("git_status", Value::Null))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Transport(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_request_timeout_applies() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = ProxyClient::new(Duration::from_millis(200)).unwrap();
        let err = tokio::time::timeout(
            Duration::from_secs(3),
            client.invoke(&addr, &ToolInvocation::new("git_status", Value::Null)),
        )
        .await
        .unwrap()
        .unwrap_err();
        assert!(matches!(err, ProxyError::Transport(_)), "{err:?}");
    }
}
