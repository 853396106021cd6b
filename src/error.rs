//! 网关错误类型
//!
//! 所有错误在 HTTP 边界上都只表现为一条消息字符串；枚举的区分用于日志与状态码选择。

use thiserror::Error;

/// 本地工具执行失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// args 不满足工具声明的 JSON Schema
    #[error("{0}")]
    InvalidArgs(String),

    /// 文件系统错误
    #[error("{0}")]
    Io(String),

    /// 子进程非零退出或无法启动；消息为捕获的 stderr
    #[error("{0}")]
    Command(String),

    #[error("{0}")]
    Browser(String),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidArgs(_) => "invalid_args",
            ToolError::Io(_) => "io",
            ToolError::Command(_) => "command",
            ToolError::Browser(_) => "browser",
        }
    }
}

/// 转发到兄弟服务失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// 远端返回非 2xx；message 优先取响应体中的 error 字段
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// 连接失败、超时或响应无法解析
    #[error("{0}")]
    Transport(String),
}

/// 网关层错误
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    /// 请求体能解析，但字段形状不对（例如 tool 不是字符串）；返回 500
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Tool '{0}' not discovered or implemented")]
    UnknownTool(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation",
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::UnknownTool(_) => "unknown_tool",
            GatewayError::Tool(e) => e.kind(),
            GatewayError::Proxy(ProxyError::Remote { .. }) => "proxy_remote",
            GatewayError::Proxy(ProxyError::Transport(_)) => "proxy_transport",
        }
    }
}

/// 启动装配失败
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("Invalid parameters schema for tool '{tool}': {message}")]
    ToolSchema { tool: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through_unmodified() {
        let e = GatewayError::from(ToolError::Command("boom: not found".into()));
        assert_eq!(e.to_string(), "boom: not found");
        assert_eq!(e.kind(), "command");

        let e = GatewayError::from(ProxyError::Remote {
            status: 422,
            message: "bad repo".into(),
        });
        assert_eq!(e.to_string(), "bad repo");
        assert_eq!(e.kind(), "proxy_remote");
    }

    #[test]
    fn test_unknown_tool_message() {
        let e = GatewayError::UnknownTool("nope".into());
        assert_eq!(e.to_string(), "Tool 'nope' not discovered or implemented");
    }
}
