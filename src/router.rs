//! 路由器：工具名 -> 远端代理 / 本地工具 / 未找到
//!
//! 顺序：先查注册表快照（最长前缀优先，远端优先于同名本地工具），再精确匹配本地工具，都不命中则 UnknownTool。
//! 每次 dispatch 输出一条结构化审计日志（JSON）。

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::error::GatewayError;
use crate::proxy::{ProxyClient, ToolInvocation};
use crate::registry::{Registry, ServiceDescriptor};
use crate::tools::{RegisteredTool, ToolRegistry};

/// 解析结果
pub enum Route {
    Remote(ServiceDescriptor),
    Local(RegisteredTool),
}

impl Route {
    pub fn label(&self) -> String {
        match self {
            Route::Remote(s) => format!("remote:{}", s.base_address),
            Route::Local(_) => "local".to_string(),
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Remote(s) => f.debug_tuple("Remote").field(s).finish(),
            Route::Local(t) => f.debug_tuple("Local").field(&t.name()).finish(),
        }
    }
}

pub struct Router {
    registry: Arc<Registry>,
    tools: ToolRegistry,
    proxy: ProxyClient,
}

impl Router {
    pub fn new(registry: Arc<Registry>, tools: ToolRegistry, proxy: ProxyClient) -> Self {
        Self {
            registry,
            tools,
            proxy,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn resolve(&self, tool_name: &str) -> Result<Route, GatewayError> {
        let snapshot = self.registry.snapshot();
        if let Some(service) = snapshot.resolve(tool_name) {
            return Ok(Route::Remote(service.clone()));
        }
        self.tools
            .get(tool_name)
            .map(Route::Local)
            .ok_or_else(|| GatewayError::UnknownTool(tool_name.to_string()))
    }

    /// 解析并执行；结果原样透传
    pub async fn dispatch(&self, invocation: ToolInvocation) -> Result<Value, GatewayError> {
        let start = Instant::now();
        let invocation_id = uuid::Uuid::new_v4().to_string();
        let args_preview = args_preview(&invocation.args);

        let route = self.resolve(&invocation.tool);
        let route_label = route
            .as_ref()
            .map(Route::label)
            .unwrap_or_else(|_| "none".to_string());

        let result = match route {
            Ok(Route::Remote(service)) => self
                .proxy
                .invoke(&service.base_address, &invocation)
                .await
                .map_err(GatewayError::from),
            Ok(Route::Local(tool)) => tool
                .execute_validated(invocation.args)
                .await
                .map_err(GatewayError::from),
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "invocation_id": invocation_id,
            "tool": invocation.tool,
            "route": route_label,
            "ok": result.is_ok(),
            "outcome": outcome,
            "duration_ms": duration_ms,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        result
    }
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
