//! Heartbeat 工具：空操作，供其他网关探测本服务是否存活

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;
use crate::tools::Tool;

pub const HEARTBEAT_TOOL: &str = "heartbeat";

pub struct HeartbeatTool;

#[async_trait]
impl Tool for HeartbeatTool {
    fn name(&self) -> &str {
        HEARTBEAT_TOOL
    }

    fn description(&self) -> &str {
        "No-op liveness check. Args: {}"
    }

    async fn execute(&self, _args: Value) -> Result<Value, ToolError> {
        Ok(serde_json::json!({ "status": "ok" }))
    }
}
