//! 本地工具注册表
//!
//! 所有内部工具实现 Tool trait（name / description / parameters_schema / execute），由 ToolRegistry 按名注册与查找；
//! 注册时编译参数 schema，执行前先校验 args，不合法直接返回 InvalidArgs，不进入具体 I/O。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::{SetupError, ToolError};
use crate::tools::schema::{check_args, compile_schema};

/// 工具 trait：名称、描述、参数 schema、异步执行（args 为 JSON，结果对网关不透明）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（请求体中的 "tool" 字段）
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 参数 JSON Schema（Draft 7）；注册时编译，执行前整体校验
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError>;
}

/// 已注册的工具及其编译好的参数校验器
#[derive(Clone)]
pub struct RegisteredTool {
    tool: Arc<dyn Tool>,
    validator: Arc<JSONSchema>,
}

impl RegisteredTool {
    pub fn name(&self) -> &str {
        self.tool.name()
    }

    /// 校验参数后执行；null 视为空对象
    pub async fn execute_validated(&self, args: Value) -> Result<Value, ToolError> {
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };
        check_args(&self.validator, &args)?;
        self.tool.execute(args).await
    }
}

/// 工具注册表：按名称存储，支持别名
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
    aliases: HashMap<String, String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// schema 无法编译时拒绝注册
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), SetupError> {
        let name = tool.name().to_string();
        let validator = compile_schema(&name, &tool.parameters_schema())?;
        self.tools.insert(
            name,
            RegisteredTool {
                tool: Arc::new(tool),
                validator: Arc::new(validator),
            },
        );
        Ok(())
    }

    /// 为已注册工具增加一个可精确匹配的别名
    pub fn register_alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    pub fn get(&self, name: &str) -> Option<RegisteredTool> {
        let name = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// 供 GET /tools 输出：name、description、parameters
    pub fn schemas(&self) -> Vec<Value> {
        self.tool_names()
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|registered| {
                let tool = &registered.tool;
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema()
                })
            })
            .collect()
    }
}
