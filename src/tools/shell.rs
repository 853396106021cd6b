//! executeShellCommand：通过 sh -c / cmd /C 运行命令直至结束
//!
//! 成功返回 stdout；非零退出或无法启动时，错误消息为捕获的 stderr，stderr 为空则回退为通用失败信息。
//! 不做白名单、不设超时，子进程由 tokio 在 output() 返回时回收。

use std::process::Output;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::error::ToolError;
use crate::tools::schema::str_arg;
use crate::tools::Tool;

pub struct ShellTool;

impl ShellTool {
    fn command(raw: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", raw]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", raw]);
            c
        }
    }

    pub async fn run(raw: &str) -> Result<String, ToolError> {
        let mut cmd = Self::command(raw);
        cmd.kill_on_drop(true);
        let output = cmd
            .output()
            .await
            .map_err(|e| ToolError::Command(format!("Command failed to start: {}: {}", raw, e)))?;
        interpret_output(raw, output)
    }
}

fn interpret_output(raw: &str, output: Output) -> Result<String, ToolError> {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if output.status.success() {
        return Ok(stdout);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        Err(ToolError::Command(format!(
            "Command failed (exit {}): {}",
            code, raw
        )))
    } else {
        Err(ToolError::Command(stderr.to_string()))
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "executeShellCommand"
    }

    fn description(&self) -> &str {
        "Run a shell command to completion and return its stdout. Args: {\"command\": \"...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let command = str_arg(&args, "command")?;
        tracing::info!(command = %command, "shell tool execute");
        Self::run(command).await.map(Value::String)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_success_returns_stdout() {
        let out = ShellTool.execute(json!({"command": "echo hello"})).await.unwrap();
        assert_eq!(out, json!("hello\n"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_surfaces_stderr() {
        let err = ShellTool
            .execute(json!({"command": "echo 'no such branch' >&2; exit 3"}))
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::Command("no such branch\n".into()));
    }

    #[tokio::test]
    async fn test_stderr_whitespace_kept() {
        let err = ShellTool
            .execute(json!({"command": "printf '  warn: x\\n\\n' >&2; exit 2"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "  warn: x\n\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_stderr_falls_back() {
        let err = ShellTool.execute(json!({"command": "exit 1"})).await.unwrap_err();
        assert_eq!(err.to_string(), "Command failed (exit 1): exit 1");
    }

    #[tokio::test]
    async fn test_missing_command_argument() {
        let err = ShellTool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs(_)));
    }
}
