//! 文件系统工具：readFile / writeFile / listFiles
//!
//! WorkspaceFs 绑定一个基准目录：绝对路径原样使用，相对路径拼接到基准目录下。
//! 网关不做调用方鉴权，因此这里也不做沙箱限制。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;
use crate::tools::schema::str_arg;
use crate::tools::Tool;

/// 路径解析 + 异步文件操作
#[derive(Debug, Clone)]
pub struct WorkspaceFs {
    root_dir: PathBuf,
}

impl WorkspaceFs {
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root_dir.join(p)
        }
    }

    pub async fn read_file(&self, path: &str) -> Result<String, ToolError> {
        let resolved = self.resolve(path);
        tokio::fs::read_to_string(&resolved).await.map_err(|e| {
            ToolError::Io(format!("Failed to read {}: {}", resolved.display(), e))
        })
    }

    /// 写入前创建所有缺失的父目录
    pub async fn write_file(&self, path: &str, content: &str) -> Result<PathBuf, ToolError> {
        let resolved = self.resolve(path);
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ToolError::Io(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        tokio::fs::write(&resolved, content).await.map_err(|e| {
            ToolError::Io(format!("Failed to write {}: {}", resolved.display(), e))
        })?;
        Ok(resolved)
    }

    /// 目录项名称，按字典序排列
    pub async fn list_dir(&self, path: &str) -> Result<Vec<String>, ToolError> {
        let resolved = self.resolve(path);
        let list_err =
            |e: std::io::Error| ToolError::Io(format!("Failed to list {}: {}", resolved.display(), e));
        let mut dir = tokio::fs::read_dir(&resolved).await.map_err(list_err)?;
        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(list_err)? {
            entries.push(entry.file_name().to_string_lossy().to_string());
        }
        entries.sort();
        Ok(entries)
    }
}

fn path_schema(extra: Option<(&str, &str)>) -> Value {
    let mut properties = serde_json::json!({
        "path": { "type": "string", "description": "Absolute path, or relative to the workspace root" }
    });
    let mut required = vec!["path"];
    if let Some((key, desc)) = extra {
        properties[key] = serde_json::json!({ "type": "string", "description": desc });
        required.push(key);
    }
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// readFile：读取整个文本文件
pub struct ReadFileTool {
    fs: WorkspaceFs,
}

impl ReadFileTool {
    pub fn new(fs: WorkspaceFs) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "readFile"
    }

    fn description(&self) -> &str {
        "Read the full text of a file. Args: {\"path\": \"file path\"}"
    }

    fn parameters_schema(&self) -> Value {
        path_schema(None)
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let path = str_arg(&args, "path")?;
        tracing::info!(path = %path, "readFile tool execute");
        self.fs.read_file(path).await.map(Value::String)
    }
}

/// writeFile：写文件，自动创建父目录
pub struct WriteFileTool {
    fs: WorkspaceFs,
}

impl WriteFileTool {
    pub fn new(fs: WorkspaceFs) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "writeFile"
    }

    fn description(&self) -> &str {
        "Write text to a file, creating parent directories. Args: {\"path\": \"file path\", \"content\": \"text\"}"
    }

    fn parameters_schema(&self) -> Value {
        path_schema(Some(("content", "Text to write")))
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let path = str_arg(&args, "path")?;
        let content = str_arg(&args, "content")?;
        tracing::info!(path = %path, bytes = content.len(), "writeFile tool execute");
        let written = self.fs.write_file(path, content).await?;
        Ok(Value::String(format!(
            "File written successfully to {}",
            written.display()
        )))
    }
}

/// listFiles：列出目录项
pub struct ListFilesTool {
    fs: WorkspaceFs,
}

impl ListFilesTool {
    pub fn new(fs: WorkspaceFs) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "listFiles"
    }

    fn description(&self) -> &str {
        "List entry names of a directory. Args: {\"path\": \"directory path\"}"
    }

    fn parameters_schema(&self) -> Value {
        path_schema(None)
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let path = str_arg(&args, "path")?;
        tracing::info!(path = %path, "listFiles tool execute");
        let entries = self.fs.list_dir(path).await?;
        Ok(Value::from(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(WorkspaceFs::new(dir.path()));

        let out = tool
            .execute(json!({"path": "a/b/c/note.txt", "content": "hi"}))
            .await
            .unwrap();
        assert!(out.as_str().unwrap().starts_with("File written successfully"));
        let written = std::fs::read_to_string(dir.path().join("a/b/c/note.txt")).unwrap();
        assert_eq!(written, "hi");
    }

    #[tokio::test]
    async fn test_read_absolute_and_relative() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let tool = ReadFileTool::new(WorkspaceFs::new(dir.path()));

        let rel = tool.execute(json!({"path": "a.txt"})).await.unwrap();
        assert_eq!(rel, json!("hello"));

        let abs_path = dir.path().join("a.txt").to_string_lossy().to_string();
        let abs = ReadFileTool::new(WorkspaceFs::new("/nonexistent-root"))
            .execute(json!({ "path": abs_path }))
            .await
            .unwrap();
        assert_eq!(abs, json!("hello"));
    }

    #[tokio::test]
    async fn test_read_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ReadFileTool::new(WorkspaceFs::new(dir.path()));
        let err = tool.execute(json!({"path": "missing.txt"})).await.unwrap_err();
        assert!(matches!(err, ToolError::Io(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_list_sorted_and_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();
        let tool = ListFilesTool::new(WorkspaceFs::new(dir.path()));

        let out = tool.execute(json!({"path": "."})).await.unwrap();
        assert_eq!(out, json!(["a.txt", "b.txt", "c"]));

        let err = tool.execute(json!({"path": "a.txt"})).await.unwrap_err();
        assert!(matches!(err, ToolError::Io(_)), "{err:?}");
    }
}
