pub mod filesystem;
pub mod heartbeat;
pub mod registry;
pub mod schema;
pub mod shell;

#[cfg(feature = "browser")]
pub mod browser;

use std::path::PathBuf;

pub use filesystem::{ListFilesTool, ReadFileTool, WorkspaceFs, WriteFileTool};
pub use heartbeat::{HeartbeatTool, HEARTBEAT_TOOL};
pub use registry::{RegisteredTool, Tool, ToolRegistry};
pub use shell::ShellTool;

#[cfg(feature = "browser")]
pub use browser::BrowserTool;

use crate::config::ToolsSection;
use crate::error::SetupError;

/// 注册全部内部工具；相对路径基准取 workspace_root，未配置时为当前目录
pub fn builtin_tools(cfg: &ToolsSection) -> Result<ToolRegistry, SetupError> {
    let root = cfg
        .workspace_root
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let fs = WorkspaceFs::new(root);

    let mut registry = ToolRegistry::new();
    registry.register(ReadFileTool::new(fs.clone()))?;
    registry.register(WriteFileTool::new(fs.clone()))?;
    registry.register(ListFilesTool::new(fs))?;
    registry.register(ShellTool)?;
    registry.register(HeartbeatTool)?;

    #[cfg(feature = "browser")]
    {
        registry.register(BrowserTool::new(
            cfg.navigation_timeout_secs,
            cfg.max_content_chars,
        ))?;
        registry.register_alias("browseWeb", "browse_web");
    }

    Ok(registry)
}
