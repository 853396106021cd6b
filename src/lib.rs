//! Toolgate - 工具执行网关
//!
//! 模块划分：
//! - **config**: 配置加载（TOML + 环境变量）
//! - **discovery**: 后台探测兄弟服务，整体替换注册表
//! - **error**: 错误类型（校验 / 未知工具 / 本地工具 / 代理）
//! - **gateway**: 组件装配（发现模式 / 静态模式）
//! - **observability**: tracing 初始化
//! - **proxy**: 转发工具调用到兄弟服务
//! - **registry**: 前缀 -> 服务地址的不可变快照
//! - **router**: 工具名解析（远端前缀优先，其次本地工具）
//! - **server**: axum HTTP 接口
//! - **tools**: 内部工具（readFile、writeFile、listFiles、executeShellCommand、browse_web、heartbeat）

pub mod config;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod observability;
pub mod proxy;
pub mod registry;
pub mod router;
pub mod server;
pub mod tools;

pub use error::{GatewayError, ProxyError, SetupError, ToolError};
pub use proxy::ToolInvocation;
