//! 网关配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `TOOLGATE__*` 覆盖（双下划线表示嵌套，如 `TOOLGATE__SERVER__BIND=0.0.0.0:3000`）。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// 配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub discovery: DiscoverySection,
    #[serde(default)]
    pub tools: ToolsSection,
    #[serde(default)]
    pub proxy: ProxySection,
}

/// [server] 段：HTTP 监听地址
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// 候选兄弟服务：name 决定前缀（`<name>_`），与列表位置绑定，而非服务自报的身份
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CandidateEntry {
    pub name: String,
    pub address: String,
}

/// [discovery] 段：探测开关、周期、超时、候选列表与静态表
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySection {
    /// false 时不启动后台探测，注册表在启动时由 static_services 一次性构建
    #[serde(default = "default_discovery_enabled")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_candidates")]
    pub candidates: Vec<CandidateEntry>,
    /// 前缀 -> 地址（静态模式）
    #[serde(default)]
    pub static_services: BTreeMap<String, String>,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            enabled: default_discovery_enabled(),
            interval_secs: default_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
            candidates: default_candidates(),
            static_services: BTreeMap::new(),
        }
    }
}

impl DiscoverySection {
    /// 周期与探测超时都必须大于零（tokio interval 不接受零周期）
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "discovery.interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.probe_timeout_ms == 0 {
            return Err(config::ConfigError::Message(
                "discovery.probe_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_discovery_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    60
}

fn default_probe_timeout_ms() -> u64 {
    1000
}

fn default_candidates() -> Vec<CandidateEntry> {
    [
        ("git", "http://localhost:3001"),
        ("docker", "http://localhost:3002"),
        ("database", "http://localhost:3003"),
        ("search", "http://localhost:3004"),
    ]
    .into_iter()
    .map(|(name, address)| CandidateEntry {
        name: name.to_string(),
        address: address.to_string(),
    })
    .collect()
}

/// [tools] 段：文件工具根目录、浏览器导航超时与正文上限
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// 相对路径的解析基准，未设置时用进程当前目录
    pub workspace_root: Option<PathBuf>,
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            workspace_root: None,
            navigation_timeout_secs: default_navigation_timeout_secs(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_max_content_chars() -> usize {
    15_000
}

/// [proxy] 段：转发请求超时
#[derive(Debug, Clone, Deserialize)]
pub struct ProxySection {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ProxySection {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// 网关配置的来源按优先级从低到高叠加：
/// 内置默认值 < 第一个存在的 default.toml（config/、../config/、当前目录）< 显式传入的文件 < `TOOLGATE__*` 环境变量。
/// 合并后校验 discovery 的时间参数，非法值作为配置错误返回。
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let base = ["config/default", "../config/default", "default"]
        .into_iter()
        .find(|name| Path::new(&format!("{}.toml", name)).exists());

    let mut builder = config::Config::builder();
    if let Some(name) = base {
        builder = builder.add_source(config::File::with_name(name).required(false));
    }
    if let Some(path) = config_path.filter(|p| p.exists()) {
        builder = builder.add_source(config::File::from(path).required(false));
    }
    let env = config::Environment::with_prefix("TOOLGATE")
        .separator("__")
        .try_parsing(true);

    let cfg: AppConfig = builder.add_source(env).build()?.try_deserialize()?;
    cfg.discovery.validate()?;
    Ok(cfg)
}
