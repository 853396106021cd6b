//! 服务发现：周期性探测固定候选列表，整体重建注册表
//!
//! 每轮并发向所有候选发送 heartbeat 调用（超时约 1s）：2xx 或 404 视为存活（服务存在，只是可能不认识 heartbeat），
//! 超时、拒绝连接等一律视为不存在并静默丢弃。存活者按 `<name>_` 前缀组成新快照后一次性替换。
//!
//! 已知限制：前缀由候选在静态列表中的位置/配置名决定，而不是服务自报的身份；
//! 两套部署可能把不同的名字绑定到同一个地址。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client, StatusCode};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::{CandidateEntry, DiscoverySection};
use crate::error::SetupError;
use crate::proxy::{execute_url, ToolInvocation};
use crate::registry::{Registry, RegistrySnapshot, ServiceDescriptor};
use crate::tools::HEARTBEAT_TOOL;

/// 探测周期下限；直接用 new 传入零周期时生效
const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// 候选端点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub address: String,
}

impl Candidate {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    pub fn prefix(&self) -> String {
        format!("{}_", self.name)
    }
}

impl From<&CandidateEntry> for Candidate {
    fn from(entry: &CandidateEntry) -> Self {
        Self::new(entry.name.clone(), entry.address.clone())
    }
}

/// 存活探测
#[async_trait]
pub trait Probe: Send + Sync {
    async fn is_alive(&self, address: &str) -> bool;
}

/// 通过 heartbeat 工具调用探测
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// 客户端构建失败直接报错，不退回到无超时的默认客户端
    pub fn new(timeout: Duration) -> Result<Self, SetupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

/// 2xx 或 404 都算存活
pub fn status_means_alive(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::NOT_FOUND
}

#[async_trait]
impl Probe for HttpProbe {
    async fn is_alive(&self, address: &str) -> bool {
        let heartbeat = ToolInvocation::new(HEARTBEAT_TOOL, serde_json::Value::Null);
        match self
            .client
            .post(execute_url(address))
            .json(&heartbeat)
            .send()
            .await
        {
            Ok(resp) => status_means_alive(resp.status()),
            Err(e) => {
                tracing::debug!(address = %address, error = %e, "probe failed");
                false
            }
        }
    }
}

/// 发现服务：注册表的唯一写者
pub struct DiscoveryService {
    candidates: Vec<Candidate>,
    probe: Arc<dyn Probe>,
    registry: Arc<Registry>,
    interval: Duration,
}

impl std::fmt::Debug for DiscoveryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryService")
            .field("candidates", &self.candidates)
            .field("registry", &self.registry)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl DiscoveryService {
    pub fn new(
        candidates: Vec<Candidate>,
        probe: Arc<dyn Probe>,
        registry: Arc<Registry>,
        interval: Duration,
    ) -> Self {
        Self {
            candidates,
            probe,
            registry,
            interval,
        }
    }

    /// 零周期或零超时在这里被拒绝
    pub fn from_config(
        cfg: &DiscoverySection,
        registry: Arc<Registry>,
    ) -> Result<Self, SetupError> {
        cfg.validate()?;
        let probe = HttpProbe::new(Duration::from_millis(cfg.probe_timeout_ms))?;
        Ok(Self::new(
            cfg.candidates.iter().map(Candidate::from).collect(),
            Arc::new(probe),
            registry,
            Duration::from_secs(cfg.interval_secs),
        ))
    }

    /// 执行一轮探测并替换快照，返回新快照
    pub async fn run_cycle(&self) -> Arc<RegistrySnapshot> {
        let probes = self.candidates.iter().map(|c| {
            let probe = Arc::clone(&self.probe);
            async move { (c, probe.is_alive(&c.address).await) }
        });
        let results = join_all(probes).await;

        let alive = results.into_iter().filter_map(|(candidate, alive)| {
            if !alive {
                tracing::debug!(name = %candidate.name, address = %candidate.address, "candidate absent");
            }
            alive.then(|| ServiceDescriptor::new(candidate.prefix(), candidate.address.clone()))
        });
        let next = RegistrySnapshot::from_services(alive);

        let previous = self.registry.replace(next);
        let current = self.registry.snapshot();
        if previous.addresses() != current.addresses() {
            tracing::info!(
                services = ?current.addresses(),
                "discovery registry updated"
            );
        }
        current
    }

    /// 后台循环：启动时立即跑一轮，之后按固定间隔，token 取消后退出
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        if self.interval < MIN_INTERVAL {
            tracing::warn!(
                interval = ?self.interval,
                min = ?MIN_INTERVAL,
                "discovery interval too small, clamped"
            );
        }
        let period = self.interval.max(MIN_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("discovery loop stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.run_cycle().await;
                    }
                }
            }
        })
    }
}

/// 静态模式：前缀 -> 地址表直接作为启动快照
pub fn static_snapshot(services: &BTreeMap<String, String>) -> RegistrySnapshot {
    RegistrySnapshot::from_services(
        services
            .iter()
            .map(|(prefix, address)| ServiceDescriptor::new(prefix.clone(), address.clone())),
    )
}
