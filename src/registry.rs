//! 服务注册表：前缀 -> 兄弟服务地址
//!
//! RegistrySnapshot 构建后不可变，并预先算好路由表（按前缀长度降序、同长按字典序）；
//! Registry 只持有 `Arc<RegistrySnapshot>`，更新即整体替换引用，读者要么看到旧快照、要么看到新快照。

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// 一个已发现的兄弟服务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub prefix: String,
    pub base_address: String,
}

impl ServiceDescriptor {
    pub fn new(prefix: impl Into<String>, base_address: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            base_address: base_address.into(),
        }
    }
}

/// 不可变快照
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    services: BTreeMap<String, ServiceDescriptor>,
    /// 匹配顺序：最长前缀优先，同长按字典序
    routes: Vec<ServiceDescriptor>,
}

impl RegistrySnapshot {
    /// 同一前缀出现多次时后者覆盖前者
    pub fn from_services(services: impl IntoIterator<Item = ServiceDescriptor>) -> Self {
        let services: BTreeMap<String, ServiceDescriptor> = services
            .into_iter()
            .map(|s| (s.prefix.clone(), s))
            .collect();
        let mut routes: Vec<ServiceDescriptor> = services.values().cloned().collect();
        routes.sort_by(|a, b| {
            b.prefix
                .len()
                .cmp(&a.prefix.len())
                .then_with(|| a.prefix.cmp(&b.prefix))
        });
        Self { services, routes }
    }

    /// 找到第一个（即最长的）作为 tool_name 字面前缀的服务
    pub fn resolve(&self, tool_name: &str) -> Option<&ServiceDescriptor> {
        self.routes
            .iter()
            .find(|s| tool_name.starts_with(s.prefix.as_str()))
    }

    pub fn get(&self, prefix: &str) -> Option<&ServiceDescriptor> {
        self.services.get(prefix)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// 前缀 -> 地址，用于 GET /discovery
    pub fn addresses(&self) -> BTreeMap<String, String> {
        self.services
            .iter()
            .map(|(prefix, s)| (prefix.clone(), s.base_address.clone()))
            .collect()
    }
}

/// 注册表：持有当前快照，只允许整体替换
#[derive(Debug, Default)]
pub struct Registry {
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// 当前快照（锁只在克隆 Arc 期间持有）
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// 整体替换，返回旧快照
    pub fn replace(&self, snapshot: RegistrySnapshot) -> Arc<RegistrySnapshot> {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }
}
