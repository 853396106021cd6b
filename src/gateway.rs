//! 组件装配：注册表、内部工具、代理客户端、路由器，以及可选的发现服务
//!
//! discovery.enabled = false 时退化为静态模式：注册表在启动时由 static_services 构建，之后不再变化。

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::discovery::{static_snapshot, DiscoveryService};
use crate::error::SetupError;
use crate::proxy::ProxyClient;
use crate::registry::Registry;
use crate::router::Router;
use crate::server::GatewayState;
use crate::tools::builtin_tools;

pub struct GatewayComponents {
    pub registry: Arc<Registry>,
    pub state: Arc<GatewayState>,
    /// 静态模式下为 None
    pub discovery: Option<DiscoveryService>,
}

pub fn create_gateway_components(cfg: &AppConfig) -> Result<GatewayComponents, SetupError> {
    let (registry, discovery) = if cfg.discovery.enabled {
        let registry = Arc::new(Registry::new());
        let discovery = DiscoveryService::from_config(&cfg.discovery, Arc::clone(&registry))?;
        (registry, Some(discovery))
    } else {
        let snapshot = static_snapshot(&cfg.discovery.static_services);
        tracing::info!(services = ?snapshot.addresses(), "static service registry");
        (Arc::new(Registry::with_snapshot(snapshot)), None)
    };

    let proxy = ProxyClient::new(Duration::from_secs(cfg.proxy.request_timeout_secs))?;
    let router = Router::new(Arc::clone(&registry), builtin_tools(&cfg.tools)?, proxy);

    Ok(GatewayComponents {
        registry,
        state: Arc::new(GatewayState { router }),
        discovery,
    })
}
