//! Toolgate - 工具执行网关
//!
//! 入口：初始化日志、加载配置、启动发现循环与 HTTP 服务，Ctrl+C 优雅退出。
//! 可选环境变量 TOOLGATE_CONFIG 指定额外的配置文件。

use std::path::PathBuf;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use toolgate::config::load_config;
use toolgate::gateway::create_gateway_components;
use toolgate::observability;
use toolgate::server::{create_router, serve};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::var("TOOLGATE_CONFIG").ok().map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;

    let components = create_gateway_components(&cfg).context("Failed to assemble gateway")?;
    let shutdown = CancellationToken::new();

    let discovery_task = components
        .discovery
        .map(|discovery| discovery.spawn(shutdown.clone()));
    if discovery_task.is_none() {
        tracing::info!("discovery disabled, using static registry");
    }

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.server.bind))?;
    tracing::info!("Toolgate listening on http://{}", listener.local_addr()?);

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutting down...");
                signal_token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for Ctrl+C"),
        }
    });

    let app = create_router(components.state);
    serve(listener, app, shutdown.clone())
        .await
        .context("Server error")?;

    shutdown.cancel();
    if let Some(task) = discovery_task {
        let _ = task.await;
    }
    Ok(())
}
