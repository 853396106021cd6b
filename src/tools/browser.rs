//! browse_web 工具：Headless Chrome 打开页面并提取可见正文
//!
//! 需启用 feature "browser" 且系统已安装 Chrome/Chromium。
//! 每次调用独占一个浏览器进程（不复用、不池化），由 ScopedBrowser 在作用域结束时终止，
//! 导航失败、提取失败等所有返回路径都会经过 Drop。
//! 只等待新 document 的 DOM 就绪（readyState != loading），不等网络空闲；正文按字符硬截断。

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::Serialize;
use serde_json::Value;

use crate::error::ToolError;
use crate::tools::schema::str_arg;
use crate::tools::Tool;

/// 移除非正文元素后读取 body 的可见文本
const EXTRACT_SCRIPT: &str = r#"
(() => {
    const body = document.body;
    if (!body) { return ''; }
    body.querySelectorAll('script, style, nav, footer, iframe, noscript').forEach(el => el.remove());
    return body.innerText || '';
})()
"#;

/// 挂在导航前 document 上的标记；导航提交后新 document 上不存在
const STALE_MARKER: &str = "__toolgateStale";

fn mark_stale_script() -> String {
    format!("document.{} = true", STALE_MARKER)
}

/// 旧 document 仍在或新 document 还在 loading 时为 false
fn dom_ready_script() -> String {
    format!(
        "document.readyState !== 'loading' && document.{} !== true",
        STALE_MARKER
    )
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 提取结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageText {
    pub title: String,
    pub content: String,
}

/// 按字符（而非字节、非按词）截断
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// 单次调用的浏览器进程；Drop 时终止
struct ScopedBrowser {
    browser: Option<Browser>,
}

impl ScopedBrowser {
    fn launch() -> Result<Self, ToolError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|e| ToolError::Browser(format!("Invalid launch options: {}", e)))?;
        let browser = Browser::new(options).map_err(|e| {
            ToolError::Browser(format!(
                "Chrome launch failed: {}. Install Chrome/Chromium.",
                e
            ))
        })?;
        tracing::debug!("browser process launched");
        Ok(Self {
            browser: Some(browser),
        })
    }

    fn new_tab(&self) -> Result<Arc<Tab>, ToolError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ToolError::Browser("Browser already closed".to_string()))?;
        browser
            .new_tab()
            .map_err(|e| ToolError::Browser(format!("Browser tab failed: {}", e)))
    }
}

impl Drop for ScopedBrowser {
    fn drop(&mut self) {
        // Browser 的 Drop 会杀掉 Chrome 子进程
        if let Some(browser) = self.browser.take() {
            drop(browser);
            tracing::debug!("browser process terminated");
        }
    }
}

fn wait_for_dom_ready(tab: &Tab, deadline: Instant, timeout: Duration) -> Result<(), ToolError> {
    let script = dom_ready_script();
    loop {
        let ready = tab
            .evaluate(&script, false)
            .ok()
            .and_then(|obj| obj.value)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if ready {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ToolError::Browser(format!(
                "Navigation timeout of {} ms exceeded",
                timeout.as_millis()
            )));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// 阻塞执行：启动、导航、提取、截断
fn browse_blocking(url: &str, timeout: Duration, max_chars: usize) -> Result<PageText, ToolError> {
    let browser = ScopedBrowser::launch()?;
    let tab = browser.new_tab()?;
    tab.set_default_timeout(timeout);

    tab.evaluate(&mark_stale_script(), false)
        .map_err(|e| ToolError::Browser(format!("Prepare tab failed: {}", e)))?;

    let deadline = Instant::now() + timeout;
    tab.navigate_to(url)
        .map_err(|e| ToolError::Browser(format!("Navigate failed: {}", e)))?;
    wait_for_dom_ready(&tab, deadline, timeout)?;

    let title = tab
        .get_title()
        .map_err(|e| ToolError::Browser(format!("Get title failed: {}", e)))?;
    let text = tab
        .evaluate(EXTRACT_SCRIPT, false)
        .map_err(|e| ToolError::Browser(format!("Extract content failed: {}", e)))?
        .value
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    Ok(PageText {
        title,
        content: truncate_chars(&text, max_chars),
    })
}

/// browse_web 工具
pub struct BrowserTool {
    navigation_timeout: Duration,
    max_content_chars: usize,
}

impl BrowserTool {
    pub fn new(navigation_timeout_secs: u64, max_content_chars: usize) -> Self {
        Self {
            navigation_timeout: Duration::from_secs(navigation_timeout_secs),
            max_content_chars,
        }
    }
}

#[async_trait]
impl Tool for BrowserTool {
    fn name(&self) -> &str {
        "browse_web"
    }

    fn description(&self) -> &str {
        "Open a URL in an isolated headless browser and return its title and visible text. Args: {\"url\": \"https://...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "Page URL to open" }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let url = str_arg(&args, "url")?.trim().to_string();
        let timeout = self.navigation_timeout;
        let max_chars = self.max_content_chars;

        tracing::info!(url = %url, "browse_web tool execute");

        let page = tokio::task::spawn_blocking(move || browse_blocking(&url, timeout, max_chars))
            .await
            .map_err(|e| ToolError::Browser(format!("Task join: {}", e)))??;

        serde_json::to_value(page).map_err(|e| ToolError::Browser(e.to_string()))
    }
}
