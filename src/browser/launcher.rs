use async_trait::async_trait;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::DriverError;
use crate::infrastructure::{BrowsingContext, ChromiumPage};

/// 持久化的浏览上下文
///
/// 登录状态保存在 `profile_dir` 下，下次启动时复用
pub struct ChromiumContext {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

/// 启动绑定用户数据目录的浏览器
pub async fn launch_persistent_context(config: &Config) -> Result<ChromiumContext, DriverError> {
    info!("🚀 启动浏览器...");
    debug!(
        "用户数据目录: {}, 无头模式: {}",
        config.profile_dir.display(),
        config.headless
    );

    let mut builder = BrowserConfig::builder()
        .user_data_dir(&config.profile_dir)
        .window_size(config.viewport_width, config.viewport_height)
        .viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            ..Default::default()
        })
        .args(vec!["--no-first-run", "--no-default-browser-check"]);

    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        // 首次运行需要手动登录
        builder.with_head()
    };

    if let Some(executable) = &config.chrome_executable {
        builder = builder.chrome_executable(executable);
    }

    let browser_config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        DriverError::Launch(e)
    })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        DriverError::Launch(e.to_string())
    })?;

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    info!("✓ 浏览器已启动");
    Ok(ChromiumContext {
        browser,
        handler_task,
    })
}

impl ChromiumContext {
    /// 关闭浏览器并等待事件循环退出
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("等待浏览器进程退出失败: {}", e);
        }
        let _ = self.handler_task.await;
        debug!("浏览器已关闭");
    }
}

#[async_trait]
impl BrowsingContext for ChromiumContext {
    type Page = ChromiumPage;

    async fn new_page(&self) -> Result<ChromiumPage, DriverError> {
        let page = self.browser.new_page("about:blank").await.map_err(|e| {
            error!("创建新页面失败: {}", e);
            e
        })?;
        Ok(ChromiumPage::new(page))
    }
}
