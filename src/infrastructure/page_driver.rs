//! 页面驱动 - 基础设施层
//!
//! 持有标签页资源，只暴露"导航 / 等待 / 探测 / 截图 / 关闭"这些能力。
//! 会话管理和截图服务只依赖这里的 trait，不直接接触 chromiumoxide。

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, NavigateParams};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::error::DriverError;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 单个标签页的能力
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到 `url`，DOM 构建完成即返回（不等图片等资源）
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError>;

    /// 重新加载当前页面，DOM 构建完成即返回
    async fn reload(&self, timeout: Duration) -> Result<(), DriverError>;

    /// 当前地址的 pathname
    async fn current_path(&self) -> Result<String, DriverError>;

    /// 等待任意一个选择器对应的元素可见
    ///
    /// 超时返回 `Ok(false)`，不算错误
    async fn wait_for_any(&self, selectors: &[&str], timeout: Duration)
        -> Result<bool, DriverError>;

    /// 统计匹配选择器的元素数量
    async fn count_elements(&self, selector: &str) -> Result<usize, DriverError>;

    /// 整页截图，返回 PNG 字节
    async fn screenshot_full_page(&self) -> Result<Vec<u8>, DriverError>;

    /// 关闭标签页
    async fn close(&self) -> Result<(), DriverError>;
}

/// 共享的浏览上下文，每次截图从这里开一个新标签页
#[async_trait]
pub trait BrowsingContext: Send + Sync {
    type Page: PageDriver;

    async fn new_page(&self) -> Result<Self::Page, DriverError>;
}

/// chromiumoxide 标签页
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, js_code: String) -> Result<T, DriverError> {
        let result = self.page.evaluate(js_code).await?;
        Ok(result.into_value()?)
    }

    /// 轮询 readyState，直到新文档离开 loading 状态
    ///
    /// 不会自己结束，调用方负责加超时
    async fn wait_dom_ready(&self) {
        let js = "document.readyState !== 'loading' && location.href !== 'about:blank'";
        poll_until(|| self.eval::<bool>(js.to_string())).await
    }
}

/// 反复执行 `check` 直到返回 `true`
///
/// 导航过程中执行上下文会被替换，这时的求值错误只记录后重试
async fn poll_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, DriverError>>,
{
    loop {
        match check().await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => debug!("页面求值失败，稍后重试: {}", e),
        }
        sleep(POLL_INTERVAL).await;
    }
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn goto(&self, url: &str, limit: Duration) -> Result<(), DriverError> {
        debug!("导航到: {}", url);
        let navigate = async {
            let response = self.page.execute(NavigateParams::new(url)).await?;
            if let Some(reason) = response.result.error_text.clone() {
                return Err(DriverError::NavigationFailed {
                    url: url.to_string(),
                    reason,
                });
            }
            self.wait_dom_ready().await;
            Ok::<_, DriverError>(())
        };

        timeout(limit, navigate)
            .await
            .map_err(|_| DriverError::timeout(format!("导航到 {}", url), limit))?
    }

    async fn reload(&self, limit: Duration) -> Result<(), DriverError> {
        let reload = async {
            self.page.reload().await?;
            self.wait_dom_ready().await;
            Ok::<_, DriverError>(())
        };

        timeout(limit, reload)
            .await
            .map_err(|_| DriverError::timeout("重新加载页面", limit))?
    }

    async fn current_path(&self) -> Result<String, DriverError> {
        self.eval("window.location.pathname".to_string()).await
    }

    async fn wait_for_any(&self, selectors: &[&str], limit: Duration) -> Result<bool, DriverError> {
        let js_code = format!(
            r#"
            (() => {{
                const selectors = {};
                return selectors.some((s) => {{
                    const el = document.querySelector(s);
                    if (!el) return false;
                    const rect = el.getBoundingClientRect();
                    return rect.width > 0 || rect.height > 0;
                }});
            }})()
            "#,
            serde_json::to_string(selectors)?
        );

        let poll = poll_until(|| self.eval::<bool>(js_code.clone()));
        Ok(timeout(limit, poll).await.is_ok())
    }

    async fn count_elements(&self, selector: &str) -> Result<usize, DriverError> {
        let js_code = format!(
            "document.querySelectorAll({}).length",
            serde_json::to_string(selector)?
        );
        self.eval(js_code).await
    }

    async fn screenshot_full_page(&self) -> Result<Vec<u8>, DriverError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        Ok(self.page.screenshot(params).await?)
    }

    async fn close(&self) -> Result<(), DriverError> {
        // Page 内部是 Arc，clone 后关闭的是同一个标签页
        self.page.clone().close().await?;
        Ok(())
    }
}
