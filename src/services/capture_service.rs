//! PR 截图服务 - 业务能力层
//!
//! 只处理单个 PR：打开标签页 → 导航 → 等待内容 → 检查登录 → 整页截图 → 关闭标签页。
//! 所有失败都收进 [`CaptureResult`]，不向上抛。

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{CaptureError, DriverError};
use crate::infrastructure::{BrowsingContext, PageDriver};
use crate::models::{CaptureResult, WorkItem};

/// 页面内容已渲染的标志（不同版本的 PR 页面布局）
pub const CONTENT_SELECTORS: [&str; 4] = [
    "#partial-discussion-header",
    ".gh-header-title",
    "h1.js-issue-title",
    "[data-hpc]",
];

/// 登录表单
pub const LOGIN_FORM_SELECTOR: &str = r#"input[name="login"]"#;

/// 截图文件路径：`<dir>/pr-<编号>.png`
pub fn screenshot_path(screenshots_dir: &Path, identifier: &str) -> PathBuf {
    screenshots_dir.join(format!("pr-{}.png", identifier))
}

/// PR 截图服务
pub struct CaptureService {
    base_url: String,
    repo: String,
    screenshots_dir: PathBuf,
    navigation_timeout: Duration,
    content_wait: Duration,
    settle_delay: Duration,
}

impl CaptureService {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            repo: config.repo.clone(),
            screenshots_dir: config.screenshots_dir.clone(),
            navigation_timeout: config.navigation_timeout(),
            content_wait: config.content_wait(),
            settle_delay: config.settle_delay(),
        }
    }

    /// PR 页面地址
    pub fn target_url(&self, identifier: &str) -> String {
        format!(
            "{}/{}/pull/{}",
            self.base_url.trim_end_matches('/'),
            self.repo,
            identifier
        )
    }

    /// 截图一个 PR
    ///
    /// 每个 `item` 恰好返回一个结果；打开的标签页在任何情况下都会关闭
    pub async fn capture<C: BrowsingContext>(&self, context: &C, item: &WorkItem) -> CaptureResult {
        let url = self.target_url(&item.identifier);

        let page = match context.new_page().await {
            Ok(page) => page,
            Err(e) => {
                error!("[{}] ✗ 无法打开新标签页: {}", item, e);
                return CaptureResult::failure(
                    item.identifier.clone(),
                    CaptureError::capture_failed(url, e),
                );
            }
        };

        let outcome = self.capture_on_page(&page, &url, item).await;

        if let Err(e) = page.close().await {
            warn!("[{}] 关闭标签页失败: {}", item, e);
        }

        match outcome {
            Ok(image_path) => {
                info!("[{}] ✓ 保存完成: {}", item, image_path.display());
                CaptureResult::success(item.identifier.clone(), image_path)
            }
            Err(e) => {
                error!("[{}] ✗ 错误: {}", item, e);
                CaptureResult::failure(item.identifier.clone(), e)
            }
        }
    }

    async fn capture_on_page<P: PageDriver>(
        &self,
        page: &P,
        url: &str,
        item: &WorkItem,
    ) -> Result<PathBuf, CaptureError> {
        info!("[{}] 访问中: {}", item, url);

        page.goto(url, self.navigation_timeout)
            .await
            .map_err(|e| match e {
                DriverError::Timeout { timeout, .. } => CaptureError::NavigationTimeout {
                    url: url.to_string(),
                    timeout,
                },
                other => CaptureError::capture_failed(url, other),
            })?;

        // 等不到内容也照样截图，只是多给一点时间
        let content_ready = match page.wait_for_any(&CONTENT_SELECTORS, self.content_wait).await {
            Ok(ready) => ready,
            Err(e) => {
                debug!("[{}] 等待内容时出错: {}", item, e);
                false
            }
        };
        if !content_ready {
            warn!(
                "[{}] ⚠ 选择器等待超时，{}秒后截图",
                item,
                self.settle_delay.as_secs()
            );
            sleep(self.settle_delay).await;
        }

        let login_forms = page
            .count_elements(LOGIN_FORM_SELECTOR)
            .await
            .map_err(|e| CaptureError::capture_failed(url, e))?;
        if login_forms > 0 {
            return Err(CaptureError::AuthRequiredForItem {
                url: url.to_string(),
            });
        }

        let png = page
            .screenshot_full_page()
            .await
            .map_err(|e| CaptureError::capture_failed(url, e))?;

        let image_path = screenshot_path(&self.screenshots_dir, &item.identifier);
        tokio::fs::write(&image_path, &png)
            .await
            .map_err(|e| CaptureError::capture_failed(url, e))?;

        Ok(image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_and_path() {
        let config = Config {
            base_url: "https://github.com/".to_string(),
            repo: "octo/widgets".to_string(),
            screenshots_dir: PathBuf::from("shots"),
            ..Config::default()
        };
        let service = CaptureService::new(&config);

        assert_eq!(
            service.target_url("42"),
            "https://github.com/octo/widgets/pull/42"
        );
        assert_eq!(
            screenshot_path(&config.screenshots_dir, "42"),
            PathBuf::from("shots").join("pr-42.png")
        );
    }
}
