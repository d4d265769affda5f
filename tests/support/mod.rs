//! 测试用的假浏览器：按 PR 编号预设每个页面的表现

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use pr_snapshot::error::DriverError;
use pr_snapshot::services::LoginPrompt;
use pr_snapshot::{BrowsingContext, Config, PageDriver};

/// 某个 PR 页面的表现
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBehavior {
    Ok,
    NavTimeout,
    LoginForm,
    ContentMissing,
    ScreenshotError,
}

#[derive(Default)]
struct Shared {
    behaviors: HashMap<String, PageBehavior>,
    /// 会话检查时依次返回的 pathname，用完后一直返回最后一个
    paths: Mutex<VecDeque<String>>,
    visited: Mutex<Vec<String>>,
    /// 任何地址都导航失败
    fail_goto: bool,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct FakeContext {
    shared: Arc<Shared>,
}

impl FakeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behaviors(behaviors: &[(&str, PageBehavior)]) -> Self {
        Self::build(behaviors, &["/"])
    }

    pub fn with_paths(paths: &[&str]) -> Self {
        Self::build(&[], paths)
    }

    fn build(behaviors: &[(&str, PageBehavior)], paths: &[&str]) -> Self {
        let shared = Shared {
            behaviors: behaviors
                .iter()
                .map(|(id, behavior)| (id.to_string(), *behavior))
                .collect(),
            paths: Mutex::new(paths.iter().map(|p| p.to_string()).collect()),
            ..Default::default()
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// 所有导航都返回 `NavigationFailed`
    pub fn unreachable() -> Self {
        Self {
            shared: Arc::new(Shared {
                fail_goto: true,
                ..Default::default()
            }),
        }
    }

    pub fn pages_opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.shared.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowsingContext for FakeContext {
    type Page = FakePage;

    async fn new_page(&self) -> Result<FakePage, DriverError> {
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakePage {
            shared: Arc::clone(&self.shared),
            url: Mutex::new(None),
        })
    }
}

pub struct FakePage {
    shared: Arc<Shared>,
    url: Mutex<Option<String>>,
}

impl FakePage {
    fn behavior(&self) -> PageBehavior {
        let url = self.url.lock().unwrap().clone().unwrap_or_default();
        url.rsplit_once("/pull/")
            .and_then(|(_, id)| self.shared.behaviors.get(id).copied())
            .unwrap_or(PageBehavior::Ok)
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError> {
        self.shared.visited.lock().unwrap().push(url.to_string());
        *self.url.lock().unwrap() = Some(url.to_string());
        if self.shared.fail_goto {
            return Err(DriverError::NavigationFailed {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        if self.behavior() == PageBehavior::NavTimeout {
            return Err(DriverError::timeout(format!("导航到 {}", url), timeout));
        }
        Ok(())
    }

    async fn reload(&self, _timeout: Duration) -> Result<(), DriverError> {
        Ok(())
    }

    async fn current_path(&self) -> Result<String, DriverError> {
        let mut paths = self.shared.paths.lock().unwrap();
        let path = if paths.len() > 1 {
            paths.pop_front()
        } else {
            paths.front().cloned()
        };
        Ok(path.unwrap_or_else(|| "/".to_string()))
    }

    async fn wait_for_any(
        &self,
        _selectors: &[&str],
        _timeout: Duration,
    ) -> Result<bool, DriverError> {
        Ok(self.behavior() != PageBehavior::ContentMissing)
    }

    async fn count_elements(&self, _selector: &str) -> Result<usize, DriverError> {
        Ok(usize::from(self.behavior() == PageBehavior::LoginForm))
    }

    async fn screenshot_full_page(&self) -> Result<Vec<u8>, DriverError> {
        if self.behavior() == PageBehavior::ScreenshotError {
            return Err(DriverError::Launch("截图失败".to_string()));
        }
        Ok(png_bytes(1200, 300))
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.shared.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 记录被调用次数的人工登录确认
#[derive(Default)]
pub struct FakePrompt {
    calls: AtomicUsize,
}

impl FakePrompt {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoginPrompt for FakePrompt {
    async fn wait_for_login(&self) -> std::io::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([240, 240, 240])));
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// 指向临时目录、不做任何等待的配置
pub fn test_config(root: &Path) -> Config {
    Config {
        repo: "octo/widgets".to_string(),
        base_url: "https://github.test".to_string(),
        screenshots_dir: root.join("screenshots"),
        pdfs_dir: root.join("pdfs"),
        profile_dir: root.join("profile"),
        content_wait_secs: 0,
        settle_delay_secs: 0,
        item_delay_ms: 0,
        login_check_timeout_secs: 1,
        navigation_timeout_secs: 1,
        ..Config::default()
    }
}
