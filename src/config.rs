use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "pr_snapshot.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 目标仓库（owner/name）
    pub repo: String,
    /// GitHub 站点地址
    pub base_url: String,
    /// 默认的 PR 列表 CSV
    pub input_file: PathBuf,
    /// 截图存放目录
    pub screenshots_dir: PathBuf,
    /// PDF 存放目录
    pub pdfs_dir: PathBuf,
    /// 浏览器用户数据目录（保存登录状态）
    pub profile_dir: PathBuf,
    /// 是否无头模式运行
    pub headless: bool,
    /// 浏览器可执行文件路径，留空则自动查找
    pub chrome_executable: Option<PathBuf>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    // --- 超时与等待 ---
    pub navigation_timeout_secs: u64,
    pub login_check_timeout_secs: u64,
    pub content_wait_secs: u64,
    pub settle_delay_secs: u64,
    /// 两个 PR 之间的等待时间（避免触发限流）
    pub item_delay_ms: u64,
    // --- PDF ---
    /// 页面最大宽度（pt），A4 宽度
    pub max_page_width: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: "basicinc/formrun".to_string(),
            base_url: "https://github.com".to_string(),
            input_file: PathBuf::from("pr_list.csv"),
            screenshots_dir: PathBuf::from("screenshots"),
            pdfs_dir: PathBuf::from("pdfs"),
            profile_dir: PathBuf::from(".browser-data"),
            headless: false,
            chrome_executable: None,
            viewport_width: 1920,
            viewport_height: 1080,
            navigation_timeout_secs: 60,
            login_check_timeout_secs: 30,
            content_wait_secs: 15,
            settle_delay_secs: 3,
            item_delay_ms: 1000,
            max_page_width: 595.0,
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 加载配置：默认值 → TOML 文件 → 环境变量
    ///
    /// `path` 为 `None` 时尝试读取 [`DEFAULT_CONFIG_FILE`]，文件不存在不算错误；
    /// 显式指定的文件必须存在。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件读取，未写的字段取默认值
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_env_overrides(self) -> Self {
        let base = self;
        Self {
            repo: std::env::var("PR_REPO").unwrap_or(base.repo),
            base_url: std::env::var("PR_BASE_URL").unwrap_or(base.base_url),
            input_file: std::env::var("PR_INPUT_FILE").map(PathBuf::from).unwrap_or(base.input_file),
            screenshots_dir: std::env::var("SCREENSHOTS_DIR").map(PathBuf::from).unwrap_or(base.screenshots_dir),
            pdfs_dir: std::env::var("PDFS_DIR").map(PathBuf::from).unwrap_or(base.pdfs_dir),
            profile_dir: std::env::var("BROWSER_PROFILE_DIR").map(PathBuf::from).unwrap_or(base.profile_dir),
            headless: std::env::var("BROWSER_HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.headless),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().map(PathBuf::from).or(base.chrome_executable),
            viewport_width: base.viewport_width,
            viewport_height: base.viewport_height,
            navigation_timeout_secs: std::env::var("NAVIGATION_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.navigation_timeout_secs),
            login_check_timeout_secs: base.login_check_timeout_secs,
            content_wait_secs: std::env::var("CONTENT_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.content_wait_secs),
            settle_delay_secs: base.settle_delay_secs,
            item_delay_ms: std::env::var("ITEM_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.item_delay_ms),
            max_page_width: std::env::var("MAX_PAGE_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(base.max_page_width),
        }
    }

    /// 登录页地址
    pub fn login_url(&self) -> String {
        format!("{}/login", self.base_url.trim_end_matches('/'))
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn login_check_timeout(&self) -> Duration {
        Duration::from_secs(self.login_check_timeout_secs)
    }

    pub fn content_wait(&self) -> Duration {
        Duration::from_secs(self.content_wait_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }
}
