use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// 应用程序错误类型
///
/// 只包含会中止整个运行的致命错误；单个 PR 的截图失败、单张图片的 PDF
/// 生成失败都在各自的边界内被捕获并计入统计，不会出现在这里。
#[derive(Debug, Error)]
pub enum AppError {
    /// PR 列表加载错误
    #[error("PR列表错误: {0}")]
    Worklist(#[from] WorklistError),
    /// 登录会话错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] DriverError),
    /// PDF 生成批次错误
    #[error("PDF生成错误: {0}")]
    Assembly(#[from] AssemblyError),
    /// 目录创建失败
    #[error("无法创建目录 {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 后台任务异常退出
    #[error("后台任务执行失败: {0}")]
    Task(String),
}

/// PR 列表（CSV）加载错误
#[derive(Debug, Error)]
pub enum WorklistError {
    /// 输入文件不存在
    #[error("CSV文件不存在: {path:?}")]
    SourceNotFound { path: PathBuf },
    /// 记录流本身无法解析（I/O 错误、非 UTF-8 等）
    #[error("CSV文件无法解析 ({path:?}): {source}")]
    MalformedSource {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// 浏览器驱动错误
///
/// 渲染引擎边界上的所有失败都归到这里，上层再决定是否致命。
#[derive(Debug, Error)]
pub enum DriverError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    Launch(String),
    /// 操作超时
    #[error("{operation} 超时 ({timeout:?})")]
    Timeout {
        operation: String,
        timeout: Duration,
    },
    /// 导航被浏览器拒绝（DNS 失败、连接被重置等）
    #[error("导航到 {url} 失败: {reason}")]
    NavigationFailed { url: String, reason: String },
    /// CDP 协议错误
    #[error("CDP错误: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
    /// 脚本返回值无法反序列化
    #[error("脚本返回值解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}

/// 登录会话错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 人工登录后仍未认证
    #[error("仍未登录 GitHub ({login_url})，请在浏览器中完成登录后重新运行")]
    AuthenticationRequired { login_url: String },
    /// 检查登录状态时浏览器出错
    #[error("检查登录状态失败: {0}")]
    Browser(#[from] DriverError),
    /// 读取终端输入失败
    #[error("读取终端输入失败: {0}")]
    Prompt(#[from] std::io::Error),
}

/// 单个 PR 截图错误（非致命，计入统计）
#[derive(Debug, Error)]
pub enum CaptureError {
    /// 页面在限定时间内没有完成 DOM 构建
    #[error("页面加载超时 ({timeout:?}): {url}")]
    NavigationTimeout { url: String, timeout: Duration },
    /// 页面显示的是登录表单
    #[error("需要认证，请登录 GitHub: {url}")]
    AuthRequiredForItem { url: String },
    /// 其他失败：打开标签页、导航、截图或写文件
    #[error("截图失败 ({url}): {source}")]
    CaptureFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// PDF 生成错误
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// 截图目录不存在（批次级，致命）
    #[error("截图目录不存在: {path:?}")]
    ScreenshotsDirMissing { path: PathBuf },
    /// 目录无法读取或创建（批次级，致命）
    #[error("目录访问失败 ({path:?}): {source}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 图片无法读取或解码（单张，非致命）
    #[error("图片读取失败 ({path:?}): {source}")]
    ImageReadFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// PDF 写入失败（单张，非致命）
    #[error("PDF写入失败 ({path:?}): {source}")]
    EncodingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl DriverError {
    /// 创建超时错误
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        DriverError::Timeout {
            operation: operation.into(),
            timeout,
        }
    }
}

impl CaptureError {
    /// 创建通用截图失败错误
    pub fn capture_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CaptureError::CaptureFailed {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_detail_names_the_url() {
        let err = CaptureError::NavigationTimeout {
            url: "https://github.com/o/r/pull/7".to_string(),
            timeout: Duration::from_secs(60),
        };
        let detail = err.to_string();
        assert!(detail.contains("60s"));
        assert!(detail.contains("/pull/7"));
    }

    #[test]
    fn test_worklist_error_wraps_into_app_error() {
        let err: AppError = WorklistError::SourceNotFound {
            path: PathBuf::from("missing.csv"),
        }
        .into();
        assert!(matches!(
            err,
            AppError::Worklist(WorklistError::SourceNotFound { .. })
        ));
    }
}
