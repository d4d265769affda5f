//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理运行生命周期（目录准备、启动浏览器、关闭浏览器）
//! - 加载 PR 列表
//! - 登录 → 截图 → PDF 的顺序调度
//! - 输出统计信息
//!
//! ### `capture_runner` - 截图循环
//! - 按顺序遍历 `Vec<WorkItem>`
//! - 累加 `RunStatistics`
//! - 控制请求间隔
//!
//! ## 层次关系
//!
//! ```text
//! app (登录 + 截图 + PDF)
//!     ↓
//! capture_runner (处理 Vec<WorkItem>)
//!     ↓
//! services (能力层：session / capture / assembler / credential)
//!     ↓
//! infrastructure (基础设施：PageDriver)
//! ```

pub mod app;
pub mod capture_runner;

// 重新导出主要类型
pub use app::{App, RunReport};
pub use capture_runner::capture_all;
