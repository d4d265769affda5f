//! # PR Snapshot
//!
//! 对 GitHub PR 页面逐个整页截图，再把每张截图转成单页 PDF
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（标签页），只暴露能力
//! - `PageDriver` / `BrowsingContext` - 导航、等待、截图、关闭
//! - `browser/` - 启动绑定用户数据目录的浏览器
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个 PR 或单张图片
//! - `SessionManager` - 登录确认（含人工登录）
//! - `CaptureService` - 单个 PR 截图
//! - `DocumentAssembler` - 截图转 PDF
//! - `CredentialProvider` - GitHub CLI 认证检查
//!
//! ### ③ 数据层（Models）
//! - `models/` - `WorkItem` / `CaptureResult` / `RunStatistics` / `AssembledDocument`
//! - `models/loaders` - 从 CSV 加载去重后的 PR 列表
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 目录准备、浏览器生命周期、整体流程
//! - `orchestrator/capture_runner` - 顺序截图循环与统计

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use browser::{launch_persistent_context, ChromiumContext};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{BrowsingContext, PageDriver};
pub use models::{CaptureResult, RunStatistics, WorkItem};
pub use orchestrator::{capture_all, App, RunReport};
