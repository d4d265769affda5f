//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **准备目录**：确保截图目录存在
//! 2. **加载列表**：读取 CSV，得到去重后的 `Vec<WorkItem>`
//! 3. **资源管理**：启动并最终关闭唯一的浏览器
//! 4. **顺序调度**：登录确认 → 截图循环 → 统计 → PDF 生成
//!
//! 致命错误（CSV 不存在、未登录）向上返回；单个 PR / 单张图片的失败只计入统计。

use std::path::Path;

use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::BrowsingContext;
use crate::models::{load_worklist, AssemblySummary, RunStatistics, WorkItem};
use crate::orchestrator::capture_runner::capture_all;
use crate::services::{
    CaptureService, CredentialProvider, DocumentAssembler, LoginPrompt, SessionManager,
    TerminalPrompt,
};
use crate::utils::logging::{
    log_startup, log_worklist_loaded, print_assembly_stats, print_capture_stats,
};

/// 一次运行的结果
#[derive(Debug, Default)]
pub struct RunReport {
    pub statistics: RunStatistics,
    /// 有成功截图时才会生成 PDF；生成失败时为 `None`
    pub assembly: Option<AssemblySummary>,
}

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 运行完整流程
    pub async fn run(&self, input: &Path) -> AppResult<RunReport> {
        log_startup(&self.config.repo);

        ensure_dir(&self.config.screenshots_dir)?;

        CredentialProvider::github_cli().check().await;

        info!("读取CSV文件: {}", input.display());
        let items = load_worklist(input)?;

        if items.is_empty() {
            warn!("⚠️ 没有需要处理的PR，程序结束");
            return Ok(RunReport::default());
        }
        log_worklist_loaded(items.len());

        let context = browser::launch_persistent_context(&self.config).await?;
        info!("※ 首次运行时可能需要登录 GitHub\n");

        let report = self.process(&context, &TerminalPrompt, &items).await;

        // 无论成功与否都要释放浏览器
        context.shutdown().await;

        report
    }

    /// 登录确认 → 截图 → PDF
    ///
    /// 浏览器由调用方启动和关闭
    pub async fn process<C: BrowsingContext>(
        &self,
        context: &C,
        prompt: &dyn LoginPrompt,
        items: &[WorkItem],
    ) -> AppResult<RunReport> {
        let mut session = SessionManager::new(&self.config);
        session.establish(context, prompt).await?;

        info!("\n开始截图...\n");
        let service = CaptureService::new(&self.config);
        let statistics = capture_all(context, &service, items, self.config.item_delay()).await;

        print_capture_stats(&statistics, &self.config.screenshots_dir);

        let assembly = if statistics.has_successes() {
            info!("\n--- PDF生成 ---");
            match self.assemble_documents().await {
                Ok(summary) => Some(summary),
                Err(e) => {
                    error!("\nPDF生成出错: {}", e);
                    info!("截图已正常保存。");
                    None
                }
            }
        } else {
            None
        };

        Ok(RunReport {
            statistics,
            assembly,
        })
    }

    /// 只生成 PDF（扫描截图目录）
    pub async fn assemble_documents(&self) -> AppResult<AssemblySummary> {
        let assembler = DocumentAssembler::new(&self.config);

        let summary = tokio::task::spawn_blocking(move || assembler.assemble_all())
            .await
            .map_err(|e| AppError::Task(e.to_string()))??;

        print_assembly_stats(&summary, &self.config.pdfs_dir);
        Ok(summary)
    }
}

fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|source| AppError::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
        info!("已创建目录: {}", path.display());
    }
    Ok(())
}
