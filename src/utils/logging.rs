//! 日志工具模块
//!
//! 提供日志初始化和统一的输出格式

use std::path::Path;

use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::models::{AssemblySummary, RunStatistics, WorkItem};

/// 初始化日志
///
/// 日志级别读取 `RUST_LOG`，默认 `info`；重复调用无副作用
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(repo: &str) {
    info!("{}", "=".repeat(60));
    info!("📸 GitHub PR 截图工具");
    info!("📦 目标仓库: {}", repo);
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 记录 PR 列表加载信息
pub fn log_worklist_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的PR", total);
    info!("💡 按顺序逐个截图\n");
}

/// 记录单个 PR 开始处理
pub fn log_item_start(index: usize, total: usize, item: &WorkItem) {
    info!("\n{}", "─".repeat(30));
    info!("[{}/{}] {}", index, total, item);
    debug!("原始记录: {}", truncate_text(&item.raw_record, 80));
}

/// 打印截图统计
pub fn print_capture_stats(stats: &RunStatistics, screenshots_dir: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 截图处理完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("总数: {}", stats.total);
    info!("✅ 成功: {}", stats.succeeded);
    info!("❌ 失败: {}", stats.failed);

    if !stats.failures.is_empty() {
        error!("\n失败的PR:");
        for (identifier, detail) in &stats.failures {
            error!("  - PR #{}: {}", identifier, detail);
        }
    }

    info!("{}", "=".repeat(60));
    info!("\n截图已保存至: {}/", screenshots_dir.display());
}

/// 打印 PDF 生成统计
pub fn print_assembly_stats(summary: &AssemblySummary, pdfs_dir: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📄 PDF生成完成");
    info!("{}", "=".repeat(60));
    info!("总数: {}", summary.total);
    info!("✅ 成功: {}", summary.succeeded);
    info!("❌ 失败: {}", summary.failed);
    info!("{}", "=".repeat(60));
    info!("\n保存位置: {}/", pdfs_dir.display());
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
