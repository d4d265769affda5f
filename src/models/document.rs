//! PDF 生成结果

use std::path::PathBuf;

/// 页面尺寸（pt）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// 一张截图生成的单页 PDF
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDocument {
    pub identifier: u64,
    pub source_image_path: PathBuf,
    pub output_path: PathBuf,
    pub page_width: f32,
    pub page_height: f32,
}

/// 一次 PDF 生成批次的统计
#[derive(Debug, Default)]
pub struct AssemblySummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub documents: Vec<AssembledDocument>,
    /// (PR 编号, 失败原因)
    pub failures: Vec<(u64, String)>,
}
