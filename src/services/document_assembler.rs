//! PDF 生成服务 - 业务能力层
//!
//! 直接扫描截图目录，每张 `pr-<编号>.png` 生成一个同名的单页 PDF。
//! 不依赖本次截图的统计结果，可以单独运行。
//!
//! 页面尺寸规则：1 像素 = 1pt；宽度超过上限时等比缩小到上限，
//! 否则保持原尺寸（不放大，也不限制高度）。

use std::path::{Path, PathBuf};

use chrono::{Datelike, Timelike, Utc};
use image::DynamicImage;
use miniz_oxide::deflate::compress_to_vec_zlib;
use once_cell::sync::Lazy;
use pdf_writer::{Content, Date, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use regex::Regex;
use tracing::{error, info};

use crate::config::Config;
use crate::error::AssemblyError;
use crate::models::{AssembledDocument, AssemblySummary, PageSize};

static RE_SCREENSHOT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"pr-([0-9]+)\.png").unwrap());

const COMPRESSION_LEVEL: u8 = 6;

/// 待转换的截图文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotFile {
    pub identifier: u64,
    pub path: PathBuf,
}

/// 计算页面尺寸
pub fn fit_to_width(pixel_width: u32, pixel_height: u32, max_width: f32) -> PageSize {
    let width = pixel_width as f32;
    let height = pixel_height as f32;

    if width > max_width {
        PageSize {
            width: max_width,
            height: height * (max_width / width),
        }
    } else {
        PageSize { width, height }
    }
}

/// 从文件名解析 PR 编号
///
/// 不是 `pr-*.png` 的文件返回 `None`；前后缀匹配但编号解析不出来时记为 0
pub fn parse_screenshot_name(file_name: &str) -> Option<u64> {
    if !(file_name.starts_with("pr-") && file_name.ends_with(".png")) {
        return None;
    }

    let identifier = RE_SCREENSHOT_NAME
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0);
    Some(identifier)
}

/// PDF 文件路径：`<dir>/pr-<编号>.pdf`
pub fn document_path(pdfs_dir: &Path, identifier: u64) -> PathBuf {
    pdfs_dir.join(format!("pr-{}.pdf", identifier))
}

/// PDF 生成服务
pub struct DocumentAssembler {
    screenshots_dir: PathBuf,
    pdfs_dir: PathBuf,
    max_page_width: f32,
}

impl DocumentAssembler {
    pub fn new(config: &Config) -> Self {
        Self::with_dirs(
            config.screenshots_dir.clone(),
            config.pdfs_dir.clone(),
            config.max_page_width,
        )
    }

    pub fn with_dirs(
        screenshots_dir: impl Into<PathBuf>,
        pdfs_dir: impl Into<PathBuf>,
        max_page_width: f32,
    ) -> Self {
        Self {
            screenshots_dir: screenshots_dir.into(),
            pdfs_dir: pdfs_dir.into(),
            max_page_width,
        }
    }

    pub fn pdfs_dir(&self) -> &Path {
        &self.pdfs_dir
    }

    /// 列出截图文件，按 PR 编号升序
    pub fn discover(&self) -> Result<Vec<ScreenshotFile>, AssemblyError> {
        if !self.screenshots_dir.is_dir() {
            return Err(AssemblyError::ScreenshotsDirMissing {
                path: self.screenshots_dir.clone(),
            });
        }

        let dir_error = |source: std::io::Error| AssemblyError::DirectoryAccess {
            path: self.screenshots_dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.screenshots_dir).map_err(dir_error)? {
            let entry = entry.map_err(dir_error)?;
            let file_name = entry.file_name();
            if let Some(identifier) = parse_screenshot_name(&file_name.to_string_lossy()) {
                files.push(ScreenshotFile {
                    identifier,
                    path: entry.path(),
                });
            }
        }

        files.sort_by(|a, b| {
            a.identifier
                .cmp(&b.identifier)
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(files)
    }

    /// 为一张截图生成 PDF
    pub fn assemble_one(&self, file: &ScreenshotFile) -> Result<AssembledDocument, AssemblyError> {
        let image = image::open(&file.path).map_err(|source| AssemblyError::ImageReadFailed {
            path: file.path.clone(),
            source,
        })?;

        let size = fit_to_width(image.width(), image.height(), self.max_page_width);
        let bytes = encode_single_page(&image, size);

        let output_path = document_path(&self.pdfs_dir, file.identifier);
        std::fs::write(&output_path, bytes).map_err(|source| AssemblyError::EncodingFailed {
            path: output_path.clone(),
            source,
        })?;

        Ok(AssembledDocument {
            identifier: file.identifier,
            source_image_path: file.path.clone(),
            output_path,
            page_width: size.width,
            page_height: size.height,
        })
    }

    /// 为目录中所有截图生成 PDF
    ///
    /// 单张失败只计数；目录不存在或无法创建才返回错误
    pub fn assemble_all(&self) -> Result<AssemblySummary, AssemblyError> {
        if !self.pdfs_dir.exists() {
            std::fs::create_dir_all(&self.pdfs_dir).map_err(|source| {
                AssemblyError::DirectoryAccess {
                    path: self.pdfs_dir.clone(),
                    source,
                }
            })?;
            info!("已创建PDF保存目录: {}\n", self.pdfs_dir.display());
        }

        info!("正在读取截图文件...");
        let files = self.discover()?;

        let mut summary = AssemblySummary {
            total: files.len(),
            ..Default::default()
        };

        if files.is_empty() {
            info!("没有找到截图");
            info!("目录: {}", self.screenshots_dir.display());
            return Ok(summary);
        }

        info!("找到 {} 张截图\n", files.len());

        for (index, file) in files.iter().enumerate() {
            info!(
                "[{}/{}] PR #{} 的PDF生成中...",
                index + 1,
                files.len(),
                file.identifier
            );

            match self.assemble_one(file) {
                Ok(document) => {
                    info!(
                        "  ✓ 完成: {}",
                        document
                            .output_path
                            .file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                    );
                    summary.succeeded += 1;
                    summary.documents.push(document);
                }
                Err(e) => {
                    error!("  ✗ 错误: {}", e);
                    summary.failed += 1;
                    summary.failures.push((file.identifier, e.to_string()));
                }
            }
        }

        Ok(summary)
    }
}

/// 生成只有一页的 PDF，图片从原点铺满整页
fn encode_single_page(image: &DynamicImage, size: PageSize) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let mask_id = Ref::new(5);
    let content_id = Ref::new(6);
    let info_id = Ref::new(7);
    let image_name = Name(b"Im1");

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, size.width, size.height));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources().x_objects().pair(image_name, image_id);
    page.finish();

    let pixel_width = image.width() as i32;
    let pixel_height = image.height() as i32;
    let rgb = compress_to_vec_zlib(image.to_rgb8().as_raw(), COMPRESSION_LEVEL);
    // 截图带透明通道时作为软遮罩嵌入
    let alpha = image.color().has_alpha().then(|| {
        let channel: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
        compress_to_vec_zlib(&channel, COMPRESSION_LEVEL)
    });

    let mut xobject = pdf.image_xobject(image_id, &rgb);
    xobject.filter(Filter::FlateDecode);
    xobject.width(pixel_width);
    xobject.height(pixel_height);
    xobject.color_space().device_rgb();
    xobject.bits_per_component(8);
    if alpha.is_some() {
        xobject.s_mask(mask_id);
    }
    xobject.finish();

    if let Some(alpha) = &alpha {
        let mut mask = pdf.image_xobject(mask_id, alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(pixel_width);
        mask.height(pixel_height);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        mask.finish();
    }

    let mut content = Content::new();
    content.save_state();
    content.transform([size.width, 0.0, 0.0, size.height, 0.0, 0.0]);
    content.x_object(image_name);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    let now = Utc::now();
    pdf.document_info(info_id)
        .producer(TextStr("pr-snapshot"))
        .creation_date(
            Date::new(now.year() as u16)
                .month(now.month() as u8)
                .day(now.day() as u8)
                .hour(now.hour() as u8)
                .minute(now.minute() as u8)
                .second(now.second() as u8)
                .utc_offset_hour(0)
                .utc_offset_minute(0),
        );

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([200, 10, 10]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_wide_image_is_scaled_to_max_width() {
        let size = fit_to_width(1920, 5000, 595.0);
        assert_eq!(size.width, 595.0);
        let expected = 5000.0 * (595.0 / 1920.0);
        assert!((size.height - expected).abs() < 1e-3);
    }

    #[test]
    fn test_narrow_image_keeps_intrinsic_size() {
        assert_eq!(
            fit_to_width(400, 12000, 595.0),
            PageSize {
                width: 400.0,
                height: 12000.0
            }
        );
        assert_eq!(
            fit_to_width(595, 842, 595.0),
            PageSize {
                width: 595.0,
                height: 842.0
            }
        );
    }

    #[test]
    fn test_parse_screenshot_name() {
        assert_eq!(parse_screenshot_name("pr-15703.png"), Some(15703));
        assert_eq!(parse_screenshot_name("pr-draft.png"), Some(0));
        assert_eq!(parse_screenshot_name("pr-12.pdf"), None);
        assert_eq!(parse_screenshot_name("notes.png"), None);
        assert_eq!(parse_screenshot_name("pr-\u{663}\u{664}.png"), Some(0));
    }

    #[test]
    fn test_discover_sorts_numerically_and_ignores_others() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "pr-100.png", 2, 2);
        write_png(dir.path(), "pr-9.png", 2, 2);
        write_png(dir.path(), "pr-20.png", 2, 2);
        std::fs::write(dir.path().join("readme.txt"), "x").unwrap();
        std::fs::write(dir.path().join("pr-5.jpg"), "x").unwrap();

        let assembler = DocumentAssembler::with_dirs(dir.path(), dir.path().join("pdfs"), 595.0);
        let ids: Vec<u64> = assembler
            .discover()
            .unwrap()
            .iter()
            .map(|f| f.identifier)
            .collect();
        assert_eq!(ids, [9, 20, 100]);
    }

    #[test]
    fn test_missing_screenshots_dir() {
        let dir = tempfile::tempdir().unwrap();
        let assembler =
            DocumentAssembler::with_dirs(dir.path().join("none"), dir.path().join("pdfs"), 595.0);
        assert!(matches!(
            assembler.assemble_all(),
            Err(AssemblyError::ScreenshotsDirMissing { .. })
        ));
    }

    #[test]
    fn test_assemble_all_counts_corrupt_images() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("screenshots");
        std::fs::create_dir(&shots).unwrap();
        write_png(&shots, "pr-1.png", 1200, 300);
        write_png(&shots, "pr-2.png", 300, 900);
        std::fs::write(shots.join("pr-3.png"), b"not a png").unwrap();

        let pdfs = dir.path().join("pdfs");
        let assembler = DocumentAssembler::with_dirs(&shots, &pdfs, 595.0);
        let summary = assembler.assemble_all().unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].0, 3);

        let wide = &summary.documents[0];
        assert_eq!(wide.identifier, 1);
        assert_eq!(wide.page_width, 595.0);
        assert!((wide.page_height - 148.75).abs() < 1e-3);

        let narrow = &summary.documents[1];
        assert_eq!((narrow.page_width, narrow.page_height), (300.0, 900.0));

        let bytes = std::fs::read(pdfs.join("pr-1.pdf")).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(pdfs.join("pr-2.pdf").exists());
        assert!(!pdfs.join("pr-3.pdf").exists());
    }

    #[test]
    fn test_rerun_gives_same_layout() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "pr-7.png", 800, 1600);
        let assembler = DocumentAssembler::with_dirs(dir.path(), dir.path().join("pdfs"), 595.0);

        let output = dir.path().join("pdfs").join("pr-7.pdf");
        let first = assembler.assemble_all().unwrap();
        let first_bytes = std::fs::read(&output).unwrap();
        let second = assembler.assemble_all().unwrap();
        let second_bytes = std::fs::read(&output).unwrap();

        assert_eq!(first.documents.len(), 1);
        assert_eq!(first.documents, second.documents);
        // 只有创建时间可能不同，日期字段定长
        assert_eq!(first_bytes.len(), second_bytes.len());
    }

    #[test]
    fn test_transparent_image_is_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pr-4.png");
        RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 128]))
            .save(&path)
            .unwrap();

        let assembler = DocumentAssembler::with_dirs(dir.path(), dir.path().join("out"), 595.0);
        std::fs::create_dir_all(assembler.pdfs_dir()).unwrap();
        let document = assembler
            .assemble_one(&ScreenshotFile {
                identifier: 4,
                path,
            })
            .unwrap();

        let bytes = std::fs::read(&document.output_path).unwrap();
        assert!(bytes.windows(6).any(|w| w == b"/SMask"));
    }
}
