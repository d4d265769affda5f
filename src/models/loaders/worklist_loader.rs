use crate::error::WorklistError;
use crate::models::work_item::WorkItem;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

static RE_PR_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([0-9]+)").unwrap());

/// 从 CSV 文件加载 PR 列表
///
/// 每行取第一个包含 `#数字` 的字段作为 PR 编号；没有编号的行直接跳过，
/// 重复编号只保留第一次出现的那一行。
pub fn load_worklist(csv_path: &Path) -> Result<Vec<WorkItem>, WorklistError> {
    if !csv_path.exists() {
        return Err(WorklistError::SourceNotFound {
            path: csv_path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(csv_path).map_err(|e| WorklistError::MalformedSource {
        path: csv_path.to_path_buf(),
        source: e.into(),
    })?;

    let items = parse_worklist(file).map_err(|source| WorklistError::MalformedSource {
        path: csv_path.to_path_buf(),
        source,
    })?;

    tracing::info!("✓ 从CSV加载了 {} 个PR", items.len());
    Ok(items)
}

/// 逐行解析记录流
///
/// 只有记录流本身读不下去（I/O 错误、非 UTF-8）才返回错误
pub fn parse_worklist<R: Read>(reader: R) -> Result<Vec<WorkItem>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for record in csv_reader.records() {
        let record = record?;

        // 只看第一个命中的字段
        let Some(identifier) = record.iter().find_map(extract_identifier) else {
            continue;
        };

        if seen.insert(identifier.to_string()) {
            let raw_record = record.iter().collect::<Vec<_>>().join(",");
            items.push(WorkItem::new(identifier, raw_record));
        } else {
            tracing::debug!("跳过重复的 PR #{}", identifier);
        }
    }

    Ok(items)
}

/// 提取字段中第一个 `#数字` 的数字部分
pub fn extract_identifier(field: &str) -> Option<&str> {
    RE_PR_NUMBER
        .captures(field)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
