/*
 * @Date         : 2026-10-18
 * @Description  : 名字语料的读取：分隔文本 -> 规范化、去重后的名字列表
 *
 * 文件每行一条记录，例如：
 * ```text
 * jméno,četnost
 * Jan,283000
 * Petr,196000
 * ```
 */

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alphabet::normalize;
use crate::errors::{Result, RnnError};

/// 语料读取选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusOptions {
    /// 字段分隔符
    pub delimiter: char,
    /// 名字所在列（从 0 开始）
    pub name_column: usize,
    /// 频数所在列；为`None`时不做频数过滤
    pub count_column: Option<usize>,
    /// 频数低于此值的名字被丢弃
    pub min_count: u64,
    /// 首行是否为表头
    pub has_header: bool,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            name_column: 0,
            count_column: None,
            min_count: 0,
            has_header: false,
        }
    }
}

/// 从文件读取名字列表
pub fn load_names<P: AsRef<Path>>(path: P, options: &CorpusOptions) -> Result<Vec<String>> {
    let file = File::open(path.as_ref())?;
    let names = parse_names(BufReader::new(file), options)?;
    tracing::info!(
        path = %path.as_ref().display(),
        count = names.len(),
        "已读取名字语料"
    );
    Ok(names)
}

/// 从任意`BufRead`读取名字列表（按出现顺序，去重）
pub fn parse_names<R: BufRead>(reader: R, options: &CorpusOptions) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        if (i == 0 && options.has_header) || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(options.delimiter).collect();
        let raw_name = fields.get(options.name_column).ok_or_else(|| RnnError::Format {
            line: line_no,
            message: format!("缺少名字列（第{}列）", options.name_column),
        })?;

        if let Some(col) = options.count_column {
            let count = parse_count(fields.get(col).copied(), col, line_no)?;
            if count < options.min_count {
                continue;
            }
        }

        let name = normalize(raw_name);
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }

    Ok(names)
}

fn parse_count(field: Option<&str>, col: usize, line_no: usize) -> Result<u64> {
    let field = field.ok_or_else(|| RnnError::Format {
        line: line_no,
        message: format!("缺少频数列（第{col}列）"),
    })?;
    // 允许千位分隔用的空白
    let digits: String = field.chars().filter(|c| !c.is_whitespace()).collect();
    digits.parse().map_err(|_| RnnError::Format {
        line: line_no,
        message: format!("无法解析频数{field:?}"),
    })
}
