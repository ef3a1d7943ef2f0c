//! # 解析器模块
//!
//! 提供 SPEX 各输出文件的提取器。每个字段由独立的锚定模式提取，
//! 不存在覆盖整个文件的统一语法；可选字段缺失时为空，必需字段缺失时报错。
//!
//! ## 依赖关系
//! - 被 `registry.rs` 和 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: spex_out, error_log, energies, dielectric, plussoc, projection, dos

pub mod dielectric;
pub mod dos;
pub mod energies;
pub mod error_log;
pub mod plussoc;
pub mod projection;
pub mod spex_out;

use crate::error::{Result, SpexError};
use crate::models::Matrix3;
use regex::Regex;
use std::fs;
use std::path::Path;

/// 读取文本文件
pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(SpexError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| SpexError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 将连续空白（含换行）折叠为单个空格
pub(crate) fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 第一个匹配的第一个捕获组，空白归一化
pub(crate) fn capture_first(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_ws(m.as_str()))
}

/// 所有匹配的第一个捕获组，按出现顺序
pub(crate) fn capture_all(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// 标签行之后的非空行，直到第一个空行
///
/// 标签行与数据之间的空行会被跳过。
pub(crate) fn block_after<'a>(re: &Regex, text: &'a str) -> Option<Vec<&'a str>> {
    let m = re.find(text)?;
    let rest = &text[m.end()..];
    // 跳过标签行剩余部分
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => "",
    };

    let lines = rest
        .lines()
        .skip_while(|l| l.trim().is_empty())
        .take_while(|l| !l.trim().is_empty())
        .collect();
    Some(lines)
}

/// 匹配所在行之后的 n 行，开头的空行不计入
pub(crate) fn lines_after<'a>(re: &Regex, text: &'a str, n: usize) -> Option<Vec<&'a str>> {
    let m = re.find(text)?;
    let rest = &text[m.end()..];
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => "",
    };
    Some(
        rest.lines()
            .skip_while(|l| l.trim().is_empty())
            .take(n)
            .collect(),
    )
}

/// 去掉 `#` 之后的注释
pub(crate) fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

pub(crate) fn parse_f64(token: &str, field: &str) -> Result<f64> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| SpexError::InvalidFormat(format!("{}: '{}' is not a number", field, token)))
}

pub(crate) fn parse_usize(token: &str, field: &str) -> Result<usize> {
    token.trim().parse::<usize>().map_err(|_| {
        SpexError::InvalidFormat(format!("{}: '{}' is not an integer", field, token))
    })
}

/// 逗号或空白分隔的三个坐标
pub(crate) fn parse_vec3(s: &str, field: &str) -> Result<[f64; 3]> {
    let parts: Vec<&str> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return Err(SpexError::InvalidFormat(format!(
            "{}: expected 3 components, found {}",
            field,
            parts.len()
        )));
    }
    Ok([
        parse_f64(parts[0], field)?,
        parse_f64(parts[1], field)?,
        parse_f64(parts[2], field)?,
    ])
}

/// 九个数值重排为 3x3 矩阵
pub(crate) fn parse_matrix3(s: &str, field: &str) -> Result<Matrix3> {
    let values = s
        .split_whitespace()
        .map(|t| parse_f64(t, field))
        .collect::<Result<Vec<f64>>>()?;

    if values.len() != 9 {
        return Err(SpexError::InvalidFormat(format!(
            "{}: expected 9 numbers, found {}",
            field,
            values.len()
        )));
    }

    let mut matrix = [[0.0; 3]; 3];
    for (i, v) in values.into_iter().enumerate() {
        matrix[i / 3][i % 3] = v;
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ws() {
        assert_eq!(normalize_ws("  a   b\n  c  "), "a b c");
        assert_eq!(normalize_ws("\n\n"), "");
    }

    #[test]
    fn test_block_after_stops_at_blank_line() {
        let re = Regex::new(r"List of k points").unwrap();
        let text = "header\nList of k points\n\n  1 0 0 0\n  2 0 0 0\n\n  3 0 0 0\n";
        let block = block_after(&re, text).unwrap();
        assert_eq!(block, vec!["  1 0 0 0", "  2 0 0 0"]);
    }

    #[test]
    fn test_block_after_missing_label() {
        let re = Regex::new(r"List of k points").unwrap();
        assert!(block_after(&re, "nothing here").is_none());
    }

    #[test]
    fn test_parse_matrix3_requires_nine_numbers() {
        let m = parse_matrix3("1 0 0\n0 1 0\n0 0 1", "vectors").unwrap();
        assert_eq!(m[1][1], 1.0);
        assert_eq!(m[2][0], 0.0);

        let err = parse_matrix3("1 0 0 0 1 0 0 0", "vectors").unwrap_err();
        assert!(matches!(err, SpexError::InvalidFormat(_)));
    }

    #[test]
    fn test_parse_vec3_accepts_commas() {
        let v = parse_vec3("0.5, 0.0,-0.25", "k").unwrap();
        assert_eq!(v, [0.5, 0.0, -0.25]);
        assert!(parse_vec3("0.5,0.0", "k").is_err());
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("1.0 2.0 # tail"), "1.0 2.0 ");
        assert_eq!(strip_comment("# only"), "");
    }
}
