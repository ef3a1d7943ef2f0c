//! # out.error 解析器
//!
//! 收集 SPEX-INFO / SPEX-WARNING / SPEX-ERROR 行，三者互相独立。
//!
//! ## 依赖关系
//! - 被 `commands/parse.rs`, `commands/collect.rs` 使用
//! - 使用 `models/output.rs`

use crate::models::ErrorLog;

use regex::Regex;
use std::sync::LazyLock;

static RE_ERROR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"SPEX-ERROR.*").unwrap());
static RE_WARNING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"SPEX-WARNING.*").unwrap());
static RE_INFO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"SPEX-INFO.*").unwrap());

fn find_all(re: &Regex, content: &str) -> Vec<String> {
    re.find_iter(content)
        .map(|m| m.as_str().trim_end().to_string())
        .collect()
}

/// 解析 out.error，未出现的标记得到空列表
pub fn parse_error_log(content: &str) -> ErrorLog {
    ErrorLog {
        errors: find_all(&RE_ERROR, content),
        warnings: find_all(&RE_WARNING, content),
        info: find_all(&RE_INFO, content),
    }
}
