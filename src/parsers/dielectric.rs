//! # 介电函数 (dielecR) 解析器
//!
//! ## dielecR 格式说明
//! ```text
//! # lattvec:  1
//! # k point:  (0.0,0.0,0.0)
//! # k index:  1
//! # spin:     1
//!   0.000000   12.345678    0.000000
//!   0.010000   12.351234    0.001234
//! ```
//! 数据为 (频率, 实部, 虚部) 三列；注释行标注与数据行之间没有显式对应关系。
//!
//! ## 依赖关系
//! - 被 `registry.rs`, `commands/plot.rs` 使用
//! - 使用 `models/tables.rs`

use super::{capture_all, capture_first, parse_f64, strip_comment};
use crate::error::{Result, SpexError};
use crate::models::{DielectricPoint, DielectricTable};

use regex::Regex;
use std::sync::LazyLock;

static RE_LATTVEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[ \t]*lattvec:[ \t]*(.*)").unwrap());
static RE_KPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[ \t]*k point:[ \t]*(.*)").unwrap());
static RE_KINDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[ \t]*k index:[ \t]*(.*)").unwrap());
static RE_SPIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[ \t]*spin:[ \t]*(.*)").unwrap());

/// 解析 dielecR 文件
pub fn parse_dielectric(content: &str) -> Result<DielectricTable> {
    let lattvec = capture_first(&RE_LATTVEC, content).ok_or_else(|| SpexError::not_found("lattvec"))?;

    let mut points = Vec::new();
    for line in content.lines() {
        let data = strip_comment(line);
        let parts: Vec<&str> = data.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts.len() != 3 {
            return Err(SpexError::InvalidFormat(format!(
                "dielectric function: expected 3 columns in '{}'",
                line.trim()
            )));
        }
        points.push(DielectricPoint {
            frequency: parse_f64(parts[0], "dielectric frequency")?,
            real: parse_f64(parts[1], "dielectric real part")?,
            imaginary: parse_f64(parts[2], "dielectric imaginary part")?,
        });
    }

    Ok(DielectricTable {
        points,
        lattvec,
        kpoint: capture_all(&RE_KPOINT, content),
        kindex: capture_all(&RE_KINDEX, content),
        spin: capture_all(&RE_SPIN, content),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIELEC_R: &str = "# lattvec:  1
# k point:  (0.0,0.0,0.0)
# spin:     1
  0.000000   12.345678    0.000000
  0.010000   12.351234    0.001234
  0.020000   12.367890    0.002468
";

    #[test]
    fn test_parse_dielectric() {
        let table = parse_dielectric(DIELEC_R).unwrap();
        assert_eq!(table.points.len(), 3);
        assert_eq!(table.lattvec, "1");
        assert_eq!(table.kpoint, vec!["(0.0,0.0,0.0)"]);
        assert!(table.kindex.is_empty());
        assert_eq!(table.spin, vec!["1"]);
        assert!((table.points[2].imaginary - 0.002468).abs() < 1e-12);
    }

    #[test]
    fn test_lattvec_is_required() {
        let err = parse_dielectric("0.0 1.0 0.0\n").unwrap_err();
        assert!(matches!(err, SpexError::PatternNotFound { .. }));
    }

    #[test]
    fn test_rejects_wrong_column_count() {
        let err = parse_dielectric("# lattvec: 1\n0.0 1.0\n").unwrap_err();
        assert!(matches!(err, SpexError::InvalidFormat(_)));
    }
}
