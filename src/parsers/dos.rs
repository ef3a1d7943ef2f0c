//! # 态密度 (spex.dos) 解析器
//!
//! 第一列为能量，其余列为各通道的态密度。`#` 注释和空行忽略，
//! 所有数据行的列数必须一致。
//!
//! ## 依赖关系
//! - 被 `registry.rs` 使用
//! - 使用 `models/tables.rs`

use super::{parse_f64, strip_comment};
use crate::error::{Result, SpexError};
use crate::models::{DosRow, DosTable};

/// 解析 spex.dos
pub fn parse_dos(content: &str) -> Result<DosTable> {
    let mut rows = Vec::new();
    let mut width = None;

    for line in content.lines() {
        let parts: Vec<&str> = strip_comment(line).split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match width {
            None if parts.len() < 2 => {
                return Err(SpexError::InvalidFormat(format!(
                    "DOS: expected energy and at least one channel in '{}'",
                    line.trim()
                )));
            }
            None => width = Some(parts.len()),
            Some(w) if w != parts.len() => {
                return Err(SpexError::InvalidFormat(format!(
                    "DOS: expected {} columns, found {} in '{}'",
                    w,
                    parts.len(),
                    line.trim()
                )));
            }
            Some(_) => {}
        }

        let values = parts[1..]
            .iter()
            .map(|t| parse_f64(t, "DOS value"))
            .collect::<Result<Vec<f64>>>()?;

        rows.push(DosRow {
            energy: parse_f64(parts[0], "DOS energy")?,
            values,
        });
    }

    Ok(DosTable { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dos() {
        let text = "\
# energy   total   up
 -0.50   0.000  0.000
 -0.49   0.125  0.060   # peak

 -0.48   0.250  0.120
";
        let table = parse_dos(text).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.channels(), 2);
        assert_eq!(table.rows[1].values, vec![0.125, 0.060]);
        assert!((table.rows[2].energy + 0.48).abs() < 1e-12);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = parse_dos("0.0 1.0 2.0\n0.1 1.0\n").unwrap_err();
        assert!(matches!(err, SpexError::InvalidFormat(_)));
    }

    #[test]
    fn test_empty_dos() {
        assert_eq!(parse_dos("# nothing\n").unwrap().channels(), 0);
    }
}
