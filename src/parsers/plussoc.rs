//! # PLUSSOC 本征值解析器
//!
//! 解析 spex.out 中加入自旋轨道耦合后的本征值：
//! ```text
//! K point   1 ->   1
//!     1    2    3    4
//!   -5.70123  -5.70123   6.12345   6.12345
//!    6.23456   6.23456
//! ```
//! 标题行之后是一行或多行整数（等价 k 点），然后是一行或多行浮点数（本征值），
//! 以空行结束。
//!
//! ## 依赖关系
//! - 被 `registry.rs` 使用
//! - 使用 `models/tables.rs`

use super::{normalize_ws, parse_f64, parse_usize};
use crate::error::Result;
use crate::models::{SpinOrbitRow, SpinOrbitTable};

use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static RE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*K point[ \t]+(\d+)[ \t]+->[ \t]+\d+[ \t]*$").unwrap());

fn is_index_line(line: &str) -> bool {
    let mut tokens = line.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|t| t.parse::<usize>().is_ok())
}

/// 解析 PLUSSOC 本征值
pub fn parse_plussoc(content: &str) -> Result<SpinOrbitTable> {
    let headers: Vec<_> = RE_HEADER.captures_iter(content).collect();
    let mut table = SpinOrbitTable::default();

    for (i, caps) in headers.iter().enumerate() {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(content.len());
        let segment = &content[whole.end..end];

        let mut lines = segment.lines().skip(1).peekable();

        let mut equivalent = Vec::new();
        while let Some(line) = lines.peek() {
            if !is_index_line(line) {
                break;
            }
            equivalent.push(*line);
            lines.next();
        }

        let eigen_lines: Vec<&str> = lines.take_while(|l| !l.trim().is_empty()).collect();

        if equivalent.is_empty() || eigen_lines.is_empty() {
            debug!("skipping incomplete PLUSSOC block for K point {}", &caps[1]);
            continue;
        }

        let eigenvalues = normalize_ws(&eigen_lines.join(" "))
            .split(' ')
            .map(|t| parse_f64(t, "PLUSSOC eigenvalues"))
            .collect::<Result<Vec<f64>>>()?;

        table.rows.push(SpinOrbitRow {
            k_point_number: parse_usize(&caps[1], "PLUSSOC k point")?,
            equivalent_k_points: normalize_ws(&equivalent.join(" ")),
            eigenvalues,
        });
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpexError;

    const PLUSSOC_OUT: &str = "
Eigenvalues with spin-orbit coupling

K point   1 ->   1
    1
  -5.70123  -5.70123   6.12345   6.12345
   6.23456   6.23456

K point   2 ->   2
    2    3    4    5
    6    7
  -3.10000  -3.10000
   7.00000   7.00000

Timing (PLUSSOC):      12.3
";

    #[test]
    fn test_parse_plussoc() {
        let table = parse_plussoc(PLUSSOC_OUT).unwrap();
        assert_eq!(table.rows.len(), 2);

        let first = &table.rows[0];
        assert_eq!(first.k_point_number, 1);
        assert_eq!(first.equivalent_k_points, "1");
        assert_eq!(first.eigenvalues.len(), 6);
        assert!((first.eigenvalues[5] - 6.23456).abs() < 1e-12);

        let second = &table.rows[1];
        assert_eq!(second.equivalent_k_points, "2 3 4 5 6 7");
        assert_eq!(second.eigenvalues, vec![-3.1, -3.1, 7.0, 7.0]);
    }

    #[test]
    fn test_no_plussoc_blocks() {
        let table = parse_plussoc("no spin-orbit output here").unwrap();
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_bad_eigenvalue() {
        let text = "K point 1 -> 1\n  1\n  -5.7 abc\n";
        assert!(matches!(
            parse_plussoc(text),
            Err(SpexError::InvalidFormat(_))
        ));
    }
}
