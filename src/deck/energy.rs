//! # 能量重启文件写出
//!
//! 从已解析的能量表中选出一列（如 GW 或 KS），写成 SPEX 的 `ENERGY` 文件。
//!
//! ## 格式
//! ```text
//! # SPEX energy file generated by spexkit v0.1.0
//! # selected column: GW
//! # band kpt spin energy
//!   1  1 1  -6.29170
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/energy.rs` 使用
//! - 使用 `models/tables.rs` 的 EnergyColumns

use crate::error::{Result, SpexError};
use crate::models::EnergyColumns;

/// 按列生成能量文件文本，列名大小写不敏感
pub fn make_energy_input<R: EnergyColumns>(rows: &[R], column: &str) -> Result<String> {
    let known = R::COLUMNS.iter().any(|c| c.eq_ignore_ascii_case(column));
    if !known {
        return Err(SpexError::ColumnNotFound {
            column: column.to_string(),
            available: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
        });
    }

    let mut out = format!(
        "# SPEX energy file generated by spexkit v{}\n# selected column: {}\n# band kpt spin energy\n",
        env!("CARGO_PKG_VERSION"),
        column
    );

    for row in rows {
        let key = row.key();
        let value = row.column(column).ok_or_else(|| SpexError::ColumnNotFound {
            column: column.to_string(),
            available: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
        })?;
        out.push_str(&format!(
            "  {} {:>2} {} {:9.5}\n",
            key.band, key.k_point, key.spin, value
        ));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GwRealRow, KsRow};

    fn ks_rows() -> Vec<KsRow> {
        vec![
            KsRow {
                band: 1,
                k_point: 1,
                spin: 1,
                vxc: -11.2,
                ks: -5.70123,
            },
            KsRow {
                band: 2,
                k_point: 12,
                spin: 2,
                vxc: -10.9,
                ks: 6.1,
            },
        ]
    }

    #[test]
    fn test_missing_column_lists_available() {
        let err = make_energy_input(&ks_rows(), "GW").unwrap_err();
        match err {
            SpexError::ColumnNotFound { column, available } => {
                assert_eq!(column, "GW");
                assert_eq!(available, vec!["vxc", "KS"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fixed_width_lines() {
        let text = make_energy_input(&ks_rows(), "KS").unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2 + 3);
        assert!(lines.iter().take(3).all(|l| l.starts_with('#')));
        assert_eq!(lines[3], "  1  1 1  -5.70123");
        assert_eq!(lines[4], "  2 12 2   6.10000");
    }

    #[test]
    fn test_gw_column() {
        let row = GwRealRow {
            band: 4,
            k_point: 2,
            spin: 1,
            vxc: -11.1,
            sigma_x: -17.5,
            sigma_c: 5.9,
            z: 0.76,
            ks: -5.7,
            hf: -12.1,
            gw: -6.2917,
            lin_dir: -6.4,
        };
        let text = make_energy_input(&[row], "gw").unwrap();
        assert!(text.ends_with("  4  2 1  -6.29170\n"));
    }

    #[test]
    fn test_empty_table_has_only_headers() {
        let text = make_energy_input::<KsRow>(&[], "KS").unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
