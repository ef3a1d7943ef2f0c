//! # 投影能带 (spex.binfo) 解析器
//!
//! 每行数据为 `band energy` 加上每个原子 s/p/d/f/g 五个权重，
//! 列数必须为 `2 + 5 * 原子数`。原子标签来自 spex.out 的晶胞几何。
//!
//! `# k point N: (x,y,z)` 注释单独收集为 k 点列表，与数据块只按出现顺序对应。
//!
//! ## 依赖关系
//! - 被 `registry.rs` 使用
//! - 使用 `models/tables.rs`, `models/output.rs`

use super::{parse_f64, parse_usize, parse_vec3, strip_comment};
use crate::error::{Result, SpexError};
use crate::models::{OrbitalWeights, ProjectionRow, ProjectionTable, UnitCellInfo};

use regex::Regex;
use std::sync::LazyLock;

static RE_KPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"k point \d+: \((.*)\)").unwrap());

/// 解析 spex.binfo
pub fn parse_projection(content: &str, unit_cell: &UnitCellInfo) -> Result<ProjectionTable> {
    let atoms = unit_cell.atom_labels();
    if atoms.is_empty() {
        return Err(SpexError::missing("unit cell geometry"));
    }
    let expected = 2 + 5 * atoms.len();

    let mut kpoints = Vec::new();
    let mut rows = Vec::new();

    for line in content.lines() {
        if let Some(caps) = RE_KPOINT.captures(line) {
            kpoints.push(parse_vec3(&caps[1], "projection k point")?);
        }

        let parts: Vec<&str> = strip_comment(line).split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts.len() != expected {
            return Err(SpexError::InvalidFormat(format!(
                "projection: expected {} columns for {} atoms, found {}",
                expected,
                atoms.len(),
                parts.len()
            )));
        }

        let mut weights = Vec::with_capacity(atoms.len());
        for chunk in parts[2..].chunks(5) {
            let mut w: OrbitalWeights = [0.0; 5];
            for (slot, token) in w.iter_mut().zip(chunk) {
                *slot = parse_f64(token, "projection weight")?;
            }
            weights.push(w);
        }

        rows.push(ProjectionRow {
            band: parse_usize(parts[0], "projection band")?,
            energy: parse_f64(parts[1], "projection energy")?,
            block: kpoints.len().checked_sub(1),
            weights,
        });
    }

    Ok(ProjectionTable {
        atoms,
        rows,
        kpoints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AtomSite;

    fn silicon() -> UnitCellInfo {
        UnitCellInfo {
            unitcell_geometry: vec![
                AtomSite {
                    index: 1,
                    atom_type: 1,
                    element: "Si".to_string(),
                    position: [0.125, 0.125, 0.125],
                },
                AtomSite {
                    index: 2,
                    atom_type: 1,
                    element: "Si".to_string(),
                    position: [-0.125, -0.125, -0.125],
                },
            ],
            ..Default::default()
        }
    }

    const BINFO: &str = "\
# k point 1: (0.000000,0.000000,0.000000)
  1  -5.7012  0.50 0.00 0.00 0.00 0.00  0.50 0.00 0.00 0.00 0.00
  2   6.1234  0.00 0.40 0.10 0.00 0.00  0.00 0.40 0.10 0.00 0.00

# k point 2: (0.500000,0.500000,0.000000)
  1  -3.1000  0.30 0.20 0.00 0.00 0.00  0.30 0.20 0.00 0.00 0.00
";

    #[test]
    fn test_parse_projection() {
        let table = parse_projection(BINFO, &silicon()).unwrap();
        assert_eq!(table.atoms, vec!["Si", "Si"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.kpoints, vec![[0.0, 0.0, 0.0], [0.5, 0.5, 0.0]]);
        assert_eq!(table.column_labels().len(), 12);

        let row = &table.rows[1];
        assert_eq!(row.band, 2);
        assert_eq!(row.block, Some(0));
        assert!((row.weights[1][2] - 0.10).abs() < 1e-12);
        assert_eq!(table.rows[2].block, Some(1));
    }

    #[test]
    fn test_requires_geometry() {
        let err = parse_projection(BINFO, &UnitCellInfo::default()).unwrap_err();
        assert!(matches!(err, SpexError::MissingDependency { .. }));
    }

    #[test]
    fn test_column_count_must_match_atoms() {
        let text = "  1  -5.7  0.5 0.0 0.0 0.0 0.0\n";
        let err = parse_projection(text, &silicon()).unwrap_err();
        assert!(matches!(err, SpexError::InvalidFormat(_)));
    }
}
