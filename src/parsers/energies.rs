//! # GW / KS 对角元解析器
//!
//! 按 k 点列表顺序定位 spex.out 中的 `K POINT: N` 块并解码对角元表。
//!
//! ## 块格式
//! ```text
//! ##################
//! ##### K POINT:   1 #####
//! ##################
//!
//!
//! --- DIAGONAL ELEMENTS [eV] ---
//!
//!  Bd     vxc   sigmax   sigmac      Z     KS     HF     GW  lin/dir
//!   4  -11.12  -17.54     5.99   0.77  -5.70 -12.12  -6.30  -6.42
//!                         0.03   0.01                 0.02   0.05
//! ```
//! 每个能带占两行：实部一行（全部列），虚部一行（sigmac, Z, GW, lin/dir）。
//! 双自旋计算中同一块内的行按 自旋1/自旋2 交替。
//!
//! ## 依赖关系
//! - 被 `registry.rs` 使用
//! - 依赖 `parsers/spex_out.rs` 先解析出 k 点列表和自旋数
//! - 使用 `models/tables.rs`

use super::{parse_f64, parse_usize};
use crate::error::{Result, SpexError};
use crate::models::{GwImagRow, GwRealRow, GwTable, KsRow, KsTable, LatticeInfo, UnitCellInfo};

use log::debug;
use regex::Regex;

/// 对角元表的行布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// 每个能带一行实部加一行虚部
    Paired,
    /// 每个能带一行
    Single,
}

/// 一种对角元表的列定义
struct TableFormat {
    name: &'static str,
    header: &'static str,
    real_columns: usize,
    /// 虚部行的列数；`None` 表示虚部行不解码
    imag_columns: Option<usize>,
}

const GW_FORMAT: TableFormat = TableFormat {
    name: "GW",
    header: r"Bd[ \t]+vxc[ \t]+sigmax[ \t]+sigmac[ \t]+Z[ \t]+KS[ \t]+HF[ \t]+GW[ \t]+lin/dir",
    real_columns: 9,
    imag_columns: Some(4),
};

const KS_FORMAT: TableFormat = TableFormat {
    name: "KS",
    header: r"Bd[ \t]+vxc[ \t]+KS",
    real_columns: 3,
    imag_columns: None,
};

/// 双自旋时块内奇数位置为自旋 2
fn spin_for(position: usize, number_of_spins: usize) -> u8 {
    if number_of_spins == 2 && position % 2 == 1 {
        2
    } else {
        1
    }
}

/// 定位 `K POINT: label` 块，返回表格行（已拆分为 token）
fn kpoint_block<'a>(content: &'a str, label: &str, format: &TableFormat) -> Result<Vec<Vec<&'a str>>> {
    let pattern = format!(
        concat!(
            r"#{{2,}}[ \t]*\n",
            r"#{{2,}}[ \t]+K POINT:[ \t]+{label}[ \t]+#{{2,}}[ \t]*\n",
            r"#{{2,}}[ \t]*\n",
            r"(?:[ \t]*\n)*",
            r"[ \t]*-{{3}}[ \t]*DIAGONAL ELEMENTS \[eV\][ \t]*-{{3}}[ \t]*\n",
            r"(?:[ \t]*\n)*",
            r"[ \t]*{header}[ \t]*\n",
            r"((?:[^\n]*\S[^\n]*(?:\n|$))*)"
        ),
        label = regex::escape(label),
        header = format.header,
    );
    let re = Regex::new(&pattern).map_err(|e| SpexError::Other(e.to_string()))?;

    let caps = re.captures(content).ok_or_else(|| {
        SpexError::not_found(format!("{} table for K POINT {}", format.name, label))
    })?;
    let body = caps.get(1).map(|m| m.as_str()).unwrap_or("");

    Ok(body
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .filter(|tokens| !tokens.is_empty())
        .collect())
}

fn is_band_row(tokens: &[&str], columns: usize) -> bool {
    tokens.len() == columns && tokens[0].parse::<usize>().is_ok()
}

/// 检查块的行布局，不符合时报错而不是按固定步长误读
fn detect_layout(rows: &[Vec<&str>], format: &TableFormat, label: &str) -> Result<RowLayout> {
    let paired = rows.len() % 2 == 0
        && rows.iter().enumerate().all(|(i, tokens)| {
            if i % 2 == 0 {
                is_band_row(tokens, format.real_columns)
            } else {
                match format.imag_columns {
                    Some(n) => tokens.len() == n,
                    None => !is_band_row(tokens, format.real_columns),
                }
            }
        });
    if paired {
        return Ok(RowLayout::Paired);
    }

    if format.imag_columns.is_none() && rows.iter().all(|t| is_band_row(t, format.real_columns)) {
        debug!("{} table for K POINT {} has one line per band", format.name, label);
        return Ok(RowLayout::Single);
    }

    Err(SpexError::InvalidFormat(format!(
        "{} table for K POINT {}: rows do not follow the real/imaginary layout ({} real columns)",
        format.name, label, format.real_columns
    )))
}

fn k_point_list(cell: &UnitCellInfo) -> Result<&[crate::models::KPoint]> {
    if cell.list_of_k_points.is_empty() {
        return Err(SpexError::missing("list of k points"));
    }
    Ok(&cell.list_of_k_points)
}

fn floats(tokens: &[&str], field: &str) -> Result<Vec<f64>> {
    tokens.iter().map(|t| parse_f64(t, field)).collect()
}

/// 解析 GW 对角元（实部与虚部两张表）
pub fn parse_gw_energies(
    content: &str,
    lattice: &LatticeInfo,
    cell: &UnitCellInfo,
) -> Result<GwTable> {
    let mut table = GwTable::default();

    for kpoint in k_point_list(cell)? {
        let k_point = parse_usize(&kpoint.label, "k point label")?;
        let rows = kpoint_block(content, &kpoint.label, &GW_FORMAT)?;
        detect_layout(&rows, &GW_FORMAT, &kpoint.label)?;

        for (position, pair) in rows.chunks(2).enumerate() {
            let band = parse_usize(pair[0][0], "GW band")?;
            let spin = spin_for(position, lattice.number_of_spins);
            let re = floats(&pair[0][1..], "GW real part")?;
            let im = floats(&pair[1], "GW imaginary part")?;

            table.real.push(GwRealRow {
                band,
                k_point,
                spin,
                vxc: re[0],
                sigma_x: re[1],
                sigma_c: re[2],
                z: re[3],
                ks: re[4],
                hf: re[5],
                gw: re[6],
                lin_dir: re[7],
            });
            table.imag.push(GwImagRow {
                band,
                k_point,
                spin,
                sigma_c: im[0],
                z: im[1],
                gw: im[2],
                lin_dir: im[3],
            });
        }
    }

    Ok(table)
}

/// 解析只有 KS 能量的对角元
pub fn parse_ks_energies(
    content: &str,
    lattice: &LatticeInfo,
    cell: &UnitCellInfo,
) -> Result<KsTable> {
    let mut table = KsTable::default();

    for kpoint in k_point_list(cell)? {
        let k_point = parse_usize(&kpoint.label, "k point label")?;
        let rows = kpoint_block(content, &kpoint.label, &KS_FORMAT)?;
        let step = match detect_layout(&rows, &KS_FORMAT, &kpoint.label)? {
            RowLayout::Paired => 2,
            RowLayout::Single => 1,
        };

        for (position, tokens) in rows.iter().step_by(step).enumerate() {
            let values = floats(&tokens[1..], "KS energies")?;
            table.rows.push(KsRow {
                band: parse_usize(tokens[0], "KS band")?,
                k_point,
                spin: spin_for(position, lattice.number_of_spins),
                vxc: values[0],
                ks: values[1],
            });
        }
    }

    Ok(table)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::KPoint;

    pub(crate) const GW_HEADER: &str =
        " Bd       vxc    sigmax    sigmac         Z        KS        HF        GW   lin/dir ";
    const KS_HEADER: &str = " Bd       vxc        KS ";

    pub(crate) fn block(label: &str, header: &str, rows: &str) -> String {
        format!(
            "##################################\n\
             ##### K POINT:   {} #####\n\
             ##################################\n\n\n\
             --- DIAGONAL ELEMENTS [eV] ---\n\n\
             {}\n{}\n",
            label, header, rows
        )
    }

    pub(crate) const GW_ROWS_K1: &str = "  4  -11.12345 -17.54321   5.98765   0.76543  -5.70123 -12.12345  -6.30123  -6.42345
                          0.03456   0.01234             0.02345   0.05432
  5  -10.00000 -15.00000   4.00000   0.80000  -2.00000  -9.00000  -3.00000  -3.10000
                          0.01000   0.00500             0.00800   0.00900";

    pub(crate) const GW_ROWS_K2: &str = "  4  -11.00000 -17.00000   5.50000   0.75000  -5.00000 -12.00000  -6.00000  -6.10000
                          0.02000   0.01000             0.03000   0.04000
  5   -9.00000 -14.00000   3.50000   0.79000  -1.50000  -8.50000  -2.50000  -2.60000
                          0.01100   0.00600             0.00700   0.00800";

    pub(crate) fn lattice(spins: usize) -> LatticeInfo {
        LatticeInfo {
            number_of_spins: spins,
            number_of_centers: 2,
            number_of_types: 1,
            equivalent_atoms: None,
            lattice_parameter: 10.26,
            primitive_vectors: [[0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0]],
            unit_cell_volume: 270.0114,
            reciprocal_vectors: [[-1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, -1.0]],
            reciprocal_volume: 0.9188,
            reciprocal_cutoff: None,
        }
    }

    pub(crate) fn cell(labels: &[&str]) -> UnitCellInfo {
        UnitCellInfo {
            list_of_k_points: labels
                .iter()
                .map(|l| KPoint {
                    label: l.to_string(),
                    coords: [0.0, 0.0, 0.0],
                })
                .collect(),
            ..Default::default()
        }
    }

    pub(crate) fn gw_output() -> String {
        format!(
            "preamble\n{}\nTiming (quasiparticle equation)\n\n{}\n",
            block("1", GW_HEADER, GW_ROWS_K1),
            block("2", GW_HEADER, GW_ROWS_K2)
        )
    }

    #[test]
    fn test_parse_gw_energies() {
        let table = parse_gw_energies(&gw_output(), &lattice(1), &cell(&["1", "2"])).unwrap();

        // 2 bands x 2 k points
        assert_eq!(table.real.len(), 4);
        assert_eq!(table.imag.len(), table.real.len());

        let first = &table.real[0];
        assert_eq!((first.band, first.k_point, first.spin), (4, 1, 1));
        assert!((first.gw + 6.30123).abs() < 1e-9);
        assert!((first.lin_dir + 6.42345).abs() < 1e-9);

        let imag = &table.imag[0];
        assert_eq!(imag.band, 4);
        assert!((imag.sigma_c - 0.03456).abs() < 1e-9);
        assert!((imag.lin_dir - 0.05432).abs() < 1e-9);

        // k 点主序，能带次序
        let order: Vec<(usize, usize)> = table.real.iter().map(|r| (r.k_point, r.band)).collect();
        assert_eq!(order, vec![(1, 4), (1, 5), (2, 4), (2, 5)]);
        assert!(table.real.iter().all(|r| r.spin == 1));
    }

    #[test]
    fn test_spin_alternation() {
        let table = parse_gw_energies(&gw_output(), &lattice(2), &cell(&["1", "2"])).unwrap();
        for (i, row) in table.real.iter().enumerate() {
            assert_eq!(row.spin, if i % 2 == 0 { 1 } else { 2 });
            assert_eq!(table.imag[i].spin, row.spin);
        }
    }

    #[test]
    fn test_k_point_label_is_matched_exactly() {
        let text = block("12", GW_HEADER, GW_ROWS_K1);
        let err = parse_gw_energies(&text, &lattice(1), &cell(&["1"])).unwrap_err();
        assert!(matches!(err, SpexError::PatternNotFound { .. }));
    }

    #[test]
    fn test_missing_k_point_list() {
        let err = parse_gw_energies(&gw_output(), &lattice(1), &UnitCellInfo::default())
            .unwrap_err();
        assert!(matches!(err, SpexError::MissingDependency { .. }));
    }

    #[test]
    fn test_broken_stride_is_rejected() {
        let rows = "  4  -11.1 -17.5 5.9 0.7 -5.7 -12.1 -6.3 -6.4
  5  -10.0 -15.0 4.0 0.8 -2.0 -9.0 -3.0 -3.1";
        let text = block("1", GW_HEADER, rows);
        let err = parse_gw_energies(&text, &lattice(1), &cell(&["1"])).unwrap_err();
        assert!(matches!(err, SpexError::InvalidFormat(_)));
    }

    #[test]
    fn test_parse_ks_energies_paired() {
        let rows = "  1  -10.50000  -5.20000
                     0.00000
  2   -9.50000  -1.20000
                     0.00000";
        let text = block("1", KS_HEADER, rows);
        let table = parse_ks_energies(&text, &lattice(1), &cell(&["1"])).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].band, 2);
        assert!((table.rows[1].ks + 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_parse_ks_energies_single_line() {
        let rows = "  1  -10.50000  -5.20000
  1  -10.40000  -5.10000
  2   -9.50000  -1.20000
  2   -9.40000  -1.10000";
        let text = block("3", KS_HEADER, rows);
        let table = parse_ks_energies(&text, &lattice(2), &cell(&["3"])).unwrap();
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[1].spin, 2);
        assert_eq!(table.rows[2].spin, 1);
        assert!(table.rows.iter().all(|r| r.k_point == 3));
    }

    #[test]
    fn test_ks_parser_ignores_gw_tables() {
        let err = parse_ks_energies(&gw_output(), &lattice(1), &cell(&["1"])).unwrap_err();
        assert!(matches!(err, SpexError::PatternNotFound { .. }));
    }
}
