//! # SPEX spex.out 元数据解析器
//!
//! 从 spex.out 中提取运行信息、晶格信息、晶胞与 k 点信息以及能隙/费米能。
//!
//! ## spex.out 相关片段
//! ```text
//! Version 05.00 (2023-01-13)
//! Number of spins       =  1
//! Number of types =  1     centers =  2
//! Lattice parameter     =   10.2600
//! Primitive vectors     =    0.000000   0.500000   0.500000
//!                            0.500000   0.000000   0.500000
//!                            0.500000   0.500000   0.000000
//!   #  Ty  El  Coord.
//!   1   1  Si    0.125000  0.125000  0.125000
//! List of k points
//!   1  (0.000000,0.000000,0.000000)  [ 0.000, 0.000, 0.000]  eq:  1
//! ```
//!
//! ## 依赖关系
//! - 被 `registry.rs`, `commands/parse.rs`, `commands/collect.rs` 使用
//! - 使用 `models/output.rs`

use super::{
    block_after, capture_all, capture_first, lines_after, parse_f64, parse_matrix3, parse_usize,
    parse_vec3,
};
use crate::error::{Result, SpexError};
use crate::models::{
    AtomSite, EnergySummary, IbzKPoint, KPoint, LatticeInfo, RunMetadata, SpexOutput,
    UnitCellInfo,
};

use log::debug;
use regex::Regex;
use std::sync::LazyLock;

// ─────────────────────────────────────────────────────────────
// 运行信息
// ─────────────────────────────────────────────────────────────

static RE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version\s*(\d+[.]\d+\s*\(.*\))").unwrap());
static RE_EXECUTION_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Execution time:[ \t]*(.*)").unwrap());
static RE_COMPILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Compiler:[ \t]*(.*)").unwrap());
static RE_HOSTNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Hostname:[ \t]*(.*)").unwrap());
static RE_INTERFACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Interfaced to[ \t]*(.*)").unwrap());
static RE_MPI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"MPI:[ \t]*(.*)").unwrap());
static RE_WALLTIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)Timing:\s*([0-9]+)[ \t]*$").unwrap());

// ─────────────────────────────────────────────────────────────
// 晶格信息
// ─────────────────────────────────────────────────────────────

static RE_SPINS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Number of spins\s*=\s*(\d+)").unwrap());
static RE_CENTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"centers\s*=\s*(\d+)").unwrap());
static RE_TYPES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"types\s*=\s*(\d+)").unwrap());
static RE_EQUIVALENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"equivalent atoms\s*=[ \t]*(.*)").unwrap());
static RE_LATTICE_PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Lattice parameter\s*=\s*(\d+\.\d+)").unwrap());
static RE_PRIMITIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Primitive vectors\s*=((?:\s*.*){3})").unwrap());
static RE_CELL_VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Unit-cell volume\s*=\s*(\d+\.\d+)").unwrap());
static RE_RECIPROCAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Reciprocal vectors\s*=((?:\s*.*){3})").unwrap());
static RE_RECIPROCAL_VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Reciprocal volume\s*=\s*(\d+\.\d+)").unwrap());
static RE_RECIPROCAL_CUTOFF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Reciprocal cutoff\s*=\s*(\d+\.\d+)").unwrap());

// ─────────────────────────────────────────────────────────────
// 晶胞与 k 点信息
// ─────────────────────────────────────────────────────────────

static RE_GEOMETRY_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[ \t]+Ty[ \t]+El[ \t]+Coord\.").unwrap());
static RE_SYMMETRY_OPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Number of symmetry operations\s*=\s*(\d+)").unwrap());
static RE_VALENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Number of valence electrons:\s*(\d+)").unwrap());
static RE_NKPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Number of k points:\s+(\d+)").unwrap());
static RE_NKPT_IBZ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"in IBZ:\s+(\d+)").unwrap());
static RE_KPT_LIST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"List of k points").unwrap());
static RE_IBZ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+)\s+\(((?:-?\d+\.\d+,?){3})\)\s+\[\s?((?:\s?-?\d+\.\d+,?\s?){3})\]\s+eq:\s+(\d+)",
    )
    .unwrap()
});

// ─────────────────────────────────────────────────────────────
// 能量信息
// ─────────────────────────────────────────────────────────────

static RE_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Energy gap:\s+(-?\d+\.\d+)\s+Ha").unwrap());
static RE_FERMI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Fermi energy:\s+(-?\d+\.\d+)\s+Ha").unwrap());
static RE_MAXIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Maximal energy:\s+(-?\d+\.\d+)\s+Ha").unwrap());

/// 解析运行信息，所有字段均为可选
pub fn parse_run_info(content: &str) -> RunMetadata {
    let walltime = capture_first(&RE_WALLTIME, content).and_then(|s| s.parse::<u64>().ok());

    RunMetadata {
        version: capture_first(&RE_VERSION, content),
        execution_time: capture_first(&RE_EXECUTION_TIME, content),
        compiler: capture_first(&RE_COMPILER, content),
        hostname: capture_first(&RE_HOSTNAME, content),
        interfaced_to: capture_first(&RE_INTERFACED, content),
        mpi: capture_first(&RE_MPI, content),
        walltime,
    }
}

/// 必需字段
fn required(re: &Regex, content: &str, field: &str) -> Result<String> {
    capture_first(re, content).ok_or_else(|| SpexError::not_found(field))
}

/// 解析晶格信息
pub fn parse_lattice_info(content: &str) -> Result<LatticeInfo> {
    let number_of_spins = parse_usize(
        &required(&RE_SPINS, content, "number_of_spins")?,
        "number_of_spins",
    )?;
    if !(1..=2).contains(&number_of_spins) {
        return Err(SpexError::InvalidFormat(format!(
            "number_of_spins must be 1 or 2, found {}",
            number_of_spins
        )));
    }

    let number_of_centers = parse_usize(
        &required(&RE_CENTERS, content, "number_of_centers")?,
        "number_of_centers",
    )?;
    let number_of_types = parse_usize(
        &required(&RE_TYPES, content, "number_of_types")?,
        "number_of_types",
    )?;
    let lattice_parameter = parse_f64(
        &required(&RE_LATTICE_PARAMETER, content, "lattice_parameter")?,
        "lattice_parameter",
    )?;
    let primitive_vectors = parse_matrix3(
        &required(&RE_PRIMITIVE, content, "primitive_vectors")?,
        "primitive_vectors",
    )?;
    let unit_cell_volume = parse_f64(
        &required(&RE_CELL_VOLUME, content, "unit_cell_volume")?,
        "unit_cell_volume",
    )?;
    let reciprocal_vectors = parse_matrix3(
        &required(&RE_RECIPROCAL, content, "reciprocal_vectors")?,
        "reciprocal_vectors",
    )?;
    let reciprocal_volume = parse_f64(
        &required(&RE_RECIPROCAL_VOLUME, content, "reciprocal_volume")?,
        "reciprocal_volume",
    )?;

    let reciprocal_cutoff = match capture_first(&RE_RECIPROCAL_CUTOFF, content) {
        Some(s) => Some(parse_f64(&s, "reciprocal_cutoff")?),
        None => None,
    };

    Ok(LatticeInfo {
        number_of_spins,
        number_of_centers,
        number_of_types,
        equivalent_atoms: capture_first(&RE_EQUIVALENT, content),
        lattice_parameter,
        primitive_vectors,
        unit_cell_volume,
        reciprocal_vectors,
        reciprocal_volume,
        reciprocal_cutoff,
    })
}

/// 可选整数字段
fn optional_usize(re: &Regex, content: &str, field: &str) -> Result<Option<usize>> {
    match capture_first(re, content) {
        Some(s) => Ok(Some(parse_usize(&s, field)?)),
        None => Ok(None),
    }
}

/// 解析晶胞与 k 点信息
///
/// 原子坐标块的行数由 `centers = N` 决定，因此坐标块存在时中心数是必需的。
pub fn parse_unit_cell_info(content: &str) -> Result<UnitCellInfo> {
    let number_of_centers = optional_usize(&RE_CENTERS, content, "number_of_centers")?;

    let unitcell_geometry = if RE_GEOMETRY_HEADER.is_match(content) {
        let n = number_of_centers.ok_or_else(|| SpexError::missing("number_of_centers"))?;
        parse_geometry(content, n)?
    } else {
        debug!("no '# Ty El Coord.' block, unit cell geometry left empty");
        Vec::new()
    };

    let mut info = UnitCellInfo {
        unitcell_geometry,
        number_of_symmetry_operations: optional_usize(
            &RE_SYMMETRY_OPS,
            content,
            "number_of_symmetry_operations",
        )?,
        number_of_valence_electrons: optional_usize(
            &RE_VALENCE,
            content,
            "number_of_valence_electrons",
        )?,
        number_of_k_points: optional_usize(&RE_NKPT, content, "number_of_k_points")?,
        number_of_k_points_in_ibz: optional_usize(
            &RE_NKPT_IBZ,
            content,
            "number_of_k_points_in_ibz",
        )?,
        list_of_k_points: Vec::new(),
        k_points_in_ibz: parse_ibz_k_points(content)?,
    };

    if let Some(lines) = block_after(&RE_KPT_LIST, content) {
        info.list_of_k_points = parse_k_point_lines(&lines)?;
    }

    check_k_point_counts(&info)?;
    Ok(info)
}

/// 原子坐标块：标题行之后的 n 行，每行 6 列
fn parse_geometry(content: &str, n: usize) -> Result<Vec<AtomSite>> {
    let lines = lines_after(&RE_GEOMETRY_HEADER, content, n).unwrap_or_default();
    if lines.len() < n {
        return Err(SpexError::InvalidFormat(format!(
            "unit cell geometry: expected {} rows, found {}",
            n,
            lines.len()
        )));
    }

    lines
        .iter()
        .map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 6 {
                return Err(SpexError::InvalidFormat(format!(
                    "unit cell geometry: expected 6 columns in '{}'",
                    line.trim()
                )));
            }
            Ok(AtomSite {
                index: parse_usize(parts[0], "unit cell geometry")?,
                atom_type: parse_usize(parts[1], "unit cell geometry")?,
                element: parts[2].to_string(),
                position: [
                    parse_f64(parts[3], "unit cell geometry")?,
                    parse_f64(parts[4], "unit cell geometry")?,
                    parse_f64(parts[5], "unit cell geometry")?,
                ],
            })
        })
        .collect()
}

/// `List of k points` 的各行
///
/// 坐标可以是括号形式 `(x,y,z)`，也可以是编号后面的三列数值。
/// 第一个非整数开头的行结束该块。
fn parse_k_point_lines(lines: &[&str]) -> Result<Vec<KPoint>> {
    let mut kpoints = Vec::new();

    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let label = match parts.first() {
            Some(first) if first.parse::<usize>().is_ok() => first.to_string(),
            _ => {
                debug!("k point list ends at '{}'", line.trim());
                break;
            }
        };

        let coords = match (line.find('('), line.find(')')) {
            (Some(open), Some(close)) if open < close => {
                parse_vec3(&line[open + 1..close], "list of k points")?
            }
            _ => {
                if parts.len() < 4 {
                    return Err(SpexError::InvalidFormat(format!(
                        "list of k points: expected index and 3 coordinates in '{}'",
                        line.trim()
                    )));
                }
                [
                    parse_f64(parts[1], "list of k points")?,
                    parse_f64(parts[2], "list of k points")?,
                    parse_f64(parts[3], "list of k points")?,
                ]
            }
        };

        kpoints.push(KPoint { label, coords });
    }

    Ok(kpoints)
}

/// IBZ 中的 k 点，`N (x,y,z) [a, b, c] eq: M`
fn parse_ibz_k_points(content: &str) -> Result<Vec<IbzKPoint>> {
    RE_IBZ
        .captures_iter(content)
        .map(|caps| {
            Ok(IbzKPoint {
                index: parse_usize(&caps[1], "k points in IBZ")?,
                coordinates: parse_vec3(&caps[2], "k points in IBZ")?,
                reciprocal_lattice: parse_vec3(&caps[3], "k points in IBZ")?,
                equivalent: parse_usize(&caps[4], "k points in IBZ")?,
            })
        })
        .collect()
}

/// k 点列表长度须与总 k 点数（或 IBZ k 点数）一致，IBZ 表不多于完整列表
fn check_k_point_counts(info: &UnitCellInfo) -> Result<()> {
    let listed = info.list_of_k_points.len();
    if listed == 0 {
        return Ok(());
    }

    let declared = [info.number_of_k_points, info.number_of_k_points_in_ibz];
    if declared.iter().any(|d| d.is_some()) && !declared.contains(&Some(listed)) {
        return Err(SpexError::InvalidFormat(format!(
            "list of k points has {} entries, header declares {:?} (IBZ {:?})",
            listed, info.number_of_k_points, info.number_of_k_points_in_ibz
        )));
    }

    if info.k_points_in_ibz.len() > listed {
        return Err(SpexError::InvalidFormat(format!(
            "{} IBZ k points but only {} listed k points",
            info.k_points_in_ibz.len(),
            listed
        )));
    }

    Ok(())
}

/// 解析能隙、费米能和最大能量
pub fn parse_energy_summary(content: &str) -> EnergySummary {
    let floats = |re: &Regex| -> Vec<f64> {
        capture_all(re, content)
            .iter()
            .filter_map(|s| s.parse::<f64>().ok())
            .collect()
    };

    let mut summary = EnergySummary {
        energy_gap: floats(&RE_GAP),
        fermi_energy: floats(&RE_FERMI),
        maximal_energy: floats(&RE_MAXIMAL),
        energy_unit: None,
    };
    if !summary.is_empty() {
        summary.energy_unit = Some("Ha".to_string());
    }
    summary
}

/// 解析完整的 spex.out
pub fn parse_spex_output(content: &str) -> Result<SpexOutput> {
    Ok(SpexOutput {
        run: parse_run_info(content),
        lattice: parse_lattice_info(content)?,
        unit_cell: parse_unit_cell_info(content)?,
        summary: parse_energy_summary(content),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SPEX_OUT: &str = r#"
################################################################################
#####                              SPEX                                    #####
################################################################################

Version 05.00 (2023-01-13)
Execution time: 2023-05-04   12:33:01
Compiler: Intel ifort 2021.5
Hostname: node042
Interfaced to FLEUR (MaX-R6)
MPI: 8 processes

Number of spins       =  1
Number of types       =  1     centers =  2
equivalent atoms      =  1 1
Lattice parameter     =   10.2600
Primitive vectors     =    0.000000   0.500000   0.500000
                           0.500000   0.000000   0.500000
                           0.500000   0.500000   0.000000
Unit-cell volume      =   270.0114
Reciprocal vectors    =   -1.000000   1.000000   1.000000
                           1.000000  -1.000000   1.000000
                           1.000000   1.000000  -1.000000
Reciprocal volume     =     0.9188
Reciprocal cutoff     =     4.5000

  #  Ty  El  Coord.
  1   1  Si    0.125000  0.125000  0.125000
  2   1  Si   -0.125000 -0.125000 -0.125000

Number of symmetry operations =   48
Number of valence electrons:   8
Number of k points:   2 ; in IBZ:   2

List of k points
  1  (0.000000,0.000000,0.000000)  [ 0.000, 0.000, 0.000]  eq:  1
  2  (0.500000,0.000000,0.000000)  [ 0.500, 0.000, 0.500]  eq:  1

Fermi energy:    0.21456 Ha
Energy gap:      0.02345 Ha
Maximal energy:  1.50000 Ha

Timing: 1234
"#;

    #[test]
    fn test_parse_run_info() {
        let run = parse_run_info(SPEX_OUT);
        assert_eq!(run.version.as_deref(), Some("05.00 (2023-01-13)"));
        assert_eq!(run.execution_time.as_deref(), Some("2023-05-04 12:33:01"));
        assert_eq!(run.hostname.as_deref(), Some("node042"));
        assert_eq!(run.interfaced_to.as_deref(), Some("FLEUR (MaX-R6)"));
        assert_eq!(run.mpi.as_deref(), Some("8 processes"));
        assert_eq!(run.walltime, Some(1234));
    }

    #[test]
    fn test_run_info_absent_fields_stay_empty() {
        let run = parse_run_info("Hostname: login1\n");
        assert_eq!(run.hostname.as_deref(), Some("login1"));
        assert!(run.version.is_none());
        assert!(run.walltime.is_none());
    }

    #[test]
    fn test_parse_lattice_info() {
        let lattice = parse_lattice_info(SPEX_OUT).unwrap();
        assert_eq!(lattice.number_of_spins, 1);
        assert_eq!(lattice.number_of_centers, 2);
        assert_eq!(lattice.number_of_types, 1);
        assert_eq!(lattice.equivalent_atoms.as_deref(), Some("1 1"));
        assert!((lattice.lattice_parameter - 10.26).abs() < 1e-6);
        assert!((lattice.primitive_vectors[0][1] - 0.5).abs() < 1e-6);
        assert!((lattice.primitive_vectors[2][2]).abs() < 1e-6);
        assert!((lattice.reciprocal_vectors[1][1] + 1.0).abs() < 1e-6);
        assert!((lattice.unit_cell_volume - 270.0114).abs() < 1e-6);
        assert!((lattice.reciprocal_volume - 0.9188).abs() < 1e-6);
        assert_eq!(lattice.reciprocal_cutoff, Some(4.5));
    }

    #[test]
    fn test_lattice_parameter_is_mandatory() {
        let text = SPEX_OUT.replace("Lattice parameter", "Lattice constant");
        let err = parse_lattice_info(&text).unwrap_err();
        match err {
            SpexError::PatternNotFound { field } => assert_eq!(field, "lattice_parameter"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_truncated_matrix_is_rejected() {
        let text = "Number of spins = 1\ntypes = 1 centers = 1\nLattice parameter = 1.0\n\
                    Primitive vectors = 1 0 0\n 0 1 0\n";
        assert!(matches!(
            parse_lattice_info(text),
            Err(SpexError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_unit_cell_info() {
        let cell = parse_unit_cell_info(SPEX_OUT).unwrap();
        assert_eq!(cell.unitcell_geometry.len(), 2);
        assert_eq!(cell.unitcell_geometry[1].element, "Si");
        assert!((cell.unitcell_geometry[1].position[0] + 0.125).abs() < 1e-9);
        assert_eq!(cell.number_of_symmetry_operations, Some(48));
        assert_eq!(cell.number_of_valence_electrons, Some(8));
        assert_eq!(cell.number_of_k_points, Some(2));
        assert_eq!(cell.number_of_k_points_in_ibz, Some(2));

        assert_eq!(cell.list_of_k_points.len(), 2);
        assert_eq!(cell.list_of_k_points[1].label, "2");
        assert_eq!(cell.list_of_k_points[1].coords, [0.5, 0.0, 0.0]);

        assert_eq!(cell.k_points_in_ibz.len(), 2);
        assert_eq!(cell.k_points_in_ibz[1].reciprocal_lattice, [0.5, 0.0, 0.5]);
        assert_eq!(cell.k_points_in_ibz[1].equivalent, 1);
    }

    #[test]
    fn test_k_point_excerpt_without_header() {
        let text = "List of k points\n  1   0.0000  0.0000  0.0000   1\n  2   0.5000  0.0000  0.0000   1\n";
        let cell = parse_unit_cell_info(text).unwrap();
        let labels: Vec<&str> = cell
            .list_of_k_points
            .iter()
            .map(|k| k.label.as_str())
            .collect();
        assert_eq!(labels, vec!["1", "2"]);
        assert!(cell.unitcell_geometry.is_empty());
    }

    #[test]
    fn test_geometry_requires_center_count() {
        let text = "  #  Ty  El  Coord.\n  1   1  Si  0.0 0.0 0.0\n";
        let err = parse_unit_cell_info(text).unwrap_err();
        assert!(matches!(err, SpexError::MissingDependency { .. }));
    }

    #[test]
    fn test_k_point_count_mismatch() {
        let text = SPEX_OUT.replace("Number of k points:   2 ; in IBZ:   2", "Number of k points:   8 ; in IBZ:   3");
        assert!(matches!(
            parse_unit_cell_info(&text),
            Err(SpexError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_more_ibz_points_than_listed() {
        let text = "List of k points\n  1   0.0000  0.0000  0.0000   1\n\n\
                    IBZ\n  1  (0.000000,0.000000,0.000000)  [ 0.000, 0.000, 0.000]  eq:  1\n  \
                    2  (0.500000,0.000000,0.000000)  [ 0.500, 0.000, 0.500]  eq:  1\n";
        let err = parse_unit_cell_info(text).unwrap_err();
        match err {
            SpexError::InvalidFormat(msg) => assert!(msg.contains("2 IBZ k points")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_geometry_after_blank_line() {
        let text = "Number of types = 1     centers =  1\n  #  Ty  El  Coord.\n\n  1   1  Si  0.0 0.0 0.0\n";
        let cell = parse_unit_cell_info(text).unwrap();
        assert_eq!(cell.unitcell_geometry.len(), 1);
        assert_eq!(cell.unitcell_geometry[0].element, "Si");
    }

    #[test]
    fn test_energy_summary() {
        let summary = parse_energy_summary(SPEX_OUT);
        assert_eq!(summary.fermi_energy, vec![0.21456]);
        assert_eq!(summary.energy_gap, vec![0.02345]);
        assert_eq!(summary.maximal_energy, vec![1.5]);
        assert_eq!(summary.energy_unit.as_deref(), Some("Ha"));

        let empty = parse_energy_summary("nothing");
        assert!(empty.energy_unit.is_none());
    }

    #[test]
    fn test_parse_spex_output() {
        let out = parse_spex_output(SPEX_OUT).unwrap();
        assert_eq!(out.lattice.number_of_centers, out.unit_cell.unitcell_geometry.len());
        assert_eq!(out.run.compiler.as_deref(), Some("Intel ifort 2021.5"));
    }
}
