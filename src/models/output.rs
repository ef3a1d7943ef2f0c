//! # SPEX 输出元数据模型
//!
//! 存储从 spex.out / out.error 中提取的运行信息、晶格信息和晶胞信息。
//!
//! ## 依赖关系
//! - 被 `parsers/spex_out.rs`, `parsers/error_log.rs` 使用
//! - 被 `registry.rs` 和 `commands/` 使用

use serde::{Deserialize, Serialize};

/// 3x3 矩阵（按行存储晶格矢量）
pub type Matrix3 = [[f64; 3]; 3];

/// 运行信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub version: Option<String>,
    pub execution_time: Option<String>,
    pub compiler: Option<String>,
    pub hostname: Option<String>,
    pub interfaced_to: Option<String>,
    pub mpi: Option<String>,
    /// 总运行时间 (s)
    pub walltime: Option<u64>,
}

/// out.error 中的 SPEX-INFO / SPEX-WARNING / SPEX-ERROR 行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLog {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ErrorLog {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// 晶格与基组信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeInfo {
    /// 自旋通道数 (1 或 2)
    pub number_of_spins: usize,
    pub number_of_centers: usize,
    pub number_of_types: usize,
    pub equivalent_atoms: Option<String>,
    pub lattice_parameter: f64,
    pub primitive_vectors: Matrix3,
    pub unit_cell_volume: f64,
    pub reciprocal_vectors: Matrix3,
    pub reciprocal_volume: f64,
    pub reciprocal_cutoff: Option<f64>,
}

/// 晶胞中的一个原子位置
///
/// 对应 `# Ty El Coord.` 块的一行：序号、类型、元素、三个坐标。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomSite {
    pub index: usize,
    pub atom_type: usize,
    pub element: String,
    pub position: [f64; 3],
}

/// `List of k points` 中的一个 k 点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KPoint {
    /// k 点编号，保留原始文本（用于在输出中定位 `K POINT:` 块）
    pub label: String,
    pub coords: [f64; 3],
}

/// 不可约布里渊区 (IBZ) 中的 k 点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IbzKPoint {
    pub index: usize,
    /// 圆括号中的坐标
    pub coordinates: [f64; 3],
    /// 方括号中的倒格子坐标
    pub reciprocal_lattice: [f64; 3],
    /// 等价 k 点个数
    pub equivalent: usize,
}

/// 晶胞与 k 点信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitCellInfo {
    pub unitcell_geometry: Vec<AtomSite>,
    pub number_of_symmetry_operations: Option<usize>,
    pub number_of_valence_electrons: Option<usize>,
    pub number_of_k_points: Option<usize>,
    pub number_of_k_points_in_ibz: Option<usize>,
    pub list_of_k_points: Vec<KPoint>,
    pub k_points_in_ibz: Vec<IbzKPoint>,
}

impl UnitCellInfo {
    /// 每个原子位置的元素名（按中心顺序）
    pub fn atom_labels(&self) -> Vec<String> {
        self.unitcell_geometry
            .iter()
            .map(|site| site.element.clone())
            .collect()
    }
}

/// 能隙、费米能、最大能量（单位 Ha）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergySummary {
    pub energy_gap: Vec<f64>,
    pub fermi_energy: Vec<f64>,
    pub maximal_energy: Vec<f64>,
    pub energy_unit: Option<String>,
}

impl EnergySummary {
    pub fn is_empty(&self) -> bool {
        self.energy_gap.is_empty() && self.fermi_energy.is_empty() && self.maximal_energy.is_empty()
    }
}

/// spex.out 完整解析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpexOutput {
    pub run: RunMetadata,
    pub lattice: LatticeInfo,
    pub unit_cell: UnitCellInfo,
    pub summary: EnergySummary,
}
