//! # SPEX 结果表数据模型
//!
//! GW/KS 能量表、介电函数、自旋轨道本征值、投影能带和 DOS 表。
//!
//! ## 依赖关系
//! - 被 `parsers/` 各提取器使用
//! - 被 `deck/energy.rs` 使用（能量重启文件）

use serde::{Deserialize, Serialize};

/// 能量表行的复合键 (band, k 点, 自旋)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnergyKey {
    pub band: usize,
    pub k_point: usize,
    pub spin: u8,
}

/// 按列名访问能量表的数值列
pub trait EnergyColumns {
    /// 数值列名（不含 band/kpoint/spin）
    const COLUMNS: &'static [&'static str];

    fn key(&self) -> EnergyKey;

    /// 按列名取值，大小写不敏感
    fn column(&self, name: &str) -> Option<f64>;
}

/// 只有 KS 能量的对角元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KsRow {
    pub band: usize,
    pub k_point: usize,
    pub spin: u8,
    pub vxc: f64,
    pub ks: f64,
}

impl EnergyColumns for KsRow {
    const COLUMNS: &'static [&'static str] = &["vxc", "KS"];

    fn key(&self) -> EnergyKey {
        EnergyKey {
            band: self.band,
            k_point: self.k_point,
            spin: self.spin,
        }
    }

    fn column(&self, name: &str) -> Option<f64> {
        match name.to_ascii_lowercase().as_str() {
            "vxc" => Some(self.vxc),
            "ks" => Some(self.ks),
            _ => None,
        }
    }
}

/// GW 对角元实部
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwRealRow {
    pub band: usize,
    pub k_point: usize,
    pub spin: u8,
    pub vxc: f64,
    pub sigma_x: f64,
    pub sigma_c: f64,
    pub z: f64,
    pub ks: f64,
    pub hf: f64,
    pub gw: f64,
    pub lin_dir: f64,
}

impl EnergyColumns for GwRealRow {
    const COLUMNS: &'static [&'static str] =
        &["vxc", "sigmax", "sigmac", "Z", "KS", "HF", "GW", "lin/dir"];

    fn key(&self) -> EnergyKey {
        EnergyKey {
            band: self.band,
            k_point: self.k_point,
            spin: self.spin,
        }
    }

    fn column(&self, name: &str) -> Option<f64> {
        match name.to_ascii_lowercase().as_str() {
            "vxc" => Some(self.vxc),
            "sigmax" => Some(self.sigma_x),
            "sigmac" => Some(self.sigma_c),
            "z" => Some(self.z),
            "ks" => Some(self.ks),
            "hf" => Some(self.hf),
            "gw" => Some(self.gw),
            "lin/dir" => Some(self.lin_dir),
            _ => None,
        }
    }
}

/// GW 对角元虚部（列数较少）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwImagRow {
    pub band: usize,
    pub k_point: usize,
    pub spin: u8,
    pub sigma_c: f64,
    pub z: f64,
    pub gw: f64,
    pub lin_dir: f64,
}

impl EnergyColumns for GwImagRow {
    const COLUMNS: &'static [&'static str] = &["sigmac", "Z", "GW", "lin/dir"];

    fn key(&self) -> EnergyKey {
        EnergyKey {
            band: self.band,
            k_point: self.k_point,
            spin: self.spin,
        }
    }

    fn column(&self, name: &str) -> Option<f64> {
        match name.to_ascii_lowercase().as_str() {
            "sigmac" => Some(self.sigma_c),
            "z" => Some(self.z),
            "gw" => Some(self.gw),
            "lin/dir" => Some(self.lin_dir),
            _ => None,
        }
    }
}

/// GW 准粒子能量表，实部与虚部逐行对应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GwTable {
    pub real: Vec<GwRealRow>,
    pub imag: Vec<GwImagRow>,
}

impl GwTable {
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }
}

/// KS 能量表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KsTable {
    pub rows: Vec<KsRow>,
}

/// 介电函数的一个频率点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DielectricPoint {
    pub frequency: f64,
    pub real: f64,
    pub imaginary: f64,
}

/// dielecR 文件解析结果
///
/// 注释行中的 k 点/自旋标注与数据行之间没有显式索引，按出现顺序单独保存。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DielectricTable {
    pub points: Vec<DielectricPoint>,
    pub lattvec: String,
    pub kpoint: Vec<String>,
    pub kindex: Vec<String>,
    pub spin: Vec<String>,
}

/// PLUSSOC 一个 k 点的本征值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOrbitRow {
    pub k_point_number: usize,
    /// 等价 k 点编号，空白已归一化
    pub equivalent_k_points: String,
    pub eigenvalues: Vec<f64>,
}

/// PLUSSOC 结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpinOrbitTable {
    pub rows: Vec<SpinOrbitRow>,
}

/// 轨道角动量通道
pub const ORBITALS: [&str; 5] = ["s", "p", "d", "f", "g"];

/// 一个原子在 s/p/d/f/g 通道上的权重
pub type OrbitalWeights = [f64; 5];

/// spex.binfo 的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub band: usize,
    pub energy: f64,
    /// 之前出现过的 `k point` 注释个数减一；仅按出现顺序关联
    pub block: Option<usize>,
    /// 每个原子一组轨道权重
    pub weights: Vec<OrbitalWeights>,
}

/// 投影能带表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTable {
    pub atoms: Vec<String>,
    pub rows: Vec<ProjectionRow>,
    pub kpoints: Vec<[f64; 3]>,
}

impl ProjectionTable {
    /// 列名：band, energy, 然后每个原子的 `{元素}_{轨道}`
    pub fn column_labels(&self) -> Vec<String> {
        let mut labels = vec!["band".to_string(), "energy".to_string()];
        for atom in &self.atoms {
            for l in ORBITALS {
                labels.push(format!("{}_{}", atom, l));
            }
        }
        labels
    }
}

/// spex.dos 的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosRow {
    pub energy: f64,
    pub values: Vec<f64>,
}

/// 态密度表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DosTable {
    pub rows: Vec<DosRow>,
}

impl DosTable {
    /// 除能量外的通道数
    pub fn channels(&self) -> usize {
        self.rows.first().map(|r| r.values.len()).unwrap_or(0)
    }
}
