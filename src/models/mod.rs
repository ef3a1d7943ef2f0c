//! # 数据模型模块
//!
//! 定义 SPEX 输出元数据和结果表的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `deck/`, `registry.rs` 和 `commands/` 使用
//! - 子模块: output, tables

pub mod output;
pub mod tables;

pub use output::{
    AtomSite, EnergySummary, ErrorLog, IbzKPoint, KPoint, LatticeInfo, Matrix3, RunMetadata,
    SpexOutput, UnitCellInfo,
};
pub use tables::{
    DielectricPoint, DielectricTable, DosRow, DosTable, EnergyColumns, EnergyKey, GwImagRow,
    GwRealRow, GwTable, KsRow, KsTable, OrbitalWeights, ProjectionRow, ProjectionTable,
    SpinOrbitRow, SpinOrbitTable, ORBITALS,
};
