//! # extract / energy 子命令 CLI 定义
//!
//! 按结果类别从作业目录提取结果表，以及由能量表生成能量重启文件
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/extract.rs`, `commands/energy.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// extract 子命令
// ─────────────────────────────────────────────────────────────

/// extract 子命令参数
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// SPEX job directory
    pub job_dir: PathBuf,

    /// Result kind: gw, ks, dielec, plussoc, project, dos
    #[arg(short, long)]
    pub kind: String,

    /// Write the record as JSON to this file (stdout otherwise)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also export energy tables (gw/ks) as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// energy 子命令
// ─────────────────────────────────────────────────────────────

/// 能量表来源
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum EnergySource {
    /// GW quasiparticle table (real part)
    Gw,
    /// Kohn-Sham only table
    Ks,
}

impl std::fmt::Display for EnergySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnergySource::Gw => write!(f, "gw"),
            EnergySource::Ks => write!(f, "ks"),
        }
    }
}

/// energy 子命令参数
#[derive(Args, Debug)]
pub struct EnergyArgs {
    /// SPEX job directory
    pub job_dir: PathBuf,

    /// Energy column to write (GW, KS, HF, ...)
    #[arg(short, long, default_value = "GW")]
    pub column: String,

    /// Table to read the column from
    #[arg(short, long, value_enum, default_value = "gw")]
    pub source: EnergySource,

    /// Output path for the energy file
    #[arg(short, long, default_value = "energy.inp")]
    pub output: PathBuf,
}
