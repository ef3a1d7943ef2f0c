//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `input`: 由 JSON 配置生成 spex.inp
//! - `parse`: 解析 spex.out 元数据
//! - `extract`: 按结果类别提取结果表
//! - `energy`: 生成能量重启文件
//! - `collect`: 批量汇总多个作业
//! - `plot`: 绘制介电函数
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: input, parse, extract, collect, plot

pub mod collect;
pub mod extract;
pub mod input;
pub mod parse;
pub mod plot;

use clap::{Parser, Subcommand};

/// spexkit - SPEX 输入生成与输出解析工具
#[derive(Parser)]
#[command(name = "spexkit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Input deck generation and output parsing for the SPEX GW code", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show debug diagnostics from the parsers (overrides RUST_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a spex.inp input file from a JSON configuration
    Input(input::InputArgs),

    /// Parse run, lattice and unit-cell information from spex.out
    Parse(parse::ParseArgs),

    /// Extract a result table (gw, ks, dielec, plussoc, project, dos) from a job directory
    Extract(extract::ExtractArgs),

    /// Write an energy-restart file from the GW or KS table of a job
    Energy(extract::EnergyArgs),

    /// Summarize many SPEX job directories into one CSV
    Collect(collect::CollectArgs),

    /// Plot a dielectric function (dielecR) as PNG or SVG
    Plot(plot::PlotArgs),
}
