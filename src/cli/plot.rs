//! # plot 子命令 CLI 定义
//!
//! 绘制 dielecR 中的介电函数
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/plot.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 图像输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlotFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
}

/// plot 子命令参数
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Path to the dielecR file
    pub input: PathBuf,

    /// Output image path
    #[arg(short, long, default_value = "dielectric.png")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<PlotFormat>,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot (default: file name and lattice vector)
    #[arg(long)]
    pub title: Option<String>,
}
