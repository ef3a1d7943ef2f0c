//! # collect 子命令 CLI 定义
//!
//! 扫描多个 SPEX 作业目录并汇总为 CSV
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/collect.rs`

use clap::Args;
use std::path::PathBuf;

/// collect 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Root directory containing SPEX job folders
    pub root: PathBuf,

    /// Glob pattern for SPEX output files (comma separated)
    #[arg(short, long, default_value = "spex.out")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0, env = "SPEXKIT_JOBS")]
    pub jobs: usize,

    /// Filename for the summary CSV
    #[arg(short, long, default_value = "spex_summary.csv")]
    pub output: PathBuf,
}
