//! # parse 子命令 CLI 定义
//!
//! 解析 spex.out 的运行信息、晶格和晶胞信息
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/parse.rs`

use clap::Args;
use std::path::PathBuf;

/// parse 子命令参数
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Path to spex.out (or a job directory containing it)
    pub input: PathBuf,

    /// Also scan an out.error file (defaults to out.error next to spex.out)
    #[arg(long)]
    pub error_log: Option<PathBuf>,

    /// Write the full parsed record as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Print the list of k points
    #[arg(long, default_value_t = false)]
    pub kpoints: bool,
}
