//! # input 子命令 CLI 定义
//!
//! 由 JSON 配置生成 spex.inp
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/input.rs`

use clap::Args;
use std::path::PathBuf;

/// input 子命令参数
#[derive(Args, Debug)]
pub struct InputArgs {
    /// JSON file holding the keyword configuration
    pub config: PathBuf,

    /// Output path for the generated input file
    #[arg(short, long, default_value = "spex.inp")]
    pub output: PathBuf,

    /// Unit appended to top-level float values (e.g. 'eV'); none by default
    #[arg(long, env = "SPEXKIT_FLOAT_UNIT")]
    pub float_unit: Option<String>,

    /// Only validate the configuration, do not write anything
    #[arg(long, default_value_t = false)]
    pub check: bool,

    /// Skip grammar validation (CUSTOM-heavy decks)
    #[arg(long, default_value_t = false)]
    pub no_validate: bool,

    /// Print the generated input to stdout instead of writing a file
    #[arg(long, default_value_t = false)]
    pub stdout: bool,
}
