//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `utils/` 和 spexkit 库
//! - 子模块: input, parse, extract, energy, collect, plot

pub mod collect;
pub mod energy;
pub mod extract;
pub mod input;
pub mod parse;
pub mod plot;

use crate::cli::Commands;
use spexkit::error::{Result, SpexError};

use std::fs;
use std::path::{Path, PathBuf};

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Input(args) => input::execute(args),
        Commands::Parse(args) => parse::execute(args),
        Commands::Extract(args) => extract::execute(args),
        Commands::Energy(args) => energy::execute(args),
        Commands::Collect(args) => collect::execute(args),
        Commands::Plot(args) => plot::execute(args),
    }
}

/// 验证作业目录存在
pub(crate) fn require_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(SpexError::DirectoryNotFound {
            path: dir.display().to_string(),
        })
    }
}

/// 目录输入时补上 spex.out
pub(crate) fn spex_out_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        input.join("spex.out")
    } else {
        input.to_path_buf()
    }
}

/// 写文本文件
pub(crate) fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| SpexError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
