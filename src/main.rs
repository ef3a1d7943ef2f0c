//! # spexkit - SPEX 输入生成与输出解析工具
//!
//! 把 SPEX GW 计算的输入准备和结果整理统一成单一可执行文件。
//!
//! ## 子命令
//! - `input`   - 由 JSON 配置生成 spex.inp
//! - `parse`   - 解析 spex.out 元数据
//! - `extract` - 按结果类别提取结果表
//! - `energy`  - 生成能量重启文件
//! - `collect` - 批量汇总多个作业
//! - `plot`    - 绘制介电函数
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── spexkit (库: deck/, parsers/, registry, models/)
//!   ├── batch/      (批量并行处理)
//!   └── utils/      (工具函数)
//! ```

mod batch;
mod cli;
mod commands;
mod utils;

use clap::Parser;
use cli::Cli;
use log::LevelFilter;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.format_timestamp(None).init();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
