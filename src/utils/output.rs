//! # 终端输出
//!
//! 命令行的状态行和诊断输出，统一前缀与配色。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` crate
//! - 使用 spexkit `models::ErrorLog`

use colored::Colorize;
use spexkit::models::ErrorLog;
use std::path::Path;

pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 错误写到 stderr
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

pub fn print_skip(msg: &str) {
    println!("{} {}", "[SKIP]".dimmed(), msg);
}

pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 导出文件，如 `[OK] JSON -> gw.json`
pub fn print_saved(what: &str, path: &Path) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        what,
        "->".cyan(),
        path.display()
    );
}

/// 由配置生成输入卡片，如 `[OK] deck.json -> spex.inp`
pub fn print_written(source: &Path, target: &Path) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        source.display().to_string().dimmed(),
        "->".cyan(),
        target.display()
    );
}

/// out.error 统计，逐行列出警告和错误
pub fn print_error_log(log: &ErrorLog) {
    let summary = format!(
        "out.error: {} errors, {} warnings, {} info lines",
        log.errors.len(),
        log.warnings.len(),
        log.info.len()
    );
    if log.has_errors() {
        println!("{} {}", "[ERR]".red().bold(), summary);
    } else {
        print_info(&summary);
    }
    for line in &log.warnings {
        print_warning(line);
    }
    for line in &log.errors {
        print_error(line);
    }
}

pub fn print_header(title: &str) {
    let rule = "═".repeat(64);
    println!("\n{}", rule.cyan());
    println!("  {}", title.bold());
    println!("{}\n", rule.cyan());
}
