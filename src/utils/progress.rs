//! # 进度条
//!
//! 批量扫描作业目录时的进度显示。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 使用
//! - 使用 `indicatif` crate

use indicatif::{ProgressBar, ProgressStyle};

/// 作业计数进度条，模板无效时退回默认样式
pub fn job_progress_bar(jobs: u64, message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{msg:>10} [{bar:36.cyan/blue}] {pos}/{len} jobs ({per_sec}, {eta} left)",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");
    ProgressBar::new(jobs)
        .with_style(style)
        .with_message(message.to_string())
}
