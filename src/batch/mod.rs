//! # 批量处理模块
//!
//! 提供统一的作业目录批量处理能力。
//!
//! ## 功能
//! - 收集匹配的 SPEX 输出文件
//! - 并行处理
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchRunner, ProcessResult};
