//! # 统一错误处理模块
//!
//! 定义 spexkit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// spexkit 统一错误类型
#[derive(Error, Debug)]
pub enum SpexError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 输入文件 (spex.inp) 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid SPEX input keyword '{key}': {reason}")]
    Schema { key: String, reason: String },

    #[error("Format of '{key}' not implemented, use the CUSTOM key instead")]
    FormatNotImplemented { key: String },

    // ─────────────────────────────────────────────────────────────
    // 输出解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Missing dependency: {what} must be parsed first")]
    MissingDependency { what: String },

    #[error("Pattern not found: {field}")]
    PatternNotFound { field: String },

    #[error("Column '{column}' not found, available columns: {}", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    #[error("{0}")]
    Other(String),
}

impl SpexError {
    pub(crate) fn schema(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SpexError::Schema {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(what: impl Into<String>) -> Self {
        SpexError::MissingDependency { what: what.into() }
    }

    pub(crate) fn not_found(field: impl Into<String>) -> Self {
        SpexError::PatternNotFound {
            field: field.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SpexError>;
