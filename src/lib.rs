//! # spexkit - SPEX 输入生成与输出解析
//!
//! 为 SPEX GW 程序生成 spex.inp 输入文件，并把 spex.out 等输出文本
//! 解析为带类型的记录。核心部分只处理内存中的文本，不做文件暂存或作业调度。
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── deck/      (spex.inp 关键字语法、写出器、能量重启文件)
//!   ├── parsers/   (spex.out, out.error, dielecR, spex.binfo, spex.dos 提取器)
//!   ├── registry.rs(结果类别 -> 文件 -> 提取器)
//!   ├── models/    (数据模型)
//!   └── error.rs   (错误处理)
//! ```
//!
//! ## 示例
//! ```
//! use spexkit::deck::{serialize, DeckOptions, InputDeck};
//!
//! let deck = InputDeck::from_json_str(r#"{"BZ": [4, 4, 4], "JOB": {"KS": {"1": [4, 12]}}}"#).unwrap();
//! spexkit::deck::validate(&deck).unwrap();
//! let text = serialize(&deck, &DeckOptions::default());
//! assert!(text.contains("JOB KS 1:(4-12)"));
//! ```

pub mod deck;
pub mod error;
pub mod models;
pub mod parsers;
pub mod registry;

pub use error::{Result, SpexError};
pub use registry::{ParseContext, ParsedRecord, ParserKind, ParserRegistry};
