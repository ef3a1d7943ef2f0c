//! # spex.inp 输入卡片模块
//!
//! 从嵌套配置对象生成 SPEX 输入文件，以及从已解析的能量表生成能量重启文件。
//!
//! ## 子模块
//! - `entry`: 关键字值的变体类型及其 JSON 构造
//! - `grammar`: 关键字语法与校验
//! - `writer`: spex.inp 文本写出
//! - `energy`: 能量重启文件写出
//!
//! ## 依赖关系
//! - 被 `commands/input.rs`, `commands/energy.rs` 使用
//! - 使用 `models/tables.rs`

pub mod energy;
pub mod entry;
pub mod grammar;
pub mod writer;

pub use energy::make_energy_input;
pub use entry::{
    BandSelection, DeckEntry, JobSelections, JobSpec, JobTask, ScalarValue, SectionValue,
    SpectralRange,
};
pub use grammar::{is_valid, validate};
pub use writer::serialize;

use crate::error::{Result, SpexError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// 写出选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckOptions {
    /// 顶层浮点数值后追加的单位，如 `eV`；默认不追加
    pub float_unit: Option<String>,
}

/// 输入卡片：按插入顺序保存的 (大写关键字, 条目) 列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputDeck {
    entries: Vec<(String, DeckEntry)>,
}

impl InputDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或替换关键字，替换时保留原位置
    pub fn insert(&mut self, key: &str, entry: DeckEntry) {
        let key = key.to_uppercase();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key, entry)),
        }
    }

    pub fn with(mut self, key: &str, entry: DeckEntry) -> Self {
        self.insert(key, entry);
        self
    }

    pub fn get(&self, key: &str) -> Option<&DeckEntry> {
        let key = key.to_uppercase();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, e)| e)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &DeckEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 从 JSON 对象构造，关键字顺序与对象中的顺序一致
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            SpexError::InvalidArgument("input deck configuration must be a JSON object".into())
        })?;

        let mut deck = InputDeck::new();
        for (key, value) in map {
            let key = key.to_uppercase();
            let entry = DeckEntry::from_json(&key, value)?;
            deck.insert(&key, entry);
        }
        Ok(deck)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// 读取 JSON 配置文件
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = crate::parsers::read_text(path)?;
        Self::from_json_str(&text)
    }
}
