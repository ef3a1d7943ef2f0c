//! # 解析器注册表与分发
//!
//! 将结果类别名（如 `gw`, `dielec`）映射到其所在的文件和对应的提取器。
//! 注册表在启动时构造，之后只读，由调用方传给分发函数。
//!
//! | 名称 | 文件 | 提取器 |
//! |------|------|--------|
//! | project | spex.binfo | `parse_projection` |
//! | gw | spex.out | `parse_gw_energies` |
//! | ks | spex.out | `parse_ks_energies` |
//! | dos | spex.dos | `parse_dos` |
//! | dielec | dielecR | `parse_dielectric` |
//! | plussoc | spex.out | `parse_plussoc` |
//!
//! 未注册的名称分发后得到 `ParsedRecord::Empty`，表示“没有处理器”而不是解析失败。
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs`, `commands/energy.rs`, `commands/collect.rs` 使用
//! - 使用 `parsers/` 各提取器

use crate::error::{Result, SpexError};
use crate::models::{
    DielectricTable, DosTable, GwTable, KsTable, LatticeInfo, ProjectionTable, SpexOutput,
    SpinOrbitTable, UnitCellInfo,
};
use crate::parsers::{dielectric, dos, energies, plussoc, projection, spex_out};

use log::debug;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 每个作业都要取回的文件
pub const ALWAYS_RETRIEVED: [&str; 3] = ["spex.inp", "spex.out", "out.error"];

/// 结果类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Project,
    Gw,
    Ks,
    Dos,
    Dielec,
    Plussoc,
}

impl ParserKind {
    pub const ALL: [ParserKind; 6] = [
        ParserKind::Project,
        ParserKind::Gw,
        ParserKind::Ks,
        ParserKind::Dos,
        ParserKind::Dielec,
        ParserKind::Plussoc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ParserKind::Project => "project",
            ParserKind::Gw => "gw",
            ParserKind::Ks => "ks",
            ParserKind::Dos => "dos",
            ParserKind::Dielec => "dielec",
            ParserKind::Plussoc => "plussoc",
        }
    }

    /// 是否需要先解析 spex.out 的晶格与晶胞信息
    pub fn needs_context(&self) -> bool {
        matches!(self, ParserKind::Project | ParserKind::Gw | ParserKind::Ks)
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParserKind {
    type Err = SpexError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        ParserKind::ALL
            .into_iter()
            .find(|k| k.name() == lower)
            .ok_or_else(|| SpexError::InvalidArgument(format!("unknown result kind '{}'", s)))
    }
}

/// (类别名, 文件名)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserRegistryEntry {
    pub name: String,
    pub filename: String,
}

/// 提取器的上游元数据
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    pub lattice: Option<LatticeInfo>,
    pub unit_cell: Option<UnitCellInfo>,
}

impl ParseContext {
    pub fn new(lattice: LatticeInfo, unit_cell: UnitCellInfo) -> Self {
        Self {
            lattice: Some(lattice),
            unit_cell: Some(unit_cell),
        }
    }

    /// 从 spex.out 文本解析上下文
    pub fn from_spex_out(content: &str) -> Result<Self> {
        Ok(Self::new(
            spex_out::parse_lattice_info(content)?,
            spex_out::parse_unit_cell_info(content)?,
        ))
    }

    fn lattice(&self) -> Result<&LatticeInfo> {
        self.lattice
            .as_ref()
            .ok_or_else(|| SpexError::missing("lattice info"))
    }

    fn unit_cell(&self) -> Result<&UnitCellInfo> {
        self.unit_cell
            .as_ref()
            .ok_or_else(|| SpexError::missing("unit cell info"))
    }
}

impl From<&SpexOutput> for ParseContext {
    fn from(output: &SpexOutput) -> Self {
        Self::new(output.lattice.clone(), output.unit_cell.clone())
    }
}

/// 分发结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "parser", content = "results", rename_all = "lowercase")]
pub enum ParsedRecord {
    Project(ProjectionTable),
    Gw(GwTable),
    Ks(KsTable),
    Dos(DosTable),
    Dielec(DielectricTable),
    Plussoc(SpinOrbitTable),
    /// 没有对应的提取器
    Empty,
}

impl ParsedRecord {
    pub fn is_empty(&self) -> bool {
        matches!(self, ParsedRecord::Empty)
    }

    /// 记录中的数据行数
    pub fn row_count(&self) -> usize {
        match self {
            ParsedRecord::Project(t) => t.rows.len(),
            ParsedRecord::Gw(t) => t.len(),
            ParsedRecord::Ks(t) => t.rows.len(),
            ParsedRecord::Dos(t) => t.rows.len(),
            ParsedRecord::Dielec(t) => t.points.len(),
            ParsedRecord::Plussoc(t) => t.rows.len(),
            ParsedRecord::Empty => 0,
        }
    }
}

/// 只读的解析器注册表
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    entries: Vec<(ParserKind, ParserRegistryEntry)>,
}

impl ParserRegistry {
    /// 标准注册表
    pub fn standard() -> Self {
        let entries = ParserKind::ALL
            .into_iter()
            .map(|kind| {
                let filename = match kind {
                    ParserKind::Project => "spex.binfo",
                    ParserKind::Gw | ParserKind::Ks | ParserKind::Plussoc => "spex.out",
                    ParserKind::Dos => "spex.dos",
                    ParserKind::Dielec => "dielecR",
                };
                (
                    kind,
                    ParserRegistryEntry {
                        name: kind.name().to_string(),
                        filename: filename.to_string(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> impl Iterator<Item = &ParserRegistryEntry> {
        self.entries.iter().map(|(_, e)| e)
    }

    fn lookup(&self, name: &str) -> Option<(ParserKind, &ParserRegistryEntry)> {
        self.entries
            .iter()
            .find(|(_, e)| e.name.eq_ignore_ascii_case(name))
            .map(|(k, e)| (*k, e))
    }

    /// 类别所在的文件名
    pub fn filename_for(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|(_, e)| e.filename.as_str())
    }

    /// 作业需要取回的文件：固定三个文件加上各类别的文件，去重并保持顺序
    pub fn retrieve_list(&self, names: &[&str]) -> Vec<String> {
        let mut files: Vec<String> = ALWAYS_RETRIEVED.iter().map(|f| f.to_string()).collect();
        for name in names {
            match self.filename_for(name) {
                Some(file) if !files.iter().any(|f| f == file) => files.push(file.to_string()),
                Some(_) => {}
                None => debug!("no registered file for result kind '{}'", name),
            }
        }
        files
    }

    /// 按类别名选择提取器
    pub fn dispatch(&self, name: &str, content: &str, ctx: &ParseContext) -> Result<ParsedRecord> {
        let Some((kind, _)) = self.lookup(name) else {
            debug!("no parser registered for '{}'", name);
            return Ok(ParsedRecord::Empty);
        };

        let record = match kind {
            ParserKind::Project => {
                ParsedRecord::Project(projection::parse_projection(content, ctx.unit_cell()?)?)
            }
            ParserKind::Gw => ParsedRecord::Gw(energies::parse_gw_energies(
                content,
                ctx.lattice()?,
                ctx.unit_cell()?,
            )?),
            ParserKind::Ks => ParsedRecord::Ks(energies::parse_ks_energies(
                content,
                ctx.lattice()?,
                ctx.unit_cell()?,
            )?),
            ParserKind::Dos => ParsedRecord::Dos(dos::parse_dos(content)?),
            ParserKind::Dielec => ParsedRecord::Dielec(dielectric::parse_dielectric(content)?),
            ParserKind::Plussoc => ParsedRecord::Plussoc(plussoc::parse_plussoc(content)?),
        };
        debug!("{} parser produced {} rows", kind, record.row_count());
        Ok(record)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::energies::tests::{cell, gw_output, lattice};

    #[test]
    fn test_standard_filenames() {
        let registry = ParserRegistry::standard();
        assert_eq!(registry.filename_for("project"), Some("spex.binfo"));
        assert_eq!(registry.filename_for("GW"), Some("spex.out"));
        assert_eq!(registry.filename_for("dielec"), Some("dielecR"));
        assert_eq!(registry.filename_for("bands"), None);
        assert_eq!(registry.entries().count(), 6);
    }

    #[test]
    fn test_retrieve_list_deduplicates() {
        let registry = ParserRegistry::standard();
        let files = registry.retrieve_list(&["gw", "dielec", "ks", "unknown", "dos"]);
        assert_eq!(
            files,
            vec!["spex.inp", "spex.out", "out.error", "dielecR", "spex.dos"]
        );
    }

    #[test]
    fn test_unknown_name_dispatches_to_empty() {
        let registry = ParserRegistry::standard();
        let record = registry
            .dispatch("wannier", "anything", &ParseContext::default())
            .unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_gw_requires_context() {
        let registry = ParserRegistry::standard();
        let err = registry
            .dispatch("gw", &gw_output(), &ParseContext::default())
            .unwrap_err();
        assert!(matches!(err, SpexError::MissingDependency { .. }));
    }

    #[test]
    fn test_dispatch_gw() {
        let registry = ParserRegistry::standard();
        let ctx = ParseContext::new(lattice(1), cell(&["1", "2"]));
        let record = registry.dispatch("gw", &gw_output(), &ctx).unwrap();
        assert_eq!(record.row_count(), 4);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["parser"], "gw");
        assert_eq!(json["results"]["real"].as_array().map(|a| a.len()), Some(4));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Dielec".parse::<ParserKind>().unwrap(), ParserKind::Dielec);
        assert!("bogus".parse::<ParserKind>().is_err());
        assert!(ParserKind::Ks.needs_context());
        assert!(!ParserKind::Dos.needs_context());
    }
}
