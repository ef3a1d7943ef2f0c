//! # spex.inp 关键字语法
//!
//! 声明全局关键字与各段 (SECTION) 允许的子关键字，并在写出前校验输入卡片。
//! 所有比较不区分大小写，语法本身以大写声明。
//!
//! 校验规则:
//! 1. 必需关键字（目前只有 `BZ`）必须出现
//! 2. 必须非空的关键字不能取空值或假值
//! 3. 顶层关键字必须是全局关键字或段名
//! 4. 段内子关键字必须属于该段
//!
//! 写出器不会重复校验，调用方应先调用 [`validate`]。
//!
//! ## 依赖关系
//! - 被 `deck/entry.rs`, `commands/input.rs` 使用
//! - 使用 `deck/mod.rs` 的 InputDeck

use super::{DeckEntry, InputDeck};
use crate::error::{Result, SpexError};

use log::debug;

/// 全局关键字
pub const GLOBAL_KEYWORDS: &[&str] = &[
    "CUSTOM", "ALIGNBD", "BANDOMIT", "BLOECHL", "BZ", "CHKMISM", "CHKOLAP", "CORES", "CORESOC",
    "CUTZERO", "DELTAEX", "ENERGY", "FIXPHASE", "GAUSS", "IBC", "ITERATE", "JOB", "KPT",
    "KPTPATH", "MEM", "MPIKPT", "MPISPLIT", "NBAND", "NOSYM", "PLUSSOC", "RESTART", "STOREBZ",
    "TIMING", "TRSOFF", "WRITE", "WRTKPT",
];

/// 段名及其子关键字
pub const SECTIONS: &[(&str, &[&str])] = &[
    ("ANALYZE", &["DIPOLE", "KINETIC", "MTACCUR", "DOS", "PROJECT"]),
    (
        "COULOMB",
        &["CHKCOUL", "LEXP", "MULTIPOLE", "NOSTORE", "STEPRAD", "TSTCOUL"],
    ),
    ("LAPW", &["EPAR", "GCUT", "LCUT", "LO"]),
    (
        "MBASIS",
        &[
            "ADDBAS", "CHKPROD", "GCUT", "LCUT", "NOAPW", "OPTIMIZE", "SELECT", "TOL", "WFADJUST",
        ],
    ),
    (
        "SENERGY",
        &[
            "ALIGNVXC", "CONTINUE", "CONTOUR", "DIVLOG", "FREQINT", "MESH", "MPIBLK", "MPISYM",
            "ORDER", "SMOOTH", "SPECTRAL", "VXC", "ZERO",
        ],
    ),
    (
        "SUSCEP",
        &[
            "DISORDER", "FPADE", "FSPEC", "HILBERT", "HUBBARD", "MULTDIFF", "PLASMA", "TETRAF",
            "WGHTTHR",
        ],
    ),
    (
        "WANNIER",
        &[
            "BACKFOLD", "CUTGOLD", "DISENTGL", "FROZEN", "INTERPOL", "IRREP", "MAXIMIZE",
            "ORBITALS", "PLOT", "RSITE", "SUBSET", "UREAD", "WBLOCH", "WSCALE",
        ],
    ),
    ("WFPROD", &["APPROXPW", "FFT", "LCUT", "MINCPW", "MPIMT", "MPIPW"]),
];

/// 必需关键字
pub const REQUIRED_KEYWORDS: &[&str] = &["BZ"];

/// 谱函数类任务，选择写作 `{start:end,step}`
pub const SPECTRAL_JOBS: &[&str] = &["DIELEC", "SUSCEP", "SUSCEPR", "SCREEN", "SCREENW"];

/// 段的子关键字表
pub fn section_keys(name: &str) -> Option<&'static [&'static str]> {
    let name = name.to_uppercase();
    SECTIONS
        .iter()
        .find(|(section, _)| *section == name)
        .map(|(_, keys)| *keys)
}

pub fn is_section(name: &str) -> bool {
    section_keys(name).is_some()
}

pub fn is_global(name: &str) -> bool {
    let name = name.to_uppercase();
    GLOBAL_KEYWORDS.contains(&name.as_str())
}

pub fn is_spectral_job(kind: &str) -> bool {
    let kind = kind.to_uppercase();
    SPECTRAL_JOBS.contains(&kind.as_str())
}

/// 必须非空：BZ, KPT, KPTPATH 和所有段
pub fn must_be_nonempty(name: &str) -> bool {
    matches!(name.to_uppercase().as_str(), "BZ" | "KPT" | "KPTPATH") || is_section(name)
}

/// 校验输入卡片，第一个违规的关键字作为错误返回
pub fn validate(deck: &InputDeck) -> Result<()> {
    for required in REQUIRED_KEYWORDS {
        if deck.get(required).is_none() {
            return Err(SpexError::schema(*required, "mandatory keyword is missing"));
        }
    }

    for (key, entry) in deck.entries() {
        if must_be_nonempty(key) && entry.is_empty() {
            return Err(SpexError::schema(key, "value cannot be empty"));
        }

        if !is_global(key) && !is_section(key) {
            return Err(SpexError::schema(key, "not a valid keyword"));
        }

        if let Some(allowed) = section_keys(key) {
            let DeckEntry::Section(items) = entry else {
                return Err(SpexError::schema(key, "a section expects a mapping of sub-keywords"));
            };
            for (sub_key, _) in items {
                if !allowed.contains(&sub_key.to_uppercase().as_str()) {
                    return Err(SpexError::schema(
                        format!("{}.{}", key, sub_key),
                        format!("not a valid keyword for the section {}", key),
                    ));
                }
            }
        }
    }

    debug!("input deck with {} keywords passed validation", deck.len());
    Ok(())
}

/// [`validate`] 的布尔形式
pub fn is_valid(deck: &InputDeck) -> bool {
    validate(deck).is_ok()
}
