//! # spex.inp 写出器
//!
//! 对每个条目做穷尽匹配并写出一行或一个 SECTION 块。
//! 输出第一行是生成工具的版本注释。写出器不做校验。
//!
//! ## 输出示例
//! ```text
//! # SPEX input file generated by spexkit v0.1.0
//! BZ 4 4 4
//! JOB GW 1:(1-4,7) DIELEC R:{0:1,0.01}
//! SECTION MBASIS
//! GCUT 2.9
//! END
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/input.rs` 使用
//! - 使用 `deck/entry.rs`

use super::{
    BandSelection, DeckEntry, DeckOptions, InputDeck, JobSelections, JobSpec, ScalarValue,
    SectionValue,
};

/// 输入文件的版本注释
pub fn provenance_header() -> String {
    format!(
        "# SPEX input file generated by spexkit v{}",
        env!("CARGO_PKG_VERSION")
    )
}

/// 浮点数写法：整数值保留一位小数（`2.0`），其余取最短表示
pub(crate) fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn format_scalar(value: &ScalarValue, options: &DeckOptions) -> String {
    match value {
        ScalarValue::Text(s) => s.clone(),
        ScalarValue::Integer(i) => i.to_string(),
        ScalarValue::Float(f) => match &options.float_unit {
            Some(unit) => format!("{}{}", format_float(*f), unit),
            None => format_float(*f),
        },
    }
}

fn format_bands(bands: &[BandSelection]) -> String {
    bands
        .iter()
        .map(|b| match b {
            BandSelection::Single(n) => n.to_string(),
            BandSelection::Range(start, end) => format!("{}-{}", start, end),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// `JOB` 行，不含换行
pub fn format_job(job: &JobSpec) -> String {
    let mut tokens = vec!["JOB".to_string()];

    for task in &job.tasks {
        tokens.push(task.kind.clone());
        match &task.selections {
            JobSelections::Bands(labels) => {
                for (label, bands) in labels {
                    tokens.push(format!("{}:({})", label, format_bands(bands)));
                }
            }
            JobSelections::Spectra(ranges) => {
                for r in ranges {
                    tokens.push(format!("{}:{{{}:{},{}}}", r.label, r.start, r.end, r.step));
                }
            }
        }
    }

    tokens.join(" ")
}

/// 一个条目的文本，`Disabled` 不写出
fn format_entry(key: &str, entry: &DeckEntry, options: &DeckOptions) -> Option<String> {
    let text = match entry {
        DeckEntry::Disabled => return None,
        DeckEntry::Bare => key.to_string(),
        DeckEntry::Scalar(value) => format!("{} {}", key, format_scalar(value, options)),
        DeckEntry::ZoneSampling([a, b, c]) => format!("{} {} {} {}", key, a, b, c),
        DeckEntry::KPoints(points) => {
            let mut tokens = vec![key.to_string()];
            for (label, [x, y, z]) in points {
                tokens.push(format!("{}=({},{},{})", label, x, y, z));
            }
            tokens.join(" ")
        }
        DeckEntry::KPath { path, npoints } => match npoints {
            Some(n) => format!("{} ({}) {}", key, path.join(","), n),
            None => format!("{} ({})", key, path.join(",")),
        },
        DeckEntry::Section(items) => {
            let mut block = vec![format!("SECTION {}", key)];
            for (sub_key, value) in items {
                block.push(match value {
                    SectionValue::Flag => sub_key.clone(),
                    SectionValue::Value(v) => format!("{} {}", sub_key, v.to_uppercase()),
                });
            }
            block.push("END".to_string());
            block.join("\n")
        }
        DeckEntry::Job(job) => format_job(job),
        DeckEntry::Energy(filename) => format!("{} {}", key, filename),
        DeckEntry::PassThrough(text) => text.clone(),
    };
    Some(text)
}

/// 写出完整的 spex.inp 文本
pub fn serialize(deck: &InputDeck, options: &DeckOptions) -> String {
    let mut out = provenance_header();
    out.push('\n');

    for (key, entry) in deck.entries() {
        if let Some(text) = format_entry(key, entry, options) {
            out.push_str(&text);
            out.push('\n');
        }
    }
    out
}
