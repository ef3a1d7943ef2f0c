//! # 输入卡片条目
//!
//! 每个顶层关键字的值是一个封闭的变体类型 [`DeckEntry`]，
//! 写出器对它做穷尽匹配。从 JSON 构造时即决定变体，
//! 没有格式规则的 (关键字, 值形状) 组合在这里报 `FormatNotImplemented`。
//!
//! ## JSON 映射
//! | JSON 值 | 条目 |
//! |---------|------|
//! | `true` / `null` / `{}` / `[]` | `Bare` |
//! | `false` | `Disabled`（不写出） |
//! | 字符串 / 整数 / 浮点 | `Scalar`（任何关键字都可以，如 `JOB: "GW 1:(1-4)"`） |
//! | `BZ: [4,4,4]` | `ZoneSampling` |
//! | `KPT: {"X": [0.5,0,0]}` | `KPoints` |
//! | `KPTPATH: ["L","G","X"]` 或 `{"path": [...], "npoints": 50}` | `KPath` |
//! | `<段名>: {...}` | `Section` |
//! | `JOB: {...}` | `Job` |
//! | `ENERGY: "file"` 或 `{"filename": "file"}` | `Energy` |
//! | `CUSTOM: "..."` | `PassThrough` |
//!
//! ## 依赖关系
//! - 被 `deck/mod.rs`, `deck/grammar.rs`, `deck/writer.rs` 使用
//! - 使用 `deck/grammar.rs` 的段名与谱函数任务表

use super::grammar::{is_section, is_spectral_job};
use crate::error::{Result, SpexError};

use serde_json::{Map, Value};

/// 标量值，按原样写出
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// 段内子关键字的值
#[derive(Debug, Clone, PartialEq)]
pub enum SectionValue {
    /// 只有子关键字本身
    Flag,
    /// 写出时转为大写
    Value(String),
}

/// 能带选择：单个能带或闭区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandSelection {
    Single(i64),
    Range(i64, i64),
}

/// 谱函数任务的频率范围 `{start:end,step}`
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralRange {
    pub label: String,
    pub start: String,
    pub end: String,
    pub step: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobSelections {
    /// `label:(4-12,15)` 形式
    Bands(Vec<(String, Vec<BandSelection>)>),
    /// `LABEL:{0:1,0.01}` 形式
    Spectra(Vec<SpectralRange>),
}

/// JOB 行上的一个任务，如 `GW 1:(1-4)`
#[derive(Debug, Clone, PartialEq)]
pub struct JobTask {
    pub kind: String,
    pub selections: JobSelections,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSpec {
    pub tasks: Vec<JobTask>,
}

/// 顶层关键字的值
#[derive(Debug, Clone, PartialEq)]
pub enum DeckEntry {
    Bare,
    Disabled,
    Scalar(ScalarValue),
    ZoneSampling([i64; 3]),
    /// 坐标保持 JSON 中的写法
    KPoints(Vec<(String, [String; 3])>),
    KPath {
        path: Vec<String>,
        npoints: Option<i64>,
    },
    Section(Vec<(String, SectionValue)>),
    Job(JobSpec),
    Energy(String),
    PassThrough(String),
}

impl DeckEntry {
    /// 空值或假值，必须非空的关键字不能取这些值
    pub fn is_empty(&self) -> bool {
        match self {
            DeckEntry::Bare | DeckEntry::Disabled => true,
            DeckEntry::Scalar(ScalarValue::Text(s)) => s.is_empty(),
            DeckEntry::Scalar(ScalarValue::Integer(i)) => *i == 0,
            DeckEntry::Scalar(ScalarValue::Float(f)) => *f == 0.0,
            DeckEntry::KPoints(points) => points.is_empty(),
            DeckEntry::KPath { path, .. } => path.is_empty(),
            DeckEntry::Section(items) => items.is_empty(),
            DeckEntry::Job(job) => job.tasks.is_empty(),
            DeckEntry::Energy(name) | DeckEntry::PassThrough(name) => name.is_empty(),
            DeckEntry::ZoneSampling(_) => false,
        }
    }

    /// 按关键字从 JSON 值构造条目，`key` 须为大写
    pub fn from_json(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null | Value::Bool(true) => return Ok(DeckEntry::Bare),
            Value::Bool(false) => return Ok(DeckEntry::Disabled),
            Value::Object(map) if map.is_empty() => return Ok(DeckEntry::Bare),
            Value::Array(list) if list.is_empty() => return Ok(DeckEntry::Bare),
            _ => {}
        }

        match key {
            "CUSTOM" => pass_through(value),
            "ENERGY" => energy(value),
            "BZ" => zone_sampling(value),
            "KPT" => k_points(value),
            "KPTPATH" => k_path(value),
            "JOB" => match value {
                Value::Object(map) => Ok(DeckEntry::Job(job_spec(map)?)),
                other => scalar_entry(key, other),
            },
            _ if is_section(key) => match value {
                Value::Object(map) => section(key, map),
                other => scalar_entry(key, other),
            },
            _ => scalar_entry(key, value),
        }
    }
}

/// 已经写好的一行，如 `KPTPATH: "(L,G,X) 50"`，原样作为 `KEY value`
fn scalar_entry(key: &str, value: &Value) -> Result<DeckEntry> {
    scalar(value)
        .map(DeckEntry::Scalar)
        .ok_or_else(|| not_implemented(key))
}

fn not_implemented(key: &str) -> SpexError {
    SpexError::FormatNotImplemented {
        key: key.to_string(),
    }
}

fn scalar(value: &Value) -> Option<ScalarValue> {
    match value {
        Value::String(s) => Some(ScalarValue::Text(s.clone())),
        Value::Number(n) => n
            .as_i64()
            .map(ScalarValue::Integer)
            .or_else(|| n.as_f64().map(ScalarValue::Float)),
        _ => None,
    }
}

/// 数字或字符串的文本形式，数字保持 JSON 中的写法
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer(value: &Value, key: &str, what: &str) -> Result<i64> {
    value.as_i64().ok_or_else(|| {
        SpexError::schema(key, format!("{} must be an integer, got {}", what, value))
    })
}

fn pass_through(value: &Value) -> Result<DeckEntry> {
    match value {
        Value::String(s) => Ok(DeckEntry::PassThrough(s.clone())),
        Value::Array(lines) => {
            let lines = lines
                .iter()
                .map(|l| l.as_str().map(str::to_string))
                .collect::<Option<Vec<String>>>()
                .ok_or_else(|| not_implemented("CUSTOM"))?;
            Ok(DeckEntry::PassThrough(lines.join("\n")))
        }
        _ => Err(not_implemented("CUSTOM")),
    }
}

fn energy(value: &Value) -> Result<DeckEntry> {
    match value {
        Value::String(s) => Ok(DeckEntry::Energy(s.clone())),
        Value::Object(map) => match map.get("filename").and_then(scalar_text) {
            Some(name) => Ok(DeckEntry::Energy(name)),
            None => Err(not_implemented("ENERGY")),
        },
        other => scalar_entry("ENERGY", other),
    }
}

fn zone_sampling(value: &Value) -> Result<DeckEntry> {
    match value {
        Value::Array(list) if list.len() == 3 => Ok(DeckEntry::ZoneSampling([
            integer(&list[0], "BZ", "k-point mesh")?,
            integer(&list[1], "BZ", "k-point mesh")?,
            integer(&list[2], "BZ", "k-point mesh")?,
        ])),
        Value::Array(list) => Err(SpexError::schema(
            "BZ",
            format!("expected 3 mesh components, found {}", list.len()),
        )),
        other => scalar_entry("BZ", other),
    }
}

fn coordinate(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn k_points(value: &Value) -> Result<DeckEntry> {
    let map = match value {
        Value::Object(map) => map,
        other => return scalar_entry("KPT", other),
    };

    let mut points = Vec::with_capacity(map.len());
    for (label, coords) in map {
        let coords = coords
            .as_array()
            .filter(|c| c.len() == 3)
            .and_then(|c| Some([coordinate(&c[0])?, coordinate(&c[1])?, coordinate(&c[2])?]))
            .ok_or_else(|| {
                SpexError::schema("KPT", format!("k point '{}' needs 3 numeric coordinates", label))
            })?;
        points.push((label.clone(), coords));
    }
    Ok(DeckEntry::KPoints(points))
}

fn path_labels(list: &[Value]) -> Result<Vec<String>> {
    list.iter()
        .map(|p| scalar_text(p).ok_or_else(|| not_implemented("KPTPATH")))
        .collect()
}

fn k_path(value: &Value) -> Result<DeckEntry> {
    match value {
        Value::Array(list) => Ok(DeckEntry::KPath {
            path: path_labels(list)?,
            npoints: None,
        }),
        Value::Object(map) => {
            let path = match map.get("path") {
                Some(Value::Array(list)) => path_labels(list)?,
                _ => return Err(SpexError::schema("KPTPATH", "missing 'path' list")),
            };
            let npoints = map
                .get("npoints")
                .map(|n| integer(n, "KPTPATH", "npoints"))
                .transpose()?;
            Ok(DeckEntry::KPath { path, npoints })
        }
        other => scalar_entry("KPTPATH", other),
    }
}

fn section(key: &str, map: &Map<String, Value>) -> Result<DeckEntry> {
    let mut items = Vec::with_capacity(map.len());
    for (sub_key, value) in map {
        let value = match value {
            Value::Null | Value::Bool(true) => SectionValue::Flag,
            Value::Object(m) if m.is_empty() => SectionValue::Flag,
            Value::Bool(false) => continue,
            other => match scalar_text(other) {
                Some(text) => SectionValue::Value(text),
                None => {
                    return Err(not_implemented(&format!("{}.{}", key, sub_key.to_uppercase())))
                }
            },
        };
        items.push((sub_key.to_uppercase(), value));
    }
    Ok(DeckEntry::Section(items))
}

fn band_selections(label: &str, value: &Value) -> Result<Vec<BandSelection>> {
    let what = format!("band selection '{}'", label);
    let list = match value {
        Value::Array(list) => list,
        other => return Ok(vec![BandSelection::Single(integer(other, "JOB", &what)?)]),
    };

    // 两个整数的扁平列表表示一个区间
    if list.len() == 2 && list.iter().all(Value::is_i64) {
        return Ok(vec![BandSelection::Range(
            integer(&list[0], "JOB", &what)?,
            integer(&list[1], "JOB", &what)?,
        )]);
    }

    list.iter()
        .map(|item| match item {
            Value::Array(pair) if pair.len() == 2 => Ok(BandSelection::Range(
                integer(&pair[0], "JOB", &what)?,
                integer(&pair[1], "JOB", &what)?,
            )),
            Value::Array(_) => Err(SpexError::schema("JOB", format!("{}: ranges need 2 bounds", what))),
            other => Ok(BandSelection::Single(integer(other, "JOB", &what)?)),
        })
        .collect()
}

fn spectral_range(kind: &str, label: &str, value: &Value) -> Result<SpectralRange> {
    let bad = |reason: &str| SpexError::schema("JOB", format!("{} {}: {}", kind, label, reason));

    let spec = value.as_object().ok_or_else(|| bad("expected {range, step}"))?;
    let (start, end) = match spec.get("range") {
        Some(Value::Array(r)) if r.len() == 2 => (
            scalar_text(&r[0]).ok_or_else(|| bad("range start must be a number"))?,
            scalar_text(&r[1]).ok_or_else(|| bad("range end must be a number"))?,
        ),
        _ => return Err(bad("spectral functions must have a 2-element range")),
    };
    let step = spec
        .get("step")
        .and_then(scalar_text)
        .ok_or_else(|| bad("missing step"))?;

    Ok(SpectralRange {
        label: label.to_uppercase(),
        start,
        end,
        step,
    })
}

fn job_spec(map: &Map<String, Value>) -> Result<JobSpec> {
    let mut tasks = Vec::new();

    for (kind, selections) in map {
        let labels = match selections {
            Value::Object(labels) if !labels.is_empty() => labels,
            Value::Object(_) | Value::Null | Value::Bool(false) => continue,
            _ => return Err(not_implemented(&format!("JOB.{}", kind))),
        };

        let kind = kind.to_uppercase();
        let selections = if is_spectral_job(&kind) {
            JobSelections::Spectra(
                labels
                    .iter()
                    .map(|(label, v)| spectral_range(&kind, label, v))
                    .collect::<Result<_>>()?,
            )
        } else {
            JobSelections::Bands(
                labels
                    .iter()
                    .map(|(label, v)| Ok((label.to_uppercase(), band_selections(label, v)?)))
                    .collect::<Result<_>>()?,
            )
        };
        tasks.push(JobTask { kind, selections });
    }

    Ok(JobSpec { tasks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_markers() {
        for v in [json!(true), json!(null), json!({}), json!([])] {
            assert_eq!(DeckEntry::from_json("NOSYM", &v).unwrap(), DeckEntry::Bare);
        }
        assert_eq!(
            DeckEntry::from_json("NOSYM", &json!(false)).unwrap(),
            DeckEntry::Disabled
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            DeckEntry::from_json("NBAND", &json!(80)).unwrap(),
            DeckEntry::Scalar(ScalarValue::Integer(80))
        );
        assert_eq!(
            DeckEntry::from_json("GAUSS", &json!(0.01)).unwrap(),
            DeckEntry::Scalar(ScalarValue::Float(0.01))
        );
        assert_eq!(
            DeckEntry::from_json("MEM", &json!("2000")).unwrap(),
            DeckEntry::Scalar(ScalarValue::Text("2000".into()))
        );
    }

    #[test]
    fn test_zone_sampling() {
        assert_eq!(
            DeckEntry::from_json("BZ", &json!([4, 4, 4])).unwrap(),
            DeckEntry::ZoneSampling([4, 4, 4])
        );
        assert!(matches!(
            DeckEntry::from_json("BZ", &json!([4, 4])),
            Err(SpexError::Schema { .. })
        ));
    }

    #[test]
    fn test_kpath_shapes() {
        assert_eq!(
            DeckEntry::from_json("KPTPATH", &json!(["L", "G", "X"])).unwrap(),
            DeckEntry::KPath {
                path: vec!["L".into(), "G".into(), "X".into()],
                npoints: None
            }
        );
        assert_eq!(
            DeckEntry::from_json("KPTPATH", &json!({"path": ["L", "G"], "npoints": 50})).unwrap(),
            DeckEntry::KPath {
                path: vec!["L".into(), "G".into()],
                npoints: Some(50)
            }
        );
    }

    #[test]
    fn test_unknown_mapping_is_not_implemented() {
        let err = DeckEntry::from_json("NBAND", &json!({"a": 1})).unwrap_err();
        assert!(matches!(err, SpexError::FormatNotImplemented { key } if key == "NBAND"));

        let err = DeckEntry::from_json("BOGUS", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, SpexError::FormatNotImplemented { .. }));
    }

    #[test]
    fn test_written_out_values_stay_scalars() {
        for key in ["JOB", "KPTPATH", "KPT", "SENERGY"] {
            assert!(matches!(
                DeckEntry::from_json(key, &json!("GW 1:(1-4)")).unwrap(),
                DeckEntry::Scalar(ScalarValue::Text(_))
            ));
        }
        assert!(matches!(
            DeckEntry::from_json("KPT", &json!([0.5, 0, 0])),
            Err(SpexError::FormatNotImplemented { .. })
        ));
    }

    #[test]
    fn test_k_point_coordinates_keep_json_text() {
        assert_eq!(
            DeckEntry::from_json("KPT", &json!({"X": [0.5, 0, 0]})).unwrap(),
            DeckEntry::KPoints(vec![(
                "X".into(),
                ["0.5".into(), "0".into(), "0".into()]
            )])
        );
        assert!(matches!(
            DeckEntry::from_json("KPT", &json!({"X": ["a", 0, 0]})),
            Err(SpexError::Schema { .. })
        ));
    }

    #[test]
    fn test_energy_requires_filename() {
        assert_eq!(
            DeckEntry::from_json("ENERGY", &json!({"filename": "energy.inp"})).unwrap(),
            DeckEntry::Energy("energy.inp".into())
        );
        assert!(DeckEntry::from_json("ENERGY", &json!({"column": "GW"})).is_err());
    }

    #[test]
    fn test_job_band_selections() {
        let entry = DeckEntry::from_json(
            "JOB",
            &json!({"GW": {"1": [[1, 4], 7], "x": 5}, "KS": {}}),
        )
        .unwrap();
        let DeckEntry::Job(job) = entry else {
            panic!("expected a job entry");
        };
        assert_eq!(job.tasks.len(), 1);
        assert_eq!(
            job.tasks[0].selections,
            JobSelections::Bands(vec![
                (
                    "1".into(),
                    vec![BandSelection::Range(1, 4), BandSelection::Single(7)]
                ),
                ("X".into(), vec![BandSelection::Single(5)]),
            ])
        );
    }

    #[test]
    fn test_job_spectral_requires_range() {
        let err = DeckEntry::from_json("JOB", &json!({"DIELEC": {"r": {"step": 0.01}}}))
            .unwrap_err();
        assert!(matches!(err, SpexError::Schema { .. }));
    }
}
