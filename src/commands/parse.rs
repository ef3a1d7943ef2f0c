//! # parse 命令实现
//!
//! 解析 spex.out 并以表格形式显示运行信息、晶格和晶胞信息。
//!
//! ## 功能
//! - 运行信息、晶格、晶胞、能量汇总
//! - 可选 k 点列表
//! - 可选 out.error 扫描
//! - 可选 JSON 输出
//!
//! ## 依赖关系
//! - 使用 `cli/parse.rs` 定义的参数
//! - 使用 spexkit `parsers/spex_out.rs`, `parsers/error_log.rs`
//! - 使用 `utils/output.rs`

use super::{spex_out_path, write_text};
use crate::cli::parse::ParseArgs;
use crate::utils::output;
use spexkit::error::Result;
use spexkit::models::{ErrorLog, SpexOutput};
use spexkit::parsers::{self, error_log, spex_out};

use serde::Serialize;
use std::path::PathBuf;
use tabled::{Table, Tabled};

/// 字段表的一行
#[derive(Debug, Clone, Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// k 点表的一行
#[derive(Debug, Clone, Tabled)]
struct KPointRow {
    #[tabled(rename = "k point")]
    label: String,
    #[tabled(rename = "kx")]
    x: String,
    #[tabled(rename = "ky")]
    y: String,
    #[tabled(rename = "kz")]
    z: String,
}

/// JSON 输出
#[derive(Serialize)]
struct ParseReport<'a> {
    #[serde(flatten)]
    output: &'a SpexOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_log: Option<&'a ErrorLog>,
}

fn row(field: &str, value: impl Into<String>) -> FieldRow {
    FieldRow {
        field: field.to_string(),
        value: value.into(),
    }
}

fn or_dash(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn join_values(values: &[f64], unit: Option<&str>) -> String {
    if values.is_empty() {
        return "-".to_string();
    }
    let joined = values
        .iter()
        .map(|v| format!("{:.5}", v))
        .collect::<Vec<_>>()
        .join(", ");
    match unit {
        Some(u) => format!("{} {}", joined, u),
        None => joined,
    }
}

fn summary_rows(out: &SpexOutput) -> Vec<FieldRow> {
    let run = &out.run;
    let lattice = &out.lattice;
    let cell = &out.unit_cell;
    let unit = out.summary.energy_unit.as_deref();

    vec![
        row("Version", or_dash(run.version.as_ref())),
        row("Execution time", or_dash(run.execution_time.as_ref())),
        row("Hostname", or_dash(run.hostname.as_ref())),
        row("Interfaced to", or_dash(run.interfaced_to.as_ref())),
        row("MPI", or_dash(run.mpi.as_ref())),
        row("Walltime (s)", or_dash(run.walltime)),
        row("Spins", lattice.number_of_spins.to_string()),
        row("Types / centers", format!("{} / {}", lattice.number_of_types, lattice.number_of_centers)),
        row("Lattice parameter", format!("{:.4}", lattice.lattice_parameter)),
        row("Unit-cell volume", format!("{:.4}", lattice.unit_cell_volume)),
        row("Atoms", cell.atom_labels().join(" ")),
        row("Symmetry operations", or_dash(cell.number_of_symmetry_operations)),
        row("Valence electrons", or_dash(cell.number_of_valence_electrons)),
        row(
            "k points (IBZ)",
            format!(
                "{} ({})",
                or_dash(cell.number_of_k_points),
                or_dash(cell.number_of_k_points_in_ibz)
            ),
        ),
        row("Fermi energy", join_values(&out.summary.fermi_energy, unit)),
        row("Energy gap", join_values(&out.summary.energy_gap, unit)),
    ]
}

/// 执行 parse 命令
pub fn execute(args: ParseArgs) -> Result<()> {
    output::print_header("Parsing SPEX Output");

    let path = spex_out_path(&args.input);
    let content = parsers::read_text(&path)?;
    let parsed = spex_out::parse_spex_output(&content)?;
    output::print_success(&format!("Parsed '{}'", path.display()));

    println!("{}", Table::new(summary_rows(&parsed)));

    if args.kpoints {
        let rows: Vec<KPointRow> = parsed
            .unit_cell
            .list_of_k_points
            .iter()
            .map(|k| KPointRow {
                label: k.label.clone(),
                x: format!("{:.6}", k.coords[0]),
                y: format!("{:.6}", k.coords[1]),
                z: format!("{:.6}", k.coords[2]),
            })
            .collect();
        output::print_header(&format!("List of k points ({})", rows.len()));
        println!("{}", Table::new(rows));
    }

    // out.error: 显式给出的路径必须存在，默认路径缺失时跳过
    let default_log = path
        .parent()
        .map(|dir| dir.join("out.error"))
        .unwrap_or_else(|| PathBuf::from("out.error"));
    let log = match &args.error_log {
        Some(p) => Some(error_log::parse_error_log(&parsers::read_text(p)?)),
        None if default_log.is_file() => {
            Some(error_log::parse_error_log(&parsers::read_text(&default_log)?))
        }
        None => None,
    };

    if let Some(log) = &log {
        output::print_error_log(log);
    }

    if let Some(json_path) = &args.json {
        let report = ParseReport {
            output: &parsed,
            error_log: log.as_ref(),
        };
        write_text(json_path, &serde_json::to_string_pretty(&report)?)?;
        output::print_saved("JSON", json_path);
    }

    Ok(())
}
