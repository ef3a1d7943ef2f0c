//! # collect 命令实现
//!
//! 并行扫描多个 SPEX 作业目录，每个作业汇总为一行。
//!
//! ## 功能
//! - 按 glob 模式收集 spex.out
//! - rayon 并行解析
//! - 读取同目录的 out.error 统计错误和警告
//! - 终端表格与 CSV 输出
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `batch/` 收集与并行执行
//! - 使用 spexkit `parsers/spex_out.rs`, `parsers/error_log.rs`
//! - 使用 `utils/output.rs`

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::collect::CollectArgs;
use crate::utils::output;
use spexkit::error::{Result, SpexError};
use spexkit::models::ErrorLog;
use spexkit::parsers::{self, error_log, spex_out};

use std::path::Path;
use tabled::{Table, Tabled};

/// 单个作业的汇总
#[derive(Debug, Clone)]
struct JobSummary {
    job: String,
    version: Option<String>,
    atoms: String,
    spins: usize,
    k_points: Option<usize>,
    k_points_ibz: Option<usize>,
    fermi_energy: Option<f64>,
    energy_gap: Option<f64>,
    walltime: Option<u64>,
    errors: usize,
    warnings: usize,
}

/// 汇总表的一行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Job")]
    job: String,
    #[tabled(rename = "Atoms")]
    atoms: String,
    #[tabled(rename = "Spins")]
    spins: usize,
    #[tabled(rename = "k (IBZ)")]
    k_points: String,
    #[tabled(rename = "E_F (Ha)")]
    fermi: String,
    #[tabled(rename = "Gap (Ha)")]
    gap: String,
    #[tabled(rename = "Err/Warn")]
    diagnostics: String,
}

fn fmt_opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl From<&JobSummary> for SummaryRow {
    fn from(s: &JobSummary) -> Self {
        SummaryRow {
            job: s.job.clone(),
            atoms: s.atoms.clone(),
            spins: s.spins,
            k_points: format!("{} ({})", fmt_opt(s.k_points), fmt_opt(s.k_points_ibz)),
            fermi: s.fermi_energy.map(|e| format!("{:.5}", e)).unwrap_or_default(),
            gap: s.energy_gap.map(|e| format!("{:.5}", e)).unwrap_or_default(),
            diagnostics: format!("{}/{}", s.errors, s.warnings),
        }
    }
}

/// 作业名取 spex.out 所在目录名
fn job_name(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn summarize(path: &Path) -> Result<Option<JobSummary>> {
    let content = parsers::read_text(path)?;

    // 计算尚未写出晶格信息时跳过
    if !content.contains("Lattice parameter") {
        return Ok(None);
    }

    let parsed = spex_out::parse_spex_output(&content)?;

    let log_path = path.with_file_name("out.error");
    let log = if log_path.is_file() {
        error_log::parse_error_log(&parsers::read_text(&log_path)?)
    } else {
        ErrorLog::default()
    };

    Ok(Some(JobSummary {
        job: job_name(path),
        version: parsed.run.version,
        atoms: parsed.unit_cell.atom_labels().join(" "),
        spins: parsed.lattice.number_of_spins,
        k_points: parsed.unit_cell.number_of_k_points,
        k_points_ibz: parsed.unit_cell.number_of_k_points_in_ibz,
        fermi_energy: parsed.summary.fermi_energy.last().copied(),
        energy_gap: parsed.summary.energy_gap.last().copied(),
        walltime: parsed.run.walltime,
        errors: log.errors.len(),
        warnings: log.warnings.len(),
    }))
}

/// 保存汇总到 CSV
fn save_summary_csv(rows: &[JobSummary], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "job",
        "version",
        "atoms",
        "spins",
        "k_points",
        "k_points_ibz",
        "fermi_energy_Ha",
        "energy_gap_Ha",
        "walltime_s",
        "errors",
        "warnings",
    ])?;

    for r in rows {
        wtr.write_record(&[
            r.job.clone(),
            r.version.clone().unwrap_or_default(),
            r.atoms.clone(),
            r.spins.to_string(),
            fmt_opt(r.k_points),
            fmt_opt(r.k_points_ibz),
            r.fermi_energy.map(|e| format!("{:.8}", e)).unwrap_or_default(),
            r.energy_gap.map(|e| format!("{:.8}", e)).unwrap_or_default(),
            fmt_opt(r.walltime),
            r.errors.to_string(),
            r.warnings.to_string(),
        ])?;
    }

    wtr.flush().map_err(|e| SpexError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 执行 collect 命令
pub fn execute(args: CollectArgs) -> Result<()> {
    output::print_header("Collecting SPEX Results");

    let files = FileCollector::new(args.root.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        return Err(SpexError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!(
        "Scanning {} output files with {} threads...",
        files.len(),
        runner.jobs()
    ));

    let result = runner.run(files, |path| match summarize(path) {
        Ok(Some(summary)) => ProcessResult::Success(summary),
        Ok(None) => ProcessResult::Skipped(path.display().to_string()),
        Err(e) => ProcessResult::Failed(path.display().to_string(), e.to_string()),
    })?;

    for (path, err) in &result.failures {
        output::print_warning(&format!("Failed to parse {}: {}", path, err));
    }
    if result.failed() > 0 {
        output::print_warning(&format!("{} jobs failed to parse", result.failed()));
    }
    if result.skipped > 0 {
        output::print_skip(&format!(
            "{} jobs without lattice information",
            result.skipped
        ));
    }

    if result.outputs.is_empty() {
        output::print_warning("No SPEX jobs could be summarized.");
        return Ok(());
    }

    let table_rows: Vec<SummaryRow> = result.outputs.iter().map(SummaryRow::from).collect();
    println!("{}", Table::new(&table_rows));

    save_summary_csv(&result.outputs, &args.output)?;
    output::print_done(&format!(
        "Collected {} of {} jobs into '{}'",
        result.success(),
        result.total(),
        args.output.display()
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_job_name_is_parent_directory() {
        assert_eq!(job_name(&PathBuf::from("runs/si_gw/spex.out")), "si_gw");
    }
}
