//! # extract 命令实现
//!
//! 通过注册表查找结果类别所在的文件，必要时先解析 spex.out 得到上下文，
//! 再分发到对应的提取器。
//!
//! ## 输出
//! - JSON: `{"parser": <名称>, "results": {...}}`；未注册的类别输出 `{}`
//! - CSV: GW/KS 能量表（可选）
//!
//! ## 依赖关系
//! - 使用 `cli/extract.rs` 定义的参数
//! - 使用 spexkit `registry.rs`
//! - 使用 `utils/output.rs`

use super::{require_dir, write_text};
use crate::cli::extract::ExtractArgs;
use crate::utils::output;
use spexkit::error::{Result, SpexError};
use spexkit::models::{GwTable, KsTable};
use spexkit::parsers;
use spexkit::{ParseContext, ParsedRecord, ParserKind, ParserRegistry};

use std::path::Path;

/// 按类别从作业目录读取并分发
pub(crate) fn extract_record(
    registry: &ParserRegistry,
    job_dir: &Path,
    kind: &str,
) -> Result<ParsedRecord> {
    let Some(filename) = registry.filename_for(kind) else {
        return Ok(ParsedRecord::Empty);
    };

    let needs_context = kind
        .parse::<ParserKind>()
        .map(|k| k.needs_context())
        .unwrap_or(false);
    let ctx = if needs_context {
        ParseContext::from_spex_out(&parsers::read_text(&job_dir.join("spex.out"))?)?
    } else {
        ParseContext::default()
    };

    let content = parsers::read_text(&job_dir.join(filename))?;
    registry.dispatch(kind, &content, &ctx)
}

/// JSON 文本；空记录为 `{}`
pub(crate) fn record_json(record: &ParsedRecord) -> Result<String> {
    if record.is_empty() {
        return Ok("{}".to_string());
    }
    Ok(serde_json::to_string_pretty(record)?)
}

/// 导出 GW 表（实部与虚部并排）
fn write_gw_csv(table: &GwTable, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "band", "kpoint", "spin", "vxc", "sigmax", "sigmac", "Z", "KS", "HF", "GW", "lin/dir",
        "im_sigmac", "im_Z", "im_GW", "im_lin/dir",
    ])?;

    for (re, im) in table.real.iter().zip(&table.imag) {
        wtr.write_record(&[
            re.band.to_string(),
            re.k_point.to_string(),
            re.spin.to_string(),
            format!("{:.5}", re.vxc),
            format!("{:.5}", re.sigma_x),
            format!("{:.5}", re.sigma_c),
            format!("{:.5}", re.z),
            format!("{:.5}", re.ks),
            format!("{:.5}", re.hf),
            format!("{:.5}", re.gw),
            format!("{:.5}", re.lin_dir),
            format!("{:.5}", im.sigma_c),
            format!("{:.5}", im.z),
            format!("{:.5}", im.gw),
            format!("{:.5}", im.lin_dir),
        ])?;
    }

    wtr.flush().map_err(|e| SpexError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出 KS 表
fn write_ks_csv(table: &KsTable, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["band", "kpoint", "spin", "vxc", "KS"])?;
    for row in &table.rows {
        wtr.write_record(&[
            row.band.to_string(),
            row.k_point.to_string(),
            row.spin.to_string(),
            format!("{:.5}", row.vxc),
            format!("{:.5}", row.ks),
        ])?;
    }

    wtr.flush().map_err(|e| SpexError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 执行 extract 命令
pub fn execute(args: ExtractArgs) -> Result<()> {
    require_dir(&args.job_dir)?;

    let registry = ParserRegistry::standard();
    let record = extract_record(&registry, &args.job_dir, &args.kind)?;
    let json = record_json(&record)?;

    match &args.output {
        Some(path) => {
            output::print_header(&format!("Extracting '{}' Results", args.kind));
            if record.is_empty() {
                output::print_warning(&format!("No parser registered for '{}'", args.kind));
            } else {
                output::print_info(&format!("Parsed {} rows", record.row_count()));
            }
            write_text(path, &json)?;
            output::print_saved("JSON", path);
        }
        None => println!("{}", json),
    }

    if let Some(csv_path) = &args.csv {
        match &record {
            ParsedRecord::Gw(table) => write_gw_csv(table, csv_path)?,
            ParsedRecord::Ks(table) => write_ks_csv(table, csv_path)?,
            _ => {
                output::print_warning("CSV export is only available for gw and ks tables");
                return Ok(());
            }
        }
        output::print_saved("CSV", csv_path);
    }

    Ok(())
}
