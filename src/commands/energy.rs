//! # energy 命令实现
//!
//! 从作业的 GW 或 KS 能量表中选出一列，写成能量重启文件，
//! 供下一次计算的 `ENERGY` 关键字使用。
//!
//! ## 依赖关系
//! - 使用 `cli/extract.rs` 定义的参数
//! - 使用 `commands/extract.rs` 的记录提取
//! - 使用 spexkit `deck/energy.rs`

use super::extract::extract_record;
use super::{require_dir, write_text};
use crate::cli::extract::{EnergyArgs, EnergySource};
use crate::utils::output;
use spexkit::deck::make_energy_input;
use spexkit::error::{Result, SpexError};
use spexkit::{ParsedRecord, ParserRegistry};

/// 执行 energy 命令
pub fn execute(args: EnergyArgs) -> Result<()> {
    output::print_header("Writing Energy File");
    require_dir(&args.job_dir)?;

    let registry = ParserRegistry::standard();
    let kind = args.source.to_string();
    let record = extract_record(&registry, &args.job_dir, &kind)?;

    let (text, rows) = match (&record, args.source) {
        (ParsedRecord::Gw(table), EnergySource::Gw) => {
            (make_energy_input(&table.real, &args.column)?, table.len())
        }
        (ParsedRecord::Ks(table), EnergySource::Ks) => {
            (make_energy_input(&table.rows, &args.column)?, table.rows.len())
        }
        _ => {
            return Err(SpexError::Other(format!(
                "'{}' did not produce an energy table",
                kind
            )))
        }
    };

    if rows == 0 {
        output::print_warning("The energy table is empty");
    }

    write_text(&args.output, &text)?;
    output::print_done(&format!(
        "Wrote {} '{}' energies to '{}'",
        rows,
        args.column,
        args.output.display()
    ));
    output::print_info(&format!(
        "Use it with the keyword: ENERGY {}",
        args.output.display()
    ));

    Ok(())
}
