//! # input 命令实现
//!
//! 由 JSON 配置生成 spex.inp。
//!
//! ## 流程
//! 1. 读取 JSON 配置并构造 InputDeck（不支持的值形状在此报错）
//! 2. 按关键字语法校验（`--no-validate` 跳过）
//! 3. 写出 spex.inp
//!
//! ## 依赖关系
//! - 使用 `cli/input.rs` 定义的参数
//! - 使用 spexkit `deck/`
//! - 使用 `utils/output.rs`

use super::write_text;
use crate::cli::input::InputArgs;
use crate::utils::output;
use spexkit::deck::{self, DeckEntry, DeckOptions, InputDeck};
use spexkit::error::Result;

/// 执行 input 命令
pub fn execute(args: InputArgs) -> Result<()> {
    let quiet = args.stdout;
    if !quiet {
        output::print_header("Generating SPEX Input");
    }

    let deck = InputDeck::from_json_file(&args.config)?;
    if !quiet {
        output::print_info(&format!(
            "Loaded {} keywords from '{}'",
            deck.len(),
            args.config.display()
        ));
    }

    if args.no_validate {
        if !quiet {
            output::print_warning("Keyword validation skipped");
        }
    } else {
        deck::validate(&deck)?;
        if !quiet {
            output::print_success("Configuration passed keyword validation");
        }
    }

    if !quiet && matches!(deck.get("CUSTOM"), Some(DeckEntry::PassThrough(_))) {
        output::print_warning("CUSTOM content is written verbatim and is not validated");
    }

    if args.check {
        output::print_done("Configuration is valid");
        return Ok(());
    }

    let options = DeckOptions {
        float_unit: args.float_unit,
    };
    let text = deck::serialize(&deck, &options);

    if quiet {
        print!("{}", text);
        return Ok(());
    }

    write_text(&args.output, &text)?;
    output::print_written(&args.config, &args.output);
    output::print_done(&format!(
        "Wrote {} lines to '{}'",
        text.lines().count(),
        args.output.display()
    ));

    Ok(())
}
