//! # plot 命令实现
//!
//! 使用 `plotters` 绘制 dielecR 中介电函数的实部和虚部随频率的变化。
//! 支持 PNG 和 SVG 输出。
//!
//! ## 依赖关系
//! - 使用 `cli/plot.rs` 定义的参数
//! - 使用 spexkit `parsers/dielectric.rs`
//! - 使用 `plotters` 渲染图表

use crate::cli::plot::{PlotArgs, PlotFormat};
use crate::utils::output;
use spexkit::error::{Result, SpexError};
use spexkit::models::DielectricTable;
use spexkit::parsers::{self, dielectric};

use plotters::prelude::*;
use std::path::Path;

/// 根据扩展名确定输出格式
fn resolve_format(path: &Path, format: Option<PlotFormat>) -> PlotFormat {
    format.unwrap_or_else(|| {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
        {
            Some(ext) if ext == "svg" => PlotFormat::Svg,
            _ => PlotFormat::Png,
        }
    })
}

/// 数据范围，留出 5% 边距
fn value_range(table: &DielectricTable) -> (f64, f64) {
    let (lo, hi) = table
        .points
        .iter()
        .flat_map(|p| [p.real, p.imaginary])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let margin = ((hi - lo).abs() * 0.05).max(1e-6);
    (lo - margin, hi + margin)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    table: &DielectricTable,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| SpexError::Other(format!("{:?}", e)))?;

    let x_min = table.points.first().map(|p| p.frequency).unwrap_or(0.0);
    let x_max = table.points.last().map(|p| p.frequency).unwrap_or(1.0);
    let (y_min, y_max) = value_range(table);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| SpexError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Frequency (Ha)")
        .y_desc("Dielectric function")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| SpexError::Other(format!("{:?}", e)))?;

    chart
        .draw_series(LineSeries::new(
            table.points.iter().map(|p| (p.frequency, p.real)),
            BLUE.stroke_width(2),
        ))
        .map_err(|e| SpexError::Other(format!("{:?}", e)))?
        .label("Re ε(ω)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .draw_series(LineSeries::new(
            table.points.iter().map(|p| (p.frequency, p.imaginary)),
            RED.stroke_width(2),
        ))
        .map_err(|e| SpexError::Other(format!("{:?}", e)))?
        .label("Im ε(ω)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| SpexError::Other(format!("{:?}", e)))?;

    Ok(())
}

/// 执行 plot 命令
pub fn execute(args: PlotArgs) -> Result<()> {
    output::print_header("Plotting Dielectric Function");

    let content = parsers::read_text(&args.input)?;
    let table = dielectric::parse_dielectric(&content)?;

    if table.points.len() < 2 {
        return Err(SpexError::InvalidArgument(format!(
            "'{}' has {} data points, at least 2 are needed to plot",
            args.input.display(),
            table.points.len()
        )));
    }

    if table.spin.len() > 1 || table.kpoint.len() > 1 {
        output::print_warning("File holds several spin/k-point blocks, they are drawn as one curve");
    }

    let title = args.title.clone().unwrap_or_else(|| {
        let name = args
            .input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("{} (lattvec {})", name, table.lattvec)
    });

    match resolve_format(&args.output, args.format) {
        PlotFormat::Svg => {
            let root = SVGBackend::new(&args.output, (args.width, args.height)).into_drawing_area();
            draw_chart(&root, &table, &title)?;
            root.present()
                .map_err(|e| SpexError::Other(e.to_string()))?;
        }
        PlotFormat::Png => {
            let root =
                BitMapBackend::new(&args.output, (args.width, args.height)).into_drawing_area();
            draw_chart(&root, &table, &title)?;
            root.present()
                .map_err(|e| SpexError::Other(e.to_string()))?;
        }
    }

    output::print_success(&format!(
        "Plotted {} points to '{}'",
        table.points.len(),
        args.output.display()
    ));

    Ok(())
}
