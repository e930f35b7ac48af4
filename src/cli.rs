use clap::{Parser, ValueEnum};
use revenue_forecast::export::{to_csv_string, ChartPayload};
use revenue_forecast::pipeline::ResultTable;
use revenue_forecast::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "revcast",
    version,
    about = "Merge a legacy and a current analytics export and forecast one metric"
)]
pub struct Cli {
    #[arg(
        long,
        required_unless_present = "list_metrics",
        help = "CSV export of the primary (current) source"
    )]
    pub primary: Option<PathBuf>,
    #[arg(
        long,
        required_unless_present = "list_metrics",
        help = "CSV export of the legacy source"
    )]
    pub legacy: Option<PathBuf>,
    #[arg(long, default_value = "Revenue", help = "Metric display name")]
    pub metric: String,
    #[arg(long, help = "Days to forecast past the last observation")]
    pub horizon: Option<usize>,
    #[arg(long, help = "Interval coverage in (0, 1)")]
    pub coverage: Option<f64>,
    #[arg(long, help = "JSON configuration file")]
    pub config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    #[arg(long, help = "Write the result here instead of stdout")]
    pub output: Option<PathBuf>,
    #[arg(long, help = "List the known metrics and exit")]
    pub list_metrics: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

pub fn render(table: &ResultTable, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_text(table)),
        OutputFormat::Csv => to_csv_string(table),
        OutputFormat::Json => ChartPayload::from_table(table).to_json(),
    }
}

fn render_text(table: &ResultTable) -> String {
    let cells: Vec<[String; 5]> = table
        .rows
        .iter()
        .map(|r| {
            [
                r.date.clone(),
                r.actual.map(|v| format!("{:.2}", v)).unwrap_or_default(),
                format!("{:.2}", r.predicted),
                format!("{:.2}", r.lower_bound),
                format!("{:.2}", r.upper_bound),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.len()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c, w = w))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (c, w))| {
                if i == 0 {
                    format!("{:<w$}", c, w = w)
                } else {
                    format!("{:>w$}", c, w = w)
                }
            })
            .collect();
        out.push_str(&line.join("  "));
        out.push('\n');
    }
    out
}
