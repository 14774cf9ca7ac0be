use crate::error::{FlattenError, FlattenResult};
use crate::pipeline::{self, PipelineConfig, SystemClock};
use crate::types::Table;
use colored::Colorize;
use std::path::PathBuf;

/// The positional input is the only required argument
pub fn require_input(input: Option<PathBuf>) -> FlattenResult<PathBuf> {
    input.ok_or(FlattenError::Usage)
}

/// Execute the flatten command
pub fn process(
    input: PathBuf,
    preview_rows: usize,
    discard_intermediate: bool,
    verbose: bool,
) -> FlattenResult<()> {
    println!("{}", "🔥 Sheet Flatten".bold().green());
    println!("   Input: {}\n", input.display());

    if verbose {
        println!("{}", "📖 Resolving merged cells...".cyan());
    }

    let config = PipelineConfig {
        discard_intermediate,
    };
    let outcome = pipeline::run(&input, &config, &SystemClock)?;

    println!(
        "{} {}",
        "✅ Merged cells resolved:".bold().green(),
        outcome.intermediate_path.display()
    );
    if verbose {
        println!("   {} merged range(s) dissolved", outcome.merges_resolved);
        println!(
            "   {} row(s) x {} column(s) after flattening\n",
            outcome.table.height(),
            outcome.table.width()
        );
    }
    if !outcome.intermediate_kept {
        println!("   (intermediate file removed)");
    }

    if preview_rows > 0 {
        println!("\n{}", render_preview(&outcome.table, preview_rows));
    }

    println!(
        "{} {}",
        "✅ Flattened table saved:".bold().green(),
        outcome.output_path.display()
    );

    Ok(())
}

/// Aligned text rendering of the labels and the first `rows` rows, with a row index column
pub fn render_preview(table: &Table, rows: usize) -> String {
    let shown = &table.rows()[..rows.min(table.height())];

    let mut lines: Vec<Vec<String>> = Vec::with_capacity(shown.len() + 1);
    let mut header = vec![String::new()];
    header.extend(table.labels().iter().cloned());
    lines.push(header);
    for (idx, row) in shown.iter().enumerate() {
        let mut line = vec![idx.to_string()];
        line.extend(row.iter().map(|v| v.to_string()));
        lines.push(line);
    }

    let columns = table.width() + 1;
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            lines
                .iter()
                .map(|line| line[c].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = lines
        .iter()
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:>width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n");

    if table.height() > shown.len() {
        out.push_str(&format!("\n... {} more row(s)", table.height() - shown.len()));
    }
    out
}
