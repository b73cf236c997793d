//! Derivation and correlation summary reports

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use polars::prelude::*;

use crate::pipeline::{CorrelatedPair, CorrelationMatrix, CorrelationMethod};

/// Count `inf`/`NaN` values per column. Nulls are not counted.
pub fn non_finite_counts(df: &DataFrame, columns: &[String]) -> Result<Vec<(String, usize)>> {
    let mut counts = Vec::with_capacity(columns.len());
    for name in columns {
        let column = df.column(name)?.cast(&DataType::Float64)?;
        let count = column
            .f64()?
            .into_iter()
            .filter(|v| matches!(v, Some(x) if !x.is_finite()))
            .count();
        counts.push((name.clone(), count));
    }
    Ok(counts)
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn print_section_header(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

/// Summary of a feature derivation run
#[derive(Debug, Default)]
pub struct DerivationSummary {
    pub rows: usize,
    pub base_columns: usize,
    pub final_columns: usize,
    /// Derived columns with the number of non-finite values each holds
    pub derived: Vec<(String, usize)>,
}

impl DerivationSummary {
    pub fn new(rows: usize, base_columns: usize) -> Self {
        Self {
            rows,
            base_columns,
            final_columns: base_columns,
            ..Default::default()
        }
    }

    /// Record the derived columns of `df` and their degenerate-division counts.
    pub fn record(&mut self, df: &DataFrame, derived_columns: &[String]) -> Result<()> {
        self.final_columns = df.width();
        self.derived = non_finite_counts(df, derived_columns)?;
        Ok(())
    }

    /// Derived columns holding at least one `inf`/`NaN` value
    pub fn degenerate_columns(&self) -> Vec<&(String, usize)> {
        self.derived.iter().filter(|(_, count)| *count > 0).collect()
    }

    pub fn display(&self) {
        print_section_header("📋", "DERIVATION SUMMARY");

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![Cell::new("📄 Rows"), Cell::new(self.rows)]);
        table.add_row(vec![
            Cell::new("📁 Base Columns"),
            Cell::new(self.base_columns),
        ]);
        table.add_row(vec![
            Cell::new("➕ Derived Columns"),
            Cell::new(self.derived.len()).fg(Color::Cyan),
        ]);
        table.add_row(vec![
            Cell::new("✅ Final Columns"),
            Cell::new(self.final_columns)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        print_indented(&table);

        let degenerate = self.degenerate_columns();
        if degenerate.is_empty() {
            return;
        }

        print_section_header("⚠️", "NON-FINITE VALUES (zero divisors)");
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Column").add_attribute(Attribute::Bold),
            Cell::new("inf / NaN rows").add_attribute(Attribute::Bold),
            Cell::new("Share").add_attribute(Attribute::Bold),
        ]);
        for (name, count) in degenerate {
            let share = if self.rows > 0 {
                *count as f64 / self.rows as f64 * 100.0
            } else {
                0.0
            };
            table.add_row(vec![
                Cell::new(name),
                Cell::new(count).fg(Color::Yellow),
                Cell::new(format!("{:.1}%", share)),
            ]);
        }
        print_indented(&table);
    }
}

/// Summary of a correlation heatmap run
#[derive(Debug)]
pub struct CorrelationSummary {
    pub method: CorrelationMethod,
    pub columns: usize,
    pub undefined_pairs: usize,
    pub strongest: Vec<CorrelatedPair>,
}

impl CorrelationSummary {
    pub fn from_matrix(matrix: &CorrelationMatrix, top: usize) -> Self {
        Self {
            method: matrix.method(),
            columns: matrix.len(),
            undefined_pairs: matrix.lower_triangle().filter(|(_, _, r)| r.is_nan()).count(),
            strongest: matrix.strongest_pairs(top),
        }
    }

    pub fn display(&self) {
        print_section_header("🔗", "CORRELATION SUMMARY");

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![Cell::new("📐 Method"), Cell::new(self.method)]);
        table.add_row(vec![Cell::new("📁 Numeric Columns"), Cell::new(self.columns)]);
        table.add_row(vec![
            Cell::new("❔ Undefined Pairs"),
            Cell::new(self.undefined_pairs).fg(if self.undefined_pairs == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        print_indented(&table);

        if self.strongest.is_empty() {
            return;
        }

        print_section_header("📝", "STRONGEST PAIRS");
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Feature 1").add_attribute(Attribute::Bold),
            Cell::new("Feature 2").add_attribute(Attribute::Bold),
            Cell::new("r").add_attribute(Attribute::Bold),
        ]);
        for pair in &self.strongest {
            let color = if pair.correlation >= 0.0 {
                Color::Green
            } else {
                Color::Red
            };
            table.add_row(vec![
                Cell::new(&pair.feature1),
                Cell::new(&pair.feature2),
                Cell::new(format!("{:.2}", pair.correlation)).fg(color),
            ]);
        }
        print_indented(&table);
    }
}
