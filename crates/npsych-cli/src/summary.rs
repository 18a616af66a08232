use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use npsych_model::{OutputFormat, cell_text};
use npsych_query::Relation;
use polars::prelude::DataFrame;

use crate::types::{ArtifactSummary, RunResult};

pub fn print_summary(result: &RunResult) {
    println!("Source: {}", result.source_dir.display());
    if result.dry_run {
        println!("Output: (dry run, nothing written)");
    } else {
        println!("Output: {}", result.output_dir.display());
    }
    if let Some(path) = &result.manifest {
        println!("Manifest: {}", path.display());
    }
    println!(
        "Files: {}  Duplicates removed: {}  Unclassified: {}  z null (no percentile): {}  z nullified: {}",
        result.files.len(),
        result.normalize.duplicates_removed,
        result.normalize.unclassified,
        result.normalize.z.missing,
        result.normalize.z.nullified,
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Records"),
        header_cell("CSV"),
        header_cell("Parquet"),
        header_cell("Feather"),
        header_cell("Fallback"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for index in 2..5 {
        align_column(&mut table, index, CellAlignment::Center);
    }

    for summary in &result.datasets {
        let fallbacks: Vec<String> = summary
            .outputs
            .iter()
            .filter(|artifact| artifact.fallback)
            .map(|artifact| format!("{}: {}", artifact.format, artifact.writer))
            .collect();
        table.add_row(vec![
            Cell::new(summary.kind.name()).add_attribute(Attribute::Bold),
            Cell::new(summary.records),
            output_cell(summary.output(OutputFormat::Csv)),
            output_cell(summary.output(OutputFormat::Parquet)),
            output_cell(summary.output(OutputFormat::Feather)),
            if fallbacks.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(fallbacks.join(", ")).fg(Color::Yellow)
            },
        ]);
    }
    println!("{table}");
    print_coercion_table(result);
}

fn print_coercion_table(result: &RunResult) {
    if result.coercions.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Column"), header_cell("Coerced to null")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (column, count) in &result.coercions.by_column {
        table.add_row(vec![Cell::new(column), Cell::new(count).fg(Color::Yellow)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(result.coercions.total()).add_attribute(Attribute::Bold),
    ]);
    println!();
    println!("Unparseable numeric cells:");
    println!("{table}");
}

/// Prints a query result with one table row per frame row.
pub fn print_frame(df: &DataFrame) {
    let mut table = Table::new();
    table.set_header(
        df.get_column_names()
            .into_iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    let columns = df.get_columns();
    for idx in 0..df.height() {
        let row: Vec<Cell> = columns
            .iter()
            .map(|column| match column.get(idx).ok().and_then(cell_text) {
                Some(text) => Cell::new(text),
                None => dim_cell("null"),
            })
            .collect();
        table.add_row(row);
    }
    println!("{table}");
    println!("({} rows)", df.height());
}

pub fn print_relations(relations: &[Relation]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Relation"),
        header_cell("Format"),
        header_cell("Artifact"),
        header_cell("Shadowed"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for relation in relations {
        let shadowed: Vec<String> = relation
            .shadowed
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        table.add_row(vec![
            Cell::new(&relation.name).add_attribute(Attribute::Bold),
            Cell::new(relation.format),
            Cell::new(relation.path.display()),
            if shadowed.is_empty() {
                dim_cell("-")
            } else {
                dim_cell(shadowed.join(", "))
            },
        ]);
    }
    println!("{table}");
}

fn output_cell(artifact: Option<&ArtifactSummary>) -> Cell {
    match artifact {
        Some(artifact) if artifact.fallback => Cell::new("✓").fg(Color::Yellow),
        Some(_) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string())
        .fg(Color::DarkGrey)
        .add_attribute(Attribute::Dim)
}
