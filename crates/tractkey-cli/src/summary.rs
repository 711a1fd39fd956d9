use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tractkey_model::{Diagnostic, Severity};

use crate::types::{RunSummary, SourceSummary};

/// Diagnostics shown in the terminal; the JSON summary carries all of them.
pub const DIAGNOSTIC_DISPLAY_LIMIT: usize = 25;

pub fn print_summary(summary: &RunSummary) {
    println!("State: {}", summary.state);
    if summary.counties.is_empty() {
        println!("Counties: all");
    } else {
        println!("Counties: {}", summary.counties.join(", "));
    }
    println!("{}", render_summary(summary, true));
    if let Some(table) = render_diagnostics(&summary.diagnostics, DIAGNOSTIC_DISPLAY_LIMIT, true) {
        println!();
        println!(
            "Diagnostics: {} errors, {} warnings",
            summary.count(Severity::Error),
            summary.count(Severity::Warning)
        );
        println!("{table}");
        if summary.diagnostics.len() > DIAGNOSTIC_DISPLAY_LIMIT {
            println!(
                "... {} more (use --json for the full list)",
                summary.diagnostics.len() - DIAGNOSTIC_DISPLAY_LIMIT
            );
        }
    }
    if !summary.errors.is_empty() {
        eprintln!("Errors:");
        for error in &summary.errors {
            eprintln!("- {error}");
        }
    }
}

pub fn render_summary(summary: &RunSummary, styled: bool) -> Table {
    let mut table = Table::new();
    if !styled {
        table.force_no_tty();
    }
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Convention"),
        header_cell("Rows"),
        header_cell("Records"),
        header_cell("In region"),
        header_cell("Malformed"),
        header_cell("Blank"),
        header_cell("Unresolved"),
        header_cell("ZIP fallback"),
        header_cell("No tract"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..10 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut totals = SourceSummary {
        name: "TOTAL".to_string(),
        convention: String::new(),
        stats: Default::default(),
        in_region: 0,
    };
    for source in &summary.sources {
        totals.stats.rows += source.stats.rows;
        totals.stats.records += source.stats.records;
        totals.stats.malformed += source.stats.malformed;
        totals.stats.blank_lines += source.stats.blank_lines;
        totals.stats.unresolved += source.stats.unresolved;
        totals.stats.zip_fallback += source.stats.zip_fallback;
        totals.stats.missing_tract += source.stats.missing_tract;
        totals.in_region += source.in_region;
        table.add_row(vec![
            Cell::new(&source.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&source.convention),
            Cell::new(source.stats.rows),
            Cell::new(source.stats.records),
            Cell::new(source.in_region),
            count_cell(source.stats.malformed, Color::Red),
            count_cell(source.stats.blank_lines, Color::Yellow),
            count_cell(source.stats.unresolved, Color::Yellow),
            count_cell(source.stats.zip_fallback, Color::Cyan),
            count_cell(source.stats.missing_tract, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new(&totals.name)
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(totals.stats.rows).add_attribute(Attribute::Bold),
        Cell::new(totals.stats.records).add_attribute(Attribute::Bold),
        Cell::new(totals.in_region).add_attribute(Attribute::Bold),
        count_cell(totals.stats.malformed, Color::Red).add_attribute(Attribute::Bold),
        count_cell(totals.stats.blank_lines, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(totals.stats.unresolved, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(totals.stats.zip_fallback, Color::Cyan).add_attribute(Attribute::Bold),
        count_cell(totals.stats.missing_tract, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Most severe first, then by source and line. `None` when there is
/// nothing to report.
pub fn render_diagnostics(diagnostics: &[Diagnostic], limit: usize, styled: bool) -> Option<Table> {
    if diagnostics.is_empty() {
        return None;
    }
    let mut ordered: Vec<&Diagnostic> = diagnostics.iter().collect();
    ordered.sort_by(|a, b| {
        a.severity()
            .cmp(&b.severity())
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.line.cmp(&b.line))
    });

    let mut table = Table::new();
    if !styled {
        table.force_no_tty();
    }
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Kind"),
        header_cell("Source"),
        header_cell("Line"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    for diagnostic in ordered.into_iter().take(limit) {
        table.add_row(vec![
            severity_cell(diagnostic.severity()),
            Cell::new(diagnostic.kind.as_str()),
            Cell::new(&diagnostic.source),
            diagnostic.line.map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(&diagnostic.message),
        ]);
    }
    Some(table)
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
        .set_width(140);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Info => dim_cell("INFO"),
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tractkey_model::DiagnosticKind;
    use tractkey_reconcile::SourceStats;

    fn summary() -> RunSummary {
        RunSummary {
            state: "TEXAS".to_string(),
            counties: vec!["Dallas County".to_string()],
            sources: vec![SourceSummary {
                name: "hmda".to_string(),
                convention: "hmda".to_string(),
                stats: SourceStats {
                    rows: 4,
                    records: 4,
                    unresolved: 1,
                    ..SourceStats::default()
                },
                in_region: 3,
            }],
            diagnostics: Vec::new(),
            errors: Vec::new(),
            has_errors: false,
        }
    }

    #[test]
    fn test_summary_has_total_row() {
        let rendered = render_summary(&summary(), false).to_string();
        assert!(rendered.contains("hmda"));
        assert!(rendered.contains("TOTAL"));
        assert!(rendered.contains("In region"));
        assert!(!rendered.contains("\u{1b}["));
    }

    #[test]
    fn test_diagnostics_sorted_and_limited() {
        let diagnostics = vec![
            Diagnostic::new(DiagnosticKind::NonGeographicSource, "cra/d5", "no geography"),
            Diagnostic::new(DiagnosticKind::MalformedRecord, "cra/a11", "short line").at_line(7),
            Diagnostic::new(DiagnosticKind::MissingVariant, "cra", "A1-2 missing"),
        ];
        assert!(render_diagnostics(&[], 10, false).is_none());

        let rendered = render_diagnostics(&diagnostics, 10, false)
            .unwrap()
            .to_string();
        let error = rendered.find("ERROR").unwrap();
        let warn = rendered.find("WARN").unwrap();
        let info = rendered.find("INFO").unwrap();
        assert!(error < warn && warn < info);

        let limited = render_diagnostics(&diagnostics, 1, false)
            .unwrap()
            .to_string();
        assert!(limited.contains("short line"));
        assert!(!limited.contains("no geography"));
    }
}
