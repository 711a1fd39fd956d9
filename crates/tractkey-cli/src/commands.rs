use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, Table};
use polars::prelude::{AnyValue, DataFrame};
use tracing::{info, info_span};

use tractkey_cli::config::{FipsConfig, RunConfig, parse_variant};
use tractkey_cli::pipeline::{RunOutput, build_code_tables, join_sources, run_sources, summarize};
use tractkey_cli::summary::{align_column, apply_table_style, dim_cell, header_cell};
use tractkey_cli::types::{JoinReport, RunSummary};
use tractkey_codes::{FipsCodeTable, Region};
use tractkey_fwf::CraSchemaCatalog;
use tractkey_model::{CodeLabelCatalog, MapCatalog};
use tractkey_reconcile::{GeographyFilter, JoinGranularity, records_to_frame};

use crate::cli::{FipsArgs, GranularityArg, JoinArgs, RunArgs, SchemasArgs};

pub fn run_run(args: &RunArgs) -> Result<RunSummary> {
    let mut config = RunConfig::load(&args.config)?;
    config.override_region(args.state.as_deref(), &args.counties);
    let span = info_span!("run", state = %config.region.state, sources = config.sources.len());
    let _guard = span.enter();

    let tables = build_code_tables(&config)?;
    let output = run_sources(&config, &tables)?;
    let filter = tables.filter();
    let summary = summarize(&output, &tables.region, &filter);
    info!(
        sources = summary.sources.len(),
        diagnostics = summary.diagnostics.len(),
        has_errors = summary.has_errors,
        "run complete"
    );

    if let Some(rows) = args.preview {
        print_preview(&output, &filter, tables.labels.as_ref(), rows)?;
    }
    Ok(summary)
}

pub fn run_fips(args: &FipsArgs) -> Result<()> {
    let fips = FipsConfig {
        path: args.listing.clone(),
        state_lines: args.state_lines,
        county_lines: args.county_lines,
    };
    let parsed = FipsCodeTable::load(&fips.path, &fips.layout())
        .with_context(|| format!("load FIPS listing {}", fips.path.display()))?;
    let region = Region::resolve(&parsed.table, &args.state, &[]).context("resolve state")?;

    println!(
        "{} ({}, FIPS {})",
        region.state_name, region.state_abbreviation, region.state_code
    );
    if parsed.skipped_lines > 0 {
        println!("Skipped listing lines: {}", parsed.skipped_lines);
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Code"), header_cell("County")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (code, name) in parsed.table.counties_in_state(&region.state_code) {
        table.add_row(vec![code, name]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_schemas(args: &SchemasArgs) -> Result<()> {
    let catalog = CraSchemaCatalog::new().context("build CRA schemas")?;
    let mut table = Table::new();
    match &args.variant {
        Some(wanted) => {
            let variant = parse_variant(wanted)?;
            let schema = catalog.schema(variant);
            println!(
                "{} ({}), {} characters",
                variant.table_name(),
                variant.token(),
                schema.record_len()
            );
            table.set_header(vec![
                header_cell("#"),
                header_cell("Field"),
                header_cell("Start"),
                header_cell("Width"),
            ]);
            apply_table_style(&mut table);
            for index in [0, 2, 3] {
                align_column(&mut table, index, CellAlignment::Right);
            }
            for (index, (field, start)) in schema.fields().iter().zip(schema.offsets()).enumerate() {
                table.add_row(vec![
                    (index + 1).to_string(),
                    field.name.clone(),
                    (start + 1).to_string(),
                    field.width.to_string(),
                ]);
            }
        }
        None => {
            table.set_header(vec![
                header_cell("Token"),
                header_cell("Table"),
                header_cell("Geography"),
                header_cell("Fields"),
                header_cell("Length"),
            ]);
            apply_table_style(&mut table);
            align_column(&mut table, 3, CellAlignment::Right);
            align_column(&mut table, 4, CellAlignment::Right);
            for (variant, schema) in catalog.iter() {
                table.add_row(vec![
                    variant.token().to_string(),
                    variant.table_name().to_string(),
                    variant.geography().as_str().to_string(),
                    schema.field_count().to_string(),
                    schema.record_len().to_string(),
                ]);
            }
        }
    }
    println!("{table}");
    Ok(())
}

pub fn run_join(args: &JoinArgs) -> Result<JoinReport> {
    let config = RunConfig::load(&args.config)?;
    let tables = build_code_tables(&config)?;
    let granularity = match args.granularity {
        GranularityArg::Tract => JoinGranularity::Tract,
        GranularityArg::County => JoinGranularity::County,
    };
    join_sources(&config, &tables, &args.left, &args.right, granularity)
}

pub fn print_join(report: &JoinReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Side"),
        header_cell("Source"),
        header_cell("In region"),
        header_cell("Skipped"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    table.add_row(vec![
        "left".to_string(),
        report.left.clone(),
        report.left_records.to_string(),
        report.skipped_left.to_string(),
    ]);
    table.add_row(vec![
        "right".to_string(),
        report.right.clone(),
        report.right_records.to_string(),
        report.skipped_right.to_string(),
    ]);
    println!("Join on {}", report.granularity);
    println!("{table}");
    println!(
        "Pairs: {}, left records matched: {}",
        report.pairs, report.matched_left
    );
}

fn print_preview(
    output: &RunOutput,
    filter: &GeographyFilter,
    labels: Option<&MapCatalog>,
    rows: usize,
) -> Result<()> {
    let labels = labels.map(|catalog| catalog as &dyn CodeLabelCatalog);
    for source in &output.sources {
        let records: Vec<_> = source
            .records
            .iter()
            .filter(|record| filter.matches(&record.geography.key))
            .take(rows)
            .cloned()
            .collect();
        let frame = records_to_frame(&records, labels)
            .with_context(|| format!("build preview frame for {}", source.name))?;
        println!();
        println!("{} ({} of {} records)", source.name, frame.height(), source.records.len());
        println!("{}", frame_table(&frame));
    }
    Ok(())
}

fn frame_table(frame: &DataFrame) -> Table {
    let mut table = Table::new();
    table.set_header(
        frame
            .get_column_names()
            .into_iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for idx in 0..frame.height() {
        let row = frame
            .get_columns()
            .iter()
            .map(|column| match column.get(idx) {
                Ok(AnyValue::String(value)) => Cell::new(value),
                Ok(AnyValue::StringOwned(value)) => Cell::new(value.as_str()),
                _ => dim_cell("-"),
            })
            .collect::<Vec<_>>();
        table.add_row(row);
    }
    table
}
