//! Run pipeline with explicit stages.
//!
//! 1. **Code tables**: FIPS listing, region, ZIP index, aliases, labels
//! 2. **Reconcile**: every configured source through one normalizer
//! 3. **Summarize**: region filter, per-source counts, diagnostics
//!
//! Stage 1 failures are fatal. A source that cannot be read in stage 2 is
//! recorded and the remaining sources still run.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{error, info, info_span};

use tractkey_codes::{
    CsvZipMembership, FipsCodeTable, Region, ZipCountyIndex, load_alias_map, load_label_catalog,
};
use tractkey_fwf::CraVariant;
use tractkey_model::{Diagnostic, MapCatalog, Severity};
use tractkey_normalize::{GeographicKeyNormalizer, InstitutionNameCleaner};
use tractkey_reconcile::{
    DatasetReconciler, GeographyFilter, JoinGranularity, ReconciledSource, SourceConvention, join,
};

use crate::config::{RunConfig, SourceConfig};
use crate::types::{JoinReport, RunSummary, SourceSummary};

// ============================================================================
// Stage 1: Code tables
// ============================================================================

/// Lookup tables shared by every source of a run.
#[derive(Debug)]
pub struct CodeTables {
    pub fips: FipsCodeTable,
    /// Listing lines inside the configured ranges that had no code or name.
    pub fips_skipped: usize,
    pub region: Region,
    pub zips: Option<ZipCountyIndex>,
    pub institutions: Option<InstitutionNameCleaner>,
    pub labels: Option<MapCatalog>,
}

impl CodeTables {
    pub fn filter(&self) -> GeographyFilter {
        GeographyFilter::for_region(&self.region)
    }
}

pub fn build_code_tables(config: &RunConfig) -> Result<CodeTables> {
    let span = info_span!("code_tables", state = %config.region.state);
    let _guard = span.enter();

    let parsed = FipsCodeTable::load(&config.fips.path, &config.fips.layout())
        .with_context(|| format!("load FIPS listing {}", config.fips.path.display()))?;
    let region = Region::resolve(&parsed.table, &config.region.state, &config.region.counties)
        .context("resolve region")?;

    let zips = match &config.zip {
        Some(zip) => {
            let membership = CsvZipMembership::load(&zip.path)
                .with_context(|| format!("load ZIP membership {}", zip.path.display()))?;
            let index = ZipCountyIndex::for_region(&region, &membership)
                .context("build ZIP county index")?;
            Some(index)
        }
        None => None,
    };
    let institutions = match &config.institutions {
        Some(institutions) => {
            let aliases = load_alias_map(&institutions.aliases).with_context(|| {
                format!("load institution aliases {}", institutions.aliases.display())
            })?;
            Some(InstitutionNameCleaner::new(aliases))
        }
        None => None,
    };
    let labels = match &config.labels {
        Some(labels) => Some(
            load_label_catalog(&labels.path)
                .with_context(|| format!("load code labels {}", labels.path.display()))?,
        ),
        None => None,
    };

    info!(
        states = parsed.table.state_codes().len(),
        counties = parsed.table.county_codes().len(),
        region_counties = region.counties.len(),
        zips = zips.as_ref().map_or(0, ZipCountyIndex::len),
        "code tables built"
    );
    Ok(CodeTables {
        fips: parsed.table,
        fips_skipped: parsed.skipped_lines,
        region,
        zips,
        institutions,
        labels,
    })
}

// ============================================================================
// Stage 2: Reconcile
// ============================================================================

/// Everything the sources produced, in configuration order.
#[derive(Debug, Default)]
pub struct RunOutput {
    pub sources: Vec<ReconciledSource>,
    /// Diagnostics not tied to a single reconciled source (CRA discovery).
    pub diagnostics: Vec<Diagnostic>,
    pub errors: Vec<String>,
}

pub fn build_reconciler(tables: &CodeTables) -> Result<DatasetReconciler<'_>> {
    let mut normalizer = GeographicKeyNormalizer::new(&tables.fips);
    if let Some(zips) = &tables.zips {
        normalizer = normalizer.with_zip_index(zips);
    }
    let mut reconciler = DatasetReconciler::new(normalizer).context("build reconciler")?;
    if let Some(cleaner) = &tables.institutions {
        reconciler = reconciler.with_institution_cleaner(cleaner);
    }
    Ok(reconciler)
}

pub fn run_sources(config: &RunConfig, tables: &CodeTables) -> Result<RunOutput> {
    let reconciler = build_reconciler(tables)?;
    let mut output = RunOutput::default();
    for source in &config.sources {
        if let Err(error) = run_source(&reconciler, source, &mut output) {
            error!(source = %source.name, error = %error, "source failed");
            output.errors.push(format!("{}: {error}", source.name));
        }
    }
    Ok(output)
}

/// Reconciles the sources named in `names`, in that order.
pub fn run_named_sources(
    config: &RunConfig,
    tables: &CodeTables,
    names: &[&str],
) -> Result<Vec<ReconciledSource>> {
    let reconciler = build_reconciler(tables)?;
    let mut sources = Vec::with_capacity(names.len());
    for name in names {
        let source = config
            .source(name)
            .with_context(|| format!("no source named '{name}' in the configuration"))?;
        let mut output = RunOutput::default();
        run_source(&reconciler, source, &mut output)
            .with_context(|| format!("reconcile source '{name}'"))?;
        let mut merged = ReconciledSource::new(name.to_string(), source.format.as_str());
        for part in output.sources {
            merged.merge(part);
        }
        merged.diagnostics.extend(output.diagnostics);
        sources.push(merged);
    }
    Ok(sources)
}

fn run_source(
    reconciler: &DatasetReconciler<'_>,
    source: &SourceConfig,
    output: &mut RunOutput,
) -> Result<()> {
    let options = source.options();
    match source.format.convention() {
        Some(convention) => {
            let reconciled =
                reconciler.reconcile_file(&source.name, convention, &source.path, &options)?;
            output.sources.push(reconciled);
        }
        None if source.path.is_dir() => {
            let expected = source.expected_variants()?;
            let cra = reconciler.reconcile_cra_directory(
                &source.name,
                &source.path,
                &expected,
                &options,
            )?;
            output.sources.extend(cra.sources);
            output.diagnostics.extend(cra.diagnostics);
        }
        None => {
            let variant = variant_for_path(&source.path)?;
            let reconciled = reconciler.reconcile_file(
                &source.name,
                SourceConvention::Cra(variant),
                &source.path,
                &options,
            )?;
            output.sources.push(reconciled);
        }
    }
    Ok(())
}

/// A single CRA file is identified by its file name, like a directory entry.
fn variant_for_path(path: &Path) -> Result<CraVariant> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("no file name in {}", path.display()))?;
    CraVariant::from_file_name(file_name).with_context(|| format!("identify CRA table for {}", path.display()))
}

// ============================================================================
// Stage 3: Summarize
// ============================================================================

pub fn summarize(output: &RunOutput, region: &Region, filter: &GeographyFilter) -> RunSummary {
    let sources: Vec<SourceSummary> = output
        .sources
        .iter()
        .map(|source| SourceSummary {
            name: source.name.clone(),
            convention: source.convention.clone(),
            stats: source.stats,
            in_region: source
                .records
                .iter()
                .filter(|record| filter.matches(&record.geography.key))
                .count(),
        })
        .collect();
    let diagnostics: Vec<Diagnostic> = output
        .diagnostics
        .iter()
        .chain(output.sources.iter().flat_map(|source| &source.diagnostics))
        .cloned()
        .collect();
    let has_errors = !output.errors.is_empty()
        || diagnostics
            .iter()
            .any(|diag| diag.severity() == Severity::Error);
    RunSummary {
        state: region.state_name.clone(),
        counties: region.county_names(),
        sources,
        diagnostics,
        errors: output.errors.clone(),
        has_errors,
    }
}

/// Joins the in-region records of two configured sources.
pub fn join_sources(
    config: &RunConfig,
    tables: &CodeTables,
    left: &str,
    right: &str,
    granularity: JoinGranularity,
) -> Result<JoinReport> {
    let span = info_span!("join", left = %left, right = %right, granularity = %granularity);
    let _guard = span.enter();

    let mut sources = run_named_sources(config, tables, &[left, right])?.into_iter();
    let (Some(left_source), Some(right_source)) = (sources.next(), sources.next()) else {
        bail!("expected two reconciled sources");
    };
    let filter = tables.filter();
    let left_records = filter.apply(left_source.records);
    let right_records = filter.apply(right_source.records);
    let outcome = join(&left_records, &right_records, granularity);
    info!(pairs = outcome.pairs.len(), "sources joined");
    Ok(JoinReport {
        left: left.to_string(),
        right: right.to_string(),
        granularity,
        left_records: left_records.len(),
        right_records: right_records.len(),
        pairs: outcome.pairs.len(),
        matched_left: outcome.matched_left(),
        skipped_left: outcome.skipped_left,
        skipped_right: outcome.skipped_right,
    })
}
