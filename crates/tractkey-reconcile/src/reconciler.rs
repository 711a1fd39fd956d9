//! Per-source reconciliation onto the canonical key.
//!
//! Each source is read with the reader its convention needs, every row is
//! normalized independently, and the result is a [`ReconciledSource`]
//! holding records plus diagnostics. Record-level problems never abort a
//! source: malformed lines are reported and skipped, unresolved counties are
//! kept as [`tractkey_model::County::Other`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use tractkey_fwf::cra::{FIELD_CENSUS_TRACT, FIELD_COUNTY, FIELD_FILLER, FIELD_RESPONDENT_ID, FIELD_STATE};
use tractkey_fwf::{CraSchemaCatalog, CraVariant, DecodedRecord, FixedWidthDecoder, GeographyLevel};
use tractkey_ingest::{
    ChunkOptions, CsvRow, CsvTable, DEFAULT_CHUNK_ROWS, DelimitedChunkReader, FixedWidthLines,
    discover_cra_files, list_dat_files, read_census_table,
};
use tractkey_model::{County, CountySource, Diagnostic, DiagnosticKind, GeographicKey, ResolvedGeography};
use tractkey_normalize::{CensusLabelParser, GeographicKeyNormalizer, InstitutionNameCleaner};

use crate::convention::{CLEAN_NAME_FIELD, DelimitedColumns, GeoFields, SourceConvention};
use crate::error::{ReconcileError, Result};
use crate::record::{ReconciledRecord, ReconciledSource, is_amount_field, pad_respondent_id, scale_thousands};

/// Options applied to every source of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Rows per chunk for delimited sources.
    /// Defaults to 50000.
    pub chunk_rows: usize,

    /// Scale CRA `Total Loan Amount` fields from thousands to dollars.
    /// Defaults to true.
    pub scale_amounts: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            chunk_rows: DEFAULT_CHUNK_ROWS,
            scale_amounts: true,
        }
    }
}

impl ReconcileOptions {
    pub fn with_chunk_rows(mut self, rows: usize) -> Self {
        self.chunk_rows = rows;
        self
    }

    pub fn with_scale_amounts(mut self, scale: bool) -> Self {
        self.scale_amounts = scale;
        self
    }
}

/// Result of reconciling a directory of CRA files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CraReconciliation {
    pub sources: Vec<ReconciledSource>,
    /// File-level diagnostics: unmapped files and missing variants.
    pub diagnostics: Vec<Diagnostic>,
}

/// Column positions of a delimited source, resolved against its headers.
#[derive(Debug, Clone, Copy)]
struct ColumnPositions {
    state: usize,
    county: Option<usize>,
    tract: Option<usize>,
    zip: Option<usize>,
    institution_name: Option<usize>,
}

impl ColumnPositions {
    fn resolve(name: &str, columns: &DelimitedColumns, headers: &[String]) -> Result<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(column))
        };
        let require = |column: &str| {
            find(column).ok_or_else(|| ReconcileError::MissingColumn {
                name: name.to_string(),
                column: column.to_string(),
            })
        };
        let zip = match columns.county {
            Some(_) => columns.zip.and_then(find),
            None => columns.zip.map(require).transpose()?,
        };
        Ok(Self {
            state: require(columns.state)?,
            county: columns.county.map(require).transpose()?,
            tract: columns.tract.map(require).transpose()?,
            zip,
            institution_name: columns.institution_name.and_then(find),
        })
    }
}

/// Reconciles sources onto the canonical key.
///
/// Holds the normalizer (shared code tables), the CRA schemas, and the
/// census label parser; none of them change while sources are processed.
pub struct DatasetReconciler<'a> {
    normalizer: GeographicKeyNormalizer<'a>,
    schemas: CraSchemaCatalog,
    census_labels: CensusLabelParser,
    institutions: Option<&'a InstitutionNameCleaner>,
}

impl<'a> DatasetReconciler<'a> {
    pub fn new(normalizer: GeographicKeyNormalizer<'a>) -> Result<Self> {
        Ok(Self {
            normalizer,
            schemas: CraSchemaCatalog::new()?,
            census_labels: CensusLabelParser::new()?,
            institutions: None,
        })
    }

    /// Adds a cleaned institution name column to FDIC records.
    pub fn with_institution_cleaner(mut self, cleaner: &'a InstitutionNameCleaner) -> Self {
        self.institutions = Some(cleaner);
        self
    }

    pub fn normalizer(&self) -> &GeographicKeyNormalizer<'a> {
        &self.normalizer
    }

    pub fn schemas(&self) -> &CraSchemaCatalog {
        &self.schemas
    }

    /// Reconciles one file according to `convention`.
    pub fn reconcile_file(
        &self,
        name: &str,
        convention: SourceConvention,
        path: &Path,
        options: &ReconcileOptions,
    ) -> Result<ReconciledSource> {
        match convention {
            SourceConvention::Cra(variant) => {
                self.reconcile_fixed_width_file(name, variant, path, options)
            }
            SourceConvention::CensusTracts => self.reconcile_census_file(name, path),
            _ => self.reconcile_delimited_file(name, convention, path, options),
        }
    }

    // === Fixed-width sources ===

    /// Reconciles already-read lines of one CRA table. Lines are
    /// `(line number, text)` pairs; blank lines are ignored.
    pub fn reconcile_fixed_width_lines<'l, I>(
        &self,
        name: &str,
        variant: CraVariant,
        lines: I,
        options: &ReconcileOptions,
    ) -> ReconciledSource
    where
        I: IntoIterator<Item = (usize, &'l str)>,
    {
        let mut out = ReconciledSource::new(name, SourceConvention::Cra(variant).to_string());
        if self.skip_non_geographic(&mut out, variant) {
            return out;
        }
        let decoder = FixedWidthDecoder::new(self.schemas.schema(variant));
        for (line, text) in lines {
            if text.trim_end_matches(['\r', '\n']).is_empty() {
                out.stats.blank_lines += 1;
                continue;
            }
            self.fixed_width_line(&mut out, &decoder, variant, line, text, options);
        }
        out.finish();
        out
    }

    /// Reads and reconciles one CRA `.dat` file.
    pub fn reconcile_fixed_width_file(
        &self,
        name: &str,
        variant: CraVariant,
        path: &Path,
        options: &ReconcileOptions,
    ) -> Result<ReconciledSource> {
        let span = info_span!("source", name = %name, table = %variant.table_name());
        let _guard = span.enter();

        let mut out = ReconciledSource::new(name, SourceConvention::Cra(variant).to_string());
        if self.skip_non_geographic(&mut out, variant) {
            return Ok(out);
        }
        let decoder = FixedWidthDecoder::new(self.schemas.schema(variant));
        let mut lines = FixedWidthLines::open(path)?;
        for numbered in lines.by_ref() {
            let numbered = numbered?;
            self.fixed_width_line(&mut out, &decoder, variant, numbered.line, &numbered.text, options);
        }
        out.stats.blank_lines = lines.blank_lines();
        out.finish();
        log_source(&out);
        Ok(out)
    }

    /// Discovers the CRA tables in `dir` and reconciles each one.
    ///
    /// Variants listed in `expected` without a file are reported as
    /// `MissingVariant`; unrecognised files as `UnmappedFile`.
    pub fn reconcile_cra_directory(
        &self,
        name: &str,
        dir: &Path,
        expected: &[CraVariant],
        options: &ReconcileOptions,
    ) -> Result<CraReconciliation> {
        let files = list_dat_files(dir)?;
        let discovery = discover_cra_files(&files, expected);
        info!(
            dir = %dir.display(),
            files = files.len(),
            matched = discovery.files.len(),
            "discovered CRA tables"
        );

        let mut result = CraReconciliation {
            sources: Vec::with_capacity(discovery.files.len()),
            diagnostics: discovery.diagnostics,
        };
        for (variant, path) in &discovery.files {
            let source_name = cra_source_name(name, path);
            let source = self.reconcile_fixed_width_file(&source_name, *variant, path, options)?;
            result.sources.push(source);
        }
        Ok(result)
    }

    fn skip_non_geographic(&self, out: &mut ReconciledSource, variant: CraVariant) -> bool {
        if variant.geography() != GeographyLevel::None {
            return false;
        }
        warn!(source = %out.name, table = %variant.table_name(), "table has no geography, skipped");
        out.diagnostics.push(Diagnostic::new(
            DiagnosticKind::NonGeographicSource,
            out.name.clone(),
            format!("table {} has no state or county fields", variant.table_name()),
        ));
        true
    }

    fn fixed_width_line(
        &self,
        out: &mut ReconciledSource,
        decoder: &FixedWidthDecoder<'_>,
        variant: CraVariant,
        line: usize,
        text: &str,
        options: &ReconcileOptions,
    ) {
        out.stats.rows += 1;
        match decoder.decode(text) {
            Ok(decoded) => {
                let record = self.cra_record(&out.name, variant, line, &decoded, options);
                out.push_record(record);
            }
            Err(err) => {
                debug!(source = %out.name, line, error = %err, "malformed record");
                out.stats.malformed += 1;
                out.diagnostics.push(
                    Diagnostic::new(DiagnosticKind::MalformedRecord, out.name.clone(), err.to_string())
                        .at_line(line),
                );
            }
        }
    }

    fn cra_record(
        &self,
        name: &str,
        variant: CraVariant,
        line: usize,
        decoded: &DecodedRecord<'_>,
        options: &ReconcileOptions,
    ) -> ReconciledRecord {
        let fields = GeoFields {
            state: decoded.trimmed(FIELD_STATE).unwrap_or_default(),
            county: decoded.trimmed(FIELD_COUNTY).unwrap_or_default(),
            tract: decoded.trimmed(FIELD_CENSUS_TRACT),
            zip: None,
        };
        let geography = self
            .normalizer
            .normalize(&SourceConvention::Cra(variant).raw_geography(fields));

        let values = decoded
            .to_owned_fields()
            .into_iter()
            .filter(|(field, _)| field != FIELD_FILLER)
            .map(|(field, value)| {
                let value = if field == FIELD_RESPONDENT_ID {
                    pad_respondent_id(&value)
                } else if options.scale_amounts && is_amount_field(&field) {
                    scale_thousands(&value)
                } else {
                    value
                };
                (field, value)
            })
            .collect();
        ReconciledRecord::new(name, line, geography, values)
    }

    // === Delimited sources ===

    /// Reconciles a delimited file in bounded chunks.
    pub fn reconcile_delimited_file(
        &self,
        name: &str,
        convention: SourceConvention,
        path: &Path,
        options: &ReconcileOptions,
    ) -> Result<ReconciledSource> {
        let Some(columns) = convention.delimited_columns() else {
            return Err(ReconcileError::UnsupportedFormat {
                name: name.to_string(),
                format: convention.to_string(),
            });
        };
        let span = info_span!("source", name = %name, format = %convention);
        let _guard = span.enter();

        let chunk_options = ChunkOptions::default()
            .with_chunk_rows(options.chunk_rows)
            .with_headers(columns.has_headers);
        let mut reader = DelimitedChunkReader::open(path, chunk_options)?;
        let headers = reader.headers().to_vec();
        let positions = ColumnPositions::resolve(name, &columns, &headers)?;

        let mut out = ReconciledSource::new(name, convention.to_string());
        while let Some(chunk) = reader.next_chunk()? {
            out.stats.chunks += 1;
            for row in &chunk.rows {
                self.delimited_row(&mut out, convention, &positions, &headers, row);
            }
            debug!(chunk = chunk.index, records = out.stats.records, "chunk reconciled");
        }
        out.finish();
        log_source(&out);
        Ok(out)
    }

    /// Reconciles in-memory delimited rows.
    pub fn reconcile_rows<'r, I>(
        &self,
        name: &str,
        convention: SourceConvention,
        headers: &[String],
        rows: I,
    ) -> Result<ReconciledSource>
    where
        I: IntoIterator<Item = &'r CsvRow>,
    {
        let Some(columns) = convention.delimited_columns() else {
            return Err(ReconcileError::UnsupportedFormat {
                name: name.to_string(),
                format: convention.to_string(),
            });
        };
        let positions = ColumnPositions::resolve(name, &columns, headers)?;
        let mut out = ReconciledSource::new(name, convention.to_string());
        for row in rows {
            self.delimited_row(&mut out, convention, &positions, headers, row);
        }
        out.finish();
        Ok(out)
    }

    fn delimited_row(
        &self,
        out: &mut ReconciledSource,
        convention: SourceConvention,
        positions: &ColumnPositions,
        headers: &[String],
        row: &CsvRow,
    ) {
        out.stats.rows += 1;
        let county = positions.county.map(|idx| row.get(idx));
        let (state, county) = match (row.get(positions.state), county) {
            (Some(state), Some(Some(county))) => (state, county),
            (Some(state), None) => (state, ""),
            (state, county) => {
                out.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::MissingColumn,
                        out.name.clone(),
                        format!("row has {} of {} columns", row.values.len(), headers.len()),
                    )
                    .at_line(row.line),
                );
                (state.unwrap_or_default(), county.flatten().unwrap_or_default())
            }
        };
        let fields = GeoFields {
            state,
            county,
            tract: positions.tract.and_then(|idx| row.get(idx)),
            zip: positions.zip.and_then(|idx| row.get(idx)),
        };
        let geography = self.normalizer.normalize(&convention.raw_geography(fields));

        let mut values: Vec<(String, String)> = headers
            .iter()
            .cloned()
            .zip(row.values.iter().cloned())
            .collect();
        if let (Some(cleaner), Some(idx)) = (self.institutions, positions.institution_name)
            && let Some(raw_name) = row.get(idx)
        {
            values.push((CLEAN_NAME_FIELD.to_string(), cleaner.clean(raw_name)));
        }
        out.push_record(ReconciledRecord::new(out.name.clone(), row.line, geography, values));
    }

    // === Census tract tables ===

    /// Reconciles a reshaped census table (one row per geography, label in
    /// the first column). A record's line is its 1-based row index.
    pub fn reconcile_census_table(&self, name: &str, table: &CsvTable) -> ReconciledSource {
        let convention = SourceConvention::CensusTracts;
        let mut out = ReconciledSource::new(name, convention.to_string());
        for (idx, row) in table.rows.iter().enumerate() {
            out.stats.rows += 1;
            let label = row.first().map(String::as_str).unwrap_or_default();
            let geography = match self.census_labels.parse(label) {
                Some(parsed) => self.normalizer.normalize(&convention.raw_geography(GeoFields {
                    state: &parsed.state,
                    county: &parsed.county,
                    tract: Some(parsed.tract.as_str()),
                    zip: None,
                })),
                None => {
                    debug!(source = %name, label, "not a tract label");
                    ResolvedGeography {
                        key: GeographicKey::new(None, County::Other, None),
                        county_source: CountySource::Unresolved,
                    }
                }
            };
            let values = table
                .headers
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect();
            out.push_record(ReconciledRecord::new(name, idx + 1, geography, values));
        }
        out.finish();
        out
    }

    /// Reads, reshapes, and reconciles a census export.
    pub fn reconcile_census_file(&self, name: &str, path: &Path) -> Result<ReconciledSource> {
        let span = info_span!("source", name = %name, format = "census_tracts");
        let _guard = span.enter();
        let table = read_census_table(path)?;
        let out = self.reconcile_census_table(name, &table);
        log_source(&out);
        Ok(out)
    }
}

fn cra_source_name(name: &str, path: &Path) -> String {
    let file = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |file| file.to_string_lossy().into_owned());
    format!("{name}/{file}")
}

fn log_source(out: &ReconciledSource) {
    info!(
        source = %out.name,
        rows = out.stats.rows,
        records = out.stats.records,
        malformed = out.stats.malformed,
        blank_lines = out.stats.blank_lines,
        unresolved = out.stats.unresolved,
        zip_fallback = out.stats.zip_fallback,
        "source reconciled"
    );
}
