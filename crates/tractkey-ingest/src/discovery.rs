//! Source file discovery and CRA table matching.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use tractkey_fwf::CraVariant;
use tractkey_model::{Diagnostic, DiagnosticKind};

use crate::error::{IngestError, Result};

/// Lists files in `dir` whose extension matches one of `extensions`
/// (case-insensitive). Returns files sorted by name.
pub fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Lists `.dat` files in a directory.
pub fn list_dat_files(dir: &Path) -> Result<Vec<PathBuf>> {
    list_files(dir, &["dat"])
}

/// CRA files matched to their table variants.
#[derive(Debug, Clone, Default)]
pub struct CraDiscovery {
    pub files: BTreeMap<CraVariant, PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Matches files to CRA variants.
///
/// Files that map to no variant, to several, or to a variant already taken
/// become `UnmappedFile` diagnostics. Each variant in `expected` with no
/// file becomes a `MissingVariant` diagnostic.
pub fn discover_cra_files(files: &[PathBuf], expected: &[CraVariant]) -> CraDiscovery {
    let mut discovery = CraDiscovery::default();
    for path in files {
        let name = display_name(path);
        match CraVariant::from_file_name(&name) {
            Ok(variant) => {
                if let Some(existing) = discovery.files.get(&variant) {
                    warn!(file = %name, variant = %variant, "duplicate CRA table file");
                    discovery.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnmappedFile,
                        name,
                        format!("{variant} already provided by {}", display_name(existing)),
                    ));
                    continue;
                }
                debug!(file = %name, variant = %variant, "matched CRA table");
                discovery.files.insert(variant, path.clone());
            }
            Err(err) => {
                warn!(file = %name, "unmapped CRA file");
                discovery.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnmappedFile,
                    name,
                    err.to_string(),
                ));
            }
        }
    }
    for variant in expected {
        if !discovery.files.contains_key(variant) {
            discovery.diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingVariant,
                variant.table_name(),
                format!("no file for CRA table {variant}"),
            ));
        }
    }
    discovery
}
