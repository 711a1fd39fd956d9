//! TOML run configuration.
//!
//! ```toml
//! [region]
//! state = "TX"
//! counties = ["Dallas County", "Collin County", "Tarrant County"]
//!
//! [fips]
//! path = "fips.txt"
//!
//! [zip]
//! path = "zip_county.csv"
//!
//! [[source]]
//! name = "cra"
//! path = "cra2021"
//! format = "cra"
//! expected = ["A11", "A12", "D6"]
//!
//! [[source]]
//! name = "hmda"
//! path = "hmda_2021_tx.csv"
//! format = "hmda"
//! chunk_rows = 100000
//! ```
//!
//! Relative paths are resolved against the directory of the configuration
//! file.

use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use tractkey_codes::FipsListingLayout;
use tractkey_fwf::CraVariant;
use tractkey_reconcile::{ReconcileOptions, SourceFormat};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub region: RegionConfig,
    pub fips: FipsConfig,
    #[serde(default)]
    pub zip: Option<PathConfig>,
    #[serde(default)]
    pub institutions: Option<InstitutionConfig>,
    #[serde(default)]
    pub labels: Option<PathConfig>,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionConfig {
    /// USPS state abbreviation.
    pub state: String,
    #[serde(default)]
    pub counties: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FipsConfig {
    pub path: PathBuf,
    /// 0-based, end-exclusive line range of the state block.
    #[serde(default)]
    pub state_lines: Option<[usize; 2]>,
    #[serde(default)]
    pub county_lines: Option<[usize; 2]>,
}

impl FipsConfig {
    pub fn layout(&self) -> FipsListingLayout {
        let defaults = FipsListingLayout::default();
        let range = |bounds: Option<[usize; 2]>, fallback: Range<usize>| {
            bounds.map_or(fallback, |[start, end]| start..end)
        };
        FipsListingLayout {
            state_lines: range(self.state_lines, defaults.state_lines),
            county_lines: range(self.county_lines, defaults.county_lines),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstitutionConfig {
    /// `alias,canonical` CSV of affiliate names.
    pub aliases: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub name: String,
    pub path: PathBuf,
    pub format: SourceFormat,
    #[serde(default)]
    pub chunk_rows: Option<usize>,
    #[serde(default)]
    pub scale_amounts: Option<bool>,
    /// CRA tables that must be present; missing ones are reported.
    #[serde(default)]
    pub expected: Vec<String>,
}

impl SourceConfig {
    pub fn options(&self) -> ReconcileOptions {
        let defaults = ReconcileOptions::default();
        ReconcileOptions {
            chunk_rows: self.chunk_rows.unwrap_or(defaults.chunk_rows),
            scale_amounts: self.scale_amounts.unwrap_or(defaults.scale_amounts),
        }
    }

    /// Expected CRA variants, by token (`A11`) or table name (`A1-1`).
    pub fn expected_variants(&self) -> Result<Vec<CraVariant>> {
        self.expected
            .iter()
            .map(|wanted| {
                parse_variant(wanted)
                    .with_context(|| format!("source '{}': unknown CRA table", self.name))
            })
            .collect()
    }
}

pub fn parse_variant(value: &str) -> Result<CraVariant> {
    let wanted = value.trim();
    CraVariant::ALL
        .into_iter()
        .find(|variant| {
            variant.token().eq_ignore_ascii_case(wanted)
                || variant.table_name().eq_ignore_ascii_case(wanted)
        })
        .with_context(|| format!("unknown CRA table '{wanted}'"))
}

impl RunConfig {
    pub fn from_toml(text: &str, base_dir: &Path) -> Result<Self> {
        let mut config: RunConfig = toml::from_str(text).context("parse run configuration")?;
        config.resolve_paths(base_dir);
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&text, base_dir)
            .with_context(|| format!("load config {}", path.display()))
    }

    /// Replaces the region with command-line values where given.
    pub fn override_region(&mut self, state: Option<&str>, counties: &[String]) {
        if let Some(state) = state {
            self.region.state = state.to_string();
        }
        if !counties.is_empty() {
            self.region.counties = counties.to_vec();
        }
    }

    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|source| source.name == name)
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        };
        resolve(&mut self.fips.path);
        if let Some(zip) = &mut self.zip {
            resolve(&mut zip.path);
        }
        if let Some(institutions) = &mut self.institutions {
            resolve(&mut institutions.aliases);
        }
        if let Some(labels) = &mut self.labels {
            resolve(&mut labels.path);
        }
        for source in &mut self.sources {
            resolve(&mut source.path);
        }
    }

    fn validate(&self) -> Result<()> {
        let mut names = std::collections::BTreeSet::new();
        for source in &self.sources {
            if !names.insert(source.name.as_str()) {
                bail!("duplicate source name '{}'", source.name);
            }
            if source.chunk_rows == Some(0) {
                bail!("source '{}': chunk_rows must be at least 1", source.name);
            }
            if !source.expected.is_empty() && source.format != SourceFormat::Cra {
                bail!("source '{}': expected tables only apply to CRA sources", source.name);
            }
            source.expected_variants()?;
            if source.format == SourceFormat::Sba && self.zip.is_none() {
                bail!(
                    "source '{}': sba sources resolve counties by ZIP and need a [zip] section",
                    source.name
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[region]
state = "TX"
counties = ["Dallas County", "Collin"]

[fips]
path = "fips.txt"
state_lines = [10, 20]

[zip]
path = "/data/zip_county.csv"

[[source]]
name = "cra"
path = "cra2021"
format = "cra"
expected = ["A11", "D1-1"]

[[source]]
name = "hmda"
path = "hmda.csv"
format = "hmda"
chunk_rows = 1000
scale_amounts = false
"#;

    #[test]
    fn test_parse_and_resolve() {
        let config = RunConfig::from_toml(CONFIG, Path::new("/runs/tx")).unwrap();
        assert_eq!(config.region.state, "TX");
        assert_eq!(config.fips.path, PathBuf::from("/runs/tx/fips.txt"));
        assert_eq!(config.fips.layout().state_lines, 10..20);
        assert_eq!(config.fips.layout().county_lines, 72..3267);
        assert_eq!(
            config.zip.as_ref().map(|zip| zip.path.clone()),
            Some(PathBuf::from("/data/zip_county.csv"))
        );
        assert_eq!(config.sources.len(), 2);

        let cra = config.source("cra").unwrap();
        assert_eq!(cra.format, SourceFormat::Cra);
        assert_eq!(
            cra.expected_variants().unwrap(),
            vec![CraVariant::A11, CraVariant::D11]
        );
        let hmda = config.source("hmda").unwrap();
        assert_eq!(hmda.options().chunk_rows, 1000);
        assert!(!hmda.options().scale_amounts);
        assert!(cra.options().scale_amounts);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let text = r#"
[region]
state = "TX"

[fips]
path = "fips.txt"

[[source]]
name = "a"
path = "a.csv"
format = "hmda"

[[source]]
name = "a"
path = "b.csv"
format = "ffiec"
"#;
        let err = RunConfig::from_toml(text, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("duplicate source name"));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let text = r#"
[region]
state = "TX"

[fips]
path = "fips.txt"

[[source]]
name = "a"
path = "a.xlsx"
format = "excel"
"#;
        assert!(RunConfig::from_toml(text, Path::new(".")).is_err());
    }

    #[test]
    fn test_sba_needs_zip_membership() {
        let text = r#"
[region]
state = "TX"
counties = ["Dallas"]

[fips]
path = "fips.txt"

[[source]]
name = "sba"
path = "foia-7a.csv"
format = "sba"
"#;
        let err = RunConfig::from_toml(text, Path::new(".")).unwrap_err();
        assert!(format!("{err:#}").contains("need a [zip] section"));

        let with_zip = format!("{text}\n[zip]\npath = \"zip_county.csv\"\n");
        let config = RunConfig::from_toml(&with_zip, Path::new(".")).unwrap();
        assert_eq!(config.source("sba").map(|source| source.format), Some(SourceFormat::Sba));
    }

    #[test]
    fn test_region_override() {
        let mut config = RunConfig::from_toml(CONFIG, Path::new(".")).unwrap();
        config.override_region(Some("OK"), &["Tulsa County".to_string()]);
        assert_eq!(config.region.state, "OK");
        assert_eq!(config.region.counties, vec!["Tulsa County"]);
        config.override_region(None, &[]);
        assert_eq!(config.region.state, "OK");
    }
}
