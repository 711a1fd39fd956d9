//! Institution name cleaning for matching lenders across datasets.

use std::collections::BTreeMap;

/// Replacements applied after upper-casing, in order.
const NAME_REPLACEMENTS: &[(&str, &str)] = &[
    ("NATIONAL ASSOCIATION", "NA"),
    ("N.A.", "NA"),
    ("FEDERAL CREDIT UNION", "FCU"),
    ("CREDIT UNION", "CU"),
    (",", ""),
];

/// Upper-cases and abbreviates an institution name.
pub fn standardize_institution_name(name: &str) -> String {
    let mut name = name.trim().to_uppercase();
    if name.contains("INC") || name.contains("LLC") || name.contains("L.L.C.") {
        name = name.replace('.', "");
    }
    for (from, to) in NAME_REPLACEMENTS {
        name = name.replace(from, to);
    }
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Applies an affiliate alias map around [`standardize_institution_name`].
///
/// Aliases are looked up by upper-cased name both before and after
/// standardizing, so an alias may be written in either form.
#[derive(Debug, Clone, Default)]
pub struct InstitutionNameCleaner {
    aliases: BTreeMap<String, String>,
}

impl InstitutionNameCleaner {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|(alias, canonical)| (alias.trim().to_uppercase(), canonical))
            .collect();
        Self { aliases }
    }

    pub fn clean(&self, raw: &str) -> String {
        let name = self.affiliate(raw.trim());
        let name = standardize_institution_name(&name);
        self.affiliate(&name)
    }

    fn affiliate(&self, name: &str) -> String {
        self.aliases
            .get(&name.to_uppercase())
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}
