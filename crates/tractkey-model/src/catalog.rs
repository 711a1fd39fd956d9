//! Code -> label lookups for non-geographic coded fields.

use std::collections::BTreeMap;

/// Supplies human-readable labels for coded values (action taken, loan type,
/// and so on). Decoded values pass through unchanged; labelling is optional.
pub trait CodeLabelCatalog {
    fn label(&self, field: &str, code: &str) -> Option<&str>;
}

/// In-memory catalog keyed by field name, then code.
#[derive(Debug, Clone, Default)]
pub struct MapCatalog {
    labels: BTreeMap<String, BTreeMap<String, String>>,
}

impl MapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        label: impl Into<String>,
    ) {
        self.labels
            .entry(field.into())
            .or_default()
            .insert(code.into(), label.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CodeLabelCatalog for MapCatalog {
    fn label(&self, field: &str, code: &str) -> Option<&str> {
        self.labels
            .get(field)
            .and_then(|codes| codes.get(code.trim()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_trims_code() {
        let mut catalog = MapCatalog::new();
        catalog.insert("Action Taken Type", "1", "Originated");
        catalog.insert("Action Taken Type", "6", "Purchased");
        assert_eq!(catalog.label("Action Taken Type", " 1 "), Some("Originated"));
        assert_eq!(catalog.label("Action Taken Type", "9"), None);
        assert_eq!(catalog.label("Loan Type", "1"), None);
        assert_eq!(catalog.len(), 2);
    }
}
