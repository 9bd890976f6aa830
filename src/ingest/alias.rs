//! Legacy mitochondrial names mapped to reference SNP identifiers.

use std::collections::HashMap;

/// Mitochondrial mutation names with a known dbSNP identifier.
const MITOCHONDRIAL_ALIASES: &[(&str, &str)] = &[
    ("MT-T3027C", "rs199838004"),
    ("MT-T4336C", "rs41456348"),
    ("MT-G4580A", "rs28357975"),
    ("MT-T5004C", "rs41419549"),
    ("MT-C5178a", "rs28357984"),
    ("MT-A5390G", "rs41333444"),
    ("MT-C6371T", "rs41366755"),
    ("MT-G8697A", "rs28358886"),
    ("MT-G9477A", "rs2853825"),
    ("MT-G10310A", "rs41467651"),
    ("MT-A10550G", "rs28358280"),
    ("MT-C10873T", "rs2857284"),
    ("MT-C11332T", "rs55714831"),
    ("MT-A11947G", "rs28359168"),
    ("MT-A12308G", "rs2853498"),
    ("MT-A12612G", "rs28359172"),
    ("MT-T14318C", "rs28357675"),
    ("MT-T14766C", "rs3135031"),
    ("MT-T14783C", "rs28357680"),
];

/// Immutable alias lookup. Keys are matched ASCII-case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    /// Build a table from `(legacy, canonical)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let aliases = pairs
            .into_iter()
            .map(|(legacy, canonical)| {
                (legacy.to_ascii_lowercase(), canonical.to_ascii_lowercase())
            })
            .collect();
        Self { aliases }
    }

    /// The built-in mitochondrial table.
    pub fn mitochondrial() -> Self {
        Self::from_pairs(MITOCHONDRIAL_ALIASES.iter().copied())
    }

    /// Canonical identifier for a legacy name, if one is known.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.aliases
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Number of aliases in the table.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// True when the table holds no aliases.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = AliasTable::mitochondrial();
        assert_eq!(table.len(), 19);
        assert_eq!(table.resolve("MT-T3027C"), Some("rs199838004"));
        assert_eq!(table.resolve("MT-T14783C"), Some("rs28357680"));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let table = AliasTable::mitochondrial();
        assert_eq!(table.resolve("mt-t3027c"), Some("rs199838004"));
        assert_eq!(table.resolve("MT-C5178A"), Some("rs28357984"));
    }

    #[test]
    fn test_unknown_name() {
        let table = AliasTable::mitochondrial();
        assert_eq!(table.resolve("MT-A1G"), None);
        assert!(AliasTable::default().is_empty());
    }
}
