//! Field code meanings
//!
//! Report records key their values by terse domain codes ("L1v", "Pimp",
//! "Fh"). A code→description map is fetched once per process from the
//! upstream backend and consulted whenever a field is labeled.
//!
//! Lookup tolerates the classic I/l confusion in the source spreadsheets
//! ("AIa" vs "Ala"): after an exact miss it retries with every 'I' replaced
//! by 'l', then with every 'l' replaced by 'I'. First hit wins.

use std::collections::HashMap;

/// Cached code→description lookup table
#[derive(Debug, Clone, Default)]
pub struct MeaningMap {
    entries: HashMap<String, String>,
}

impl MeaningMap {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// An empty map; every lookup resolves to nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &HashMap<String, String> {
        &self.entries
    }

    /// Look up a code: exact match, then the I→l spelling, then l→I
    pub fn lookup(&self, code: &str) -> Option<&str> {
        if let Some(meaning) = self.entries.get(code) {
            return Some(meaning);
        }
        let swapped = code.replace('I', "l");
        if let Some(meaning) = self.entries.get(&swapped) {
            return Some(meaning);
        }
        let swapped = code.replace('l', "I");
        if let Some(meaning) = self.entries.get(&swapped) {
            return Some(meaning);
        }
        None
    }

    /// Meaning for a record field key. Dotted keys ("Cnc.Id") fall back to
    /// their last segment; a couple of structural keys have built-in labels
    /// that never appear in the upstream table.
    pub fn field_meaning(&self, key: &str) -> Option<String> {
        if let Some(meaning) = self.lookup(key) {
            return Some(meaning.to_string());
        }
        if let Some((_, base)) = key.rsplit_once('.') {
            if let Some(meaning) = self.lookup(base) {
                return Some(meaning.to_string());
            }
        }
        match key {
            "Cnc.Id" => Some("Concentrator id".to_string()),
            "Cnt.Id" => Some("Meter id".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> MeaningMap {
        MeaningMap::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_exact_lookup() {
        let m = map(&[("L1v", "Phase 1 voltage")]);
        assert_eq!(m.lookup("L1v"), Some("Phase 1 voltage"));
        assert_eq!(m.lookup("L2v"), None);
    }

    #[test]
    fn test_capital_i_resolves_via_lowercase_l_entry() {
        // Map holds "Ala" (lowercase l); query uses "AIa" (capital I).
        let m = map(&[("Ala", "Absolute active energy")]);
        assert_eq!(m.lookup("AIa"), Some("Absolute active energy"));
    }

    #[test]
    fn test_lowercase_l_resolves_via_capital_i_entry() {
        let m = map(&[("AIa", "Incremental active energy")]);
        assert_eq!(m.lookup("Ala"), Some("Incremental active energy"));
    }

    #[test]
    fn test_exact_match_beats_swap() {
        let m = map(&[("AIa", "exact"), ("Ala", "swapped")]);
        assert_eq!(m.lookup("AIa"), Some("exact"));
        assert_eq!(m.lookup("Ala"), Some("swapped"));
    }

    #[test]
    fn test_swap_precedence_when_only_variants_exist() {
        // Query "AIa" misses; I→l is tried before l→I.
        let m = map(&[("Ala", "first"), ("AIa2", "unrelated")]);
        assert_eq!(m.lookup("AIa"), Some("first"));
    }

    #[test]
    fn test_dotted_key_falls_back_to_base() {
        let m = map(&[("Id", "Identifier")]);
        assert_eq!(m.field_meaning("Cnt.Id").as_deref(), Some("Identifier"));
    }

    #[test]
    fn test_builtin_labels() {
        let m = MeaningMap::empty();
        assert_eq!(m.field_meaning("Cnc.Id").as_deref(), Some("Concentrator id"));
        assert_eq!(m.field_meaning("Cnt.Id").as_deref(), Some("Meter id"));
        assert_eq!(m.field_meaning("Whatever"), None);
    }
}
