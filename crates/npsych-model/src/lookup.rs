use std::collections::{BTreeMap, HashMap};

/// Immutable scale → score type table.
///
/// Built once from configuration and handed to the steps that need it.
/// Exact scale names win; otherwise the match falls back to a
/// case-insensitive comparison.
#[derive(Debug, Clone, Default)]
pub struct ScoreTypeLookup {
    exact: HashMap<String, String>,
    folded: HashMap<String, String>,
}

impl ScoreTypeLookup {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut exact = HashMap::new();
        let mut folded = HashMap::new();
        for (scale, score_type) in entries {
            let scale = scale.as_ref().trim();
            let score_type = score_type.as_ref().trim();
            if scale.is_empty() || score_type.is_empty() {
                continue;
            }
            exact.insert(scale.to_string(), score_type.to_string());
            folded
                .entry(scale.to_lowercase())
                .or_insert_with(|| score_type.to_string());
        }
        Self { exact, folded }
    }

    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        Self::new(map.iter())
    }

    pub fn get(&self, scale: &str) -> Option<&str> {
        let scale = scale.trim();
        self.exact
            .get(scale)
            .or_else(|| self.folded.get(&scale.to_lowercase()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_then_case_insensitive() {
        let lookup = ScoreTypeLookup::new([
            ("WISC-V FSIQ", "standard_score"),
            ("BASC Anxiety", "t_score"),
        ]);
        assert_eq!(lookup.get("WISC-V FSIQ"), Some("standard_score"));
        assert_eq!(lookup.get("basc anxiety"), Some("t_score"));
        assert_eq!(lookup.get("  BASC Anxiety "), Some("t_score"));
        assert_eq!(lookup.get("Trails B"), None);
    }

    #[test]
    fn test_blank_entries_ignored() {
        let lookup = ScoreTypeLookup::new([("", "scaled_score"), ("Digit Span", " ")]);
        assert!(lookup.is_empty());
    }
}
