//! Alias table reconciling boundary names with survey country names

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// One declared mapping from a boundary display name to a survey name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub boundary: String,
    pub canonical: String,
}

impl AliasEntry {
    pub fn new(boundary: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            canonical: canonical.into(),
        }
    }
}

/// A declared alias that resolves ambiguously
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasAmbiguity {
    /// The same boundary name is declared more than once; the last entry wins
    RepeatedBoundary { boundary: String, winner: String },
    /// Several boundary names resolve to the same survey name
    SharedCanonical { canonical: String, boundaries: Vec<String> },
}

/// Versioned boundary-name → survey-name lookup table.
///
/// Entries are applied in declared order, so a repeated boundary name
/// resolves to its last declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "AliasTableFile")]
pub struct AliasTable {
    pub version: u32,
    entries: Vec<AliasEntry>,
    #[serde(skip)]
    lookup: AHashMap<String, usize>,
}

/// On-disk shape of an alias table
#[derive(Deserialize)]
struct AliasTableFile {
    version: u32,
    entries: Vec<AliasEntry>,
}

impl From<AliasTableFile> for AliasTable {
    fn from(file: AliasTableFile) -> Self {
        Self::new(file.version, file.entries)
    }
}

impl AliasTable {
    pub fn new(version: u32, entries: Vec<AliasEntry>) -> Self {
        let mut table = Self {
            version,
            entries,
            lookup: AHashMap::new(),
        };
        table.rebuild_lookup();
        table
    }

    /// Table with no aliases; names must match exactly
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    /// The bundled table for the world boundary and happiness datasets
    pub fn builtin() -> Self {
        let entries = [
            ("United States of America", "United States"),
            ("United Republic of Tanzania", "Tanzania"),
            ("Democratic Republic of the Congo", "Congo (Kinshasa)"),
            ("Republic of the Congo", "Congo (Brazzaville)"),
            ("Czech Republic", "Czechia"),
            ("Macedonia", "North Macedonia"),
            ("Republic of Serbia", "Serbia"),
            ("Côte d'Ivoire", "Ivory Coast"),
            ("Somaliland", "Somaliland region"),
            ("Northern Cyprus", "North Cyprus"),
            ("Swaziland", "Eswatini"),
            ("The Bahamas", "Bahamas"),
            ("Taiwan", "Taiwan Province of China"),
            ("Hong Kong", "Hong Kong S.A.R. of China"),
            ("West Bank", "Palestinian Territories"),
            ("Burma", "Myanmar"),
            ("Republic of Korea", "South Korea"),
            ("Kyrgyz Republic", "Kyrgyzstan"),
            ("Lao PDR", "Laos"),
            ("Russian Federation", "Russia"),
            ("Viet Nam", "Vietnam"),
        ];

        Self::new(1, entries.into_iter().map(|(b, c)| AliasEntry::new(b, c)).collect())
    }

    fn rebuild_lookup(&mut self) {
        self.lookup.clear();
        for (idx, entry) in self.entries.iter().enumerate() {
            self.lookup.insert(normalize(&entry.boundary), idx);
        }
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    /// Append an entry; it overrides earlier entries for the same boundary name
    pub fn push(&mut self, entry: AliasEntry) {
        self.lookup.insert(normalize(&entry.boundary), self.entries.len());
        self.entries.push(entry);
    }

    /// Survey name for a boundary name, or the boundary name itself
    /// Position of the entry that decides `boundary_name`, if it is aliased
    pub fn declared_index(&self, boundary_name: &str) -> Option<usize> {
        self.lookup.get(&normalize(boundary_name)).copied()
    }

    pub fn resolve<'a>(&'a self, boundary_name: &'a str) -> &'a str {
        self.lookup
            .get(&normalize(boundary_name))
            .map(|&idx| self.entries[idx].canonical.as_str())
            .unwrap_or(boundary_name)
    }

    /// Normalized join key for a boundary name
    pub fn join_key(&self, boundary_name: &str) -> String {
        normalize(self.resolve(boundary_name))
    }

    pub fn ambiguities(&self) -> Vec<AliasAmbiguity> {
        let mut found = Vec::new();

        let mut seen: AHashMap<String, usize> = AHashMap::new();
        for entry in &self.entries {
            *seen.entry(normalize(&entry.boundary)).or_insert(0) += 1;
        }
        let mut repeated: Vec<_> = seen.into_iter().filter(|(_, n)| *n > 1).map(|(b, _)| b).collect();
        repeated.sort();
        for boundary in repeated {
            if let Some(&idx) = self.lookup.get(&boundary) {
                let winner = self.entries[idx].canonical.clone();
                found.push(AliasAmbiguity::RepeatedBoundary { boundary, winner });
            }
        }

        let mut by_canonical: AHashMap<String, Vec<String>> = AHashMap::new();
        for &idx in self.lookup.values() {
            let entry = &self.entries[idx];
            by_canonical
                .entry(normalize(&entry.canonical))
                .or_default()
                .push(entry.boundary.clone());
        }
        let mut shared: Vec<_> = by_canonical.into_iter().filter(|(_, b)| b.len() > 1).collect();
        shared.sort_by(|a, b| a.0.cmp(&b.0));
        for (canonical, mut boundaries) in shared {
            boundaries.sort();
            found.push(AliasAmbiguity::SharedCanonical { canonical, boundaries });
        }

        found
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Case- and whitespace-insensitive form of a country name
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_falls_back_to_input() {
        let table = AliasTable::builtin();
        assert_eq!(table.resolve("United States of America"), "United States");
        assert_eq!(table.resolve("united states  of america"), "United States");
        assert_eq!(table.resolve("France"), "France");
    }

    #[test]
    fn test_builtin_never_maps_guinea_to_papua_new_guinea() {
        let table = AliasTable::builtin();
        assert_eq!(table.resolve("Guinea"), "Guinea");
        assert_ne!(table.join_key("Guinea"), table.join_key("Papua New Guinea"));
        assert!(table
            .entries()
            .iter()
            .all(|e| !(normalize(&e.boundary) == "guinea" && normalize(&e.canonical) == "papua new guinea")));
    }

    #[test]
    fn test_last_declaration_wins() {
        let mut table = AliasTable::new(
            3,
            vec![AliasEntry::new("Congo", "Congo (Kinshasa)"), AliasEntry::new("Congo", "Congo (Brazzaville)")],
        );
        assert_eq!(table.resolve("Congo"), "Congo (Brazzaville)");

        table.push(AliasEntry::new("Congo", "Congo (Kinshasa)"));
        assert_eq!(table.resolve("Congo"), "Congo (Kinshasa)");
    }

    #[test]
    fn test_ambiguities_reported() {
        let table = AliasTable::new(
            2,
            vec![
                AliasEntry::new("Congo", "Congo (Kinshasa)"),
                AliasEntry::new("Congo", "Congo (Brazzaville)"),
                AliasEntry::new("Guinea", "Papua New Guinea"),
                AliasEntry::new("PNG", "Papua New Guinea"),
            ],
        );

        let found = table.ambiguities();
        assert!(found.contains(&AliasAmbiguity::RepeatedBoundary {
            boundary: "congo".to_string(),
            winner: "Congo (Brazzaville)".to_string(),
        }));
        assert!(found.contains(&AliasAmbiguity::SharedCanonical {
            canonical: "papua new guinea".to_string(),
            boundaries: vec!["Guinea".to_string(), "PNG".to_string()],
        }));
    }

    #[test]
    fn test_builtin_is_unambiguous() {
        assert!(AliasTable::builtin().ambiguities().is_empty());
    }

    #[test]
    fn test_deserialized_table_resolves() {
        let json = r#"{"version": 7, "entries": [{"boundary": "Burma", "canonical": "Myanmar"}]}"#;
        let table: AliasTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.version, 7);
        assert_eq!(table.resolve("Burma"), "Myanmar");
    }

    #[test]
    fn test_deserialized_repeats_are_reported() {
        let json = r#"{"version": 2, "entries": [
            {"boundary": "Burma", "canonical": "Myanmar"},
            {"boundary": "Burma", "canonical": "Myanmar"}
        ]}"#;
        let table: AliasTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.resolve("Burma"), "Myanmar");
        assert_eq!(table.declared_index("burma"), Some(1));
        assert_eq!(
            table.ambiguities(),
            vec![AliasAmbiguity::RepeatedBoundary {
                boundary: "burma".to_string(),
                winner: "Myanmar".to_string(),
            }]
        );
    }
}
