//! Clinical reference ranges.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use super::parameter::Gender;

/// Minimum Jaro-Winkler similarity for a fuzzy name match.
const FUZZY_NAME_THRESHOLD: f64 = 0.93;

/// Names shorter than this never match fuzzily ("HDL" vs "LDL").
const FUZZY_MIN_LEN: usize = 5;

/// Population distribution used for z-scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Distribution {
    pub mean: f64,
    /// Standard deviation
    pub sd: f64,
    /// Canonical unit the mean and sd are expressed in
    pub unit: String,
}

/// Inclusive lower/upper bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Check whether a value lies within the bounds (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Normal interval, either shared or sex-specific.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Range {
    ByGender { male: Bounds, female: Bounds },
    Flat(Bounds),
}

impl Range {
    /// Bounds for a gender. `Unknown` resolves to the female bounds.
    pub fn for_gender(&self, gender: Gender) -> Bounds {
        match self {
            Range::Flat(bounds) => *bounds,
            Range::ByGender { male, female } => match gender {
                Gender::Male => *male,
                Gender::Female | Gender::Unknown => *female,
            },
        }
    }

    pub fn is_gender_keyed(&self) -> bool {
        matches!(self, Range::ByGender { .. })
    }
}

/// Everything known about one parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReferenceEntry {
    /// Distribution for health scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
    /// Interval for range classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    /// Unit the interval is written in; the distribution unit when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_unit: Option<String>,
}

impl ReferenceEntry {
    pub fn with_distribution(mut self, mean: f64, sd: f64, unit: &str) -> Self {
        self.distribution = Some(Distribution {
            mean,
            sd,
            unit: unit.to_string(),
        });
        self
    }

    pub fn with_range(mut self, lower: f64, upper: f64) -> Self {
        self.range = Some(Range::Flat(Bounds::new(lower, upper)));
        self
    }

    pub fn with_gender_range(mut self, male: Bounds, female: Bounds) -> Self {
        self.range = Some(Range::ByGender { male, female });
        self
    }

    pub fn with_range_unit(mut self, unit: &str) -> Self {
        self.range_unit = Some(unit.to_string());
        self
    }

    /// Unit that series values and interval bounds share.
    pub fn interval_unit(&self) -> Option<&str> {
        self.range_unit
            .as_deref()
            .or_else(|| self.distribution.as_ref().map(|d| d.unit.as_str()))
    }
}

/// Immutable table of reference ranges, keyed by canonical parameter name.
///
/// Constructed once and passed by reference to every consumer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceTable {
    entries: BTreeMap<String, ReferenceEntry>,
    /// Alias map: lowercase alternate name → canonical name
    #[serde(default)]
    aliases: HashMap<String, String>,
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::clinical_defaults()
    }
}

impl ReferenceTable {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Parse a table from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut table: Self = serde_json::from_str(json)?;
        table.aliases = table
            .aliases
            .drain()
            .map(|(alias, canonical)| (alias.to_lowercase(), canonical))
            .collect();
        Ok(table)
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, name: &str, entry: ReferenceEntry) {
        self.entries.insert(name.to_string(), entry);
    }

    /// Add an alternate name for a canonical entry.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(alias.to_lowercase(), canonical.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReferenceEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve a reported name to a canonical table key.
    ///
    /// Tries exact, case-insensitive, alias, then fuzzy matching.
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.entries.get_key_value(name) {
            return Some(key);
        }

        let lower = name.trim().to_lowercase();
        if let Some(key) = self.entries.keys().find(|k| k.to_lowercase() == lower) {
            return Some(key);
        }

        if let Some(canonical) = self.aliases.get(&lower) {
            if let Some((key, _)) = self.entries.get_key_value(canonical) {
                return Some(key);
            }
        }

        if lower.chars().count() < FUZZY_MIN_LEN {
            return None;
        }

        self.entries
            .keys()
            .filter(|k| k.chars().count() >= FUZZY_MIN_LEN)
            .map(|k| (k, jaro_winkler(&lower, &k.to_lowercase())))
            .filter(|(_, score)| *score >= FUZZY_NAME_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(k, _)| k.as_str())
    }

    /// Look up an entry by reported name.
    pub fn get(&self, name: &str) -> Option<&ReferenceEntry> {
        self.resolve_name(name).and_then(|key| self.entries.get(key))
    }

    pub fn distribution(&self, name: &str) -> Option<&Distribution> {
        self.get(name).and_then(|e| e.distribution.as_ref())
    }

    pub fn range(&self, name: &str) -> Option<&Range> {
        self.get(name).and_then(|e| e.range.as_ref())
    }

    /// Default clinical table.
    ///
    /// Distributions are in the units used for scoring; intervals are in the
    /// units reports usually print (hemoglobin in g/L).
    pub fn clinical_defaults() -> Self {
        let mut table = Self::empty();

        table.insert(
            "Hemoglobin",
            ReferenceEntry::default()
                .with_distribution(14.0, 1.0, "g/dL")
                .with_gender_range(Bounds::new(130.0, 170.0), Bounds::new(120.0, 150.0))
                .with_range_unit("g/L"),
        );
        table.insert(
            "LDL",
            ReferenceEntry::default()
                .with_distribution(2.5, 0.8, "mmol/L")
                .with_range(1.5, 3.5),
        );
        table.insert(
            "HDL",
            ReferenceEntry::default()
                .with_distribution(1.3, 0.3, "mmol/L")
                .with_range(1.0, 1.6),
        );
        table.insert(
            "Glucose",
            ReferenceEntry::default()
                .with_distribution(5.0, 0.5, "mmol/L")
                .with_range(3.5, 5.5),
        );
        table.insert(
            "CRP",
            ReferenceEntry::default()
                .with_distribution(1.0, 0.5, "mg/L")
                .with_range(0.0, 3.0),
        );

        // Hemoglobin
        table.add_alias("haemoglobin", "Hemoglobin");
        table.add_alias("hgb", "Hemoglobin");
        table.add_alias("hb", "Hemoglobin");
        table.add_alias("гемоглобин", "Hemoglobin");

        // Lipids
        table.add_alias("ldl cholesterol", "LDL");
        table.add_alias("ldl-c", "LDL");
        table.add_alias("лпнп", "LDL");
        table.add_alias("hdl cholesterol", "HDL");
        table.add_alias("hdl-c", "HDL");
        table.add_alias("лпвп", "HDL");

        // Glucose
        table.add_alias("blood glucose", "Glucose");
        table.add_alias("fasting glucose", "Glucose");
        table.add_alias("глюкоза", "Glucose");

        // CRP
        table.add_alias("c-reactive protein", "CRP");
        table.add_alias("hs-crp", "CRP");
        table.add_alias("срб", "CRP");

        table
    }
}
