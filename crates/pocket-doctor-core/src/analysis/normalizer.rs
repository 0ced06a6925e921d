//! Unit normalizer.
//!
//! Converts a reported `(name, value, unit)` triple into the canonical unit
//! used by the reference table. Every conversion lives in one rule table keyed
//! by `(parameter, source unit)`; unknown pairs pass through unchanged.

use std::collections::HashMap;

use crate::models::ReferenceTable;

/// A single conversion rule.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRule {
    /// Multiplier applied to the reported value
    pub scale: f64,
    /// Canonical unit written back
    pub target_unit: String,
}

/// Normalizer for parameter units.
#[derive(Debug, Clone)]
pub struct UnitNormalizer {
    /// (lowercase parameter name, lowercase source unit) → rule
    rules: HashMap<(String, String), UnitRule>,
}

impl Default for UnitNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitNormalizer {
    /// Create a normalizer with the default conversion rules.
    pub fn new() -> Self {
        Self {
            rules: Self::default_rules(),
        }
    }

    /// Create a normalizer that also knows the identity conversion for every
    /// canonical unit in `table`.
    pub fn for_table(table: &ReferenceTable) -> Self {
        let mut normalizer = Self::new();
        for (name, entry) in table.iter() {
            if let Some(dist) = &entry.distribution {
                let key = Self::key(name, &dist.unit);
                normalizer.rules.entry(key).or_insert_with(|| UnitRule {
                    scale: 1.0,
                    target_unit: dist.unit.clone(),
                });
            }
        }
        normalizer
    }

    /// Normalize a value to its canonical unit.
    pub fn normalize(&self, name: &str, value: f64, unit: &str) -> (f64, String) {
        match self.rules.get(&Self::key(name, unit)) {
            Some(rule) => (value * rule.scale, rule.target_unit.clone()),
            None => (value, unit.to_string()),
        }
    }

    /// Convert a value between two units of the same parameter.
    ///
    /// Both units are taken through their canonical unit. `None` when the
    /// two do not meet at the same canonical unit.
    pub fn convert(&self, name: &str, value: f64, from_unit: &str, to_unit: &str) -> Option<f64> {
        if from_unit.trim().eq_ignore_ascii_case(to_unit.trim()) {
            return Some(value);
        }

        let (canonical, canonical_unit) = self.normalize(name, value, from_unit);
        let (scale, target_unit) = self.normalize(name, 1.0, to_unit);
        let same_unit = canonical_unit.trim().eq_ignore_ascii_case(target_unit.trim());

        (same_unit && scale != 0.0).then(|| canonical / scale)
    }

    /// Add a custom conversion rule.
    pub fn add_rule(&mut self, name: &str, from_unit: &str, to_unit: &str, scale: f64) {
        self.rules.insert(
            Self::key(name, from_unit),
            UnitRule {
                scale,
                target_unit: to_unit.to_string(),
            },
        );
    }

    /// Whether any rule (identity included) is defined for a parameter.
    pub fn covers(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        self.rules.keys().any(|(n, _)| *n == lower)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn key(name: &str, unit: &str) -> (String, String) {
        (name.trim().to_lowercase(), unit.trim().to_lowercase())
    }

    /// Default unit conversions.
    fn default_rules() -> HashMap<(String, String), UnitRule> {
        let mut map = HashMap::new();
        let mut rule = |name: &str, from: &str, to: &str, scale: f64| {
            map.insert(
                Self::key(name, from),
                UnitRule {
                    scale,
                    target_unit: to.to_string(),
                },
            );
        };

        // Hemoglobin
        rule("Hemoglobin", "g/L", "g/dL", 0.1);
        rule("Hemoglobin", "mg/dL", "g/dL", 0.001);

        // Glucose
        rule("Glucose", "mg/dL", "mmol/L", 0.0555);

        // Lipids
        rule("LDL", "mg/dL", "mmol/L", 0.02586);
        rule("HDL", "mg/dL", "mmol/L", 0.02586);

        // CRP
        rule("CRP", "mg/dL", "mg/L", 10.0);

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_hemoglobin_g_per_l() {
        let normalizer = UnitNormalizer::new();
        let (value, unit) = normalizer.normalize("Hemoglobin", 126.0, "g/L");

        assert_close(value, 12.6);
        assert_eq!(unit, "g/dL");
    }

    #[test]
    fn test_unit_case_insensitive() {
        let normalizer = UnitNormalizer::new();
        let (value, unit) = normalizer.normalize("glucose", 90.0, " MG/DL ");

        assert_close(value, 4.995);
        assert_eq!(unit, "mmol/L");
    }

    #[test]
    fn test_unknown_passes_through() {
        let normalizer = UnitNormalizer::new();

        let (value, unit) = normalizer.normalize("Ferritin", 80.0, "ng/mL");
        assert_eq!(value, 80.0);
        assert_eq!(unit, "ng/mL");

        let (value, unit) = normalizer.normalize("CRP", 2.0, "mg/L");
        assert_eq!(value, 2.0);
        assert_eq!(unit, "mg/L");
    }

    #[test]
    fn test_more_than_one_parameter_has_conversions() {
        let normalizer = UnitNormalizer::new();
        let converted: Vec<&str> = ["Hemoglobin", "Glucose", "LDL", "HDL", "CRP"]
            .into_iter()
            .filter(|name| normalizer.covers(name))
            .collect();

        assert_eq!(converted.len(), 5);
    }

    #[test]
    fn test_every_reference_key_has_conversion() {
        let table = ReferenceTable::clinical_defaults();
        let normalizer = UnitNormalizer::for_table(&table);

        for (name, entry) in table.iter() {
            assert!(normalizer.covers(name), "no conversion defined for {name}");

            if let Some(dist) = &entry.distribution {
                let (value, unit) = normalizer.normalize(name, 3.0, &dist.unit);
                assert_eq!(value, 3.0, "canonical unit of {name} must be identity");
                assert_eq!(unit, dist.unit);
            }
        }
    }

    #[test]
    fn test_convert_through_canonical_unit() {
        let table = ReferenceTable::clinical_defaults();
        let normalizer = UnitNormalizer::for_table(&table);

        let grams_per_litre = normalizer.convert("Hemoglobin", 12.6, "g/dL", "g/L").unwrap();
        assert!((grams_per_litre - 126.0).abs() < 1e-9);

        assert_eq!(normalizer.convert("Hemoglobin", 126.0, "g/L", " G/L "), Some(126.0));
        assert_close(normalizer.convert("CRP", 0.2, "mg/dL", "mg/L").unwrap(), 2.0);
        assert_eq!(normalizer.convert("Hemoglobin", 8.0, "mmol/L", "g/L"), None);
    }

    #[test]
    fn test_custom_rule() {
        let mut normalizer = UnitNormalizer::new();
        normalizer.add_rule("Ferritin", "µg/L", "ng/mL", 1.0);

        let (value, unit) = normalizer.normalize("ferritin", 55.0, "µg/L");
        assert_eq!(value, 55.0);
        assert_eq!(unit, "ng/mL");
    }
}
