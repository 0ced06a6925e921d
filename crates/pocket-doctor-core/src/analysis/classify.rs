//! Range classification of a parameter series.

use serde::Serialize;

use crate::models::{Bounds, Gender, ReferenceTable};

/// A value at a report index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub index: usize,
    pub value: f64,
}

/// Points of one series split by their reference range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub normal: Vec<Point>,
    pub outliers: Vec<Point>,
}

impl Classification {
    /// A series is extreme iff at least one point is an outlier.
    pub fn is_extreme(&self) -> bool {
        !self.outliers.is_empty()
    }

    /// All classified points in index order.
    pub fn points(&self) -> Vec<Point> {
        let mut points: Vec<Point> = self
            .normal
            .iter()
            .chain(self.outliers.iter())
            .copied()
            .collect();
        points.sort_by_key(|p| p.index);
        points
    }

    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.outliers.is_empty()
    }
}

/// Bounds that apply to `name` for a report of the given gender.
///
/// Gender-keyed entries fall back to the female bounds for `Unknown`; flat
/// entries ignore gender. `None` when the table has no interval.
pub fn resolve_range(table: &ReferenceTable, name: &str, gender: Gender) -> Option<Bounds> {
    table.range(name).map(|range| range.for_gender(gender))
}

/// Split a series into normal and outlier points.
///
/// `values` and `genders` are index-aligned; an index past the end of
/// `genders` counts as a missing gender. Indices with a missing value or a
/// missing gender are left out of both. Without a known range every point is
/// normal.
pub fn classify(
    values: &[Option<f64>],
    genders: &[Option<Gender>],
    name: &str,
    table: &ReferenceTable,
) -> Classification {
    let mut classification = Classification::default();

    for (index, value) in values.iter().enumerate() {
        let gender = genders.get(index).copied().flatten();
        let (Some(value), Some(gender)) = (value, gender) else {
            continue;
        };
        let point = Point {
            index,
            value: *value,
        };

        match resolve_range(table, name, gender) {
            Some(bounds) if !bounds.contains(*value) => classification.outliers.push(point),
            _ => classification.normal.push(point),
        }
    }

    classification
}

/// Band to shade on a chart: the bounds for the first report with a gender.
pub fn range_band(name: &str, genders: &[Option<Gender>], table: &ReferenceTable) -> Option<Bounds> {
    let gender = genders.iter().flatten().next()?;
    resolve_range(table, name, *gender)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn table() -> ReferenceTable {
        ReferenceTable::clinical_defaults()
    }

    #[test]
    fn test_inclusive_bounds() {
        let table = table();
        let values = [Some(0.0), Some(3.0), Some(-EPS), Some(3.0 + EPS)];
        let genders = [Some(Gender::Male); 4];

        let result = classify(&values, &genders, "CRP", &table);

        assert_eq!(
            result.normal,
            vec![Point { index: 0, value: 0.0 }, Point { index: 1, value: 3.0 }]
        );
        assert_eq!(result.outliers.len(), 2);
        assert_eq!(result.outliers[0].index, 2);
        assert_eq!(result.outliers[1].index, 3);
        assert!(result.is_extreme());
    }

    #[test]
    fn test_unrecognized_gender_uses_female_range() {
        let table = table();
        let other = Gender::parse("Other");

        assert_eq!(
            resolve_range(&table, "Hemoglobin", other),
            Some(Bounds::new(120.0, 150.0))
        );

        // 125 is normal for the female range, an outlier for the male one.
        let values = [Some(125.0), Some(125.0)];
        let genders = [Some(other), Some(Gender::Male)];
        let result = classify(&values, &genders, "Hemoglobin", &table);

        assert_eq!(result.normal, vec![Point { index: 0, value: 125.0 }]);
        assert_eq!(result.outliers, vec![Point { index: 1, value: 125.0 }]);
    }

    #[test]
    fn test_missing_value_or_gender_excluded() {
        let table = table();
        let values = [None, Some(10.0), Some(10.0)];
        let genders = [Some(Gender::Female), None, Some(Gender::Female)];

        let result = classify(&values, &genders, "CRP", &table);

        assert!(result.normal.is_empty());
        assert_eq!(result.outliers, vec![Point { index: 2, value: 10.0 }]);
    }

    #[test]
    fn test_no_range_is_normal() {
        let table = table();
        let values = [Some(1.0e6)];
        let genders = [Some(Gender::Male)];

        let result = classify(&values, &genders, "Ferritin", &table);

        assert_eq!(result.normal.len(), 1);
        assert!(!result.is_extreme());
    }

    #[test]
    fn test_short_gender_list_excludes_trailing_values() {
        let table = table();
        let values = [Some(1.0), Some(10.0), Some(20.0)];
        let genders = [Some(Gender::Male)];

        let result = classify(&values, &genders, "CRP", &table);

        assert_eq!(result.normal, vec![Point { index: 0, value: 1.0 }]);
        assert!(result.outliers.is_empty());
    }

    #[test]
    fn test_empty_series() {
        let result = classify(&[], &[], "CRP", &table());
        assert!(result.is_empty());
        assert!(!result.is_extreme());
    }

    #[test]
    fn test_points_in_index_order() {
        let table = table();
        let values = [Some(5.0), Some(1.0), Some(6.0)];
        let genders = [Some(Gender::Male); 3];

        let points = classify(&values, &genders, "CRP", &table).points();
        let indices: Vec<usize> = points.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_range_band() {
        let table = table();

        let genders = [None, Some(Gender::Male), Some(Gender::Female)];
        assert_eq!(
            range_band("Hemoglobin", &genders, &table),
            Some(Bounds::new(130.0, 170.0))
        );
        assert_eq!(range_band("Hemoglobin", &[None, None], &table), None);
        assert_eq!(range_band("Ferritin", &genders, &table), None);
    }
}
