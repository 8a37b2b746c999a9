// 📊 Aggregate Scorer - category-level star averages
//
// 0 stars is overloaded: the normalizer returns it for "no data", so the
// scorer drops zeros before averaging. A real F is 1 star and is kept.

use crate::grades::{round_to_half, to_stars, RawRating};
use crate::hospital::Hospital;
use serde::Serialize;

/// Reads one raw metric value off a hospital
pub type MetricGetter<'a> = &'a dyn Fn(&Hospital) -> RawRating;

/// Average star value over several metrics of one hospital
///
/// Missing or zero values are ignored; no values left gives 0. The mean is
/// rounded to the nearest half star.
pub fn average_stars(getters: &[MetricGetter<'_>], hospital: &Hospital) -> f64 {
    average_of(getters.iter().map(|get| to_stars(&get(hospital))))
}

/// Mean of the usable star values, rounded to the nearest half
pub fn average_of<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite() && *v != 0.0)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        round_to_half(sum / count as f64)
    }
}

// ============================================================================
// METRIC DEFINITIONS
// ============================================================================

/// A labelled dataset field
#[derive(Debug, Clone, Serialize)]
pub struct MetricDef {
    pub key: String,
    pub label: String,
}

impl MetricDef {
    pub fn new(key: &str, label: &str) -> Self {
        MetricDef {
            key: key.to_string(),
            label: label.to_string(),
        }
    }

    pub fn raw<'h>(&self, hospital: &'h Hospital) -> &'h RawRating {
        hospital.metric(&self.key)
    }

    pub fn stars(&self, hospital: &Hospital) -> f64 {
        to_stars(self.raw(hospital))
    }
}

/// A named group of metrics scored together
#[derive(Debug, Clone, Serialize)]
pub struct MetricCategory {
    pub name: String,
    pub metrics: Vec<MetricDef>,
}

impl MetricCategory {
    pub fn new(name: &str, metrics: &[(&str, &str)]) -> Self {
        MetricCategory {
            name: name.to_string(),
            metrics: metrics
                .iter()
                .map(|(key, label)| MetricDef::new(key, label))
                .collect(),
        }
    }

    /// Category score for one hospital
    pub fn score(&self, hospital: &Hospital) -> f64 {
        average_of(self.metrics.iter().map(|m| m.stars(hospital)))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hospital() -> Hospital {
        Hospital::new("1", "Test Hospital")
    }

    #[test]
    fn test_average_of_two_grades() {
        let a = |_: &Hospital| RawRating::from("A");
        let c = |_: &Hospital| RawRating::from("C");
        assert_eq!(average_stars(&[&a, &c], &hospital()), 4.0);
    }

    #[test]
    fn test_null_is_discarded() {
        let f = |_: &Hospital| RawRating::from("F");
        let null = |_: &Hospital| RawRating::from("NULL");
        assert_eq!(average_stars(&[&f, &null], &hospital()), 1.0);
        assert_eq!(average_stars(&[&null, &null], &hospital()), 0.0);
        assert_eq!(average_stars(&[], &hospital()), 0.0);
    }

    #[test]
    fn test_mean_rounds_to_half() {
        // 5 + 4.5 + 4 = 13.5 / 3 = 4.5
        assert_eq!(average_of([5.0, 4.5, 4.0]), 4.5);
        // 5 + 4.5 = 4.75 → 5
        assert_eq!(average_of([5.0, 4.5]), 5.0);
        // 3 + 3.5 + 3.5 = 3.33 → 3.5
        assert_eq!(average_of([3.0, 3.5, 3.5]), 3.5);
        // 1 + 1.5 + 1 = 1.17 → 1
        assert_eq!(average_of([1.0, 1.5, 1.0]), 1.0);
        assert_eq!(average_of([f64::NAN, 2.0]), 2.0);
    }

    #[test]
    fn test_getters_read_the_hospital() {
        let h = hospital()
            .with_metric("TIER_2_GRADE_Value", "B")
            .with_metric("TIER_3_GRADE_CB", 3.0);
        let value = |h: &Hospital| h.metric("TIER_2_GRADE_Value").clone();
        let cb = |h: &Hospital| h.metric("TIER_3_GRADE_CB").clone();
        assert_eq!(average_stars(&[&value, &cb], &h), 3.5);
    }

    #[test]
    fn test_category_score() {
        let category = MetricCategory::new(
            "Patient Outcomes",
            &[
                ("TIER_2_GRADE_Outcome", "Outcome Grade"),
                ("TIER_3_GRADE_Pat_Saf", "Patient Safety Grade"),
                ("TIER_3_GRADE_Pat_Exp", "Patient Experience Grade"),
            ],
        );
        let h = hospital()
            .with_metric("TIER_2_GRADE_Outcome", "A")
            .with_metric("TIER_3_GRADE_Pat_Saf", "B-");

        assert_eq!(category.metrics.len(), 3);
        assert_eq!(category.score(&h), 4.5); // (5 + 3.5) / 2 = 4.25 → 4.5
        assert_eq!(category.score(&hospital()), 0.0);
    }
}
