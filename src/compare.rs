// ⚖️ Side-by-side comparison of 2-3 hospitals

use crate::details::RatedMetric;
use crate::hospital::{Hospital, OVERALL_METRIC};
use crate::scoring::MetricCategory;
use crate::selection::MAX_COMPARE;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Fewest hospitals a comparison makes sense for
pub const MIN_COMPARE: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    #[error("select at least {} hospitals to compare (got {})", MIN_COMPARE, .0)]
    TooFew(usize),

    #[error("at most {} hospitals can be compared (got {})", MAX_COMPARE, .0)]
    TooMany(usize),

    #[error("hospitals not found: {}", .0.join(", "))]
    NotFound(Vec<String>),
}

/// Section layout of the comparison page
pub fn comparison_categories() -> Vec<MetricCategory> {
    vec![
        MetricCategory::new(
            "Financial Transparency and Institutional Health",
            &[
                ("TIER_3_GRADE_Exec_Comp", "Balance Growth"),
                ("TIER_3_GRADE_OU", "Transparency"),
                ("TIER_2_GRADE_Value", "Fiscal Health"),
                ("TIER_2_GRADE_Outcome", "Staffing"),
            ],
        ),
        MetricCategory::new(
            "Community Benefit Spending",
            &[
                ("TIER_3_GRADE_CB", "Tax Benefit"),
                ("TIER_3_GRADE_CB", "Quality of CBS"),
                ("TIER_3_GRADE_Civic", "Strategic Use"),
            ],
        ),
        MetricCategory::new(
            "Healthcare Affordability and Billing",
            &[
                ("TIER_3_GRADE_Cost_Eff", "Financial Burden"),
                ("TIER_3_GRADE_Civic", "Charity Care"),
                ("TIER_3_GRADE_Cost_Eff", "Medical Debt"),
            ],
        ),
        MetricCategory::new(
            "Healthcare Access and Social Responsibility",
            &[
                ("TIER_3_GRADE_Pat_Exp", "Range of Services"),
                ("TIER_3_GRADE_Inclusivity", "Demographic Alignment"),
                ("TIER_3_GRADE_Pat_Saf", "Workforce Training"),
                ("TIER_3_GRADE_Exec_Comp", "Pay Equity Ratio"),
            ],
        ),
    ]
}

// ============================================================================
// VIEW MODEL
// ============================================================================

/// Column header card for one hospital
#[derive(Debug, Clone, Serialize)]
pub struct HospitalCard {
    pub id: String,
    pub name: String,
    pub location: String,
    pub setting: String,
    pub critical_access: bool,
    pub in_system: bool,
    pub county: String,
}

impl HospitalCard {
    fn from_hospital(h: &Hospital) -> Self {
        let location = h.location_line();
        let county = h.county.trim();
        HospitalCard {
            id: h.id.clone(),
            name: h.display_name().to_string(),
            location: if location.is_empty() { "—".to_string() } else { location },
            setting: h.setting.as_str().to_string(),
            critical_access: h.critical_access,
            in_system: h.in_system,
            county: if county.is_empty() { "—".to_string() } else { county.to_string() },
        }
    }
}

/// One metric across every compared hospital (same column order as `hospitals`)
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub label: String,
    pub values: Vec<RatedMetric>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSection {
    pub title: String,
    /// Category score per hospital
    pub scores: Vec<f64>,
    pub rows: Vec<ComparisonRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonView {
    pub hospitals: Vec<HospitalCard>,
    pub overall: ComparisonRow,
    pub sections: Vec<ComparisonSection>,
}

impl ComparisonView {
    /// Resolve ids against the dataset and lay out every section
    ///
    /// Id order is column order. All ids must resolve.
    pub fn build(ids: &[String], hospitals: &[Hospital]) -> Result<ComparisonView, CompareError> {
        if ids.len() < MIN_COMPARE {
            return Err(CompareError::TooFew(ids.len()));
        }
        if ids.len() > MAX_COMPARE {
            return Err(CompareError::TooMany(ids.len()));
        }

        let by_id: HashMap<&str, &Hospital> =
            hospitals.iter().map(|h| (h.id.as_str(), h)).collect();

        let mut chosen = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for id in ids {
            match by_id.get(id.trim()) {
                Some(h) => chosen.push(*h),
                None => missing.push(id.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(CompareError::NotFound(missing));
        }

        Ok(Self::from_hospitals(&chosen))
    }

    pub fn from_hospitals(chosen: &[&Hospital]) -> ComparisonView {
        let row = |key: &str, label: &str| ComparisonRow {
            label: label.to_string(),
            values: chosen
                .iter()
                .map(|h| RatedMetric::new(key, label, h.metric(key)))
                .collect(),
        };

        let sections = comparison_categories()
            .iter()
            .map(|category| ComparisonSection {
                title: category.name.clone(),
                scores: chosen.iter().map(|h| category.score(h)).collect(),
                rows: category
                    .metrics
                    .iter()
                    .map(|m| row(&m.key, &m.label))
                    .collect(),
            })
            .collect();

        ComparisonView {
            hospitals: chosen.iter().map(|h| HospitalCard::from_hospital(h)).collect(),
            overall: row(OVERALL_METRIC, "Overall Grade"),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Vec<Hospital> {
        vec![
            Hospital::new("1", "Alpha")
                .with_location("Atlanta", "GA", "30303")
                .with_metric(OVERALL_METRIC, "A")
                .with_metric("TIER_3_GRADE_CB", "B")
                .with_metric("TIER_3_GRADE_Civic", "D"),
            Hospital::new("2", "Beta").with_metric(OVERALL_METRIC, "D-"),
            Hospital::new("3", "Gamma"),
            Hospital::new("4", "Delta"),
        ]
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_count_limits() {
        let data = dataset();
        assert_eq!(
            ComparisonView::build(&ids(&["1"]), &data).unwrap_err(),
            CompareError::TooFew(1)
        );
        assert_eq!(
            ComparisonView::build(&ids(&["1", "2", "3", "4"]), &data).unwrap_err(),
            CompareError::TooMany(4)
        );
    }

    #[test]
    fn test_unknown_ids_reported() {
        let err = ComparisonView::build(&ids(&["1", "99"]), &dataset()).unwrap_err();
        assert_eq!(err, CompareError::NotFound(vec!["99".to_string()]));
        assert_eq!(err.to_string(), "hospitals not found: 99");
    }

    #[test]
    fn test_view_layout() {
        let view = ComparisonView::build(&ids(&["2", "1"]), &dataset()).unwrap();

        assert_eq!(view.hospitals.len(), 2);
        assert_eq!(view.hospitals[0].name, "Beta");
        assert_eq!(view.hospitals[0].location, "—");
        assert_eq!(view.hospitals[1].location, "Atlanta, GA");

        assert_eq!(view.overall.values[0].stars, 1.5);
        assert_eq!(view.overall.values[1].stars, 5.0);

        assert_eq!(view.sections.len(), 4);
        let cbs = &view.sections[1];
        assert_eq!(cbs.title, "Community Benefit Spending");
        assert_eq!(cbs.rows.len(), 3);
        // Beta has no data, Alpha: B, B, D → (4 + 4 + 2) / 3 = 3.33 → 3.5
        assert_eq!(cbs.scores, vec![0.0, 3.5]);
    }
}
