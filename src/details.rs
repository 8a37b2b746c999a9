// 📋 Detail view model - labelled grades and metric sections for one hospital

use crate::grades::{star_ladder, to_stars, RawRating, StarFill};
use crate::hospital::Hospital;
use crate::scoring::MetricCategory;
use serde::Serialize;

/// The twelve grades shown in the expanded results row
pub const GRADE_BADGES: [(&str, &str); 12] = [
    ("TIER_1_GRADE_Lown_Composite", "Tier 1 Composite"),
    ("TIER_2_GRADE_Outcome", "Tier 2 Outcome"),
    ("TIER_2_GRADE_Value", "Tier 2 Value"),
    ("TIER_2_GRADE_Civic", "Tier 2 Civic"),
    ("TIER_3_GRADE_Outcome", "Tier 3 Outcome"),
    ("TIER_3_GRADE_Pat_Saf", "Tier 3 Patient Safety"),
    ("TIER_3_GRADE_Pat_Exp", "Tier 3 Patient Experience"),
    ("TIER_3_GRADE_OU", "Tier 3 Overuse"),
    ("TIER_3_GRADE_Cost_Eff", "Tier 3 Cost Efficiency"),
    ("TIER_3_GRADE_Exec_Comp", "Tier 3 Exec Comp"),
    ("TIER_3_GRADE_CB", "Tier 3 Community Benefit"),
    ("TIER_3_GRADE_Inclusivity", "Tier 3 Inclusivity"),
];

/// Accordion sections on the hospital detail page
pub fn detail_categories() -> Vec<MetricCategory> {
    vec![
        MetricCategory::new(
            "Financial Transparency",
            &[
                ("TIER_2_GRADE_Value", "Value Grade"),
                ("TIER_2_GRADE_Outcome", "Outcome Grade"),
                ("TIER_2_GRADE_Civic", "Civic Grade"),
            ],
        ),
        MetricCategory::new(
            "Community Benefit",
            &[
                ("TIER_3_GRADE_CB", "Community Benefit"),
                ("TIER_3_GRADE_Exec_Comp", "Executive Compensation"),
            ],
        ),
        MetricCategory::new(
            "Affordability & Billing",
            &[
                ("TIER_3_GRADE_Cost_Eff", "Cost Efficiency"),
                ("TIER_3_GRADE_Pat_Saf", "Patient Safety"),
            ],
        ),
        MetricCategory::new(
            "Access & Responsibility",
            &[
                ("TIER_3_GRADE_Inclusivity", "Inclusivity"),
                ("TIER_3_GRADE_Pat_Exp", "Patient Experience"),
            ],
        ),
    ]
}

// ============================================================================
// VIEW MODEL
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RatedMetric {
    pub key: String,
    pub label: String,
    /// Source value as text ("B+", "4.5", "N/A")
    pub raw: String,
    pub stars: f64,
    pub ladder: [StarFill; 5],
}

impl RatedMetric {
    pub fn new(key: &str, label: &str, raw: &RawRating) -> Self {
        let stars = to_stars(raw);
        RatedMetric {
            key: key.to_string(),
            label: label.to_string(),
            raw: raw.display(),
            stars,
            ladder: star_ladder(stars),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailSection {
    pub name: String,
    /// Category average (half-star rounded, 0 = no data)
    pub score: f64,
    pub metrics: Vec<RatedMetric>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HospitalDetail {
    pub id: String,
    pub name: String,
    pub address: String,
    pub overall: RatedMetric,
    pub size: String,
    pub ownership: String,
    pub setting: String,
    pub county: String,
    pub services: Vec<String>,
    pub badges: Vec<RatedMetric>,
    pub sections: Vec<DetailSection>,
}

impl HospitalDetail {
    pub fn build(h: &Hospital) -> Self {
        HospitalDetail {
            id: h.id.clone(),
            name: h.display_name().to_string(),
            address: h.full_address(),
            overall: RatedMetric::new(crate::hospital::OVERALL_METRIC, "Overall Grade", h.overall()),
            size: or_na(&h.size),
            ownership: h.ownership.as_str().to_string(),
            setting: h.setting.as_str().to_string(),
            county: or_na(&h.county),
            services: h.services.clone(),
            badges: grade_badges(h),
            sections: detail_sections(h),
        }
    }
}

pub fn grade_badges(h: &Hospital) -> Vec<RatedMetric> {
    GRADE_BADGES
        .iter()
        .map(|(key, label)| RatedMetric::new(key, label, h.metric(key)))
        .collect()
}

pub fn detail_sections(h: &Hospital) -> Vec<DetailSection> {
    detail_categories()
        .iter()
        .map(|category| DetailSection {
            name: category.name.clone(),
            score: category.score(h),
            metrics: category
                .metrics
                .iter()
                .map(|m| RatedMetric::new(&m.key, &m.label, m.raw(h)))
                .collect(),
        })
        .collect()
}

fn or_na(value: &str) -> String {
    if value.trim().is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

// ============================================================================
// METRIC NAMES
// ============================================================================

const ABBREVIATIONS: [(&str, &str); 13] = [
    ("STARS", "Stars"),
    ("GRADE", "Grade"),
    ("RANK", "Rank"),
    ("TIER", "Tier"),
    ("DY", "Day"),
    ("MORT", "Mortality"),
    ("READM", "Readmission"),
    ("Pat", "Patient"),
    ("Saf", "Safety"),
    ("Exp", "Experience"),
    ("OU", "Overuse"),
    ("Comp", "Compensation"),
    ("CB", "Community Benefit"),
];

/// Readable label for a raw dataset key
///
/// "TIER_3_GRADE_Pat_Saf" → "Tier 3 Grade Patient Safety"
pub fn format_metric_name(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();

    for part in key.split('_').filter(|p| !p.is_empty()) {
        if let Some(full) = expand_abbreviation(part) {
            words.push(full.to_string());
            continue;
        }
        for word in split_camel_case(part) {
            words.push(expand_abbreviation(&word).map(str::to_string).unwrap_or(word));
        }
    }

    if let Some(first) = words.first_mut() {
        let mut chars = first.chars();
        if let Some(c) = chars.next() {
            *first = c.to_uppercase().chain(chars).collect();
        }
    }

    words.join(" ")
}

fn expand_abbreviation(word: &str) -> Option<&'static str> {
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == word)
        .map(|(_, full)| *full)
}

// "PatientOutcomes" → ["Patient", "Outcomes"]; all-caps runs stay together
fn split_camel_case(part: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in part.chars() {
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_metric_name() {
        assert_eq!(format_metric_name("TIER_3_GRADE_Pat_Saf"), "Tier 3 Grade Patient Safety");
        assert_eq!(format_metric_name("TIER_3_GRADE_CB"), "Tier 3 Grade Community Benefit");
        assert_eq!(format_metric_name("MORT_30DY_STARS"), "Mortality 30 Day Stars");
        assert_eq!(format_metric_name("READM_STARS"), "Readmission Stars");
        assert_eq!(
            format_metric_name("TIER_2_GRADE_Lown_PatientOutcomes"),
            "Tier 2 Grade Lown Patient Outcomes"
        );
        assert_eq!(format_metric_name("county_income_shrt"), "County income shrt");
        assert_eq!(format_metric_name(""), "");
    }

    #[test]
    fn test_badges_cover_all_twelve() {
        let h = Hospital::new("1", "X")
            .with_metric("TIER_1_GRADE_Lown_Composite", "A")
            .with_metric("TIER_3_GRADE_OU", "NULL");
        let badges = grade_badges(&h);

        assert_eq!(badges.len(), 12);
        assert_eq!(badges[0].stars, 5.0);
        assert_eq!(badges[0].raw, "A");
        assert_eq!(badges[7].label, "Tier 3 Overuse");
        assert_eq!(badges[7].raw, "N/A");
        assert_eq!(badges[7].stars, 0.0);
    }

    #[test]
    fn test_detail_build() {
        let h = Hospital::new("9", "")
            .with_metric("TIER_2_GRADE_Value", "B")
            .with_metric("TIER_2_GRADE_Outcome", "A")
            .with_metric("TIER_3_GRADE_CB", "F");
        let detail = HospitalDetail::build(&h);

        assert_eq!(detail.name, "Unnamed Hospital");
        assert_eq!(detail.size, "N/A");
        assert_eq!(detail.overall.raw, "N/A");
        assert_eq!(detail.sections.len(), 4);
        assert_eq!(detail.sections[0].name, "Financial Transparency");
        assert_eq!(detail.sections[0].score, 4.5);
        assert_eq!(detail.sections[1].score, 1.0);
        assert_eq!(detail.sections[2].score, 0.0);
    }
}
