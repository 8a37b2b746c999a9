// 🔎 Predicate filters & sorting for the results list

use crate::grades::to_stars;
use crate::hospital::{Hospital, Ownership, Setting};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

// ============================================================================
// HOSPITAL TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HospitalType {
    Rural,
    Urban,
    NonProfit,
    ForProfit,
    CriticalAccess,
    AcuteCare,
}

impl HospitalType {
    /// Parse the filter tokens used by the search form
    pub fn parse(token: &str) -> Option<HospitalType> {
        match token.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "rural" => Some(HospitalType::Rural),
            "urban" => Some(HospitalType::Urban),
            "nonprofit" => Some(HospitalType::NonProfit),
            "forprofit" => Some(HospitalType::ForProfit),
            "criticalaccess" | "cah" => Some(HospitalType::CriticalAccess),
            "acutecare" | "acute" => Some(HospitalType::AcuteCare),
            _ => None,
        }
    }

    pub fn matches(&self, h: &Hospital) -> bool {
        match self {
            HospitalType::Rural => h.setting == Setting::Rural,
            HospitalType::Urban => h.setting == Setting::Urban,
            HospitalType::NonProfit => h.ownership == Ownership::NonProfit,
            HospitalType::ForProfit => h.ownership == Ownership::ForProfit,
            HospitalType::CriticalAccess => h.critical_access,
            HospitalType::AcuteCare => !h.critical_access,
        }
    }
}

// ============================================================================
// FILTER
// ============================================================================

/// All predicates must match; unset predicates match everything
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HospitalFilter {
    pub hospital_type: Option<HospitalType>,
    pub city: Option<String>,
    /// Case-insensitive substring of the hospital name
    pub name_query: Option<String>,
    /// Minimum overall star value
    pub min_stars: Option<f64>,
}

impl HospitalFilter {
    pub fn new() -> Self {
        HospitalFilter::default()
    }

    pub fn with_type(mut self, hospital_type: HospitalType) -> Self {
        self.hospital_type = Some(hospital_type);
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_name_query(mut self, query: impl Into<String>) -> Self {
        self.name_query = Some(query.into());
        self
    }

    pub fn with_min_stars(mut self, stars: f64) -> Self {
        self.min_stars = Some(stars);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.hospital_type.is_none()
            && self.city.as_deref().map(str::trim).unwrap_or("").is_empty()
            && self.name_query.as_deref().map(str::trim).unwrap_or("").is_empty()
            && self.min_stars.is_none()
    }

    pub fn matches(&self, h: &Hospital) -> bool {
        if let Some(t) = &self.hospital_type {
            if !t.matches(h) {
                return false;
            }
        }

        if let Some(city) = self.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            if !h.city.eq_ignore_ascii_case(city) {
                return false;
            }
        }

        if let Some(query) = self.name_query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            if !h.name.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }

        if let Some(min) = self.min_stars {
            if to_stars(h.overall()) < min {
                return false;
            }
        }

        true
    }

    pub fn apply<'a, I>(&self, hospitals: I) -> Vec<&'a Hospital>
    where
        I: IntoIterator<Item = &'a Hospital>,
    {
        hospitals.into_iter().filter(|h| self.matches(h)).collect()
    }
}

// ============================================================================
// SORTING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Dataset order
    #[default]
    None,
    /// Best overall rating first, unrated last
    Grade,
    Name,
    /// Nearest first, unlocated last
    Distance,
}

impl SortKey {
    pub fn parse(token: &str) -> SortKey {
        match token.trim().to_lowercase().as_str() {
            "grade" | "rating" | "stars" => SortKey::Grade,
            "name" => SortKey::Name,
            "distance" => SortKey::Distance,
            _ => SortKey::None,
        }
    }
}

/// Stable sort; `distances` maps hospital id → miles (only used for Distance)
pub fn sort_hospitals(hospitals: &mut [&Hospital], key: SortKey, distances: &HashMap<String, f64>) {
    match key {
        SortKey::None => {}
        SortKey::Grade => hospitals.sort_by(|a, b| {
            let (sa, sb) = (to_stars(a.overall()), to_stars(b.overall()));
            rated_last(sa, sb).then_with(|| sb.partial_cmp(&sa).unwrap_or(Ordering::Equal))
        }),
        SortKey::Name => hospitals.sort_by(|a, b| {
            a.display_name()
                .to_lowercase()
                .cmp(&b.display_name().to_lowercase())
        }),
        SortKey::Distance => hospitals.sort_by(|a, b| {
            match (distances.get(&a.id), distances.get(&b.id)) {
                (Some(da), Some(db)) => da.partial_cmp(db).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
    }
}

// 0 stars means unrated: push it to the end
fn rated_last(a: f64, b: f64) -> Ordering {
    (a == 0.0).cmp(&(b == 0.0))
}

/// Sorted, de-duplicated list of cities for the city dropdown
pub fn distinct_cities(hospitals: &[Hospital]) -> Vec<String> {
    hospitals
        .iter()
        .map(|h| h.city.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Hospital> {
        let mut rural = Hospital::new("1", "Rural Regional")
            .with_location("Cuthbert", "GA", "39840")
            .with_metric("TIER_1_GRADE_Lown_Composite", "C");
        rural.setting = Setting::Rural;
        rural.critical_access = true;
        rural.ownership = Ownership::NonProfit;

        let mut urban = Hospital::new("2", "atlanta Medical")
            .with_location("Atlanta", "GA", "30303")
            .with_metric("TIER_1_GRADE_Lown_Composite", "A-");
        urban.setting = Setting::Urban;
        urban.ownership = Ownership::ForProfit;

        let unrated = Hospital::new("3", "Beacon").with_location("Atlanta", "GA", "30305");

        vec![rural, urban, unrated]
    }

    fn ids(list: &[&Hospital]) -> Vec<String> {
        list.iter().map(|h| h.id.clone()).collect()
    }

    #[test]
    fn test_type_filters() {
        let hospitals = sample();
        let by = |t| ids(&HospitalFilter::new().with_type(t).apply(&hospitals));

        assert_eq!(by(HospitalType::Rural), vec!["1"]);
        assert_eq!(by(HospitalType::Urban), vec!["2"]);
        assert_eq!(by(HospitalType::NonProfit), vec!["1"]);
        assert_eq!(by(HospitalType::ForProfit), vec!["2"]);
        assert_eq!(by(HospitalType::CriticalAccess), vec!["1"]);
        assert_eq!(by(HospitalType::AcuteCare), vec!["2", "3"]);
    }

    #[test]
    fn test_city_name_and_stars() {
        let hospitals = sample();

        let atl = HospitalFilter::new().with_city("atlanta").apply(&hospitals);
        assert_eq!(ids(&atl), vec!["2", "3"]);

        let named = HospitalFilter::new().with_name_query("MEDICAL").apply(&hospitals);
        assert_eq!(ids(&named), vec!["2"]);

        let good = HospitalFilter::new().with_min_stars(3.0).apply(&hospitals);
        assert_eq!(ids(&good), vec!["1", "2"]);

        assert!(HospitalFilter::new().with_city("  ").is_empty());
        assert_eq!(HospitalFilter::new().apply(&hospitals).len(), 3);
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(HospitalType::parse("nonprofit"), Some(HospitalType::NonProfit));
        assert_eq!(HospitalType::parse("Critical Access"), Some(HospitalType::CriticalAccess));
        assert_eq!(HospitalType::parse("for-profit"), Some(HospitalType::ForProfit));
        assert_eq!(HospitalType::parse("teaching"), None);
        assert_eq!(SortKey::parse("Distance"), SortKey::Distance);
        assert_eq!(SortKey::parse(""), SortKey::None);
    }

    #[test]
    fn test_sort_by_grade_and_name() {
        let hospitals = sample();
        let mut list: Vec<&Hospital> = hospitals.iter().collect();

        sort_hospitals(&mut list, SortKey::Grade, &HashMap::new());
        assert_eq!(ids(&list), vec!["2", "1", "3"]);

        sort_hospitals(&mut list, SortKey::Name, &HashMap::new());
        assert_eq!(ids(&list), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_sort_by_distance_unknown_last() {
        let hospitals = sample();
        let mut list: Vec<&Hospital> = hospitals.iter().collect();
        let distances: HashMap<String, f64> =
            [("1".to_string(), 150.0), ("3".to_string(), 4.0)].into_iter().collect();

        sort_hospitals(&mut list, SortKey::Distance, &distances);
        assert_eq!(ids(&list), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_distinct_cities() {
        assert_eq!(distinct_cities(&sample()), vec!["Atlanta", "Cuthbert"]);
    }
}
