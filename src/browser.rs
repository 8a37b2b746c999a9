// 🧭 Hospital Browser - the one object that owns all browsing state
//
// Dataset, ZIP lookup and comparison selection are constructed once and
// handed to whichever front end is running (terminal UI, HTTP server).

use crate::compare::{CompareError, ComparisonView};
use crate::dataset::HospitalSource;
use crate::details::HospitalDetail;
use crate::filters::{distinct_cities, sort_hospitals, HospitalFilter, SortKey};
use crate::geo::{annotate_distances, hospital_coord, retain_within, ZipLookup};
use crate::grades::{round_to_half, to_stars};
use crate::hospital::{Hospital, Ownership, Setting};
use crate::scoring::average_of;
use crate::selection::{AddOutcome, CompareSelection, ToggleOutcome};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// SEARCH
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub filter: HospitalFilter,
    pub zip: Option<String>,
    pub radius_miles: Option<f64>,
    #[serde(default)]
    pub sort: SortKey,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    pub hospital: &'a Hospital,
    pub overall_stars: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    pub selected: bool,
}

/// What happened to the ZIP part of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusStatus {
    /// No ZIP given
    NotRequested,
    /// Origin resolved; distances computed (and radius applied if given)
    Applied,
    /// Origin ZIP unknown: results are unfiltered
    UnknownZip,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<'a> {
    pub hits: Vec<SearchHit<'a>>,
    pub radius: RadiusStatus,
}

/// Dataset summary for the `stats` command and the health endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total: usize,
    pub rated: usize,
    pub unrated: usize,
    pub urban: usize,
    pub rural: usize,
    pub non_profit: usize,
    pub for_profit: usize,
    pub critical_access: usize,
    pub cities: usize,
    pub locatable: usize,
    /// Mean overall stars of rated hospitals (0 when none are rated)
    pub average_overall: f64,
    /// Hospitals per half-star overall value, "0.0" (unrated) through "5.0"
    pub distribution: BTreeMap<String, usize>,
    pub selected: usize,
}

// ============================================================================
// BROWSER
// ============================================================================

pub struct HospitalBrowser {
    hospitals: Vec<Hospital>,
    index: HashMap<String, usize>,
    zips: ZipLookup,
    selection: CompareSelection,
}

impl HospitalBrowser {
    pub fn new(source: &dyn HospitalSource, zips: ZipLookup, selection: CompareSelection) -> Result<Self> {
        let hospitals = source.load()?;
        Ok(Self::from_hospitals(hospitals, zips, selection))
    }

    pub fn from_hospitals(hospitals: Vec<Hospital>, zips: ZipLookup, selection: CompareSelection) -> Self {
        let index = hospitals
            .iter()
            .enumerate()
            .map(|(i, h)| (h.id.clone(), i))
            .collect();

        tracing::debug!(
            hospitals = hospitals.len(),
            zips = zips.len(),
            selected = selection.len(),
            "Browser initialized"
        );

        HospitalBrowser {
            hospitals,
            index,
            zips,
            selection,
        }
    }

    pub fn hospitals(&self) -> &[Hospital] {
        &self.hospitals
    }

    pub fn zips(&self) -> &ZipLookup {
        &self.zips
    }

    pub fn get(&self, id: &str) -> Option<&Hospital> {
        self.index.get(id.trim()).map(|&i| &self.hospitals[i])
    }

    pub fn detail(&self, id: &str) -> Option<HospitalDetail> {
        self.get(id).map(HospitalDetail::build)
    }

    pub fn cities(&self) -> Vec<String> {
        distinct_cities(&self.hospitals)
    }

    /// Filter, locate and sort in one pass
    pub fn search(&self, query: &SearchQuery) -> SearchResults<'_> {
        let mut matched = query.filter.apply(&self.hospitals);

        let zip = query.zip.as_deref().map(str::trim).filter(|z| !z.is_empty());
        let origin = zip.map(|z| (z, self.zips.get(z)));

        let mut distances: HashMap<String, f64> = HashMap::new();
        let radius = match origin {
            None => RadiusStatus::NotRequested,
            Some((zip, None)) => {
                tracing::warn!(zip, "No coordinates found for ZIP, showing all results");
                RadiusStatus::UnknownZip
            }
            Some((_, Some(origin))) => {
                distances = annotate_distances(matched.iter().copied(), origin, &self.zips);
                if let Some(radius) = query.radius_miles {
                    retain_within(&mut matched, &distances, radius);
                }
                RadiusStatus::Applied
            }
        };

        sort_hospitals(&mut matched, query.sort, &distances);

        let hits = matched
            .into_iter()
            .map(|h| SearchHit {
                hospital: h,
                overall_stars: to_stars(h.overall()),
                distance_miles: distances.get(&h.id).copied(),
                selected: self.selection.contains(&h.id),
            })
            .collect();

        SearchResults { hits, radius }
    }

    pub fn stats(&self) -> DatasetStats {
        let mut stats = DatasetStats {
            total: self.hospitals.len(),
            cities: self.cities().len(),
            selected: self.selection.len(),
            ..DatasetStats::default()
        };

        let mut overall = Vec::with_capacity(self.hospitals.len());
        for h in &self.hospitals {
            let stars = to_stars(h.overall());
            if stars > 0.0 {
                stats.rated += 1;
            }
            overall.push(stars);
            *stats.distribution.entry(format!("{:.1}", round_to_half(stars))).or_insert(0) += 1;

            match h.setting {
                Setting::Urban => stats.urban += 1,
                Setting::Rural => stats.rural += 1,
                Setting::Unknown => {}
            }
            match h.ownership {
                Ownership::NonProfit => stats.non_profit += 1,
                Ownership::ForProfit => stats.for_profit += 1,
                Ownership::Unknown => {}
            }
            if h.critical_access {
                stats.critical_access += 1;
            }
            if hospital_coord(h, &self.zips).is_some() {
                stats.locatable += 1;
            }
        }

        stats.unrated = stats.total - stats.rated;
        stats.average_overall = average_of(overall);
        stats
    }

    // ========================================================================
    // COMPARISON SELECTION
    // ========================================================================

    pub fn selection(&self) -> &CompareSelection {
        &self.selection
    }

    /// Select a hospital for comparison; unknown ids are rejected as Invalid
    pub fn select(&mut self, id: &str) -> AddOutcome {
        if self.get(id).is_none() {
            return AddOutcome::Invalid;
        }
        self.selection.add(id)
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        self.selection.remove(id)
    }

    pub fn toggle_selected(&mut self, id: &str) -> ToggleOutcome {
        if self.get(id).is_none() && !self.selection.contains(id) {
            return ToggleOutcome::Invalid;
        }
        self.selection.toggle(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Comparison of explicit ids, or of the saved selection when none are given
    pub fn comparison(&self, ids: Option<&[String]>) -> Result<ComparisonView, CompareError> {
        match ids {
            Some(ids) if !ids.is_empty() => ComparisonView::build(ids, &self.hospitals),
            _ => ComparisonView::build(&self.selection.to_ordered_list(), &self.hospitals),
        }
    }
}
