// 📍 Distance Filter - ZIP lookup + haversine radius search
//
// A ZIP the lookup doesn't know is a normal outcome, not an error:
// - Unknown origin ZIP → no filtering at all (caller may warn the user)
// - Hospital without coordinates → excluded from radius results

use crate::hospital::{normalize_zip, Hospital};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Earth's mean radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Coord { lat, lon }
    }

    /// Finite and within latitude/longitude bounds
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Great-circle distance in miles
pub fn haversine_miles(a: Coord, b: Coord) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_MILES * c
}

// ============================================================================
// ZIP LOOKUP
// ============================================================================

/// 5-digit ZIP → coordinate table
#[derive(Debug, Clone, Default)]
pub struct ZipLookup {
    coords: HashMap<String, Coord>,
}

impl ZipLookup {
    pub fn new() -> Self {
        ZipLookup::default()
    }

    /// Parse the `{"30303": {"lat": 33.75, "lon": -84.39}, ...}` format
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, serde_json::Value> =
            serde_json::from_str(json).context("Failed to parse ZIP lookup JSON")?;

        // One bad entry only loses that ZIP
        let mut lookup = ZipLookup::new();
        for (zip, value) in raw {
            match serde_json::from_value::<Coord>(value) {
                Ok(coord) => lookup.insert(&zip, coord),
                Err(e) => tracing::warn!(zip = %zip, error = %e, "Skipping ZIP lookup entry"),
            }
        }
        Ok(lookup)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read ZIP lookup file: {:?}", path.as_ref()))?;
        let lookup = Self::from_json_str(&content)?;
        tracing::debug!(zips = lookup.len(), "ZIP lookup loaded");
        Ok(lookup)
    }

    /// Add an entry; malformed ZIPs or invalid coordinates are ignored
    pub fn insert(&mut self, zip: &str, coord: Coord) {
        if let Some(zip) = normalize_zip(zip) {
            if coord.is_valid() {
                self.coords.insert(zip, coord);
            }
        }
    }

    pub fn get(&self, zip: &str) -> Option<Coord> {
        let zip = normalize_zip(zip)?;
        self.coords.get(&zip).copied()
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

// ============================================================================
// RADIUS FILTER
// ============================================================================

/// Where a hospital is: explicit lat/lon first, then its ZIP
pub fn hospital_coord(hospital: &Hospital, lookup: &ZipLookup) -> Option<Coord> {
    if let (Some(lat), Some(lon)) = (hospital.latitude, hospital.longitude) {
        let coord = Coord::new(lat, lon);
        if coord.is_valid() {
            return Some(coord);
        }
    }
    lookup.get(&hospital.zip)
}

/// Distance from an origin to a hospital, if the hospital can be located
pub fn distance_to(origin: Coord, hospital: &Hospital, lookup: &ZipLookup) -> Option<f64> {
    hospital_coord(hospital, lookup).map(|coord| haversine_miles(origin, coord))
}

/// Hospitals within `radius_miles` of `origin_zip` (boundary inclusive)
///
/// An origin ZIP missing from the lookup leaves the list unchanged.
pub fn within_radius<'a>(
    hospitals: &'a [Hospital],
    origin_zip: &str,
    radius_miles: f64,
    lookup: &ZipLookup,
) -> Vec<&'a Hospital> {
    let mut matched: Vec<&Hospital> = hospitals.iter().collect();
    let origin = match lookup.get(origin_zip) {
        Some(origin) => origin,
        None => {
            tracing::warn!(zip = origin_zip, "No coordinates found for ZIP, radius filter skipped");
            return matched;
        }
    };

    let distances = annotate_distances(hospitals, origin, lookup);
    retain_within(&mut matched, &distances, radius_miles);
    matched
}

/// Distance in miles per hospital id, for every hospital that can be located
pub fn annotate_distances<'a, I>(hospitals: I, origin: Coord, lookup: &ZipLookup) -> HashMap<String, f64>
where
    I: IntoIterator<Item = &'a Hospital>,
{
    hospitals
        .into_iter()
        .filter_map(|h| distance_to(origin, h, lookup).map(|d| (h.id.clone(), d)))
        .collect()
}

/// Keep hospitals whose annotated distance is at most `radius_miles`;
/// hospitals without a distance are dropped
pub fn retain_within(hospitals: &mut Vec<&Hospital>, distances: &HashMap<String, f64>, radius_miles: f64) {
    hospitals.retain(|h| {
        distances
            .get(&h.id)
            .map(|d| *d <= radius_miles)
            .unwrap_or(false)
    });
}

// ============================================================================
// TESTS
// ============================================================================
