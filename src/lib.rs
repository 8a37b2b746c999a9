// Hospital Ratings - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod grades;     // Rating Normalizer: letter grades & numbers → stars
pub mod hospital;   // Canonical hospital record
pub mod scoring;    // Aggregate Scorer: category averages
pub mod geo;        // Distance Filter: ZIP lookup + haversine
pub mod selection;  // Comparison Selection Set (capped, persisted)
pub mod db;         // SQLite persistence for the selection
pub mod dataset;    // Loading & CSV export
pub mod filters;    // Type/city/name filters + sorting
pub mod details;    // Detail page view model
pub mod compare;    // Comparison page view model
pub mod config;     // Runtime configuration
pub mod browser;    // Controller tying it all together

// Re-export commonly used types
pub use grades::{
    grade_to_stars, round_to_half, star_ladder, stars_text, to_stars,
    RawRating, StarFill, MAX_STARS,
};
pub use hospital::{normalize_zip, Hospital, Ownership, Setting, OVERALL_METRIC};
pub use scoring::{average_of, average_stars, MetricCategory, MetricDef, MetricGetter};
pub use geo::{
    annotate_distances, distance_to, haversine_miles, retain_within, within_radius, Coord, ZipLookup,
    EARTH_RADIUS_MILES,
};
pub use selection::{
    AddOutcome, CompareSelection, MemorySelectionStore, SelectionStore, ToggleOutcome,
    MAX_COMPARE, SELECTION_KEY,
};
pub use db::{open_database, setup_database, SqliteSelectionStore};
pub use dataset::{export_csv, export_csv_file, parse_hospitals, HospitalSource, JsonFileSource, StaticSource};
pub use filters::{distinct_cities, sort_hospitals, HospitalFilter, HospitalType, SortKey};
pub use details::{format_metric_name, grade_badges, detail_sections, HospitalDetail, RatedMetric};
pub use compare::{CompareError, ComparisonView, MIN_COMPARE};
pub use config::BrowserConfig;
pub use browser::{HospitalBrowser, RadiusStatus, SearchHit, SearchQuery, SearchResults};

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global tracing subscriber (RUST_LOG overrides the default filter)
///
/// Logs go to stderr so they never mix with CSV or JSON written to stdout.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "hospital_ratings=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Build a browser from configuration
///
/// The dataset must load. A missing ZIP table only disables distances, and an
/// unusable database falls back to an in-memory selection.
pub fn open_browser(config: &BrowserConfig) -> Result<HospitalBrowser> {
    let zips = match ZipLookup::from_file(&config.zip_path) {
        Ok(zips) => zips,
        Err(e) => {
            tracing::warn!(error = %e, "ZIP lookup unavailable, distance search disabled");
            ZipLookup::new()
        }
    };

    let selection = match SqliteSelectionStore::open(&config.db_path) {
        Ok(store) => CompareSelection::load(Box::new(store)),
        Err(e) => {
            tracing::warn!(error = %e, "Selection database unavailable, selection will not persist");
            CompareSelection::in_memory()
        }
    };

    HospitalBrowser::new(&JsonFileSource::new(&config.data_path), zips, selection)
}
