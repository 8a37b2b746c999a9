// Hospital Ratings - Web Server
// JSON API over the hospital browser: search, details, comparison selection

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hospital_ratings::{
    init_logging, open_browser, AddOutcome, BrowserConfig, CompareError, HospitalBrowser,
    HospitalFilter, HospitalType, SearchQuery, SortKey, MAX_COMPARE,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    browser: Arc<Mutex<HospitalBrowser>>,
    default_radius: f64,
}

impl AppState {
    fn new(browser: HospitalBrowser, default_radius: f64) -> Self {
        Self {
            browser: Arc::new(Mutex::new(browser)),
            default_radius,
        }
    }

    // Poisoned lock still holds a consistent browser
    fn browser(&self) -> MutexGuard<'_, HospitalBrowser> {
        self.browser.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

/// Query string of GET /api/hospitals
#[derive(Debug, Default, Deserialize)]
struct HospitalsParams {
    zip: Option<String>,
    radius: Option<f64>,
    #[serde(rename = "type")]
    hospital_type: Option<String>,
    city: Option<String>,
    q: Option<String>,
    min_stars: Option<f64>,
    sort: Option<String>,
}

impl HospitalsParams {
    /// A ZIP without a radius gets the configured default radius
    fn into_query(self, default_radius: f64) -> Result<SearchQuery, String> {
        let mut filter = HospitalFilter::new();

        if let Some(token) = self.hospital_type.as_deref().filter(|t| !t.trim().is_empty()) {
            let hospital_type =
                HospitalType::parse(token).ok_or_else(|| format!("Unknown hospital type: {}", token))?;
            filter = filter.with_type(hospital_type);
        }
        if let Some(city) = self.city {
            filter = filter.with_city(city);
        }
        if let Some(q) = self.q {
            filter = filter.with_name_query(q);
        }
        if let Some(min) = self.min_stars {
            filter = filter.with_min_stars(min);
        }

        let zip = self.zip.filter(|z| !z.trim().is_empty());
        let radius_miles = match (&zip, self.radius) {
            (Some(_), None) => Some(default_radius),
            (_, radius) => radius,
        };

        Ok(SearchQuery {
            filter,
            zip,
            radius_miles,
            sort: self.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
        })
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    hospitals: usize,
}

#[derive(Serialize)]
struct SelectionResponse {
    ids: Vec<String>,
    max: usize,
    full: bool,
}

fn selection_response(browser: &HospitalBrowser) -> SelectionResponse {
    SelectionResponse {
        ids: browser.selection().to_ordered_list(),
        max: MAX_COMPARE,
        full: browser.selection().is_full(),
    }
}

#[derive(Debug, Default, Deserialize)]
struct CompareParams {
    /// Comma-separated; falls back to the saved selection when absent
    ids: Option<String>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let browser = state.browser();
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        version: hospital_ratings::VERSION,
        hospitals: browser.hospitals().len(),
    }))
}

/// GET /api/stats - Dataset summary
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.browser().stats()))
}

/// GET /api/hospitals - Filtered, located, sorted hospital list
async fn get_hospitals(
    State(state): State<AppState>,
    Query(params): Query<HospitalsParams>,
) -> Response {
    let query = match params.into_query(state.default_radius) {
        Ok(query) => query,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let browser = state.browser();
    let results = browser.search(&query);
    tracing::debug!(hits = results.hits.len(), ?query, "Search served");

    (StatusCode::OK, Json(ApiResponse::ok(results))).into_response()
}

/// GET /api/hospitals/:id - Detail view of one hospital
async fn get_hospital(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.browser().detail(&id) {
        Some(detail) => (StatusCode::OK, Json(ApiResponse::ok(detail))).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Hospital not found: {}", id)),
    }
}

/// GET /api/cities - Cities for the filter dropdown
async fn get_cities(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.browser().cities()))
}

/// GET /api/compare - Current comparison selection
async fn get_selection(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(selection_response(&state.browser())))
}

/// DELETE /api/compare - Clear the selection
async fn clear_selection(State(state): State<AppState>) -> impl IntoResponse {
    let mut browser = state.browser();
    browser.clear_selection();
    Json(ApiResponse::ok(selection_response(&browser)))
}

/// POST /api/compare/:id - Add a hospital to the selection
async fn add_to_selection(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut browser = state.browser();

    match browser.select(&id) {
        AddOutcome::Added | AddOutcome::AlreadySelected => {
            (StatusCode::OK, Json(ApiResponse::ok(selection_response(&browser)))).into_response()
        }
        AddOutcome::AtCapacity => error_response(
            StatusCode::CONFLICT,
            format!("You can compare up to {} hospitals at a time", MAX_COMPARE),
        ),
        AddOutcome::Invalid => {
            error_response(StatusCode::NOT_FOUND, format!("Hospital not found: {}", id))
        }
    }
}

/// DELETE /api/compare/:id - Remove a hospital from the selection
async fn remove_from_selection(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let mut browser = state.browser();
    browser.deselect(&id);
    Json(ApiResponse::ok(selection_response(&browser)))
}

/// GET /api/compare/view?ids=a,b,c - Side-by-side comparison
async fn get_comparison(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Response {
    let ids: Option<Vec<String>> = params.ids.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    });

    match state.browser().comparison(ids.as_deref()) {
        Ok(view) => (StatusCode::OK, Json(ApiResponse::ok(view))).into_response(),
        Err(e @ CompareError::NotFound(_)) => error_response(StatusCode::NOT_FOUND, e.to_string()),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/hospitals", get(get_hospitals))
        .route("/hospitals/:id", get(get_hospital))
        .route("/cities", get(get_cities))
        .route("/compare", get(get_selection).delete(clear_selection))
        .route("/compare/view", get(get_comparison))
        .route("/compare/:id", post(add_to_selection).delete(remove_from_selection))
        .with_state(state)
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = BrowserConfig::from_env();

    println!("🌐 Hospital Ratings - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if !config.data_path.exists() {
        eprintln!("❌ Hospital data not found at {:?}", config.data_path);
        eprintln!("   Set HOSPITAL_DATA to the JSON dataset path.");
        std::process::exit(1);
    }

    let browser = open_browser(&config)?;
    println!("✓ Loaded {} hospitals from {:?}", browser.hospitals().len(), config.data_path);
    println!("✓ {} ZIP codes available for distance search", browser.zips().len());

    let state = AppState::new(browser, config.default_radius_miles);

    let app = Router::new()
        .nest("/api", api_routes(state))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: http://{}/api/hospitals", config.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");
    tracing::info!(addr = %config.bind_addr, "Server started");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hospital_ratings::{CompareSelection, Coord, Hospital, StaticSource, ZipLookup, OVERALL_METRIC};

    fn state() -> AppState {
        let hospitals = vec![
            Hospital::new("1", "Alpha").with_location("Atlanta", "GA", "30303").with_metric(OVERALL_METRIC, "A"),
            Hospital::new("2", "Beta").with_location("Macon", "GA", "31201").with_metric(OVERALL_METRIC, "D-"),
            Hospital::new("3", "Gamma"),
            Hospital::new("a/b", "Slashed"),
            Hospital::new("50%25", "Literal percent"),
        ];
        let mut zips = ZipLookup::new();
        zips.insert("30303", Coord::new(33.7490, -84.3880));
        zips.insert("31201", Coord::new(32.8407, -83.6324));

        let browser =
            HospitalBrowser::new(&StaticSource(hospitals), zips, CompareSelection::in_memory()).unwrap();
        AppState::new(browser, 25.0)
    }

    #[test]
    fn test_params_to_query() {
        let params = HospitalsParams {
            zip: Some("30303".to_string()),
            hospital_type: Some("critical-access".to_string()),
            sort: Some("distance".to_string()),
            ..HospitalsParams::default()
        };
        let query = params.into_query(25.0).unwrap();
        assert_eq!(query.radius_miles, Some(25.0));
        assert_eq!(query.filter.hospital_type, Some(HospitalType::CriticalAccess));
        assert_eq!(query.sort, SortKey::Distance);

        let bad = HospitalsParams {
            hospital_type: Some("teaching".to_string()),
            ..HospitalsParams::default()
        };
        assert!(bad.into_query(25.0).is_err());

        let no_zip = HospitalsParams::default().into_query(25.0).unwrap();
        assert_eq!(no_zip.radius_miles, None);
    }

    #[tokio::test]
    async fn test_selection_endpoints() {
        let state = state();

        for id in ["1", "2", "3"] {
            let resp = add_to_selection(State(state.clone()), Path(id.to_string())).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let resp = add_to_selection(State(state.clone()), Path("a/b".to_string())).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = add_to_selection(State(state.clone()), Path("missing".to_string())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        remove_from_selection(State(state.clone()), Path("3".to_string())).await;
        let resp = add_to_selection(State(state.clone()), Path("a/b".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.browser().selection().to_ordered_list(), vec!["1", "2", "a/b"]);

        println!("✅ Selection endpoints test PASSED");
    }

    #[tokio::test]
    async fn test_comparison_endpoint() {
        let state = state();

        let resp = get_comparison(State(state.clone()), Query(CompareParams::default())).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let params = CompareParams {
            ids: Some("1, 2".to_string()),
        };
        let resp = get_comparison(State(state.clone()), Query(params)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let params = CompareParams {
            ids: Some("1,nope".to_string()),
        };
        let resp = get_comparison(State(state.clone()), Query(params)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hospital_endpoints() {
        let state = state();

        let resp = get_hospital(State(state.clone()), Path("2".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = get_hospital(State(state.clone()), Path("404".to_string())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        // Path ids arrive decoded; a literal percent sign is part of the id
        let resp = get_hospital(State(state.clone()), Path("50%25".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = get_hospital(State(state.clone()), Path("50%".to_string())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let params = HospitalsParams {
            hospital_type: Some("teaching".to_string()),
            ..HospitalsParams::default()
        };
        let resp = get_hospitals(State(state.clone()), Query(params)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = get_hospitals(State(state.clone()), Query(HospitalsParams::default())).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
