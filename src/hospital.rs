// 🏥 Hospital Entity - one canonical shape for every dataset variant
//
// Source files disagree on field names from year to year:
//   "Name" / "HOSPITAL_NAME" / "Hospital Name"
//   "City" / "CITY", "Zip" / "ZIP_CODE", "Latitude" / "LAT" ...
//
// All of that is resolved HERE, once, at ingestion. Nothing downstream ever
// branches on a field-name variant.

use crate::grades::RawRating;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Composite grade used as the hospital's overall rating
pub const OVERALL_METRIC: &str = "TIER_1_GRADE_Lown_Composite";

static MISSING: RawRating = RawRating::Missing;

// ============================================================================
// FIELD VARIANTS
// ============================================================================

const ID_KEYS: &[&str] = &["RECORD_ID", "id", "ID", "Record ID"];
const NAME_KEYS: &[&str] = &["Name", "HOSPITAL_NAME", "Hospital Name"];
const ADDRESS_KEYS: &[&str] = &["Address", "ADDRESS"];
const CITY_KEYS: &[&str] = &["City", "CITY"];
const STATE_KEYS: &[&str] = &["State", "STATE"];
const ZIP_KEYS: &[&str] = &["Zip", "ZIP_CODE", "ZIP", "zip"];
const COUNTY_KEYS: &[&str] = &["County", "COUNTY"];
const SIZE_KEYS: &[&str] = &["Size", "SIZE"];
const LAT_KEYS: &[&str] = &["Latitude", "LAT", "lat"];
const LON_KEYS: &[&str] = &["Longitude", "LON", "lng", "lon"];
const SERVICES_KEYS: &[&str] = &["Services", "SERVICES"];
const HOSPITAL_TYPE_KEYS: &[&str] = &["HOSPITAL_TYPE", "Hospital Type"];
const OWNERSHIP_KEYS: &[&str] = &["OWNERSHIP", "Ownership"];
const SYSTEM_NAME_KEYS: &[&str] = &["SYSTEM_NAME", "System Name"];

// ============================================================================
// CLASSIFICATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ownership {
    NonProfit,
    ForProfit,
    Unknown,
}

impl Ownership {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ownership::NonProfit => "Nonprofit",
            Ownership::ForProfit => "For Profit",
            Ownership::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Setting {
    Urban,
    Rural,
    Unknown,
}

impl Setting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Setting::Urban => "Urban",
            Setting::Rural => "Rural",
            Setting::Unknown => "Unknown",
        }
    }
}

// ============================================================================
// HOSPITAL ENTITY
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Hospital {
    /// Record identifier, always compared as a string
    pub id: String,

    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    /// 5-digit ZIP (empty if the record has none)
    pub zip: String,
    pub county: String,
    pub size: String,

    pub ownership: Ownership,
    pub setting: Setting,
    pub critical_access: bool,
    pub in_system: bool,
    pub system_name: Option<String>,
    pub hospital_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    pub services: Vec<String>,

    /// Every GRADE / STARS / SCORE field, keyed by its source name
    pub metrics: BTreeMap<String, RawRating>,

    /// Anything else in the record (county income, free care policy ...)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Hospital {
    /// Blank hospital with only an id and a name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Hospital {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            county: String::new(),
            size: String::new(),
            ownership: Ownership::Unknown,
            setting: Setting::Unknown,
            critical_access: false,
            in_system: false,
            system_name: None,
            hospital_type: None,
            latitude: None,
            longitude: None,
            services: Vec::new(),
            metrics: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Builder: set a metric value
    pub fn with_metric(mut self, key: impl Into<String>, value: impl Into<RawRating>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }

    /// Builder: set the location fields
    pub fn with_location(mut self, city: &str, state: &str, zip: &str) -> Self {
        self.city = city.to_string();
        self.state = state.to_string();
        self.zip = normalize_zip(zip).unwrap_or_default();
        self
    }

    /// Builder: set explicit coordinates
    pub fn with_coords(mut self, lat: f64, lon: f64) -> Self {
        self.latitude = Some(lat);
        self.longitude = Some(lon);
        self
    }

    /// Normalize one raw dataset record
    ///
    /// Returns None when the record has no usable identifier.
    pub fn from_record(record: &Map<String, Value>) -> Option<Hospital> {
        let id = first_value(record, ID_KEYS).and_then(value_to_string)?;
        if id.is_empty() {
            return None;
        }

        let mut hospital = Hospital::new(id, first_string(record, NAME_KEYS).unwrap_or_default());
        hospital.address = first_string(record, ADDRESS_KEYS).unwrap_or_default();
        hospital.city = first_string(record, CITY_KEYS).unwrap_or_default();
        hospital.state = first_string(record, STATE_KEYS).unwrap_or_default();
        hospital.zip = first_value(record, ZIP_KEYS)
            .and_then(value_to_string)
            .and_then(|z| normalize_zip(&z))
            .unwrap_or_default();
        hospital.county = first_string(record, COUNTY_KEYS).unwrap_or_default();
        hospital.size = first_string(record, SIZE_KEYS).unwrap_or_default();

        hospital.hospital_type = first_string(record, HOSPITAL_TYPE_KEYS);
        hospital.system_name = first_string(record, SYSTEM_NAME_KEYS);
        hospital.ownership = detect_ownership(record);
        hospital.setting = detect_setting(record);
        hospital.critical_access = truthy(record.get("TYPE_HospTyp_CAH"))
            || hospital
                .hospital_type
                .as_deref()
                .map(|t| t.to_lowercase().contains("critical access"))
                .unwrap_or(false);
        hospital.in_system =
            truthy(record.get("HOSPITAL_SYSTEM")) || hospital.system_name.is_some();

        hospital.latitude = first_value(record, LAT_KEYS).and_then(value_to_f64);
        hospital.longitude = first_value(record, LON_KEYS).and_then(value_to_f64);
        hospital.services = first_value(record, SERVICES_KEYS)
            .map(parse_services)
            .unwrap_or_default();

        for (key, value) in record {
            if is_metric_key(key) {
                hospital.metrics.insert(key.clone(), RawRating::from_value(value));
            } else if !is_known_key(key) {
                hospital.extra.insert(key.clone(), value.clone());
            }
        }

        Some(hospital)
    }

    /// Raw value for a metric (Missing if the dataset lacks it)
    pub fn metric(&self, key: &str) -> &RawRating {
        self.metrics.get(key).unwrap_or(&MISSING)
    }

    pub fn overall(&self) -> &RawRating {
        self.metric(OVERALL_METRIC)
    }

    /// Name with the display fallback
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unnamed Hospital"
        } else {
            &self.name
        }
    }

    /// "City, State" (skips empty parts)
    pub fn location_line(&self) -> String {
        [self.city.as_str(), self.state.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// "Address, City, State, Zip"
    pub fn full_address(&self) -> String {
        [
            self.address.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip.as_str(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

// ============================================================================
// FIELD HELPERS
// ============================================================================

fn is_metric_key(key: &str) -> bool {
    key.contains("GRADE") || key.contains("STARS") || key.contains("SCORE")
}

fn is_known_key(key: &str) -> bool {
    [
        ID_KEYS,
        NAME_KEYS,
        ADDRESS_KEYS,
        CITY_KEYS,
        STATE_KEYS,
        ZIP_KEYS,
        COUNTY_KEYS,
        SIZE_KEYS,
        LAT_KEYS,
        LON_KEYS,
        SERVICES_KEYS,
        HOSPITAL_TYPE_KEYS,
        OWNERSHIP_KEYS,
        SYSTEM_NAME_KEYS,
    ]
    .iter()
    .any(|keys| keys.contains(&key))
        || key.starts_with("TYPE_")
        || key == "HOSPITAL_SYSTEM"
}

fn first_value<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_null() && v.as_str().map(|s| !s.trim().is_empty()).unwrap_or(true))
}

fn first_string(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_value(record, keys).and_then(value_to_string)
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.trim().eq_ignore_ascii_case("NULL") => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// 1, "1", "Y", "Yes", true
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "Y" | "Yes"),
        _ => false,
    }
}

fn detect_ownership(record: &Map<String, Value>) -> Ownership {
    if truthy(record.get("TYPE_NonProfit")) {
        return Ownership::NonProfit;
    }
    if truthy(record.get("TYPE_ForProfit")) {
        return Ownership::ForProfit;
    }

    match first_string(record, OWNERSHIP_KEYS) {
        Some(text) => {
            let lower = text.to_lowercase();
            if lower.contains("non-profit") || lower.contains("nonprofit") || lower.contains("non profit") {
                Ownership::NonProfit
            } else if lower.contains("proprietary") || lower.contains("profit") {
                Ownership::ForProfit
            } else {
                Ownership::Unknown
            }
        }
        None => Ownership::Unknown,
    }
}

fn detect_setting(record: &Map<String, Value>) -> Setting {
    if truthy(record.get("TYPE_urban")) {
        Setting::Urban
    } else if truthy(record.get("TYPE_rural")) {
        Setting::Rural
    } else {
        Setting::Unknown
    }
}

fn parse_services(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(value_to_string)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Canonical 5-digit ZIP: digits only, ZIP+4 suffix dropped, short numeric
/// ZIPs left-padded ("2134" → "02134")
pub fn normalize_zip(raw: &str) -> Option<String> {
    let head = raw.trim().split('-').next().unwrap_or("");
    if head.is_empty() || head.len() > 5 || !head.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{:0>5}", head))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_record_title_case_variant() {
        let rec = record(json!({
            "RECORD_ID": 101,
            "Name": "Grady Memorial",
            "Address": "80 Jesse Hill Jr Dr SE",
            "City": "Atlanta",
            "State": "GA",
            "Zip": 30303,
            "County": "Fulton",
            "Size": "Large",
            "TYPE_NonProfit": 1,
            "TYPE_urban": 1,
            "TIER_1_GRADE_Lown_Composite": "B+",
            "TIER_2_GRADE_Value": "NULL",
            "county_income_shrt": "High"
        }));

        let h = Hospital::from_record(&rec).unwrap();
        assert_eq!(h.id, "101");
        assert_eq!(h.name, "Grady Memorial");
        assert_eq!(h.zip, "30303");
        assert_eq!(h.ownership, Ownership::NonProfit);
        assert_eq!(h.setting, Setting::Urban);
        assert_eq!(h.overall(), &RawRating::Grade("B+".to_string()));
        assert_eq!(h.metric("TIER_2_GRADE_Value"), &RawRating::Missing);
        assert_eq!(h.metric("NOT_THERE"), &RawRating::Missing);
        assert_eq!(h.extra.get("county_income_shrt"), Some(&json!("High")));
        assert_eq!(h.full_address(), "80 Jesse Hill Jr Dr SE, Atlanta, GA, 30303");
    }

    #[test]
    fn test_from_record_upper_case_variant() {
        let rec = record(json!({
            "RECORD_ID": "GA-7",
            "HOSPITAL_NAME": "Rural County Medical",
            "CITY": "Cuthbert",
            "STATE": "GA",
            "ZIP_CODE": "39840-1234",
            "HOSPITAL_TYPE": "Critical Access Hospitals",
            "OWNERSHIP": "Proprietary",
            "SYSTEM_NAME": "Acme Health",
            "LAT": "31.77",
            "LON": -84.79,
            "SERVICES": "Emergency, Surgery , ,Imaging"
        }));

        let h = Hospital::from_record(&rec).unwrap();
        assert_eq!(h.name, "Rural County Medical");
        assert_eq!(h.city, "Cuthbert");
        assert_eq!(h.zip, "39840");
        assert!(h.critical_access);
        assert!(h.in_system);
        assert_eq!(h.ownership, Ownership::ForProfit);
        assert_eq!(h.latitude, Some(31.77));
        assert_eq!(h.longitude, Some(-84.79));
        assert_eq!(h.services, vec!["Emergency", "Surgery", "Imaging"]);
    }

    #[test]
    fn test_record_without_id_is_skipped() {
        let rec = record(json!({ "Name": "No Id Hospital" }));
        assert!(Hospital::from_record(&rec).is_none());

        let rec = record(json!({ "RECORD_ID": "  ", "Name": "Blank Id" }));
        assert!(Hospital::from_record(&rec).is_none());
    }

    #[test]
    fn test_display_fallbacks() {
        let h = Hospital::new("1", "");
        assert_eq!(h.display_name(), "Unnamed Hospital");
        assert_eq!(h.location_line(), "");

        let h = Hospital::new("2", "X").with_location("Macon", "GA", "31201");
        assert_eq!(h.location_line(), "Macon, GA");
    }

    #[test]
    fn test_normalize_zip() {
        assert_eq!(normalize_zip("30303"), Some("30303".to_string()));
        assert_eq!(normalize_zip(" 30303-0001 "), Some("30303".to_string()));
        assert_eq!(normalize_zip("2134"), Some("02134".to_string()));
        assert_eq!(normalize_zip("ABCDE"), None);
        assert_eq!(normalize_zip("123456"), None);
        assert_eq!(normalize_zip(""), None);
    }
}
