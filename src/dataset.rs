// 📂 Dataset loading & export
//
// Loading is an injected dependency (HospitalSource) so the controller can be
// driven from a file, an HTTP fetch, or a fixed list in tests.

use crate::grades::to_stars;
use crate::hospital::Hospital;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Anything that can produce the hospital list
pub trait HospitalSource {
    fn load(&self) -> Result<Vec<Hospital>>;
}

/// JSON array of hospital records on disk
pub struct JsonFileSource {
    pub path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl HospitalSource for JsonFileSource {
    fn load(&self) -> Result<Vec<Hospital>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read hospital data: {:?}", self.path))?;
        let hospitals = parse_hospitals(&content)?;
        tracing::info!(count = hospitals.len(), path = ?self.path, "Hospital data loaded");
        Ok(hospitals)
    }
}

/// Already-built hospitals
pub struct StaticSource(pub Vec<Hospital>);

impl HospitalSource for StaticSource {
    fn load(&self) -> Result<Vec<Hospital>> {
        Ok(self.0.clone())
    }
}

/// Parse a JSON array of raw records into canonical hospitals
///
/// Records that are not objects, have no id, or repeat an earlier id are
/// skipped with a warning; the rest of the dataset still loads.
pub fn parse_hospitals(json: &str) -> Result<Vec<Hospital>> {
    let value: Value = serde_json::from_str(json).context("Failed to parse hospital JSON")?;
    let records = value
        .as_array()
        .ok_or_else(|| anyhow!("Hospital data must be a JSON array of records"))?;

    let mut seen = HashSet::new();
    let mut hospitals = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let Some(object) = record.as_object() else {
            tracing::warn!(index, "Skipping non-object hospital record");
            continue;
        };
        let Some(hospital) = Hospital::from_record(object) else {
            tracing::warn!(index, "Skipping hospital record without an identifier");
            continue;
        };
        if !seen.insert(hospital.id.clone()) {
            tracing::warn!(index, id = %hospital.id, "Skipping duplicate hospital id");
            continue;
        }
        hospitals.push(hospital);
    }

    Ok(hospitals)
}

// ============================================================================
// CSV EXPORT
// ============================================================================

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Record_ID")]
    id: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "State")]
    state: &'a str,
    #[serde(rename = "Zip")]
    zip: &'a str,
    #[serde(rename = "County")]
    county: &'a str,
    #[serde(rename = "Ownership")]
    ownership: &'a str,
    #[serde(rename = "Setting")]
    setting: &'a str,
    #[serde(rename = "Overall_Grade")]
    overall_grade: String,
    #[serde(rename = "Overall_Stars")]
    overall_stars: f64,
}

/// Write the given hospitals as CSV (one row each, overall rating included)
pub fn export_csv<W: std::io::Write>(writer: W, hospitals: &[&Hospital]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    for h in hospitals {
        wtr.serialize(ExportRow {
            id: &h.id,
            name: h.display_name(),
            city: &h.city,
            state: &h.state,
            zip: &h.zip,
            county: &h.county,
            ownership: h.ownership.as_str(),
            setting: h.setting.as_str(),
            overall_grade: h.overall().display(),
            overall_stars: to_stars(h.overall()),
        })
        .context("Failed to write CSV row")?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(hospitals.len())
}

pub fn export_csv_file(path: &Path, hospitals: &[&Hospital]) -> Result<usize> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;
    export_csv(file, hospitals)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"RECORD_ID": 1, "Name": "Alpha", "City": "Atlanta", "State": "GA", "Zip": "30303",
         "TIER_1_GRADE_Lown_Composite": "A"},
        {"RECORD_ID": "2", "HOSPITAL_NAME": "Beta", "CITY": "Macon", "STATE": "GA",
         "TIER_1_GRADE_Lown_Composite": "D-"},
        {"Name": "No id"},
        42,
        {"RECORD_ID": 1, "Name": "Alpha duplicate"}
    ]"#;

    #[test]
    fn test_parse_skips_bad_records() {
        let hospitals = parse_hospitals(SAMPLE).unwrap();
        assert_eq!(hospitals.len(), 2);
        assert_eq!(hospitals[0].name, "Alpha");
        assert_eq!(hospitals[1].name, "Beta");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_hospitals(r#"{"RECORD_ID": 1}"#).is_err());
        assert!(parse_hospitals("not json").is_err());
    }

    #[test]
    fn test_static_source() {
        let source = StaticSource(vec![Hospital::new("x", "X")]);
        assert_eq!(source.load().unwrap().len(), 1);
    }

    #[test]
    fn test_export_csv() {
        let hospitals = parse_hospitals(SAMPLE).unwrap();
        let refs: Vec<&Hospital> = hospitals.iter().collect();

        let mut out = Vec::new();
        let written = export_csv(&mut out, &refs).unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Record_ID,Name,City,State,Zip,County,Ownership,Setting,Overall_Grade,Overall_Stars")
        );
        assert_eq!(lines.next(), Some("1,Alpha,Atlanta,GA,30303,,Unknown,Unknown,A,5.0"));
        assert_eq!(lines.next(), Some("2,Beta,Macon,GA,,,Unknown,Unknown,D-,1.5"));

        println!("✅ CSV export test PASSED");
    }
}
