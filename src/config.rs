// ⚙️ Runtime configuration - compiled defaults with environment overrides

use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data/hospitals.json";
pub const DEFAULT_ZIP_PATH: &str = "data/zip_coords.json";
pub const DEFAULT_DB_PATH: &str = "hospital_ratings.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_RADIUS_MILES: f64 = 25.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BrowserConfig {
    /// JSON array of hospital records
    pub data_path: PathBuf,
    /// ZIP → lat/lon table; search works without it, minus distances
    pub zip_path: PathBuf,
    /// SQLite file holding the comparison selection
    pub db_path: PathBuf,
    pub bind_addr: String,
    pub default_radius_miles: f64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        BrowserConfig {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            zip_path: PathBuf::from(DEFAULT_ZIP_PATH),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            default_radius_miles: DEFAULT_RADIUS_MILES,
        }
    }
}

impl BrowserConfig {
    /// Defaults overridden by HOSPITAL_* variables (a `.env` file is read first)
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = ?path, "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = BrowserConfig::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(path) = non_empty("HOSPITAL_DATA") {
            config.data_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty("HOSPITAL_ZIPS") {
            config.zip_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty("HOSPITAL_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(addr) = non_empty("HOSPITAL_BIND") {
            config.bind_addr = addr;
        }

        if let Some(radius) = non_empty("HOSPITAL_RADIUS") {
            match radius.parse::<f64>() {
                Ok(value) if value.is_finite() && value > 0.0 => {
                    config.default_radius_miles = value;
                }
                _ => {
                    tracing::warn!(
                        "Invalid HOSPITAL_RADIUS value: {}, using default: {}",
                        radius,
                        config.default_radius_miles
                    );
                }
            }
        }

        config
    }
}
