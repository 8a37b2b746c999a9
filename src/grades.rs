// ⭐ Rating Normalizer - letter grades and 0-5 scores → star values
//
// Source datasets mix two shapes for the same metric:
// - Letter grades ("A+", "b-", " C ")
// - Numeric scores already on a 0-5 scale (4.5, "3.5")
//
// Everything lands on one 0-5 star value. Bad data never blocks rendering:
// anything unrecognized degrades to 0 ("no data").

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Highest star value a rating can reach
pub const MAX_STARS: f64 = 5.0;

/// Fixed letter-grade scale, best to worst
pub const GRADE_SCALE: [(&str, f64); 13] = [
    ("A+", 5.0),
    ("A", 5.0),
    ("A-", 4.5),
    ("B+", 4.5),
    ("B", 4.0),
    ("B-", 3.5),
    ("C+", 3.5),
    ("C", 3.0),
    ("C-", 2.5),
    ("D+", 2.5),
    ("D", 2.0),
    ("D-", 1.5),
    ("F", 1.0),
];

// ============================================================================
// RAW RATING
// ============================================================================

/// A metric value as it appears in the source dataset
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawRating {
    /// null, absent, or the "NULL" sentinel
    #[default]
    Missing,

    /// Letter grade or any other textual value (may still be numeric-like)
    Grade(String),

    /// Numeric score
    Score(f64),
}

impl RawRating {
    /// Build from a JSON value. Booleans, arrays and objects carry no rating.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(RawRating::Score).unwrap_or_default(),
            Value::String(s) if s.trim().eq_ignore_ascii_case("NULL") => RawRating::Missing,
            Value::String(s) => RawRating::Grade(s.clone()),
            _ => RawRating::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            RawRating::Missing => true,
            RawRating::Grade(s) => s.trim().is_empty(),
            RawRating::Score(_) => false,
        }
    }

    /// Text shown next to the stars ("A-", "4.5", "N/A")
    pub fn display(&self) -> String {
        match self {
            RawRating::Missing => "N/A".to_string(),
            RawRating::Grade(s) if s.trim().is_empty() => "N/A".to_string(),
            RawRating::Grade(s) => s.trim().to_string(),
            RawRating::Score(v) => format!("{}", v),
        }
    }
}

impl Serialize for RawRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawRating::Missing => serializer.serialize_none(),
            RawRating::Grade(s) => serializer.serialize_str(s),
            RawRating::Score(v) => serializer.serialize_f64(*v),
        }
    }
}

impl From<&str> for RawRating {
    fn from(s: &str) -> Self {
        RawRating::from_value(&Value::String(s.to_string()))
    }
}

impl From<f64> for RawRating {
    fn from(v: f64) -> Self {
        RawRating::Score(v)
    }
}

impl<T: Into<RawRating>> From<Option<T>> for RawRating {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Look up a letter grade (case-insensitive, surrounding whitespace ignored)
pub fn grade_to_stars(grade: &str) -> Option<f64> {
    let token = grade.trim().to_ascii_uppercase();
    GRADE_SCALE
        .iter()
        .find(|(g, _)| *g == token)
        .map(|(_, stars)| *stars)
}

/// Convert any raw rating into a 0-5 star value
///
/// Grades use the fixed scale. Numbers are clamped to [0, 5] but not rounded.
/// Unknown tokens, NaN and missing values give 0.
pub fn to_stars(raw: &RawRating) -> f64 {
    match raw {
        RawRating::Missing => 0.0,
        RawRating::Score(v) => clamp_score(*v),
        RawRating::Grade(s) => {
            if let Some(stars) = grade_to_stars(s) {
                return stars;
            }
            s.trim().parse::<f64>().map(clamp_score).unwrap_or(0.0)
        }
    }
}

fn clamp_score(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, MAX_STARS)
    }
}

/// Round to the nearest half star, halves rounding up
pub fn round_to_half(v: f64) -> f64 {
    (v * 2.0).round() / 2.0
}

// ============================================================================
// STAR LADDER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StarFill {
    Full,
    Half,
    Empty,
}

/// Five star slots for a value: full if v >= i, half if v >= i - 0.5
pub fn star_ladder(value: f64) -> [StarFill; 5] {
    let mut stars = [StarFill::Empty; 5];
    for (idx, slot) in stars.iter_mut().enumerate() {
        let i = (idx + 1) as f64;
        *slot = if value >= i {
            StarFill::Full
        } else if value >= i - 0.5 {
            StarFill::Half
        } else {
            StarFill::Empty
        };
    }
    stars
}

/// Text rendering of the ladder for terminals: ★ full, ⯪ half, ☆ empty
pub fn stars_text(value: f64) -> String {
    star_ladder(value)
        .iter()
        .map(|fill| match fill {
            StarFill::Full => '★',
            StarFill::Half => '⯪',
            StarFill::Empty => '☆',
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_table() {
        assert_eq!(to_stars(&"A+".into()), 5.0);
        assert_eq!(to_stars(&"A".into()), 5.0);
        assert_eq!(to_stars(&"A-".into()), 4.5);
        assert_eq!(to_stars(&"B+".into()), 4.5);
        assert_eq!(to_stars(&"B".into()), 4.0);
        assert_eq!(to_stars(&"B-".into()), 3.5);
        assert_eq!(to_stars(&"C+".into()), 3.5);
        assert_eq!(to_stars(&"C".into()), 3.0);
        assert_eq!(to_stars(&"C-".into()), 2.5);
        assert_eq!(to_stars(&"D+".into()), 2.5);
        assert_eq!(to_stars(&"D".into()), 2.0);
        assert_eq!(to_stars(&"D-".into()), 1.5);
        assert_eq!(to_stars(&"F".into()), 1.0);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        for (grade, stars) in GRADE_SCALE {
            let lower: RawRating = grade.to_lowercase().as_str().into();
            let padded: RawRating = format!(" {} ", grade).as_str().into();
            assert_eq!(to_stars(&lower), stars, "lowercase {}", grade);
            assert_eq!(to_stars(&padded), stars, "padded {}", grade);
        }
    }

    #[test]
    fn test_unknown_and_missing_are_zero() {
        assert_eq!(to_stars(&"Z".into()), 0.0);
        assert_eq!(to_stars(&"N/A".into()), 0.0);
        assert_eq!(to_stars(&"NULL".into()), 0.0);
        assert_eq!(to_stars(&"".into()), 0.0);
        assert_eq!(to_stars(&RawRating::Missing), 0.0);
        assert_eq!(to_stars(&RawRating::from_value(&Value::Null)), 0.0);
        assert_eq!(to_stars(&RawRating::from_value(&Value::Bool(true))), 0.0);
    }

    #[test]
    fn test_numeric_clamping() {
        assert_eq!(to_stars(&(-3.0).into()), 0.0);
        assert_eq!(to_stars(&9.0.into()), 5.0);
        assert_eq!(to_stars(&"3.7".into()), 3.7);
        assert_eq!(to_stars(&" 12 ".into()), 5.0);
        assert_eq!(to_stars(&f64::NAN.into()), 0.0);
        assert_eq!(to_stars(&f64::INFINITY.into()), 5.0);
    }

    #[test]
    fn test_idempotent_on_half_steps() {
        for step in 0..=10 {
            let v = step as f64 / 2.0;
            assert_eq!(to_stars(&v.into()), v);
        }
    }

    #[test]
    fn test_from_json_values() {
        assert_eq!(RawRating::from_value(&serde_json::json!(4.5)), RawRating::Score(4.5));
        assert_eq!(RawRating::from_value(&serde_json::json!("NULL")), RawRating::Missing);
        assert_eq!(
            RawRating::from_value(&serde_json::json!("B+")),
            RawRating::Grade("B+".to_string())
        );
        assert_eq!(RawRating::from_value(&serde_json::json!([1, 2])), RawRating::Missing);
    }

    #[test]
    fn test_star_ladder_thresholds() {
        use StarFill::*;
        assert_eq!(star_ladder(0.0), [Empty, Empty, Empty, Empty, Empty]);
        assert_eq!(star_ladder(0.5), [Half, Empty, Empty, Empty, Empty]);
        assert_eq!(star_ladder(3.5), [Full, Full, Full, Half, Empty]);
        assert_eq!(star_ladder(5.0), [Full, Full, Full, Full, Full]);
        // Ladder, not rounding: 3.7 is still a half fourth star
        assert_eq!(star_ladder(3.7), [Full, Full, Full, Half, Empty]);
        assert_eq!(star_ladder(3.4), [Full, Full, Full, Empty, Empty]);
        assert_eq!(stars_text(2.5), "★★⯪☆☆");
    }

    #[test]
    fn test_round_to_half() {
        assert_eq!(round_to_half(3.25), 3.5);
        assert_eq!(round_to_half(3.24), 3.0);
        assert_eq!(round_to_half(4.75), 5.0);
        assert_eq!(round_to_half(1.0), 1.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(RawRating::Missing.display(), "N/A");
        assert_eq!(RawRating::from(" B ").display(), "B");
        assert_eq!(RawRating::Score(4.5).display(), "4.5");
    }
}
