//! Typed feature record and the input fields that produce it.
//!
//! [`FeatureRecord`] is the only structure that crosses the model boundary. Its
//! column names and order match the schema the classifier was trained on.
//! [`FieldSpec`] describes the five form inputs, and [`FormSubmission`] turns
//! raw submitted strings into a record while enforcing each field's range.

use crate::error::{ServingError, ServingResult};
use serde::{Deserialize, Serialize};

/// Column names used by the training schema, in model order.
pub const FEATURE_COLUMNS: [&str; 5] = [
    "ACT composite score",
    "SAT total score",
    "high school gpa",
    "parental income",
    "parent_edu_numerical",
];

/// Number of features a record carries.
pub const NUM_FEATURES: usize = FEATURE_COLUMNS.len();

/// A single student record passed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// ACT composite score (1-36)
    pub act_score: f64,
    /// SAT total score (400-1600)
    pub sat_score: f64,
    /// High school GPA (0-4)
    pub gpa: f64,
    /// Parental income (>= 0)
    pub parental_income: f64,
    /// Parent education level (0-20)
    pub parent_education_level: i64,
}

impl FeatureRecord {
    /// Values in [`FEATURE_COLUMNS`] order.
    pub fn to_row(&self) -> [f64; NUM_FEATURES] {
        [
            self.act_score,
            self.sat_score,
            self.gpa,
            self.parental_income,
            self.parent_education_level as f64,
        ]
    }

    /// Column names of this record, in [`FeatureRecord::to_row`] order.
    pub fn columns() -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            act_score: ACT_SCORE.default,
            sat_score: SAT_SCORE.default,
            gpa: GPA.default,
            parental_income: PARENTAL_INCOME.default,
            parent_education_level: PARENT_EDUCATION_LEVEL.default as i64,
        }
    }
}

/// Description of one numeric form input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Form field key
    pub key: &'static str,
    /// Caption shown next to the input
    pub caption: &'static str,
    /// Inclusive lower bound
    pub min: f64,
    /// Inclusive upper bound, if any
    pub max: Option<f64>,
    /// Initial value
    pub default: f64,
    /// Nominal increment; only whole-number fields enforce it in the page
    pub step: f64,
    /// Whether only whole numbers are accepted
    pub integer: bool,
}

impl FieldSpec {
    /// Whether `value` lies within the closed range of this field.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }

    fn parse(&self, raw: &str) -> ServingResult<f64> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ServingError::invalid_request(format!(
                "{} is required",
                self.caption
            )));
        }
        let value: f64 = raw.parse().map_err(|_| {
            ServingError::invalid_request(format!("{} must be a number, got {:?}", self.caption, raw))
        })?;
        if !value.is_finite() {
            return Err(ServingError::invalid_request(format!(
                "{} must be a finite number",
                self.caption
            )));
        }
        if self.integer && value.fract() != 0.0 {
            return Err(ServingError::invalid_request(format!(
                "{} must be a whole number",
                self.caption
            )));
        }
        if !self.contains(value) {
            return Err(ServingError::invalid_request(match self.max {
                Some(max) => format!(
                    "{} must be between {} and {}",
                    self.caption, self.min, max
                ),
                None => format!("{} must be at least {}", self.caption, self.min),
            }));
        }
        Ok(value)
    }
}

/// ACT composite score input.
pub const ACT_SCORE: FieldSpec = FieldSpec {
    key: "act_score",
    caption: "ACT Composite Score",
    min: 1.0,
    max: Some(36.0),
    default: 25.0,
    step: 0.1,
    integer: false,
};

/// SAT total score input.
pub const SAT_SCORE: FieldSpec = FieldSpec {
    key: "sat_score",
    caption: "SAT Total Score",
    min: 400.0,
    max: Some(1600.0),
    default: 1200.0,
    step: 1.0,
    integer: false,
};

/// High school GPA input.
pub const GPA: FieldSpec = FieldSpec {
    key: "gpa",
    caption: "High School GPA",
    min: 0.0,
    max: Some(4.0),
    default: 3.0,
    step: 0.01,
    integer: false,
};

/// Parental income input. Unbounded above.
pub const PARENTAL_INCOME: FieldSpec = FieldSpec {
    key: "parental_income",
    caption: "Parental Income",
    min: 0.0,
    max: None,
    default: 5_000_000.0,
    step: 100_000.0,
    integer: false,
};

/// Parent education level input (e.g. 12 for high school, 16 for a bachelor's degree).
pub const PARENT_EDUCATION_LEVEL: FieldSpec = FieldSpec {
    key: "parent_education_level",
    caption: "Parent Education Level",
    min: 0.0,
    max: Some(20.0),
    default: 12.0,
    step: 1.0,
    integer: true,
};

/// Form inputs grouped by column: academic scores, then family background.
pub const FIELD_GROUPS: [&[FieldSpec]; 2] = [
    &[ACT_SCORE, SAT_SCORE, GPA],
    &[PARENTAL_INCOME, PARENT_EDUCATION_LEVEL],
];

/// Raw values submitted from the prediction form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSubmission {
    /// Raw ACT score
    pub act_score: String,
    /// Raw SAT score
    pub sat_score: String,
    /// Raw GPA
    pub gpa: String,
    /// Raw parental income
    pub parental_income: String,
    /// Raw parent education level
    pub parent_education_level: String,
}

impl FormSubmission {
    /// Build a submission that echoes an already typed record.
    pub fn from_record(record: &FeatureRecord) -> Self {
        Self {
            act_score: record.act_score.to_string(),
            sat_score: record.sat_score.to_string(),
            gpa: record.gpa.to_string(),
            parental_income: record.parental_income.to_string(),
            parent_education_level: record.parent_education_level.to_string(),
        }
    }

    /// Raw value submitted for the field with the given key.
    pub fn value(&self, key: &str) -> Option<&str> {
        match key {
            "act_score" => Some(&self.act_score),
            "sat_score" => Some(&self.sat_score),
            "gpa" => Some(&self.gpa),
            "parental_income" => Some(&self.parental_income),
            "parent_education_level" => Some(&self.parent_education_level),
            _ => None,
        }
    }

    /// Parse every field, rejecting missing, malformed or out-of-range values.
    pub fn parse(&self) -> ServingResult<FeatureRecord> {
        Ok(FeatureRecord {
            act_score: ACT_SCORE.parse(&self.act_score)?,
            sat_score: SAT_SCORE.parse(&self.sat_score)?,
            gpa: GPA.parse(&self.gpa)?,
            parental_income: PARENTAL_INCOME.parse(&self.parental_income)?,
            parent_education_level: PARENT_EDUCATION_LEVEL.parse(&self.parent_education_level)?
                as i64,
        })
    }
}
