//! Mapping from raw class codes to the labels shown to users.
//!
//! The mapping belongs to a specific trained model: the default assumes the
//! training pipeline encoded on-time graduation as `1` and late graduation as
//! `0`. [`LabelMapping::verify_classes`] is run against every loaded artifact so
//! a model with a different encoding is rejected at startup.

use crate::error::{ServingError, ServingResult};
use serde::{Deserialize, Serialize};

/// Label used for class codes the mapping does not know.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Presentation style of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Favourable outcome
    Success,
    /// Unfavourable or unrecognised outcome
    Warning,
    /// The prediction could not be made
    Error,
}

impl Tone {
    /// Lowercase name, used as CSS class and terminal prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Error => "error",
        }
    }
}

/// One entry of the label table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    /// Raw class code produced by the model
    pub code: i64,
    /// Human readable label
    pub label: String,
    /// How the label is presented
    pub tone: Tone,
}

/// A class code resolved to its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLabel {
    /// Label text
    pub text: String,
    /// Presentation style
    pub tone: Tone,
}

/// Static class-code to label table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMapping {
    entries: Vec<LabelEntry>,
}

impl Default for LabelMapping {
    fn default() -> Self {
        Self {
            entries: vec![
                LabelEntry {
                    code: 1,
                    label: "On-time".to_string(),
                    tone: Tone::Success,
                },
                LabelEntry {
                    code: 0,
                    label: "Late".to_string(),
                    tone: Tone::Warning,
                },
            ],
        }
    }
}

impl LabelMapping {
    /// Build a mapping from explicit entries.
    pub fn new(entries: Vec<LabelEntry>) -> ServingResult<Self> {
        let mapping = Self { entries };
        mapping.validate()?;
        Ok(mapping)
    }

    /// Check that the table is non-empty and free of duplicate codes.
    pub fn validate(&self) -> ServingResult<()> {
        if self.entries.is_empty() {
            return Err(ServingError::config("label mapping must not be empty"));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|e| e.code == entry.code) {
                return Err(ServingError::config(format!(
                    "label mapping has duplicate class code {}",
                    entry.code
                )));
            }
        }
        Ok(())
    }

    /// Resolve a class code. Unknown codes map to [`UNKNOWN_LABEL`] with a warning tone.
    pub fn resolve(&self, code: i64) -> ResolvedLabel {
        match self.entries.iter().find(|e| e.code == code) {
            Some(entry) => ResolvedLabel {
                text: entry.label.clone(),
                tone: entry.tone,
            },
            None => ResolvedLabel {
                text: UNKNOWN_LABEL.to_string(),
                tone: Tone::Warning,
            },
        }
    }

    /// Class codes known to the mapping, sorted.
    pub fn codes(&self) -> Vec<i64> {
        let mut codes: Vec<i64> = self.entries.iter().map(|e| e.code).collect();
        codes.sort_unstable();
        codes
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    /// Fail unless `classes` is exactly the set of codes this mapping covers.
    pub fn verify_classes(&self, classes: &[i64]) -> ServingResult<()> {
        let mut found = classes.to_vec();
        found.sort_unstable();
        found.dedup();
        let expected = self.codes();
        if found != expected || found.len() != classes.len() {
            return Err(ServingError::ClassEncodingMismatch {
                expected,
                found: classes.to_vec(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let labels = LabelMapping::default();
        assert_eq!(
            labels.resolve(1),
            ResolvedLabel {
                text: "On-time".to_string(),
                tone: Tone::Success
            }
        );
        assert_eq!(labels.resolve(0).text, "Late");
        assert_eq!(labels.resolve(0).tone, Tone::Warning);
    }

    #[test]
    fn test_unknown_codes_fall_back() {
        let labels = LabelMapping::default();
        for code in [2, -1, i64::MAX] {
            let resolved = labels.resolve(code);
            assert_eq!(resolved.text, UNKNOWN_LABEL);
            assert_eq!(resolved.tone, Tone::Warning);
        }
    }

    #[test]
    fn test_verify_classes() {
        let labels = LabelMapping::default();
        assert!(labels.verify_classes(&[0, 1]).is_ok());
        assert!(labels.verify_classes(&[1, 0]).is_ok());

        assert!(matches!(
            labels.verify_classes(&[1, 2]),
            Err(ServingError::ClassEncodingMismatch { .. })
        ));
        assert!(labels.verify_classes(&[0, 1, 2]).is_err());
        assert!(labels.verify_classes(&[0, 1, 1]).is_err());
        assert!(labels.verify_classes(&[1]).is_err());
    }

    #[test]
    fn test_new_rejects_duplicates_and_empty() {
        assert!(LabelMapping::new(vec![]).is_err());

        let dup = vec![
            LabelEntry {
                code: 0,
                label: "A".to_string(),
                tone: Tone::Success,
            },
            LabelEntry {
                code: 0,
                label: "B".to_string(),
                tone: Tone::Warning,
            },
        ];
        assert!(matches!(
            LabelMapping::new(dup),
            Err(ServingError::ConfigError(_))
        ));
    }

    #[test]
    fn test_mapping_deserializes_from_json() {
        let json = r#"{"entries":[
            {"code":0,"label":"Delayed","tone":"warning"},
            {"code":1,"label":"Punctual","tone":"success"}
        ]}"#;
        let labels: LabelMapping = serde_json::from_str(json).unwrap();
        assert_eq!(labels.codes(), vec![0, 1]);
        assert_eq!(labels.resolve(1).text, "Punctual");
        assert_eq!(Tone::Success.as_str(), "success");
    }
}
