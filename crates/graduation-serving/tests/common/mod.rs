#![allow(dead_code)]

use graduation_serving::{ArtifactSource, Classifier, FeatureRecord, ServingError, ServingResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Classifier that always answers with the same class code, or fails.
pub struct Scripted {
    pub answer: Option<i64>,
}

impl Scripted {
    pub fn code(code: i64) -> Self {
        Self { answer: Some(code) }
    }

    pub fn failing() -> Self {
        Self { answer: None }
    }
}

impl Classifier for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn feature_names(&self) -> &[String] {
        &[]
    }

    fn classes(&self) -> &[i64] {
        &[0, 1]
    }

    fn predict(&self, _record: &FeatureRecord) -> ServingResult<i64> {
        self.answer
            .ok_or_else(|| ServingError::prediction("internal library error"))
    }
}

/// Source that counts how often it is read.
pub struct CountingSource {
    pub reads: Arc<AtomicU64>,
    pub code: i64,
}

impl CountingSource {
    pub fn new(code: i64) -> (Self, Arc<AtomicU64>) {
        let reads = Arc::new(AtomicU64::new(0));
        (
            Self {
                reads: Arc::clone(&reads),
                code,
            },
            reads,
        )
    }
}

impl ArtifactSource for CountingSource {
    fn describe(&self) -> String {
        "counting".to_string()
    }

    fn load(&self) -> ServingResult<Arc<dyn Classifier>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Scripted::code(self.code)))
    }
}

/// Gaussian NB artifact separating weak (late) from strong (on-time) students.
pub fn nb_artifact_json() -> serde_json::Value {
    serde_json::json!({
        "name": "model_graduation",
        "feature_names": [
            "ACT composite score",
            "SAT total score",
            "high school gpa",
            "parental income",
            "parent_edu_numerical"
        ],
        "classes": [0, 1],
        "model": {
            "type": "gaussian_nb",
            "class_prior": [0.45, 0.55],
            "theta": [
                [18.0, 900.0, 2.2, 3000000.0, 10.0],
                [30.0, 1400.0, 3.6, 6000000.0, 14.0]
            ],
            "var": [
                [9.0, 10000.0, 0.09, 1e12, 4.0],
                [9.0, 10000.0, 0.09, 1e12, 4.0]
            ]
        }
    })
}

/// Write `value` as JSON into `dir` and return the path.
pub fn write_artifact(dir: &Path, value: &serde_json::Value) -> PathBuf {
    let path = dir.join("model_graduation.json");
    std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

pub fn strong_student() -> FeatureRecord {
    FeatureRecord {
        act_score: 31.0,
        sat_score: 1450.0,
        gpa: 3.7,
        parental_income: 6_500_000.0,
        parent_education_level: 16,
    }
}

pub fn weak_student() -> FeatureRecord {
    FeatureRecord {
        act_score: 17.0,
        sat_score: 880.0,
        gpa: 2.0,
        parental_income: 2_500_000.0,
        parent_education_level: 9,
    }
}
