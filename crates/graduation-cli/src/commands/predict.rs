//! Predict Command Implementation
//!
//! Runs a single record through the model and prints the outcome.

use super::load_config;
use anyhow::{Context, Result};
use clap::Args;
use graduation_serving::features::{
    ACT_SCORE, GPA, PARENTAL_INCOME, PARENT_EDUCATION_LEVEL, SAT_SCORE,
};
use graduation_serving::{
    render_line, FormSubmission, ModelLoader, PredictionForm, PredictionOutcome,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Predict graduation timing for one student
///
/// Omitted fields take the same defaults as the web form.
///
/// # Example
///
/// ```bash
/// graduation predict --act 29 --sat 1350 --gpa 3.6 --income 7500000 --education 16
/// ```
#[derive(Args, Debug, Clone)]
pub struct PredictCommand {
    /// ACT composite score (1-36)
    #[arg(long, default_value_t = ACT_SCORE.default)]
    pub act: f64,

    /// SAT total score (400-1600)
    #[arg(long, default_value_t = SAT_SCORE.default)]
    pub sat: f64,

    /// High school GPA (0-4)
    #[arg(long, default_value_t = GPA.default)]
    pub gpa: f64,

    /// Parental income
    #[arg(long, default_value_t = PARENTAL_INCOME.default)]
    pub income: f64,

    /// Parent education level in years (0-20)
    #[arg(long, default_value_t = PARENT_EDUCATION_LEVEL.default as i64)]
    pub education: i64,

    /// Path to the model artifact
    #[arg(long, short = 'm', env = "GRADUATION_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// JSON configuration file (label mapping and model path)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

impl PredictCommand {
    /// Raw form values for the flags.
    pub fn submission(&self) -> FormSubmission {
        FormSubmission {
            act_score: self.act.to_string(),
            sat_score: self.sat.to_string(),
            gpa: self.gpa.to_string(),
            parental_income: self.income.to_string(),
            parent_education_level: self.education.to_string(),
        }
    }

    /// Load the model and predict, without printing.
    ///
    /// Fails only when the model cannot be loaded; input and inference errors
    /// come back as a [`PredictionOutcome::Failed`].
    pub fn execute(&self) -> Result<PredictionOutcome> {
        let config = load_config(self.config.as_deref())?;
        let model_path = self.model.clone().unwrap_or(config.model_path);
        info!("Loading model from {:?}", model_path);

        let loader = ModelLoader::from_path(&model_path, config.labels);
        let model = loader
            .get_model()
            .map_err(|e| {
                error!("Failed to load model: {}", e);
                e
            })
            .with_context(|| format!("failed to load model from {}", model_path.display()))?;

        let mut form = PredictionForm::new(loader.labels().clone());
        Ok(form.submit(model.as_ref(), self.submission()))
    }

    /// Execute the predict command
    pub fn run(&self) -> Result<ExitCode> {
        let outcome = self.execute()?;
        println!("{}", render_line(&outcome));
        Ok(match outcome {
            PredictionOutcome::Predicted { .. } => ExitCode::SUCCESS,
            PredictionOutcome::Failed { .. } => ExitCode::FAILURE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graduation_serving::Tone;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn write_model(dir: &Path) -> PathBuf {
        let path = dir.join("model_graduation.json");
        let artifact = serde_json::json!({
            "name": "model_graduation",
            "feature_names": graduation_serving::FEATURE_COLUMNS,
            "classes": [0, 1],
            "model": {
                "type": "logistic_regression",
                "coef": [[0.0, 0.0, 10.0, 0.0, 0.0]],
                "intercept": [-30.0]
            }
        });
        std::fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();
        path
    }

    fn command(model: PathBuf, gpa: f64) -> PredictCommand {
        PredictCommand {
            act: 25.0,
            sat: 1200.0,
            gpa,
            income: 5_000_000.0,
            education: 12,
            model: Some(model),
            config: None,
        }
    }

    #[test]
    fn test_submission_formats_flags() {
        let cmd = command(PathBuf::from("m.json"), 3.25);
        let submission = cmd.submission();
        assert_eq!(submission.gpa, "3.25");
        assert_eq!(submission.parent_education_level, "12");
        assert_eq!(submission.parental_income, "5000000");
    }

    #[test]
    fn test_execute_predicts_both_classes() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path());

        let outcome = command(path.clone(), 3.8).execute().unwrap();
        assert_eq!(outcome.label(), Some("On-time"));

        let outcome = command(path, 2.1).execute().unwrap();
        assert_eq!(outcome.label(), Some("Late"));
        assert_eq!(outcome.tone(), Tone::Warning);
    }

    #[test]
    fn test_out_of_range_flag_fails_softly() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path());

        let outcome = command(path, 4.5).execute().unwrap();
        assert_eq!(outcome.tone(), Tone::Error);
        assert!(render_line(&outcome).starts_with("[error] "));
    }

    #[test]
    fn test_missing_model_is_an_error() {
        let dir = tempdir().unwrap();
        let err = command(dir.path().join("absent.json"), 3.0)
            .execute()
            .unwrap_err();
        assert!(err.to_string().contains("failed to load model"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_model_load_failure_is_logged() {
        let dir = tempdir().unwrap();
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, || {
            command(dir.path().join("absent.json"), 3.0).execute()
        });
        assert!(result.is_err());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("Failed to load model"), "{output}");
    }

    #[test]
    fn test_invalid_label_config_is_reported_before_loading() {
        let dir = tempdir().unwrap();
        let model = write_model(dir.path());
        let config = dir.path().join("graduation.json");
        std::fs::write(&config, r#"{"labels": {"entries": []}}"#).unwrap();

        let mut cmd = command(model, 3.0);
        cmd.config = Some(config);
        let err = cmd.execute().unwrap_err();
        assert!(err.to_string().contains("invalid config"), "{err}");
    }
}
