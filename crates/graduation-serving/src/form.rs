//! Prediction form handling.
//!
//! [`predict`] runs one record through a classifier and turns the class code
//! into a [`PredictionOutcome`]. [`PredictionForm`] wraps it in the form's two-state
//! machine: `Idle` until the first submit, then `ResultShown` for every
//! submit after that, whether it succeeded or not.

use crate::error::ServingError;
use crate::features::{FeatureRecord, FormSubmission};
use crate::inference::Classifier;
use crate::labels::{LabelMapping, ResolvedLabel, Tone};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Result of one prediction attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    /// The model produced a class code.
    Predicted {
        /// Raw class code
        code: i64,
        /// Label resolved from the code
        label: ResolvedLabel,
    },
    /// The attempt failed; the form stays usable.
    Failed {
        /// Message shown to the user
        reason: String,
    },
}

impl PredictionOutcome {
    /// Presentation style of the outcome.
    pub fn tone(&self) -> Tone {
        match self {
            PredictionOutcome::Predicted { label, .. } => label.tone,
            PredictionOutcome::Failed { .. } => Tone::Error,
        }
    }

    /// Label text, if a prediction was made.
    pub fn label(&self) -> Option<&str> {
        match self {
            PredictionOutcome::Predicted { label, .. } => Some(&label.text),
            PredictionOutcome::Failed { .. } => None,
        }
    }

    fn failed(err: &ServingError) -> Self {
        PredictionOutcome::Failed {
            reason: err.to_string(),
        }
    }
}

/// Predict a single record and resolve its label.
pub fn predict(
    model: &dyn Classifier,
    labels: &LabelMapping,
    record: &FeatureRecord,
) -> PredictionOutcome {
    match model.predict(record) {
        Ok(code) => {
            let label = labels.resolve(code);
            debug!("Model {:?} predicted class {} ({})", model.name(), code, label.text);
            PredictionOutcome::Predicted { code, label }
        }
        Err(e) => {
            warn!("Prediction failed: {}", e);
            PredictionOutcome::failed(&e)
        }
    }
}

/// State of the prediction form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// No submission yet; the form is shown without a result.
    Idle,
    /// The outcome of the latest submission is shown below the form.
    ResultShown(PredictionOutcome),
}

/// The prediction form of one session.
#[derive(Debug, Clone)]
pub struct PredictionForm {
    labels: LabelMapping,
    state: FormState,
    values: FormSubmission,
    submissions: u64,
}

impl PredictionForm {
    /// Create an idle form showing the default field values.
    pub fn new(labels: LabelMapping) -> Self {
        Self {
            labels,
            state: FormState::Idle,
            values: FormSubmission::from_record(&FeatureRecord::default()),
            submissions: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Values currently filled into the form.
    pub fn values(&self) -> &FormSubmission {
        &self.values
    }

    /// Number of submissions handled so far.
    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    /// Outcome of the latest submission, if any.
    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        match &self.state {
            FormState::Idle => None,
            FormState::ResultShown(outcome) => Some(outcome),
        }
    }

    /// Handle a submit: parse the inputs, predict, and show the outcome.
    ///
    /// Input and inference errors become a [`PredictionOutcome::Failed`]; the
    /// form can be submitted again afterwards.
    pub fn submit(&mut self, model: &dyn Classifier, submission: FormSubmission) -> PredictionOutcome {
        self.submissions += 1;
        let outcome = match submission.parse() {
            Ok(record) => predict(model, &self.labels, &record),
            Err(e) => {
                warn!("Rejected form input: {}", e);
                PredictionOutcome::failed(&e)
            }
        };
        info!(
            submission = self.submissions,
            tone = outcome.tone().as_str(),
            label = outcome.label().unwrap_or("-"),
            "Handled prediction form submission"
        );
        self.values = submission;
        self.state = FormState::ResultShown(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServingResult;

    struct Fixed(ServingResult<i64>);

    impl Classifier for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn feature_names(&self) -> &[String] {
            &[]
        }

        fn classes(&self) -> &[i64] {
            &[0, 1]
        }

        fn predict(&self, _record: &FeatureRecord) -> ServingResult<i64> {
            match &self.0 {
                Ok(code) => Ok(*code),
                Err(e) => Err(ServingError::prediction(e.to_string())),
            }
        }
    }

    #[test]
    fn test_predict_maps_codes() {
        let labels = LabelMapping::default();
        let record = FeatureRecord::default();

        let outcome = predict(&Fixed(Ok(1)), &labels, &record);
        assert_eq!(outcome.label(), Some("On-time"));
        assert_eq!(outcome.tone(), Tone::Success);

        let outcome = predict(&Fixed(Ok(0)), &labels, &record);
        assert_eq!(outcome.label(), Some("Late"));
        assert_eq!(outcome.tone(), Tone::Warning);

        let outcome = predict(&Fixed(Ok(2)), &labels, &record);
        assert_eq!(outcome.label(), Some("Unknown"));
        assert_eq!(outcome.tone(), Tone::Warning);
    }

    #[test]
    fn test_predict_error_becomes_failed_outcome() {
        let outcome = predict(
            &Fixed(Err(ServingError::prediction("internal library error"))),
            &LabelMapping::default(),
            &FeatureRecord::default(),
        );
        assert_eq!(outcome.tone(), Tone::Error);
        assert!(matches!(
            outcome,
            PredictionOutcome::Failed { ref reason } if reason.contains("internal library error")
        ));
    }

    #[test]
    fn test_form_starts_idle_with_defaults() {
        let form = PredictionForm::new(LabelMapping::default());
        assert_eq!(form.state(), &FormState::Idle);
        assert!(form.outcome().is_none());
        assert_eq!(form.values().act_score, "25");
        assert_eq!(form.values().parent_education_level, "12");
        assert_eq!(form.submissions(), 0);
    }

    #[test]
    fn test_submit_transitions_to_result_shown() {
        let mut form = PredictionForm::new(LabelMapping::default());
        let values = FormSubmission::from_record(&FeatureRecord::default());

        let outcome = form.submit(&Fixed(Ok(1)), values.clone());
        assert_eq!(outcome.label(), Some("On-time"));
        assert_eq!(form.state(), &FormState::ResultShown(outcome));

        form.submit(&Fixed(Ok(0)), values);
        assert_eq!(form.outcome().and_then(|o| o.label()), Some("Late"));
        assert_eq!(form.submissions(), 2);
    }

    #[test]
    fn test_invalid_input_is_reported_and_kept() {
        let mut form = PredictionForm::new(LabelMapping::default());
        let mut values = FormSubmission::from_record(&FeatureRecord::default());
        values.gpa = "4.5".to_string();

        let outcome = form.submit(&Fixed(Ok(1)), values);
        assert_eq!(outcome.tone(), Tone::Error);
        assert_eq!(form.values().gpa, "4.5");
    }

    #[test]
    fn test_form_recovers_after_failure() {
        let mut form = PredictionForm::new(LabelMapping::default());
        let values = FormSubmission::from_record(&FeatureRecord::default());

        let failing = Fixed(Err(ServingError::prediction("boom")));
        assert_eq!(form.submit(&failing, values.clone()).tone(), Tone::Error);

        let outcome = form.submit(&Fixed(Ok(1)), values);
        assert_eq!(outcome.label(), Some("On-time"));
    }
}
