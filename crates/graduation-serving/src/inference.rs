//! Candle-backed classifiers for the graduation predictor.
//!
//! A model artifact is a JSON document produced by the training pipeline. It
//! records the feature schema the model was trained on, the class codes it can
//! emit and the fitted parameters of one supported model family:
//!
//! ```json
//! {
//!   "name": "model_graduation",
//!   "feature_names": ["ACT composite score", "SAT total score", "high school gpa",
//!                     "parental income", "parent_edu_numerical"],
//!   "classes": [0, 1],
//!   "model": {"type": "gaussian_nb", "class_prior": [..], "theta": [[..]], "var": [[..]]}
//! }
//! ```
//!
//! Parameters are moved into `f64` Candle tensors once when the model is built;
//! prediction on a single [`FeatureRecord`] never mutates the model, so a built
//! classifier is shared freely between request handlers.

use crate::error::{ServingError, ServingResult};
use crate::features::{FeatureRecord, NUM_FEATURES};
use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

/// Serialized model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Model name, informational only
    #[serde(default)]
    pub name: String,
    /// Feature columns the model was trained on, in order
    pub feature_names: Vec<String>,
    /// Class codes the model can emit, indexed like the fitted parameters
    pub classes: Vec<i64>,
    /// Fitted parameters
    pub model: ModelSpec,
}

impl ModelArtifact {
    /// Parse an artifact from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Supported model families.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Gaussian naive Bayes.
    GaussianNb(GaussianNbSpec),
    /// Linear logistic regression.
    LogisticRegression(LogisticSpec),
}

impl ModelSpec {
    /// Family name as written in artifacts.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::GaussianNb(_) => "gaussian_nb",
            ModelSpec::LogisticRegression(_) => "logistic_regression",
        }
    }
}

/// Gaussian naive Bayes parameters, one row per class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNbSpec {
    /// Prior probability of each class
    pub class_prior: Vec<f64>,
    /// Per-class feature means `[n_classes][n_features]`
    pub theta: Vec<Vec<f64>>,
    /// Per-class feature variances `[n_classes][n_features]`, smoothing already applied
    pub var: Vec<Vec<f64>>,
}

/// Logistic regression parameters.
///
/// Binary models carry a single coefficient row scoring `classes[1]`;
/// multiclass models carry one row per class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticSpec {
    /// Coefficients `[n_rows][n_features]`
    pub coef: Vec<Vec<f64>>,
    /// Intercept per row
    pub intercept: Vec<f64>,
}

/// A loaded classifier.
pub trait Classifier: Send + Sync {
    /// Model name.
    fn name(&self) -> &str;

    /// Feature columns the model expects, in order.
    fn feature_names(&self) -> &[String];

    /// Class codes the model can emit.
    fn classes(&self) -> &[i64];

    /// Predict the class code of a single record.
    fn predict(&self, record: &FeatureRecord) -> ServingResult<i64>;
}

/// Device used for inference. Parameters are `f64`, which only the CPU backend covers.
pub fn inference_device() -> Device {
    Device::Cpu
}

/// Build a classifier from a parsed artifact.
pub fn build_model(artifact: &ModelArtifact, device: &Device) -> ServingResult<Box<dyn Classifier>> {
    let schema = Schema::from_artifact(artifact)?;
    match &artifact.model {
        ModelSpec::GaussianNb(spec) => Ok(Box::new(GaussianNbModel::from_spec(
            schema, spec, device,
        )?)),
        ModelSpec::LogisticRegression(spec) => Ok(Box::new(LogisticModel::from_spec(
            schema, spec, device,
        )?)),
    }
}

#[derive(Debug)]
struct Schema {
    name: String,
    feature_names: Vec<String>,
    classes: Vec<i64>,
}

impl Schema {
    fn from_artifact(artifact: &ModelArtifact) -> ServingResult<Self> {
        if artifact.feature_names.is_empty() {
            return Err(ServingError::invalid_artifact("feature_names is empty"));
        }
        if artifact.classes.len() < 2 {
            return Err(ServingError::invalid_artifact(format!(
                "expected at least 2 classes, got {}",
                artifact.classes.len()
            )));
        }
        Ok(Self {
            name: artifact.name.clone(),
            feature_names: artifact.feature_names.clone(),
            classes: artifact.classes.clone(),
        })
    }

    fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Reject records whose columns differ from the training schema.
    fn check(&self) -> ServingResult<()> {
        let columns = FeatureRecord::columns();
        if self.feature_names.len() != columns.len()
            || self
                .feature_names
                .iter()
                .zip(columns.iter())
                .any(|(expected, given)| expected != given)
        {
            return Err(ServingError::prediction(format!(
                "feature names mismatch: model expects {:?}, record provides {:?}",
                self.feature_names, columns
            )));
        }
        Ok(())
    }

    fn class_at(&self, idx: usize) -> ServingResult<i64> {
        self.classes.get(idx).copied().ok_or_else(|| {
            ServingError::prediction(format!(
                "class index {} out of range for {} classes",
                idx,
                self.classes.len()
            ))
        })
    }
}

fn matrix(
    rows: &[Vec<f64>],
    name: &str,
    shape: (usize, usize),
    device: &Device,
) -> ServingResult<Tensor> {
    if rows.len() != shape.0 {
        return Err(ServingError::invalid_artifact(format!(
            "{} has {} rows, expected {}",
            name,
            rows.len(),
            shape.0
        )));
    }
    let mut data = Vec::with_capacity(shape.0 * shape.1);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != shape.1 {
            return Err(ServingError::invalid_artifact(format!(
                "{}[{}] has {} values, expected {}",
                name,
                i,
                row.len(),
                shape.1
            )));
        }
        if let Some(v) = row.iter().find(|v| !v.is_finite()) {
            return Err(ServingError::invalid_artifact(format!(
                "{}[{}] contains non-finite value {}",
                name, i, v
            )));
        }
        data.extend_from_slice(row);
    }
    Tensor::from_slice(data.as_slice(), shape, device)
        .map_err(|e| ServingError::invalid_artifact(format!("tensor init for {name} failed: {e}")))
}

fn vector(values: &[f64], name: &str, len: usize, device: &Device) -> ServingResult<Tensor> {
    if values.len() != len {
        return Err(ServingError::invalid_artifact(format!(
            "{} has {} values, expected {}",
            name,
            values.len(),
            len
        )));
    }
    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
        return Err(ServingError::invalid_artifact(format!(
            "{} contains non-finite value {}",
            name, v
        )));
    }
    Tensor::from_slice(values, len, device)
        .map_err(|e| ServingError::invalid_artifact(format!("tensor init for {name} failed: {e}")))
}

fn record_tensor(record: &FeatureRecord, device: &Device) -> ServingResult<Tensor> {
    let row = record.to_row();
    Ok(Tensor::from_slice(row.as_slice(), (1, NUM_FEATURES), device)?)
}

#[derive(Debug)]
struct GaussianNbModel {
    schema: Schema,
    // [C, F]
    theta: Tensor,
    var: Tensor,
    // log(prior_c) - 0.5 * sum_f log(2 pi var_cf), [C]
    log_base: Tensor,
    device: Device,
}

impl GaussianNbModel {
    fn from_spec(schema: Schema, spec: &GaussianNbSpec, device: &Device) -> ServingResult<Self> {
        let shape = (schema.num_classes(), schema.num_features());
        let prior = vector(&spec.class_prior, "class_prior", shape.0, device)?;
        let theta = matrix(&spec.theta, "theta", shape, device)?;
        let var = matrix(&spec.var, "var", shape, device)?;

        if spec.class_prior.iter().any(|p| *p <= 0.0) {
            return Err(ServingError::invalid_artifact(
                "class_prior must be strictly positive",
            ));
        }
        if spec.var.iter().flatten().any(|v| *v <= 0.0) {
            return Err(ServingError::invalid_artifact(
                "var must be strictly positive",
            ));
        }

        let build = || -> candle_core::Result<Tensor> {
            let log_norm = var
                .affine(2.0 * std::f64::consts::PI, 0.0)?
                .log()?
                .sum(1)?;
            prior.log()?.sub(&log_norm.affine(0.5, 0.0)?)
        };
        let log_base = build()
            .map_err(|e| ServingError::invalid_artifact(format!("naive Bayes setup failed: {e}")))?;

        Ok(Self {
            schema,
            theta,
            var,
            log_base,
            device: device.clone(),
        })
    }

    fn joint_log_likelihood(&self, x: &Tensor) -> ServingResult<Tensor> {
        let sq = self.theta.broadcast_sub(x)?.sqr()?.div(&self.var)?;
        Ok(self.log_base.sub(&sq.sum(1)?.affine(0.5, 0.0)?)?)
    }
}

impl Classifier for GaussianNbModel {
    fn name(&self) -> &str {
        &self.schema.name
    }

    fn feature_names(&self) -> &[String] {
        &self.schema.feature_names
    }

    fn classes(&self) -> &[i64] {
        &self.schema.classes
    }

    fn predict(&self, record: &FeatureRecord) -> ServingResult<i64> {
        self.schema.check()?;
        let x = record_tensor(record, &self.device)?;
        let jll = self.joint_log_likelihood(&x)?;
        let idx = jll.argmax(0)?.to_scalar::<u32>()?;
        self.schema.class_at(idx as usize)
    }
}

#[derive(Debug)]
struct LogisticModel {
    schema: Schema,
    // [F, R]
    coef_t: Tensor,
    // [R]
    intercept: Tensor,
    device: Device,
}

impl LogisticModel {
    fn from_spec(schema: Schema, spec: &LogisticSpec, device: &Device) -> ServingResult<Self> {
        let rows = if schema.num_classes() == 2 {
            1
        } else {
            schema.num_classes()
        };
        let coef = matrix(&spec.coef, "coef", (rows, schema.num_features()), device)?;
        let intercept = vector(&spec.intercept, "intercept", rows, device)?;
        let coef_t = coef
            .t()
            .and_then(|t| t.contiguous())
            .map_err(|e| ServingError::invalid_artifact(format!("transpose failed: {e}")))?;

        Ok(Self {
            schema,
            coef_t,
            intercept,
            device: device.clone(),
        })
    }

    fn decision_function(&self, x: &Tensor) -> ServingResult<Tensor> {
        Ok(x
            .matmul(&self.coef_t)?
            .broadcast_add(&self.intercept)?
            .squeeze(0)?)
    }
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        &self.schema.name
    }

    fn feature_names(&self) -> &[String] {
        &self.schema.feature_names
    }

    fn classes(&self) -> &[i64] {
        &self.schema.classes
    }

    fn predict(&self, record: &FeatureRecord) -> ServingResult<i64> {
        self.schema.check()?;
        let x = record_tensor(record, &self.device)?;
        let scores = self.decision_function(&x)?;
        let idx = if self.schema.num_classes() == 2 {
            let score = scores.to_vec1::<f64>()?[0];
            usize::from(score > 0.0)
        } else {
            scores.argmax(0)?.to_scalar::<u32>()? as usize
        };
        self.schema.class_at(idx)
    }
}
