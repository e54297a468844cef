//! Model loading functionality for serving.
//!
//! This module provides the [`ModelLoader`], which reads the classifier artifact
//! once per process and hands out the same shared, read-only model on every
//! subsequent call. Where the artifact comes from is abstracted behind
//! [`ArtifactSource`]; the production source is [`FileArtifact`].

use crate::error::{ServingError, ServingResult};
use crate::features::FEATURE_COLUMNS;
use crate::inference::{build_model, inference_device, Classifier, ModelArtifact};
use crate::labels::LabelMapping;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default artifact location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "model_graduation.json";

/// Somewhere a classifier can be read from.
pub trait ArtifactSource: Send + Sync {
    /// Human readable location, used in logs.
    fn describe(&self) -> String;

    /// Read and build the classifier.
    fn load(&self) -> ServingResult<Arc<dyn Classifier>>;
}

/// Classifier artifact stored as a JSON file.
#[derive(Debug, Clone)]
pub struct FileArtifact {
    path: PathBuf,
}

impl FileArtifact {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Artifact path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactSource for FileArtifact {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> ServingResult<Arc<dyn Classifier>> {
        if !self.path.exists() {
            return Err(ServingError::ArtifactMissing(self.path.clone()));
        }

        let bytes = std::fs::read(&self.path)?;
        debug!("Read {} bytes from {:?}", bytes.len(), self.path);

        let artifact = ModelArtifact::from_json_slice(&bytes)
            .map_err(|e| ServingError::artifact_corrupt(&self.path, e.to_string()))?;
        debug!(
            "Parsed artifact {:?} ({} model, {} features, classes {:?})",
            artifact.name,
            artifact.model.kind(),
            artifact.feature_names.len(),
            artifact.classes
        );

        let model = build_model(&artifact, &inference_device())
            .map_err(|e| ServingError::artifact_corrupt(&self.path, e.to_string()))?;
        Ok(Arc::from(model))
    }
}

/// Memoizing model loader.
///
/// The source is read on the first successful [`ModelLoader::get_model`] call;
/// every later call returns the same `Arc`. A failed load is not cached.
///
/// # Example
///
/// ```no_run
/// use graduation_serving::labels::LabelMapping;
/// use graduation_serving::model_loader::ModelLoader;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let loader = ModelLoader::from_path("model_graduation.json", LabelMapping::default());
/// let model = loader.get_model()?;
/// println!("Loaded model {} with classes {:?}", model.name(), model.classes());
/// # Ok(())
/// # }
/// ```
pub struct ModelLoader {
    source: Box<dyn ArtifactSource>,
    labels: LabelMapping,
    model: OnceCell<Arc<dyn Classifier>>,
    load_count: AtomicU64,
}

impl ModelLoader {
    /// Create a loader over an arbitrary source.
    pub fn new(source: Box<dyn ArtifactSource>, labels: LabelMapping) -> Self {
        Self {
            source,
            labels,
            model: OnceCell::new(),
            load_count: AtomicU64::new(0),
        }
    }

    /// Create a loader reading a JSON artifact file.
    pub fn from_path(path: impl Into<PathBuf>, labels: LabelMapping) -> Self {
        Self::new(Box::new(FileArtifact::new(path)), labels)
    }

    /// Get the model, reading the source on first use.
    ///
    /// # Errors
    ///
    /// [`ServingError::ArtifactMissing`] when the artifact does not exist,
    /// [`ServingError::ArtifactCorrupt`] when it cannot be deserialized, and
    /// [`ServingError::ClassEncodingMismatch`] when its classes disagree with
    /// the label mapping.
    pub fn get_model(&self) -> ServingResult<Arc<dyn Classifier>> {
        self.model
            .get_or_try_init(|| {
                info!("Loading model from: {}", self.source.describe());
                self.load_count.fetch_add(1, Ordering::SeqCst);

                let model = self.source.load()?;
                self.labels.verify_classes(model.classes())?;
                if model
                    .feature_names()
                    .iter()
                    .map(String::as_str)
                    .ne(FEATURE_COLUMNS.iter().copied())
                {
                    warn!(
                        "Model feature names {:?} differ from the form schema; predictions will fail",
                        model.feature_names()
                    );
                }

                info!(
                    "Model {:?} loaded successfully from: {}",
                    model.name(),
                    self.source.describe()
                );
                Ok(model)
            })
            .cloned()
    }

    /// Whether a model has been loaded.
    pub fn is_ready(&self) -> bool {
        self.model.get().is_some()
    }

    /// How many times the source has been read.
    pub fn load_count(&self) -> u64 {
        self.load_count.load(Ordering::SeqCst)
    }

    /// Label mapping the loaded model is checked against.
    pub fn labels(&self) -> &LabelMapping {
        &self.labels
    }
}

impl std::fmt::Debug for ModelLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelLoader")
            .field("source", &self.source.describe())
            .field("has_model", &self.is_ready())
            .field("load_count", &self.load_count())
            .finish()
    }
}
