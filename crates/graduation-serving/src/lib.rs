//! Serving layer for the graduation timing predictor.
//!
//! A pre-trained binary classifier estimates whether a student will graduate
//! on time or late from five academic and family background factors. This
//! crate loads the classifier artifact, runs inference on Candle tensors and
//! serves a small HTML form over HTTP.
//!
//! # Overview
//!
//! - **ModelLoader**: reads the artifact once and shares the model
//! - **Classifier**: Gaussian naive Bayes and logistic regression backends
//! - **PredictionForm**: the form's state machine (idle, then result shown)
//! - **Server**: axum server rendering the form and a health endpoint
//!
//! # Architecture
//!
//! ```text
//!   browser ──POST /──▶ router ──▶ PredictionForm::submit
//!                                     │  FormSubmission::parse
//!                                     ▼
//!                              Arc<dyn Classifier> ◀── ModelLoader (once)
//!                                     │
//!                                     ▼
//!                      LabelMapping::resolve ──▶ render_page
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use graduation_serving::{Server, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::builder()
//!     .port(8501)
//!     .model_path("model_graduation.json")
//!     .build();
//!
//! Server::new(config)?.serve().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # One-off predictions
//!
//! ```no_run
//! use graduation_serving::{predict, FeatureRecord, LabelMapping, ModelLoader};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = ModelLoader::from_path("model_graduation.json", LabelMapping::default());
//! let model = loader.get_model()?;
//!
//! let record = FeatureRecord {
//!     act_score: 29.0,
//!     sat_score: 1350.0,
//!     gpa: 3.6,
//!     parental_income: 7_500_000.0,
//!     parent_education_level: 16,
//! };
//! let outcome = predict(model.as_ref(), loader.labels(), &record);
//! println!("{:?}", outcome.label());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`ServingResult<T>`] which wraps [`ServingError`]:
//!
//! ```
//! use graduation_serving::error::{ServingError, ServingResult};
//!
//! fn handle_error(result: ServingResult<()>) {
//!     match result {
//!         Ok(_) => println!("Success"),
//!         Err(ServingError::ArtifactMissing(path)) => println!("No model at {:?}", path),
//!         Err(e) if e.is_fatal() => println!("Cannot start: {}", e),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod features;
pub mod form;
pub mod inference;
pub mod labels;
pub mod model_loader;
pub mod render;
pub mod server;

// Re-export main types at crate root for convenience
pub use config::{ConfigError, ServerConfig, ServerConfigBuilder};
pub use error::{ServingError, ServingResult};
pub use features::{FeatureRecord, FieldSpec, FormSubmission, FEATURE_COLUMNS};
pub use form::{predict, FormState, PredictionForm, PredictionOutcome};
pub use inference::{build_model, Classifier, ModelArtifact, ModelSpec};
pub use labels::{LabelEntry, LabelMapping, ResolvedLabel, Tone};
pub use model_loader::{ArtifactSource, FileArtifact, ModelLoader, DEFAULT_MODEL_PATH};
pub use render::{render_line, render_page};
pub use server::{router, AppState, HealthStatus, Server};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
