//! HTTP server hosting the prediction form.
//!
//! The router serves three routes:
//!
//! - `GET /` renders an idle form with the default values
//! - `POST /` submits the form and renders the outcome below it
//! - `GET /health` reports loader and submission counters as JSON
//!
//! Submitted values live only as long as the request that carries them.

use crate::config::ServerConfig;
use crate::error::{ServingError, ServingResult};
use crate::features::FormSubmission;
use crate::form::PredictionForm;
use crate::inference::Classifier;
use crate::model_loader::ModelLoader;
use crate::render::render_page;
use axum::{
    extract::{Form, State},
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Health status of the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Whether the model is loaded and serving
    pub healthy: bool,

    /// Name recorded in the model artifact
    pub model_name: String,

    /// How many times the artifact has been read
    pub load_count: u64,

    /// Form submissions handled so far
    pub submissions: u64,
}

/// Shared state of the HTTP handlers.
///
/// Only the model and counters are shared. Every request renders its own
/// [`PredictionForm`], so submitted values never outlive the response.
#[derive(Clone)]
pub struct AppState {
    model: Arc<dyn Classifier>,
    loader: Arc<ModelLoader>,
    submissions: Arc<AtomicU64>,
}

impl AppState {
    /// Build the state, loading the model if it is not loaded yet.
    pub fn new(loader: Arc<ModelLoader>) -> ServingResult<Self> {
        let model = loader.get_model()?;
        Ok(Self {
            model,
            loader,
            submissions: Arc::new(AtomicU64::new(0)),
        })
    }

    /// The shared model.
    pub fn model(&self) -> &Arc<dyn Classifier> {
        &self.model
    }

    /// A fresh, idle form.
    pub fn new_form(&self) -> PredictionForm {
        PredictionForm::new(self.loader.labels().clone())
    }

    /// Current health snapshot.
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: self.loader.is_ready(),
            model_name: self.model.name().to_string(),
            load_count: self.loader.load_count(),
            submissions: self.submissions.load(Ordering::SeqCst),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("model", &self.model.name())
            .field("loader", &self.loader)
            .field("submissions", &self.submissions.load(Ordering::SeqCst))
            .finish()
    }
}

/// Create the router for the form server.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .route("/health", get(health))
        .with_state(state)
}

async fn show_form(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.new_form()))
}

async fn submit_form(
    State(state): State<AppState>,
    Form(submission): Form<FormSubmission>,
) -> Html<String> {
    let mut form = state.new_form();
    let outcome = form.submit(state.model.as_ref(), submission);
    let total = state.submissions.fetch_add(1, Ordering::SeqCst) + 1;
    debug!("Submission {} rendered outcome {:?}", total, outcome);
    Html(render_page(&form))
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.health())
}

/// The prediction form server.
///
/// # Example
///
/// ```no_run
/// use graduation_serving::config::ServerConfig;
/// use graduation_serving::server::Server;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServerConfig::builder()
///     .host("0.0.0.0")
///     .port(8080)
///     .model_path("/srv/models/model_graduation.json")
///     .build();
///
/// Server::new(config)?.serve().await?;
/// # Ok(())
/// # }
/// ```
pub struct Server {
    config: ServerConfig,
    loader: Arc<ModelLoader>,
}

impl Server {
    /// Create a server reading the model from `config.model_path`.
    pub fn new(config: ServerConfig) -> ServingResult<Self> {
        let loader = ModelLoader::from_path(config.model_path.clone(), config.labels.clone());
        Self::with_loader(config, loader)
    }

    /// Create a server over an existing loader.
    pub fn with_loader(config: ServerConfig, loader: ModelLoader) -> ServingResult<Self> {
        config
            .validate()
            .map_err(|e| ServingError::config(e.to_string()))?;
        Ok(Self {
            config,
            loader: Arc::new(loader),
        })
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The model loader.
    pub fn model_loader(&self) -> &Arc<ModelLoader> {
        &self.loader
    }

    /// Load the model and build the handler state.
    pub fn state(&self) -> ServingResult<AppState> {
        AppState::new(Arc::clone(&self.loader)).map_err(|e| {
            error!("Failed to load model: {}", e);
            e
        })
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServingResult<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves.
    ///
    /// The model is loaded before the listener is bound; a load failure ends
    /// startup with the loader's error.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServingResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Starting graduation prediction server...");
        let state = self.state()?;

        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            error!("Failed to bind listener to {}: {}", addr, e);
            ServingError::server(format!("Failed to bind {addr}: {e}"))
        })?;
        info!(
            "Serving model {:?} on http://{}",
            state.model().name(),
            addr
        );

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServingError::server(format!("HTTP server error: {e}")))?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
