//! Graduation CLI Library
//!
//! Command-line interface for the graduation timing predictor:
//!
//! - **Serve**: run the prediction form over HTTP
//! - **Predict**: predict one student from command-line flags
//!
//! # Example
//!
//! ```bash
//! # Serve the form on the default port (8501)
//! graduation serve --model model_graduation.json
//!
//! # One-off prediction; omitted fields take the form defaults
//! graduation predict --act 29 --gpa 3.6 --education 16
//! ```

pub mod commands;

use clap::{Parser, Subcommand};

pub use commands::{PredictCommand, ServeCommand};

/// Graduation timing predictor
///
/// Estimates whether a student will graduate on time or late from academic
/// and family background factors, using a pre-trained classifier.
#[derive(Parser, Debug)]
#[command(name = "graduation")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the prediction form over HTTP
    Serve(ServeCommand),

    /// Predict graduation timing for one student
    Predict(PredictCommand),
}
