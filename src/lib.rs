//! # Diabscreen
//!
//! Offline diabetes risk screening from a short health survey.
//!
//! This crate provides:
//! - Feature assembly from survey answers into the model's column order
//! - A gradient-boosted tree ensemble evaluator for the exported model
//! - A threshold policy turning probabilities into tiers and recommendations
//! - Terminal UI for local-only use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (survey answers, feature rows, risk tiers)
//! - `ports`: The `BinaryClassifier` boundary
//! - `adapters`: Concrete implementations (tree ensemble, artifact loading, log sanitizing)
//! - `application`: The risk assessment use case
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{PredictionResult, RiskTier, SurveyInputs};

/// Result type for Diabscreen operations
pub type Result<T> = std::result::Result<T, DiabscreenError>;

/// Main error type for Diabscreen
#[derive(Debug, thiserror::Error)]
pub enum DiabscreenError {
    #[error("Model artifacts could not be loaded: {0}")]
    ArtifactLoad(#[from] adapters::ArtifactLoadError),

    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(#[from] domain::SchemaMismatchError),

    #[error("Invalid survey answers: {}", .0.join("; "))]
    OutOfDomain(Vec<String>),

    #[error("Classifier failed: {0}")]
    Classifier(#[from] ports::ClassifierError),

    #[error("Model not available: {0}")]
    ModelUnavailable(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
