//! Adapters layer: Concrete implementations of ports.
//!
//! - `gbdt`: tree-ensemble evaluator behind `BinaryClassifier`
//! - `artifacts`: loading and integrity checks for the exported model files
//! - `sanitize`: health-data filtering for logs

pub mod artifacts;
pub mod gbdt;
pub mod sanitize;

// Re-export load error for lib.rs
pub use artifacts::ArtifactLoadError;
