//! Domain layer: Survey answers, feature assembly and the threshold policy.
//!
//! Everything here is pure: no I/O, no randomness.

pub mod bmi;
pub mod features;
mod prediction;
pub mod survey;

pub use bmi::{compute_bmi, BmiCategory};
pub use features::{assemble, feature_map, FeatureSchema, FeatureVector, SchemaMismatchError};
pub use prediction::{
    format_risk_percentage, Decision, PredictionResult, Recommendation, RiskTier,
    ThresholdPolicy, TierDisplay, DEFAULT_THRESHOLD, HIGH_RISK_CUTOFF,
};
pub use survey::{Sex, SurveyInputs};
