//! Risk assessment service: the one pipeline every form surface calls.
//!
//! survey answers -> validation -> feature row -> classifier ->
//! threshold policy -> tier, decision and recommendation.

use std::sync::Arc;

use crate::adapters::artifacts::ArtifactLoadError;
use crate::domain::{
    Decision, FeatureSchema, FeatureVector, PredictionResult, Recommendation, SchemaMismatchError,
    SurveyInputs, ThresholdPolicy,
};
use crate::ports::{label_of, BinaryClassifier, ClassifierArtifact, ClassifierError};
use crate::DiabscreenError;

/// Score one assembled row with the artifact's classifier.
///
/// The classifier runs once; the label is the argmax of that same output. The tier comes from the
/// probability and `policy` alone.
///
/// # Errors
/// Returns `SchemaMismatch` if the row's columns are not exactly the
/// artifact's feature list, and `Classifier` if scoring fails or yields a
/// probability outside [0, 1].
pub fn classify<C: BinaryClassifier>(
    vector: &FeatureVector,
    artifact: &ClassifierArtifact<C>,
    policy: &ThresholdPolicy,
) -> crate::Result<PredictionResult> {
    if !vector.matches(artifact.schema()) {
        return Err(column_mismatch(vector, artifact.schema()).into());
    }

    let proba = artifact.classifier().predict_proba(vector.values())?;
    let [_, probability] = proba;
    if !(0.0..=1.0).contains(&probability) {
        return Err(ClassifierError::InvalidOutput(format!(
            "positive-class probability {probability} outside [0, 1]"
        ))
        .into());
    }
    let label = label_of(proba);

    Ok(PredictionResult {
        probability,
        label,
        tier: policy.tier(probability),
    })
}

/// First column where `vector` departs from `schema`.
fn column_mismatch(vector: &FeatureVector, schema: &FeatureSchema) -> SchemaMismatchError {
    if vector.len() != schema.len() {
        return SchemaMismatchError::WidthMismatch {
            expected: schema.len(),
            actual: vector.len(),
        };
    }
    let position = schema
        .names()
        .iter()
        .zip(vector.names())
        .position(|(want, got)| want != got);
    match position {
        Some(i) if vector.names().contains(&schema.names()[i]) => {
            SchemaMismatchError::OutOfOrder {
                position: i,
                expected: schema.names()[i].clone(),
                actual: vector.names()[i].clone(),
            }
        }
        Some(i) => SchemaMismatchError::MissingFeature {
            name: schema.names()[i].clone(),
        },
        None => SchemaMismatchError::WidthMismatch {
            expected: schema.len(),
            actual: vector.len(),
        },
    }
}

/// Outcome of one submission. Never persisted.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub result: PredictionResult,
    pub decision: Decision,
    pub recommendation: Recommendation,
    pub threshold: f64,
    pub assessed_at: chrono::DateTime<chrono::Utc>,
}

/// Service for running risk assessments.
///
/// Holds the immutable artifact by `Arc`; clones share it and need no
/// locking.
pub struct RiskAssessmentService<C: BinaryClassifier> {
    artifact: Arc<ClassifierArtifact<C>>,
    policy: ThresholdPolicy,
}

impl<C: BinaryClassifier> Clone for RiskAssessmentService<C> {
    fn clone(&self) -> Self {
        Self {
            artifact: Arc::clone(&self.artifact),
            policy: self.policy,
        }
    }
}

impl<C: BinaryClassifier> RiskAssessmentService<C> {
    /// Create a new assessment service.
    #[must_use]
    pub fn new(artifact: Arc<ClassifierArtifact<C>>, policy: ThresholdPolicy) -> Self {
        Self { artifact, policy }
    }

    #[must_use]
    pub fn artifact(&self) -> &ClassifierArtifact<C> {
        &self.artifact
    }

    #[must_use]
    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    /// Build the model-ready row for `inputs`.
    ///
    /// # Errors
    /// Returns `OutOfDomain` for rejected answers and `SchemaMismatch` if the
    /// feature list asks for a column the assembler does not produce.
    pub fn prepare(&self, inputs: &SurveyInputs) -> crate::Result<FeatureVector> {
        inputs.validate().map_err(DiabscreenError::OutOfDomain)?;
        Ok(self.artifact.schema().assemble(inputs)?)
    }

    /// Run the full assessment pipeline.
    ///
    /// Performs:
    /// 1. Domain validation of the answers
    /// 2. Feature assembly in the model's column order
    /// 3. Classification
    /// 4. Threshold decision and recommendation
    ///
    /// # Errors
    /// Any failure aborts this submission only; no partial result is
    /// returned and the service stays usable.
    pub fn assess(&self, inputs: &SurveyInputs) -> crate::Result<Assessment> {
        let vector = self.prepare(inputs)?;
        let result = classify(&vector, &self.artifact, &self.policy)?;
        let decision = self.policy.decision(result.probability);
        let recommendation =
            Recommendation::for_decision(decision, result.probability, self.policy.threshold());

        tracing::info!(tier = %result.tier, ?decision, "Assessment complete");

        Ok(Assessment {
            result,
            decision,
            recommendation,
            threshold: self.policy.threshold(),
            assessed_at: chrono::Utc::now(),
        })
    }
}

/// Whether the prediction path is available.
///
/// `Unavailable` is terminal: the artifact is loaded once and never retried.
pub enum Readiness<C: BinaryClassifier> {
    Ready(RiskAssessmentService<C>),
    Unavailable(ArtifactLoadError),
}

impl<C: BinaryClassifier> Readiness<C> {
    /// Build from the result of loading the artifact at start-up.
    #[must_use]
    pub fn from_load(
        loaded: Result<ClassifierArtifact<C>, ArtifactLoadError>,
        policy: ThresholdPolicy,
    ) -> Self {
        match loaded {
            Ok(artifact) => Self::Ready(RiskAssessmentService::new(Arc::new(artifact), policy)),
            Err(e) => {
                tracing::error!("Model unavailable: {}", e);
                Self::Unavailable(e)
            }
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The service, if the model loaded.
    ///
    /// # Errors
    /// Returns `ModelUnavailable` carrying the load diagnostic.
    pub fn service(&self) -> crate::Result<&RiskAssessmentService<C>> {
        match self {
            Self::Ready(service) => Ok(service),
            Self::Unavailable(e) => Err(DiabscreenError::ModelUnavailable(e.to_string())),
        }
    }

    /// Assess through the service, or fail with `ModelUnavailable`.
    ///
    /// # Errors
    /// See [`RiskAssessmentService::assess`].
    pub fn assess(&self, inputs: &SurveyInputs) -> crate::Result<Assessment> {
        self.service()?.assess(inputs)
    }

    /// Consume into the service or the load error.
    ///
    /// # Errors
    /// Returns the original `ArtifactLoadError` when unavailable.
    pub fn into_service(self) -> Result<RiskAssessmentService<C>, ArtifactLoadError> {
        match self {
            Self::Ready(service) => Ok(service),
            Self::Unavailable(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::{load_artifacts, LoadOptions};
    use crate::domain::features::{ASSEMBLED_FEATURES, AGE_GENHLTH, RISK_FACTOR};
    use crate::domain::{RiskTier, Sex};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed probability and counts calls.
    struct StubClassifier {
        probability: f64,
        width: usize,
        calls: AtomicUsize,
    }

    impl StubClassifier {
        fn new(probability: f64) -> Self {
            Self {
                probability,
                width: ASSEMBLED_FEATURES.len(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl BinaryClassifier for StubClassifier {
        fn n_features(&self) -> usize {
            self.width
        }

        fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ClassifierError> {
            if row.len() != self.width {
                return Err(ClassifierError::FeatureCount {
                    expected: self.width,
                    actual: row.len(),
                });
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok([1.0 - self.probability, self.probability])
        }
    }

    fn full_schema() -> FeatureSchema {
        FeatureSchema::new(ASSEMBLED_FEATURES.iter().map(|s| s.to_string()).collect())
            .expect("schema")
    }

    fn stub_service(probability: f64) -> RiskAssessmentService<StubClassifier> {
        let artifact = ClassifierArtifact::new(StubClassifier::new(probability), full_schema())
            .expect("artifact");
        RiskAssessmentService::new(Arc::new(artifact), ThresholdPolicy::default())
    }

    fn worked_example() -> SurveyInputs {
        SurveyInputs {
            high_bp: true,
            high_chol: false,
            bmi: 32.5,
            smoker: false,
            phys_activity: true,
            gen_hlth: 4,
            ment_hlth: 5,
            phys_hlth: 3,
            diff_walk: false,
            sex: Sex::Male,
            age: 9,
            education: 4,
            income: 5,
        }
    }

    fn bundled_models() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("models")
    }

    #[test]
    fn test_worked_example_end_to_end() {
        let service = stub_service(0.62);
        let vector = service.prepare(&worked_example()).expect("prepare");
        assert_eq!(vector.get(RISK_FACTOR), Some(32.5));
        assert_eq!(vector.get(AGE_GENHLTH), Some(36.0));

        let assessment = service.assess(&worked_example()).expect("assess");
        assert_eq!(assessment.result.tier, RiskTier::High);
        assert_eq!(assessment.result.label, 1);
        assert_eq!(assessment.decision, Decision::RiskDetected);
        assert!(assessment.recommendation.headline.contains("risk detected"));
        assert!((assessment.threshold - 0.30).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tier_and_label_are_independent() {
        // Below the classifier's 0.5 boundary but above the decision threshold.
        let assessment = stub_service(0.35).assess(&worked_example()).expect("assess");
        assert_eq!(assessment.result.label, 0);
        assert_eq!(assessment.result.tier, RiskTier::Medium);
        assert_eq!(assessment.decision, Decision::RiskDetected);

        // Exactly at the threshold: Medium tier, but no risk message.
        let assessment = stub_service(0.30).assess(&worked_example()).expect("assess");
        assert_eq!(assessment.result.tier, RiskTier::Medium);
        assert_eq!(assessment.decision, Decision::LowRisk);
    }

    #[test]
    fn test_deterministic() {
        let service = stub_service(0.42);
        let a = service.prepare(&worked_example()).expect("prepare");
        let b = service.prepare(&worked_example()).expect("prepare");
        assert_eq!(a, b);

        let x = service.assess(&worked_example()).expect("assess");
        let y = service.assess(&worked_example()).expect("assess");
        assert_eq!(x.result, y.result);
        assert_eq!(x.recommendation, y.recommendation);
    }

    #[test]
    fn test_out_of_domain_never_reaches_classifier() {
        let service = stub_service(0.9);
        let bad = SurveyInputs {
            bmi: 80.0,
            ..worked_example()
        };
        let err = service.assess(&bad).expect_err("must reject");
        assert!(matches!(err, DiabscreenError::OutOfDomain(_)));
        assert_eq!(service.artifact().classifier().calls.load(Ordering::SeqCst), 0);

        // The clamped copy goes through.
        assert!(service.assess(&bad.clamped()).is_ok());
        assert_eq!(service.artifact().classifier().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_one_inference_call_per_assessment() {
        let service = stub_service(0.62);
        let assessment = service.assess(&worked_example()).expect("assess");
        assert_eq!(service.artifact().classifier().calls.load(Ordering::SeqCst), 1);
        assert_eq!(assessment.result.label, 1);
        assert!((assessment.result.probability - 0.62).abs() < f64::EPSILON);
    }

    #[test]
    fn test_classify_rejects_foreign_vector() {
        let service = stub_service(0.5);
        let subset = FeatureSchema::new(vec!["BMI".into()]).expect("schema");
        let vector = subset.assemble(&worked_example()).expect("assemble");
        let err = classify(&vector, service.artifact(), service.policy()).expect_err("must fail");
        assert!(matches!(err, DiabscreenError::SchemaMismatch(_)));

        let mut reordered: Vec<String> = ASSEMBLED_FEATURES.iter().map(|s| s.to_string()).collect();
        reordered.swap(0, 1);
        let vector = crate::domain::assemble(&worked_example(), &reordered).expect("assemble");
        let err = classify(&vector, service.artifact(), service.policy()).expect_err("must fail");
        assert!(matches!(
            err,
            DiabscreenError::SchemaMismatch(SchemaMismatchError::OutOfOrder {
                position: 0,
                ref expected,
                ref actual,
            }) if expected == "HighBP" && actual == "HighChol"
        ));

        let mut without_bp = reordered;
        without_bp[1] = "BMI".to_string();
        let vector = crate::domain::assemble(&worked_example(), &without_bp).expect("assemble");
        let err = classify(&vector, service.artifact(), service.policy()).expect_err("must fail");
        assert!(matches!(
            err,
            DiabscreenError::SchemaMismatch(SchemaMismatchError::MissingFeature { ref name })
                if name == "HighBP"
        ));
    }

    #[test]
    fn test_invalid_probability_is_an_error() {
        for p in [f64::NAN, 1.5, -0.1] {
            let err = stub_service(p).assess(&worked_example()).expect_err("must fail");
            assert!(matches!(
                err,
                DiabscreenError::Classifier(ClassifierError::InvalidOutput(_))
            ));
        }
    }

    #[test]
    fn test_failed_request_does_not_poison_service() {
        let service = stub_service(0.2);
        let bad = SurveyInputs {
            age: 20,
            ..worked_example()
        };
        assert!(service.assess(&bad).is_err());
        let ok = service.assess(&worked_example()).expect("next request");
        assert_eq!(ok.result.tier, RiskTier::Low);
        assert_eq!(ok.decision, Decision::LowRisk);
    }

    #[test]
    fn test_unavailable_blocks_prediction() {
        let temp = tempfile::tempdir().expect("tempdir");
        let readiness = Readiness::from_load(
            load_artifacts(temp.path(), LoadOptions::default()),
            ThresholdPolicy::default(),
        );
        assert!(!readiness.is_ready());
        let err = readiness.assess(&worked_example()).expect_err("must fail");
        assert!(matches!(err, DiabscreenError::ModelUnavailable(_)));
        let load_err = readiness.into_service().err().expect("load error");
        assert!(load_err.is_not_found());
    }

    #[test]
    fn test_bundled_model_scores_worked_example() {
        let readiness = Readiness::from_load(
            load_artifacts(&bundled_models(), LoadOptions::default()),
            ThresholdPolicy::default(),
        );
        let service = readiness.service().expect("bundled model loads");

        let risky = service.assess(&worked_example()).expect("assess");
        // 0.8 + 0.2 + 0.15 + 0.35 = 1.5 -> sigmoid
        assert!((risky.result.probability - 0.817_574).abs() < 1e-4);
        assert_eq!(risky.result.tier, RiskTier::High);
        assert_eq!(risky.decision, Decision::RiskDetected);

        let healthy = SurveyInputs {
            gen_hlth: 1,
            bmi: 22.0,
            age: 3,
            ..SurveyInputs::default()
        };
        let low = service.assess(&healthy).expect("assess");
        assert_eq!(low.result.tier, RiskTier::Low);
        assert_eq!(low.decision, Decision::LowRisk);
        assert_eq!(low.result.label, 0);
    }

    #[test]
    fn test_shared_across_threads() {
        let service = stub_service(0.7);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                std::thread::spawn(move || service.assess(&worked_example()).map(|a| a.result))
            })
            .collect();
        for handle in handles {
            let result = handle.join().expect("thread").expect("assess");
            assert_eq!(result.tier, RiskTier::High);
        }
    }
}
