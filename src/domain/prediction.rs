//! Prediction results and the threshold policy that turns a probability
//! into a risk tier and a recommendation.

use serde::{Deserialize, Serialize};

/// Default decision threshold.
///
/// Lower than the classifier's own 0.5 boundary to cut missed detections
/// at the cost of more false alarms.
pub const DEFAULT_THRESHOLD: f64 = 0.30;

/// Probability at or above which the tier is `High`.
pub const HIGH_RISK_CUTOFF: f64 = 0.60;

/// Discrete risk bucket for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk",
            Self::Medium => "Medium risk",
            Self::High => "High risk",
        }
    }

    /// Label under a presentation variant.
    ///
    /// The binary variant folds Medium and High together. The Medium cutoff
    /// is inclusive, so a score exactly on it lands in this bucket even
    /// though the strict decision there is still low risk.
    #[must_use]
    pub fn display_label(&self, display: TierDisplay) -> &'static str {
        match (display, self) {
            (_, Self::Low) => "LOW RISK",
            (TierDisplay::ThreeTier, Self::Medium) => "MEDIUM RISK",
            (TierDisplay::ThreeTier, Self::High) => "HIGH RISK",
            (TierDisplay::Binary, _) => "AT/ABOVE THRESHOLD",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// How tiers are presented. Cosmetic only; never affects the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TierDisplay {
    #[default]
    ThreeTier,
    Binary,
}

impl std::str::FromStr for TierDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "three-tier" | "three_tier" | "3" => Ok(Self::ThreeTier),
            "binary" | "2" => Ok(Self::Binary),
            other => Err(format!("unknown tier display '{other}'")),
        }
    }
}

/// Two-way outcome that drives the recommendation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    RiskDetected,
    LowRisk,
}

/// Threshold policy: tiering plus the strict above-threshold decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    threshold: f64,
    high_cutoff: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            high_cutoff: HIGH_RISK_CUTOFF,
        }
    }
}

impl ThresholdPolicy {
    /// Policy with a custom decision threshold.
    ///
    /// # Errors
    /// The threshold must lie strictly between 0 and the high-risk cutoff.
    pub fn new(threshold: f64) -> Result<Self, String> {
        if !threshold.is_finite() || threshold <= 0.0 || threshold >= HIGH_RISK_CUTOFF {
            return Err(format!(
                "threshold {threshold} must be in (0, {HIGH_RISK_CUTOFF})"
            ));
        }
        Ok(Self {
            threshold,
            high_cutoff: HIGH_RISK_CUTOFF,
        })
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn tier(&self, probability: f64) -> RiskTier {
        if probability < self.threshold {
            RiskTier::Low
        } else if probability < self.high_cutoff {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    /// Strict comparison: a probability equal to the threshold is `LowRisk`.
    #[must_use]
    pub fn decision(&self, probability: f64) -> Decision {
        if probability > self.threshold {
            Decision::RiskDetected
        } else {
            Decision::LowRisk
        }
    }
}

/// Output of one classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Positive-class probability (0.0 to 1.0)
    pub probability: f64,

    /// Classifier's own hard label (0 = no diabetes, 1 = diabetes)
    pub label: u8,

    /// Display tier from the threshold policy
    pub tier: RiskTier,
}

/// Risk score as shown to the user: `%62.00`.
#[must_use]
pub fn format_risk_percentage(probability: f64) -> String {
    format!("%{:.2}", probability * 100.0)
}

/// Recommendation block shown under the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub headline: &'static str,
    pub score_line: String,
    pub threshold_line: String,
    pub advice: &'static [&'static str],
    pub note: Option<&'static str>,
}

const RISK_ADVICE: &[&str] = &[
    "Visit a healthcare provider as soon as possible",
    "Get a fasting blood glucose test",
    "Consult an endocrinologist",
];

const LOW_RISK_ADVICE: &[&str] = &[
    "Keep up a balanced diet",
    "Exercise regularly",
    "Do not skip your yearly check-ups",
];

impl Recommendation {
    #[must_use]
    pub fn for_decision(decision: Decision, probability: f64, threshold: f64) -> Self {
        let score_line = format!("Risk score: %{:.1}", probability * 100.0);
        let threshold_line = format!("Risk threshold: %{:.1}", threshold * 100.0);

        match decision {
            Decision::RiskDetected => Self {
                headline: "ATTENTION: Diabetes risk detected",
                score_line,
                threshold_line,
                advice: RISK_ADVICE,
                note: Some("This analysis is a risk estimate, not a medical diagnosis."),
            },
            Decision::LowRisk => Self {
                headline: "Result: Diabetes risk is low",
                score_line,
                threshold_line,
                advice: LOW_RISK_ADVICE,
                note: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_is_step_function() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.tier(0.0), RiskTier::Low);
        assert_eq!(policy.tier(0.29999), RiskTier::Low);
        assert_eq!(policy.tier(0.30000), RiskTier::Medium);
        assert_eq!(policy.tier(0.59999), RiskTier::Medium);
        assert_eq!(policy.tier(0.6), RiskTier::High);
        assert_eq!(policy.tier(1.0), RiskTier::High);

        let mut last = RiskTier::Low;
        for i in 0..=1000 {
            let tier = policy.tier(f64::from(i) / 1000.0);
            assert!(tier >= last);
            last = tier;
        }
    }

    #[test]
    fn test_decision_is_strict() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.decision(0.30), Decision::LowRisk);
        assert_eq!(policy.decision(0.3000001), Decision::RiskDetected);
        assert_eq!(policy.decision(0.62), Decision::RiskDetected);
        assert_eq!(policy.decision(0.1), Decision::LowRisk);
    }

    #[test]
    fn test_custom_threshold_bounds() {
        assert!(ThresholdPolicy::new(0.25).is_ok());
        assert!(ThresholdPolicy::new(0.0).is_err());
        assert!(ThresholdPolicy::new(0.6).is_err());
        assert!(ThresholdPolicy::new(f64::NAN).is_err());

        let policy = ThresholdPolicy::new(0.2).expect("valid");
        assert_eq!(policy.tier(0.25), RiskTier::Medium);
        assert_eq!(policy.decision(0.25), Decision::RiskDetected);
    }

    #[test]
    fn test_percentage_format() {
        assert_eq!(format_risk_percentage(0.62), "%62.00");
        assert_eq!(format_risk_percentage(0.12345), "%12.35");
        assert_eq!(format_risk_percentage(1.0), "%100.00");
    }

    #[test]
    fn test_display_variants() {
        assert_eq!(RiskTier::Medium.display_label(TierDisplay::ThreeTier), "MEDIUM RISK");
        assert_eq!(RiskTier::Medium.display_label(TierDisplay::Binary), "AT/ABOVE THRESHOLD");
        assert_eq!(RiskTier::High.display_label(TierDisplay::Binary), "AT/ABOVE THRESHOLD");
        assert_eq!(RiskTier::Low.display_label(TierDisplay::Binary), "LOW RISK");

        let policy = ThresholdPolicy::default();
        assert_eq!(policy.tier(0.30).display_label(TierDisplay::Binary), "AT/ABOVE THRESHOLD");
        assert_eq!(policy.decision(0.30), Decision::LowRisk);
        assert_eq!("binary".parse::<TierDisplay>(), Ok(TierDisplay::Binary));
        assert!("four".parse::<TierDisplay>().is_err());
    }

    #[test]
    fn test_recommendation_follows_decision() {
        let rec = Recommendation::for_decision(Decision::RiskDetected, 0.62, 0.3);
        assert!(rec.headline.contains("detected"));
        assert_eq!(rec.score_line, "Risk score: %62.0");
        assert_eq!(rec.threshold_line, "Risk threshold: %30.0");
        assert!(rec.note.is_some());

        let rec = Recommendation::for_decision(Decision::LowRisk, 0.1, 0.3);
        assert!(rec.headline.contains("low"));
        assert_eq!(rec.advice.len(), 3);
    }
}
