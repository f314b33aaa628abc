//! Feature assembly: survey answers to the classifier's ordered input row.
//!
//! The classifier was trained on the BRFSS column names below plus two
//! engineered columns. Column order comes from the feature list shipped
//! with the model, never from this module.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::survey::{fixed, SurveyInputs};

pub const HIGH_BP: &str = "HighBP";
pub const HIGH_CHOL: &str = "HighChol";
pub const CHOL_CHECK: &str = "CholCheck";
pub const BMI: &str = "BMI";
pub const SMOKER: &str = "Smoker";
pub const STROKE: &str = "Stroke";
pub const HEART_DISEASE_OR_ATTACK: &str = "HeartDiseaseorAttack";
pub const PHYS_ACTIVITY: &str = "PhysActivity";
pub const FRUITS: &str = "Fruits";
pub const VEGGIES: &str = "Veggies";
pub const HVY_ALCOHOL_CONSUMP: &str = "HvyAlcoholConsump";
pub const ANY_HEALTHCARE: &str = "AnyHealthcare";
pub const NO_DOCBC_COST: &str = "NoDocbcCost";
pub const GEN_HLTH: &str = "GenHlth";
pub const MENT_HLTH: &str = "MentHlth";
pub const PHYS_HLTH: &str = "PhysHlth";
pub const DIFF_WALK: &str = "DiffWalk";
pub const SEX: &str = "Sex";
pub const AGE: &str = "Age";
pub const EDUCATION: &str = "Education";
pub const INCOME: &str = "Income";

/// `BMI * HighBP`
pub const RISK_FACTOR: &str = "Risk_Factor";
/// `Age * GenHlth`
pub const AGE_GENHLTH: &str = "Age_GenHlth";

/// Every column the assembler can produce, in training-table order.
pub const ASSEMBLED_FEATURES: [&str; 23] = [
    HIGH_BP,
    HIGH_CHOL,
    CHOL_CHECK,
    BMI,
    SMOKER,
    STROKE,
    HEART_DISEASE_OR_ATTACK,
    PHYS_ACTIVITY,
    FRUITS,
    VEGGIES,
    HVY_ALCOHOL_CONSUMP,
    ANY_HEALTHCARE,
    NO_DOCBC_COST,
    GEN_HLTH,
    MENT_HLTH,
    PHYS_HLTH,
    DIFF_WALK,
    SEX,
    AGE,
    EDUCATION,
    INCOME,
    RISK_FACTOR,
    AGE_GENHLTH,
];

/// Feature list and assembler disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaMismatchError {
    #[error("feature '{name}' is required by the model but not produced by the assembler")]
    MissingFeature { name: String },

    #[error("feature '{name}' appears more than once in the feature list")]
    DuplicateFeature { name: String },

    #[error("feature list is empty")]
    EmptySchema,

    #[error("feature width mismatch: expected {expected}, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("column {position} out of order: model expects '{expected}', row has '{actual}'")]
    OutOfOrder {
        position: usize,
        expected: String,
        actual: String,
    },
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Encode survey answers into a name -> value mapping.
///
/// Booleans become 1/0, codes pass through, the fixed defaults are injected
/// and the derived columns are computed from the encoded values.
#[must_use]
pub fn feature_map(raw: &SurveyInputs) -> BTreeMap<&'static str, f64> {
    let mut map = BTreeMap::new();

    map.insert(HIGH_BP, flag(raw.high_bp));
    map.insert(HIGH_CHOL, flag(raw.high_chol));
    map.insert(CHOL_CHECK, fixed::CHOL_CHECK);
    map.insert(BMI, raw.bmi);
    map.insert(SMOKER, flag(raw.smoker));
    map.insert(STROKE, fixed::STROKE);
    map.insert(HEART_DISEASE_OR_ATTACK, fixed::HEART_DISEASE_OR_ATTACK);
    map.insert(PHYS_ACTIVITY, flag(raw.phys_activity));
    map.insert(FRUITS, fixed::FRUITS);
    map.insert(VEGGIES, fixed::VEGGIES);
    map.insert(HVY_ALCOHOL_CONSUMP, fixed::HVY_ALCOHOL_CONSUMP);
    map.insert(ANY_HEALTHCARE, fixed::ANY_HEALTHCARE);
    map.insert(NO_DOCBC_COST, fixed::NO_DOCBC_COST);
    map.insert(GEN_HLTH, f64::from(raw.gen_hlth));
    map.insert(MENT_HLTH, f64::from(raw.ment_hlth));
    map.insert(PHYS_HLTH, f64::from(raw.phys_hlth));
    map.insert(DIFF_WALK, flag(raw.diff_walk));
    map.insert(SEX, f64::from(raw.sex.code()));
    map.insert(AGE, f64::from(raw.age));
    map.insert(EDUCATION, f64::from(raw.education));
    map.insert(INCOME, f64::from(raw.income));

    let risk_factor = map[BMI] * map[HIGH_BP];
    let age_genhlth = map[AGE] * map[GEN_HLTH];
    map.insert(RISK_FACTOR, risk_factor);
    map.insert(AGE_GENHLTH, age_genhlth);

    map
}

/// Build the ordered row for `feature_order`.
///
/// # Errors
/// Returns `SchemaMismatchError::MissingFeature` for the first requested name
/// the assembler does not produce. No partial row is returned.
pub fn assemble<S: AsRef<str>>(
    raw: &SurveyInputs,
    feature_order: &[S],
) -> Result<FeatureVector, SchemaMismatchError> {
    let map = feature_map(raw);

    let mut names = Vec::with_capacity(feature_order.len());
    let mut values = Vec::with_capacity(feature_order.len());
    for name in feature_order {
        let name = name.as_ref();
        let value = map
            .get(name)
            .copied()
            .ok_or_else(|| SchemaMismatchError::MissingFeature {
                name: name.to_string(),
            })?;
        names.push(name.to_string());
        values.push(value);
    }

    Ok(FeatureVector {
        names: names.into(),
        values,
    })
}

/// Ordered feature names the model expects, checked once at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Arc<[String]>,
}

impl FeatureSchema {
    /// Validate a feature list against the assembler.
    ///
    /// # Errors
    /// Rejects an empty list, duplicate names and names the assembler
    /// cannot produce.
    pub fn new(names: Vec<String>) -> Result<Self, SchemaMismatchError> {
        if names.is_empty() {
            return Err(SchemaMismatchError::EmptySchema);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(SchemaMismatchError::DuplicateFeature { name: name.clone() });
            }
            if !ASSEMBLED_FEATURES.contains(&name.as_str()) {
                return Err(SchemaMismatchError::MissingFeature { name: name.clone() });
            }
        }

        let unused: Vec<&str> = ASSEMBLED_FEATURES
            .iter()
            .copied()
            .filter(|f| !seen.contains(f))
            .collect();
        if !unused.is_empty() {
            tracing::warn!(?unused, "Model does not use every assembled feature");
        }

        Ok(Self {
            names: names.into(),
        })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Assemble a row in this schema's order.
    ///
    /// # Errors
    /// See [`assemble`].
    pub fn assemble(&self, raw: &SurveyInputs) -> Result<FeatureVector, SchemaMismatchError> {
        let map = feature_map(raw);
        let values = self
            .names
            .iter()
            .map(|name| {
                map.get(name.as_str())
                    .copied()
                    .ok_or_else(|| SchemaMismatchError::MissingFeature { name: name.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureVector {
            names: Arc::clone(&self.names),
            values,
        })
    }
}

/// One model-ready row: values aligned with their column names.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named column, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Whether the columns are exactly `schema`, in order.
    #[must_use]
    pub fn matches(&self, schema: &FeatureSchema) -> bool {
        self.names() == schema.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::survey::Sex;

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

    fn full_order() -> Vec<String> {
        ASSEMBLED_FEATURES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_map_covers_every_feature() {
        let map = feature_map(&SurveyInputs::default());
        assert_eq!(map.len(), ASSEMBLED_FEATURES.len());
        for name in ASSEMBLED_FEATURES {
            assert!(map.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn test_fixed_defaults_injected() {
        let map = feature_map(&worked_example());
        assert_eq!(map[CHOL_CHECK], 1.0);
        assert_eq!(map[STROKE], 0.0);
        assert_eq!(map[HEART_DISEASE_OR_ATTACK], 0.0);
        assert_eq!(map[FRUITS], 1.0);
        assert_eq!(map[VEGGIES], 1.0);
        assert_eq!(map[HVY_ALCOHOL_CONSUMP], 0.0);
        assert_eq!(map[ANY_HEALTHCARE], 1.0);
        assert_eq!(map[NO_DOCBC_COST], 0.0);
    }

    #[test]
    fn test_worked_example_derived_features() {
        let v = assemble(&worked_example(), &full_order()).expect("assemble");
        assert_eq!(v.len(), 23);
        assert!((v.get(RISK_FACTOR).unwrap() - 32.5).abs() < f64::EPSILON);
        assert!((v.get(AGE_GENHLTH).unwrap() - 36.0).abs() < f64::EPSILON);
        assert_eq!(v.get(HIGH_BP), Some(1.0));
        assert_eq!(v.get(PHYS_ACTIVITY), Some(1.0));
        assert_eq!(v.get(SEX), Some(1.0));
    }

    #[test]
    fn test_risk_factor_zero_without_high_bp() {
        let mut bmi = 15.0;
        while bmi <= 50.0 {
            let without = SurveyInputs {
                bmi,
                high_bp: false,
                ..Default::default()
            };
            let with = SurveyInputs {
                high_bp: true,
                ..without.clone()
            };
            assert_eq!(feature_map(&without)[RISK_FACTOR], 0.0);
            assert!((feature_map(&with)[RISK_FACTOR] - bmi).abs() < f64::EPSILON);
            bmi += 0.5;
        }
    }

    #[test]
    fn test_age_boundaries_use_raw_codes() {
        for (age, expected) in [(1u8, 5.0), (13u8, 65.0)] {
            let raw = SurveyInputs {
                age,
                gen_hlth: 5,
                ..Default::default()
            };
            let v = assemble(&raw, &full_order()).expect("boundary ages assemble");
            assert_eq!(v.get(AGE), Some(f64::from(age)));
            assert_eq!(v.get(AGE_GENHLTH), Some(expected));
        }
    }

    #[test]
    fn test_order_follows_feature_list() {
        let raw = worked_example();
        let map = feature_map(&raw);

        let mut reversed = full_order();
        reversed.reverse();
        let mut rotated = full_order();
        rotated.rotate_left(7);

        for order in [full_order(), reversed, rotated] {
            let v = assemble(&raw, &order).expect("assemble");
            for (i, name) in order.iter().enumerate() {
                assert_eq!(v.values()[i], map[name.as_str()], "column {i} ({name})");
            }
        }
    }

    #[test]
    fn test_unknown_feature_fails() {
        let order = vec![HIGH_BP.to_string(), "Glucose".to_string()];
        let err = assemble(&worked_example(), &order).expect_err("must fail");
        assert_eq!(
            err,
            SchemaMismatchError::MissingFeature {
                name: "Glucose".into()
            }
        );
    }

    #[test]
    fn test_schema_rejects_bad_lists() {
        assert_eq!(
            FeatureSchema::new(vec![]).unwrap_err(),
            SchemaMismatchError::EmptySchema
        );
        assert!(matches!(
            FeatureSchema::new(vec![BMI.into(), BMI.into()]).unwrap_err(),
            SchemaMismatchError::DuplicateFeature { .. }
        ));
        assert!(matches!(
            FeatureSchema::new(vec![BMI.into(), "bmi".into()]).unwrap_err(),
            SchemaMismatchError::MissingFeature { .. }
        ));
    }

    #[test]
    fn test_schema_assemble_matches_free_function() {
        let schema = FeatureSchema::new(vec![AGE_GENHLTH.into(), BMI.into(), HIGH_BP.into()])
            .expect("valid subset");
        let a = schema.assemble(&worked_example()).expect("assemble");
        let b = assemble(&worked_example(), schema.names()).expect("assemble");
        assert_eq!(a, b);
        assert!(a.matches(&schema));
        assert_eq!(a.values(), &[36.0, 32.5, 1.0]);
    }
}
