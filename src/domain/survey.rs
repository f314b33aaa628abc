//! Survey answers collected from the form surface.
//!
//! Field domains follow the BRFSS 2015 diabetes health indicators codebook.

use serde::{Deserialize, Serialize};

/// Values held constant for every submission (never asked in the form).
pub mod fixed {
    pub const CHOL_CHECK: f64 = 1.0;
    pub const STROKE: f64 = 0.0;
    pub const HEART_DISEASE_OR_ATTACK: f64 = 0.0;
    pub const FRUITS: f64 = 1.0;
    pub const VEGGIES: f64 = 1.0;
    pub const HVY_ALCOHOL_CONSUMP: f64 = 0.0;
    pub const ANY_HEALTHCARE: f64 = 1.0;
    pub const NO_DOCBC_COST: f64 = 0.0;
}

pub const BMI_RANGE: (f64, f64) = (15.0, 50.0);
pub const GEN_HLTH_RANGE: (u8, u8) = (1, 5);
pub const DAYS_RANGE: (u8, u8) = (0, 30);
pub const AGE_RANGE: (u8, u8) = (1, 13);
pub const EDUCATION_RANGE: (u8, u8) = (1, 6);
pub const INCOME_RANGE: (u8, u8) = (1, 8);

/// Sex as coded in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Sex {
    #[default]
    Female,
    Male,
}

impl Sex {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Female => 0,
            Self::Male => 1,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

impl From<Sex> for u8 {
    fn from(sex: Sex) -> Self {
        sex.code()
    }
}

impl TryFrom<u8> for Sex {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Female),
            1 => Ok(Self::Male),
            other => Err(format!("Sex {other} must be 0 or 1")),
        }
    }
}

/// Raw answers from the survey form.
///
/// Serde names match the canonical feature names so a JSON record can be
/// fed straight from an external form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyInputs {
    #[serde(rename = "HighBP")]
    pub high_bp: bool,
    #[serde(rename = "HighChol")]
    pub high_chol: bool,
    #[serde(rename = "Smoker")]
    pub smoker: bool,
    #[serde(rename = "PhysActivity")]
    pub phys_activity: bool,
    #[serde(rename = "DiffWalk")]
    pub diff_walk: bool,

    /// Body mass index, 15.0-50.0
    #[serde(rename = "BMI")]
    pub bmi: f64,
    /// Self-rated general health, 1 (excellent) to 5 (poor)
    #[serde(rename = "GenHlth")]
    pub gen_hlth: u8,
    /// Days of poor mental health in the last 30
    #[serde(rename = "MentHlth")]
    pub ment_hlth: u8,
    /// Days of poor physical health in the last 30
    #[serde(rename = "PhysHlth")]
    pub phys_hlth: u8,

    /// Age bracket code, 1 (18-24) to 13 (80+)
    #[serde(rename = "Age")]
    pub age: u8,
    #[serde(rename = "Sex")]
    pub sex: Sex,
    /// Education level code, 1-6
    #[serde(rename = "Education")]
    pub education: u8,
    /// Income level code, 1-8
    #[serde(rename = "Income")]
    pub income: u8,
}

impl Default for SurveyInputs {
    fn default() -> Self {
        Self {
            high_bp: false,
            high_chol: false,
            smoker: false,
            phys_activity: false,
            diff_walk: false,
            bmi: 25.0,
            gen_hlth: 3,
            ment_hlth: 2,
            phys_hlth: 2,
            age: AGE_RANGE.0,
            sex: Sex::Female,
            education: 4,
            income: 5,
        }
    }
}

fn check_code(errors: &mut Vec<String>, name: &str, value: u8, (min, max): (u8, u8)) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{name} {value} out of range [{min}, {max}]"));
    }
}

impl SurveyInputs {
    /// Check every field against its declared domain.
    ///
    /// # Errors
    /// Returns one message per out-of-domain field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let (bmi_min, bmi_max) = BMI_RANGE;
        if !self.bmi.is_finite() || !(bmi_min..=bmi_max).contains(&self.bmi) {
            errors.push(format!(
                "BMI {} out of range [{bmi_min}, {bmi_max}]",
                self.bmi
            ));
        }
        check_code(&mut errors, "GenHlth", self.gen_hlth, GEN_HLTH_RANGE);
        check_code(&mut errors, "MentHlth", self.ment_hlth, DAYS_RANGE);
        check_code(&mut errors, "PhysHlth", self.phys_hlth, DAYS_RANGE);
        check_code(&mut errors, "Age", self.age, AGE_RANGE);
        check_code(&mut errors, "Education", self.education, EDUCATION_RANGE);
        check_code(&mut errors, "Income", self.income, INCOME_RANGE);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Copy with every numeric field pulled into its domain.
    ///
    /// A non-finite BMI falls back to the form default.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let (bmi_min, bmi_max) = BMI_RANGE;
        let bmi = if self.bmi.is_finite() {
            self.bmi.clamp(bmi_min, bmi_max)
        } else {
            Self::default().bmi
        };

        Self {
            bmi,
            gen_hlth: self.gen_hlth.clamp(GEN_HLTH_RANGE.0, GEN_HLTH_RANGE.1),
            ment_hlth: self.ment_hlth.clamp(DAYS_RANGE.0, DAYS_RANGE.1),
            phys_hlth: self.phys_hlth.clamp(DAYS_RANGE.0, DAYS_RANGE.1),
            age: self.age.clamp(AGE_RANGE.0, AGE_RANGE.1),
            education: self.education.clamp(EDUCATION_RANGE.0, EDUCATION_RANGE.1),
            income: self.income.clamp(INCOME_RANGE.0, INCOME_RANGE.1),
            ..self.clone()
        }
    }
}

/// Human-readable age bracket for an age code ("18-24" ... "75-79", "80+").
#[must_use]
pub fn age_bracket_label(code: u8) -> String {
    match code {
        0 | 1 => "18-24".to_string(),
        c if c >= AGE_RANGE.1 => "80+".to_string(),
        c => {
            let low = 25 + (u32::from(c) - 2) * 5;
            format!("{}-{}", low, low + 4)
        }
    }
}

#[must_use]
pub fn education_label(code: u8) -> &'static str {
    match code {
        1 => "Never attended school",
        2 => "Elementary",
        3 => "Some high school",
        4 => "High school graduate",
        5 => "Some college",
        6 => "College graduate",
        _ => "Unknown",
    }
}

#[must_use]
pub fn income_label(code: u8) -> &'static str {
    match code {
        1 => "Less than $10,000",
        2 => "$10,000 - $15,000",
        3 => "$15,000 - $20,000",
        4 => "$20,000 - $25,000",
        5 => "$25,000 - $35,000",
        6 => "$35,000 - $50,000",
        7 => "$50,000 - $75,000",
        8 => "$75,000 or more",
        _ => "Unknown",
    }
}

#[must_use]
pub fn gen_hlth_label(code: u8) -> &'static str {
    match code {
        1 => "Excellent",
        2 => "Very good",
        3 => "Good",
        4 => "Fair",
        5 => "Poor",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_domain() {
        assert!(SurveyInputs::default().validate().is_ok());
    }

    #[test]
    fn test_validation_reports_each_field() {
        let invalid = SurveyInputs {
            bmi: 61.0,
            gen_hlth: 0,
            age: 14,
            income: 9,
            ..Default::default()
        };
        let errors = invalid.validate().expect_err("must be out of domain");
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("BMI"));
    }

    #[test]
    fn test_nan_bmi_is_rejected() {
        let invalid = SurveyInputs {
            bmi: f64::NAN,
            ..Default::default()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_clamped_pulls_into_domain() {
        let wild = SurveyInputs {
            bmi: 70.0,
            gen_hlth: 9,
            ment_hlth: 45,
            age: 0,
            education: 0,
            ..Default::default()
        };
        let clamped = wild.clamped();
        assert!(clamped.validate().is_ok());
        assert!((clamped.bmi - 50.0).abs() < f64::EPSILON);
        assert_eq!(clamped.gen_hlth, 5);
        assert_eq!(clamped.ment_hlth, 30);
        assert_eq!(clamped.age, 1);
        assert_eq!(clamped.education, 1);
    }

    #[test]
    fn test_age_bracket_labels() {
        assert_eq!(age_bracket_label(1), "18-24");
        assert_eq!(age_bracket_label(2), "25-29");
        assert_eq!(age_bracket_label(9), "60-64");
        assert_eq!(age_bracket_label(12), "75-79");
        assert_eq!(age_bracket_label(13), "80+");
    }

    #[test]
    fn test_json_uses_feature_names() {
        let json = serde_json::to_value(SurveyInputs::default()).expect("serialize");
        assert_eq!(json["HighBP"], false);
        assert_eq!(json["Sex"], 0);
        assert_eq!(json["Education"], 4);

        let bad = r#"{"HighBP":true,"HighChol":false,"Smoker":false,"PhysActivity":true,
            "DiffWalk":false,"BMI":30.0,"GenHlth":3,"MentHlth":0,"PhysHlth":0,
            "Age":5,"Sex":2,"Education":4,"Income":5}"#;
        assert!(serde_json::from_str::<SurveyInputs>(bad).is_err());
    }
}
