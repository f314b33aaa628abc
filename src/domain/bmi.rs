//! Body mass index calculator for respondents who don't know their BMI.

pub const HEIGHT_CM_RANGE: (f64, f64) = (100.0, 250.0);
pub const WEIGHT_KG_RANGE: (f64, f64) = (30.0, 300.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }
}

/// BMI from height in centimetres and weight in kilograms.
///
/// # Errors
/// Returns a message when either measurement is outside its accepted range.
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> Result<f64, String> {
    let (h_min, h_max) = HEIGHT_CM_RANGE;
    let (w_min, w_max) = WEIGHT_KG_RANGE;

    if !(h_min..=h_max).contains(&height_cm) {
        return Err(format!("Height must be between {h_min} and {h_max} cm"));
    }
    if !(w_min..=w_max).contains(&weight_kg) {
        return Err(format!("Weight must be between {w_min} and {w_max} kg"));
    }

    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}
