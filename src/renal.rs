use crate::types::Sex;

/// Estimate glomerular filtration rate (mL/min/1.73m²) from serum
/// creatinine using the CKD-EPI creatinine equation (2009 coefficients):
///
/// `141 · min(Scr/κ, 1)^α · max(Scr/κ, 1)^-1.209 · 0.993^age · 1.018 (if female)`
///
/// with κ = 0.7 (female) / 0.9 (male) and α = −0.329 (female) / −0.411 (male).
///
/// Inputs are assumed positive and finite; the patient boundary rejects
/// anything else before this runs.
pub fn estimate_egfr(creatinine_mg_dl: f64, age_years: f64, sex: &Sex) -> f64 {
    let (kappa, alpha, sex_factor) = match sex {
        Sex::Female => (0.7, -0.329, 1.018),
        Sex::Male => (0.9, -0.411, 1.0),
    };
    let ratio = creatinine_mg_dl / kappa;
    141.0
        * ratio.min(1.0).powf(alpha)
        * ratio.max(1.0).powf(-1.209)
        * 0.993_f64.powf(age_years)
        * sex_factor
}
