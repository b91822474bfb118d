use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{CareSetting, EngineError, PatientType, Severity, Sex};

/// Assumed serum creatinine when the sending system omits it.
const DEFAULT_CREATININE_MG_DL: f64 = 1.0;

// ---------------------------------------------------------------------------
// Loose input shapes
// ---------------------------------------------------------------------------

/// A numeric field that may arrive as a JSON number or free text
/// ("70", "70 kg", "1.2 mg/dL").
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Num(f64),
    Text(String),
}

/// A flag that may arrive as a JSON bool or affirmative text ("yes").
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseFlag {
    Bool(bool),
    Text(String),
}

/// The patient shape surrounding systems actually send. Every field
/// tolerates the representations seen in the wild; converting to
/// [`PatientContext`] is the single place the mess gets resolved.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientInput {
    pub age: Option<LooseNumber>,
    pub weight: Option<LooseNumber>,
    pub height: Option<LooseNumber>,
    pub creatinine: Option<LooseNumber>,
    pub gender: Option<String>,
    pub pregnancy: Option<LooseFlag>,
    pub immunosuppressed: Option<LooseFlag>,
    /// Allergy class -> declared. Keys are free text ("Penicillin").
    pub allergies: BTreeMap<String, bool>,
    /// Resistance pattern -> declared ("MRSA", "esbl").
    pub resistances: BTreeMap<String, bool>,
    pub severity: Option<String>,
    pub setting: Option<String>,
}

// ---------------------------------------------------------------------------
// Loose parsing helpers
// ---------------------------------------------------------------------------

/// First numeric run in a free-text value ("70 kg" -> "70").
static RE_LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)").unwrap());

fn parse_loose_number(field: &str, value: &LooseNumber) -> Result<f64, EngineError> {
    let invalid = |shown: String| EngineError::InvalidPatientField {
        field: field.to_string(),
        value: shown,
    };

    let parsed = match value {
        LooseNumber::Num(n) => *n,
        LooseNumber::Text(s) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<f64>() {
                n
            } else if let Some(caps) = RE_LEADING_NUMBER.captures(trimmed) {
                caps.get(1)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .ok_or_else(|| invalid(s.clone()))?
            } else {
                return Err(invalid(s.clone()));
            }
        }
    };

    if !parsed.is_finite() || parsed < 0.0 {
        return Err(invalid(format!("{parsed}")));
    }
    Ok(parsed)
}

fn parse_loose_flag(value: &LooseFlag) -> bool {
    match value {
        LooseFlag::Bool(b) => *b,
        LooseFlag::Text(s) => {
            matches!(s.trim().to_lowercase().as_str(), "yes" | "true" | "y" | "1")
        }
    }
}

fn normalize_keys(map: BTreeMap<String, bool>) -> BTreeMap<String, bool> {
    map.into_iter()
        .map(|(k, v)| (k.trim().to_lowercase(), v))
        .collect()
}

// ---------------------------------------------------------------------------
// PatientContext
// ---------------------------------------------------------------------------

/// Validated patient attributes. Constructed through
/// `TryFrom<PatientInput>`, so downstream code can rely on finite,
/// in-range numerics and lowercased allergy/resistance keys.
#[derive(Debug, Clone, Serialize)]
pub struct PatientContext {
    pub age_years: f64,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub sex: Sex,
    pub pregnant: bool,
    pub creatinine_mg_dl: f64,
    pub immunosuppressed: bool,
    pub allergies: BTreeMap<String, bool>,
    pub resistances: BTreeMap<String, bool>,
    pub severity: Severity,
    pub setting: CareSetting,
}

impl TryFrom<PatientInput> for PatientContext {
    type Error = EngineError;

    fn try_from(input: PatientInput) -> Result<Self, Self::Error> {
        let age_years = match &input.age {
            Some(value) => parse_loose_number("age", value)?,
            None => return Err(EngineError::MissingPatientField("age".into())),
        };

        let weight_kg = input
            .weight
            .as_ref()
            .map(|value| parse_loose_number("weight", value))
            .transpose()?;
        if weight_kg.is_some_and(|w| w == 0.0) {
            return Err(EngineError::InvalidPatientField {
                field: "weight".into(),
                value: "0".into(),
            });
        }

        let height_cm = input
            .height
            .as_ref()
            .map(|value| parse_loose_number("height", value))
            .transpose()?;

        let creatinine_mg_dl = match &input.creatinine {
            Some(value) => {
                let parsed = parse_loose_number("creatinine", value)?;
                if parsed == 0.0 {
                    return Err(EngineError::InvalidPatientField {
                        field: "creatinine".into(),
                        value: "0".into(),
                    });
                }
                parsed
            }
            None => DEFAULT_CREATININE_MG_DL,
        };

        let sex = match &input.gender {
            Some(g) if g.trim().eq_ignore_ascii_case("female") => Sex::Female,
            _ => Sex::Male,
        };

        let pregnant = input.pregnancy.as_ref().map(parse_loose_flag).unwrap_or(false);
        let immunosuppressed = input
            .immunosuppressed
            .as_ref()
            .map(parse_loose_flag)
            .unwrap_or(false);

        let severity = input
            .severity
            .as_deref()
            .and_then(|s| Severity::from_str(&s.trim().to_lowercase()).ok())
            .unwrap_or(Severity::Moderate);

        let setting = input
            .setting
            .as_deref()
            .and_then(|s| CareSetting::from_str(&s.trim().to_lowercase()).ok())
            .unwrap_or(CareSetting::Outpatient);

        Ok(Self {
            age_years,
            weight_kg,
            height_cm,
            sex,
            pregnant,
            creatinine_mg_dl,
            immunosuppressed,
            allergies: normalize_keys(input.allergies),
            resistances: normalize_keys(input.resistances),
            severity,
            setting,
        })
    }
}

impl PatientContext {
    /// Whether the patient declares the given allergy class (lowercase key).
    pub fn has_allergy(&self, class: &str) -> bool {
        self.allergies.get(class).copied().unwrap_or(false)
    }

    /// Whether the patient carries the given resistance pattern (lowercase key).
    pub fn has_resistance(&self, pattern: &str) -> bool {
        self.resistances.get(pattern).copied().unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Patient type classification
// ---------------------------------------------------------------------------

/// Fixed-priority classification used for guideline scenario matching:
/// pregnant, then immunocompromised, then pediatric (under 18), then
/// elderly (65 and over), then adult.
pub fn classify_patient_type(patient: &PatientContext) -> PatientType {
    if patient.pregnant {
        PatientType::Pregnant
    } else if patient.immunosuppressed {
        PatientType::Immunocompromised
    } else if patient.age_years < 18.0 {
        PatientType::Pediatric
    } else if patient.age_years >= 65.0 {
        PatientType::Elderly
    } else {
        PatientType::Adult
    }
}
