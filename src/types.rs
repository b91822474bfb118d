use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = EngineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(EngineError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AlertKind {
    Contraindication => "contraindication",
    Allergy => "allergy",
    Interaction => "interaction",
    Dosing => "dosing",
    Monitoring => "monitoring",
    Resistance => "resistance",
});

str_enum!(EvidenceSource {
    Idsa => "IDSA",
    Cdc => "CDC",
    Who => "WHO",
    Fda => "FDA",
    ClinicalTrial => "clinical_trial",
    Pharmacokinetics => "pharmacokinetics",
});

str_enum!(InteractionSeverity {
    Major => "major",
    Moderate => "moderate",
});

str_enum!(Severity {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
});

str_enum!(CareSetting {
    Outpatient => "outpatient",
    Inpatient => "inpatient",
    Icu => "icu",
    Emergency => "emergency",
});

str_enum!(PatientType {
    Adult => "adult",
    Pediatric => "pediatric",
    Elderly => "elderly",
    Pregnant => "pregnant",
    Immunocompromised => "immunocompromised",
});

str_enum!(Sex {
    Male => "male",
    Female => "female",
});

str_enum!(EvidenceQuality {
    High => "high",
    Moderate => "moderate",
    Low => "low",
    VeryLow => "very_low",
});

str_enum!(DrugClass {
    Penicillin => "penicillin",
    Cephalosporin => "cephalosporin",
    Carbapenem => "carbapenem",
    Fluoroquinolone => "fluoroquinolone",
    Tetracycline => "tetracycline",
    Macrolide => "macrolide",
    Sulfonamide => "sulfonamide",
    Aminoglycoside => "aminoglycoside",
    Glycopeptide => "glycopeptide",
    Lipopeptide => "lipopeptide",
    Oxazolidinone => "oxazolidinone",
    Nitrofuran => "nitrofuran",
    Lincosamide => "lincosamide",
    Nitroimidazole => "nitroimidazole",
    Other => "other",
});

// ---------------------------------------------------------------------------
// AlertCategory
// ---------------------------------------------------------------------------

/// Clinical weight of an alert. Determines blocking and review behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertCategory {
    /// Informational, never blocks.
    Minor,
    /// Worth surfacing, never blocks.
    Moderate,
    /// Triggers clinician review before proceeding.
    Major,
    /// Blocks the recommendation outright.
    Critical,
}

impl AlertCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Major => "major",
            Self::Critical => "critical",
        }
    }
}

// ---------------------------------------------------------------------------
// ClinicalAlert
// ---------------------------------------------------------------------------

/// A single safety finding for a proposed antibiotic.
///
/// Alerts are immutable once created; each validation run produces a fresh
/// set with fresh ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalAlert {
    pub id: Uuid,
    pub category: AlertCategory,
    pub kind: AlertKind,
    pub title: String,
    /// Clinician-facing explanation of the finding.
    pub message: String,
    /// Suggested course of action: alternatives, monitoring, or dose changes.
    pub recommendation: String,
    /// Citation or mechanism backing the finding.
    pub evidence: String,
    pub source: EvidenceSource,
    /// Whether a clinician may proceed past this alert.
    pub overridable: bool,
    /// Whether an override must carry a written justification.
    pub requires_justification: bool,
}

// ---------------------------------------------------------------------------
// ValidationResult
// ---------------------------------------------------------------------------

/// Aggregate verdict over all safety validators.
///
/// Invariants: `is_valid == blocking_issues.is_empty()`, every blocking issue
/// is `Critical`, and `confidence_score` stays within `0..=100` no matter how
/// many penalties accumulate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub alerts: Vec<ClinicalAlert>,
    pub confidence_score: u8,
    pub requires_review: bool,
    pub blocking_issues: Vec<ClinicalAlert>,
}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid patient data for {field}: {value}")]
    InvalidPatientField { field: String, value: String },

    #[error("Missing required patient field: {0}")]
    MissingPatientField(String),

    #[error("Reference data parse failed ({0}): {1}")]
    ReferenceDataParse(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn alert_kind_round_trip() {
        for (variant, s) in [
            (AlertKind::Contraindication, "contraindication"),
            (AlertKind::Allergy, "allergy"),
            (AlertKind::Interaction, "interaction"),
            (AlertKind::Dosing, "dosing"),
            (AlertKind::Monitoring, "monitoring"),
            (AlertKind::Resistance, "resistance"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AlertKind::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn severity_round_trip() {
        for (variant, s) in [
            (Severity::Mild, "mild"),
            (Severity::Moderate, "moderate"),
            (Severity::Severe, "severe"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Severity::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn care_setting_round_trip() {
        for (variant, s) in [
            (CareSetting::Outpatient, "outpatient"),
            (CareSetting::Inpatient, "inpatient"),
            (CareSetting::Icu, "icu"),
            (CareSetting::Emergency, "emergency"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(CareSetting::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn patient_type_round_trip() {
        for (variant, s) in [
            (PatientType::Adult, "adult"),
            (PatientType::Pediatric, "pediatric"),
            (PatientType::Elderly, "elderly"),
            (PatientType::Pregnant, "pregnant"),
            (PatientType::Immunocompromised, "immunocompromised"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(PatientType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn drug_class_round_trip() {
        for (variant, s) in [
            (DrugClass::Penicillin, "penicillin"),
            (DrugClass::Fluoroquinolone, "fluoroquinolone"),
            (DrugClass::Glycopeptide, "glycopeptide"),
            (DrugClass::Other, "other"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(DrugClass::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(AlertKind::from_str("invalid").is_err());
        assert!(Severity::from_str("catastrophic").is_err());
        assert!(CareSetting::from_str("").is_err());
    }

    #[test]
    fn alert_category_ordering() {
        assert!(AlertCategory::Minor < AlertCategory::Moderate);
        assert!(AlertCategory::Moderate < AlertCategory::Major);
        assert!(AlertCategory::Major < AlertCategory::Critical);
    }
}
