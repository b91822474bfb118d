//! Antibiotic stewardship engine.
//!
//! Validates a proposed antibiotic order against patient safety rules
//! (pregnancy, pediatric age, renal function, documented allergies, drug
//! interactions, resistance history, weight-based dosing) and surfaces
//! evidence-graded guideline recommendations for common infections.
//!
//! Module map:
//! - [`types`]: shared enums, clinical alerts, and the error type
//! - [`drugs`]: antibiotic name to class resolution
//! - [`patient`]: loose intake records and the validated patient context
//! - [`renal`]: CKD-EPI kidney function estimation
//! - [`reference`]: rule tables behind the safety checks
//! - [`validators`]: the individual safety checks
//! - [`guidelines`]: condition scenarios and their evidence items
//! - [`recommend`]: evidence grading and combined recommendation assembly
//! - [`engine`]: the scoring aggregator tying it all together

use std::sync::LazyLock;

pub mod drugs;
pub mod engine;
pub mod guidelines;
pub mod patient;
pub mod recommend;
pub mod reference;
pub mod renal;
pub mod types;
pub mod validators;

pub use drugs::{resolve_drug, DrugProfile, DrugSelector};
pub use engine::StewardshipEngine;
pub use guidelines::{ClinicalEvidence, ClinicalScenario, DosingGuidance, GuidelineRepository};
pub use patient::{classify_patient_type, PatientContext, PatientInput};
pub use recommend::{
    CombinedRecommendation, EvidenceGrade, RecommendationStrength, StrengthAssessment,
};
pub use reference::ReferenceTables;
pub use renal::estimate_egfr;
pub use types::{
    AlertCategory, AlertKind, CareSetting, ClinicalAlert, DrugClass, EngineError,
    EvidenceQuality, EvidenceSource, InteractionSeverity, PatientType, Severity, Sex,
    ValidationResult,
};

// Shared engine over the built-in tables, for callers that never load
// custom rule sets.
static DEFAULT_ENGINE: LazyLock<StewardshipEngine> =
    LazyLock::new(StewardshipEngine::with_builtin_rules);

/// Validate one antibiotic order with the built-in rule tables.
pub fn validate_recommendation(
    antibiotic: &str,
    patient: &PatientContext,
    current_medications: &[String],
) -> ValidationResult {
    DEFAULT_ENGINE.validate(antibiotic, patient, current_medications)
}

/// Combined guideline recommendations with the built-in guideline set.
pub fn combined_guideline_recommendations(
    condition: &str,
    patient: &PatientContext,
) -> Option<CombinedRecommendation> {
    DEFAULT_ENGINE.combined_recommendations(condition, patient)
}
