use crate::drugs::resolve_drug;
use crate::guidelines::{ClinicalScenario, GuidelineRepository};
use crate::patient::{classify_patient_type, PatientContext};
use crate::recommend::{self, CombinedRecommendation};
use crate::reference::ReferenceTables;
use crate::types::{AlertCategory, CareSetting, PatientType, Severity, ValidationResult};
use crate::validators;

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

// Confidence starts at 100 and takes a fixed penalty per finding. Only the
// critical tier deducts for the patient-safety checks; a relative pregnancy
// caution or a renal monitoring note costs nothing.
const PENALTY_PREGNANCY: i32 = 40;
const PENALTY_PEDIATRIC: i32 = 35;
const PENALTY_RENAL: i32 = 30;
const PENALTY_ALLERGY: i32 = 50;
const PENALTY_INTERACTION_MAJOR: i32 = 20;
const PENALTY_RESISTANCE: i32 = 15;
const PENALTY_DOSING: i32 = 10;

/// Scores below this always go to pharmacist review.
const REVIEW_SCORE_THRESHOLD: u8 = 70;

// ---------------------------------------------------------------------------
// StewardshipEngine
// ---------------------------------------------------------------------------

/// Validation and recommendation façade over the rule tables and the
/// guideline repository. Holds no mutable state; one instance can serve
/// any number of requests.
#[derive(Debug, Clone)]
pub struct StewardshipEngine {
    tables: ReferenceTables,
    guidelines: GuidelineRepository,
}

impl Default for StewardshipEngine {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}

impl StewardshipEngine {
    pub fn new(tables: ReferenceTables, guidelines: GuidelineRepository) -> Self {
        Self { tables, guidelines }
    }

    /// Engine backed by the compiled-in rule tables and guideline set.
    pub fn with_builtin_rules() -> Self {
        Self::new(ReferenceTables::builtin(), GuidelineRepository::builtin())
    }

    /// Run every safety check for one antibiotic against one patient and
    /// aggregate the findings into a scored verdict.
    ///
    /// Checks run in a fixed order: pregnancy, pediatric, renal, allergy,
    /// interactions, resistance, weight-based dosing. An alert blocks the
    /// order exactly when its category is critical; `is_valid` is the
    /// absence of blocking alerts, nothing else.
    pub fn validate(
        &self,
        antibiotic: &str,
        patient: &PatientContext,
        current_medications: &[String],
    ) -> ValidationResult {
        let drug = resolve_drug(antibiotic);
        let mut alerts = Vec::new();
        let mut blocking = Vec::new();
        let mut score: i32 = 100;

        if let Some(alert) = validators::check_pregnancy(&drug, patient, &self.tables) {
            if alert.category == AlertCategory::Critical {
                score -= PENALTY_PREGNANCY;
                blocking.push(alert.clone());
            }
            alerts.push(alert);
        }

        if let Some(alert) = validators::check_pediatric(&drug, patient, &self.tables) {
            if alert.category == AlertCategory::Critical {
                score -= PENALTY_PEDIATRIC;
                blocking.push(alert.clone());
            }
            alerts.push(alert);
        }

        if let Some(alert) = validators::check_renal(&drug, patient, &self.tables) {
            if alert.category == AlertCategory::Critical {
                score -= PENALTY_RENAL;
                blocking.push(alert.clone());
            }
            alerts.push(alert);
        }

        // Allergy findings are always critical and always block.
        for alert in validators::check_allergy(&drug, patient, &self.tables) {
            score -= PENALTY_ALLERGY;
            blocking.push(alert.clone());
            alerts.push(alert);
        }

        for alert in validators::check_interactions(&drug, current_medications, &self.tables) {
            if alert.category == AlertCategory::Major {
                score -= PENALTY_INTERACTION_MAJOR;
            }
            alerts.push(alert);
        }

        for alert in validators::check_resistance(&drug, patient, &self.tables) {
            score -= PENALTY_RESISTANCE;
            alerts.push(alert);
        }

        if let Some(alert) = validators::check_dosing(&drug, patient, &self.tables) {
            score -= PENALTY_DOSING;
            alerts.push(alert);
        }

        let confidence_score = score.clamp(0, 100) as u8;
        let requires_review = confidence_score < REVIEW_SCORE_THRESHOLD
            || alerts.iter().any(|a| a.category >= AlertCategory::Major);

        tracing::debug!(
            antibiotic = %drug.name,
            alerts = alerts.len(),
            blocking = blocking.len(),
            score = confidence_score,
            "validation complete"
        );

        ValidationResult {
            is_valid: blocking.is_empty(),
            alerts,
            confidence_score,
            requires_review,
            blocking_issues: blocking,
        }
    }

    /// Guideline options for a free-text condition, merged into a single
    /// primary/alternative view. The patient's classification picks the
    /// scenario slice; `None` means the condition itself is unknown.
    pub fn combined_recommendations(
        &self,
        condition: &str,
        patient: &PatientContext,
    ) -> Option<CombinedRecommendation> {
        let patient_type = classify_patient_type(patient);
        let scenario = self.guidelines.find_scenario(
            condition,
            &patient_type,
            &patient.severity,
            &patient.setting,
        )?;
        Some(recommend::assemble_combined(scenario))
    }

    /// Raw scenario lookup for callers that want the untransformed
    /// guideline entry.
    pub fn evidence_based_recommendation(
        &self,
        condition: &str,
        patient_type: &PatientType,
        severity: &Severity,
        setting: &CareSetting,
    ) -> Option<&ClinicalScenario> {
        self.guidelines
            .find_scenario(condition, patient_type, severity, setting)
    }
}
