use uuid::Uuid;

use crate::drugs::DrugProfile;
use crate::patient::PatientContext;
use crate::reference::ReferenceTables;
use crate::renal::estimate_egfr;
use crate::types::{AlertCategory, AlertKind, ClinicalAlert, InteractionSeverity};

/// eGFR (mL/min/1.73m²) below which avoid-listed drugs are blocked.
const EGFR_AVOID_THRESHOLD: f64 = 30.0;
/// eGFR below which monitor-listed drugs need dose adjustment.
const EGFR_MONITOR_THRESHOLD: f64 = 60.0;
/// Age cutoff for the absolute pediatric contraindication list.
const PEDIATRIC_ABSOLUTE_MAX_AGE: f64 = 8.0;
/// Age cutoff for the pediatric caution list.
const PEDIATRIC_CAUTION_MAX_AGE: f64 = 18.0;
/// Body weight above which weight-based dosing rules fire.
const WEIGHT_DOSING_THRESHOLD_KG: f64 = 100.0;

// ---------------------------------------------------------------------------
// Pregnancy
// ---------------------------------------------------------------------------

/// Pregnancy contraindications. Absolute matches block outright; relative
/// matches surface as overridable cautions.
pub fn check_pregnancy(
    drug: &DrugProfile,
    patient: &PatientContext,
    tables: &ReferenceTables,
) -> Option<ClinicalAlert> {
    if !patient.pregnant {
        return None;
    }

    if let Some(rule) = tables
        .pregnancy_absolute
        .iter()
        .find(|r| r.selector.matches(drug))
    {
        return Some(ClinicalAlert {
            id: Uuid::new_v4(),
            category: AlertCategory::Critical,
            kind: AlertKind::Contraindication,
            title: format!("{} is contraindicated in pregnancy", drug.name),
            message: format!("{} {}", drug.name, rule.risk),
            recommendation:
                "Select a pregnancy-compatible alternative such as amoxicillin, cephalexin, or azithromycin"
                    .into(),
            evidence: rule.evidence.clone(),
            source: rule.source.clone(),
            overridable: false,
            requires_justification: false,
        });
    }

    if let Some(rule) = tables
        .pregnancy_relative
        .iter()
        .find(|r| r.selector.matches(drug))
    {
        return Some(ClinicalAlert {
            id: Uuid::new_v4(),
            category: AlertCategory::Major,
            kind: AlertKind::Contraindication,
            title: format!("{} requires caution in pregnancy", drug.name),
            message: format!("{}: {}", drug.name, rule.risk),
            recommendation:
                "Weigh maternal benefit against fetal risk; prefer an alternative where one exists"
                    .into(),
            evidence: rule.evidence.clone(),
            source: rule.source.clone(),
            overridable: true,
            requires_justification: false,
        });
    }

    None
}

// ---------------------------------------------------------------------------
// Pediatric age
// ---------------------------------------------------------------------------

/// Age-gated contraindications: an absolute under-8 tier and a cautionary
/// under-18 tier.
pub fn check_pediatric(
    drug: &DrugProfile,
    patient: &PatientContext,
    tables: &ReferenceTables,
) -> Option<ClinicalAlert> {
    if patient.age_years < PEDIATRIC_ABSOLUTE_MAX_AGE {
        if let Some(rule) = tables
            .pediatric_avoid_under_8
            .iter()
            .find(|r| r.selector.matches(drug))
        {
            return Some(ClinicalAlert {
                id: Uuid::new_v4(),
                category: AlertCategory::Critical,
                kind: AlertKind::Contraindication,
                title: format!("{} is contraindicated under 8 years", drug.name),
                message: format!(
                    "{} risks {} in a {:.0}-year-old",
                    drug.name, rule.risk, patient.age_years
                ),
                recommendation:
                    "Use an age-appropriate alternative such as amoxicillin or azithromycin".into(),
                evidence: rule.evidence.clone(),
                source: rule.source.clone(),
                overridable: false,
                requires_justification: false,
            });
        }
    }

    if patient.age_years < PEDIATRIC_CAUTION_MAX_AGE {
        if let Some(rule) = tables
            .pediatric_caution_under_18
            .iter()
            .find(|r| r.selector.matches(drug))
        {
            return Some(ClinicalAlert {
                id: Uuid::new_v4(),
                category: AlertCategory::Major,
                kind: AlertKind::Contraindication,
                title: format!("{} requires caution under 18 years", drug.name),
                message: format!(
                    "{} carries a risk of {} in a {:.0}-year-old",
                    drug.name, rule.risk, patient.age_years
                ),
                recommendation: "Prefer a non-fluoroquinolone agent unless no alternative exists"
                    .into(),
                evidence: rule.evidence.clone(),
                source: rule.source.clone(),
                overridable: true,
                requires_justification: false,
            });
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Renal function
// ---------------------------------------------------------------------------

/// Renal-function gating on estimated GFR: a severe avoid tier and a
/// monitoring tier.
pub fn check_renal(
    drug: &DrugProfile,
    patient: &PatientContext,
    tables: &ReferenceTables,
) -> Option<ClinicalAlert> {
    let egfr = estimate_egfr(patient.creatinine_mg_dl, patient.age_years, &patient.sex);

    if egfr < EGFR_AVOID_THRESHOLD {
        if let Some(rule) = tables
            .renal_avoid_severe
            .iter()
            .find(|r| r.selector.matches(drug))
        {
            return Some(ClinicalAlert {
                id: Uuid::new_v4(),
                category: AlertCategory::Critical,
                kind: AlertKind::Contraindication,
                title: format!("{} should be avoided in severe renal impairment", drug.name),
                message: format!("estimated GFR is {egfr:.0} mL/min: {}", rule.guidance),
                recommendation:
                    "Select an agent without severe-renal restrictions or involve nephrology"
                        .into(),
                evidence: rule.evidence.clone(),
                source: rule.source.clone(),
                // Stays overridable even though Critical; blocking is decided
                // by category alone.
                overridable: true,
                requires_justification: false,
            });
        }
    }

    // The monitoring tier has no lower bound: a level-monitored drug in
    // severe impairment still needs the dosing alert when it misses the
    // avoid list above.
    if egfr < EGFR_MONITOR_THRESHOLD {
        if let Some(rule) = tables
            .renal_monitor_moderate
            .iter()
            .find(|r| r.selector.matches(drug))
        {
            return Some(ClinicalAlert {
                id: Uuid::new_v4(),
                category: AlertCategory::Major,
                kind: AlertKind::Dosing,
                title: format!("{} needs renal dose adjustment", drug.name),
                message: format!("estimated GFR is {egfr:.0} mL/min: {}", rule.guidance),
                recommendation: "Adjust dose or interval; follow levels and creatinine".into(),
                evidence: rule.evidence.clone(),
                source: rule.source.clone(),
                overridable: false,
                requires_justification: false,
            });
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Allergy cross-reactivity
// ---------------------------------------------------------------------------

/// Declared allergy classes tested against the cross-reactivity table.
/// Multiple declared classes may each contribute an alert.
pub fn check_allergy(
    drug: &DrugProfile,
    patient: &PatientContext,
    tables: &ReferenceTables,
) -> Vec<ClinicalAlert> {
    let mut alerts = Vec::new();

    for rule in &tables.cross_reactivity {
        if !patient.has_allergy(&rule.allergy_class) {
            continue;
        }
        if rule.cross_reactive.iter().any(|s| s.matches(drug)) {
            alerts.push(ClinicalAlert {
                id: Uuid::new_v4(),
                category: AlertCategory::Critical,
                kind: AlertKind::Allergy,
                title: format!(
                    "{} conflicts with the declared {} allergy",
                    drug.name, rule.allergy_class
                ),
                message: format!(
                    "{} ({} class) is cross-reactive with the patient's declared {} allergy",
                    drug.name,
                    drug.class.as_str(),
                    rule.allergy_class
                ),
                recommendation: format!(
                    "Use a non-cross-reactive alternative: {}",
                    rule.safe_alternatives.join(", ")
                ),
                evidence: rule.note.clone(),
                source: rule.source.clone(),
                overridable: false,
                requires_justification: true,
            });
        }
    }

    alerts
}

// ---------------------------------------------------------------------------
// Drug–drug interactions
// ---------------------------------------------------------------------------

/// Every current medication is tested against the interaction table; the
/// record's mechanism, effect, and management are carried verbatim.
pub fn check_interactions(
    drug: &DrugProfile,
    current_medications: &[String],
    tables: &ReferenceTables,
) -> Vec<ClinicalAlert> {
    let mut alerts = Vec::new();

    for medication in current_medications {
        for record in tables.interactions_between(drug, medication) {
            let category = match record.severity {
                InteractionSeverity::Major => AlertCategory::Major,
                InteractionSeverity::Moderate => AlertCategory::Moderate,
            };
            alerts.push(ClinicalAlert {
                id: Uuid::new_v4(),
                category,
                kind: AlertKind::Interaction,
                title: format!("{} interacts with {}", drug.name, medication.trim()),
                message: format!(
                    "{} (onset {}): {}",
                    record.mechanism, record.onset, record.clinical_effect
                ),
                recommendation: record.management.clone(),
                evidence: record.evidence.clone(),
                source: record.source.clone(),
                overridable: true,
                requires_justification: false,
            });
        }
    }

    alerts
}

// ---------------------------------------------------------------------------
// Resistance patterns
// ---------------------------------------------------------------------------

/// Declared resistance patterns tested against the drug classes those
/// organisms defeat.
pub fn check_resistance(
    drug: &DrugProfile,
    patient: &PatientContext,
    tables: &ReferenceTables,
) -> Vec<ClinicalAlert> {
    let mut alerts = Vec::new();

    for rule in &tables.resistance {
        if !patient.has_resistance(&rule.pattern) {
            continue;
        }
        if rule.ineffective.iter().any(|s| s.matches(drug)) {
            alerts.push(ClinicalAlert {
                id: Uuid::new_v4(),
                category: AlertCategory::Major,
                kind: AlertKind::Resistance,
                title: format!(
                    "{} is likely ineffective against {}",
                    drug.name,
                    rule.pattern.to_uppercase()
                ),
                message: format!(
                    "the declared {} pattern defeats {} ({} class)",
                    rule.pattern.to_uppercase(),
                    drug.name,
                    drug.class.as_str()
                ),
                recommendation: format!(
                    "Use an agent with retained activity: {}",
                    rule.alternatives.join(", ")
                ),
                evidence: rule.note.clone(),
                source: rule.source.clone(),
                overridable: true,
                requires_justification: false,
            });
        }
    }

    alerts
}

// ---------------------------------------------------------------------------
// Weight-based dosing
// ---------------------------------------------------------------------------

/// Heavy patients on weight-sensitive antibiotics get an actual-body-weight
/// dosing reminder. Skipped entirely when weight was not supplied.
pub fn check_dosing(
    drug: &DrugProfile,
    patient: &PatientContext,
    tables: &ReferenceTables,
) -> Option<ClinicalAlert> {
    let weight = patient.weight_kg?;
    if weight <= WEIGHT_DOSING_THRESHOLD_KG {
        return None;
    }

    tables
        .weight_dosing
        .iter()
        .find(|r| r.selector.matches(drug))
        .map(|rule| ClinicalAlert {
            id: Uuid::new_v4(),
            category: AlertCategory::Moderate,
            kind: AlertKind::Dosing,
            title: format!("Weight-based dosing required for {}", drug.name),
            message: format!(
                "patient weight {weight:.0} kg exceeds standard-dose assumptions: {}",
                rule.guidance
            ),
            recommendation: "Calculate the dose on actual body weight".into(),
            evidence: "standard dosing assumes weight at or below 100 kg".into(),
            source: rule.source.clone(),
            overridable: false,
            requires_justification: false,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::drugs::resolve_drug;
    use crate::types::{CareSetting, Severity, Sex};

    fn tables() -> ReferenceTables {
        ReferenceTables::builtin()
    }

    fn adult_patient() -> PatientContext {
        PatientContext {
            age_years: 35.0,
            weight_kg: Some(70.0),
            height_cm: None,
            sex: Sex::Male,
            pregnant: false,
            creatinine_mg_dl: 1.0,
            immunosuppressed: false,
            allergies: BTreeMap::new(),
            resistances: BTreeMap::new(),
            severity: Severity::Moderate,
            setting: CareSetting::Outpatient,
        }
    }

    fn pregnant_patient() -> PatientContext {
        let mut p = adult_patient();
        p.sex = Sex::Female;
        p.pregnant = true;
        p.age_years = 28.0;
        p
    }

    // --- Pregnancy ---

    #[test]
    fn pregnancy_absolute_blocks_doxycycline() {
        let alert = check_pregnancy(&resolve_drug("doxycycline"), &pregnant_patient(), &tables())
            .unwrap();
        assert_eq!(alert.category, AlertCategory::Critical);
        assert_eq!(alert.kind, AlertKind::Contraindication);
        assert!(!alert.overridable);
    }

    #[test]
    fn pregnancy_relative_is_major_and_overridable() {
        let drug = resolve_drug("trimethoprim-sulfamethoxazole");
        let alert = check_pregnancy(&drug, &pregnant_patient(), &tables()).unwrap();
        assert_eq!(alert.category, AlertCategory::Major);
        assert!(alert.overridable);
    }

    #[test]
    fn pregnancy_skipped_for_non_pregnant_patient() {
        let alert = check_pregnancy(&resolve_drug("doxycycline"), &adult_patient(), &tables());
        assert!(alert.is_none());
    }

    #[test]
    fn pregnancy_safe_drug_passes() {
        let alert = check_pregnancy(&resolve_drug("amoxicillin"), &pregnant_patient(), &tables());
        assert!(alert.is_none());
    }

    // --- Pediatric ---

    #[test]
    fn tetracycline_critical_under_8() {
        let mut patient = adult_patient();
        patient.age_years = 6.0;
        let alert = check_pediatric(&resolve_drug("doxycycline"), &patient, &tables()).unwrap();
        assert_eq!(alert.category, AlertCategory::Critical);
        assert!(!alert.overridable);
    }

    #[test]
    fn tetracycline_clear_over_8() {
        let mut patient = adult_patient();
        patient.age_years = 10.0;
        assert!(check_pediatric(&resolve_drug("doxycycline"), &patient, &tables()).is_none());
    }

    #[test]
    fn fluoroquinolone_major_under_18() {
        let mut patient = adult_patient();
        patient.age_years = 15.0;
        let alert = check_pediatric(&resolve_drug("ciprofloxacin"), &patient, &tables()).unwrap();
        assert_eq!(alert.category, AlertCategory::Major);
        assert!(alert.overridable);
    }

    #[test]
    fn fluoroquinolone_clear_for_adults() {
        assert!(check_pediatric(&resolve_drug("ciprofloxacin"), &adult_patient(), &tables())
            .is_none());
    }

    // --- Renal ---

    #[test]
    fn severe_impairment_is_critical_yet_overridable() {
        let mut patient = adult_patient();
        patient.age_years = 80.0;
        patient.creatinine_mg_dl = 2.5; // eGFR ~23
        let alert = check_renal(&resolve_drug("nitrofurantoin"), &patient, &tables()).unwrap();
        assert_eq!(alert.category, AlertCategory::Critical);
        assert!(alert.overridable);
    }

    #[test]
    fn moderate_impairment_flags_vancomycin_dosing() {
        let mut patient = adult_patient();
        patient.age_years = 70.0;
        patient.creatinine_mg_dl = 1.6; // eGFR ~43
        let alert = check_renal(&resolve_drug("vancomycin"), &patient, &tables()).unwrap();
        assert_eq!(alert.category, AlertCategory::Major);
        assert_eq!(alert.kind, AlertKind::Dosing);
        assert!(!alert.overridable);
    }

    #[test]
    fn monitored_drug_still_flagged_in_severe_impairment() {
        let mut patient = adult_patient();
        patient.age_years = 80.0;
        patient.creatinine_mg_dl = 2.5; // eGFR ~23, below the avoid threshold
        let alert = check_renal(&resolve_drug("gentamicin"), &patient, &tables()).unwrap();
        assert_eq!(alert.category, AlertCategory::Major);
        assert_eq!(alert.kind, AlertKind::Dosing);
    }

    #[test]
    fn normal_function_passes() {
        assert!(check_renal(&resolve_drug("vancomycin"), &adult_patient(), &tables()).is_none());
    }

    // --- Allergy ---

    #[test]
    fn penicillin_allergy_blocks_amoxicillin() {
        let mut patient = adult_patient();
        patient.allergies.insert("penicillin".into(), true);
        let alerts = check_allergy(&resolve_drug("amoxicillin"), &patient, &tables());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category, AlertCategory::Critical);
        assert!(!alerts[0].overridable);
        assert!(alerts[0].requires_justification);
        assert!(alerts[0].recommendation.contains("azithromycin"));
    }

    #[test]
    fn penicillin_allergy_reaches_cephalosporins() {
        let mut patient = adult_patient();
        patient.allergies.insert("penicillin".into(), true);
        let alerts = check_allergy(&resolve_drug("cephalexin"), &patient, &tables());
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn declared_false_allergy_is_ignored() {
        let mut patient = adult_patient();
        patient.allergies.insert("penicillin".into(), false);
        assert!(check_allergy(&resolve_drug("amoxicillin"), &patient, &tables()).is_empty());
    }

    #[test]
    fn multiple_allergy_classes_stack() {
        let mut patient = adult_patient();
        patient.allergies.insert("penicillin".into(), true);
        patient.allergies.insert("cephalosporin".into(), true);
        let alerts = check_allergy(&resolve_drug("ceftriaxone"), &patient, &tables());
        assert_eq!(alerts.len(), 2);
    }

    // --- Interactions ---

    #[test]
    fn ciprofloxacin_warfarin_is_major_with_inr_guidance() {
        let alerts = check_interactions(
            &resolve_drug("ciprofloxacin"),
            &["warfarin".to_string()],
            &tables(),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category, AlertCategory::Major);
        assert!(alerts[0].message.contains("bleeding"));
        assert!(alerts[0].recommendation.contains("INR"));
    }

    #[test]
    fn interaction_matches_free_text_medication_entries() {
        let alerts = check_interactions(
            &resolve_drug("ciprofloxacin"),
            &["Warfarin 5mg daily".to_string()],
            &tables(),
        );
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn no_interaction_for_clean_medication_list() {
        let alerts = check_interactions(
            &resolve_drug("amoxicillin"),
            &["lisinopril".to_string(), "metformin".to_string()],
            &tables(),
        );
        assert!(alerts.is_empty());
    }

    // --- Resistance ---

    #[test]
    fn mrsa_defeats_beta_lactams() {
        let mut patient = adult_patient();
        patient.resistances.insert("mrsa".into(), true);
        let alerts = check_resistance(&resolve_drug("cephalexin"), &patient, &tables());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category, AlertCategory::Major);
        assert!(alerts[0].overridable);
        assert!(alerts[0].recommendation.contains("vancomycin"));
    }

    #[test]
    fn vre_defeats_vancomycin() {
        let mut patient = adult_patient();
        patient.resistances.insert("vre".into(), true);
        let alerts = check_resistance(&resolve_drug("vancomycin"), &patient, &tables());
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].recommendation.contains("linezolid"));
    }

    #[test]
    fn resistance_irrelevant_to_unaffected_class() {
        let mut patient = adult_patient();
        patient.resistances.insert("mrsa".into(), true);
        assert!(check_resistance(&resolve_drug("vancomycin"), &patient, &tables()).is_empty());
    }

    // --- Dosing ---

    #[test]
    fn heavy_patient_on_vancomycin_gets_weight_alert() {
        let mut patient = adult_patient();
        patient.weight_kg = Some(120.0);
        let alert = check_dosing(&resolve_drug("vancomycin"), &patient, &tables()).unwrap();
        assert_eq!(alert.category, AlertCategory::Moderate);
        assert!(!alert.overridable);
    }

    #[test]
    fn threshold_weight_is_not_flagged() {
        let mut patient = adult_patient();
        patient.weight_kg = Some(100.0);
        assert!(check_dosing(&resolve_drug("vancomycin"), &patient, &tables()).is_none());
    }

    #[test]
    fn missing_weight_skips_the_check() {
        let mut patient = adult_patient();
        patient.weight_kg = None;
        assert!(check_dosing(&resolve_drug("vancomycin"), &patient, &tables()).is_none());
    }
}
