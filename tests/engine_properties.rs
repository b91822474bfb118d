//! Property checks over the validation engine: structural invariants of
//! the verdict and stability of repeated runs (alert ids aside, the same
//! input always yields the same output).

use std::collections::BTreeSet;
use std::sync::LazyLock;

use proptest::prelude::*;

use abxguard::{
    AlertCategory, AlertKind, CareSetting, ClinicalAlert, PatientContext, Severity, Sex,
    StewardshipEngine, ValidationResult,
};

static ENGINE: LazyLock<StewardshipEngine> =
    LazyLock::new(StewardshipEngine::with_builtin_rules);

const ANTIBIOTICS: &[&str] = &[
    "amoxicillin",
    "cephalexin",
    "ceftriaxone",
    "meropenem",
    "ciprofloxacin",
    "levofloxacin",
    "doxycycline",
    "azithromycin",
    "clarithromycin",
    "trimethoprim-sulfamethoxazole",
    "gentamicin",
    "vancomycin",
    "daptomycin",
    "linezolid",
    "nitrofurantoin",
    "clindamycin",
    "metronidazole",
];

const ALLERGY_CLASSES: &[&str] = &["penicillin", "cephalosporin", "sulfa"];
const RESISTANCE_PATTERNS: &[&str] = &["mrsa", "esbl", "vre"];
const MEDICATIONS: &[&str] = &[
    "warfarin",
    "simvastatin",
    "methotrexate",
    "theophylline",
    "sertraline",
    "lisinopril",
];

const CONDITIONS: &[&str] = &[
    "pneumonia",
    "uti",
    "cellulitis",
    "strep throat",
    "ear infection",
];

fn patient_strategy() -> impl Strategy<Value = PatientContext> {
    (
        0.5f64..95.0,
        prop::option::of(40.0f64..160.0),
        any::<bool>(),
        any::<bool>(),
        0.4f64..6.0,
        prop::collection::btree_set(prop::sample::select(ALLERGY_CLASSES), 0..3),
        prop::collection::btree_set(prop::sample::select(RESISTANCE_PATTERNS), 0..3),
    )
        .prop_map(
            |(age, weight, female, pregnant, creatinine, allergies, resistances)| {
                PatientContext {
                    age_years: age,
                    weight_kg: weight,
                    height_cm: None,
                    sex: if female { Sex::Female } else { Sex::Male },
                    pregnant: female && pregnant && age >= 12.0,
                    creatinine_mg_dl: creatinine,
                    immunosuppressed: false,
                    allergies: allergies.into_iter().map(|a| (a.to_string(), true)).collect(),
                    resistances: resistances
                        .into_iter()
                        .map(|r| (r.to_string(), true))
                        .collect(),
                    severity: Severity::Moderate,
                    setting: CareSetting::Outpatient,
                }
            },
        )
}

fn medication_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(MEDICATIONS).prop_map(str::to_string),
        0..3,
    )
}

/// Everything that identifies an alert except its generated id.
fn fingerprint(result: &ValidationResult) -> Vec<(AlertCategory, AlertKind, String, String)> {
    result
        .alerts
        .iter()
        .map(|a: &ClinicalAlert| {
            (
                a.category.clone(),
                a.kind.clone(),
                a.title.clone(),
                a.message.clone(),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn verdict_structure_holds(
        patient in patient_strategy(),
        antibiotic in prop::sample::select(ANTIBIOTICS),
        meds in medication_strategy(),
    ) {
        let result = ENGINE.validate(antibiotic, &patient, &meds);

        prop_assert!(result.confidence_score <= 100);
        prop_assert_eq!(result.is_valid, result.blocking_issues.is_empty());

        let ids: BTreeSet<_> = result.alerts.iter().map(|a| a.id).collect();
        for blocking in &result.blocking_issues {
            prop_assert_eq!(&blocking.category, &AlertCategory::Critical);
            prop_assert!(ids.contains(&blocking.id), "blocking issue missing from alerts");
        }

        if result.alerts.iter().any(|a| a.category >= AlertCategory::Major) {
            prop_assert!(result.requires_review);
        }
        if result.confidence_score < 70 {
            prop_assert!(result.requires_review);
        }
        if result.alerts.is_empty() {
            prop_assert_eq!(result.confidence_score, 100);
            prop_assert!(result.is_valid);
            prop_assert!(!result.requires_review);
        }
    }

    #[test]
    fn repeated_validation_is_stable(
        patient in patient_strategy(),
        antibiotic in prop::sample::select(ANTIBIOTICS),
        meds in medication_strategy(),
    ) {
        let first = ENGINE.validate(antibiotic, &patient, &meds);
        let second = ENGINE.validate(antibiotic, &patient, &meds);

        prop_assert_eq!(fingerprint(&first), fingerprint(&second));
        prop_assert_eq!(first.confidence_score, second.confidence_score);
        prop_assert_eq!(first.is_valid, second.is_valid);
        prop_assert_eq!(first.requires_review, second.requires_review);
        prop_assert_eq!(first.blocking_issues.len(), second.blocking_issues.len());
    }

    #[test]
    fn known_conditions_always_resolve(
        patient in patient_strategy(),
        condition in prop::sample::select(CONDITIONS),
    ) {
        // The tiered fallback guarantees an answer for every condition the
        // repository knows, whatever the patient looks like.
        let combined = ENGINE.combined_recommendations(condition, &patient);
        prop_assert!(combined.is_some());

        let combined = combined.unwrap();
        prop_assert!(!combined.primary.is_empty());
        prop_assert!(combined.evidence_summary.ends_with('.'));
    }

    #[test]
    fn recommendation_lookup_is_stable(
        patient in patient_strategy(),
        condition in prop::sample::select(CONDITIONS),
    ) {
        let first = ENGINE.combined_recommendations(condition, &patient).unwrap();
        let second = ENGINE.combined_recommendations(condition, &patient).unwrap();

        prop_assert_eq!(first.evidence_summary, second.evidence_summary);
        prop_assert_eq!(first.primary.len(), second.primary.len());
        prop_assert_eq!(first.alternative.len(), second.alternative.len());
        prop_assert_eq!(first.guideline_consensus, second.guideline_consensus);
    }
}
