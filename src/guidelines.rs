use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::recommend::EvidenceGrade;
use crate::types::{
    CareSetting, EngineError, EvidenceQuality, EvidenceSource, PatientType, Severity,
};

// ---------------------------------------------------------------------------
// Evidence model
// ---------------------------------------------------------------------------

/// Dosing guidance attached to an evidence item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DosingGuidance {
    pub adult: String,
    pub pediatric: Option<String>,
    pub renal_adjustment: String,
    pub hepatic_adjustment: Option<String>,
}

/// One recommendation taken from a published guideline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalEvidence {
    pub guideline: String,
    pub recommendation: String,
    pub strength_of_evidence: EvidenceGrade,
    pub quality_of_evidence: EvidenceQuality,
    pub last_updated: NaiveDate,
    pub source: EvidenceSource,
    pub dosing: DosingGuidance,
    pub duration: String,
    pub monitoring: Vec<String>,
}

/// Treatment options for one condition in a specific patient/severity/
/// setting slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalScenario {
    pub condition: String,
    pub patient_type: PatientType,
    pub severity: Severity,
    pub setting: CareSetting,
    pub first_line: Vec<ClinicalEvidence>,
    pub second_line: Vec<ClinicalEvidence>,
    pub alternatives: Vec<ClinicalEvidence>,
    pub contraindications: Vec<String>,
    pub special_considerations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Condition normalization
// ---------------------------------------------------------------------------

/// Keyword patterns mapped to canonical condition keys, checked in order
/// with first hit winning.
const CONDITION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "community_acquired_pneumonia",
        &["pneumonia", "lung infection", "respiratory infection", "cap"],
    ),
    (
        "urinary_tract_infection",
        &["uti", "urinary", "bladder", "cystitis", "pyelonephritis"],
    ),
    (
        "skin_soft_tissue_infection",
        &["cellulitis", "skin", "soft tissue", "abscess", "wound"],
    ),
    (
        "streptococcal_pharyngitis",
        &["pharyngitis", "strep throat", "sore throat", "throat"],
    ),
    ("acute_otitis_media", &["otitis", "ear infection"]),
];

/// Normalize a free-text condition to a canonical key. Unknown text maps to
/// `None`; there is no fuzzy matching beyond substring containment.
pub fn normalize_condition(condition: &str) -> Option<&'static str> {
    let needle = condition.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    CONDITION_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| needle.contains(w)))
        .map(|(key, _)| *key)
}

// ---------------------------------------------------------------------------
// GuidelineRepository
// ---------------------------------------------------------------------------

/// Scenario table keyed by canonical condition. Built once and never
/// mutated; `from_json_str` lets deployments carry their own guideline set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidelineRepository {
    pub scenarios: BTreeMap<String, Vec<ClinicalScenario>>,
}

impl GuidelineRepository {
    /// Parse a scenario table from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| {
            EngineError::ReferenceDataParse("guideline_repository".into(), e.to_string())
        })
    }

    /// Canonical condition keys with at least one scenario.
    pub fn conditions(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    /// Three-tier scenario lookup: exact `(patient_type, severity, setting)`
    /// match, then first scenario with matching severity, then the first
    /// scenario registered for the condition. Never `None` once the
    /// condition itself resolves.
    pub fn find_scenario(
        &self,
        condition: &str,
        patient_type: &PatientType,
        severity: &Severity,
        setting: &CareSetting,
    ) -> Option<&ClinicalScenario> {
        let key = normalize_condition(condition)?;
        let scenarios = self.scenarios.get(key)?;

        if let Some(exact) = scenarios.iter().find(|s| {
            s.patient_type == *patient_type && s.severity == *severity && s.setting == *setting
        }) {
            return Some(exact);
        }

        tracing::debug!(
            condition = key,
            patient_type = patient_type.as_str(),
            severity = severity.as_str(),
            setting = setting.as_str(),
            "no exact scenario match; using fallback"
        );

        scenarios
            .iter()
            .find(|s| s.severity == *severity)
            .or_else(|| scenarios.first())
    }

    /// The built-in guideline set.
    pub fn builtin() -> Self {
        let mut scenarios: BTreeMap<String, Vec<ClinicalScenario>> = BTreeMap::new();

        scenarios.insert(
            "community_acquired_pneumonia".into(),
            vec![
                cap_adult_outpatient(),
                cap_adult_severe_inpatient(),
                cap_pediatric_outpatient(),
            ],
        );
        scenarios.insert(
            "urinary_tract_infection".into(),
            vec![
                uti_adult_outpatient(),
                uti_adult_severe_inpatient(),
                uti_pregnant_outpatient(),
            ],
        );
        scenarios.insert(
            "skin_soft_tissue_infection".into(),
            vec![ssti_adult_outpatient(), ssti_adult_severe_inpatient()],
        );
        scenarios.insert(
            "streptococcal_pharyngitis".into(),
            vec![strep_pediatric_outpatient(), strep_adult_outpatient()],
        );
        scenarios.insert("acute_otitis_media".into(), vec![aom_pediatric_outpatient()]);

        Self { scenarios }
    }
}

// Dates here are compiled-in literals; a bad one is a programming error.
fn updated(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid guideline date")
}

// ---------------------------------------------------------------------------
// Built-in scenarios
// ---------------------------------------------------------------------------

fn cap_adult_outpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "community_acquired_pneumonia".into(),
        patient_type: PatientType::Adult,
        severity: Severity::Moderate,
        setting: CareSetting::Outpatient,
        first_line: vec![
            ClinicalEvidence {
                guideline: "IDSA/ATS Community-Acquired Pneumonia 2019".into(),
                recommendation: "amoxicillin 1 g three times daily for previously healthy outpatients".into(),
                strength_of_evidence: EvidenceGrade::AI,
                quality_of_evidence: EvidenceQuality::High,
                last_updated: updated(2019, 10, 1),
                source: EvidenceSource::Idsa,
                dosing: DosingGuidance {
                    adult: "1 g orally three times daily".into(),
                    pediatric: Some("90 mg/kg/day divided twice daily".into()),
                    renal_adjustment: "reduce frequency when eGFR < 30 mL/min".into(),
                    hepatic_adjustment: None,
                },
                duration: "5 days, afebrile 48 hours before stopping".into(),
                monitoring: vec!["clinical response at 48-72 hours".into()],
            },
            ClinicalEvidence {
                guideline: "IDSA/ATS Community-Acquired Pneumonia 2019".into(),
                recommendation: "doxycycline 100 mg twice daily as an alternative first-line agent".into(),
                strength_of_evidence: EvidenceGrade::BII,
                quality_of_evidence: EvidenceQuality::Moderate,
                last_updated: updated(2019, 10, 1),
                source: EvidenceSource::Idsa,
                dosing: DosingGuidance {
                    adult: "100 mg orally twice daily".into(),
                    pediatric: None,
                    renal_adjustment: "no adjustment required".into(),
                    hepatic_adjustment: None,
                },
                duration: "5 days".into(),
                monitoring: vec!["photosensitivity counseling".into()],
            },
        ],
        second_line: vec![ClinicalEvidence {
            guideline: "IDSA/ATS Community-Acquired Pneumonia 2019".into(),
            recommendation: "azithromycin 500 mg day 1 then 250 mg daily where macrolide resistance is below 25%".into(),
            strength_of_evidence: EvidenceGrade::BI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2019, 10, 1),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "500 mg day 1, then 250 mg daily".into(),
                pediatric: Some("10 mg/kg day 1, then 5 mg/kg daily".into()),
                renal_adjustment: "no adjustment required".into(),
                hepatic_adjustment: Some("use with caution in severe hepatic impairment".into()),
            },
            duration: "5 days".into(),
            monitoring: vec!["QT interval in at-risk patients".into()],
        }],
        alternatives: vec![ClinicalEvidence {
            guideline: "IDSA/ATS Community-Acquired Pneumonia 2019".into(),
            recommendation: "levofloxacin 750 mg daily reserved for comorbidities or recent antibiotic exposure".into(),
            strength_of_evidence: EvidenceGrade::AII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2019, 10, 1),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "750 mg daily".into(),
                pediatric: None,
                renal_adjustment: "extend interval when eGFR < 50 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "5 days".into(),
            monitoring: vec!["tendinopathy warning".into()],
        }],
        contraindications: vec![
            "doxycycline in pregnancy".into(),
            "fluoroquinolones in patients under 18".into(),
        ],
        special_considerations: vec![
            "check local macrolide resistance before azithromycin monotherapy".into(),
        ],
    }
}

fn cap_adult_severe_inpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "community_acquired_pneumonia".into(),
        patient_type: PatientType::Adult,
        severity: Severity::Severe,
        setting: CareSetting::Inpatient,
        first_line: vec![ClinicalEvidence {
            guideline: "IDSA/ATS Community-Acquired Pneumonia 2019".into(),
            recommendation: "ceftriaxone 1-2 g IV daily plus azithromycin 500 mg IV daily".into(),
            strength_of_evidence: EvidenceGrade::AI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2019, 10, 1),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "ceftriaxone 1-2 g IV daily; azithromycin 500 mg IV daily".into(),
                pediatric: Some("ceftriaxone 50-75 mg/kg/day".into()),
                renal_adjustment: "no ceftriaxone adjustment required".into(),
                hepatic_adjustment: None,
            },
            duration: "7 days guided by clinical stability".into(),
            monitoring: vec![
                "blood cultures before first dose".into(),
                "de-escalate on culture results".into(),
            ],
        }],
        second_line: vec![ClinicalEvidence {
            guideline: "IDSA/ATS Community-Acquired Pneumonia 2019".into(),
            recommendation: "levofloxacin 750 mg IV daily as beta-lactam-sparing therapy".into(),
            strength_of_evidence: EvidenceGrade::AI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2019, 10, 1),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "750 mg IV daily".into(),
                pediatric: None,
                renal_adjustment: "extend interval when eGFR < 50 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "7 days".into(),
            monitoring: vec!["QT interval".into()],
        }],
        alternatives: vec![ClinicalEvidence {
            guideline: "IDSA/ATS Community-Acquired Pneumonia 2019".into(),
            recommendation: "add vancomycin when MRSA risk factors are present".into(),
            strength_of_evidence: EvidenceGrade::BII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2019, 10, 1),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "15-20 mg/kg IV every 8-12 hours".into(),
                pediatric: Some("15 mg/kg IV every 6 hours".into()),
                renal_adjustment: "dose by levels".into(),
                hepatic_adjustment: None,
            },
            duration: "per culture results".into(),
            monitoring: vec!["vancomycin troughs".into(), "creatinine".into()],
        }],
        contraindications: vec!["macrolide monotherapy in bacteremic pneumonia".into()],
        special_considerations: vec!["ICU admission criteria trigger combination therapy".into()],
    }
}

fn cap_pediatric_outpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "community_acquired_pneumonia".into(),
        patient_type: PatientType::Pediatric,
        severity: Severity::Mild,
        setting: CareSetting::Outpatient,
        first_line: vec![ClinicalEvidence {
            guideline: "IDSA Pediatric Community-Acquired Pneumonia 2011".into(),
            recommendation: "amoxicillin 90 mg/kg/day divided twice daily".into(),
            strength_of_evidence: EvidenceGrade::AI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2011, 8, 31),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "1 g three times daily".into(),
                pediatric: Some("90 mg/kg/day divided twice daily".into()),
                renal_adjustment: "reduce when eGFR < 30 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "5-7 days".into(),
            monitoring: vec!["reassess at 48 hours".into()],
        }],
        second_line: vec![ClinicalEvidence {
            guideline: "IDSA Pediatric Community-Acquired Pneumonia 2011".into(),
            recommendation: "azithromycin 10 mg/kg day 1 then 5 mg/kg daily for atypical coverage".into(),
            strength_of_evidence: EvidenceGrade::BII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2011, 8, 31),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "500 mg day 1, then 250 mg daily".into(),
                pediatric: Some("10 mg/kg day 1, then 5 mg/kg daily".into()),
                renal_adjustment: "no adjustment required".into(),
                hepatic_adjustment: None,
            },
            duration: "5 days".into(),
            monitoring: vec![],
        }],
        alternatives: vec![],
        contraindications: vec!["doxycycline under 8 years".into()],
        special_considerations: vec![
            "most mild pediatric pneumonia is viral; confirm bacterial features".into(),
        ],
    }
}

fn uti_adult_outpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "urinary_tract_infection".into(),
        patient_type: PatientType::Adult,
        severity: Severity::Mild,
        setting: CareSetting::Outpatient,
        first_line: vec![
            ClinicalEvidence {
                guideline: "IDSA Uncomplicated Cystitis and Pyelonephritis 2011".into(),
                recommendation: "nitrofurantoin 100 mg twice daily for 5 days".into(),
                strength_of_evidence: EvidenceGrade::AI,
                quality_of_evidence: EvidenceQuality::High,
                last_updated: updated(2011, 3, 1),
                source: EvidenceSource::Idsa,
                dosing: DosingGuidance {
                    adult: "100 mg twice daily".into(),
                    pediatric: None,
                    renal_adjustment: "avoid when eGFR < 30 mL/min".into(),
                    hepatic_adjustment: None,
                },
                duration: "5 days".into(),
                monitoring: vec![],
            },
            ClinicalEvidence {
                guideline: "IDSA Uncomplicated Cystitis and Pyelonephritis 2011".into(),
                recommendation: "trimethoprim-sulfamethoxazole DS twice daily for 3 days where resistance is below 20%".into(),
                strength_of_evidence: EvidenceGrade::AI,
                quality_of_evidence: EvidenceQuality::High,
                last_updated: updated(2011, 3, 1),
                source: EvidenceSource::Idsa,
                dosing: DosingGuidance {
                    adult: "one DS tablet twice daily".into(),
                    pediatric: None,
                    renal_adjustment: "half dose when eGFR 15-30 mL/min".into(),
                    hepatic_adjustment: None,
                },
                duration: "3 days".into(),
                monitoring: vec![],
            },
        ],
        second_line: vec![ClinicalEvidence {
            guideline: "IDSA Uncomplicated Cystitis and Pyelonephritis 2011".into(),
            recommendation: "fosfomycin 3 g single dose".into(),
            strength_of_evidence: EvidenceGrade::AI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2011, 3, 1),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "3 g sachet once".into(),
                pediatric: None,
                renal_adjustment: "no adjustment for single dose".into(),
                hepatic_adjustment: None,
            },
            duration: "single dose".into(),
            monitoring: vec![],
        }],
        alternatives: vec![ClinicalEvidence {
            guideline: "IDSA Uncomplicated Cystitis and Pyelonephritis 2011".into(),
            recommendation: "ciprofloxacin reserved for confirmed resistance to first-line agents".into(),
            strength_of_evidence: EvidenceGrade::BIII,
            quality_of_evidence: EvidenceQuality::Low,
            last_updated: updated(2011, 3, 1),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "250 mg twice daily".into(),
                pediatric: None,
                renal_adjustment: "reduce when eGFR < 30 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "3 days".into(),
            monitoring: vec![],
        }],
        contraindications: vec!["nitrofurantoin in severe renal impairment".into()],
        special_considerations: vec![
            "urine culture only for recurrent or complicated cases".into(),
        ],
    }
}

fn uti_adult_severe_inpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "urinary_tract_infection".into(),
        patient_type: PatientType::Adult,
        severity: Severity::Severe,
        setting: CareSetting::Inpatient,
        first_line: vec![ClinicalEvidence {
            guideline: "IDSA Uncomplicated Cystitis and Pyelonephritis 2011".into(),
            recommendation: "ceftriaxone 1 g IV daily pending urine and blood cultures".into(),
            strength_of_evidence: EvidenceGrade::AII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2011, 3, 1),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "1 g IV daily".into(),
                pediatric: Some("50 mg/kg/day".into()),
                renal_adjustment: "no adjustment required".into(),
                hepatic_adjustment: None,
            },
            duration: "10-14 days total, oral step-down included".into(),
            monitoring: vec!["culture sensitivities at 48 hours".into()],
        }],
        second_line: vec![ClinicalEvidence {
            guideline: "IDSA Uncomplicated Cystitis and Pyelonephritis 2011".into(),
            recommendation: "piperacillin-tazobactam 3.375 g IV every 6 hours for resistant gram-negative risk".into(),
            strength_of_evidence: EvidenceGrade::BII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2011, 3, 1),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "3.375 g IV every 6 hours".into(),
                pediatric: None,
                renal_adjustment: "extend interval when eGFR < 40 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "10-14 days".into(),
            monitoring: vec!["creatinine".into()],
        }],
        alternatives: vec![],
        contraindications: vec![],
        special_considerations: vec![
            "step down to oral therapy on clinical improvement".into(),
            "adjust to urine culture sensitivities".into(),
        ],
    }
}

fn uti_pregnant_outpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "urinary_tract_infection".into(),
        patient_type: PatientType::Pregnant,
        severity: Severity::Mild,
        setting: CareSetting::Outpatient,
        first_line: vec![ClinicalEvidence {
            guideline: "IDSA Uncomplicated Cystitis and Pyelonephritis 2011".into(),
            recommendation: "cephalexin 500 mg twice daily".into(),
            strength_of_evidence: EvidenceGrade::BII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2011, 3, 1),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "500 mg twice daily".into(),
                pediatric: None,
                renal_adjustment: "reduce when eGFR < 30 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "7 days".into(),
            monitoring: vec!["test-of-cure culture after treatment".into()],
        }],
        second_line: vec![ClinicalEvidence {
            guideline: "WHO Recommendations on Antenatal Care".into(),
            recommendation: "fosfomycin 3 g single dose".into(),
            strength_of_evidence: EvidenceGrade::BII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2016, 11, 28),
            source: EvidenceSource::Who,
            dosing: DosingGuidance {
                adult: "3 g sachet once".into(),
                pediatric: None,
                renal_adjustment: "no adjustment for single dose".into(),
                hepatic_adjustment: None,
            },
            duration: "single dose".into(),
            monitoring: vec![],
        }],
        alternatives: vec![],
        contraindications: vec![
            "nitrofurantoin at term".into(),
            "trimethoprim-sulfamethoxazole in the first trimester".into(),
        ],
        special_considerations: vec!["treat asymptomatic bacteriuria in pregnancy".into()],
    }
}

fn ssti_adult_outpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "skin_soft_tissue_infection".into(),
        patient_type: PatientType::Adult,
        severity: Severity::Mild,
        setting: CareSetting::Outpatient,
        first_line: vec![ClinicalEvidence {
            guideline: "IDSA Skin and Soft Tissue Infections 2014".into(),
            recommendation: "cephalexin 500 mg four times daily for nonpurulent cellulitis".into(),
            strength_of_evidence: EvidenceGrade::AII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2014, 6, 15),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "500 mg four times daily".into(),
                pediatric: Some("25-50 mg/kg/day divided four times daily".into()),
                renal_adjustment: "reduce when eGFR < 30 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "5 days, extend if slow response".into(),
            monitoring: vec!["mark borders to track spread".into()],
        }],
        second_line: vec![ClinicalEvidence {
            guideline: "IDSA Skin and Soft Tissue Infections 2014".into(),
            recommendation: "clindamycin 300-450 mg three times daily for beta-lactam allergy".into(),
            strength_of_evidence: EvidenceGrade::BII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2014, 6, 15),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "300-450 mg three times daily".into(),
                pediatric: Some("10-13 mg/kg every 8 hours".into()),
                renal_adjustment: "no adjustment required".into(),
                hepatic_adjustment: None,
            },
            duration: "5 days".into(),
            monitoring: vec!["diarrhea (C. difficile risk)".into()],
        }],
        alternatives: vec![ClinicalEvidence {
            guideline: "IDSA Skin and Soft Tissue Infections 2014".into(),
            recommendation: "trimethoprim-sulfamethoxazole DS twice daily when purulent (MRSA suspected)".into(),
            strength_of_evidence: EvidenceGrade::AI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2014, 6, 15),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "one DS tablet twice daily".into(),
                pediatric: None,
                renal_adjustment: "half dose when eGFR 15-30 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "5-7 days".into(),
            monitoring: vec![],
        }],
        contraindications: vec![],
        special_considerations: vec!["elevate the affected limb".into()],
    }
}

fn ssti_adult_severe_inpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "skin_soft_tissue_infection".into(),
        patient_type: PatientType::Adult,
        severity: Severity::Severe,
        setting: CareSetting::Inpatient,
        first_line: vec![ClinicalEvidence {
            guideline: "IDSA Skin and Soft Tissue Infections 2014".into(),
            recommendation: "vancomycin 15-20 mg/kg IV every 8-12 hours".into(),
            strength_of_evidence: EvidenceGrade::AI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2014, 6, 15),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "15-20 mg/kg IV every 8-12 hours".into(),
                pediatric: Some("15 mg/kg IV every 6 hours".into()),
                renal_adjustment: "dose by levels".into(),
                hepatic_adjustment: None,
            },
            duration: "7-14 days by response".into(),
            monitoring: vec!["vancomycin troughs".into(), "creatinine".into()],
        }],
        second_line: vec![ClinicalEvidence {
            guideline: "IDSA Skin and Soft Tissue Infections 2014".into(),
            recommendation: "linezolid 600 mg every 12 hours".into(),
            strength_of_evidence: EvidenceGrade::AI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2014, 6, 15),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "600 mg IV or orally every 12 hours".into(),
                pediatric: Some("10 mg/kg every 8 hours".into()),
                renal_adjustment: "no adjustment required".into(),
                hepatic_adjustment: None,
            },
            duration: "7-14 days".into(),
            monitoring: vec!["weekly CBC on prolonged courses".into()],
        }],
        alternatives: vec![ClinicalEvidence {
            guideline: "IDSA Skin and Soft Tissue Infections 2014".into(),
            recommendation: "daptomycin 4-6 mg/kg IV daily".into(),
            strength_of_evidence: EvidenceGrade::AI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2014, 6, 15),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "4-6 mg/kg IV daily".into(),
                pediatric: None,
                renal_adjustment: "dose every 48 hours when eGFR < 30 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "7-14 days".into(),
            monitoring: vec!["weekly creatine kinase".into()],
        }],
        contraindications: vec!["daptomycin in pneumonia (inactivated by surfactant)".into()],
        special_considerations: vec![
            "surgical source control for abscess or necrotizing features".into(),
        ],
    }
}

fn strep_pediatric_outpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "streptococcal_pharyngitis".into(),
        patient_type: PatientType::Pediatric,
        severity: Severity::Mild,
        setting: CareSetting::Outpatient,
        first_line: vec![
            ClinicalEvidence {
                guideline: "IDSA Group A Streptococcal Pharyngitis 2012".into(),
                recommendation: "penicillin V 250 mg two to three times daily for 10 days".into(),
                strength_of_evidence: EvidenceGrade::AI,
                quality_of_evidence: EvidenceQuality::High,
                last_updated: updated(2012, 9, 9),
                source: EvidenceSource::Idsa,
                dosing: DosingGuidance {
                    adult: "500 mg twice daily".into(),
                    pediatric: Some("250 mg two to three times daily".into()),
                    renal_adjustment: "no adjustment required".into(),
                    hepatic_adjustment: None,
                },
                duration: "10 days".into(),
                monitoring: vec![],
            },
            ClinicalEvidence {
                guideline: "IDSA Group A Streptococcal Pharyngitis 2012".into(),
                recommendation: "amoxicillin 50 mg/kg once daily for 10 days".into(),
                strength_of_evidence: EvidenceGrade::AI,
                quality_of_evidence: EvidenceQuality::High,
                last_updated: updated(2012, 9, 9),
                source: EvidenceSource::Idsa,
                dosing: DosingGuidance {
                    adult: "500 mg twice daily".into(),
                    pediatric: Some("50 mg/kg once daily, max 1 g".into()),
                    renal_adjustment: "reduce when eGFR < 30 mL/min".into(),
                    hepatic_adjustment: None,
                },
                duration: "10 days".into(),
                monitoring: vec![],
            },
        ],
        second_line: vec![ClinicalEvidence {
            guideline: "IDSA Group A Streptococcal Pharyngitis 2012".into(),
            recommendation: "azithromycin 12 mg/kg daily for 5 days for penicillin allergy".into(),
            strength_of_evidence: EvidenceGrade::BII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2012, 9, 9),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "500 mg day 1, then 250 mg daily".into(),
                pediatric: Some("12 mg/kg daily, max 500 mg".into()),
                renal_adjustment: "no adjustment required".into(),
                hepatic_adjustment: None,
            },
            duration: "5 days".into(),
            monitoring: vec![],
        }],
        alternatives: vec![ClinicalEvidence {
            guideline: "IDSA Group A Streptococcal Pharyngitis 2012".into(),
            recommendation: "cephalexin 20 mg/kg twice daily for non-anaphylactic penicillin allergy".into(),
            strength_of_evidence: EvidenceGrade::BII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2012, 9, 9),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "500 mg twice daily".into(),
                pediatric: Some("20 mg/kg twice daily, max 500 mg per dose".into()),
                renal_adjustment: "reduce when eGFR < 30 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "10 days".into(),
            monitoring: vec![],
        }],
        contraindications: vec![],
        special_considerations: vec![
            "confirm with rapid antigen test or culture before treating".into(),
        ],
    }
}

fn strep_adult_outpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "streptococcal_pharyngitis".into(),
        patient_type: PatientType::Adult,
        severity: Severity::Mild,
        setting: CareSetting::Outpatient,
        first_line: vec![
            ClinicalEvidence {
                guideline: "IDSA Group A Streptococcal Pharyngitis 2012".into(),
                recommendation: "penicillin V 500 mg twice daily for 10 days".into(),
                strength_of_evidence: EvidenceGrade::AI,
                quality_of_evidence: EvidenceQuality::High,
                last_updated: updated(2012, 9, 9),
                source: EvidenceSource::Idsa,
                dosing: DosingGuidance {
                    adult: "500 mg twice daily".into(),
                    pediatric: None,
                    renal_adjustment: "no adjustment required".into(),
                    hepatic_adjustment: None,
                },
                duration: "10 days".into(),
                monitoring: vec![],
            },
            ClinicalEvidence {
                guideline: "IDSA Group A Streptococcal Pharyngitis 2012".into(),
                recommendation: "penicillin G benzathine 1.2 million units single IM dose for adherence concerns".into(),
                strength_of_evidence: EvidenceGrade::AI,
                quality_of_evidence: EvidenceQuality::High,
                last_updated: updated(2012, 9, 9),
                source: EvidenceSource::Idsa,
                dosing: DosingGuidance {
                    adult: "1.2 million units IM once".into(),
                    pediatric: None,
                    renal_adjustment: "no adjustment required".into(),
                    hepatic_adjustment: None,
                },
                duration: "single dose".into(),
                monitoring: vec![],
            },
        ],
        second_line: vec![ClinicalEvidence {
            guideline: "IDSA Group A Streptococcal Pharyngitis 2012".into(),
            recommendation: "azithromycin 500 mg day 1 then 250 mg daily for penicillin allergy".into(),
            strength_of_evidence: EvidenceGrade::BII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2012, 9, 9),
            source: EvidenceSource::Idsa,
            dosing: DosingGuidance {
                adult: "500 mg day 1, then 250 mg daily".into(),
                pediatric: None,
                renal_adjustment: "no adjustment required".into(),
                hepatic_adjustment: None,
            },
            duration: "5 days".into(),
            monitoring: vec![],
        }],
        alternatives: vec![],
        contraindications: vec![],
        special_considerations: vec!["no routine test of cure needed".into()],
    }
}

fn aom_pediatric_outpatient() -> ClinicalScenario {
    ClinicalScenario {
        condition: "acute_otitis_media".into(),
        patient_type: PatientType::Pediatric,
        severity: Severity::Mild,
        setting: CareSetting::Outpatient,
        first_line: vec![ClinicalEvidence {
            guideline: "AAP Acute Otitis Media 2013".into(),
            recommendation: "amoxicillin 80-90 mg/kg/day divided twice daily".into(),
            strength_of_evidence: EvidenceGrade::AI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2013, 2, 25),
            source: EvidenceSource::Cdc,
            dosing: DosingGuidance {
                adult: "500 mg three times daily".into(),
                pediatric: Some("80-90 mg/kg/day divided twice daily".into()),
                renal_adjustment: "reduce when eGFR < 30 mL/min".into(),
                hepatic_adjustment: None,
            },
            duration: "10 days under 2 years; 5-7 days otherwise".into(),
            monitoring: vec!["reassess if no improvement at 48-72 hours".into()],
        }],
        second_line: vec![ClinicalEvidence {
            guideline: "AAP Acute Otitis Media 2013".into(),
            recommendation: "amoxicillin-clavulanate 90 mg/kg/day when amoxicillin was given in the last 30 days".into(),
            strength_of_evidence: EvidenceGrade::BI,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: updated(2013, 2, 25),
            source: EvidenceSource::Cdc,
            dosing: DosingGuidance {
                adult: "875/125 mg twice daily".into(),
                pediatric: Some("90 mg/kg/day divided twice daily".into()),
                renal_adjustment: "reduce when eGFR < 30 mL/min".into(),
                hepatic_adjustment: Some("avoid with prior clavulanate hepatotoxicity".into()),
            },
            duration: "10 days".into(),
            monitoring: vec![],
        }],
        alternatives: vec![ClinicalEvidence {
            guideline: "AAP Acute Otitis Media 2013".into(),
            recommendation: "ceftriaxone 50 mg/kg IM daily for 1-3 days when oral intake fails".into(),
            strength_of_evidence: EvidenceGrade::BII,
            quality_of_evidence: EvidenceQuality::Moderate,
            last_updated: updated(2013, 2, 25),
            source: EvidenceSource::Cdc,
            dosing: DosingGuidance {
                adult: "1 g IM daily".into(),
                pediatric: Some("50 mg/kg IM daily".into()),
                renal_adjustment: "no adjustment required".into(),
                hepatic_adjustment: None,
            },
            duration: "1-3 days".into(),
            monitoring: vec![],
        }],
        contraindications: vec![],
        special_considerations: vec![
            "observation without antibiotics is an option for mild unilateral disease over 2 years".into(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_expected_conditions() {
        let repo = GuidelineRepository::builtin();
        let conditions: Vec<&str> = repo.conditions().collect();
        for key in [
            "acute_otitis_media",
            "community_acquired_pneumonia",
            "skin_soft_tissue_infection",
            "streptococcal_pharyngitis",
            "urinary_tract_infection",
        ] {
            assert!(conditions.contains(&key), "missing {key}");
        }
    }

    #[test]
    #[should_panic(expected = "valid guideline date")]
    fn bad_guideline_date_fails_loudly() {
        updated(2024, 13, 1);
    }

    #[test]
    fn condition_normalization() {
        assert_eq!(
            normalize_condition("Community-Acquired Pneumonia"),
            Some("community_acquired_pneumonia")
        );
        assert_eq!(
            normalize_condition("lower lung infection"),
            Some("community_acquired_pneumonia")
        );
        assert_eq!(normalize_condition("UTI"), Some("urinary_tract_infection"));
        assert_eq!(
            normalize_condition("left leg cellulitis"),
            Some("skin_soft_tissue_infection")
        );
        assert_eq!(normalize_condition("diabetes"), None);
        assert_eq!(normalize_condition(""), None);
    }

    #[test]
    fn exact_match_wins() {
        let repo = GuidelineRepository::builtin();
        let scenario = repo
            .find_scenario(
                "pneumonia",
                &PatientType::Adult,
                &Severity::Severe,
                &CareSetting::Inpatient,
            )
            .unwrap();
        assert_eq!(scenario.patient_type, PatientType::Adult);
        assert_eq!(scenario.severity, Severity::Severe);
        assert_eq!(scenario.setting, CareSetting::Inpatient);
    }

    #[test]
    fn severity_fallback_when_no_exact_match() {
        let repo = GuidelineRepository::builtin();
        // No pediatric/severe/emergency scenario exists; the severe adult
        // inpatient one is the severity-tier fallback.
        let scenario = repo
            .find_scenario(
                "pneumonia",
                &PatientType::Pediatric,
                &Severity::Severe,
                &CareSetting::Emergency,
            )
            .unwrap();
        assert_eq!(scenario.severity, Severity::Severe);
    }

    #[test]
    fn first_scenario_fallback_when_severity_unmatched() {
        let repo = GuidelineRepository::builtin();
        let scenario = repo
            .find_scenario(
                "ear infection",
                &PatientType::Adult,
                &Severity::Severe,
                &CareSetting::Icu,
            )
            .unwrap();
        // Only one otitis scenario is registered; it comes back regardless.
        assert_eq!(scenario.patient_type, PatientType::Pediatric);
    }

    #[test]
    fn unknown_condition_returns_none() {
        let repo = GuidelineRepository::builtin();
        assert!(repo
            .find_scenario(
                "appendicitis",
                &PatientType::Adult,
                &Severity::Moderate,
                &CareSetting::Outpatient,
            )
            .is_none());
    }

    #[test]
    fn pregnant_uti_scenario_avoids_contraindicated_agents() {
        let repo = GuidelineRepository::builtin();
        let scenario = repo
            .find_scenario(
                "cystitis",
                &PatientType::Pregnant,
                &Severity::Mild,
                &CareSetting::Outpatient,
            )
            .unwrap();
        assert_eq!(scenario.patient_type, PatientType::Pregnant);
        assert!(scenario.first_line[0].recommendation.contains("cephalexin"));
        assert!(scenario
            .contraindications
            .iter()
            .any(|c| c.contains("nitrofurantoin")));
    }

    #[test]
    fn json_override_round_trips() {
        let repo = GuidelineRepository::builtin();
        let json = serde_json::to_string(&repo).unwrap();
        let parsed = GuidelineRepository::from_json_str(&json).unwrap();
        assert_eq!(parsed.conditions().count(), repo.conditions().count());
        assert!(parsed
            .find_scenario(
                "pneumonia",
                &PatientType::Adult,
                &Severity::Moderate,
                &CareSetting::Outpatient,
            )
            .is_some());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(GuidelineRepository::from_json_str("[oops").is_err());
    }
}
