use serde::{Deserialize, Serialize};

use crate::drugs::{DrugProfile, DrugSelector};
use crate::types::{EngineError, EvidenceSource, InteractionSeverity};

// ---------------------------------------------------------------------------
// Rule record types
// ---------------------------------------------------------------------------

/// A pregnancy contraindication rule. Which list it sits in (absolute vs
/// relative) decides the alert weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PregnancyRule {
    pub selector: DrugSelector,
    /// Fetal risk the drug carries.
    pub risk: String,
    pub evidence: String,
    pub source: EvidenceSource,
}

/// An age-gated contraindication rule. The holding list fixes the age cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PediatricRule {
    pub selector: DrugSelector,
    pub risk: String,
    pub evidence: String,
    pub source: EvidenceSource,
}

/// A renal-function rule. The holding list fixes the eGFR threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenalRule {
    pub selector: DrugSelector,
    pub guidance: String,
    pub evidence: String,
    pub source: EvidenceSource,
}

/// A drug–drug interaction record. Matching is bidirectional and substring
/// based on both drug fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: InteractionSeverity,
    pub mechanism: String,
    pub clinical_effect: String,
    pub management: String,
    pub evidence: String,
    pub source: EvidenceSource,
    pub onset: String,
    pub duration: String,
}

/// Cross-reactivity entry: a declared allergy class, the drugs it reaches,
/// and what to offer instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossReactivityRule {
    /// Lowercase key as patients declare it ("penicillin", "sulfa").
    pub allergy_class: String,
    pub cross_reactive: Vec<DrugSelector>,
    pub safe_alternatives: Vec<String>,
    pub note: String,
    pub source: EvidenceSource,
}

/// Resistance pattern entry: organisms the patient carries and the drug
/// classes those organisms defeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResistanceRule {
    /// Lowercase key as patients declare it ("mrsa", "esbl", "vre").
    pub pattern: String,
    pub ineffective: Vec<DrugSelector>,
    pub alternatives: Vec<String>,
    pub note: String,
    pub source: EvidenceSource,
}

/// Drugs that need actual-body-weight dosing in heavier patients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightDosingRule {
    pub selector: DrugSelector,
    pub guidance: String,
    pub source: EvidenceSource,
}

/// Drugs that warrant caution in hepatic impairment. Informational table;
/// surfaced through [`ReferenceTables::hepatic_caution_for`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HepaticRule {
    pub selector: DrugSelector,
    pub guidance: String,
    pub source: EvidenceSource,
}

// ---------------------------------------------------------------------------
// ReferenceTables
// ---------------------------------------------------------------------------

/// The complete static rule set the validators run against. Built once per
/// process and never mutated; `from_json_str` exists so deployments can ship
/// their own tables (omitted tables deserialize empty).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    pub pregnancy_absolute: Vec<PregnancyRule>,
    pub pregnancy_relative: Vec<PregnancyRule>,
    pub pediatric_avoid_under_8: Vec<PediatricRule>,
    pub pediatric_caution_under_18: Vec<PediatricRule>,
    pub renal_avoid_severe: Vec<RenalRule>,
    pub renal_monitor_moderate: Vec<RenalRule>,
    pub interactions: Vec<InteractionRecord>,
    pub cross_reactivity: Vec<CrossReactivityRule>,
    pub resistance: Vec<ResistanceRule>,
    pub weight_dosing: Vec<WeightDosingRule>,
    pub hepatic_caution: Vec<HepaticRule>,
}

impl ReferenceTables {
    /// Parse a full table set from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| {
            EngineError::ReferenceDataParse("reference_tables".into(), e.to_string())
        })
    }

    /// All interaction records linking the proposed drug with one current
    /// medication. Matching is case-insensitive substring, both directions.
    pub fn interactions_between(
        &self,
        drug: &DrugProfile,
        medication: &str,
    ) -> Vec<&InteractionRecord> {
        let med = medication.trim().to_lowercase();
        self.interactions
            .iter()
            .filter(|record| {
                let a = record.drug_a.to_lowercase();
                let b = record.drug_b.to_lowercase();
                (drug.name.contains(&a) && med.contains(&b))
                    || (drug.name.contains(&b) && med.contains(&a))
            })
            .collect()
    }

    /// Hepatic-caution entry for the drug, if any.
    pub fn hepatic_caution_for(&self, drug: &DrugProfile) -> Option<&HepaticRule> {
        self.hepatic_caution
            .iter()
            .find(|rule| rule.selector.matches(drug))
    }

    /// The built-in rule set.
    pub fn builtin() -> Self {
        use crate::types::DrugClass::*;
        use DrugSelector::{Class, Name};

        Self {
            pregnancy_absolute: vec![
                PregnancyRule {
                    selector: Class(Tetracycline),
                    risk: "inhibits fetal bone growth and permanently discolors developing teeth"
                        .into(),
                    evidence: "FDA pregnancy category D".into(),
                    source: EvidenceSource::Fda,
                },
                PregnancyRule {
                    selector: Class(Fluoroquinolone),
                    risk: "cartilage and joint damage observed in animal studies".into(),
                    evidence: "FDA label: avoid in pregnancy unless no alternative".into(),
                    source: EvidenceSource::Fda,
                },
                PregnancyRule {
                    selector: Class(Aminoglycoside),
                    risk: "fetal ototoxicity with irreversible eighth-nerve damage".into(),
                    evidence: "FDA pregnancy category D (streptomycin, tobramycin)".into(),
                    source: EvidenceSource::Fda,
                },
            ],
            pregnancy_relative: vec![
                PregnancyRule {
                    selector: Class(Sulfonamide),
                    risk: "kernicterus risk near term; folate antagonism in the first trimester"
                        .into(),
                    evidence: "avoid in third trimester; use only when benefit outweighs risk"
                        .into(),
                    source: EvidenceSource::Fda,
                },
                PregnancyRule {
                    selector: Class(Nitrofuran),
                    risk: "hemolytic anemia in the newborn when used at term".into(),
                    evidence: "avoid after 36 weeks gestation".into(),
                    source: EvidenceSource::Fda,
                },
                PregnancyRule {
                    selector: Name("clarithromycin".into()),
                    risk: "increased fetal loss in animal studies".into(),
                    evidence: "FDA label: use only when no alternative therapy is appropriate"
                        .into(),
                    source: EvidenceSource::Fda,
                },
            ],
            pediatric_avoid_under_8: vec![PediatricRule {
                selector: Class(Tetracycline),
                risk: "permanent tooth discoloration and enamel hypoplasia".into(),
                evidence: "contraindicated under 8 years except for severe infections".into(),
                source: EvidenceSource::Fda,
            }],
            pediatric_caution_under_18: vec![PediatricRule {
                selector: Class(Fluoroquinolone),
                risk: "musculoskeletal toxicity (arthropathy) in growing joints".into(),
                evidence: "reserve for infections without safer alternatives".into(),
                source: EvidenceSource::Fda,
            }],
            renal_avoid_severe: vec![
                RenalRule {
                    selector: Name("nitrofurantoin".into()),
                    guidance: "ineffective urinary concentrations and neuropathy risk below 30 mL/min".into(),
                    evidence: "avoid when eGFR < 30 mL/min".into(),
                    source: EvidenceSource::Pharmacokinetics,
                },
                RenalRule {
                    selector: Name("imipenem".into()),
                    guidance: "seizure risk from drug accumulation in severe renal impairment"
                        .into(),
                    evidence: "avoid or reduce dose when eGFR < 30 mL/min".into(),
                    source: EvidenceSource::Pharmacokinetics,
                },
            ],
            renal_monitor_moderate: vec![
                RenalRule {
                    selector: Class(Glycopeptide),
                    guidance: "renally cleared; trough levels and creatinine monitoring required"
                        .into(),
                    evidence: "dose adjustment when eGFR < 60 mL/min".into(),
                    source: EvidenceSource::Pharmacokinetics,
                },
                RenalRule {
                    selector: Class(Aminoglycoside),
                    guidance: "nephrotoxic and renally cleared; extend dosing interval".into(),
                    evidence: "dose adjustment when eGFR < 60 mL/min".into(),
                    source: EvidenceSource::Pharmacokinetics,
                },
            ],
            interactions: vec![
                InteractionRecord {
                    drug_a: "ciprofloxacin".into(),
                    drug_b: "warfarin".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "CYP1A2 inhibition reduces warfarin clearance".into(),
                    clinical_effect: "elevated INR with serious bleeding risk".into(),
                    management: "monitor INR within 3-5 days; consider a non-interacting antibiotic".into(),
                    evidence: "multiple case series and FDA label warning".into(),
                    source: EvidenceSource::Fda,
                    onset: "delayed (3-5 days)".into(),
                    duration: "persists up to 1 week after discontinuation".into(),
                },
                InteractionRecord {
                    drug_a: "levofloxacin".into(),
                    drug_b: "warfarin".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "displacement from protein binding plus reduced gut flora vitamin K".into(),
                    clinical_effect: "elevated INR with bleeding risk".into(),
                    management: "monitor INR during and after the course".into(),
                    evidence: "postmarketing reports".into(),
                    source: EvidenceSource::Fda,
                    onset: "delayed".into(),
                    duration: "course-long".into(),
                },
                InteractionRecord {
                    drug_a: "azithromycin".into(),
                    drug_b: "warfarin".into(),
                    severity: InteractionSeverity::Moderate,
                    mechanism: "possible potentiation of anticoagulant effect".into(),
                    clinical_effect: "modest INR elevation in susceptible patients".into(),
                    management: "check INR within 5 days of starting".into(),
                    evidence: "case reports; interaction inconsistent".into(),
                    source: EvidenceSource::ClinicalTrial,
                    onset: "delayed".into(),
                    duration: "course-long".into(),
                },
                InteractionRecord {
                    drug_a: "clarithromycin".into(),
                    drug_b: "simvastatin".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "potent CYP3A4 inhibition raises statin exposure".into(),
                    clinical_effect: "myopathy and rhabdomyolysis risk".into(),
                    management: "suspend the statin for the antibiotic course".into(),
                    evidence: "FDA contraindication".into(),
                    source: EvidenceSource::Fda,
                    onset: "rapid (1-2 days)".into(),
                    duration: "resolves after washout".into(),
                },
                InteractionRecord {
                    drug_a: "clarithromycin".into(),
                    drug_b: "warfarin".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "CYP3A4 inhibition reduces warfarin clearance".into(),
                    clinical_effect: "elevated INR with bleeding risk".into(),
                    management: "monitor INR closely; consider azithromycin instead".into(),
                    evidence: "established interaction".into(),
                    source: EvidenceSource::ClinicalTrial,
                    onset: "delayed".into(),
                    duration: "persists after discontinuation".into(),
                },
                InteractionRecord {
                    drug_a: "metronidazole".into(),
                    drug_b: "warfarin".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "inhibits S-warfarin metabolism (CYP2C9)".into(),
                    clinical_effect: "marked INR elevation and bleeding".into(),
                    management: "reduce warfarin dose empirically and monitor INR".into(),
                    evidence: "established interaction".into(),
                    source: EvidenceSource::ClinicalTrial,
                    onset: "delayed (2-5 days)".into(),
                    duration: "persists up to 1 week".into(),
                },
                InteractionRecord {
                    drug_a: "trimethoprim-sulfamethoxazole".into(),
                    drug_b: "warfarin".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "CYP2C9 inhibition plus protein-binding displacement".into(),
                    clinical_effect: "major bleeding; one of the highest-risk warfarin pairs"
                        .into(),
                    management: "avoid combination; if unavoidable, intensive INR monitoring"
                        .into(),
                    evidence: "population studies show elevated hospitalization risk".into(),
                    source: EvidenceSource::ClinicalTrial,
                    onset: "delayed".into(),
                    duration: "persists after discontinuation".into(),
                },
                InteractionRecord {
                    drug_a: "trimethoprim-sulfamethoxazole".into(),
                    drug_b: "methotrexate".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "additive folate antagonism and reduced renal clearance".into(),
                    clinical_effect: "pancytopenia and mucositis".into(),
                    management: "avoid combination".into(),
                    evidence: "case series with fatalities".into(),
                    source: EvidenceSource::ClinicalTrial,
                    onset: "delayed".into(),
                    duration: "until counts recover".into(),
                },
                InteractionRecord {
                    drug_a: "ciprofloxacin".into(),
                    drug_b: "theophylline".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "CYP1A2 inhibition blocks theophylline clearance".into(),
                    clinical_effect: "theophylline toxicity: seizures, arrhythmias".into(),
                    management: "reduce theophylline dose and check levels".into(),
                    evidence: "established interaction".into(),
                    source: EvidenceSource::Pharmacokinetics,
                    onset: "rapid (1-3 days)".into(),
                    duration: "course-long".into(),
                },
                InteractionRecord {
                    drug_a: "ciprofloxacin".into(),
                    drug_b: "tizanidine".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "CYP1A2 inhibition raises tizanidine exposure up to 10-fold"
                        .into(),
                    clinical_effect: "severe hypotension and sedation".into(),
                    management: "combination contraindicated".into(),
                    evidence: "FDA contraindication".into(),
                    source: EvidenceSource::Fda,
                    onset: "rapid".into(),
                    duration: "course-long".into(),
                },
                InteractionRecord {
                    drug_a: "linezolid".into(),
                    drug_b: "sertraline".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "linezolid is a reversible MAO inhibitor".into(),
                    clinical_effect: "serotonin syndrome".into(),
                    management: "avoid combination or monitor for serotonin toxicity".into(),
                    evidence: "FDA safety communication".into(),
                    source: EvidenceSource::Fda,
                    onset: "rapid (hours to days)".into(),
                    duration: "resolves after washout".into(),
                },
                InteractionRecord {
                    drug_a: "azithromycin".into(),
                    drug_b: "amiodarone".into(),
                    severity: InteractionSeverity::Major,
                    mechanism: "additive QT prolongation".into(),
                    clinical_effect: "torsades de pointes risk".into(),
                    management: "baseline ECG; prefer a non-QT-prolonging antibiotic".into(),
                    evidence: "FDA safety communication on macrolide QT effects".into(),
                    source: EvidenceSource::Fda,
                    onset: "rapid".into(),
                    duration: "course-long".into(),
                },
                InteractionRecord {
                    drug_a: "gentamicin".into(),
                    drug_b: "furosemide".into(),
                    severity: InteractionSeverity::Moderate,
                    mechanism: "additive ototoxicity and nephrotoxicity".into(),
                    clinical_effect: "hearing loss and renal injury with prolonged use".into(),
                    management: "monitor hearing and creatinine; separate infusion times".into(),
                    evidence: "established interaction".into(),
                    source: EvidenceSource::Pharmacokinetics,
                    onset: "delayed".into(),
                    duration: "cumulative".into(),
                },
                InteractionRecord {
                    drug_a: "vancomycin".into(),
                    drug_b: "piperacillin".into(),
                    severity: InteractionSeverity::Moderate,
                    mechanism: "additive nephrotoxicity of the combination".into(),
                    clinical_effect: "acute kidney injury rates higher than either agent alone"
                        .into(),
                    management: "daily creatinine monitoring".into(),
                    evidence: "meta-analyses of combination therapy".into(),
                    source: EvidenceSource::ClinicalTrial,
                    onset: "delayed (3+ days)".into(),
                    duration: "course-long".into(),
                },
            ],
            cross_reactivity: vec![
                CrossReactivityRule {
                    allergy_class: "penicillin".into(),
                    cross_reactive: vec![Class(Penicillin), Class(Cephalosporin)],
                    safe_alternatives: vec![
                        "azithromycin".into(),
                        "levofloxacin".into(),
                        "vancomycin".into(),
                        "aztreonam".into(),
                    ],
                    note: "cephalosporin cross-reactivity ~2%, concentrated in shared R1 side chains".into(),
                    source: EvidenceSource::Idsa,
                },
                CrossReactivityRule {
                    allergy_class: "cephalosporin".into(),
                    cross_reactive: vec![Class(Cephalosporin), Class(Carbapenem)],
                    safe_alternatives: vec![
                        "azithromycin".into(),
                        "levofloxacin".into(),
                        "aztreonam".into(),
                    ],
                    note: "carbapenem cross-reactivity ~1%".into(),
                    source: EvidenceSource::Idsa,
                },
                CrossReactivityRule {
                    allergy_class: "sulfa".into(),
                    cross_reactive: vec![Class(Sulfonamide)],
                    safe_alternatives: vec![
                        "nitrofurantoin".into(),
                        "fosfomycin".into(),
                        "ciprofloxacin".into(),
                    ],
                    note: "applies to antibiotic sulfonamides; non-antibiotic cross-reaction not established".into(),
                    source: EvidenceSource::Idsa,
                },
            ],
            resistance: vec![
                ResistanceRule {
                    pattern: "mrsa".into(),
                    ineffective: vec![Class(Penicillin), Class(Cephalosporin), Class(Carbapenem)],
                    alternatives: vec![
                        "vancomycin".into(),
                        "linezolid".into(),
                        "daptomycin".into(),
                    ],
                    note: "mecA-encoded PBP2a renders beta-lactams ineffective".into(),
                    source: EvidenceSource::Idsa,
                },
                ResistanceRule {
                    pattern: "esbl".into(),
                    ineffective: vec![Class(Penicillin), Class(Cephalosporin)],
                    alternatives: vec!["meropenem".into(), "ertapenem".into()],
                    note: "extended-spectrum beta-lactamases hydrolyze penicillins and cephalosporins".into(),
                    source: EvidenceSource::Idsa,
                },
                ResistanceRule {
                    pattern: "vre".into(),
                    ineffective: vec![Class(Glycopeptide)],
                    alternatives: vec!["linezolid".into(), "daptomycin".into()],
                    note: "vanA/vanB ligases remodel the peptidoglycan target".into(),
                    source: EvidenceSource::Cdc,
                },
            ],
            weight_dosing: vec![
                WeightDosingRule {
                    selector: Class(Glycopeptide),
                    guidance: "dose on actual body weight with trough-level monitoring".into(),
                    source: EvidenceSource::Pharmacokinetics,
                },
                WeightDosingRule {
                    selector: Class(Lipopeptide),
                    guidance: "dose on actual body weight".into(),
                    source: EvidenceSource::Pharmacokinetics,
                },
            ],
            hepatic_caution: vec![
                HepaticRule {
                    selector: Name("clavulanate".into()),
                    guidance: "cholestatic hepatotoxicity; monitor liver enzymes on prolonged courses".into(),
                    source: EvidenceSource::Fda,
                },
                HepaticRule {
                    selector: Name("rifampin".into()),
                    guidance: "hepatotoxic; baseline and periodic liver function tests".into(),
                    source: EvidenceSource::Fda,
                },
                HepaticRule {
                    selector: Name("erythromycin".into()),
                    guidance: "cholestatic hepatitis reported, especially with the estolate salt".into(),
                    source: EvidenceSource::Fda,
                },
                HepaticRule {
                    selector: Class(Tetracycline),
                    guidance: "high parenteral doses associated with hepatic injury".into(),
                    source: EvidenceSource::Fda,
                },
            ],
        }
    }
}
