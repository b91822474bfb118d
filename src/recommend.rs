use serde::{Deserialize, Serialize};

use crate::guidelines::{ClinicalEvidence, ClinicalScenario};

// ---------------------------------------------------------------------------
// EvidenceGrade
// ---------------------------------------------------------------------------

/// IDSA-style strength-of-evidence grade: letter (strength of the
/// recommendation) crossed with Roman numeral (quality of supporting data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceGrade {
    AI,
    AII,
    AIII,
    BI,
    BII,
    BIII,
    CI,
    CII,
    CIII,
    Unknown,
}

impl EvidenceGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AI => "A-I",
            Self::AII => "A-II",
            Self::AIII => "A-III",
            Self::BI => "B-I",
            Self::BII => "B-II",
            Self::BIII => "B-III",
            Self::CI => "C-I",
            Self::CII => "C-II",
            Self::CIII => "C-III",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a textual grade. Anything unrecognized maps to `Unknown`
    /// rather than failing; downstream grading handles it with a neutral
    /// confidence.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "A-I" => Self::AI,
            "A-II" => Self::AII,
            "A-III" => Self::AIII,
            "B-I" => Self::BI,
            "B-II" => Self::BII,
            "B-III" => Self::BIII,
            "C-I" => Self::CI,
            "C-II" => Self::CII,
            "C-III" => Self::CIII,
            _ => Self::Unknown,
        }
    }

    /// Fixed grade-to-strength lookup. Confidence decreases monotonically
    /// with both letter and numeral; unknown grades sit at a neutral 50.
    pub fn assessment(&self) -> StrengthAssessment {
        let (strength, description, confidence) = match self {
            Self::AI => (
                RecommendationStrength::Strong,
                "strong recommendation backed by randomized controlled trials",
                95,
            ),
            Self::AII => (
                RecommendationStrength::Strong,
                "strong recommendation backed by well-designed non-randomized studies",
                90,
            ),
            Self::AIII => (
                RecommendationStrength::Strong,
                "strong recommendation backed by expert consensus",
                85,
            ),
            Self::BI => (
                RecommendationStrength::Moderate,
                "moderate recommendation backed by randomized controlled trials",
                80,
            ),
            Self::BII => (
                RecommendationStrength::Moderate,
                "moderate recommendation backed by well-designed non-randomized studies",
                75,
            ),
            Self::BIII => (
                RecommendationStrength::Moderate,
                "moderate recommendation backed by expert consensus",
                70,
            ),
            Self::CI => (
                RecommendationStrength::Weak,
                "weak recommendation backed by randomized controlled trials",
                65,
            ),
            Self::CII => (
                RecommendationStrength::Weak,
                "weak recommendation backed by well-designed non-randomized studies",
                60,
            ),
            Self::CIII => (
                RecommendationStrength::Weak,
                "weak recommendation backed by expert consensus",
                55,
            ),
            Self::Unknown => (
                RecommendationStrength::Unknown,
                "evidence grade not recognized",
                50,
            ),
        };
        StrengthAssessment {
            strength,
            description,
            confidence,
        }
    }
}

// ---------------------------------------------------------------------------
// StrengthAssessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationStrength {
    Strong,
    Moderate,
    Weak,
    Unknown,
}

impl RecommendationStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
            Self::Unknown => "unknown",
        }
    }
}

/// Graded reading of one evidence item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthAssessment {
    pub strength: RecommendationStrength,
    pub description: &'static str,
    pub confidence: u8,
}

// ---------------------------------------------------------------------------
// CombinedRecommendation
// ---------------------------------------------------------------------------

/// Guideline options for one condition/patient slice: first-line therapy,
/// everything else worth considering, and a one-sentence evidence digest.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedRecommendation {
    pub primary: Vec<ClinicalEvidence>,
    pub alternative: Vec<ClinicalEvidence>,
    pub evidence_summary: String,
    pub guideline_consensus: bool,
}

/// Assemble the combined view of a matched scenario: `primary` is the
/// first-line list, `alternative` is second-line followed by alternatives.
pub fn assemble_combined(scenario: &ClinicalScenario) -> CombinedRecommendation {
    let primary = scenario.first_line.clone();
    let alternative: Vec<ClinicalEvidence> = scenario
        .second_line
        .iter()
        .chain(&scenario.alternatives)
        .cloned()
        .collect();

    let all: Vec<&ClinicalEvidence> = primary.iter().chain(&alternative).collect();

    CombinedRecommendation {
        evidence_summary: evidence_summary(&all),
        guideline_consensus: guideline_consensus(&scenario.first_line),
        primary,
        alternative,
    }
}

/// One sentence naming the distinct guideline sources (insertion order) and
/// tallying recommendations by graded strength.
fn evidence_summary(items: &[&ClinicalEvidence]) -> String {
    let mut sources: Vec<&str> = Vec::new();
    for item in items {
        let s = item.source.as_str();
        if !sources.contains(&s) {
            sources.push(s);
        }
    }

    let mut strong = 0usize;
    let mut moderate = 0usize;
    let mut weak = 0usize;
    let mut unknown = 0usize;
    for item in items {
        match item.strength_of_evidence.assessment().strength {
            RecommendationStrength::Strong => strong += 1,
            RecommendationStrength::Moderate => moderate += 1,
            RecommendationStrength::Weak => weak += 1,
            RecommendationStrength::Unknown => unknown += 1,
        }
    }

    let mut summary = format!(
        "Based on {} guidance: {} strong, {} moderate, and {} weak recommendation(s)",
        sources.join(", "),
        strong,
        moderate,
        weak
    );
    if unknown > 0 {
        summary.push_str(&format!(" plus {unknown} ungraded"));
    }
    summary.push('.');
    summary
}

/// Agreement heuristic over the first-line list: fewer than two items count
/// as consensus, otherwise every later recommendation text must contain the
/// leading token of the first one. Deliberately loose; it flags obvious
/// splits, nothing more.
fn guideline_consensus(first_line: &[ClinicalEvidence]) -> bool {
    if first_line.len() < 2 {
        return true;
    }
    let first_text = first_line[0].recommendation.to_lowercase();
    let Some(lead_token) = first_text.split_whitespace().next() else {
        return true;
    };
    first_line[1..]
        .iter()
        .all(|item| item.recommendation.to_lowercase().contains(lead_token))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::guidelines::DosingGuidance;
    use crate::types::{CareSetting, EvidenceQuality, EvidenceSource, PatientType, Severity};

    fn evidence(recommendation: &str, grade: EvidenceGrade, source: EvidenceSource) -> ClinicalEvidence {
        ClinicalEvidence {
            guideline: "Test Guideline".into(),
            recommendation: recommendation.into(),
            strength_of_evidence: grade,
            quality_of_evidence: EvidenceQuality::High,
            last_updated: NaiveDate::default(),
            source,
            dosing: DosingGuidance {
                adult: "500 mg twice daily".into(),
                pediatric: None,
                renal_adjustment: "none".into(),
                hepatic_adjustment: None,
            },
            duration: "5 days".into(),
            monitoring: vec![],
        }
    }

    fn scenario(first_line: Vec<ClinicalEvidence>, second_line: Vec<ClinicalEvidence>, alternatives: Vec<ClinicalEvidence>) -> ClinicalScenario {
        ClinicalScenario {
            condition: "test_condition".into(),
            patient_type: PatientType::Adult,
            severity: Severity::Moderate,
            setting: CareSetting::Outpatient,
            first_line,
            second_line,
            alternatives,
            contraindications: vec![],
            special_considerations: vec![],
        }
    }

    // --- Grading ---

    #[test]
    fn confidence_decreases_monotonically() {
        let grades = [
            EvidenceGrade::AI,
            EvidenceGrade::AII,
            EvidenceGrade::AIII,
            EvidenceGrade::BI,
            EvidenceGrade::BII,
            EvidenceGrade::BIII,
            EvidenceGrade::CI,
            EvidenceGrade::CII,
            EvidenceGrade::CIII,
        ];
        let confidences: Vec<u8> = grades.iter().map(|g| g.assessment().confidence).collect();
        assert_eq!(confidences, vec![95, 90, 85, 80, 75, 70, 65, 60, 55]);
    }

    #[test]
    fn letter_determines_strength() {
        assert_eq!(
            EvidenceGrade::AIII.assessment().strength,
            RecommendationStrength::Strong
        );
        assert_eq!(
            EvidenceGrade::BI.assessment().strength,
            RecommendationStrength::Moderate
        );
        assert_eq!(
            EvidenceGrade::CII.assessment().strength,
            RecommendationStrength::Weak
        );
    }

    #[test]
    fn unrecognized_grade_is_neutral() {
        let grade = EvidenceGrade::parse("Z-9");
        assert_eq!(grade, EvidenceGrade::Unknown);
        let assessment = grade.assessment();
        assert_eq!(assessment.strength, RecommendationStrength::Unknown);
        assert_eq!(assessment.confidence, 50);
    }

    #[test]
    fn parse_accepts_canonical_grades() {
        assert_eq!(EvidenceGrade::parse("A-I"), EvidenceGrade::AI);
        assert_eq!(EvidenceGrade::parse(" b-ii "), EvidenceGrade::BII);
        assert_eq!(EvidenceGrade::parse("C-III"), EvidenceGrade::CIII);
        assert_eq!(EvidenceGrade::AI.as_str(), "A-I");
    }

    // --- Consensus heuristic ---

    #[test]
    fn single_recommendation_is_consensus() {
        let s = scenario(
            vec![evidence("vancomycin 15 mg/kg IV", EvidenceGrade::AI, EvidenceSource::Idsa)],
            vec![],
            vec![],
        );
        assert!(assemble_combined(&s).guideline_consensus);
    }

    #[test]
    fn shared_lead_token_is_consensus() {
        let s = scenario(
            vec![
                evidence("penicillin V 500 mg orally", EvidenceGrade::AI, EvidenceSource::Idsa),
                evidence(
                    "penicillin G benzathine single IM dose",
                    EvidenceGrade::AI,
                    EvidenceSource::Idsa,
                ),
            ],
            vec![],
            vec![],
        );
        assert!(assemble_combined(&s).guideline_consensus);
    }

    #[test]
    fn diverging_first_line_is_not_consensus() {
        let s = scenario(
            vec![
                evidence("amoxicillin 1 g three times daily", EvidenceGrade::AI, EvidenceSource::Idsa),
                evidence("doxycycline 100 mg twice daily", EvidenceGrade::BII, EvidenceSource::Idsa),
            ],
            vec![],
            vec![],
        );
        assert!(!assemble_combined(&s).guideline_consensus);
    }

    // --- Assembly ---

    #[test]
    fn alternative_preserves_second_line_then_alternatives_order() {
        let s = scenario(
            vec![evidence("amoxicillin", EvidenceGrade::AI, EvidenceSource::Idsa)],
            vec![evidence("azithromycin", EvidenceGrade::BI, EvidenceSource::Idsa)],
            vec![evidence("levofloxacin", EvidenceGrade::AII, EvidenceSource::Fda)],
        );
        let combined = assemble_combined(&s);
        assert_eq!(combined.primary.len(), 1);
        assert_eq!(combined.alternative.len(), 2);
        assert_eq!(combined.alternative[0].recommendation, "azithromycin");
        assert_eq!(combined.alternative[1].recommendation, "levofloxacin");
    }

    #[test]
    fn summary_lists_distinct_sources_and_tallies_strengths() {
        let s = scenario(
            vec![
                evidence("amoxicillin", EvidenceGrade::AI, EvidenceSource::Idsa),
                evidence("doxycycline", EvidenceGrade::BII, EvidenceSource::Idsa),
            ],
            vec![evidence("azithromycin", EvidenceGrade::CI, EvidenceSource::Cdc)],
            vec![],
        );
        let combined = assemble_combined(&s);
        assert_eq!(
            combined.evidence_summary,
            "Based on IDSA, CDC guidance: 1 strong, 1 moderate, and 1 weak recommendation(s)."
        );
    }

    #[test]
    fn summary_mentions_ungraded_items() {
        let s = scenario(
            vec![evidence("amoxicillin", EvidenceGrade::Unknown, EvidenceSource::Who)],
            vec![],
            vec![],
        );
        let combined = assemble_combined(&s);
        assert!(combined.evidence_summary.contains("1 ungraded"));
    }
}
