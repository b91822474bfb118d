use serde::{Deserialize, Serialize};

use crate::types::DrugClass;

/// Substring patterns mapped to antibiotic classes, checked in declaration
/// order with first hit winning. Suffix patterns ("cillin", "floxacin") cover
/// whole families; classes without a safe shared suffix list members
/// explicitly.
const CLASS_PATTERNS: &[(DrugClass, &[&str])] = &[
    (DrugClass::Penicillin, &["cillin"]),
    (DrugClass::Cephalosporin, &["cef", "ceph"]),
    (DrugClass::Carbapenem, &["penem"]),
    (DrugClass::Fluoroquinolone, &["floxacin"]),
    (DrugClass::Tetracycline, &["cycline"]),
    (DrugClass::Macrolide, &["thromycin"]),
    (DrugClass::Sulfonamide, &["sulfa"]),
    (
        DrugClass::Aminoglycoside,
        &[
            "gentamicin",
            "tobramycin",
            "amikacin",
            "streptomycin",
            "neomycin",
            "kanamycin",
            "plazomicin",
        ],
    ),
    (
        DrugClass::Glycopeptide,
        &[
            "vancomycin",
            "teicoplanin",
            "telavancin",
            "dalbavancin",
            "oritavancin",
        ],
    ),
    (DrugClass::Lipopeptide, &["daptomycin"]),
    (DrugClass::Oxazolidinone, &["linezolid", "tedizolid"]),
    (DrugClass::Nitrofuran, &["nitrofurantoin"]),
    (DrugClass::Lincosamide, &["clindamycin", "lincomycin"]),
    (DrugClass::Nitroimidazole, &["metronidazole", "tinidazole"]),
];

// ---------------------------------------------------------------------------
// DrugProfile
// ---------------------------------------------------------------------------

/// A proposed drug resolved once at the boundary: canonical lowercase name
/// plus antibiotic class. All rule matching downstream works on this profile
/// instead of re-scanning raw name strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugProfile {
    pub name: String,
    pub class: DrugClass,
}

/// Resolve a free-text drug name to its profile. Unrecognized names resolve
/// to `DrugClass::Other` rather than failing; validators simply find no
/// class-level rules for them.
pub fn resolve_drug(name: &str) -> DrugProfile {
    let normalized = name.trim().to_lowercase();
    for (class, patterns) in CLASS_PATTERNS {
        if patterns.iter().any(|p| normalized.contains(p)) {
            return DrugProfile {
                name: normalized,
                class: class.clone(),
            };
        }
    }
    DrugProfile {
        name: normalized,
        class: DrugClass::Other,
    }
}

// ---------------------------------------------------------------------------
// DrugSelector
// ---------------------------------------------------------------------------

/// How reference-table rules address drugs: a whole class or a single name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DrugSelector {
    Class(DrugClass),
    Name(String),
}

impl DrugSelector {
    /// Whether this selector covers the given drug profile.
    pub fn matches(&self, drug: &DrugProfile) -> bool {
        match self {
            Self::Class(class) => drug.class == *class,
            Self::Name(name) => drug.name.contains(&name.to_lowercase()),
        }
    }
}
