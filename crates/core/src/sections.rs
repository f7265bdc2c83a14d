//! Letter section catalogue.
//!
//! A clinical letter is made of a fixed set of sections. Display metadata for each kind is
//! held in a single static table so the canonical rendering order is defined in exactly
//! one place.

use crate::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};

/// The sixteen section kinds a letter can contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Identity and medication summary, rendered as a table.
    FrontPage,
    PresentingComplaint,
    HistoryOfPresentingComplaint,
    PastPsychiatricHistory,
    PastMedicalHistory,
    DrugHistory,
    FamilyHistory,
    PersonalHistory,
    SocialHistory,
    ForensicHistory,
    SubstanceUse,
    MentalStateExamination,
    RiskAssessment,
    Formulation,
    Diagnosis,
    Plan,
}

/// Static display metadata for a [`SectionKind`].
#[derive(Clone, Copy, Debug)]
pub struct SectionInfo {
    pub kind: SectionKind,
    pub key: &'static str,
    pub title: &'static str,
    pub order: u8,
}

static SECTION_TABLE: [SectionInfo; 16] = [
    info(SectionKind::FrontPage, "front_page", "Front Page", 0),
    info(SectionKind::PresentingComplaint, "presenting_complaint", "Presenting Complaint", 1),
    info(
        SectionKind::HistoryOfPresentingComplaint,
        "history_of_presenting_complaint",
        "History of Presenting Complaint",
        2,
    ),
    info(
        SectionKind::PastPsychiatricHistory,
        "past_psychiatric_history",
        "Past Psychiatric History",
        3,
    ),
    info(SectionKind::PastMedicalHistory, "past_medical_history", "Past Medical History", 4),
    info(SectionKind::DrugHistory, "drug_history", "Drug History", 5),
    info(SectionKind::FamilyHistory, "family_history", "Family History", 6),
    info(SectionKind::PersonalHistory, "personal_history", "Personal History", 7),
    info(SectionKind::SocialHistory, "social_history", "Social History", 8),
    info(SectionKind::ForensicHistory, "forensic_history", "Forensic History", 9),
    info(SectionKind::SubstanceUse, "substance_use", "Substance Use", 10),
    info(
        SectionKind::MentalStateExamination,
        "mental_state_examination",
        "Mental State Examination",
        11,
    ),
    info(SectionKind::RiskAssessment, "risk_assessment", "Risk Assessment", 12),
    info(SectionKind::Formulation, "formulation", "Formulation", 13),
    info(SectionKind::Diagnosis, "diagnosis", "Diagnosis", 14),
    info(SectionKind::Plan, "plan", "Plan", 15),
];

const fn info(kind: SectionKind, key: &'static str, title: &'static str, order: u8) -> SectionInfo {
    SectionInfo {
        kind,
        key,
        title,
        order,
    }
}

impl SectionKind {
    /// All kinds in canonical order.
    pub fn all() -> impl Iterator<Item = SectionKind> {
        SECTION_TABLE.iter().map(|i| i.kind)
    }

    pub fn info(self) -> &'static SectionInfo {
        // Table rows are laid out in declaration order.
        &SECTION_TABLE[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.info().key
    }

    pub fn title(self) -> &'static str {
        self.info().title
    }

    pub fn order(self) -> u8 {
        self.info().order
    }

    pub fn is_front_page(self) -> bool {
        self == SectionKind::FrontPage
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

impl std::str::FromStr for SectionKind {
    type Err = ReportError;

    fn from_str(s: &str) -> ReportResult<Self> {
        SECTION_TABLE
            .iter()
            .find(|i| i.key == s.trim())
            .map(|i| i.kind)
            .ok_or_else(|| ReportError::InvalidInput(format!("unknown section kind: {s}")))
    }
}

/// One section of a letter as held by the editing layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    #[serde(default)]
    pub content: String,
    /// Set by the editor once a section is signed off. Export ignores it.
    #[serde(default)]
    pub locked: bool,
}

impl Section {
    pub fn new(kind: SectionKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            locked: false,
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn order(&self) -> u8 {
        self.kind.order()
    }
}

/// Returns the sections stably sorted into canonical rendering order.
pub fn canonical_order(sections: &[Section]) -> Vec<&Section> {
    let mut ordered: Vec<&Section> = sections.iter().collect();
    ordered.sort_by_key(|s| s.order());
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_match_declaration_order() {
        let kinds: Vec<SectionKind> = SectionKind::all().collect();
        assert_eq!(kinds.len(), 16);
        for (index, kind) in kinds.iter().enumerate() {
            assert_eq!(*kind as usize, index);
            assert_eq!(kind.order() as usize, index);
            assert_eq!(kind.info().kind, *kind);
        }
        assert_eq!(kinds.iter().filter(|k| k.is_front_page()).count(), 1);
    }

    #[test]
    fn keys_round_trip_through_from_str_and_serde() {
        for kind in SectionKind::all() {
            assert_eq!(kind.key().parse::<SectionKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.key()));
        }
        assert!(matches!(
            "discharge_summary".parse::<SectionKind>(),
            Err(ReportError::InvalidInput(_))
        ));
    }

    #[test]
    fn canonical_order_is_stable() {
        let sections = vec![
            Section::new(SectionKind::Plan, "first plan"),
            Section::new(SectionKind::FrontPage, ""),
            Section::new(SectionKind::Diagnosis, ""),
            Section::new(SectionKind::Plan, "second plan"),
        ];
        let ordered = canonical_order(&sections);
        let kinds: Vec<SectionKind> = ordered.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::FrontPage,
                SectionKind::Diagnosis,
                SectionKind::Plan,
                SectionKind::Plan
            ]
        );
        assert_eq!(ordered[2].content, "first plan");
        assert_eq!(ordered[3].content, "second plan");
    }
}
