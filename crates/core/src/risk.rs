//! Risk history inputs consumed by the narrative synthesizer.
//!
//! Episodes and incidents are produced by an upstream classifier; this module only carries
//! them and enforces the date invariants the synthesizer depends on.

use crate::{ReportError, ReportResult};
use chrono::NaiveDate;
use report_types::NonEmptyText;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeKind {
    Inpatient,
    Community,
}

/// A contiguous period spent either on a ward or in the community.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RiskEpisodeWire")]
pub struct RiskEpisode {
    kind: EpisodeKind,
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RiskEpisodeWire {
    kind: EpisodeKind,
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RiskEpisodeWire> for RiskEpisode {
    type Error = ReportError;

    fn try_from(wire: RiskEpisodeWire) -> ReportResult<Self> {
        RiskEpisode::new(wire.kind, wire.start, wire.end)
    }
}

impl RiskEpisode {
    pub fn new(kind: EpisodeKind, start: NaiveDate, end: NaiveDate) -> ReportResult<Self> {
        if end < start {
            return Err(ReportError::InvalidInput(format!(
                "episode ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { kind, start, end })
    }

    pub fn kind(&self) -> EpisodeKind {
        self.kind
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_inpatient(&self) -> bool {
        self.kind == EpisodeKind::Inpatient
    }

    /// Whole days from start to end, not counting the start day: a stay from 1 to 15 March
    /// is 14 days and a same-day episode lasts zero days. This is the figure printed as
    /// `(N days)` in the admission history. Incident matching uses [`contains`], which
    /// includes both ends.
    ///
    /// [`contains`]: RiskEpisode::contains
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether `date` falls within the episode, both ends inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentCategory {
    PhysicalAggression,
    VerbalAggression,
    SelfHarm,
    PropertyDamage,
    Absconding,
    SexualDisinhibition,
    SubstanceMisuse,
    NonCompliance,
}

impl IncidentCategory {
    /// Categories broken out individually in the report overview, in display order.
    pub const HEADLINE: [IncidentCategory; 3] = [
        IncidentCategory::PhysicalAggression,
        IncidentCategory::VerbalAggression,
        IncidentCategory::SelfHarm,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IncidentCategory::PhysicalAggression => "Physical aggression",
            IncidentCategory::VerbalAggression => "Verbal aggression",
            IncidentCategory::SelfHarm => "Self-harm",
            IncidentCategory::PropertyDamage => "Property damage",
            IncidentCategory::Absconding => "Absconding",
            IncidentCategory::SexualDisinhibition => "Sexual disinhibition",
            IncidentCategory::SubstanceMisuse => "Substance misuse",
            IncidentCategory::NonCompliance => "Non-compliance",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Low,
    Moderate,
    High,
}

/// One classified incident extracted from the notes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskIncident {
    pub date: NaiveDate,
    pub category: IncidentCategory,
    #[serde(default)]
    pub severity: Severity,
}

/// Subject and possessive pronouns used when writing about the patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronouns {
    pub subject: NonEmptyText,
    pub possessive: NonEmptyText,
}

impl Pronouns {
    pub fn new(subject: &str, possessive: &str) -> ReportResult<Self> {
        let invalid = |_: report_types::TextError| {
            ReportError::InvalidInput("pronouns cannot be empty".into())
        };
        Ok(Self {
            subject: NonEmptyText::new(subject).map_err(invalid)?,
            possessive: NonEmptyText::new(possessive).map_err(invalid)?,
        })
    }

    /// Subject pronoun for use at the start of a sentence.
    pub fn subject_initial(&self) -> String {
        capitalise(&self.subject.as_str().to_lowercase())
    }

    /// Subject pronoun for use mid-sentence.
    pub fn subject_inline(&self) -> String {
        self.subject.as_str().to_lowercase()
    }

    pub fn possessive_inline(&self) -> String {
        self.possessive.as_str().to_lowercase()
    }

    /// Past tense of "to be" agreeing with the subject pronoun.
    pub fn was(&self) -> &'static str {
        if self.subject.as_str().eq_ignore_ascii_case("they") {
            "were"
        } else {
            "was"
        }
    }
}

pub(crate) fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn episode_duration_and_window() {
        let episode =
            RiskEpisode::new(EpisodeKind::Inpatient, date(2023, 3, 1), date(2023, 3, 15)).unwrap();
        assert_eq!(episode.duration_days(), 14);
        assert!(episode.contains(date(2023, 3, 1)));
        assert!(episode.contains(date(2023, 3, 15)));
        assert!(!episode.contains(date(2023, 3, 16)));

        let same_day =
            RiskEpisode::new(EpisodeKind::Community, date(2023, 4, 2), date(2023, 4, 2)).unwrap();
        assert_eq!(same_day.duration_days(), 0);
    }

    #[test]
    fn rejects_reversed_episode_including_on_deserialise() {
        assert!(matches!(
            RiskEpisode::new(EpisodeKind::Community, date(2023, 5, 2), date(2023, 5, 1)),
            Err(ReportError::InvalidInput(_))
        ));

        let json = r#"{"kind":"community","start":"2023-05-02","end":"2023-05-01"}"#;
        assert!(serde_json::from_str::<RiskEpisode>(json).is_err());

        let json = r#"{"kind":"inpatient","start":"2023-05-01","end":"2023-05-09"}"#;
        let episode: RiskEpisode = serde_json::from_str(json).unwrap();
        assert!(episode.is_inpatient());
        assert_eq!(episode.duration_days(), 8);
    }

    #[test]
    fn incident_severity_defaults_to_low() {
        let json = r#"{"date":"2023-02-10","category":"self_harm"}"#;
        let incident: RiskIncident = serde_json::from_str(json).unwrap();
        assert_eq!(incident.category, IncidentCategory::SelfHarm);
        assert_eq!(incident.severity, Severity::Low);
    }

    #[test]
    fn pronoun_casing_and_agreement() {
        let he = Pronouns::new("He", "His").unwrap();
        assert_eq!(he.subject_initial(), "He");
        assert_eq!(he.subject_inline(), "he");
        assert_eq!(he.possessive_inline(), "his");
        assert_eq!(he.was(), "was");

        let they = Pronouns::new("They", "their").unwrap();
        assert_eq!(they.subject_initial(), "They");
        assert_eq!(they.was(), "were");

        assert!(Pronouns::new(" ", "her").is_err());
    }
}
