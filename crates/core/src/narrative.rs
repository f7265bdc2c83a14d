//! Prose risk summary synthesis.
//!
//! Turns the classified risk history of one patient into a three-block plain-text report:
//! an overview of counts, an admission history and a chronological narrative. Output is
//! deterministic template assembly; the same input always yields the same text.

use crate::constants::{NARRATIVE_RULE_WIDTH, STABLE_COMMUNITY_DAYS};
use crate::risk::{capitalise, IncidentCategory, Pronouns, RiskEpisode, RiskIncident};
use chrono::{Datelike, NaiveDate};
use report_types::NonEmptyText;
use serde::{Deserialize, Serialize};

const MONTH_YEAR: &str = "%B %Y";
const LIST_DATE: &str = "%d/%m/%Y";
const PROSE_DATE: &str = "%-d %B %Y";

/// Who the report is about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentity {
    pub first_name: NonEmptyText,
    pub pronouns: Pronouns,
}

/// Everything the synthesizer reads. Episodes and incidents need not be sorted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeInput {
    pub patient: PatientIdentity,
    #[serde(default)]
    pub episodes: Vec<RiskEpisode>,
    #[serde(default)]
    pub incidents: Vec<RiskIncident>,
    /// Overall risk label from the upstream assessment, e.g. "High".
    pub overall_risk: NonEmptyText,
    /// Dates of every clinical note; only the earliest and latest matter.
    #[serde(default)]
    pub note_dates: Vec<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrativeBlock {
    pub title: &'static str,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrativeReport {
    pub overview: NarrativeBlock,
    pub admission_history: Option<NarrativeBlock>,
    pub narrative: NarrativeBlock,
}

impl NarrativeReport {
    /// Blocks in output order, skipping absent ones.
    pub fn blocks(&self) -> impl Iterator<Item = &NarrativeBlock> {
        std::iter::once(&self.overview)
            .chain(self.admission_history.as_ref())
            .chain(std::iter::once(&self.narrative))
    }

    /// Plain-text rendering: each title underlined with dashes, blocks separated by a blank line.
    pub fn render(&self) -> String {
        let rule = "-".repeat(NARRATIVE_RULE_WIDTH);
        let mut out = String::new();
        for (index, block) in self.blocks().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(block.title);
            out.push('\n');
            out.push_str(&rule);
            out.push('\n');
            for line in &block.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

/// Earliest and latest note dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ReportingPeriod {
    first: NaiveDate,
    last: NaiveDate,
}

impl ReportingPeriod {
    fn from_dates(dates: &[NaiveDate]) -> Option<Self> {
        let first = *dates.iter().min()?;
        let last = *dates.iter().max()?;
        Some(Self { first, last })
    }

    /// Calendar months touched by the period, counting both ends, never less than one.
    fn months(&self) -> i32 {
        let span = (self.last.year() - self.first.year()) * 12 + self.last.month() as i32
            - self.first.month() as i32
            + 1;
        span.max(1)
    }
}

/// "1 day", "3 days".
fn count_noun(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// "1 incident was", "2 incidents were".
fn incidents_recorded(count: usize) -> String {
    let verb = if count == 1 { "was" } else { "were" };
    format!("{} {verb} recorded", count_noun(count, "incident"))
}

fn incidents_within(episode: &RiskEpisode, incidents: &[RiskIncident]) -> usize {
    incidents.iter().filter(|i| episode.contains(i.date)).count()
}

/// Build the report. Never fails; missing data is reported by omission.
pub fn synthesize(input: &NarrativeInput) -> NarrativeReport {
    let mut episodes: Vec<&RiskEpisode> = input.episodes.iter().collect();
    episodes.sort_by_key(|e| e.start());
    let period = ReportingPeriod::from_dates(&input.note_dates);

    let report = NarrativeReport {
        overview: overview(&episodes, &input.incidents, period),
        admission_history: admission_history(&episodes),
        narrative: narrative(input, &episodes, period),
    };

    tracing::debug!(
        episodes = episodes.len(),
        incidents = input.incidents.len(),
        has_admissions = report.admission_history.is_some(),
        "narrative synthesised"
    );
    report
}

fn overview(
    episodes: &[&RiskEpisode],
    incidents: &[RiskIncident],
    period: Option<ReportingPeriod>,
) -> NarrativeBlock {
    let mut lines = Vec::new();

    if let Some(period) = period {
        lines.push(format!(
            "Reporting period: {} to {}",
            period.first.format(MONTH_YEAR),
            period.last.format(MONTH_YEAR)
        ));
        lines.push(format!("Total months reviewed: {}", period.months()));
    }

    let admissions: Vec<&&RiskEpisode> = episodes.iter().filter(|e| e.is_inpatient()).collect();
    if admissions.is_empty() {
        lines.push("Admissions: None recorded".to_string());
    } else {
        let inpatient_days: i64 = admissions.iter().map(|e| e.duration_days()).sum();
        lines.push(format!("Admissions: {}", admissions.len()));
        lines.push(format!("Total inpatient days: {inpatient_days}"));
    }

    lines.push(format!("Total incidents: {}", incidents.len()));
    for category in IncidentCategory::HEADLINE {
        let count = incidents.iter().filter(|i| i.category == category).count();
        if count > 0 {
            lines.push(format!("\u{2022} {}: {count}", category.label()));
        }
    }

    NarrativeBlock {
        title: "Overview",
        lines,
    }
}

fn admission_history(episodes: &[&RiskEpisode]) -> Option<NarrativeBlock> {
    let lines: Vec<String> = episodes
        .iter()
        .filter(|e| e.is_inpatient())
        .enumerate()
        .map(|(index, e)| {
            format!(
                "Admission {}: {} to {} ({})",
                index + 1,
                e.start().format(LIST_DATE),
                e.end().format(LIST_DATE),
                count_noun(e.duration_days() as usize, "day")
            )
        })
        .collect();

    if lines.is_empty() {
        return None;
    }
    Some(NarrativeBlock {
        title: "Admission History",
        lines,
    })
}

fn narrative(
    input: &NarrativeInput,
    episodes: &[&RiskEpisode],
    period: Option<ReportingPeriod>,
) -> NarrativeBlock {
    let title = "Narrative";
    let Some(period) = period else {
        return NarrativeBlock {
            title,
            lines: vec![
                "There is insufficient data in the available notes to produce a narrative summary."
                    .to_string(),
            ],
        };
    };

    let pronouns = &input.patient.pronouns;
    let mut sentences = vec![format!(
        "The available records for {} begin in {}.",
        input.patient.first_name,
        period.first.format(MONTH_YEAR)
    )];

    for (index, episode) in episodes.iter().enumerate() {
        if let Some(sentence) = episode_sentence(index, episode, &input.incidents, pronouns) {
            sentences.push(sentence);
        }
    }

    sentences.push(format!(
        "Overall, {} risk is currently assessed as {}, with {} across the review period.",
        pronouns.possessive_inline(),
        input.overall_risk.as_str().to_lowercase(),
        match input.incidents.len() {
            0 => "no incidents recorded".to_string(),
            n => format!("{} recorded", count_noun(n, "incident")),
        }
    ));

    NarrativeBlock {
        title,
        lines: vec![sentences.join(" ")],
    }
}

fn episode_sentence(
    index: usize,
    episode: &RiskEpisode,
    incidents: &[RiskIncident],
    pronouns: &Pronouns,
) -> Option<String> {
    let within = incidents_within(episode, incidents);
    let days = episode.duration_days();

    if episode.is_inpatient() {
        let mut sentence = format!(
            "{} {} admitted to hospital on {}",
            pronouns.subject_initial(),
            pronouns.was(),
            episode.start().format(PROSE_DATE)
        );
        if days > 0 {
            sentence.push_str(&format!(
                ", with a length of stay of {}",
                count_noun(days as usize, "day")
            ));
        }
        if within > 0 {
            sentence.push_str(&format!(", during which {}", incidents_recorded(within)));
        }
        sentence.push('.');
        return Some(sentence);
    }

    if within > 0 {
        let sentence = if index == 0 {
            capitalise(&format!(
                "while in the community between {} and {}, {}.",
                episode.start().format(PROSE_DATE),
                episode.end().format(PROSE_DATE),
                incidents_recorded(within)
            ))
        } else {
            format!(
                "Following discharge, {} returned to the community, where {} up to {}.",
                pronouns.subject_inline(),
                incidents_recorded(within),
                episode.end().format(PROSE_DATE)
            )
        };
        return Some(sentence);
    }

    if days > STABLE_COMMUNITY_DAYS {
        return Some(format!(
            "{} remained settled in the community for {} with no recorded incidents.",
            pronouns.subject_initial(),
            count_noun(days as usize, "day")
        ));
    }

    None
}
