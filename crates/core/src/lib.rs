//! # Report Core
//!
//! Clinical report synthesis for letters and risk summaries.
//!
//! This crate turns structured clinical state into two artefacts:
//! - a word-processing document built by hand: markup generation ([`markup`]), package
//!   parts ([`package`]) and an uncompressed container writer ([`archive`]) on top of the
//!   byte primitives in [`codec`]
//! - a plain-text risk narrative ([`narrative`]) assembled from templates
//!
//! The synthesis components are pure functions over fully materialised input. The
//! [`Exporter`] orchestrates them and owns the only I/O: writing finished artefacts.
//!
//! **No API concerns**: HTTP and CLI front ends live in `report-run` and `report-cli`.

pub mod archive;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod markup;
pub mod narrative;
pub mod package;
pub mod request;
pub mod risk;
pub mod sections;

pub use config::{resolve_output_dir, CoreConfig};
pub use error::{ReportError, ReportResult};
pub use export::Exporter;
pub use markup::Signature;
pub use narrative::{NarrativeInput, NarrativeReport, PatientIdentity};
pub use report_types::NonEmptyText;
pub use request::ExportRequest;
pub use risk::{EpisodeKind, IncidentCategory, Pronouns, RiskEpisode, RiskIncident, Severity};
pub use sections::{Section, SectionKind};
