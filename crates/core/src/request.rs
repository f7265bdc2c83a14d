//! Decoding of export requests supplied by external stores.
//!
//! A request bundles the letter sections, the clinician signature and the risk history
//! needed for the narrative. Requests arrive as JSON (HTTP, most files) or YAML.

use crate::markup::Signature;
use crate::narrative::NarrativeInput;
use crate::sections::Section;
use crate::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub sections: Vec<Section>,
    pub signature: Signature,
    pub narrative: NarrativeInput,
}

impl ExportRequest {
    pub fn from_json_str(input: &str) -> ReportResult<Self> {
        serde_json::from_str(input).map_err(ReportError::JsonDeserialization)
    }

    pub fn from_yaml_str(input: &str) -> ReportResult<Self> {
        serde_yaml::from_str(input).map_err(ReportError::YamlDeserialization)
    }

    /// Read a request file, choosing YAML for `.yaml`/`.yml` and JSON otherwise.
    pub fn from_path(path: &Path) -> ReportResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(ReportError::ReadInput)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml_str(&contents)
        } else {
            Self::from_json_str(&contents)
        }
    }
}
