//! Constants used throughout the report core crate.
//!
//! Package member names, MIME types and the fixed strings the synthesis components emit
//! live here so that the builders and their tests agree on a single spelling.

/// Default directory for exported artefacts when no explicit directory is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "exports";

/// Package member describing the content type of every part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Package-level relationships part.
pub const RELATIONSHIPS_PART: &str = "_rels/.rels";

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// MIME type of the word-processing package.
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Paragraph emitted for a non-front-page section with no content.
pub const EMPTY_SECTION_TEXT: &str = "Nil of note";

/// Front-page line that switches the table builder into medication accumulation.
pub const MEDICATIONS_MARKER: &str = "Medications:";

/// Label of the synthesised medication row.
pub const MEDICATIONS_LABEL: &str = "Medications";

/// Width of the dash rule under each narrative block title.
pub const NARRATIVE_RULE_WIDTH: usize = 40;

/// Community episodes longer than this with no incidents earn a stability sentence.
pub const STABLE_COMMUNITY_DAYS: i64 = 30;
