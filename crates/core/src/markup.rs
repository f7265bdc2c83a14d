//! Word-processing markup generation for clinical letters.
//!
//! Converts ordered letter sections and the clinician signature into the body of a
//! WordprocessingML document. Only the subset the letters need is produced: paragraphs,
//! bold runs and one bordered two-column table style for the front page.
//!
//! Nothing here can fail. Malformed input (an unterminated `**` or a front-page line with
//! no colon) degrades to plain text or is skipped.

use crate::codec::escape_markup_text;
use crate::constants::{EMPTY_SECTION_TEXT, MEDICATIONS_LABEL, MEDICATIONS_MARKER};
use crate::sections::Section;
use report_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// Width of the front-page label column in twips.
const LABEL_COLUMN_TWIPS: u32 = 3000;
/// Width of the front-page value column in twips.
const VALUE_COLUMN_TWIPS: u32 = 6000;
/// Fill colour of the label column.
const LABEL_SHADING: &str = "D9D9D9";

const BORDER_EDGES: [&str; 6] = ["top", "left", "bottom", "right", "insideH", "insideV"];

/// A run of text within one line, either plain or bold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineSpan<'a> {
    Plain(&'a str),
    Bold(&'a str),
}

impl<'a> InlineSpan<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            InlineSpan::Plain(t) | InlineSpan::Bold(t) => t,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, InlineSpan::Bold(_))
    }
}

/// Splits a line into plain and bold spans on `**...**` delimiter pairs.
///
/// Pairs are matched left to right and never nest. An opening delimiter with no partner
/// yields one trailing plain span holding the delimiter and everything after it. Empty
/// spans are not emitted.
pub fn parse_inline_spans(line: &str) -> Vec<InlineSpan<'_>> {
    const DELIMITER: &str = "**";

    let mut spans = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find(DELIMITER) {
        let (before, from_open) = rest.split_at(open);
        push_span(&mut spans, InlineSpan::Plain(before));

        let inner = &from_open[DELIMITER.len()..];
        match inner.find(DELIMITER) {
            Some(close) => {
                push_span(&mut spans, InlineSpan::Bold(&inner[..close]));
                rest = &inner[close + DELIMITER.len()..];
            }
            None => {
                push_span(&mut spans, InlineSpan::Plain(from_open));
                return spans;
            }
        }
    }

    push_span(&mut spans, InlineSpan::Plain(rest));
    spans
}

fn push_span<'a>(spans: &mut Vec<InlineSpan<'a>>, span: InlineSpan<'a>) {
    if !span.text().is_empty() {
        spans.push(span);
    }
}

/// Clinician sign-off printed after the last section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: NonEmptyText,
    #[serde(default, deserialize_with = "report_types::blank_as_none")]
    pub registration_body: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "report_types::blank_as_none")]
    pub registration_number: Option<NonEmptyText>,
}

impl Signature {
    /// The registration line, if there is enough information to print one.
    pub fn registration_line(&self) -> Option<String> {
        match (&self.registration_body, &self.registration_number) {
            (Some(body), Some(number)) => Some(format!("{body}: {number}")),
            (None, Some(number)) => Some(number.to_string()),
            _ => None,
        }
    }
}

/// One label/value row of the front-page table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub label: String,
    pub value: String,
}

impl TableRow {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Collects the front-page table rows from free-text `Label: value` lines.
///
/// Once a line reading exactly `Medications:` is seen, every later non-blank line is a
/// medication; they are joined into one row appended after all other rows. Content that
/// yields no rows at all falls back to the stub rows `Patient` and `Date of Letter`, so the
/// table is never empty.
pub fn front_page_rows(content: &str) -> Vec<TableRow> {
    let mut rows = Vec::new();
    let mut medications: Vec<&str> = Vec::new();
    let mut in_medications = false;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if in_medications {
            medications.push(line);
            continue;
        }
        if line == MEDICATIONS_MARKER {
            in_medications = true;
            continue;
        }
        match line.split_once(':') {
            Some((label, value)) if !label.trim().is_empty() => {
                rows.push(TableRow::new(label.trim(), value.trim()));
            }
            _ => tracing::warn!("skipping front-page line without a label"),
        }
    }

    if !medications.is_empty() {
        rows.push(TableRow::new(MEDICATIONS_LABEL, medications.join(", ")));
    }

    if rows.is_empty() {
        return stub_rows();
    }
    rows
}

fn stub_rows() -> Vec<TableRow> {
    vec![TableRow::new("Patient", ""), TableRow::new("Date of Letter", "")]
}

/// Splits section text into blank-line separated paragraphs, each a list of physical lines.
fn paragraphs(content: &str) -> Vec<Vec<&str>> {
    let mut out: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for raw in content.lines() {
        if raw.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(raw);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }

    out
}

/// Builds the markup body for a letter.
///
/// Sections must already be in canonical order; see
/// [`canonical_order`](crate::sections::canonical_order).
#[derive(Debug, Default)]
pub struct DocumentMarkupBuilder {
    out: String,
}

impl DocumentMarkupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders every section followed by the signature block.
    pub fn build(mut self, sections: &[&Section], signature: &Signature) -> String {
        for section in sections {
            if section.kind.is_front_page() {
                self.front_page(&section.content);
            } else {
                self.titled_section(section);
            }
        }
        self.signature(signature);
        self.out
    }

    fn front_page(&mut self, content: &str) {
        let rows = front_page_rows(content);

        self.out.push_str("<w:tbl><w:tblPr>");
        self.out.push_str(&format!(
            "<w:tblW w:w=\"{}\" w:type=\"dxa\"/>",
            LABEL_COLUMN_TWIPS + VALUE_COLUMN_TWIPS
        ));
        self.out.push_str("<w:tblBorders>");
        for edge in BORDER_EDGES {
            self.out.push_str(&format!(
                "<w:{edge} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"000000\"/>"
            ));
        }
        self.out.push_str("</w:tblBorders><w:tblLayout w:type=\"fixed\"/></w:tblPr>");
        self.out.push_str(&format!(
            "<w:tblGrid><w:gridCol w:w=\"{LABEL_COLUMN_TWIPS}\"/><w:gridCol w:w=\"{VALUE_COLUMN_TWIPS}\"/></w:tblGrid>"
        ));

        for row in &rows {
            self.out.push_str("<w:tr>");

            self.out.push_str(&format!(
                "<w:tc><w:tcPr><w:tcW w:w=\"{LABEL_COLUMN_TWIPS}\" w:type=\"dxa\"/><w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{LABEL_SHADING}\"/></w:tcPr>"
            ));
            self.paragraph(&[InlineSpan::Bold(&row.label)]);
            self.out.push_str("</w:tc>");

            self.out.push_str(&format!(
                "<w:tc><w:tcPr><w:tcW w:w=\"{VALUE_COLUMN_TWIPS}\" w:type=\"dxa\"/></w:tcPr>"
            ));
            self.paragraph(&[InlineSpan::Plain(&row.value)]);
            self.out.push_str("</w:tc>");

            self.out.push_str("</w:tr>");
        }

        self.out.push_str("</w:tbl>");
        self.spacer();
    }

    fn titled_section(&mut self, section: &Section) {
        self.paragraph(&[InlineSpan::Bold(section.title())]);

        let paragraphs = paragraphs(&section.content);
        if paragraphs.is_empty() {
            self.paragraph(&[InlineSpan::Plain(EMPTY_SECTION_TEXT)]);
        }
        for line in paragraphs.iter().flatten() {
            self.paragraph(&parse_inline_spans(line));
        }

        self.spacer();
    }

    fn signature(&mut self, signature: &Signature) {
        self.paragraph(&[InlineSpan::Bold(signature.name.as_str())]);
        if let Some(line) = signature.registration_line() {
            self.paragraph(&[InlineSpan::Plain(&line)]);
        }
    }

    fn paragraph(&mut self, spans: &[InlineSpan<'_>]) {
        self.out.push_str("<w:p>");
        for span in spans {
            self.run(span);
        }
        self.out.push_str("</w:p>");
    }

    fn run(&mut self, span: &InlineSpan<'_>) {
        self.out.push_str("<w:r>");
        if span.is_bold() {
            self.out.push_str("<w:rPr><w:b/></w:rPr>");
        }
        let text = span.text();
        if text.is_empty() {
            self.out.push_str("<w:t/>");
        } else {
            self.out.push_str("<w:t xml:space=\"preserve\">");
            self.out.push_str(&escape_markup_text(text));
            self.out.push_str("</w:t>");
        }
        self.out.push_str("</w:r>");
    }

    fn spacer(&mut self) {
        self.out.push_str("<w:p/>");
    }
}

/// Convenience wrapper around [`DocumentMarkupBuilder`].
pub fn build_markup_body(sections: &[&Section], signature: &Signature) -> String {
    DocumentMarkupBuilder::new().build(sections, signature)
}
