//! Export orchestration.
//!
//! The [`Exporter`] strings the pure synthesis components together and, separately,
//! persists finished artefacts. Synthesis and persistence fail with distinct errors so a
//! caller can tell "the report could not be built" from "the file could not be written".

use crate::archive::ArchiveWriter;
use crate::config::CoreConfig;
use crate::markup::{build_markup_body, Signature};
use crate::narrative::{synthesize, NarrativeInput};
use crate::package::package_parts;
use crate::sections::{canonical_order, Section};
use crate::{ReportError, ReportResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Builds document and narrative artefacts and writes them to the configured directory.
#[derive(Clone, Debug)]
pub struct Exporter {
    cfg: CoreConfig,
}

impl Exporter {
    pub fn new(cfg: CoreConfig) -> Self {
        Self { cfg }
    }

    /// Build the word-processing package for a letter.
    ///
    /// Sections may be supplied in any order; they are rendered in canonical order.
    pub fn document(&self, sections: &[Section], signature: &Signature) -> ReportResult<Vec<u8>> {
        let export_id = Uuid::new_v4();
        let span = tracing::debug_span!("export_document", %export_id);
        let _guard = span.enter();

        let ordered = canonical_order(sections);
        let body = build_markup_body(&ordered, signature);
        let parts = package_parts(&body);

        let mut writer = ArchiveWriter::new();
        for part in &parts {
            writer.add(part.name, &part.payload)?;
        }
        let bytes = writer.finish()?;

        tracing::debug!(
            sections = sections.len(),
            bytes = bytes.len(),
            "document synthesised"
        );
        Ok(bytes)
    }

    /// Build the plain-text risk narrative.
    pub fn narrative(&self, input: &NarrativeInput) -> ReportResult<String> {
        let export_id = Uuid::new_v4();
        let span = tracing::debug_span!("export_narrative", %export_id);
        let _guard = span.enter();

        Ok(synthesize(input).render())
    }

    /// Run [`document`](Self::document) on the blocking pool and resolve once it completes.
    pub async fn spawn_document(
        &self,
        sections: Vec<Section>,
        signature: Signature,
    ) -> ReportResult<Vec<u8>> {
        let exporter = self.clone();
        tokio::task::spawn_blocking(move || exporter.document(&sections, &signature)).await?
    }

    /// Run [`narrative`](Self::narrative) on the blocking pool and resolve once it completes.
    pub async fn spawn_narrative(&self, input: NarrativeInput) -> ReportResult<String> {
        let exporter = self.clone();
        tokio::task::spawn_blocking(move || exporter.narrative(&input)).await?
    }

    /// Write `bytes` to `file_name` inside the output directory.
    ///
    /// The data is written to a temporary file in the same directory and renamed into
    /// place, so a failure never leaves a partial artefact behind. An existing file with
    /// the same name is replaced.
    pub fn persist(&self, file_name: &str, bytes: &[u8]) -> ReportResult<PathBuf> {
        let file_name = validate_file_name(file_name)?;
        let dir = self.cfg.output_dir();
        let target = dir.join(file_name);

        let persistence = |source: std::io::Error| ReportError::Persistence {
            path: target.clone(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(persistence)?;
        tmp.write_all(bytes).map_err(persistence)?;
        tmp.as_file().sync_all().map_err(persistence)?;
        tmp.persist(&target).map_err(|e| persistence(e.error))?;

        tracing::info!("wrote {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }
}

fn validate_file_name(file_name: &str) -> ReportResult<&str> {
    let trimmed = file_name.trim();
    let is_plain = !trimmed.is_empty()
        && trimmed != "."
        && trimmed != ".."
        && Path::new(trimmed).file_name().and_then(|n| n.to_str()) == Some(trimmed)
        && !trimmed.contains(['/', '\\']);
    if !is_plain {
        return Err(ReportError::InvalidInput(format!(
            "file name must not contain path separators: {file_name:?}"
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::SectionKind;
    use report_types::NonEmptyText;

    fn exporter(dir: &Path) -> Exporter {
        Exporter::new(CoreConfig::new(dir.to_path_buf()).unwrap())
    }

    fn signature() -> Signature {
        Signature {
            name: NonEmptyText::new("Dr Priya Patel").unwrap(),
            registration_body: NonEmptyText::optional("GMC"),
            registration_number: NonEmptyText::optional("7012345"),
        }
    }

    #[test]
    fn document_is_a_three_member_archive_in_canonical_order() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = exporter(tmp.path());
        let sections = vec![
            Section::new(SectionKind::Plan, "Review in clinic"),
            Section::new(SectionKind::FrontPage, "Name: Sam"),
        ];

        let bytes = exporter.document(&sections, &signature()).unwrap();

        assert_eq!(&bytes[..4], b"PK\x03\x04");
        let end = bytes.len() - 22;
        assert_eq!(&bytes[end..end + 4], b"PK\x05\x06");
        assert_eq!(u16::from_le_bytes([bytes[end + 10], bytes[end + 11]]), 3);

        let text = String::from_utf8_lossy(&bytes);
        let table_at = text.find("<w:tbl>").unwrap();
        let plan_at = text.find(">Plan<").unwrap();
        assert!(table_at < plan_at);
        assert!(text.contains(">GMC: 7012345<"));
    }

    #[test]
    fn document_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = exporter(tmp.path());
        let sections = vec![Section::new(SectionKind::Diagnosis, "F32.1")];
        let first = exporter.document(&sections, &signature()).unwrap();
        let second = exporter.document(&sections, &signature()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn persist_writes_atomically_into_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = exporter(tmp.path());

        let path = exporter.persist("letter.docx", b"first").unwrap();
        assert_eq!(path, tmp.path().join("letter.docx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        exporter.persist("letter.docx", b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        let leftovers = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn persist_rejects_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = exporter(tmp.path());
        for bad in ["", "..", "../escape.docx", "nested/letter.docx", "a\\b.txt"] {
            assert!(
                matches!(
                    exporter.persist(bad, b"x"),
                    Err(ReportError::InvalidInput(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn persist_failure_is_a_persistence_error() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = exporter(tmp.path());
        std::fs::remove_dir(tmp.path()).unwrap();

        let err = exporter.persist("letter.docx", b"x").unwrap_err();
        assert!(matches!(err, ReportError::Persistence { .. }));
    }

    #[tokio::test]
    async fn spawned_exports_match_inline_exports() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = exporter(tmp.path());
        let sections = vec![Section::new(SectionKind::Formulation, "**Stable** mood")];

        let inline = exporter.document(&sections, &signature()).unwrap();
        let spawned = exporter
            .spawn_document(sections.clone(), signature())
            .await
            .unwrap();
        assert_eq!(inline, spawned);
    }
}
