//! The three fixed members of a minimal word-processing package.

use crate::constants::{CONTENT_TYPES_PART, DOCUMENT_PART, RELATIONSHIPS_PART};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES_XML: &str = concat!(
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#,
);

const RELATIONSHIPS_XML: &str = concat!(
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#,
);

const DOCUMENT_OPEN: &str =
    r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

// A4 portrait, one inch margins.
const SECTION_PROPERTIES: &str = concat!(
    r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
    r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>"#,
    r#"</w:sectPr>"#,
);

const DOCUMENT_CLOSE: &str = "</w:body></w:document>";

/// A named package member ready for archiving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackagePart {
    pub name: &'static str,
    pub payload: Vec<u8>,
}

pub fn content_types_xml() -> String {
    format!("{XML_DECLARATION}{CONTENT_TYPES_XML}")
}

pub fn relationships_xml() -> String {
    format!("{XML_DECLARATION}{RELATIONSHIPS_XML}")
}

/// Wraps a markup body produced by the builder into a complete main document.
pub fn document_xml(body: &str) -> String {
    let mut out = String::with_capacity(
        XML_DECLARATION.len()
            + DOCUMENT_OPEN.len()
            + body.len()
            + SECTION_PROPERTIES.len()
            + DOCUMENT_CLOSE.len(),
    );
    out.push_str(XML_DECLARATION);
    out.push_str(DOCUMENT_OPEN);
    out.push_str(body);
    out.push_str(SECTION_PROPERTIES);
    out.push_str(DOCUMENT_CLOSE);
    out
}

/// The package members in archive order: content types, relationships, main document.
pub fn package_parts(body: &str) -> Vec<PackagePart> {
    vec![
        PackagePart {
            name: CONTENT_TYPES_PART,
            payload: content_types_xml().into_bytes(),
        },
        PackagePart {
            name: RELATIONSHIPS_PART,
            payload: relationships_xml().into_bytes(),
        },
        PackagePart {
            name: DOCUMENT_PART,
            payload: document_xml(body).into_bytes(),
        },
    ]
}
