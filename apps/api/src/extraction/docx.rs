//! DOCX body-paragraph extraction over the package's `word/document.xml` part.

use std::io::{BufReader, Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::extraction::sniff::DOCX_DOCUMENT_PART;

#[derive(Debug, thiserror::Error)]
pub enum DocxError {
    #[error("invalid package: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Reads every top-level body paragraph and joins them with `\n`, in document order.
///
/// Paragraphs nested in tables, text boxes or content controls are not body
/// paragraphs and are skipped. Deleted revisions (`w:delText`) are ignored.
pub fn extract_paragraphs<R: Read + Seek>(reader: R) -> Result<String, DocxError> {
    let mut archive = ZipArchive::new(reader)?;
    let part = archive.by_name(DOCX_DOCUMENT_PART)?;

    let mut xml = Reader::from_reader(BufReader::new(part));
    xml.config_mut().trim_text(false);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    // Depth of paragraphs opened inside the current body paragraph.
    let mut nested = 0usize;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"p" {
                    if parent_is_body(&stack) {
                        current = Some(String::new());
                    } else if current.is_some() {
                        nested += 1;
                    }
                }
                if name == b"t" && current.is_some() && nested == 0 {
                    in_text = true;
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                if let Some(paragraph) = current.as_mut().filter(|_| nested == 0) {
                    match e.local_name().as_ref() {
                        b"tab" => paragraph.push('\t'),
                        b"br" | b"cr" => paragraph.push('\n'),
                        _ => {}
                    }
                }
                if e.local_name().as_ref() == b"p" && parent_is_body(&stack) {
                    paragraphs.push(String::new());
                }
            }
            Event::Text(t) if in_text => {
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) if in_text => {
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) => {
                stack.pop();
                match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"p" if parent_is_body(&stack) => {
                        if let Some(paragraph) = current.take() {
                            paragraphs.push(paragraph);
                        }
                    }
                    b"p" if nested > 0 => nested -= 1,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}

fn parent_is_body(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|name| name.as_slice() == b"body")
}


#[cfg(test)]
mod tests {
    use super::fixtures::{docx_from_body, docx_from_paragraphs};
    use super::*;
    use std::io::Cursor;

    fn extract(bytes: Vec<u8>) -> String {
        extract_paragraphs(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_paragraphs_joined_in_order() {
        let paragraphs = [
            "Jane Doe",
            "Senior Python Developer",
            "Skills: SQL, Docker & Kubernetes",
        ];
        assert_eq!(extract(docx_from_paragraphs(&paragraphs)), paragraphs.join("\n"));
    }

    #[test]
    fn test_runs_concatenate_within_paragraph() {
        let body = r#"<w:p><w:r><w:t>Rust</w:t></w:r><w:r><w:t xml:space="preserve"> and Go</w:t></w:r></w:p>"#;
        assert_eq!(extract(docx_from_body(body)), "Rust and Go");
    }

    #[test]
    fn test_empty_paragraphs_are_kept_as_blank_lines() {
        let body = r#"<w:p><w:r><w:t>Top</w:t></w:r></w:p><w:p/><w:p></w:p><w:p><w:r><w:t>Bottom</w:t></w:r></w:p>"#;
        assert_eq!(extract(docx_from_body(body)), "Top\n\n\nBottom");
    }

    #[test]
    fn test_tabs_and_breaks() {
        let body = r#"<w:p><w:r><w:t>Name</w:t><w:tab/><w:t>Jane</w:t><w:br/><w:t>Next</w:t></w:r></w:p>"#;
        assert_eq!(extract(docx_from_body(body)), "Name\tJane\nNext");
    }

    #[test]
    fn test_table_paragraphs_and_deleted_text_skipped() {
        let body = r#"<w:p><w:r><w:t>Body</w:t><w:delText>gone</w:delText></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;
        assert_eq!(extract(docx_from_body(body)), "Body");
    }

    #[test]
    fn test_text_box_paragraphs_skipped() {
        let body = r#"<w:p><w:r><w:t>Outer</w:t><w:pict><w:txbxContent><w:p><w:r><w:t>Boxed</w:t></w:r></w:p></w:txbxContent></w:pict></w:r></w:p>"#;
        assert_eq!(extract(docx_from_body(body)), "Outer");
    }

    #[test]
    fn test_escaped_entities_are_decoded() {
        assert_eq!(extract(docx_from_paragraphs(&["R&D <lead>"])), "R&D <lead>");
    }

    #[test]
    fn test_not_a_zip_is_package_error() {
        let err = extract_paragraphs(Cursor::new(b"plain text".to_vec())).unwrap_err();
        assert!(matches!(err, DocxError::Package(_)));
    }
}
