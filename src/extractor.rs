use crate::error::ScreenerError;
use std::path::Path;

/// Extract plain text from a resume file. Supports PDF and DOCX; anything
/// else is rejected with `UnsupportedFormat`.
pub fn extract_text(path: &Path) -> crate::Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase());

    match extension.as_deref() {
        Some("pdf") => extract_pdf(path),
        Some("docx") => extract_docx(path),
        Some(other) => Err(ScreenerError::UnsupportedFormat(format!(".{}", other))),
        None => Err(ScreenerError::UnsupportedFormat("(no extension)".to_string())),
    }
}

fn extract_pdf(path: &Path) -> crate::Result<String> {
    pdf_extract::extract_text(path).map_err(|e| extraction_error(path, e))
}

fn extract_docx(path: &Path) -> crate::Result<String> {
    let data = std::fs::read(path).map_err(|e| extraction_error(path, e))?;
    let docx = docx_rs::read_docx(&data).map_err(|e| extraction_error(path, e))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for para_child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = para_child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

fn extraction_error(path: &Path, detail: impl std::fmt::Display) -> ScreenerError {
    ScreenerError::Extraction {
        path: path.display().to_string(),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "plain text resume").unwrap();

        match extract_text(&path) {
            Err(ScreenerError::UnsupportedFormat(ext)) => assert_eq!(ext, ".txt"),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn rejects_file_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume");
        fs::write(&path, "no extension").unwrap();

        assert!(matches!(
            extract_text(&path),
            Err(ScreenerError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_pdf_is_extraction_error() {
        let path = Path::new("/nonexistent/resume.pdf");
        assert!(matches!(
            extract_text(path),
            Err(ScreenerError::Extraction { .. })
        ));
    }

    #[test]
    fn corrupt_docx_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        fs::write(&path, b"this is not a zip archive").unwrap();

        assert!(matches!(
            extract_text(&path),
            Err(ScreenerError::Extraction { .. })
        ));
    }
}
