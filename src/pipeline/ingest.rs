//! Upload ingress: validate the declared filename and stage the bytes on disk.
//!
//! pdfium opens documents by path, so the uploaded bytes are written to a
//! uniquely named temporary file. [`TransientPdf`] owns that file through a
//! `NamedTempFile`; dropping it removes the file, which covers every exit
//! path of a request (success, OCR failure, parse failure, panic unwind).

use crate::error::ExtractError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Whether the declared upload filename names a PDF.
///
/// Only the extension is inspected; the content is validated later by the
/// rasterizer, which fails loudly on non-PDF bytes.
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.ends_with(".pdf")
}

/// Reject uploads whose filename is not a PDF.
pub fn validate_filename(filename: &str) -> Result<(), ExtractError> {
    if is_pdf_filename(filename) {
        Ok(())
    } else {
        Err(ExtractError::NotAPdf {
            filename: filename.to_string(),
        })
    }
}

/// An uploaded document materialised to a temporary `.pdf` file.
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct TransientPdf {
    file: NamedTempFile,
}

impl TransientPdf {
    /// Write `bytes` to a fresh temporary file with a `.pdf` suffix.
    pub fn persist(bytes: &[u8]) -> Result<Self, ExtractError> {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|source| ExtractError::TransientStorage { source })?;
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|source| ExtractError::TransientStorage { source })?;

        debug!(
            "Saved uploaded PDF ({} bytes) to temporary path: {}",
            bytes.len(),
            file.path().display()
        );
        Ok(Self { file })
    }

    /// Path of the temporary file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_filename() {
        assert!(is_pdf_filename("form.pdf"));
        assert!(is_pdf_filename("scan 2024.final.pdf"));
        assert!(!is_pdf_filename("report.docx"));
        assert!(!is_pdf_filename("form.pdf.exe"));
        assert!(!is_pdf_filename(""));
    }

    #[test]
    fn validate_filename_rejects_non_pdf() {
        let err = validate_filename("report.docx").unwrap_err();
        assert!(matches!(err, ExtractError::NotAPdf { ref filename } if filename == "report.docx"));
    }

    #[test]
    fn transient_pdf_is_removed_on_drop() {
        let staged = TransientPdf::persist(b"%PDF-1.7\n").expect("persist");
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7\n");

        drop(staged);
        assert!(!path.exists(), "temp file must be removed on drop");
    }

    #[test]
    fn transient_pdf_paths_are_unique() {
        let a = TransientPdf::persist(b"a").unwrap();
        let b = TransientPdf::persist(b"b").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
