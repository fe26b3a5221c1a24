use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Extracts the text layer of a PDF on disk.
///
/// The underlying parser panics on some malformed inputs; panics are turned into
/// an error string so a single bad upload cannot take down the worker.
pub fn extract_pdf_text(path: &Path) -> Result<String, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("PDF parser aborted: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("PDF parser aborted: {s}")
    } else {
        "PDF parser aborted".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_truncated_pdf_is_an_error_not_a_panic() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog").unwrap();
        assert!(extract_pdf_text(file.path()).is_err());
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"boom"), "PDF parser aborted: boom");
        assert_eq!(
            panic_message(&"bad xref".to_string()),
            "PDF parser aborted: bad xref"
        );
        assert_eq!(panic_message(&42_u8), "PDF parser aborted");
    }
}
