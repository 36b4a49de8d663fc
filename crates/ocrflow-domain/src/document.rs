//! Uploaded document - the input of one extraction request

use bytes::Bytes;
use std::path::Path;

/// Fallback name used when an upload arrives without a usable filename
pub const DEFAULT_FILENAME: &str = "upload";

/// A document received from a caller
///
/// Immutable once constructed. The content is reference-counted so handing it
/// to the extraction client does not copy the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    filename: String,
    content: Bytes,
}

impl UploadedDocument {
    /// Create a document from its original filename and raw bytes
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// The filename exactly as the caller supplied it
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Raw document bytes
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Size of the document in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the document has no content
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The final path component of the supplied filename
    ///
    /// Client-supplied names such as `../../etc/passwd` or `C:\docs\a.pdf`
    /// are reduced to `passwd` and `a.pdf`, so the name can never address
    /// anything outside the namespace it is stored in.
    pub fn safe_filename(&self) -> String {
        let last = self
            .filename
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or_default()
            .trim();

        match last {
            "" | "." | ".." => DEFAULT_FILENAME.to_string(),
            name => name.to_string(),
        }
    }

    /// The safe filename with its last extension removed
    ///
    /// `invoice.pdf` → `invoice`, `scan.tar.gz` → `scan.tar`, `.env` → `.env`.
    pub fn base_name(&self) -> String {
        let safe = self.safe_filename();
        Path::new(&safe)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .unwrap_or(safe)
    }
}
