//! `multipart/form-data` request bodies.
//!
//! A [`MultipartForm`] owns its part data so a descriptor stays immutable
//! and cloneable; the transport form (which is consumed on send) is built
//! from it at dispatch time.

use std::path::Path;

use tracing::debug;

/// One named part of a multipart body.
#[derive(Debug, Clone)]
struct Part {
    name: String,
    kind: PartKind,
}

#[derive(Debug, Clone)]
enum PartKind {
    Text(String),
    File {
        data: Vec<u8>,
        filename: String,
        content_type: Option<String>,
    },
}

/// Builder for `multipart/form-data` bodies (text fields, file payloads).
///
/// # Example
///
/// ```no_run
/// use netkit::http::{Method, MultipartForm, RequestDescriptor};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let form = MultipartForm::new()
///     .text("description", "monthly report")
///     .file("report", "/tmp/report.pdf")?;
/// let descriptor =
///     RequestDescriptor::new("https://example.com/upload", Method::Post)?.multipart(form);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

impl MultipartForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plain text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            kind: PartKind::Text(value.into()),
        });
        self
    }

    /// Adds a file part from in-memory bytes.
    ///
    /// `content_type` is attached verbatim when given; otherwise the part is
    /// sent as `application/octet-stream` by the transport.
    #[must_use]
    pub fn file_bytes(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            kind: PartKind::File {
                data,
                filename: filename.into(),
                content_type: content_type.map(str::to_string),
            },
        });
        self
    }

    /// Adds a file part read from disk, using the file name from the path.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the file cannot be read.
    pub fn file(self, name: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        debug!(path = %path.display(), bytes = data.len(), "read multipart file part");
        Ok(self.file_bytes(name, filename, data, None))
    }

    /// Returns the number of parts added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if no parts have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Builds the transport form, cloning part data.
    pub(crate) fn to_form(&self) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            match &part.kind {
                PartKind::Text(value) => {
                    form = form.text(part.name.clone(), value.clone());
                }
                PartKind::File {
                    data,
                    filename,
                    content_type,
                } => {
                    let mut transport_part = reqwest::multipart::Part::bytes(data.clone())
                        .file_name(filename.clone());
                    if let Some(mime) = content_type {
                        transport_part = transport_part.mime_str(mime)?;
                    }
                    form = form.part(part.name.clone(), transport_part);
                }
            }
        }
        Ok(form)
    }
}
