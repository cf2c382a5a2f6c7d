//! Multipart payloads for write endpoints.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::http::FormPart;

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldValue {
    Text(String),
    File(PathBuf),
}

/// Form fields sent to a write endpoint.
///
/// File fields only record a path. The file is opened when the request is
/// sent and streamed from disk, so a `Form` can be built up front and is
/// cheap to clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, FieldValue)>,
}

impl Form {
    /// Create an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FieldValue::Text(value.into())));
        self
    }

    /// Add a file field streamed from `path`.
    pub fn file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.fields.push((name.into(), FieldValue::File(path.into())));
        self
    }

    /// Payload for uploading `file_name` into a version branch.
    ///
    /// Produces `files[{file_name}]`, `export_patterns[{file_name}]` and `branch`.
    pub fn versioned_file(
        file_name: &str,
        path: impl AsRef<Path>,
        export_pattern: &str,
        branch: &str,
    ) -> Self {
        Self::new()
            .file(format!("files[{}]", file_name), path.as_ref())
            .text(format!("export_patterns[{}]", file_name), export_pattern)
            .text("branch", branch)
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a text field by name.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(n, v)| match v {
            FieldValue::Text(text) if n == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Open every file field and produce sendable parts.
    ///
    /// Fails before anything is sent if a file cannot be opened. Files opened
    /// so far are closed when the partial list is dropped.
    pub(crate) async fn open(&self) -> Result<Vec<FormPart>> {
        let mut parts = Vec::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            let part = match value {
                FieldValue::Text(text) => FormPart::Text {
                    name: name.clone(),
                    value: text.clone(),
                },
                FieldValue::File(path) => {
                    let file = tokio::fs::File::open(path).await?;
                    let metadata = file.metadata().await?;
                    // Directories open fine on Unix but fail mid-upload.
                    if !metadata.is_file() {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            format!("`{}` is not a regular file", path.display()),
                        )
                        .into());
                    }
                    let length = metadata.len();
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| name.clone());
                    FormPart::File {
                        name: name.clone(),
                        file_name,
                        length,
                        file,
                    }
                }
            };
            parts.push(part);
        }
        Ok(parts)
    }
}
