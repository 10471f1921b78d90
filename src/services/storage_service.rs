use std::path::PathBuf;

use bytes::Bytes;
use tokio::fs;

use crate::error::{Error, Result};
use crate::utils::token::generate_token;

pub const CV_MAX_BYTES: usize = 5 * 1024 * 1024;
pub const UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const CV_TYPES: &[&str] = &[MIME_PDF, MIME_DOCX];
const UPLOAD_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp", MIME_PDF];

const MAX_NAME_CHARS: usize = 100;
const TOKEN_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Cv,
    Generic,
}

impl UploadKind {
    pub fn max_bytes(&self) -> usize {
        match self {
            UploadKind::Cv => CV_MAX_BYTES,
            UploadKind::Generic => UPLOAD_MAX_BYTES,
        }
    }

    pub fn allowed_types(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Cv => CV_TYPES,
            UploadKind::Generic => UPLOAD_TYPES,
        }
    }

    fn dir_name(&self) -> &'static str {
        match self {
            UploadKind::Cv => "cv",
            UploadKind::Generic => "files",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub url: String,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Checks size, declared type and leading bytes. Nothing is written.
    pub fn check(&self, kind: UploadKind, file: &IncomingFile) -> Result<()> {
        if file.data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".into()));
        }
        if file.data.len() > kind.max_bytes() {
            return Err(Error::BadRequest(format!(
                "File is too large (maximum {} MB)",
                kind.max_bytes() / (1024 * 1024)
            )));
        }
        let content_type = file.content_type.to_ascii_lowercase();
        if !kind.allowed_types().contains(&content_type.as_str()) {
            return Err(Error::BadRequest(format!(
                "File type {} is not allowed",
                file.content_type
            )));
        }
        if !content_matches(&content_type, &file.data) {
            return Err(Error::BadRequest(
                "File content does not match its declared type".into(),
            ));
        }
        Ok(())
    }

    pub async fn store(&self, kind: UploadKind, file: IncomingFile) -> Result<StoredFile> {
        self.check(kind, &file)?;

        let dir = self.root.join(kind.dir_name());
        fs::create_dir_all(&dir).await?;

        let file_name = format!(
            "{}-{}",
            generate_token(TOKEN_LENGTH),
            sanitize_file_name(&file.file_name)
        );
        let path = dir.join(&file_name);
        fs::write(&path, &file.data).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to write upload");
            Error::Io(e)
        })?;

        tracing::info!(
            kind = kind.dir_name(),
            size = file.data.len(),
            file = %file_name,
            "stored upload"
        );

        Ok(StoredFile {
            url: format!("/uploads/{}/{}", kind.dir_name(), file_name),
            file_name,
            content_type: file.content_type.to_ascii_lowercase(),
            size: file.data.len(),
        })
    }

    /// Deletes a file previously returned by `store`, addressed by its public URL.
    pub async fn remove(&self, url: &str) -> Result<()> {
        let Some(relative) = url.strip_prefix("/uploads/") else {
            return Err(Error::BadRequest(format!("Not a stored upload: {}", url)));
        };
        if relative.split('/').any(|part| part.is_empty() || part == "..") {
            return Err(Error::BadRequest(format!("Not a stored upload: {}", url)));
        }
        fs::remove_file(self.root.join(relative)).await?;
        Ok(())
    }
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else collapses to `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");
    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let chars: Vec<char> = out.trim_start_matches('.').chars().collect();
    let capped: String = chars[chars.len().saturating_sub(MAX_NAME_CHARS)..]
        .iter()
        .collect();
    if capped.is_empty() || capped.chars().all(|c| c == '_' || c == '.') {
        "file".to_string()
    } else {
        capped
    }
}

fn content_matches(content_type: &str, data: &[u8]) -> bool {
    match content_type {
        MIME_PDF => data.starts_with(b"%PDF"),
        MIME_DOCX => data.starts_with(b"PK\x03\x04"),
        "image/jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "image/png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        "image/gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        "image/webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        _ => false,
    }
}
