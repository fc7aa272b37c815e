//! Image intake for the create form.
//!
//! Both entry points (file picker and drag-and-drop) funnel into the same
//! acceptance check. An accepted file is retained for upload immediately;
//! its data-URL preview is produced later by a [`PreviewJob`] and applied
//! with [`ImageIntake::complete_preview`]. Each acceptance or removal bumps
//! a generation counter so late previews for a replaced file are dropped.

use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::ImageFormat;

/// Largest accepted upload, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Declared type for files whose extension is not a known image format.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Please select a valid image file")]
    NotAnImage { content_type: String },

    #[error("Image size must be less than 5MB")]
    TooLarge { size: u64 },

    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Preview encoding failed: {0}")]
    Preview(String),
}

// ---------------------------------------------------------------------------
// ImageFile
// ---------------------------------------------------------------------------

/// A candidate upload: file name, declared MIME type and raw bytes.
///
/// Bytes are shared, so cloning for the preview job or the upload does not
/// copy the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    file_name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, declaring its type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, IntakeError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| IntakeError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self::new(file_name, content_type_for_path(path), bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// MIME type implied by a path's extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// The acceptance rule shared by every entry point.
///
/// The type is checked before the size.
pub fn check_candidate(file: &ImageFile) -> Result<(), IntakeError> {
    if !file.is_image() {
        return Err(IntakeError::NotAnImage {
            content_type: file.content_type.clone(),
        });
    }
    if file.size() > MAX_IMAGE_BYTES {
        return Err(IntakeError::TooLarge { size: file.size() });
    }
    Ok(())
}

/// Encode bytes as a `data:` URL.
pub fn encode_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", BASE64.encode(bytes))
}

// ---------------------------------------------------------------------------
// Preview jobs
// ---------------------------------------------------------------------------

/// Background derivation of a preview for one accepted file.
#[derive(Debug)]
pub struct PreviewJob {
    generation: u64,
    file: ImageFile,
}

/// A finished preview, to be handed back to [`ImageIntake::complete_preview`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewReady {
    pub generation: u64,
    pub data_url: String,
}

impl PreviewJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Encode the preview on the blocking pool.
    pub async fn run(self) -> Result<PreviewReady, IntakeError> {
        let generation = self.generation;
        let file = self.file;
        let data_url =
            tokio::task::spawn_blocking(move || encode_data_url(&file.content_type, &file.bytes))
                .await
                .map_err(|e| IntakeError::Preview(e.to_string()))?;
        Ok(PreviewReady {
            generation,
            data_url,
        })
    }
}

// ---------------------------------------------------------------------------
// ImageIntake
// ---------------------------------------------------------------------------

/// What the form shows in the image slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Empty,
    /// File accepted, preview still encoding.
    PreviewPending,
    PreviewReady,
}

/// Image slot of the create form.
#[derive(Debug, Default)]
pub struct ImageIntake {
    file: Option<ImageFile>,
    preview: Option<String>,
    dragging: bool,
    generation: u64,
}

impl ImageIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// File-picker entry point.
    pub fn pick(&mut self, file: ImageFile) -> Result<PreviewJob, IntakeError> {
        self.accept(file)
    }

    /// File-picker change event with no file selected.
    pub fn pick_none(&mut self) {
        self.remove();
    }

    /// Drag-and-drop entry point. Ends the drag either way.
    pub fn drop_file(&mut self, file: ImageFile) -> Result<PreviewJob, IntakeError> {
        self.dragging = false;
        self.accept(file)
    }

    pub fn drag_enter(&mut self) {
        self.dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    /// Clear the retained file and preview and invalidate in-flight previews.
    pub fn remove(&mut self) {
        self.file = None;
        self.preview = None;
        self.generation += 1;
    }

    /// Apply a finished preview. Returns `false` when the preview belongs to
    /// a file that has since been replaced or removed.
    pub fn complete_preview(&mut self, ready: PreviewReady) -> bool {
        if ready.generation != self.generation || self.file.is_none() {
            return false;
        }
        self.preview = Some(ready.data_url);
        true
    }

    pub fn file(&self) -> Option<&ImageFile> {
        self.file.as_ref()
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn status(&self) -> ImageStatus {
        match (&self.file, &self.preview) {
            (None, _) => ImageStatus::Empty,
            (Some(_), None) => ImageStatus::PreviewPending,
            (Some(_), Some(_)) => ImageStatus::PreviewReady,
        }
    }

    /// A rejected candidate leaves the current file untouched.
    fn accept(&mut self, file: ImageFile) -> Result<PreviewJob, IntakeError> {
        check_candidate(&file)?;

        self.generation += 1;
        self.preview = None;
        self.file = Some(file.clone());

        Ok(PreviewJob {
            generation: self.generation,
            file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn png(size: usize) -> ImageFile {
        ImageFile::new("shirt.png", "image/png", vec![0u8; size])
    }

    #[test]
    fn text_file_rejected_with_type_error_regardless_of_size() {
        let mut intake = ImageIntake::new();
        for size in [10, 6 * 1024 * 1024] {
            let file = ImageFile::new("notes.txt", "text/plain", vec![0u8; size]);
            let err = intake.pick(file).unwrap_err();
            assert_matches!(err, IntakeError::NotAnImage { .. });
            assert_eq!(err.to_string(), "Please select a valid image file");
        }
        assert!(!intake.has_file());
    }

    #[test]
    fn oversized_png_rejected_with_size_error() {
        let mut intake = ImageIntake::new();
        let err = intake.pick(png(6 * 1024 * 1024)).unwrap_err();
        assert_matches!(err, IntakeError::TooLarge { size } if size == 6 * 1024 * 1024);
        assert_eq!(err.to_string(), "Image size must be less than 5MB");
    }

    #[test]
    fn exactly_five_mib_is_accepted() {
        let mut intake = ImageIntake::new();
        assert!(intake.pick(png(MAX_IMAGE_BYTES as usize)).is_ok());
        assert!(intake.has_file());
    }

    #[test]
    fn accepted_file_is_pending_until_preview_arrives() {
        let mut intake = ImageIntake::new();
        let job = intake.pick(png(4)).unwrap();
        assert_eq!(intake.status(), ImageStatus::PreviewPending);

        let applied = intake.complete_preview(PreviewReady {
            generation: job.generation(),
            data_url: "data:image/png;base64,AAAAAA==".to_string(),
        });

        assert!(applied);
        assert_eq!(intake.status(), ImageStatus::PreviewReady);
        assert_eq!(intake.preview(), Some("data:image/png;base64,AAAAAA=="));
    }

    #[test]
    fn stale_preview_after_remove_is_ignored() {
        let mut intake = ImageIntake::new();
        let job = intake.pick(png(4)).unwrap();
        intake.remove();

        let applied = intake.complete_preview(PreviewReady {
            generation: job.generation(),
            data_url: "data:image/png;base64,AAAA".to_string(),
        });

        assert!(!applied);
        assert_eq!(intake.status(), ImageStatus::Empty);
    }

    #[test]
    fn stale_preview_after_replacement_is_ignored() {
        let mut intake = ImageIntake::new();
        let first = intake.pick(png(4)).unwrap();
        let second = intake.pick(ImageFile::new("b.jpg", "image/jpeg", vec![1u8; 3])).unwrap();

        assert!(!intake.complete_preview(PreviewReady {
            generation: first.generation(),
            data_url: "old".to_string(),
        }));
        assert!(intake.complete_preview(PreviewReady {
            generation: second.generation(),
            data_url: "new".to_string(),
        }));
        assert_eq!(intake.preview(), Some("new"));
        assert_eq!(intake.file().map(ImageFile::file_name), Some("b.jpg"));
    }

    #[test]
    fn rejection_keeps_previous_file() {
        let mut intake = ImageIntake::new();
        intake.pick(png(4)).unwrap();
        assert!(intake.pick(png(6 * 1024 * 1024)).is_err());
        assert_eq!(intake.file().map(ImageFile::size), Some(4));
    }

    #[test]
    fn drop_uses_same_rules_and_ends_drag() {
        let mut intake = ImageIntake::new();
        intake.drag_enter();
        assert!(intake.is_dragging());

        let err = intake
            .drop_file(ImageFile::new("a.pdf", "application/pdf", vec![0u8; 1]))
            .unwrap_err();
        assert_matches!(err, IntakeError::NotAnImage { .. });
        assert!(!intake.is_dragging());

        intake.drag_enter();
        intake.drag_leave();
        assert!(!intake.is_dragging());
        assert!(intake.drop_file(png(8)).is_ok());
    }

    #[test]
    fn pick_none_clears_file() {
        let mut intake = ImageIntake::new();
        intake.pick(png(4)).unwrap();
        intake.pick_none();
        assert!(!intake.has_file());
        assert_eq!(intake.preview(), None);
    }

    #[test]
    fn data_url_encodes_bytes() {
        assert_eq!(encode_data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for_path(Path::new("a/b.PNG")), "image/png");
        assert_eq!(content_type_for_path(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(content_type_for_path(Path::new("notes.txt")), FALLBACK_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn preview_job_produces_data_url() {
        let mut intake = ImageIntake::new();
        let job = intake.pick(ImageFile::new("x.gif", "image/gif", b"GIF".to_vec())).unwrap();
        let generation = job.generation();

        let ready = job.run().await.unwrap();

        assert_eq!(ready.generation, generation);
        assert_eq!(ready.data_url, "data:image/gif;base64,R0lG");
        assert!(intake.complete_preview(ready));
    }

    #[tokio::test]
    async fn from_path_reads_bytes_and_declares_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boots.webp");
        tokio::fs::write(&path, b"RIFF").await.unwrap();

        let file = ImageFile::from_path(&path).await.unwrap();

        assert_eq!(file.file_name(), "boots.webp");
        assert_eq!(file.content_type(), "image/webp");
        assert_eq!(file.bytes(), b"RIFF");
    }

    #[tokio::test]
    async fn from_path_reports_missing_file() {
        let err = ImageFile::from_path("/definitely/not/here.png").await.unwrap_err();
        assert_matches!(err, IntakeError::Read { .. });
    }
}
