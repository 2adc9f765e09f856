//! Lab-report text recognition from uploaded images.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, warn};

use historia_core::schema::LAB_REPORTS_FIELD;

use crate::error::IntakeError;
use crate::forms::FormValues;

/// Recognition language for lab reports.
pub const LANGUAGE: &str = "eng";

/// Turns an image into text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8], language: &str) -> Result<String, IntakeError>;
}

/// Runs the `tesseract` binary, feeding the image on stdin.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &[u8], language: &str) -> Result<String, IntakeError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                IntakeError::Recognition(format!(
                    "failed to start {}: {e}",
                    self.binary.display()
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(image)
                .await
                .map_err(|e| IntakeError::Recognition(format!("failed to send image: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| IntakeError::Recognition(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IntakeError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Whether `bytes` start with a known image signature.
pub fn is_image(bytes: &[u8]) -> bool {
    const SIGNATURES: &[&[u8]] = &[
        b"\x89PNG\r\n\x1a\n",
        b"\xFF\xD8\xFF",
        b"GIF87a",
        b"GIF89a",
        b"BM",
        b"II*\0",
        b"MM\0*",
    ];
    if SIGNATURES.iter().any(|sig| bytes.starts_with(sig)) {
        return true;
    }
    bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
}

/// Outcome of a lab-report upload, as shown to the patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionStatus {
    Extracted,
    Failed,
}

impl RecognitionStatus {
    pub fn message(self) -> &'static str {
        match self {
            RecognitionStatus::Extracted => "Text extracted successfully!",
            RecognitionStatus::Failed => "Error reading image. Please try again.",
        }
    }
}

/// Recognize an uploaded lab report into the lab-report form.
///
/// On success the recognized text replaces the `lab-reports` field.
/// Non-image payloads and recognizer failures leave the form untouched.
pub async fn recognize_lab_report(
    recognizer: &dyn TextRecognizer,
    image: &[u8],
    values: &mut FormValues,
) -> RecognitionStatus {
    if !is_image(image) {
        warn!(bytes = image.len(), "lab report upload is not an image");
        return RecognitionStatus::Failed;
    }

    match recognizer.recognize(image, LANGUAGE).await {
        Ok(text) => {
            info!(chars = text.len(), "lab report text recognized");
            values.set(LAB_REPORTS_FIELD, text);
            RecognitionStatus::Extracted
        }
        Err(e) => {
            warn!(error = %e, "lab report recognition failed");
            RecognitionStatus::Failed
        }
    }
}
