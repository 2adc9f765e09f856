mod common;

use std::sync::Mutex;

use async_trait::async_trait;

use historia_core::schema::LAB_REPORTS_FIELD;
use historia_intake::error::IntakeError;
use historia_intake::forms::FormValues;
use historia_intake::recognition::{
    is_image, recognize_lab_report, RecognitionStatus, TesseractRecognizer, TextRecognizer,
    LANGUAGE,
};

use common::*;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

struct FixedRecognizer {
    text: Result<String, String>,
    languages: Mutex<Vec<String>>,
}

impl FixedRecognizer {
    fn ok(text: &str) -> Self {
        Self {
            text: Ok(text.to_string()),
            languages: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            text: Err("engine crashed".to_string()),
            languages: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextRecognizer for FixedRecognizer {
    async fn recognize(&self, _image: &[u8], language: &str) -> Result<String, IntakeError> {
        self.languages.lock().unwrap().push(language.to_string());
        self.text.clone().map_err(IntakeError::Recognition)
    }
}

#[test]
fn image_signatures_are_recognized() {
    assert!(is_image(PNG));
    assert!(is_image(b"\xFF\xD8\xFF\xE0\0\x10JFIF"));
    assert!(is_image(b"GIF89a\x01\0"));
    assert!(is_image(b"RIFF\x24\0\0\0WEBPVP8 "));
    assert!(!is_image(b"%PDF-1.7"));
    assert!(!is_image(b"RIFF\x24\0\0\0WAVE"));
    assert!(!is_image(b""));
}

#[tokio::test]
async fn recognized_text_fills_lab_reports() {
    let recognizer = FixedRecognizer::ok("Hb 13.2 g/dL\nWBC 7,400");
    let mut values = FormValues::new();

    let status = recognize_lab_report(&recognizer, PNG, &mut values).await;
    assert_eq!(status, RecognitionStatus::Extracted);
    assert_eq!(status.message(), "Text extracted successfully!");
    assert_eq!(values.get(LAB_REPORTS_FIELD), "Hb 13.2 g/dL\nWBC 7,400");
    assert_eq!(*recognizer.languages.lock().unwrap(), vec![LANGUAGE.to_string()]);
}

#[tokio::test]
async fn non_image_upload_is_refused() {
    let recognizer = FixedRecognizer::ok("should not run");
    let mut values = FormValues::new().with(LAB_REPORTS_FIELD, "typed by hand");

    let status = recognize_lab_report(&recognizer, b"%PDF-1.7", &mut values).await;
    assert_eq!(status, RecognitionStatus::Failed);
    assert_eq!(status.message(), "Error reading image. Please try again.");
    assert_eq!(values.get(LAB_REPORTS_FIELD), "typed by hand");
    assert!(recognizer.languages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn recognizer_failure_leaves_form_untouched() {
    let session = session_with(memory_store(), ScriptedService::replying(&[]));
    let mut values = FormValues::new();

    let status = session
        .recognize_lab_report(&FixedRecognizer::failing(), PNG, &mut values)
        .await;
    assert_eq!(status, RecognitionStatus::Failed);
    assert_eq!(values.get(LAB_REPORTS_FIELD), "");
}

#[tokio::test]
async fn missing_binary_is_a_recognition_error() {
    let recognizer = TesseractRecognizer::new("/nonexistent/tesseract-binary");
    let err = recognizer.recognize(PNG, LANGUAGE).await.unwrap_err();
    assert!(matches!(err, IntakeError::Recognition(_)));
}

#[tokio::test]
#[ignore = "requires the tesseract binary"]
async fn tesseract_reads_a_blank_image() {
    // Smallest valid 1x1 white PNG.
    const WHITE_PIXEL: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0xFF, 0xFF, 0x3F, 0x00, 0x05, 0xFE, 0x02, 0xFE, 0xDC, 0xCC, 0x59, 0xE7, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];
    let text = TesseractRecognizer::default()
        .recognize(WHITE_PIXEL, LANGUAGE)
        .await
        .unwrap();
    assert!(text.trim().is_empty());
}
