use thiserror::Error;

/// Failures while turning a clinical summary into a report file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("report template is invalid: {0}")]
    TemplateParse(String),

    #[error("report template failed to render: {0}")]
    TemplateRender(String),

    #[error("report context could not be built: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("could not write the DOCX report: {0}")]
    Docx(String),

    #[error("could not write the PDF report: {0}")]
    Pdf(String),
}

impl From<tera::Error> for ExportError {
    fn from(e: tera::Error) -> Self {
        ExportError::TemplateRender(e.to_string())
    }
}
