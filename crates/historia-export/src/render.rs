use tera::{Context, Tera};

use crate::error::ExportError;
use crate::report::ReportDocument;

/// Markdown-ish report layout understood by [`crate::docx::generate_docx`].
pub const DEFAULT_TEMPLATE: &str = r#"# {{ title }}
## {{ subtitle }}

**Patient:** {{ patient }}
**Age/Sex:** {{ age_sex }}
**Date:** {{ date }}
{% for section in sections %}
## {{ section.title }}
{% for line in section.lines %}{{ line }}
{% endfor %}{% endfor %}"#;

/// Render a report through a Tera template.
///
/// `template` defaults to [`DEFAULT_TEMPLATE`]. The report's fields are
/// the template context.
pub fn render_report(report: &ReportDocument, template: Option<&str>) -> Result<String, ExportError> {
    const NAME: &str = "report.md";

    let mut tera = Tera::default();
    tera.add_raw_template(NAME, template.unwrap_or(DEFAULT_TEMPLATE))
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let value = serde_json::to_value(report)?;
    let context =
        Context::from_value(value).map_err(|e| ExportError::TemplateRender(e.to_string()))?;

    Ok(tera.render(NAME, &context)?)
}
