use historia_core::keys::export_filename;
use historia_core::models::intake::ApplicationState;
use historia_core::models::summary::ClinicalSummary;
use historia_export::docx::generate_report_docx;
use historia_export::pdf::{generate_pdf, layout, wrap_text, TextStyle, CONTENT_BOTTOM_MM};
use historia_export::render::{render_report, DEFAULT_TEMPLATE};
use historia_export::report::{page_footer, ReportDocument};
use historia_export::styles::DocumentStyles;

fn state() -> ApplicationState {
    let mut state = ApplicationState::default();
    state.preliminary.name = "Asha Rao".to_string();
    state.preliminary.age = "34".to_string();
    state.preliminary.sex = "Female".to_string();
    state.chief_complaint.symptom = "headache".to_string();
    state.chief_complaint.duration = "3 days".to_string();
    state.social.tobacco = "Never".to_string();
    state.social.alcohol = "Occasional".to_string();
    state
}

fn summary() -> ClinicalSummary {
    ClinicalSummary::new(
        "34-year-old woman with a 3-day frontal headache.",
        "1. **Tension headache:** Bilateral pressing pain.\n2. **Migraine:** Photophobia.",
    )
}

fn date() -> jiff::civil::Date {
    jiff::civil::date(2026, 3, 14)
}

#[test]
fn sections_are_in_fixed_order() {
    let report = ReportDocument::build(&state(), &summary(), date());
    let titles: Vec<&str> = report.sections.iter().map(|s| s.title).collect();
    assert_eq!(
        titles,
        vec![
            "1. Chief Complaint",
            "2. History of Presenting Illness",
            "3. Past & Social History",
            "4. Lab Findings",
            "5. Assessment & Plan (AI Suggestions)",
        ]
    );
    assert_eq!(report.patient, "Asha Rao");
    assert_eq!(report.age_sex, "34 / Female");
    assert_eq!(report.date, "2026-03-14");
    assert_eq!(report.sections[0].lines, vec!["headache (3 days)"]);
    assert_eq!(
        report.sections[2].lines,
        vec![
            "Surgeries: None",
            "Medications: None",
            "Tobacco: Never",
            "Alcohol: Occasional"
        ]
    );
    assert_eq!(report.sections[3].lines, vec!["None provided."]);
    assert_eq!(report.sections[4].lines.len(), 2);
}

#[test]
fn footer_names_page_and_total() {
    assert_eq!(
        page_footer(2, 3),
        "Generated by Historia AI - Page 2 of 3 - Disclaimer: AI-generated content. Verify with a professional."
    );
}

#[test]
fn export_filename_replaces_whitespace() {
    assert_eq!(
        export_filename("Asha  Rao", "pdf"),
        "Historia_AI_Summary_Asha_Rao.pdf"
    );
}

#[test]
fn wrap_respects_width() {
    let text = "The patient reports a dull frontal headache that worsens in the evening";
    let lines = wrap_text(text, 20);
    assert!(lines.len() > 1);
    assert!(lines.iter().all(|l| l.chars().count() <= 20));
    assert_eq!(lines.join(" "), text);

    let long = wrap_text(&"x".repeat(45), 20);
    assert_eq!(long.iter().map(String::len).collect::<Vec<_>>(), vec![20, 20, 5]);
}

#[test]
fn short_report_fits_one_page() {
    let report = ReportDocument::build(&state(), &summary(), date());
    let plan = layout(&report);
    assert_eq!(plan.page_count(), 1);

    let headings: Vec<&str> = plan.pages[0]
        .iter()
        .filter(|t| t.style == TextStyle::Heading)
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(headings.len(), 5);
    assert!(plan.pages[0].iter().any(|t| t.text == "Patient: Asha Rao"));
}

#[test]
fn long_report_paginates() {
    let mut long = state();
    long.lab_reports = (1..=120)
        .map(|i| format!("Result line {i}: within normal limits"))
        .collect::<Vec<_>>()
        .join("\n");
    let report = ReportDocument::build(&long, &summary(), date());
    let plan = layout(&report);

    assert!(plan.page_count() >= 3);
    for page in &plan.pages {
        assert!(!page.is_empty());
        assert!(page.iter().all(|t| t.y_mm <= CONTENT_BOTTOM_MM + 5.0));
    }
    let body_lines = plan
        .pages
        .iter()
        .flatten()
        .filter(|t| t.text.starts_with("Result line"))
        .count();
    assert_eq!(body_lines, 120);
}

#[test]
fn pdf_bytes_are_a_pdf() {
    let report = ReportDocument::build(&state(), &summary(), date());
    let bytes = generate_pdf(&report).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn rendered_template_carries_all_sections() {
    let report = ReportDocument::build(&state(), &summary(), date());
    let text = render_report(&report, None).unwrap();
    assert!(text.starts_with("# Historia AI"));
    assert!(text.contains("**Patient:** Asha Rao"));
    assert!(text.contains("## 4. Lab Findings\nNone provided."));
    assert!(text.contains("1. **Tension headache:** Bilateral pressing pain."));

    let custom = render_report(&report, Some("{{ patient }} on {{ date }}")).unwrap();
    assert_eq!(custom, "Asha Rao on 2026-03-14");
    assert!(DEFAULT_TEMPLATE.contains("section.title"));
}

#[test]
fn bad_template_is_a_parse_error() {
    let report = ReportDocument::build(&state(), &summary(), date());
    assert!(render_report(&report, Some("{% for %}")).is_err());
}

#[test]
fn docx_bytes_are_a_zip() {
    let report = ReportDocument::build(&state(), &summary(), date());
    let bytes = generate_report_docx(&report, None, &DocumentStyles::default()).unwrap();
    assert!(bytes.starts_with(b"PK"));
}
