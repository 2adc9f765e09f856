use historia_core::models::intake::ApplicationState;
use historia_core::models::screen::Screen;
use historia_intake::error::IntakeError;
use historia_intake::forms::{collect, populate_for_edit, validate, FormValues};
use historia_intake::navigator::{after_submit, parse_screen, resume_screen};
use historia_intake::review::review_sheet;

#[test]
fn missing_required_fields_are_reported() {
    let values = FormValues::new().with("name", "  ").with("age", "34");
    let report = validate(Screen::Preliminary, &values);
    assert!(!report.is_valid());
    assert_eq!(report.missing, vec!["name", "sex"]);
}

#[test]
fn optional_screens_always_validate() {
    assert!(validate(Screen::PastHistory, &FormValues::new()).is_valid());
    assert!(validate(Screen::LabReport, &FormValues::new()).is_valid());
}

#[test]
fn collect_then_populate_restores_values() {
    let values = FormValues::new()
        .with("name", "Asha Rao")
        .with("age", "34")
        .with("sex", "Female");
    let mut state = ApplicationState::default();
    collect(Screen::Preliminary, &values, &mut state);

    assert_eq!(state.preliminary.name, "Asha Rao");
    assert_eq!(populate_for_edit(Screen::Preliminary, &state), values);
}

#[test]
fn values_are_stored_as_entered() {
    let values = FormValues::new()
        .with("cc-symptom", "  headache ")
        .with("cc-duration", "3 days");
    let mut state = ApplicationState::default();
    collect(Screen::ChiefComplaint, &values, &mut state);
    assert_eq!(state.chief_complaint.symptom, "  headache ");
}

#[test]
fn collect_only_touches_its_own_screen() {
    let mut state = ApplicationState::default();
    state.preliminary.name = "Asha".to_string();
    collect(
        Screen::SocialHistory,
        &FormValues::new().with("name", "Someone else"),
        &mut state,
    );
    assert_eq!(state.preliminary.name, "Asha");
    assert_eq!(state.social.tobacco, "Never");
    assert_eq!(state.social.alcohol, "Never");
}

#[test]
fn populate_substitutes_defaults_for_empty_values() {
    let state = ApplicationState::default();
    let values = populate_for_edit(Screen::Preliminary, &state);
    assert_eq!(values.get("sex"), "Male");
    assert_eq!(values.get("name"), "");

    let social = populate_for_edit(Screen::SocialHistory, &state);
    assert_eq!(social.get("social-tobacco"), "Never");
}

#[test]
fn unknown_screen_id_is_an_error() {
    assert_eq!(parse_screen("lab-report").unwrap(), Screen::LabReport);
    match parse_screen("settings") {
        Err(IntakeError::UnknownScreen(id)) => assert_eq!(id, "settings"),
        other => panic!("expected unknown screen, got {other:?}"),
    }
}

#[test]
fn form_screens_follow_forward_edge() {
    assert_eq!(after_submit(Screen::Preliminary), Some(Screen::ChiefComplaint));
    assert_eq!(after_submit(Screen::ChiefComplaint), Some(Screen::HpiChat));
    assert_eq!(after_submit(Screen::LabReport), Some(Screen::Review));
    assert_eq!(after_submit(Screen::Review), None);
}

#[test]
fn summary_screens_resume_on_review() {
    assert_eq!(resume_screen(Screen::Summary), Screen::Review);
    assert_eq!(resume_screen(Screen::LoadingSummary), Screen::Review);
    assert_eq!(resume_screen(Screen::HpiChat), Screen::HpiChat);
}

#[test]
fn review_sheet_uses_placeholders() {
    let mut state = ApplicationState::default();
    state.preliminary.name = "Asha".to_string();
    state.chief_complaint.symptom = "headache".to_string();

    let sheet = review_sheet(&state);
    let titles: Vec<&str> = sheet.iter().map(|s| s.title).collect();
    assert_eq!(
        titles,
        vec![
            "Preliminary Data",
            "Chief Complaint",
            "Past History",
            "Social History",
            "Lab Reports"
        ]
    );
    assert_eq!(sheet[0].lines, vec!["Name: Asha", "Age: N/A", "Sex: N/A"]);
    assert_eq!(sheet[1].lines, vec!["headache for N/A"]);
    assert_eq!(sheet[2].lines, vec!["Surgeries: None", "Medications: None"]);
    assert_eq!(sheet[4].lines, vec!["None"]);
    assert_eq!(sheet[3].edit_target, Screen::SocialHistory);
}
