//! Terminal front-end for an [`IntakeSession`].
//!
//! Reads patient input line by line and renders each screen as plain text.
//! End of input quits; the session snapshot is already saved at that point,
//! so the next run picks up where this one stopped.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use eyre::WrapErr;
use historia_core::keys::export_filename;
use historia_core::models::intake::ApplicationState;
use historia_core::models::screen::Screen;
use historia_core::models::summary::ClinicalSummary;
use historia_core::schema::{fields_for, FieldKind, FieldSpec};
use historia_export::docx::generate_report_docx;
use historia_export::pdf::generate_pdf;
use historia_export::report::ReportDocument;
use historia_export::styles::DocumentStyles;
use historia_intake::error::IntakeError;
use historia_intake::interview::{AnswerInput, InterviewPhase, TurnOutcome};
use historia_intake::recognition::{RecognitionStatus, TextRecognizer};
use historia_intake::session::{IntakeSession, Submission};

use crate::prompt::{
    parse_choice, parse_export_choice, parse_review_command, parse_selection, ExportChoice,
    ReviewCommand,
};

enum Flow {
    Continue,
    Quit,
}

pub struct Wizard<R, W> {
    session: IntakeSession,
    recognizer: Arc<dyn TextRecognizer>,
    input: R,
    output: W,
    export_dir: PathBuf,
    lab_image: Option<PathBuf>,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub fn new(
        session: IntakeSession,
        recognizer: Arc<dyn TextRecognizer>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            session,
            recognizer,
            input,
            output,
            export_dir: PathBuf::from("."),
            lab_image: None,
        }
    }

    /// Directory exported reports are written to. Defaults to the working
    /// directory.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Image to recognize when the lab report screen first comes up.
    pub fn with_lab_image(mut self, path: Option<PathBuf>) -> Self {
        self.lab_image = path;
        self
    }

    pub fn session(&self) -> &IntakeSession {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Drive the session until the patient quits or input ends.
    pub async fn run(&mut self) -> eyre::Result<()> {
        tracing::info!(session_id = %self.session.id(), screen = %self.session.screen(), "wizard started");
        loop {
            let flow = match self.session.screen() {
                Screen::Welcome => self.welcome()?,
                Screen::HpiChat => self.interview().await?,
                Screen::Review => self.review().await?,
                Screen::LoadingSummary => {
                    self.session.activate(Screen::Review)?;
                    Flow::Continue
                }
                Screen::Summary => self.summary()?,
                form => self.form(form).await?,
            };
            if let Flow::Quit = flow {
                self.output.flush()?;
                return Ok(());
            }
        }
    }

    // ── Screens ──────────────────────────────────────────────────────────────

    fn welcome(&mut self) -> eyre::Result<Flow> {
        self.heading(Screen::Welcome.title())?;
        writeln!(
            self.output,
            "Historia AI will ask about your symptoms and prepare a summary for your doctor."
        )?;
        if self.ask("Press Enter to begin. ")?.is_none() {
            return Ok(Flow::Quit);
        }
        self.session.begin()?;
        Ok(Flow::Continue)
    }

    async fn form(&mut self, screen: Screen) -> eyre::Result<Flow> {
        self.heading(screen.title())?;
        let mut values = self.session.form_values();

        if screen == Screen::LabReport {
            if let Some(path) = self.lab_image.take() {
                let status = match std::fs::read(&path) {
                    Ok(image) => {
                        self.session
                            .recognize_lab_report(&*self.recognizer, &image, &mut values)
                            .await
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "lab report image unreadable");
                        RecognitionStatus::Failed
                    }
                };
                writeln!(self.output, "{}", status.message())?;
            }
        }

        for field in fields_for(screen) {
            let current = values.get(field.id).to_string();
            let Some(value) = self.ask_field(field, &current)? else {
                return Ok(Flow::Quit);
            };
            values.set(field.id, value);
        }

        match self.session.submit_screen(&values).await {
            Ok(Submission::Moved(_)) => {}
            Ok(Submission::InterviewStarted(outcome)) => self.show_outcome(outcome).await?,
            Err(IntakeError::Validation(report)) => writeln!(self.output, "{report}")?,
            Err(IntakeError::Cancelled) => writeln!(self.output, "Request cancelled.")?,
            Err(e) => return Err(e.into()),
        }
        Ok(Flow::Continue)
    }

    /// Prompt for one field. Enter keeps the shown value, `-` clears a
    /// text field.
    fn ask_field(&mut self, field: &FieldSpec, current: &str) -> eyre::Result<Option<String>> {
        match field.kind {
            FieldKind::Choice(options) => {
                let shown = if current.is_empty() { field.default } else { current };
                let listing: Vec<String> = options
                    .iter()
                    .enumerate()
                    .map(|(i, o)| format!("{}) {o}", i + 1))
                    .collect();
                writeln!(self.output, "{}: {}", field.label, listing.join("  "))?;
                loop {
                    let Some(line) = self.ask(&format!("  [{shown}] > "))? else {
                        return Ok(None);
                    };
                    if line.is_empty() {
                        return Ok(Some(shown.to_string()));
                    }
                    match parse_choice(&line, options) {
                        Some(option) => return Ok(Some(option.to_string())),
                        None => writeln!(self.output, "  Please choose one of the listed options.")?,
                    }
                }
            }
            FieldKind::Text | FieldKind::LongText => {
                let marker = if field.required { " *" } else { "" };
                let prompt = if current.is_empty() {
                    format!("{}{marker}: ", field.label)
                } else {
                    format!("{}{marker} [{current}]: ", field.label)
                };
                let Some(line) = self.ask(&prompt)? else {
                    return Ok(None);
                };
                Ok(Some(match line.as_str() {
                    "" => current.to_string(),
                    "-" => String::new(),
                    _ => line,
                }))
            }
        }
    }

    async fn interview(&mut self) -> eyre::Result<Flow> {
        match self.session.phase() {
            InterviewPhase::AwaitingAnswer => self.answer().await,
            InterviewPhase::AwaitingQuestion => {
                let Some(line) = self.ask("Press Enter to retry, or q to quit: ")? else {
                    return Ok(Flow::Quit);
                };
                if line.eq_ignore_ascii_case("q") {
                    return Ok(Flow::Quit);
                }
                let result = self.session.retry_turn().await;
                self.handle_turn(result).await
            }
            InterviewPhase::Complete => {
                self.session.advance_after_interview()?;
                Ok(Flow::Continue)
            }
            InterviewPhase::NotStarted => {
                self.session.activate(Screen::ChiefComplaint)?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn answer(&mut self) -> eyre::Result<Flow> {
        let pending = self
            .session
            .pending_question()
            .ok_or(IntakeError::InterviewNotActive)?;
        writeln!(self.output, "\nAI: {}", pending.text)?;

        let result = match &pending.input {
            AnswerInput::Choices(selection) => {
                let options = selection.options();
                for (i, option) in options.iter().enumerate() {
                    writeln!(self.output, "  {}) {option}", i + 1)?;
                }
                loop {
                    let Some(line) = self.ask("Select one or more (e.g. 1,3): ")? else {
                        return Ok(Flow::Quit);
                    };
                    match parse_selection(&line, options.len()) {
                        Some(picked) => {
                            for index in picked {
                                self.session.toggle_option(index)?;
                            }
                            break self.session.confirm_selection().await;
                        }
                        None => writeln!(self.output, "  Enter option numbers from the list.")?,
                    }
                }
            }
            AnswerInput::FreeText { .. } => loop {
                let Some(line) = self.ask("You: ")? else {
                    return Ok(Flow::Quit);
                };
                if !line.is_empty() {
                    break self.session.submit_answer(&line).await;
                }
            },
        };
        self.handle_turn(result).await
    }

    async fn review(&mut self) -> eyre::Result<Flow> {
        self.heading(Screen::Review.title())?;
        let sections = self.session.review_sheet();
        for (i, section) in sections.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, section.title)?;
            for line in &section.lines {
                writeln!(self.output, "     {line}")?;
            }
        }

        let Some(line) =
            self.ask("Enter to confirm and generate the summary, e <n> to edit, q to quit: ")?
        else {
            return Ok(Flow::Quit);
        };

        match parse_review_command(&line, sections.len()) {
            ReviewCommand::Confirm => {
                writeln!(self.output, "Generating clinical summary...")?;
                self.output.flush()?;
                match self.session.confirm_and_generate().await {
                    Ok(_) => {}
                    Err(IntakeError::Cancelled) => writeln!(self.output, "Request cancelled.")?,
                    Err(e @ IntakeError::Completion(_)) => {
                        writeln!(self.output, "Could not generate the summary: {e}")?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            ReviewCommand::Edit(index) => {
                self.session.begin_edit(sections[index].edit_target)?;
            }
            ReviewCommand::Quit => return Ok(Flow::Quit),
            ReviewCommand::Unknown => writeln!(self.output, "Unrecognized command.")?,
        }
        Ok(Flow::Continue)
    }

    fn summary(&mut self) -> eyre::Result<Flow> {
        let Some(summary) = self.session.summary() else {
            self.session.activate(Screen::Review)?;
            return Ok(Flow::Continue);
        };
        let state = self.session.state();

        self.heading(Screen::Summary.title())?;
        writeln!(self.output, "History of Presenting Illness:")?;
        writeln!(self.output, "{}", summary.hpi_narrative)?;
        writeln!(self.output, "\nProbable Diagnoses:")?;
        for line in summary.diagnosis_lines() {
            writeln!(self.output, "  {line}")?;
        }
        writeln!(self.output)?;

        loop {
            let Some(line) =
                self.ask("Export report as [p]df, [d]ocx, [b]oth, or Enter to skip: ")?
            else {
                return Ok(Flow::Quit);
            };
            match parse_export_choice(&line) {
                Some(choice) => {
                    self.export(&state, &summary, choice)?;
                    break;
                }
                None => writeln!(self.output, "  Please answer p, d, b, or press Enter.")?,
            }
        }

        let Some(line) = self.ask("Start a new patient? [y/N]: ")? else {
            return Ok(Flow::Quit);
        };
        if line.eq_ignore_ascii_case("y") {
            self.session.reset()?;
            Ok(Flow::Continue)
        } else {
            Ok(Flow::Quit)
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    async fn handle_turn(&mut self, result: Result<TurnOutcome, IntakeError>) -> eyre::Result<Flow> {
        match result {
            Ok(outcome) => self.show_outcome(outcome).await?,
            Err(IntakeError::Cancelled) => writeln!(self.output, "Request cancelled.")?,
            Err(e) => return Err(e.into()),
        }
        Ok(Flow::Continue)
    }

    /// Questions are printed when answered, so only completion and failure
    /// show anything here.
    async fn show_outcome(&mut self, outcome: TurnOutcome) -> eyre::Result<()> {
        match outcome {
            TurnOutcome::Question(_) => {}
            TurnOutcome::Complete {
                farewell,
                advance_in,
            } => {
                writeln!(self.output, "\nAI: {farewell}")?;
                self.output.flush()?;
                tokio::time::sleep(advance_in).await;
                self.session.advance_after_interview()?;
            }
            TurnOutcome::Failed { notice } => writeln!(self.output, "\n{notice}")?,
        }
        Ok(())
    }

    fn export(
        &mut self,
        state: &ApplicationState,
        summary: &ClinicalSummary,
        choice: ExportChoice,
    ) -> eyre::Result<()> {
        let report = ReportDocument::build(state, summary, jiff::Zoned::now().date());
        if choice.pdf {
            let bytes = generate_pdf(&report)?;
            self.write_report(&state.preliminary.name, "pdf", &bytes)?;
        }
        if choice.docx {
            let bytes = generate_report_docx(&report, None, &DocumentStyles::default())?;
            self.write_report(&state.preliminary.name, "docx", &bytes)?;
        }
        Ok(())
    }

    fn write_report(&mut self, patient: &str, extension: &str, bytes: &[u8]) -> eyre::Result<()> {
        std::fs::create_dir_all(&self.export_dir)?;
        let path = self.export_dir.join(export_filename(patient, extension));
        std::fs::write(&path, bytes)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "report exported");
        writeln!(self.output, "Saved {}", path.display())?;
        Ok(())
    }

    fn heading(&mut self, title: &str) -> eyre::Result<()> {
        writeln!(self.output, "\n== {title} ==")?;
        Ok(())
    }

    /// Read one trimmed line. `None` at end of input.
    fn ask(&mut self, prompt: &str) -> eyre::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
