//! The intake session: one patient's walk through the wizard.
//!
//! `IntakeSession` owns the application state, the chat history, and the
//! active screen, and writes a snapshot after every state-affecting
//! action. Methods take `&self` so a session can be shared between a
//! front-end task and the task awaiting a completion; state is only
//! locked for short synchronous sections, never across a request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

use historia_completion::chat::CompletionRequest;
use historia_completion::client::CompletionService;
use historia_completion::error::CompletionError;
use historia_completion::interview::{
    opening_message, parse_interview_reply, InterviewReply, INTERVIEW_SYSTEM_PROMPT,
};
use historia_completion::summary::{parse_summary_strict, parse_summary_with_fallback, summary_prompt};
use historia_core::models::chat_history::{ChatHistory, ChatHistoryRole};
use historia_core::models::intake::ApplicationState;
use historia_core::models::screen::Screen;
use historia_core::models::snapshot::PersistedSnapshot;
use historia_core::models::summary::ClinicalSummary;
use historia_storage::snapshot::{clear_snapshot, restore_or_discard, save_snapshot};
use historia_storage::store::KeyValueStore;

use crate::config::IntakeConfig;
use crate::error::IntakeError;
use crate::forms::{self, FormValues};
use crate::interview::{
    AnswerInput, InFlight, InFlightGuard, InterviewPhase, InterviewState, PendingQuestion,
    TurnOutcome, CLOSING_MESSAGE, CONNECTION_NOTICE,
};
use crate::navigator;
use crate::recognition::{self, RecognitionStatus, TextRecognizer};
use crate::review::{self, ReviewSection};

/// What a form submission led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The session moved to this screen.
    Moved(Screen),
    /// The chief complaint was captured and the interview's first turn ran.
    InterviewStarted(TurnOutcome),
}

/// Token of the request currently in flight. Emptied as soon as the
/// request's outcome is known, so a later cancel has nothing to act on.
type RequestSlot = Arc<Mutex<Option<CancellationToken>>>;

/// Cancels the session's outstanding completion request from another task.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    slot: RequestSlot,
    in_flight: InFlight,
}

impl CancelHandle {
    /// Cancel the request in flight, if any. Returns whether one was.
    ///
    /// `true` means the request reports [`IntakeError::Cancelled`] and its
    /// reply, if one arrives, is discarded.
    pub fn cancel(&self) -> bool {
        if !self.in_flight.is_set() {
            return false;
        }
        match self.slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_set()
    }
}

struct Inner {
    state: ApplicationState,
    chat: ChatHistory,
    screen: Screen,
    interview: InterviewState,
    summary: Option<ClinicalSummary>,
}

impl Inner {
    fn fresh() -> Self {
        Self {
            state: ApplicationState::default(),
            chat: ChatHistory::default(),
            screen: Screen::Welcome,
            interview: InterviewState::new(),
            summary: None,
        }
    }
}

pub struct IntakeSession {
    id: Uuid,
    store: Arc<dyn KeyValueStore>,
    completion: Arc<dyn CompletionService>,
    config: IntakeConfig,
    inner: Mutex<Inner>,
    in_flight: InFlight,
    request: RequestSlot,
    /// Bumped by [`reset`](IntakeSession::reset). Replies to requests started
    /// under an older generation are dropped.
    generation: AtomicU64,
}

impl IntakeSession {
    /// A fresh session on the welcome screen. Nothing is written until the
    /// first screen change.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        completion: Arc<dyn CompletionService>,
        config: IntakeConfig,
    ) -> Self {
        Self::with_inner(store, completion, config, Inner::fresh())
    }

    /// Reopen the saved session, or start fresh if there is none.
    ///
    /// A corrupt snapshot is discarded. The summary screens reopen on the
    /// review sheet, and the interview position is rebuilt from the chat
    /// history.
    pub fn resume(
        store: Arc<dyn KeyValueStore>,
        completion: Arc<dyn CompletionService>,
        config: IntakeConfig,
    ) -> Result<Self, IntakeError> {
        let Some(snapshot) = restore_or_discard(&*store)? else {
            let session = Self::new(store, completion, config);
            info!(session_id = %session.id, "no saved session, starting fresh");
            return Ok(session);
        };

        let screen = navigator::resume_screen(snapshot.active_screen);
        let interview = InterviewState::restore(
            screen,
            &snapshot.chat_history,
            snapshot.state.hpi_complete,
        );
        let inner = Inner {
            state: snapshot.state,
            chat: snapshot.chat_history,
            screen,
            interview,
            summary: None,
        };
        let session = Self::with_inner(store, completion, config, inner);
        info!(
            session_id = %session.id,
            screen = %screen,
            saved_screen = %snapshot.active_screen,
            "resumed saved session"
        );
        Ok(session)
    }

    fn with_inner(
        store: Arc<dyn KeyValueStore>,
        completion: Arc<dyn CompletionService>,
        config: IntakeConfig,
        inner: Inner,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            store,
            completion,
            config,
            inner: Mutex::new(inner),
            in_flight: InFlight::default(),
            request: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.lock().screen
    }

    pub fn state(&self) -> ApplicationState {
        self.lock().state.clone()
    }

    pub fn chat_history(&self) -> ChatHistory {
        self.lock().chat.clone()
    }

    pub fn phase(&self) -> InterviewPhase {
        self.lock().interview.phase
    }

    pub fn pending_question(&self) -> Option<PendingQuestion> {
        self.lock().interview.pending.clone()
    }

    pub fn summary(&self) -> Option<ClinicalSummary> {
        self.lock().summary.clone()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            slot: self.request.clone(),
            in_flight: self.in_flight.clone(),
        }
    }

    // ── Navigation ───────────────────────────────────────────────────────────

    /// Make `screen` the active screen and save.
    pub fn activate(&self, screen: Screen) -> Result<(), IntakeError> {
        let mut inner = self.lock();
        self.switch_to(&mut inner, screen)
    }

    /// [`activate`](Self::activate) by screen id.
    pub fn activate_id(&self, id: &str) -> Result<(), IntakeError> {
        self.activate(navigator::parse_screen(id)?)
    }

    /// Leave the welcome screen.
    pub fn begin(&self) -> Result<(), IntakeError> {
        let mut inner = self.lock();
        self.expect_screen(&inner, Screen::Welcome, "begin the intake")?;
        self.switch_to(&mut inner, Screen::Preliminary)
    }

    /// Values to pre-fill the active form screen with.
    pub fn form_values(&self) -> FormValues {
        let inner = self.lock();
        forms::populate_for_edit(inner.screen, &inner.state)
    }

    /// Validate and store the active form screen, then move on.
    ///
    /// An edit started from the review sheet returns there. Otherwise the
    /// forward edge is followed, and the chief complaint starts the
    /// interview.
    pub async fn submit_screen(&self, values: &FormValues) -> Result<Submission, IntakeError> {
        let (screen, editing) = {
            let inner = self.lock();
            (inner.screen, inner.state.is_editing())
        };
        if !screen.is_form() {
            return Err(IntakeError::InvalidTransition {
                screen,
                action: "submit a form",
            });
        }

        let report = forms::validate(screen, values);
        if !report.is_valid() {
            return Err(IntakeError::Validation(report));
        }

        if screen == Screen::ChiefComplaint && !editing {
            let guard = self.begin_request()?;
            {
                let mut inner = self.lock();
                forms::collect(screen, values, &mut inner.state);
                let opening = opening_message(&inner.state);
                inner.chat = ChatHistory::default();
                inner.state.hpi_conversation.clear();
                inner.state.hpi_complete = false;
                inner.chat.push_user(opening);
                inner.interview = InterviewState::new();
                self.switch_to(&mut inner, Screen::HpiChat)?;
            }
            info!(session_id = %self.id, "interview started");
            let outcome = self.run_turn(guard).await?;
            return Ok(Submission::InterviewStarted(outcome));
        }

        let mut inner = self.lock();
        forms::collect(screen, values, &mut inner.state);
        let target = match inner.state.finish_edit() {
            Some(target) => target,
            None => navigator::after_submit(screen).ok_or(IntakeError::InvalidTransition {
                screen,
                action: "submit a form",
            })?,
        };
        self.switch_to(&mut inner, target)?;
        Ok(Submission::Moved(target))
    }

    /// Start editing a form from the review sheet.
    pub fn begin_edit(&self, screen: Screen) -> Result<FormValues, IntakeError> {
        let mut inner = self.lock();
        self.expect_screen(&inner, Screen::Review, "edit a section")?;
        if !screen.is_form() {
            return Err(IntakeError::InvalidTransition {
                screen,
                action: "edit a screen without a form",
            });
        }
        inner.state.begin_edit(Screen::Review);
        self.switch_to(&mut inner, screen)?;
        Ok(forms::populate_for_edit(screen, &inner.state))
    }

    pub fn review_sheet(&self) -> Vec<ReviewSection> {
        review::review_sheet(&self.lock().state)
    }

    /// Clear the saved session and start over on the welcome screen.
    pub fn reset(&self) -> Result<(), IntakeError> {
        self.cancel_handle().cancel();
        let mut inner = self.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        clear_snapshot(&*self.store)?;
        *inner = Inner::fresh();
        info!(session_id = %self.id, "session reset");
        Ok(())
    }

    // ── Interview ────────────────────────────────────────────────────────────

    /// Answer the pending question and request the next one.
    pub async fn submit_answer(&self, answer: &str) -> Result<TurnOutcome, IntakeError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(IntakeError::EmptyAnswer);
        }
        let guard = self.begin_request()?;
        {
            let mut inner = self.lock();
            if inner.interview.phase != InterviewPhase::AwaitingAnswer {
                return Err(IntakeError::InterviewNotActive);
            }
            let question = match inner.chat.last() {
                Some(m) if m.role == ChatHistoryRole::Assistant => m.content.clone(),
                _ => "N/A".to_string(),
            };
            inner.chat.push_user(answer);
            inner.state.record_exchange(question, answer);
            inner.interview.pending = None;
            inner.interview.phase = InterviewPhase::AwaitingQuestion;
            self.persist(&inner)?;
        }
        self.run_turn(guard).await
    }

    /// Select or deselect an option of the pending question.
    pub fn toggle_option(&self, index: usize) -> Result<(), IntakeError> {
        let mut inner = self.lock();
        match inner.interview.pending.as_mut().map(|p| &mut p.input) {
            Some(AnswerInput::Choices(selection)) => selection.toggle(index),
            Some(AnswerInput::FreeText { .. }) => Err(IntakeError::NoSuchOption(index)),
            None => Err(IntakeError::InterviewNotActive),
        }
    }

    /// Submit the selected options as the answer.
    pub async fn confirm_selection(&self) -> Result<TurnOutcome, IntakeError> {
        let answer = {
            let inner = self.lock();
            match inner.interview.pending.as_ref().map(|p| &p.input) {
                Some(AnswerInput::Choices(selection)) => {
                    selection.answer().ok_or(IntakeError::NoSelection)?
                }
                Some(AnswerInput::FreeText { .. }) => return Err(IntakeError::NoSelection),
                None => return Err(IntakeError::InterviewNotActive),
            }
        };
        self.submit_answer(&answer).await
    }

    /// Re-send the last interview request after a failure.
    pub async fn retry_turn(&self) -> Result<TurnOutcome, IntakeError> {
        let guard = self.begin_request()?;
        let phase = self.lock().interview.phase;
        match phase {
            InterviewPhase::AwaitingQuestion => self.run_turn(guard).await,
            InterviewPhase::AwaitingAnswer => Err(IntakeError::InvalidTransition {
                screen: Screen::HpiChat,
                action: "retry while a question is pending",
            }),
            InterviewPhase::NotStarted | InterviewPhase::Complete => {
                Err(IntakeError::InterviewNotActive)
            }
        }
    }

    /// Move on to past history once the interview is complete.
    ///
    /// Does nothing if the session already left the interview screen.
    pub fn advance_after_interview(&self) -> Result<(), IntakeError> {
        let mut inner = self.lock();
        if inner.interview.phase != InterviewPhase::Complete {
            return Err(IntakeError::InvalidTransition {
                screen: inner.screen,
                action: "leave an unfinished interview",
            });
        }
        if inner.screen != Screen::HpiChat {
            return Ok(());
        }
        self.switch_to(&mut inner, Screen::PastHistory)
    }

    async fn run_turn(&self, _guard: InFlightGuard) -> Result<TurnOutcome, IntakeError> {
        let (request, generation) = {
            let mut inner = self.lock();
            inner.interview.phase = InterviewPhase::AwaitingQuestion;
            inner.interview.pending = None;
            (
                CompletionRequest::with_history(INTERVIEW_SYSTEM_PROMPT, &inner.chat),
                self.generation.load(Ordering::SeqCst),
            )
        };

        let reply = self
            .complete_cancellable(&request)
            .await?
            .and_then(|text| parse_interview_reply(&text));

        let mut inner = self.lock();
        self.ensure_generation(generation)?;
        match reply {
            Ok(InterviewReply::Complete) => {
                inner.interview.phase = InterviewPhase::Complete;
                inner.state.hpi_complete = true;
                self.persist(&inner)?;
                info!(
                    session_id = %self.id,
                    exchanges = inner.state.hpi_conversation.len(),
                    "interview complete"
                );
                Ok(TurnOutcome::Complete {
                    farewell: CLOSING_MESSAGE,
                    advance_in: self.config.completion_display_delay,
                })
            }
            Ok(InterviewReply::Question { text, options }) => {
                inner.chat.push_assistant(text.clone());
                let pending = PendingQuestion::new(text, options);
                inner.interview.pending = Some(pending.clone());
                inner.interview.phase = InterviewPhase::AwaitingAnswer;
                self.persist(&inner)?;
                Ok(TurnOutcome::Question(pending))
            }
            Err(e) => {
                error!(session_id = %self.id, error = %e, "interview turn failed");
                Ok(TurnOutcome::Failed {
                    notice: CONNECTION_NOTICE,
                })
            }
        }
    }

    // ── Summary ──────────────────────────────────────────────────────────────

    /// Generate the clinical summary from the confirmed review sheet.
    ///
    /// On failure the session returns to the review sheet and the error is
    /// returned for display.
    pub async fn confirm_and_generate(&self) -> Result<ClinicalSummary, IntakeError> {
        let _guard = self.begin_request()?;
        let (request, generation) = {
            let mut inner = self.lock();
            self.expect_screen(&inner, Screen::Review, "generate the summary")?;
            self.switch_to(&mut inner, Screen::LoadingSummary)?;
            (
                CompletionRequest::standalone(&summary_prompt(&inner.state)),
                self.generation.load(Ordering::SeqCst),
            )
        };

        let reply = self.complete_cancellable(&request).await;
        let mut inner = self.lock();
        self.ensure_generation(generation)?;
        let result = match reply {
            Ok(reply) => reply.and_then(|text| {
                if self.config.summary_fallback {
                    Ok(parse_summary_with_fallback(&text))
                } else {
                    parse_summary_strict(&text)
                }
            }),
            Err(cancelled) => {
                self.switch_to(&mut inner, Screen::Review)?;
                return Err(cancelled);
            }
        };

        match result {
            Ok(summary) => {
                inner.summary = Some(summary.clone());
                self.switch_to(&mut inner, Screen::Summary)?;
                info!(session_id = %self.id, "clinical summary generated");
                Ok(summary)
            }
            Err(e) => {
                error!(session_id = %self.id, error = %e, "summary generation failed");
                self.switch_to(&mut inner, Screen::Review)?;
                Err(e.into())
            }
        }
    }

    // ── Lab reports ──────────────────────────────────────────────────────────

    /// Recognize an uploaded lab report image into `values`.
    pub async fn recognize_lab_report(
        &self,
        recognizer: &dyn TextRecognizer,
        image: &[u8],
        values: &mut FormValues,
    ) -> RecognitionStatus {
        recognition::recognize_lab_report(recognizer, image, values).await
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// Mark a request in flight and give it a fresh cancellation token.
    fn begin_request(&self) -> Result<InFlightGuard, IntakeError> {
        let guard = self.in_flight.try_acquire()?;
        *self.request_slot() = Some(CancellationToken::new());
        Ok(guard)
    }

    /// Run a completion, racing it against the current request's token.
    ///
    /// The outer `Err` is cancellation; the inner result is the request's.
    /// A cancel that lands after the reply but before the slot is emptied
    /// still wins, so `cancel()` returning `true` always means `Cancelled`.
    async fn complete_cancellable(
        &self,
        request: &CompletionRequest,
    ) -> Result<Result<String, CompletionError>, IntakeError> {
        let Some(token) = self.request_slot().clone() else {
            return Err(IntakeError::Cancelled);
        };

        let reply = tokio::select! {
            _ = token.cancelled() => None,
            reply = self.completion.complete(request) => Some(reply),
        };
        let withdrawn = self.request_slot().take().is_none();

        match reply {
            Some(reply) if !withdrawn => Ok(reply),
            _ => {
                info!(session_id = %self.id, "completion request cancelled");
                Err(IntakeError::Cancelled)
            }
        }
    }

    /// Fails with `Cancelled` when the session was reset since `generation`.
    fn ensure_generation(&self, generation: u64) -> Result<(), IntakeError> {
        if self.generation.load(Ordering::SeqCst) == generation {
            Ok(())
        } else {
            info!(session_id = %self.id, "discarding reply to a reset session");
            Err(IntakeError::Cancelled)
        }
    }

    fn request_slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.request.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expect_screen(
        &self,
        inner: &Inner,
        expected: Screen,
        action: &'static str,
    ) -> Result<(), IntakeError> {
        if inner.screen == expected {
            Ok(())
        } else {
            Err(IntakeError::InvalidTransition {
                screen: inner.screen,
                action,
            })
        }
    }

    fn switch_to(&self, inner: &mut Inner, screen: Screen) -> Result<(), IntakeError> {
        let from = inner.screen;
        inner.screen = screen;
        self.persist(inner)?;
        info!(session_id = %self.id, from = %from, to = %screen, "screen changed");
        Ok(())
    }

    fn persist(&self, inner: &Inner) -> Result<(), IntakeError> {
        let snapshot = PersistedSnapshot {
            state: inner.state.clone(),
            chat_history: inner.chat.clone(),
            active_screen: inner.screen,
        };
        save_snapshot(&*self.store, &snapshot)?;
        Ok(())
    }
}
