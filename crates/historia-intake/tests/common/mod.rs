#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use historia_completion::chat::CompletionRequest;
use historia_completion::client::CompletionService;
use historia_completion::error::CompletionError;
use historia_core::schema::LAB_REPORTS_FIELD;
use historia_intake::config::IntakeConfig;
use historia_intake::forms::FormValues;
use historia_intake::session::IntakeSession;
use historia_storage::store::{KeyValueStore, MemoryStore};

/// Replies from a fixed script and records every request it sees.
#[derive(Default)]
pub struct ScriptedService {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedService {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Network("script exhausted".to_string())))
    }
}

/// Holds every request until released.
#[derive(Default)]
pub struct GatedService {
    pub release: Notify,
}

#[async_trait]
impl CompletionService for GatedService {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        self.release.notified().await;
        Ok("Where is the pain?".to_string())
    }
}

pub fn quick_config() -> IntakeConfig {
    IntakeConfig {
        completion_display_delay: Duration::from_millis(10),
        summary_fallback: false,
    }
}

pub fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

pub fn session_with(
    store: Arc<dyn KeyValueStore>,
    service: Arc<dyn CompletionService>,
) -> IntakeSession {
    IntakeSession::new(store, service, quick_config())
}

pub fn preliminary() -> FormValues {
    FormValues::new()
        .with("name", "Asha")
        .with("age", "34")
        .with("sex", "Female")
}

pub fn chief_complaint() -> FormValues {
    FormValues::new()
        .with("cc-symptom", "headache")
        .with("cc-duration", "3 days")
}

pub fn past_history() -> FormValues {
    FormValues::new()
        .with("psh-details", "Appendectomy 2015")
        .with("meds-details", "")
}

pub fn social_history() -> FormValues {
    FormValues::new()
        .with("social-tobacco", "Never")
        .with("social-alcohol", "Occasional")
}

pub fn lab_report() -> FormValues {
    FormValues::new().with(LAB_REPORTS_FIELD, "Hb 13.2 g/dL")
}

pub const SUMMARY_REPLY: &str = "History of Presenting Illness:\n34-year-old woman with a 3-day frontal headache.\n\n\
Probable Diagnoses:\n1. **Tension headache:** Bilateral pressing pain.\n2. **Migraine:** Photophobia.";
