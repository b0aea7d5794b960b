//! View-model behind the investment planning screen.
//!
//! Handlers take `&self` and may overlap: each one snapshots the state it
//! needs, releases the lock across the backend call and applies its own
//! outcome when the call completes. Nothing is cancelled or coalesced, so the
//! last completion to apply wins on the shared form fields.

use std::sync::Arc;

use shared::{domain::InvestmentId, protocol::Investment};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    error::ClientError,
    form::{FormField, InvestmentForm},
    InvestmentApi,
};

const CREATED_MESSAGE: &str = "Investment created successfully!";
const UPDATED_MESSAGE: &str = "Investment updated successfully!";
const DELETED_MESSAGE: &str = "Investment deleted successfully!";
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct PlannerState {
    pub investments: Vec<Investment>,
    pub filtered_investments: Vec<Investment>,
    pub form: InvestmentForm,
    pub selected_id: Option<InvestmentId>,
    pub response_message: String,
    pub filter_query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlannerEvent {
    ListReloaded { count: usize },
    FormChanged,
    Message(String),
}

/// What a user action ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    Failed,
    /// The action's precondition did not hold and no request was issued.
    Skipped,
}

pub struct InvestmentPlanner {
    api: Arc<dyn InvestmentApi>,
    inner: Mutex<PlannerState>,
    events: broadcast::Sender<PlannerEvent>,
}

impl InvestmentPlanner {
    pub fn new(api: Arc<dyn InvestmentApi>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            inner: Mutex::new(PlannerState::default()),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PlannerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> PlannerState {
        self.inner.lock().await.clone()
    }

    pub async fn response_message(&self) -> String {
        self.inner.lock().await.response_message.clone()
    }

    pub async fn initialize(&self) -> ActionOutcome {
        self.load_investments().await
    }

    /// Replaces both lists with a fresh fetch. A failed fetch is only logged.
    pub async fn load_investments(&self) -> ActionOutcome {
        match self.api.list().await {
            Ok(investments) => {
                let count = investments.len();
                {
                    let mut guard = self.inner.lock().await;
                    guard.filtered_investments = investments.clone();
                    guard.investments = investments;
                    guard.filter_query.clear();
                }
                debug!(count, "investment list reloaded");
                let _ = self.events.send(PlannerEvent::ListReloaded { count });
                ActionOutcome::Completed
            }
            Err(err) => {
                error!("Error loading investments: {err}");
                ActionOutcome::Failed
            }
        }
    }

    pub async fn handle_input_change(&self, name: &str, value: &str) -> Result<(), ClientError> {
        let field: FormField = name.parse()?;
        self.set_field(field, value).await;
        Ok(())
    }

    pub async fn set_field(&self, field: FormField, value: &str) {
        self.inner.lock().await.form.set_field(field, value);
        let _ = self.events.send(PlannerEvent::FormChanged);
    }

    pub async fn is_create_button_disabled(&self) -> bool {
        self.inner.lock().await.form.is_create_button_disabled()
    }

    pub async fn handle_create(&self) -> ActionOutcome {
        let form = self.inner.lock().await.form.clone();
        let record = match form.to_record() {
            Ok(record) => record,
            Err(err) => {
                self.set_message(format!("Error creating investment: {err}"))
                    .await;
                return ActionOutcome::Failed;
            }
        };

        match self.api.create(&record).await {
            Ok(_) => {
                info!(name = %record.investment_name, "investment created");
                self.finish_mutation(CREATED_MESSAGE, false).await;
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!("create investment failed: {err}");
                self.set_message(format!("Error creating investment: {err}"))
                    .await;
                ActionOutcome::Failed
            }
        }
    }

    pub async fn handle_update(&self) -> ActionOutcome {
        let (selected_id, form) = {
            let guard = self.inner.lock().await;
            (guard.selected_id, guard.form.clone())
        };
        let Some(selected_id) = selected_id else {
            debug!("update requested without a selected investment");
            return ActionOutcome::Skipped;
        };

        let record = match form.to_record() {
            Ok(record) => record,
            Err(err) => {
                self.set_message(format!("Error updating investment: {err}"))
                    .await;
                return ActionOutcome::Failed;
            }
        };

        match self.api.update(&record).await {
            Ok(_) => {
                info!(id = %selected_id, "investment updated");
                self.finish_mutation(UPDATED_MESSAGE, true).await;
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!(id = %selected_id, "update investment failed: {err}");
                self.set_message(format!("Error updating investment: {err}"))
                    .await;
                ActionOutcome::Failed
            }
        }
    }

    pub async fn handle_edit(&self, id: InvestmentId) -> ActionOutcome {
        match self.api.get_by_id(id).await {
            Ok(record) => {
                {
                    let mut guard = self.inner.lock().await;
                    guard.form = InvestmentForm::from(record);
                    guard.selected_id = Some(id);
                }
                let _ = self.events.send(PlannerEvent::FormChanged);
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!(%id, "fetch investment failed: {err}");
                let message = serde_json::to_string(&err.to_api_error())
                    .unwrap_or_else(|_| err.to_string());
                self.set_message(message).await;
                ActionOutcome::Failed
            }
        }
    }

    pub async fn handle_delete(&self, id: InvestmentId) -> ActionOutcome {
        match self.api.delete_by_id(id).await {
            Ok(_) => {
                info!(%id, "investment deleted");
                self.finish_mutation(DELETED_MESSAGE, true).await;
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!(%id, "delete investment failed: {err}");
                self.set_message(format!("Error deleting investment: {err}"))
                    .await;
                ActionOutcome::Failed
            }
        }
    }

    /// Drops the in-progress record and any selection.
    pub async fn reset_form(&self) {
        {
            let mut guard = self.inner.lock().await;
            guard.form = InvestmentForm::empty();
            guard.selected_id = None;
        }
        let _ = self.events.send(PlannerEvent::FormChanged);
    }

    /// Case-insensitive name filter over the loaded list; empty shows all.
    pub async fn apply_filter(&self, query: &str) {
        let mut guard = self.inner.lock().await;
        let needle = query.trim().to_lowercase();
        let filtered: Vec<Investment> = if needle.is_empty() {
            guard.investments.clone()
        } else {
            guard
                .investments
                .iter()
                .filter(|investment| {
                    investment
                        .investment_name
                        .to_lowercase()
                        .contains(&needle)
                })
                .cloned()
                .collect()
        };
        guard.filtered_investments = filtered;
        guard.filter_query = query.to_string();
    }

    async fn finish_mutation(&self, message: &str, clear_selection: bool) {
        {
            let mut guard = self.inner.lock().await;
            guard.response_message = message.to_string();
            guard.form = InvestmentForm::empty();
            if clear_selection {
                guard.selected_id = None;
            }
        }
        let _ = self.events.send(PlannerEvent::Message(message.to_string()));
        let _ = self.events.send(PlannerEvent::FormChanged);
        self.load_investments().await;
    }

    async fn set_message(&self, message: String) {
        self.inner.lock().await.response_message = message.clone();
        let _ = self.events.send(PlannerEvent::Message(message));
    }
}

#[cfg(test)]
#[path = "tests/planner_tests.rs"]
mod tests;
