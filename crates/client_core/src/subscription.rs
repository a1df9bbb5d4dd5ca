use std::{
    fmt,
    sync::{Arc, Weak},
    time::Duration,
};

use shared::protocol::{SubscribeAck, SubscribeRequest};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{error::SubscribeError, ClientEvent, FinanceApi};

pub const DEFAULT_SUCCESS_RESET_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubscriptionState {
    #[default]
    Idle,
    Sending,
    Success,
    Error,
}

impl SubscriptionState {
    /// The email input and submit action are disabled in these states.
    pub fn input_disabled(self) -> bool {
        matches!(self, Self::Sending | Self::Success)
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::Success => "success",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(SubscribeAck),
    Failed(SubscribeError),
    /// Submission ignored because the form is disabled in this state.
    Blocked(SubscriptionState),
    /// Submission ignored because the email is blank.
    EmptyEmail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    pub state: SubscriptionState,
    pub email: String,
    pub last_error: Option<SubscribeError>,
}

struct FormState {
    state: SubscriptionState,
    email: String,
    last_error: Option<SubscribeError>,
    /// Bumped on every accepted submission; a reset task only acts on its own generation.
    generation: u64,
    reset_task: Option<JoinHandle<()>>,
    closed: bool,
}

impl FormState {
    fn transition(&mut self, next: SubscriptionState, events: &broadcast::Sender<ClientEvent>) {
        if self.state == next {
            return;
        }
        debug!(from = %self.state, to = %next, "subscription: state change");
        self.state = next;
        let _ = events.send(ClientEvent::SubscriptionStateChanged(next));
    }

    fn cancel_reset(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }

    fn snapshot(&self) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            state: self.state,
            email: self.email.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

struct Shared {
    form: Mutex<FormState>,
    events: broadcast::Sender<ClientEvent>,
}

/// Newsletter signup flow: `idle -> sending -> success | error`, with
/// `success` returning to `idle` after the reset delay.
pub struct SubscriptionController {
    api: Arc<dyn FinanceApi>,
    shared: Arc<Shared>,
    reset_delay: Duration,
}

impl SubscriptionController {
    pub fn new(api: Arc<dyn FinanceApi>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self::with_reset_delay(api, events, DEFAULT_SUCCESS_RESET_DELAY)
    }

    pub fn with_reset_delay(
        api: Arc<dyn FinanceApi>,
        events: broadcast::Sender<ClientEvent>,
        reset_delay: Duration,
    ) -> Self {
        Self {
            api,
            shared: Arc::new(Shared {
                form: Mutex::new(FormState {
                    state: SubscriptionState::Idle,
                    email: String::new(),
                    last_error: None,
                    generation: 0,
                    reset_task: None,
                    closed: false,
                }),
                events,
            }),
            reset_delay,
        }
    }

    pub fn reset_delay(&self) -> Duration {
        self.reset_delay
    }

    pub async fn state(&self) -> SubscriptionState {
        self.shared.form.lock().await.state
    }

    pub async fn email(&self) -> String {
        self.shared.form.lock().await.email.clone()
    }

    pub async fn last_error(&self) -> Option<SubscribeError> {
        self.shared.form.lock().await.last_error.clone()
    }

    pub async fn snapshot(&self) -> SubscriptionSnapshot {
        self.shared.form.lock().await.snapshot()
    }

    /// Stores user input. Returns `false` when the input is disabled and the
    /// value was dropped.
    pub async fn on_email_change(&self, value: impl Into<String>) -> bool {
        let mut form = self.shared.form.lock().await;
        if form.state.input_disabled() {
            return false;
        }
        form.email = value.into();
        true
    }

    /// Submits whatever email is currently stored.
    pub async fn submit_current(&self) -> SubmitOutcome {
        let email = self.email().await;
        self.submit(&email).await
    }

    pub async fn submit(&self, email: &str) -> SubmitOutcome {
        let generation = {
            let mut form = self.shared.form.lock().await;
            if form.state.input_disabled() {
                debug!(state = %form.state, "subscription: submit ignored");
                return SubmitOutcome::Blocked(form.state);
            }
            if email.trim().is_empty() {
                debug!("subscription: submit ignored for blank email");
                return SubmitOutcome::EmptyEmail;
            }

            form.email = email.to_string();
            form.cancel_reset();
            form.generation += 1;
            form.transition(SubscriptionState::Sending, &self.shared.events);
            form.generation
        };

        info!("subscription: sending request");
        let result = self
            .api
            .subscribe(SubscribeRequest::new(email.trim()))
            .await;

        let mut form = self.shared.form.lock().await;
        match result {
            Ok(ack) => {
                info!(
                    ack = ack.message.as_deref().unwrap_or_default(),
                    "subscription: accepted"
                );
                form.email.clear();
                form.last_error = None;
                form.transition(SubscriptionState::Success, &self.shared.events);
                if form.closed {
                    debug!("subscription: controller shut down; reset timer not armed");
                } else {
                    form.reset_task = Some(self.spawn_reset(generation));
                }
                SubmitOutcome::Accepted(ack)
            }
            Err(err) => {
                let err = SubscribeError::from(err);
                warn!("subscription: {err}");
                form.last_error = Some(err.clone());
                form.transition(SubscriptionState::Error, &self.shared.events);
                SubmitOutcome::Failed(err)
            }
        }
    }

    fn spawn_reset(&self, generation: u64) -> JoinHandle<()> {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let delay = self.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut form = shared.form.lock().await;
            if form.generation != generation || form.state != SubscriptionState::Success {
                return;
            }
            form.reset_task = None;
            form.transition(SubscriptionState::Idle, &shared.events);
        })
    }

    /// Cancels the pending reset timer; no further timer is armed afterwards.
    pub async fn shutdown(&self) {
        let mut form = self.shared.form.lock().await;
        form.closed = true;
        form.cancel_reset();
    }
}

impl Drop for SubscriptionController {
    fn drop(&mut self) {
        if let Ok(mut form) = self.shared.form.try_lock() {
            form.closed = true;
            form.cancel_reset();
        }
    }
}

#[cfg(test)]
#[path = "tests/subscription_tests.rs"]
mod tests;
