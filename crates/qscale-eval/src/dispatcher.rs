//! Routes raw event payloads to the processor registered for their type.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use qscale_core::models::event::MessageEnvelope;
use qscale_store::BoxFuture;

use crate::error::EvalError;

/// Lifecycle of one event, logged at each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Received,
    Parsed,
    Dispatched,
    Executing,
    Done,
    Failed,
}

impl EventState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Parsed => "parsed",
            Self::Dispatched => "dispatched",
            Self::Executing => "executing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for EventState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handles every message of one type.
pub trait MessageProcessor: Send + Sync {
    fn message_type(&self) -> &str;

    /// `payload` is the raw message the envelope was parsed from.
    fn process<'a>(
        &'a self,
        envelope: &'a MessageEnvelope,
        payload: &'a [u8],
    ) -> BoxFuture<'a, Result<(), EvalError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No processor is registered for the message type.
    Ignored,
    Done,
}

#[derive(Default)]
pub struct MessageDispatcher {
    processors: HashMap<String, Arc<dyn MessageProcessor>>,
}

impl MessageDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor under its message type, replacing any earlier
    /// one for the same type.
    pub fn register(&mut self, processor: Arc<dyn MessageProcessor>) {
        let message_type = processor.message_type().to_string();
        if self.processors.insert(message_type.clone(), processor).is_some() {
            warn!(%message_type, "replaced existing message processor");
        }
    }

    pub fn message_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub async fn dispatch(&self, topic: &str, payload: &[u8]) -> Result<DispatchOutcome, EvalError> {
        debug!(topic, bytes = payload.len(), state = %EventState::Received, "event");

        let envelope = match MessageEnvelope::parse(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(topic, error = %e, state = %EventState::Failed, "event could not be parsed");
                return Err(EvalError::InvalidMessage(e));
            }
        };
        debug!(
            topic,
            message_type = %envelope.message_type,
            source = %envelope.source,
            state = %EventState::Parsed,
            "event"
        );

        let Some(processor) = self.processors.get(&envelope.message_type) else {
            warn!(topic, message_type = %envelope.message_type, "no processor for message type, dropping");
            return Ok(DispatchOutcome::Ignored);
        };
        debug!(topic, message_type = %envelope.message_type, state = %EventState::Dispatched, "event");

        match processor.process(&envelope, payload).await {
            Ok(()) => {
                info!(topic, message_type = %envelope.message_type, state = %EventState::Done, "event");
                Ok(DispatchOutcome::Done)
            }
            Err(e) => {
                warn!(
                    topic,
                    message_type = %envelope.message_type,
                    error = %e,
                    state = %EventState::Failed,
                    "event"
                );
                Err(e)
            }
        }
    }
}
