use crate::core::{ClientError, Restaurant, RestaurantCreate, RestaurantUpdate, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    /// Static text of the success notice for this operation.
    pub fn success_message(&self) -> &'static str {
        match self {
            MutationKind::Create => "Restaurant created successfully.",
            MutationKind::Update => "Restaurant updated successfully.",
            MutationKind::Delete => "Restaurant deleted successfully.",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::Create => write!(f, "create"),
            MutationKind::Update => write!(f, "update"),
            MutationKind::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Success,
    Failure(ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    Submitting,
    Settled(MutationOutcome),
}

impl MutationPhase {
    pub fn is_submitting(&self) -> bool {
        matches!(self, MutationPhase::Submitting)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, MutationPhase::Settled(_))
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            MutationPhase::Settled(MutationOutcome::Failure(err)) => Some(err),
            _ => None,
        }
    }
}

/// Phase cell for one dialog's mutations.
///
/// Clones share the cell. The presentation layer can poll [`phase`] or await
/// changes on a [`subscribe`]d receiver to drive spinners and button state.
///
/// [`phase`]: MutationState::phase
/// [`subscribe`]: MutationState::subscribe
#[derive(Debug, Clone)]
pub struct MutationState {
    tx: Arc<watch::Sender<MutationPhase>>,
}

impl Default for MutationState {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(MutationPhase::Idle);
        Self { tx: Arc::new(tx) }
    }

    pub fn phase(&self) -> MutationPhase {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationPhase> {
        self.tx.subscribe()
    }

    pub fn is_submitting(&self) -> bool {
        self.tx.borrow().is_submitting()
    }

    /// Moves to `Submitting` unless a submission is already running.
    pub(crate) fn try_begin(&self) -> bool {
        self.tx.send_if_modified(|phase| {
            if phase.is_submitting() {
                false
            } else {
                *phase = MutationPhase::Submitting;
                true
            }
        })
    }

    pub(crate) fn settle(&self, outcome: MutationOutcome) {
        self.tx.send_replace(MutationPhase::Settled(outcome));
    }

    /// Back to `Idle`, e.g. when a dialog is reopened. Ignored mid-submission.
    pub fn reset(&self) {
        self.tx.send_if_modified(|phase| {
            if phase.is_submitting() || *phase == MutationPhase::Idle {
                false
            } else {
                *phase = MutationPhase::Idle;
                true
            }
        });
    }
}

/// A write the user asked for, not yet sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingMutation {
    Create(RestaurantCreate),
    Update { id: String, payload: RestaurantUpdate },
    Delete { id: String },
}

impl PendingMutation {
    pub fn create(payload: RestaurantCreate) -> Self {
        PendingMutation::Create(payload)
    }

    pub fn update(id: impl Into<String>, payload: RestaurantUpdate) -> Self {
        PendingMutation::Update {
            id: id.into(),
            payload,
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        PendingMutation::Delete { id: id.into() }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            PendingMutation::Create(_) => MutationKind::Create,
            PendingMutation::Update { .. } => MutationKind::Update,
            PendingMutation::Delete { .. } => MutationKind::Delete,
        }
    }

    pub fn target_id(&self) -> Option<&str> {
        match self {
            PendingMutation::Create(_) => None,
            PendingMutation::Update { id, .. } | PendingMutation::Delete { id } => Some(id),
        }
    }

    /// Client-side gate; runs before anything reaches the network.
    pub fn validate(&self) -> Result<()> {
        match self {
            PendingMutation::Create(payload) => validate_name(Some(&payload.name)),
            PendingMutation::Update { id, payload } => {
                validate_id(id)?;
                validate_name(payload.name.as_deref())
            }
            PendingMutation::Delete { id } => validate_id(id),
        }
    }
}

pub(crate) fn validate_name(name: Option<&str>) -> Result<()> {
    match name {
        Some(name) if name.trim().is_empty() => {
            Err(ClientError::validation("name", "Name is required."))
        }
        _ => Ok(()),
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(ClientError::validation("id", "A restaurant id is required."));
    }
    Ok(())
}

/// What a settled, successful mutation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationResult {
    Created(Restaurant),
    Updated(Restaurant),
    Deleted(String),
}
