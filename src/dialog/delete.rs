use super::{DialogControls, DialogPolicy};
use crate::core::Result;
use crate::mutation::{MutationCoordinator, MutationState};

/// Confirmation dialog for deleting one restaurant.
#[derive(Debug)]
pub struct DeleteDialog {
    id: String,
    open: bool,
    state: MutationState,
}

impl DeleteDialog {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            open: false,
            state: MutationState::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &'static str {
        "Delete Restaurant"
    }

    pub fn description(&self) -> &'static str {
        "This restaurant will be permanently deleted. Are you sure? You will not be able to undo this action."
    }

    pub fn open(&mut self) {
        self.open = true;
        self.state.reset();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn cancel(&mut self) -> bool {
        if !self.controls().cancel_enabled {
            return false;
        }
        self.open = false;
        true
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn controls(&self) -> DialogControls {
        DialogControls::compute(DialogPolicy::DELETE, &self.state.phase(), true)
    }

    /// Closes on success; stays open on failure so the user can retry.
    pub async fn confirm(&mut self, coordinator: &MutationCoordinator) -> Result<()> {
        coordinator.delete(&self.state, &self.id).await?;
        self.open = false;
        Ok(())
    }
}
