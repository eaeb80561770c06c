//! Headless create, edit and delete dialogs.
//!
//! A dialog owns its form, inline errors and [`MutationState`]; the
//! presentation layer reads [`DialogControls`] to decide which buttons are
//! live.

mod delete;
mod form;

pub use delete::DeleteDialog;
pub use form::{FieldErrors, FormField, NAME_REQUIRED_MESSAGE, RestaurantForm};

use crate::core::{ClientError, Restaurant, Result};
use crate::mutation::{MutationCoordinator, MutationPhase, MutationState};

/// Button rules for a dialog.
///
/// Create and edit dialogs differ on purpose: create keeps Save disabled
/// until the form is valid, edit lets Save through and validates on submit.
/// Both disable Cancel while a submission is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogPolicy {
    pub submit_requires_valid: bool,
    pub cancel_disabled_while_submitting: bool,
}

impl DialogPolicy {
    pub const CREATE: DialogPolicy = DialogPolicy {
        submit_requires_valid: true,
        cancel_disabled_while_submitting: true,
    };

    pub const EDIT: DialogPolicy = DialogPolicy {
        submit_requires_valid: false,
        cancel_disabled_while_submitting: true,
    };

    pub const DELETE: DialogPolicy = DialogPolicy {
        submit_requires_valid: false,
        cancel_disabled_while_submitting: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogControls {
    pub submit_enabled: bool,
    /// Spinner on the primary button
    pub submit_loading: bool,
    pub cancel_enabled: bool,
}

impl DialogControls {
    pub fn compute(policy: DialogPolicy, phase: &MutationPhase, form_valid: bool) -> Self {
        let submitting = phase.is_submitting();
        Self {
            submit_enabled: !submitting && (form_valid || !policy.submit_requires_valid),
            submit_loading: submitting,
            cancel_enabled: !(submitting && policy.cancel_disabled_while_submitting),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit { id: String },
}

/// Add or edit form dialog.
#[derive(Debug)]
pub struct RestaurantDialog {
    mode: DialogMode,
    policy: DialogPolicy,
    open: bool,
    defaults: RestaurantForm,
    form: RestaurantForm,
    errors: FieldErrors,
    state: MutationState,
}

impl RestaurantDialog {
    pub fn create() -> Self {
        Self::with_mode(DialogMode::Create, RestaurantForm::default(), DialogPolicy::CREATE)
    }

    pub fn edit(restaurant: &Restaurant) -> Self {
        Self::with_mode(
            DialogMode::Edit {
                id: restaurant.id.clone(),
            },
            RestaurantForm::from_restaurant(restaurant),
            DialogPolicy::EDIT,
        )
    }

    fn with_mode(mode: DialogMode, defaults: RestaurantForm, policy: DialogPolicy) -> Self {
        Self {
            mode,
            policy,
            open: false,
            form: defaults.clone(),
            defaults,
            errors: FieldErrors::new(),
            state: MutationState::new(),
        }
    }

    /// Swap the button rules, e.g. to unify create and edit behavior.
    pub fn with_policy(mut self, policy: DialogPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mode(&self) -> &DialogMode {
        &self.mode
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            DialogMode::Create => "Add Restaurant",
            DialogMode::Edit { .. } => "Edit Restaurant",
        }
    }

    pub fn description(&self) -> &'static str {
        match self.mode {
            DialogMode::Create => "Fill in the details to add a new restaurant.",
            DialogMode::Edit { .. } => "Update the restaurant details below.",
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.state.reset();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Closes the dialog unless policy keeps Cancel disabled right now.
    pub fn cancel(&mut self) -> bool {
        if !self.controls().cancel_enabled {
            return false;
        }
        self.open = false;
        true
    }

    pub fn form(&self) -> &RestaurantForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value);
        // a field already showing an error re-validates as the user types
        if self.errors.contains_key(&field) {
            self.revalidate(field);
        }
    }

    pub fn blur(&mut self, field: FormField) {
        self.revalidate(field);
    }

    fn revalidate(&mut self, field: FormField) {
        match self.form.validate_field(field) {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.form.validate().is_empty()
    }

    pub fn controls(&self) -> DialogControls {
        DialogControls::compute(self.policy, &self.state.phase(), self.is_valid())
    }

    /// Validate, then hand the form to the coordinator.
    ///
    /// An invalid form never reaches the network: inline errors are set and a
    /// `Validation` error is returned. On success the form resets and the
    /// dialog closes; on failure both stay as the user left them.
    pub async fn submit(&mut self, coordinator: &MutationCoordinator) -> Result<Restaurant> {
        let errors = self.form.validate();
        if let Some((field, message)) = errors.iter().next() {
            let err = ClientError::validation(field.id(), message.clone());
            self.errors = errors;
            return Err(err);
        }
        self.errors.clear();

        let result = match &self.mode {
            DialogMode::Create => coordinator.create(&self.state, self.form.to_create()).await,
            DialogMode::Edit { id } => {
                coordinator
                    .update(&self.state, id, self.form.to_update())
                    .await
            }
        };

        if let Ok(restaurant) = &result {
            if matches!(self.mode, DialogMode::Edit { .. }) {
                self.defaults = RestaurantForm::from_restaurant(restaurant);
            }
            self.form = self.defaults.clone();
            self.open = false;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::MutationOutcome;

    #[test]
    fn test_create_controls_gate_on_validity() {
        let mut dialog = RestaurantDialog::create();
        dialog.open();
        assert!(!dialog.controls().submit_enabled);

        dialog.set_field(FormField::Name, "Pizzeria");
        assert!(dialog.controls().submit_enabled);
        assert!(dialog.controls().cancel_enabled);
    }

    #[test]
    fn test_edit_controls_do_not_gate_on_validity() {
        let restaurant = Restaurant {
            id: "r1".to_string(),
            name: "Trattoria".to_string(),
            revo_tenant: None,
            revo_client_key: None,
            revo_api_key: None,
        };
        let mut dialog = RestaurantDialog::edit(&restaurant);
        dialog.set_field(FormField::Name, "");
        assert!(dialog.controls().submit_enabled);
    }

    #[test]
    fn test_submitting_disables_save_and_cancel() {
        for policy in [DialogPolicy::CREATE, DialogPolicy::EDIT, DialogPolicy::DELETE] {
            let controls = DialogControls::compute(policy, &MutationPhase::Submitting, true);
            assert!(!controls.submit_enabled);
            assert!(controls.submit_loading);
            assert!(!controls.cancel_enabled);
        }
    }

    #[test]
    fn test_cancel_stays_enabled_when_policy_allows() {
        let policy = DialogPolicy {
            submit_requires_valid: true,
            cancel_disabled_while_submitting: false,
        };
        let controls = DialogControls::compute(policy, &MutationPhase::Submitting, true);
        assert!(controls.cancel_enabled);

        let settled = MutationPhase::Settled(MutationOutcome::Success);
        let controls = DialogControls::compute(DialogPolicy::CREATE, &settled, false);
        assert!(!controls.submit_enabled);
        assert!(controls.cancel_enabled);
    }

    #[test]
    fn test_blur_sets_and_clears_inline_error() {
        let mut dialog = RestaurantDialog::create();
        dialog.blur(FormField::Name);
        assert_eq!(
            dialog.errors().get(&FormField::Name).map(String::as_str),
            Some(NAME_REQUIRED_MESSAGE)
        );

        dialog.set_field(FormField::Name, "Osteria");
        assert!(dialog.errors().is_empty());
    }
}
