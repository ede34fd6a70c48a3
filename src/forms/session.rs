//! Live state of one form instance: values, errors, step and phase.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;
use uuid::Uuid;

use super::descriptor::FormDescriptor;
use super::error::{FormError, SubmitBlocked};
use super::field::{FieldState, FieldValue, FormValues};
use super::validation::{FieldErrors, ValidationError};

/// Lifecycle of a form instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing(usize),
    Submitting,
    Closed,
}

impl fmt::Display for FormPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormPhase::Editing(step) => write!(f, "editing step {}", step),
            FormPhase::Submitting => f.write_str("submitting"),
            FormPhase::Closed => f.write_str("closed"),
        }
    }
}

/// Field states, current errors and the 1-based current step.
#[derive(Debug, Clone)]
pub struct FormState {
    pub fields: BTreeMap<String, FieldState>,
    pub errors: FieldErrors,
    pub current_step: usize,
}

/// One field of the current step, as a host renders it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPrompt<'a> {
    pub key: &'static str,
    pub label: &'static str,
    pub help: Option<&'static str>,
    pub required: bool,
    pub value: &'a FieldValue,
    pub error: Option<&'a str>,
}

/// Owns the state of one form and enforces its transitions.
pub struct FormSession {
    id: Uuid,
    descriptor: FormDescriptor,
    state: FormState,
    phase: FormPhase,
}

impl FormSession {
    pub fn new(descriptor: FormDescriptor) -> Result<Self, FormError> {
        descriptor.check()?;
        let fields = descriptor
            .fields
            .iter()
            .map(|field| (field.key.to_string(), FieldState::new(field)))
            .collect();
        let session = Self {
            id: Uuid::new_v4(),
            descriptor,
            state: FormState {
                fields,
                errors: FieldErrors::new(),
                current_step: 1,
            },
            phase: FormPhase::Editing(1),
        };
        debug!(form = session.descriptor.name, id = %session.id, "form opened");
        Ok(session)
    }

    /// Replaces default values (edit mode). The new defaults are also the
    /// reset target.
    pub fn apply_defaults(
        &mut self,
        defaults: BTreeMap<String, FieldValue>,
    ) -> Result<(), FormError> {
        for (key, value) in defaults {
            let field = self.field_mut(&key)?;
            check_kind(&key, field, &value)?;
            field.default_value = value.clone();
            field.value = value;
        }
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.descriptor.total_steps()
    }

    pub fn is_last_step(&self) -> bool {
        self.state.current_step == self.total_steps()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.state.errors
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.state.fields.get(key).map(|field| &field.value)
    }

    /// Fields of the current step in declaration order, with their help
    /// text and any recorded error.
    pub fn prompts(&self) -> Vec<FieldPrompt<'_>> {
        self.descriptor
            .fields_in_step(self.state.current_step)
            .into_iter()
            .filter_map(|field| {
                let state = self.state.fields.get(field.key)?;
                Some(FieldPrompt {
                    key: field.key,
                    label: field.label,
                    help: field.help,
                    required: state.required,
                    value: &state.value,
                    error: self.state.errors.message(field.key),
                })
            })
            .collect()
    }

    pub fn values(&self) -> FormValues {
        FormValues::new(
            self.state
                .fields
                .iter()
                .map(|(key, field)| (key.clone(), field.value.clone()))
                .collect(),
        )
    }

    /// Updates one field and re-validates it (and the cross-field rules it
    /// takes part in). Never touches other fields' own results.
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), FormError> {
        self.ensure_editing("edit fields")?;
        let field = self.field_mut(key)?;
        check_kind(key, field, &value)?;
        field.value = value;

        let outcome = self.check_field(key)?;
        self.state.errors.record(key, outcome);

        let dependents: Vec<&'static str> = self
            .descriptor
            .rules
            .iter()
            .filter(|rule| rule.target != key && rule.depends_on.iter().any(|dep| *dep == key))
            .map(|rule| rule.target)
            .collect();
        for target in dependents {
            let touched = self
                .value(target)
                .map(|value| !value.is_empty())
                .unwrap_or(false);
            if touched || self.state.errors.contains(target) {
                let outcome = self.check_field(target)?;
                self.state.errors.record(target, outcome);
            }
        }
        Ok(())
    }

    /// Required-and-empty, then the field's validator. Pure.
    pub fn validate_field(&self, key: &str) -> Result<Option<ValidationError>, FormError> {
        self.state
            .fields
            .get(key)
            .map(FieldState::validate)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }

    /// Every failing field, plus cross-field rules whose target passed.
    pub fn validate_all(&self) -> FieldErrors {
        let values = self.values();
        let mut errors = FieldErrors::new();
        for field in &self.descriptor.fields {
            if let Some(error) = self.check_with(field.key, &values) {
                errors.insert(field.key, error);
            }
        }
        errors
    }

    /// Moves to `step`, clamped into `[1, total_steps]`. Does not validate.
    pub fn go_to_step(&mut self, step: usize) -> Result<usize, FormError> {
        self.ensure_editing("change steps")?;
        let clamped = step.clamp(1, self.total_steps());
        self.state.current_step = clamped;
        self.phase = FormPhase::Editing(clamped);
        Ok(clamped)
    }

    /// Validates the current step's fields before advancing. Failures are
    /// merged into the error map and the step stays put.
    pub fn next_step(&mut self) -> Result<usize, FormError> {
        self.ensure_editing("advance")?;
        let step = self.state.current_step;
        let values = self.values();
        let keys: Vec<&'static str> = self
            .descriptor
            .fields_in_step(step)
            .into_iter()
            .map(|field| field.key)
            .collect();

        let mut step_errors = FieldErrors::new();
        for key in keys {
            let outcome = self.check_with(key, &values);
            if let Some(error) = &outcome {
                step_errors.insert(key, error.clone());
            }
            self.state.errors.record(key, outcome);
        }

        if !step_errors.is_empty() {
            debug!(form = self.descriptor.name, step, errors = step_errors.len(), "step blocked");
            return Err(FormError::StepIncomplete {
                step,
                errors: step_errors,
            });
        }
        self.go_to_step(step + 1)
    }

    pub fn prev_step(&mut self) -> Result<usize, FormError> {
        self.ensure_editing("go back")?;
        self.go_to_step(self.state.current_step.saturating_sub(1))
    }

    /// Gate for submission: on success the form enters `Submitting` and the
    /// flattened values are returned.
    pub fn begin_submit(&mut self) -> Result<FormValues, SubmitBlocked> {
        match self.phase {
            FormPhase::Submitting => return Err(SubmitBlocked::InFlight),
            FormPhase::Closed => return Err(SubmitBlocked::Closed),
            FormPhase::Editing(_) => {}
        }
        let errors = self.validate_all();
        if !errors.is_empty() {
            self.state.errors = errors.clone();
            debug!(form = self.descriptor.name, errors = errors.len(), "submit refused");
            return Err(SubmitBlocked::Invalid(errors));
        }
        self.state.errors.clear();
        self.phase = FormPhase::Submitting;
        Ok(self.values())
    }

    /// Gateway accepted the payload: close and reset.
    pub fn complete_submit(&mut self) -> Result<(), FormError> {
        if self.phase != FormPhase::Submitting {
            return Err(FormError::InvalidTransition {
                action: "complete a submission",
                phase: self.phase,
            });
        }
        self.close();
        Ok(())
    }

    /// Gateway failed: back to the last step, values kept for a retry.
    pub fn fail_submit(&mut self) -> Result<(), FormError> {
        if self.phase != FormPhase::Submitting {
            return Err(FormError::InvalidTransition {
                action: "fail a submission",
                phase: self.phase,
            });
        }
        let last = self.total_steps();
        self.state.current_step = last;
        self.phase = FormPhase::Editing(last);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), FormError> {
        self.ensure_editing("cancel")?;
        self.close();
        Ok(())
    }

    /// Opens a closed form again at step 1 with default values.
    pub fn reopen(&mut self) -> Result<(), FormError> {
        if self.phase != FormPhase::Closed {
            return Err(FormError::InvalidTransition {
                action: "reopen",
                phase: self.phase,
            });
        }
        self.reset();
        self.id = Uuid::new_v4();
        self.phase = FormPhase::Editing(1);
        debug!(form = self.descriptor.name, id = %self.id, "form reopened");
        Ok(())
    }

    fn close(&mut self) {
        self.reset();
        self.phase = FormPhase::Closed;
        debug!(form = self.descriptor.name, id = %self.id, "form closed");
    }

    fn reset(&mut self) {
        for field in self.state.fields.values_mut() {
            field.reset();
        }
        self.state.errors.clear();
        self.state.current_step = 1;
    }

    fn ensure_editing(&self, action: &'static str) -> Result<(), FormError> {
        match self.phase {
            FormPhase::Editing(_) => Ok(()),
            phase => Err(FormError::InvalidTransition { action, phase }),
        }
    }

    fn field_mut(&mut self, key: &str) -> Result<&mut FieldState, FormError> {
        self.state
            .fields
            .get_mut(key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }

    fn check_field(&self, key: &str) -> Result<Option<ValidationError>, FormError> {
        if !self.state.fields.contains_key(key) {
            return Err(FormError::UnknownField(key.to_string()));
        }
        Ok(self.check_with(key, &self.values()))
    }

    fn check_with(&self, key: &str, values: &FormValues) -> Option<ValidationError> {
        let own = self.state.fields.get(key)?.validate();
        if own.is_some() {
            return own;
        }
        self.descriptor
            .rules
            .iter()
            .filter(|rule| rule.target == key)
            .find_map(|rule| rule.evaluate(values))
    }
}

fn check_kind(key: &str, field: &FieldState, value: &FieldValue) -> Result<(), FormError> {
    if field.kind() == value.kind() {
        Ok(())
    } else {
        Err(FormError::KindMismatch {
            key: key.to_string(),
            expected: field.kind(),
            found: value.kind(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::descriptor::{FieldDescriptor, Section};
    use crate::forms::validation::{make_matches_rule, Validator, REQUIRED_MESSAGE};

    fn descriptor() -> FormDescriptor {
        FormDescriptor::new(
            "signup",
            vec![
                Section::new("account", "Account"),
                Section::new("security", "Security"),
                Section::new("confirm", "Confirm"),
            ],
            vec![
                FieldDescriptor::new("email", "Email", FieldValue::empty_text(), Validator::Email),
                FieldDescriptor::new("nickname", "Nickname", FieldValue::empty_text(), Validator::None)
                    .with_optional(),
                FieldDescriptor::new(
                    "password",
                    "Password",
                    FieldValue::empty_text(),
                    Validator::MinLength(8),
                )
                .in_section("security"),
                FieldDescriptor::new(
                    "confirmPassword",
                    "Confirm password",
                    FieldValue::empty_text(),
                    Validator::None,
                )
                .in_section("security"),
                FieldDescriptor::new("acceptTerms", "Accept terms", FieldValue::Flag(false), Validator::None)
                    .in_section("confirm"),
            ],
        )
        .with_rule(make_matches_rule(
            "confirmPassword",
            "password",
            "Passwords do not match",
        ))
    }

    fn session() -> FormSession {
        FormSession::new(descriptor()).expect("valid descriptor")
    }

    #[test]
    fn starts_on_first_step_without_errors() {
        let form = session();
        assert_eq!(form.phase(), FormPhase::Editing(1));
        assert_eq!(form.current_step(), 1);
        assert!(form.errors().is_empty());
        assert_eq!(form.total_steps(), 3);
    }

    #[test]
    fn set_field_validates_only_that_field() {
        let mut form = session();
        form.set_field("email", FieldValue::text("not-an-email"))
            .unwrap();
        assert_eq!(form.errors().message("email"), Some("Enter a valid email address"));
        assert!(!form.errors().contains("password"));

        form.set_field("email", FieldValue::text("a@b.co")).unwrap();
        assert!(form.errors().is_empty());
    }

    #[test]
    fn set_field_rejects_unknown_key_and_wrong_kind() {
        let mut form = session();
        assert!(matches!(
            form.set_field("missing", FieldValue::text("x")),
            Err(FormError::UnknownField(_))
        ));
        assert!(matches!(
            form.set_field("acceptTerms", FieldValue::text("yes")),
            Err(FormError::KindMismatch { .. })
        ));
    }

    #[test]
    fn validate_all_on_fresh_form_lists_required_empty_fields() {
        let form = session();
        let errors = form.validate_all();
        let keys: Vec<&str> = errors.keys().collect();
        assert_eq!(
            keys,
            vec!["acceptTerms", "confirmPassword", "email", "password"]
        );
        assert!(errors.iter().all(|(_, error)| error.message == REQUIRED_MESSAGE));
    }

    #[test]
    fn go_to_step_clamps() {
        let mut form = session();
        assert_eq!(form.go_to_step(0).unwrap(), 1);
        assert_eq!(form.go_to_step(form.total_steps() + 5).unwrap(), 3);
        assert_eq!(form.phase(), FormPhase::Editing(3));
    }

    #[test]
    fn next_step_blocks_on_invalid_section() {
        let mut form = session();
        let err = form.next_step().unwrap_err();
        match err {
            FormError::StepIncomplete { step, errors } => {
                assert_eq!(step, 1);
                assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["email"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(form.current_step(), 1);
        assert_eq!(form.errors().message("email"), Some(REQUIRED_MESSAGE));

        form.set_field("email", FieldValue::text("a@b.co")).unwrap();
        assert_eq!(form.next_step().unwrap(), 2);
        assert_eq!(form.prev_step().unwrap(), 1);
        assert_eq!(form.prev_step().unwrap(), 1);
    }

    #[test]
    fn cross_field_rule_tracks_dependency_changes() {
        let mut form = session();
        form.set_field("password", FieldValue::text("longpassword"))
            .unwrap();
        form.set_field("confirmPassword", FieldValue::text("longpassword"))
            .unwrap();
        assert!(form.errors().is_empty());

        form.set_field("password", FieldValue::text("otherpassword"))
            .unwrap();
        assert_eq!(
            form.errors().message("confirmPassword"),
            Some("Passwords do not match")
        );

        form.set_field("password", FieldValue::text("longpassword"))
            .unwrap();
        assert!(!form.errors().contains("confirmPassword"));
    }

    #[test]
    fn submit_lifecycle() {
        let mut form = session();
        assert!(matches!(form.begin_submit(), Err(SubmitBlocked::Invalid(_))));
        assert_eq!(form.errors().len(), 4);

        form.set_field("email", FieldValue::text("a@b.co")).unwrap();
        form.set_field("password", FieldValue::text("longpassword"))
            .unwrap();
        form.set_field("confirmPassword", FieldValue::text("longpassword"))
            .unwrap();
        form.set_field("acceptTerms", FieldValue::Flag(true)).unwrap();

        let values = form.begin_submit().expect("valid form");
        assert_eq!(values.text("email"), "a@b.co");
        assert_eq!(form.phase(), FormPhase::Submitting);
        assert_eq!(form.begin_submit(), Err(SubmitBlocked::InFlight));
        assert!(form.set_field("email", FieldValue::text("x@y.co")).is_err());

        form.fail_submit().unwrap();
        assert_eq!(form.phase(), FormPhase::Editing(3));
        assert_eq!(form.values().text("email"), "a@b.co");

        form.begin_submit().unwrap();
        form.complete_submit().unwrap();
        assert_eq!(form.phase(), FormPhase::Closed);
        assert_eq!(form.values().text("email"), "");
        assert_eq!(form.begin_submit(), Err(SubmitBlocked::Closed));
    }

    #[test]
    fn cancel_resets_and_reopen_restarts() {
        let mut form = session();
        form.set_field("email", FieldValue::text("a@b.co")).unwrap();
        form.go_to_step(2).unwrap();
        form.cancel().unwrap();
        assert_eq!(form.phase(), FormPhase::Closed);
        assert!(form.cancel().is_err());

        form.reopen().unwrap();
        assert_eq!(form.phase(), FormPhase::Editing(1));
        assert_eq!(form.values().text("email"), "");
    }

    #[test]
    fn defaults_become_reset_target() {
        let mut form = session();
        let mut defaults = BTreeMap::new();
        defaults.insert("email".to_string(), FieldValue::text("old@b.co"));
        form.apply_defaults(defaults).unwrap();

        form.set_field("email", FieldValue::text("new@b.co")).unwrap();
        form.cancel().unwrap();
        form.reopen().unwrap();
        assert_eq!(form.values().text("email"), "old@b.co");
    }
}
