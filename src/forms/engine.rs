//! Binds a [`FormFlow`] to a live [`FormSession`].

use std::collections::BTreeMap;

use tracing::warn;

use super::descriptor::FormDescriptor;
use super::error::{FormError, SubmitBlocked};
use super::field::{FieldValue, FormValues};
use super::session::{FormPhase, FormSession};
use super::validation::{FieldErrors, ValidationError};

/// Whether a form creates a new record or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

impl FormMode {
    pub fn id(&self) -> Option<&str> {
        match self {
            FormMode::Create => None,
            FormMode::Edit { id } => Some(id),
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            FormMode::Create => "create",
            FormMode::Edit { .. } => "update",
        }
    }
}

/// High-level form contract for entity-specific wizards.
///
/// Implementations describe their fields and sections, supply defaults (when
/// editing existing records), and turn the collected values into the payload
/// the backend expects.
pub trait FormFlow {
    type Output;

    /// Descriptor controlling section order, fields and rules.
    fn descriptor(&self) -> &FormDescriptor;

    /// Values that replace the declared defaults when the form opens.
    fn defaults(&self) -> BTreeMap<String, FieldValue> {
        BTreeMap::new()
    }

    /// Builds the payload after validation passed.
    fn commit(&self, values: &FormValues) -> Result<Self::Output, FormError>;
}

/// Drives a [`FormFlow`] through its session.
pub struct FormEngine<F: FormFlow> {
    flow: F,
    session: FormSession,
}

impl<F: FormFlow> FormEngine<F> {
    pub fn new(flow: F) -> Result<Self, FormError> {
        let mut session = FormSession::new(flow.descriptor().clone())?;
        session.apply_defaults(flow.defaults())?;
        Ok(Self { flow, session })
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn phase(&self) -> FormPhase {
        self.session.phase()
    }

    pub fn current_step(&self) -> usize {
        self.session.current_step()
    }

    pub fn errors(&self) -> &FieldErrors {
        self.session.errors()
    }

    pub fn set_field(
        &mut self,
        key: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        self.session.set_field(key, value.into())
    }

    pub fn validate_field(&self, key: &str) -> Result<Option<ValidationError>, FormError> {
        self.session.validate_field(key)
    }

    pub fn validate_all(&self) -> FieldErrors {
        self.session.validate_all()
    }

    pub fn go_to_step(&mut self, step: usize) -> Result<usize, FormError> {
        self.session.go_to_step(step)
    }

    pub fn next_step(&mut self) -> Result<usize, FormError> {
        self.session.next_step()
    }

    pub fn prev_step(&mut self) -> Result<usize, FormError> {
        self.session.prev_step()
    }

    pub fn cancel(&mut self) -> Result<(), FormError> {
        self.session.cancel()
    }

    pub fn reopen(&mut self) -> Result<(), FormError> {
        self.session.reopen()
    }

    /// Validates everything and produces the payload. On success the form is
    /// `Submitting` until [`FormEngine::settle`] is called.
    pub fn submit(&mut self) -> Result<F::Output, SubmitBlocked> {
        let values = self.session.begin_submit()?;
        match self.flow.commit(&values) {
            Ok(output) => Ok(output),
            Err(err) => {
                // Values passed validation but the payload could not be built.
                if let Err(settle_err) = self.session.fail_submit() {
                    warn!(error = %settle_err, "form settled out of order");
                }
                Err(SubmitBlocked::Payload(err.to_string()))
            }
        }
    }

    /// Records the gateway outcome of the pending submission.
    pub fn settle(&mut self, succeeded: bool) -> Result<(), FormError> {
        if succeeded {
            self.session.complete_submit()
        } else {
            self.session.fail_submit()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::descriptor::FieldDescriptor;
    use crate::forms::validation::Validator;

    struct NameForm {
        descriptor: FormDescriptor,
        initial: Option<String>,
    }

    impl NameForm {
        fn new(initial: Option<&str>) -> Self {
            Self {
                descriptor: FormDescriptor::single(
                    "name",
                    "Name",
                    vec![FieldDescriptor::new(
                        "name",
                        "Name",
                        FieldValue::empty_text(),
                        Validator::MaxLength(10),
                    )],
                ),
                initial: initial.map(str::to_string),
            }
        }
    }

    impl FormFlow for NameForm {
        type Output = String;

        fn descriptor(&self) -> &FormDescriptor {
            &self.descriptor
        }

        fn defaults(&self) -> BTreeMap<String, FieldValue> {
            let mut defaults = BTreeMap::new();
            if let Some(name) = &self.initial {
                defaults.insert("name".to_string(), FieldValue::text(name.clone()));
            }
            defaults
        }

        fn commit(&self, values: &FormValues) -> Result<Self::Output, FormError> {
            let name = values.text("name");
            if name == "admin" {
                return Err(FormError::Payload("reserved name".into()));
            }
            Ok(name.to_uppercase())
        }
    }

    #[test]
    fn submit_commits_and_settles() {
        let mut engine = FormEngine::new(NameForm::new(None)).unwrap();
        assert!(matches!(engine.submit(), Err(SubmitBlocked::Invalid(_))));

        engine.set_field("name", "spa").unwrap();
        assert_eq!(engine.submit().unwrap(), "SPA");
        assert_eq!(engine.phase(), FormPhase::Submitting);

        engine.settle(false).unwrap();
        assert_eq!(engine.phase(), FormPhase::Editing(1));
        engine.submit().unwrap();
        engine.settle(true).unwrap();
        assert_eq!(engine.phase(), FormPhase::Closed);
    }

    #[test]
    fn commit_failure_returns_to_editing() {
        let mut engine = FormEngine::new(NameForm::new(Some("admin"))).unwrap();
        assert!(matches!(engine.submit(), Err(SubmitBlocked::Payload(_))));
        assert_eq!(engine.phase(), FormPhase::Editing(1));

        engine.set_field("name", "spa").unwrap();
        assert_eq!(engine.submit().unwrap(), "SPA");
    }

    #[test]
    fn flow_defaults_prefill_values() {
        let engine = FormEngine::new(NameForm::new(Some("Retreat"))).unwrap();
        assert_eq!(engine.session().values().text("name"), "Retreat");
        assert!(engine.validate_all().is_empty());
    }

    #[test]
    fn mode_reports_verb_and_id() {
        let mode = FormMode::Edit { id: "s-1".into() };
        assert_eq!(mode.verb(), "update");
        assert_eq!(mode.id(), Some("s-1"));
        assert_eq!(FormMode::Create.id(), None);
    }
}
