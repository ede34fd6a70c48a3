use thiserror::Error;

use super::field::FieldKind;
use super::session::FormPhase;
use super::validation::FieldErrors;

/// Misuse of a form instance or a failed payload projection.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Unknown field `{0}`")]
    UnknownField(String),
    #[error("Field `{0}` is declared more than once")]
    DuplicateField(String),
    #[error("Field `{field}` references undeclared section `{section}`")]
    UnknownSection { field: String, section: String },
    #[error("Field `{key}` expects {expected} but received {found}")]
    KindMismatch {
        key: String,
        expected: FieldKind,
        found: FieldKind,
    },
    #[error("Cannot {action} while the form is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: FormPhase,
    },
    #[error("Step {step} has {} invalid field(s)", .errors.len())]
    StepIncomplete { step: usize, errors: FieldErrors },
    #[error("Could not build payload: {0}")]
    Payload(String),
}

/// Reasons a submit request does not reach the gateway.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitBlocked {
    #[error("Validation failed: {0}")]
    Invalid(FieldErrors),
    #[error("A submission is already in progress")]
    InFlight,
    #[error("The form is closed")]
    Closed,
    #[error("Could not build payload: {0}")]
    Payload(String),
}
