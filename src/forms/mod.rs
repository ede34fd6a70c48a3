//! Stepped, per-field validated forms.
//!
//! A [`FormDescriptor`] declares sections, fields and cross-field rules. A
//! [`FormSession`] owns the live values, errors, current step and phase of one
//! form instance. Entity dialogs implement [`FormFlow`] and are driven through
//! a [`FormEngine`], which turns validated values into typed payloads.

pub mod deal;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod field;
pub mod profile;
pub mod registration;
pub mod service;
pub mod session;
pub mod site;
pub mod validation;

pub use deal::DealForm;
pub use descriptor::{FieldDescriptor, FormDescriptor, Section};
pub use engine::{FormEngine, FormFlow, FormMode};
pub use error::{FormError, SubmitBlocked};
pub use field::{FieldKind, FieldState, FieldValue, FormValues};
pub use profile::ProfileForm;
pub use registration::{BusinessRegistrationFlow, CustomerRegistrationFlow};
pub use service::ServiceForm;
pub use session::{FieldPrompt, FormPhase, FormSession, FormState};
pub use site::SiteForm;
pub use validation::{
    CrossFieldRule, FieldErrors, ValidationError, Validator, NUMERIC_MESSAGE, REQUIRED_MESSAGE,
};
