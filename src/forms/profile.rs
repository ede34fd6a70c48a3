use std::collections::BTreeMap;

use zendulge_domain::{Profile, ProfilePayload};

use super::descriptor::{FieldDescriptor, FormDescriptor};
use super::engine::{FormFlow, FormMode};
use super::error::FormError;
use super::field::{FieldValue, FormValues};
use super::validation::Validator;

/// Single-step account profile editor.
pub struct ProfileForm {
    descriptor: FormDescriptor,
    defaults: BTreeMap<String, FieldValue>,
    mode: FormMode,
}

impl ProfileForm {
    pub fn new(profile: &Profile) -> Self {
        let descriptor = FormDescriptor::single(
            "profile",
            "Profile",
            vec![
                FieldDescriptor::new(
                    "firstName",
                    "First name",
                    FieldValue::empty_text(),
                    Validator::MaxLength(50),
                ),
                FieldDescriptor::new(
                    "lastName",
                    "Last name",
                    FieldValue::empty_text(),
                    Validator::MaxLength(50),
                ),
                FieldDescriptor::new("email", "Email", FieldValue::empty_text(), Validator::Email),
                FieldDescriptor::new(
                    "phoneNumber",
                    "Phone number",
                    FieldValue::empty_text(),
                    Validator::Phone,
                )
                .with_optional(),
            ],
        );

        let mut defaults = BTreeMap::new();
        defaults.insert("firstName".to_string(), FieldValue::text(&profile.first_name));
        defaults.insert("lastName".to_string(), FieldValue::text(&profile.last_name));
        defaults.insert("email".to_string(), FieldValue::text(&profile.email));
        defaults.insert(
            "phoneNumber".to_string(),
            FieldValue::text(&profile.phone_number),
        );

        Self {
            descriptor,
            defaults,
            mode: FormMode::Edit {
                id: profile.id.clone(),
            },
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }
}

impl FormFlow for ProfileForm {
    type Output = ProfilePayload;

    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> BTreeMap<String, FieldValue> {
        self.defaults.clone()
    }

    fn commit(&self, values: &FormValues) -> Result<Self::Output, FormError> {
        values.deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::engine::FormEngine;

    fn profile() -> Profile {
        Profile {
            id: "u-1".into(),
            first_name: "Sam".into(),
            last_name: "Ray".into(),
            email: "sam@example.com".into(),
            phone_number: String::new(),
        }
    }

    #[test]
    fn profile_is_a_single_step_edit() {
        let mut engine = FormEngine::new(ProfileForm::new(&profile())).unwrap();
        assert_eq!(engine.session().total_steps(), 1);
        assert_eq!(engine.flow().mode().id(), Some("u-1"));

        engine.set_field("phoneNumber", "0412 345 678").unwrap();
        let payload = engine.submit().unwrap();
        assert_eq!(payload.first_name, "Sam");
        assert_eq!(payload.phone_number, "0412 345 678");
    }

    #[test]
    fn clearing_email_is_rejected() {
        let mut engine = FormEngine::new(ProfileForm::new(&profile())).unwrap();
        engine.set_field("email", " ").unwrap();
        assert!(engine.submit().is_err());
        assert_eq!(engine.current_step(), 1);
    }
}
