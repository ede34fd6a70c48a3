//! Sign-up wizards for customers and business owners.

use zendulge_domain::{
    AccountDetails, BusinessRegistration, CompanyPayload, CustomerRegistration, OperatingHours,
    SitePayload, UserRole,
};

use super::descriptor::{FieldDescriptor, FormDescriptor, Section};
use super::engine::FormFlow;
use super::error::FormError;
use super::field::{FieldValue, FormValues};
use super::site::address_fields;
use super::validation::{make_matches_rule, make_password_validator, Validator};

pub const MIN_PASSWORD_LEN: usize = 8;
const PASSWORD_MISMATCH: &str = "Passwords do not match";

fn account_fields(section: &'static str) -> Vec<FieldDescriptor> {
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
            "Mobile",
            FieldValue::empty_text(),
            Validator::Phone,
        )
        .with_optional(),
        FieldDescriptor::new(
            "password",
            "Password",
            FieldValue::empty_text(),
            make_password_validator(MIN_PASSWORD_LEN),
        )
        .with_help("At least 8 characters with letters and numbers."),
        FieldDescriptor::new(
            "confirmPassword",
            "Confirm password",
            FieldValue::empty_text(),
            Validator::None,
        ),
    ]
    .into_iter()
    .map(|field| field.in_section(section))
    .collect()
}

fn terms_field(section: &'static str) -> FieldDescriptor {
    FieldDescriptor::new(
        "acceptTerms",
        "I accept the terms and conditions",
        FieldValue::Flag(false),
        Validator::None,
    )
    .in_section(section)
}

fn account_details(values: &FormValues) -> AccountDetails {
    AccountDetails {
        first_name: values.text("firstName").to_string(),
        last_name: values.text("lastName").to_string(),
        email: values.text("email").to_lowercase(),
        password: values.text("password").to_string(),
        phone_number: values.optional_text("phoneNumber"),
    }
}

/// Four-step business owner sign-up: account, business, primary location,
/// confirmation.
pub struct BusinessRegistrationFlow {
    descriptor: FormDescriptor,
}

impl BusinessRegistrationFlow {
    pub fn new() -> Self {
        let mut fields = account_fields("account");
        fields.extend(vec![
            FieldDescriptor::new(
                "businessName",
                "Business name",
                FieldValue::empty_text(),
                Validator::MaxLength(100),
            )
            .in_section("business"),
            FieldDescriptor::new("abn", "ABN", FieldValue::empty_text(), Validator::Abn)
                .in_section("business"),
            FieldDescriptor::new(
                "businessType",
                "Business type",
                FieldValue::empty_text(),
                Validator::MaxLength(60),
            )
            .in_section("business"),
            FieldDescriptor::new("website", "Website", FieldValue::empty_text(), Validator::Url)
                .in_section("business")
                .with_optional(),
            FieldDescriptor::new(
                "businessEmail",
                "Business email",
                FieldValue::empty_text(),
                Validator::Email,
            )
            .in_section("business"),
            FieldDescriptor::new(
                "businessPhone",
                "Business phone",
                FieldValue::empty_text(),
                Validator::Phone,
            )
            .in_section("business"),
        ]);
        fields.extend(address_fields("location"));
        fields.push(terms_field("confirm"));

        let descriptor = FormDescriptor::new(
            "business-registration",
            vec![
                Section::new("account", "Your account"),
                Section::new("business", "Your business"),
                Section::new("location", "Primary location"),
                Section::new("confirm", "Confirm"),
            ],
            fields,
        )
        .with_rule(make_matches_rule(
            "confirmPassword",
            "password",
            PASSWORD_MISMATCH,
        ));
        Self { descriptor }
    }
}

impl Default for BusinessRegistrationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FormFlow for BusinessRegistrationFlow {
    type Output = BusinessRegistration;

    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn commit(&self, values: &FormValues) -> Result<Self::Output, FormError> {
        let business = CompanyPayload {
            name: values.text("businessName").to_string(),
            abn: values
                .text("abn")
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .collect(),
            business_type: values.text("businessType").to_string(),
            website: values.text("website").to_string(),
        };
        // The first site takes the business contact details and default hours.
        let site = SitePayload {
            name: business.name.clone(),
            country: values.text("country").to_string(),
            street_number: values.text("streetNumber").to_string(),
            street: values.text("street").to_string(),
            suburb: values.text("suburb").to_string(),
            city: values.text("city").to_string(),
            state: values.text("state").to_uppercase(),
            postcode: values.text("postcode").to_string(),
            phone_number: values.text("businessPhone").to_string(),
            email_address: values.text("businessEmail").to_lowercase(),
            operating_hours: OperatingHours::default(),
            special_instruction: String::new(),
            is_active: true,
        };
        Ok(BusinessRegistration {
            account: account_details(values),
            business,
            site,
            role: UserRole::BusinessOwner,
        })
    }
}

/// Two-step customer sign-up.
pub struct CustomerRegistrationFlow {
    descriptor: FormDescriptor,
}

impl CustomerRegistrationFlow {
    pub fn new() -> Self {
        let mut fields = account_fields("account");
        fields.push(
            FieldDescriptor::new(
                "marketingOptIn",
                "Send me deals by email",
                FieldValue::Flag(false),
                Validator::None,
            )
            .in_section("confirm")
            .with_optional(),
        );
        fields.push(terms_field("confirm"));

        let descriptor = FormDescriptor::new(
            "customer-registration",
            vec![
                Section::new("account", "Your details"),
                Section::new("confirm", "Confirm"),
            ],
            fields,
        )
        .with_rule(make_matches_rule(
            "confirmPassword",
            "password",
            PASSWORD_MISMATCH,
        ));
        Self { descriptor }
    }
}

impl Default for CustomerRegistrationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FormFlow for CustomerRegistrationFlow {
    type Output = CustomerRegistration;

    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn commit(&self, values: &FormValues) -> Result<Self::Output, FormError> {
        Ok(CustomerRegistration {
            account: account_details(values),
            marketing_opt_in: values.flag("marketingOptIn"),
            role: UserRole::Customer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::engine::FormEngine;
    use crate::forms::validation::REQUIRED_MESSAGE;

    fn fill_account<F: FormFlow>(engine: &mut FormEngine<F>) {
        engine.set_field("firstName", "Mia").unwrap();
        engine.set_field("lastName", "Nguyen").unwrap();
        engine.set_field("email", "Mia@Example.com").unwrap();
        engine.set_field("password", "relax2024").unwrap();
        engine.set_field("confirmPassword", "relax2024").unwrap();
    }

    #[test]
    fn mismatched_confirmation_blocks_account_step() {
        let mut engine = FormEngine::new(CustomerRegistrationFlow::new()).unwrap();
        fill_account(&mut engine);
        engine.set_field("confirmPassword", "relax2025").unwrap();
        assert_eq!(
            engine.errors().message("confirmPassword"),
            Some(PASSWORD_MISMATCH)
        );
        assert!(engine.next_step().is_err());
        assert_eq!(engine.current_step(), 1);
    }

    #[test]
    fn customer_registration_requires_terms() {
        let mut engine = FormEngine::new(CustomerRegistrationFlow::new()).unwrap();
        fill_account(&mut engine);
        assert_eq!(engine.next_step().unwrap(), 2);
        assert_eq!(
            engine.validate_all().message("acceptTerms"),
            Some(REQUIRED_MESSAGE)
        );

        engine.set_field("acceptTerms", true).unwrap();
        let payload = engine.submit().unwrap();
        assert_eq!(payload.account.email, "mia@example.com");
        assert_eq!(payload.account.phone_number, None);
        assert_eq!(payload.role, UserRole::Customer);
        assert!(!payload.marketing_opt_in);
    }

    #[test]
    fn business_registration_builds_first_site() {
        let mut engine = FormEngine::new(BusinessRegistrationFlow::new()).unwrap();
        assert_eq!(engine.session().total_steps(), 4);
        fill_account(&mut engine);
        engine.next_step().unwrap();

        engine.set_field("businessName", "Harbour Day Spa").unwrap();
        engine.set_field("abn", "51 824 753 556").unwrap();
        engine.set_field("businessType", "Day spa").unwrap();
        engine.set_field("businessEmail", "hello@harbourspa.com.au").unwrap();
        engine.set_field("businessPhone", "02 9123 4567").unwrap();
        engine.next_step().unwrap();

        engine.set_field("streetNumber", "5").unwrap();
        engine.set_field("street", "Circular Quay").unwrap();
        engine.set_field("suburb", "Sydney").unwrap();
        engine.set_field("city", "Sydney").unwrap();
        engine.set_field("state", "nsw").unwrap();
        engine.set_field("postcode", "2000").unwrap();
        engine.next_step().unwrap();
        engine.set_field("acceptTerms", true).unwrap();

        let payload = engine.submit().unwrap();
        assert_eq!(payload.role, UserRole::BusinessOwner);
        assert_eq!(payload.business.abn, "51824753556");
        assert_eq!(payload.site.name, "Harbour Day Spa");
        assert_eq!(payload.site.state, "NSW");
        assert_eq!(payload.site.phone_number, "02 9123 4567");
        assert!(payload.site.is_active);
    }
}
