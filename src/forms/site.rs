//! Site create/edit dialog.

use std::collections::BTreeMap;

use zendulge_domain::{OperatingHours, Site, SitePayload};

use super::descriptor::{FieldDescriptor, FormDescriptor, Section};
use super::engine::{FormFlow, FormMode};
use super::error::FormError;
use super::field::{FieldValue, FormValues};
use super::validation::{Validator, AU_STATES};

pub const DEFAULT_COUNTRY: &str = "Australia";

/// Street address fields shared with the business registration flow.
pub(crate) fn address_fields(section: &'static str) -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new(
            "country",
            "Country",
            FieldValue::text(DEFAULT_COUNTRY),
            Validator::MaxLength(60),
        ),
        FieldDescriptor::new(
            "streetNumber",
            "Street number",
            FieldValue::empty_text(),
            Validator::MaxLength(10),
        ),
        FieldDescriptor::new(
            "street",
            "Street",
            FieldValue::empty_text(),
            Validator::MaxLength(100),
        ),
        FieldDescriptor::new(
            "suburb",
            "Suburb",
            FieldValue::empty_text(),
            Validator::MaxLength(60),
        ),
        FieldDescriptor::new("city", "City", FieldValue::empty_text(), Validator::MaxLength(60)),
        FieldDescriptor::new(
            "state",
            "State",
            FieldValue::empty_text(),
            Validator::one_of(AU_STATES),
        ),
        FieldDescriptor::new(
            "postcode",
            "Postcode",
            FieldValue::empty_text(),
            Validator::Postcode,
        )
        .with_help("Four-digit Australian postcode."),
    ]
    .into_iter()
    .map(|field| field.in_section(section))
    .collect()
}

pub struct SiteForm {
    descriptor: FormDescriptor,
    defaults: BTreeMap<String, FieldValue>,
    mode: FormMode,
}

impl SiteForm {
    pub fn new_create() -> Self {
        Self::build(None)
    }

    pub fn new_edit(site: &Site) -> Self {
        Self::build(Some(site))
    }

    fn build(initial: Option<&Site>) -> Self {
        let mut fields = vec![
            FieldDescriptor::new(
                "name",
                "Site name",
                FieldValue::empty_text(),
                Validator::MaxLength(100),
            )
            .in_section("details"),
            FieldDescriptor::new("isActive", "Active", FieldValue::Flag(true), Validator::None)
                .in_section("details")
                .with_optional()
                .with_help("Inactive sites are hidden from the marketplace."),
        ];
        fields.extend(address_fields("address"));
        fields.extend(vec![
            FieldDescriptor::new(
                "phoneNumber",
                "Phone number",
                FieldValue::empty_text(),
                Validator::Phone,
            )
            .in_section("contact"),
            FieldDescriptor::new(
                "emailAddress",
                "Email address",
                FieldValue::empty_text(),
                Validator::Email,
            )
            .in_section("contact"),
            FieldDescriptor::new(
                "operatingHours",
                "Opening hours",
                FieldValue::Hours(OperatingHours::default()),
                Validator::Hours,
            )
            .in_section("hours"),
            FieldDescriptor::new(
                "specialInstruction",
                "Special instructions",
                FieldValue::empty_text(),
                Validator::MaxLength(500),
            )
            .in_section("hours")
            .with_optional()
            .with_help("Parking, entry or arrival notes shown to customers."),
        ]);

        let descriptor = FormDescriptor::new(
            "site",
            vec![
                Section::new("details", "Site details"),
                Section::new("address", "Address"),
                Section::new("contact", "Contact"),
                Section::new("hours", "Opening hours"),
            ],
            fields,
        );

        let mut defaults = BTreeMap::new();
        let mode = match initial {
            Some(site) => {
                let text = |value: &str| FieldValue::text(value);
                defaults.insert("name".into(), text(&site.name));
                defaults.insert("isActive".into(), FieldValue::Flag(site.is_active));
                defaults.insert("country".into(), text(&site.country));
                defaults.insert("streetNumber".into(), text(&site.street_number));
                defaults.insert("street".into(), text(&site.street));
                defaults.insert("suburb".into(), text(&site.suburb));
                defaults.insert("city".into(), text(&site.city));
                defaults.insert("state".into(), text(&site.state));
                defaults.insert("postcode".into(), text(&site.postcode));
                defaults.insert("phoneNumber".into(), text(&site.phone_number));
                defaults.insert("emailAddress".into(), text(&site.email_address));
                defaults.insert(
                    "operatingHours".into(),
                    FieldValue::Hours(site.operating_hours.clone()),
                );
                defaults.insert(
                    "specialInstruction".into(),
                    text(&site.special_instruction),
                );
                FormMode::Edit {
                    id: site.id.clone(),
                }
            }
            None => FormMode::Create,
        };

        Self {
            descriptor,
            defaults,
            mode,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }
}

impl FormFlow for SiteForm {
    type Output = SitePayload;

    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> BTreeMap<String, FieldValue> {
        self.defaults.clone()
    }

    fn commit(&self, values: &FormValues) -> Result<Self::Output, FormError> {
        let mut payload: SitePayload = values.deserialize()?;
        payload.state = payload.state.to_uppercase();
        Ok(payload)
    }
}
