use std::collections::BTreeMap;

use zendulge_domain::{Service, ServicePayload, SERVICE_CATEGORIES};

use super::descriptor::{FieldDescriptor, FormDescriptor, Section};
use super::engine::{FormFlow, FormMode};
use super::error::FormError;
use super::field::{FieldValue, FormValues};
use super::validation::Validator;

/// Service offering dialog: what it is, then how long, how much and where.
pub struct ServiceForm {
    descriptor: FormDescriptor,
    defaults: BTreeMap<String, FieldValue>,
    mode: FormMode,
}

impl ServiceForm {
    pub fn new_create() -> Self {
        Self::build(None)
    }

    pub fn new_edit(service: &Service) -> Self {
        Self::build(Some(service))
    }

    fn build(initial: Option<&Service>) -> Self {
        let descriptor = FormDescriptor::new(
            "service",
            vec![
                Section::new("details", "Service details"),
                Section::new("pricing", "Duration, price and sites"),
            ],
            vec![
                FieldDescriptor::new(
                    "name",
                    "Service name",
                    FieldValue::empty_text(),
                    Validator::MaxLength(100),
                ),
                FieldDescriptor::new(
                    "description",
                    "Description",
                    FieldValue::empty_text(),
                    Validator::MaxLength(1000),
                )
                .with_optional(),
                FieldDescriptor::new(
                    "category",
                    "Category",
                    FieldValue::empty_text(),
                    Validator::one_of(SERVICE_CATEGORIES),
                ),
                FieldDescriptor::new(
                    "durationMinutes",
                    "Duration (minutes)",
                    FieldValue::Number(None),
                    Validator::All(vec![
                        Validator::Range {
                            min: 5.0,
                            max: 480.0,
                        },
                        Validator::WholeNumber,
                    ]),
                )
                .in_section("pricing"),
                FieldDescriptor::new(
                    "price",
                    "Price (AUD)",
                    FieldValue::Number(None),
                    Validator::Range {
                        min: 0.0,
                        max: 10_000.0,
                    },
                )
                .in_section("pricing"),
                FieldDescriptor::new(
                    "siteIds",
                    "Available at",
                    FieldValue::List(Vec::new()),
                    Validator::None,
                )
                .in_section("pricing")
                .with_help("Pick at least one site offering this service."),
                FieldDescriptor::new("isActive", "Active", FieldValue::Flag(true), Validator::None)
                    .in_section("pricing")
                    .with_optional(),
            ],
        );

        let mut defaults = BTreeMap::new();
        let mode = match initial {
            Some(service) => {
                defaults.insert("name".into(), FieldValue::text(&service.name));
                defaults.insert("description".into(), FieldValue::text(&service.description));
                defaults.insert("category".into(), FieldValue::text(&service.category));
                defaults.insert(
                    "durationMinutes".into(),
                    FieldValue::from(f64::from(service.duration_minutes)),
                );
                defaults.insert("price".into(), FieldValue::from(service.price));
                defaults.insert("siteIds".into(), FieldValue::List(service.site_ids.clone()));
                defaults.insert("isActive".into(), FieldValue::Flag(service.is_active));
                FormMode::Edit {
                    id: service.id.clone(),
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

impl FormFlow for ServiceForm {
    type Output = ServicePayload;

    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> BTreeMap<String, FieldValue> {
        self.defaults.clone()
    }

    fn commit(&self, values: &FormValues) -> Result<Self::Output, FormError> {
        let mut payload: ServicePayload = values.deserialize()?;
        // Store the canonical category spelling.
        if let Some(category) = SERVICE_CATEGORIES
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(&payload.category))
        {
            payload.category = category.to_string();
        }
        Ok(payload)
    }
}
