//! Deal wizard: offer, pricing, schedule.

use std::collections::BTreeMap;

use zendulge_domain::{Deal, DealPayload};

use super::descriptor::{FieldDescriptor, FormDescriptor, Section};
use super::engine::{FormFlow, FormMode};
use super::error::FormError;
use super::field::{FieldValue, FormValues};
use super::validation::{make_less_than_rule, make_not_before_rule, Validator};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct DealForm {
    descriptor: FormDescriptor,
    defaults: BTreeMap<String, FieldValue>,
    mode: FormMode,
}

impl DealForm {
    pub fn new_create() -> Self {
        Self::build(None)
    }

    pub fn new_edit(deal: &Deal) -> Self {
        Self::build(Some(deal))
    }

    fn build(initial: Option<&Deal>) -> Self {
        let price = Validator::Range {
            min: 0.0,
            max: 10_000.0,
        };
        let descriptor = FormDescriptor::new(
            "deal",
            vec![
                Section::new("offer", "Offer"),
                Section::new("pricing", "Pricing"),
                Section::new("schedule", "Schedule"),
            ],
            vec![
                FieldDescriptor::new(
                    "title",
                    "Deal title",
                    FieldValue::empty_text(),
                    Validator::All(vec![Validator::MinLength(3), Validator::MaxLength(120)]),
                ),
                FieldDescriptor::new(
                    "description",
                    "Description",
                    FieldValue::empty_text(),
                    Validator::MaxLength(1000),
                )
                .with_optional(),
                FieldDescriptor::new(
                    "serviceId",
                    "Service",
                    FieldValue::empty_text(),
                    Validator::None,
                ),
                FieldDescriptor::new(
                    "siteIds",
                    "Sites",
                    FieldValue::List(Vec::new()),
                    Validator::None,
                ),
                FieldDescriptor::new(
                    "originalPrice",
                    "Original price",
                    FieldValue::Number(None),
                    price.clone(),
                )
                .in_section("pricing"),
                FieldDescriptor::new(
                    "discountedPrice",
                    "Deal price",
                    FieldValue::Number(None),
                    price,
                )
                .in_section("pricing"),
                FieldDescriptor::new(
                    "quantityAvailable",
                    "Vouchers available",
                    FieldValue::Number(None),
                    Validator::All(vec![
                        Validator::Range {
                            min: 1.0,
                            max: 10_000.0,
                        },
                        Validator::WholeNumber,
                    ]),
                )
                .in_section("pricing"),
                FieldDescriptor::new(
                    "startDate",
                    "Starts",
                    FieldValue::empty_text(),
                    Validator::Date,
                )
                .in_section("schedule"),
                FieldDescriptor::new("endDate", "Ends", FieldValue::empty_text(), Validator::Date)
                    .in_section("schedule"),
                FieldDescriptor::new("isActive", "Active", FieldValue::Flag(true), Validator::None)
                    .in_section("schedule")
                    .with_optional(),
            ],
        )
        .with_rule(make_less_than_rule(
            "discountedPrice",
            "originalPrice",
            "Deal price must be lower than the original price",
        ))
        .with_rule(make_not_before_rule(
            "endDate",
            "startDate",
            "End date cannot be before the start date",
        ));

        let mut defaults = BTreeMap::new();
        let mode = match initial {
            Some(deal) => {
                defaults.insert("title".into(), FieldValue::text(&deal.title));
                defaults.insert("description".into(), FieldValue::text(&deal.description));
                defaults.insert("serviceId".into(), FieldValue::text(&deal.service_id));
                defaults.insert("siteIds".into(), FieldValue::List(deal.site_ids.clone()));
                defaults.insert("originalPrice".into(), FieldValue::from(deal.original_price));
                defaults.insert(
                    "discountedPrice".into(),
                    FieldValue::from(deal.discounted_price),
                );
                defaults.insert(
                    "quantityAvailable".into(),
                    FieldValue::from(f64::from(deal.quantity_available)),
                );
                defaults.insert(
                    "startDate".into(),
                    FieldValue::text(deal.start_date.format(DATE_FORMAT).to_string()),
                );
                defaults.insert(
                    "endDate".into(),
                    FieldValue::text(deal.end_date.format(DATE_FORMAT).to_string()),
                );
                defaults.insert("isActive".into(), FieldValue::Flag(deal.is_active));
                FormMode::Edit {
                    id: deal.id.clone(),
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

impl FormFlow for DealForm {
    type Output = DealPayload;

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
