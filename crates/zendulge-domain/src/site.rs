//! Physical business locations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::hours::OperatingHours;

/// A business location customers can book deals at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
    pub country: String,
    pub street_number: String,
    pub street: String,
    pub suburb: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub phone_number: String,
    pub email_address: String,
    pub operating_hours: OperatingHours,
    #[serde(default)]
    pub special_instruction: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Site {
    /// Single-line postal address.
    pub fn address_line(&self) -> String {
        format!(
            "{} {}, {} {} {}",
            self.street_number, self.street, self.suburb, self.state, self.postcode
        )
        .trim()
        .to_string()
    }

    /// Body used to send this record back through an update.
    pub fn to_payload(&self) -> SitePayload {
        SitePayload {
            name: self.name.clone(),
            country: self.country.clone(),
            street_number: self.street_number.clone(),
            street: self.street.clone(),
            suburb: self.suburb.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postcode: self.postcode.clone(),
            phone_number: self.phone_number.clone(),
            email_address: self.email_address.clone(),
            operating_hours: self.operating_hours.clone(),
            special_instruction: self.special_instruction.clone(),
            is_active: self.is_active,
        }
    }
}

impl Identifiable for Site {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Site {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Activatable for Site {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Searchable for Site {
    fn search_terms(&self) -> Vec<&str> {
        vec![&self.name, &self.suburb, &self.city, &self.postcode]
    }
}

/// Create/update body for a site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SitePayload {
    pub name: String,
    pub country: String,
    pub street_number: String,
    pub street: String,
    pub suburb: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub phone_number: String,
    pub email_address: String,
    pub operating_hours: OperatingHours,
    pub special_instruction: String,
    pub is_active: bool,
}
