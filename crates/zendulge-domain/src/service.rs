//! Treatments a business offers.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// A bookable treatment (massage, facial, yoga class, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub duration_minutes: u32,
    pub price: f64,
    #[serde(default)]
    pub site_ids: Vec<String>,
    pub is_active: bool,
}

impl Service {
    pub fn to_payload(&self) -> ServicePayload {
        ServicePayload {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            duration_minutes: self.duration_minutes,
            price: self.price,
            site_ids: self.site_ids.clone(),
            is_active: self.is_active,
        }
    }
}

impl Identifiable for Service {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Service {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Activatable for Service {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Searchable for Service {
    fn search_terms(&self) -> Vec<&str> {
        vec![&self.name, &self.category, &self.description]
    }
}

/// Create/update body for a service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayload {
    pub name: String,
    pub description: String,
    pub category: String,
    pub duration_minutes: u32,
    pub price: f64,
    pub site_ids: Vec<String>,
    pub is_active: bool,
}

/// Categories the marketplace groups services under.
pub const SERVICE_CATEGORIES: [&str; 8] = [
    "Massage",
    "Facial",
    "Beauty",
    "Hair",
    "Nails",
    "Fitness",
    "Yoga",
    "Wellness",
];
