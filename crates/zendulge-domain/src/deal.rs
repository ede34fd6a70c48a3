//! Discounted offers published on the marketplace.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub service_id: String,
    #[serde(default)]
    pub site_ids: Vec<String>,
    pub original_price: f64,
    pub discounted_price: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub quantity_available: u32,
    pub is_active: bool,
}

impl Deal {
    /// Whole-number percentage saved against the original price.
    pub fn discount_percent(&self) -> u32 {
        if self.original_price <= 0.0 {
            return 0;
        }
        let saved = (self.original_price - self.discounted_price) / self.original_price;
        (saved * 100.0).round().clamp(0.0, 100.0) as u32
    }

    /// Whether the deal can be bought on `today`.
    pub fn is_running(&self, today: NaiveDate) -> bool {
        self.is_active
            && self.quantity_available > 0
            && self.start_date <= today
            && today <= self.end_date
    }

    pub fn to_payload(&self) -> DealPayload {
        DealPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            service_id: self.service_id.clone(),
            site_ids: self.site_ids.clone(),
            original_price: self.original_price,
            discounted_price: self.discounted_price,
            start_date: self.start_date,
            end_date: self.end_date,
            quantity_available: self.quantity_available,
            is_active: self.is_active,
        }
    }
}

impl Identifiable for Deal {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Deal {
    fn name(&self) -> &str {
        &self.title
    }
}

impl Activatable for Deal {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Searchable for Deal {
    fn search_terms(&self) -> Vec<&str> {
        vec![&self.title, &self.description]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DealPayload {
    pub title: String,
    pub description: String,
    pub service_id: String,
    pub site_ids: Vec<String>,
    pub original_price: f64,
    pub discounted_price: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub quantity_available: u32,
    pub is_active: bool,
}
