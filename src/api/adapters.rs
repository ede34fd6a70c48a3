//! Wire records and their normalization into domain types.
//!
//! The backend is loose about shapes: ids arrive as `id` or `_id`, numbers
//! sometimes as strings, dates as bare days or full timestamps, and optional
//! fields may be missing entirely. Each `Wire*` type accepts all of that and
//! [`Normalize`] turns it into a strict domain record or an [`AdapterError`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use zendulge_domain::{Company, Deal, OperatingHours, Profile, Service, Site, User, UserRole};

#[derive(Debug, Error, PartialEq)]
pub enum AdapterError {
    #[error("{record} record is missing `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },
    #[error("`{field}` is not a number: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("`{field}` is not a date: {value}")]
    InvalidDate { field: &'static str, value: String },
}

/// Either `{"data": ...}` or the bare payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

/// Converts a lenient wire record into its domain type.
pub trait Normalize {
    type Output;

    fn normalize(self) -> Result<Self::Output, AdapterError>;
}

impl<W: Normalize> Normalize for Vec<W> {
    type Output = Vec<W::Output>;

    fn normalize(self) -> Result<Self::Output, AdapterError> {
        self.into_iter().map(Normalize::normalize).collect()
    }
}

/// A number that may have been serialized as a string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireNumber {
    Number(f64),
    Text(String),
}

impl WireNumber {
    fn to_f64(&self, field: &'static str) -> Result<f64, AdapterError> {
        match self {
            WireNumber::Number(number) => Ok(*number),
            WireNumber::Text(text) => {
                text.trim()
                    .parse::<f64>()
                    .map_err(|_| AdapterError::InvalidNumber {
                        field,
                        value: text.clone(),
                    })
            }
        }
    }

    fn to_u32(&self, field: &'static str) -> Result<u32, AdapterError> {
        let number = self.to_f64(field)?;
        if number < 0.0 || number.fract() != 0.0 || number > f64::from(u32::MAX) {
            return Err(AdapterError::InvalidNumber {
                field,
                value: number.to_string(),
            });
        }
        Ok(number as u32)
    }
}

fn required<T>(value: Option<T>, record: &'static str, field: &'static str) -> Result<T, AdapterError> {
    value.ok_or(AdapterError::MissingField { record, field })
}

fn number(
    value: Option<WireNumber>,
    record: &'static str,
    field: &'static str,
) -> Result<f64, AdapterError> {
    required(value, record, field)?.to_f64(field)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp and keeps the calendar day.
pub(crate) fn parse_day(text: &str, field: &'static str) -> Result<NaiveDate, AdapterError> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|stamp| stamp.with_timezone(&Utc).date_naive())
        .map_err(|_| AdapterError::InvalidDate {
            field,
            value: text.to_string(),
        })
}

fn parse_timestamp(text: Option<String>) -> Option<DateTime<Utc>> {
    text.and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|stamp| stamp.with_timezone(&Utc))
}

/// Lenient role parsing; unknown roles fall back to customer.
pub(crate) fn parse_role(raw: Option<&str>) -> UserRole {
    let normalized: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    match normalized.as_str() {
        "businessowner" | "owner" => UserRole::BusinessOwner,
        "businessstaff" | "staff" => UserRole::BusinessStaff,
        "admin" => UserRole::Admin,
        _ => UserRole::Customer,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireSite {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub street_number: Option<String>,
    pub street: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub operating_hours: Option<OperatingHours>,
    pub special_instruction: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<String>,
}

impl Normalize for WireSite {
    type Output = Site;

    fn normalize(self) -> Result<Site, AdapterError> {
        Ok(Site {
            id: required(self.id, "site", "id")?,
            name: required(self.name, "site", "name")?,
            country: self.country.unwrap_or_default(),
            street_number: self.street_number.unwrap_or_default(),
            street: self.street.unwrap_or_default(),
            suburb: self.suburb.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            postcode: self.postcode.unwrap_or_default(),
            phone_number: self.phone_number.unwrap_or_default(),
            email_address: self.email_address.unwrap_or_default(),
            operating_hours: self.operating_hours.unwrap_or_default(),
            special_instruction: self.special_instruction.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            created_at: parse_timestamp(self.created_at),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireService {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "duration")]
    pub duration_minutes: Option<WireNumber>,
    pub price: Option<WireNumber>,
    pub site_ids: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl Normalize for WireService {
    type Output = Service;

    fn normalize(self) -> Result<Service, AdapterError> {
        Ok(Service {
            id: required(self.id, "service", "id")?,
            name: required(self.name, "service", "name")?,
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            duration_minutes: required(self.duration_minutes, "service", "durationMinutes")?
                .to_u32("durationMinutes")?,
            price: number(self.price, "service", "price")?,
            site_ids: self.site_ids.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireDeal {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub service_id: Option<String>,
    pub site_ids: Option<Vec<String>>,
    pub original_price: Option<WireNumber>,
    pub discounted_price: Option<WireNumber>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub quantity_available: Option<WireNumber>,
    pub is_active: Option<bool>,
}

impl Normalize for WireDeal {
    type Output = Deal;

    fn normalize(self) -> Result<Deal, AdapterError> {
        let start = required(self.start_date, "deal", "startDate")?;
        let end = required(self.end_date, "deal", "endDate")?;
        Ok(Deal {
            id: required(self.id, "deal", "id")?,
            title: required(self.title, "deal", "title")?,
            description: self.description.unwrap_or_default(),
            service_id: self.service_id.unwrap_or_default(),
            site_ids: self.site_ids.unwrap_or_default(),
            original_price: number(self.original_price, "deal", "originalPrice")?,
            discounted_price: number(self.discounted_price, "deal", "discountedPrice")?,
            start_date: parse_day(&start, "startDate")?,
            end_date: parse_day(&end, "endDate")?,
            quantity_available: match self.quantity_available {
                Some(value) => value.to_u32("quantityAvailable")?,
                None => 0,
            },
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireUser {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

impl Normalize for WireUser {
    type Output = User;

    fn normalize(self) -> Result<User, AdapterError> {
        Ok(User {
            id: required(self.id, "user", "id")?,
            email: required(self.email, "user", "email")?,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            role: parse_role(self.role.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireProfile {
    #[serde(alias = "_id", alias = "userId")]
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "phone")]
    pub phone_number: Option<String>,
}

impl Normalize for WireProfile {
    type Output = Profile;

    fn normalize(self) -> Result<Profile, AdapterError> {
        Ok(Profile {
            id: required(self.id, "profile", "id")?,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: required(self.email, "profile", "email")?,
            phone_number: self.phone_number.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireCompany {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub abn: Option<String>,
    pub business_type: Option<String>,
    pub website: Option<String>,
    pub is_active: Option<bool>,
}

impl Normalize for WireCompany {
    type Output = Company;

    fn normalize(self) -> Result<Company, AdapterError> {
        Ok(Company {
            id: required(self.id, "company", "id")?,
            name: required(self.name, "company", "name")?,
            abn: self.abn.unwrap_or_default(),
            business_type: self.business_type.unwrap_or_default(),
            website: self.website.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_accepts_wrapped_and_bare() {
        let wrapped: Envelope<Vec<WireUser>> =
            serde_json::from_value(json!({"data": [{"_id": "u1", "email": "a@b.co"}]})).unwrap();
        let bare: Envelope<Vec<WireUser>> =
            serde_json::from_value(json!([{"id": "u1", "email": "a@b.co"}])).unwrap();
        let wrapped = wrapped.into_inner().normalize().unwrap();
        let bare = bare.into_inner().normalize().unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped[0].id, "u1");
    }

    #[test]
    fn service_numbers_may_be_strings() {
        let wire: WireService = serde_json::from_value(json!({
            "_id": "svc-1",
            "name": "Facial",
            "durationMinutes": "45",
            "price": "89.50"
        }))
        .unwrap();
        let service = wire.normalize().unwrap();
        assert_eq!(service.duration_minutes, 45);
        assert_eq!(service.price, 89.5);
        assert!(service.is_active);
        assert!(service.site_ids.is_empty());
    }

    #[test]
    fn deal_dates_accept_timestamps() {
        let wire: WireDeal = serde_json::from_value(json!({
            "id": "d1",
            "title": "Spring",
            "originalPrice": 100,
            "discountedPrice": 80,
            "startDate": "2026-09-01T00:00:00.000Z",
            "endDate": "2026-09-30"
        }))
        .unwrap();
        let deal = wire.normalize().unwrap();
        assert_eq!(deal.start_date, NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());
        assert_eq!(deal.quantity_available, 0);
    }

    #[test]
    fn missing_id_and_bad_numbers_are_reported() {
        let wire: WireSite = serde_json::from_value(json!({"name": "CBD"})).unwrap();
        assert_eq!(
            wire.normalize().unwrap_err(),
            AdapterError::MissingField {
                record: "site",
                field: "id"
            }
        );

        let wire: WireService = serde_json::from_value(json!({
            "id": "s", "name": "n", "durationMinutes": "an hour", "price": 1
        }))
        .unwrap();
        assert!(matches!(
            wire.normalize(),
            Err(AdapterError::InvalidNumber { field: "durationMinutes", .. })
        ));
    }

    #[test]
    fn roles_parse_leniently() {
        assert_eq!(parse_role(Some("BUSINESS_OWNER")), UserRole::BusinessOwner);
        assert_eq!(parse_role(Some("businessStaff")), UserRole::BusinessStaff);
        assert_eq!(parse_role(Some("unknown")), UserRole::Customer);
        assert_eq!(parse_role(None), UserRole::Customer);
    }
}
