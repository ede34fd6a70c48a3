//! Users, profiles, companies and the registration bodies that create them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::site::SitePayload;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    BusinessOwner,
    BusinessStaff,
    Admin,
}

impl UserRole {
    pub fn manages_business(self) -> bool {
        matches!(self, UserRole::BusinessOwner | UserRole::BusinessStaff)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UserRole::Customer => "Customer",
            UserRole::BusinessOwner => "Business owner",
            UserRole::BusinessStaff => "Business staff",
            UserRole::Admin => "Admin",
        };
        f.write_str(label)
    }
}

/// Authenticated account summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl Identifiable for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Searchable for User {
    fn search_terms(&self) -> Vec<&str> {
        vec![&self.first_name, &self.last_name, &self.email]
    }
}

/// Invite/update body for company users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

/// Personal details shown on the account page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
}

impl Profile {
    pub fn to_payload(&self) -> ProfilePayload {
        ProfilePayload {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}

impl Identifiable for Profile {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

/// A registered business entity owning sites, services and deals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub abn: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub website: String,
    pub is_active: bool,
}

impl Identifiable for Company {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Company {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Activatable for Company {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Searchable for Company {
    fn search_terms(&self) -> Vec<&str> {
        vec![&self.name, &self.business_type]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPayload {
    pub name: String,
    pub abn: String,
    pub business_type: String,
    pub website: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Account section shared by both registration bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRegistration {
    #[serde(flatten)]
    pub account: AccountDetails,
    pub marketing_opt_in: bool,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRegistration {
    pub account: AccountDetails,
    pub business: CompanyPayload,
    pub site: SitePayload,
    pub role: UserRole,
}
