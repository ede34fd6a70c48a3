//! Per-resource CRUD over the REST backend.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zendulge_domain::{
    Company, CompanyPayload, Deal, DealPayload, Profile, ProfilePayload, Service, ServicePayload,
    Site, SitePayload, User, UserPayload,
};

use super::adapters::{
    Normalize, WireCompany, WireDeal, WireProfile, WireService, WireSite, WireUser,
};
use super::client::ApiClient;
use super::error::GatewayError;

/// Binds a backend collection to its wire, record and payload types.
pub trait Resource: Send + Sync + 'static {
    /// Singular, lowercase name used in logs and toasts.
    const LABEL: &'static str;

    type Wire: DeserializeOwned + Normalize<Output = Self::Record> + Send;
    type Record: Send;
    type Payload: Serialize + Send + Sync;

    fn collection_path(parent_id: &str) -> String;

    fn item_path(parent_id: &str, id: &str) -> String {
        format!("{}/{}", Self::collection_path(parent_id), id)
    }
}

macro_rules! resource {
    ($marker:ident, $label:literal, $wire:ty, $record:ty, $payload:ty, $path:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl Resource for $marker {
            const LABEL: &'static str = $label;

            type Wire = $wire;
            type Record = $record;
            type Payload = $payload;

            fn collection_path(parent_id: &str) -> String {
                format!($path, parent_id)
            }
        }
    };
}

resource!(Sites, "site", WireSite, Site, SitePayload, "/businesses/{}/sites");
resource!(Services, "service", WireService, Service, ServicePayload, "/businesses/{}/services");
resource!(Deals, "deal", WireDeal, Deal, DealPayload, "/businesses/{}/deals");
resource!(Users, "user", WireUser, User, UserPayload, "/companies/{}/users");
resource!(Companies, "company", WireCompany, Company, CompanyPayload, "/users/{}/companies");

/// A user's profile is a singleton under the user.
#[derive(Debug, Clone, Copy)]
pub struct Profiles;

impl Resource for Profiles {
    const LABEL: &'static str = "profile";

    type Wire = WireProfile;
    type Record = Profile;
    type Payload = ProfilePayload;

    fn collection_path(parent_id: &str) -> String {
        format!("/users/{}/profile", parent_id)
    }

    fn item_path(parent_id: &str, _id: &str) -> String {
        Self::collection_path(parent_id)
    }
}

/// List endpoints sometimes answer with a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[async_trait]
pub trait ResourceGateway<R: Resource>: Send + Sync {
    async fn list(&self, parent_id: &str) -> Result<Vec<R::Record>, GatewayError>;

    async fn create(&self, parent_id: &str, payload: &R::Payload)
        -> Result<R::Record, GatewayError>;

    async fn update(
        &self,
        parent_id: &str,
        id: &str,
        payload: &R::Payload,
    ) -> Result<R::Record, GatewayError>;

    async fn delete(&self, parent_id: &str, id: &str) -> Result<(), GatewayError>;
}

#[async_trait]
impl<R: Resource> ResourceGateway<R> for ApiClient {
    async fn list(&self, parent_id: &str) -> Result<Vec<R::Record>, GatewayError> {
        let wire: OneOrMany<R::Wire> = self.get_json(&R::collection_path(parent_id)).await?;
        Ok(wire.into_vec().normalize()?)
    }

    async fn create(
        &self,
        parent_id: &str,
        payload: &R::Payload,
    ) -> Result<R::Record, GatewayError> {
        let wire: R::Wire = self
            .send_json(Method::POST, &R::collection_path(parent_id), payload)
            .await?;
        Ok(wire.normalize()?)
    }

    async fn update(
        &self,
        parent_id: &str,
        id: &str,
        payload: &R::Payload,
    ) -> Result<R::Record, GatewayError> {
        let wire: R::Wire = self
            .send_json(Method::PUT, &R::item_path(parent_id, id), payload)
            .await?;
        Ok(wire.normalize()?)
    }

    async fn delete(&self, parent_id: &str, id: &str) -> Result<(), GatewayError> {
        self.send_unit::<()>(Method::DELETE, &R::item_path(parent_id, id), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_backend_layout() {
        assert_eq!(Sites::collection_path("b1"), "/businesses/b1/sites");
        assert_eq!(Deals::item_path("b1", "d9"), "/businesses/b1/deals/d9");
        assert_eq!(Users::collection_path("c1"), "/companies/c1/users");
        assert_eq!(Companies::collection_path("u1"), "/users/u1/companies");
        assert_eq!(Profiles::item_path("u1", "ignored"), "/users/u1/profile");
    }

    #[test]
    fn one_or_many_accepts_single_object() {
        let one: OneOrMany<WireProfile> =
            serde_json::from_str(r#"{"id":"u1","email":"a@b.co"}"#).unwrap();
        assert_eq!(one.into_vec().len(), 1);
        let many: OneOrMany<WireProfile> = serde_json::from_str("[]").unwrap();
        assert!(many.into_vec().is_empty());
    }
}
