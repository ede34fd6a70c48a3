//! Remote API gateway: transport, auth session, wire adapters and
//! per-resource CRUD.

pub mod adapters;
pub mod auth;
pub mod client;
pub mod error;
pub mod resources;
pub mod session;

pub use adapters::{AdapterError, Envelope, Normalize};
pub use auth::SavedDeals;
pub use client::ApiClient;
pub use error::GatewayError;
pub use resources::{
    Companies, Deals, Profiles, Resource, ResourceGateway, Services, Sites, Users,
};
pub use session::Session;
