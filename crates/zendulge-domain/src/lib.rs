//! zendulge-domain
//!
//! Typed marketplace records (sites, services, deals, users, profiles,
//! companies) and the payload shapes the REST backend accepts.
//! No I/O, no HTTP. Only data types and core enums.

pub mod account;
pub mod common;
pub mod deal;
pub mod hours;
pub mod service;
pub mod site;

pub use account::*;
pub use common::*;
pub use deal::*;
pub use hours::*;
pub use service::*;
pub use site::*;
