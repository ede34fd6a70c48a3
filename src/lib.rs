#![doc(test(attr(deny(warnings))))]

//! Zendulge core is the headless client for the Zendulge wellness-deals
//! marketplace: stepped and validated entity forms, a typed REST gateway
//! with an explicit auth session, listing helpers and guest bookmarks.

pub mod api;
pub mod app;
pub mod errors;
pub mod forms;
pub mod guest_saves;
pub mod listing;
pub mod notify;
pub mod storage;
pub mod utils;
pub mod workflow;

pub use zendulge_config as config;
pub use zendulge_domain as domain;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter and emits a startup log.
pub fn init() {
    init_with_filter(utils::DEFAULT_LOG_FILTER);
}

/// Like [`init`], using the filter from configuration.
pub fn init_with_filter(filter: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::info!("Zendulge core tracing initialized.");
    });
}
