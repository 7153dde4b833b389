//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use civic_connect_core::{ports::IdentityProvider, store::ReportStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReportStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<Config>,
}
