pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use services::{RoleResolver, SchoolService};
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RoleResolver>,
    pub school: Arc<SchoolService>,
}

impl AppState {
    pub fn new(resolver: Arc<RoleResolver>, school: Arc<SchoolService>) -> Self {
        Self { resolver, school }
    }
}
