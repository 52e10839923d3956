//! HTTP request handlers for the web server.

mod analyze;
mod api;

pub use analyze::analyze_report;
pub use api::{health, list_providers, root};
