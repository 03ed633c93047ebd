//! Operator endpoints: metrics page and development reset hook

pub mod api;

pub use api::{AdminApiState, admin_api_router};
