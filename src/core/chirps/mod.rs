//! Chirps module for Chirpy
//!
//! Short text posts: content policy and REST API endpoints.

pub mod api;
pub mod content;

pub use api::{ChirpApiError, ChirpApiState, chirp_api_router};
pub use content::{MAX_CHIRP_LENGTH, ValidationError, clean_body, mask_profanity};
