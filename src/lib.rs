//! Chirpy - short-form posting service
//!
//! Users register, log in with short-lived access tokens backed by revocable
//! refresh tokens, and post chirps that only their author may delete.

pub mod app;
pub mod core;
