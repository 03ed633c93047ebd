//! Core domain: authentication, chirps, storage and operator endpoints

pub mod admin;
pub mod auth;
pub mod chirps;
pub mod config;
pub mod db;
pub mod metrics;
