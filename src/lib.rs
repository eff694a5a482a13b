//! Data-sync layer for an HR dashboard.
//!
//! Resource modules read through a shared [`cache::QueryCache`] and invalidate
//! it after every successful mutation. View models and report exports are pure
//! functions of the cached rows. The `api` module exposes all of it over HTTP.

pub mod api;
pub mod cache;
pub mod cancel;
pub mod config;
pub mod docs;
pub mod error;
pub mod export;
pub mod gateway;
pub mod model;
pub mod preferences;
pub mod resource;
pub mod routes;
pub mod utils;
pub mod views;

pub use error::{HrmError, Result};
