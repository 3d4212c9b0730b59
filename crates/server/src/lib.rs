//! HTTP surface of the home price estimator

pub mod api;
pub mod config;
