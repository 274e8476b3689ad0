// src/lib.rs

pub mod config;
pub mod db;
pub mod repositories;
pub mod services;
pub mod tasks;
pub mod utils;

pub use config::MetricsConfig;
pub use db::Database;
pub use botmetrics_common::error::Error;
