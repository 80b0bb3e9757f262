pub mod analytics;
pub mod app;
pub mod config;
pub mod logging;
pub mod presentation;
pub mod routes;
pub mod utils;
