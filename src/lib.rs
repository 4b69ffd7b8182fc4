pub mod config;
pub mod features;
pub mod logging;
pub mod models;
pub mod mvi;
pub mod navigation;
pub mod service;
