pub mod ai;
pub mod api;
pub mod config;
pub mod error;
pub mod pricing;
pub mod review;
pub mod state;
pub mod stock;
pub mod utils;
