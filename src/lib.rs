pub mod api;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod output;
