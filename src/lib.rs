pub mod api;
pub mod app;
pub mod cache;
pub mod calculator;
pub mod config;
pub mod fetch_error;
pub mod fetcher;
pub mod models;
pub mod normalizer;
pub mod scheduler;
pub mod services;
