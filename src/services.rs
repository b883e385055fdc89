pub mod solar_service;

pub use solar_service::{SolarDataSource, SolarService};
