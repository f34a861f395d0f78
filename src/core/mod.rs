pub mod alerts;
pub mod config;
pub mod dates;
pub mod error;
pub mod model;
pub mod sources;
