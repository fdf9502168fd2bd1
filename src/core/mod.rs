pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod formatter;
pub mod models;
pub mod normalize;
pub mod pipeline;
