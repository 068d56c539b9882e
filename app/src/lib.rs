pub mod config;
pub mod dataset;
pub mod error;
pub mod service;

pub use error::AppError;
