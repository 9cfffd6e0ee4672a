#![allow(unused_imports)]

pub mod config;
pub mod error;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, Result};
