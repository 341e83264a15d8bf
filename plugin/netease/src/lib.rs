pub mod api;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod types;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ApiError, NcmError, Result};
