pub mod djradio;
pub mod playlist;
pub mod search;
pub mod songs;

// Reexport common types
pub use super::types::{Api, CryptoType, Operation};
