pub mod crypto;
pub mod error;
pub mod http;

pub use error::CryptoError;
