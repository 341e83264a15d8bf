use serde::de::DeserializeOwned;
use serde_json::Value;

pub use crate::crypto::CryptoType;
pub use crate::error::{NcmError as Error, Result};

pub const CODE_OK: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Post,
}

/// One endpoint. `path` is given without the family prefix, e.g.
/// `/song/enhance/player/url`.
pub trait Api {
    type Output: DeserializeOwned;

    const OPERATION: Operation = Operation::Post;
    const CRYPTO: CryptoType;
    /// eapi only: ask for an encrypted body (`e_r`) and decrypt the reply.
    const ENCRYPTED_RESPONSE: bool = false;

    fn path(&self) -> String;
    fn body(&self) -> Value;
}
