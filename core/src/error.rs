use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("ciphertext length {len} is not a multiple of block size {block}")]
    BlockLength { len: usize, block: usize },
    #[error("invalid padding")]
    Padding,
    #[error("missing key: {0}")]
    MissingKey(&'static str),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    OpenSsl(#[from] openssl::error::ErrorStack),
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}
