//! Error taxonomy for CA and issuance operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the certificate authority and issuance engine.
///
/// Cryptographic and encoding failures are never swallowed internally; they
/// propagate with a specific kind so callers can decide retry vs. abort.
/// Key generation failures are not transient and are never retried here.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Signing was attempted while no certificate authority is active.
    #[error("no active certificate authority")]
    NoActiveCa,

    /// RSA key generation or signing failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Malformed PEM/DER input, or a key/certificate pair that does not match.
    #[error("format error: {0}")]
    Format(String),

    /// The requested record does not exist in the store.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing store failed to serve a read or write.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Self {
        Error::Format(err.to_string())
    }
}

impl From<rsa::Error> for Error {
    fn from(err: rsa::Error) -> Self {
        Error::KeyGeneration(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for Error {
    fn from(err: rsa::pkcs1::Error) -> Self {
        Error::Format(err.to_string())
    }
}

impl From<pkcs8::Error> for Error {
    fn from(err: pkcs8::Error) -> Self {
        Error::Format(err.to_string())
    }
}

impl From<x509_cert::spki::Error> for Error {
    fn from(err: x509_cert::spki::Error) -> Self {
        Error::Format(err.to_string())
    }
}
