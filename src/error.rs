use thiserror::Error;

use crate::scheme::HashFunction;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KmsSignError>;

/// Distinguishes the ways an issuance call can disagree with the issuer's
/// configured role. All three are fatal for the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleViolation {
    /// A self-signed certificate was requested from an issuer that is
    /// already bound to a certificate.
    SelfSignRequiresRoot,
    /// A child certificate was requested from an issuer with no parent
    /// certificate bound.
    NoParentBound,
    /// The bound parent certificate does not have its CA flag set.
    ParentNotCa,
}

impl std::fmt::Display for RoleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleViolation::SelfSignRequiresRoot => {
                write!(f, "cannot create a self-signed certificate with a parent bound")
            }
            RoleViolation::NoParentBound => {
                write!(f, "cannot sign a child certificate without a parent")
            }
            RoleViolation::ParentNotCa => {
                write!(f, "cannot sign a certificate with a non-CA parent")
            }
        }
    }
}

/// Represents errors that can occur while issuing KMS-backed certificates.
///
/// Every variant is terminal for the current invocation; nothing in this
/// crate retries a failed remote call.
#[derive(Debug, Error, Clone)]
pub enum KmsSignError {
    /// The remote key reports an algorithm outside the supported table.
    #[error("key has unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The remote service could not be queried for key metadata or public
    /// key material.
    #[error("could not retrieve key material: {0}")]
    RetrievalFailed(String),

    /// The public key response was absent, not PEM, or failed to parse.
    #[error("malformed public key response: {0}")]
    MalformedResponse(String),

    /// A caller requested a digest hash other than the one fixed by the
    /// key's algorithm.
    #[error("unexpected hash function, got {requested}, wanted {expected}")]
    HashMismatch {
        requested: HashFunction,
        expected: HashFunction,
    },

    /// A digest could not be wrapped in the remote signing envelope.
    #[error("cannot build {hash} digest envelope from {digest_len} bytes")]
    UnsupportedHash {
        hash: HashFunction,
        digest_len: usize,
    },

    /// The remote signing call itself failed.
    #[error("error in asymmetric sign: {0}")]
    RemoteSigningFailed(String),

    /// The requested operation is not valid for the issuer's role.
    #[error("role violation: {0}")]
    RoleViolation(RoleViolation),

    /// DER assembly of a certificate or request failed.
    #[error("failed to encode data: {0}")]
    EncodingFailed(String),

    /// Error due to invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<der::Error> for KmsSignError {
    fn from(err: der::Error) -> Self {
        KmsSignError::EncodingFailed(err.to_string())
    }
}
