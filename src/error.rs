//! Closed error taxonomy for the whole crate (spec §6, §7).
//!
//! Every fallible operation in `cryptocore` returns `Result<T, Error>`.
//! Nothing panics or unwraps outside of `#[cfg(test)]` code and nothing
//! partially commits: on error, secret outputs are left unwritten or are
//! zeroized before the error is returned.

use thiserror::Error;

/// The crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Closed status/error enum mirroring the taxonomy in spec.md §6.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid key size")]
    InvalidKeySize,
    #[error("invalid round count")]
    InvalidRounds,
    #[error("built-in self-test failed")]
    FailTestVector,
    #[error("destination buffer too small")]
    BufferOverflow,
    #[error("malformed packet")]
    InvalidPacket,
    #[error("invalid PRNG request size")]
    InvalidPrngSize,
    #[error("PRNG read returned fewer bytes than requested")]
    ReadPrngError,
    #[error("unknown cipher descriptor")]
    InvalidCipher,
    #[error("unknown hash descriptor")]
    InvalidHash,
    #[error("unknown PRNG descriptor")]
    InvalidPrng,
    #[error("allocation failure")]
    OutOfMemory,
    #[error("public/private key type mismatch")]
    PkTypeMismatch,
    #[error("operation requires a private key")]
    PkNotPrivate,
    #[error("invalid argument")]
    InvalidArg,
    #[error("invalid public-key type tag")]
    PkInvalidType,
    #[error("invalid public-key system identifier")]
    PkInvalidSystem,
    #[error("descriptor already registered")]
    PkDuplicate,
    #[error("descriptor not found")]
    PkNotFound,
    #[error("requested key size not supported")]
    PkInvalidSize,
    #[error("requested prime size out of range")]
    InvalidPrimeSize,
    #[error("MAC or signature verification failed")]
    VerificationFailed,
}
