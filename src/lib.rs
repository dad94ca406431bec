//! A modular cryptographic primitives library: an arbitrary-precision
//! integer engine, RSA/DH/ECC public-key primitives, block-cipher modes
//! of operation, the EAX and OCB authenticated-encryption modes, the
//! OMAC and PMAC message-authentication codes, and the packet framing
//! those public-key primitives use to exchange keys and signatures.
//!
//! Ciphers, hashes, and PRNGs are pluggable: this crate registers a
//! small set of defaults ([`registry::register_defaults`]) and anything
//! using the library is free to register more by implementing the
//! relevant descriptor trait in [`registry`].

pub mod error;
pub mod registry;

pub mod mpi;

pub mod ciphers;
pub mod hashes;
pub mod rng;

pub mod modes;

pub mod mac;
pub mod aead;

pub mod pk;

pub mod framing;

pub use error::{Error, Result};

/// Library version, surfaced through [`framing::LIBRARY_VERSION`] in
/// every packet header this crate writes.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Register the default cipher, hash, and PRNG descriptors and run each
/// one's embedded known-answer test. Call once at process startup
/// before using anything in [`modes`], [`mac`], [`aead`], or [`pk`].
pub fn init() -> Result<()> {
    registry::register_defaults()?;
    self_test()
}

/// Run every registered descriptor's known-answer test. Does not touch
/// [`mpi`]/[`pk`]/[`modes`]/[`mac`]/[`aead`], which carry their own
/// `#[cfg(test)]` coverage rather than a runtime self-test hook.
pub fn self_test() -> Result<()> {
    for name in ["aes", "sha1", "sha256"] {
        if let Some(desc) = registry::ciphers().find_by_name(name) {
            desc.test()?;
        }
        if let Some(desc) = registry::hashes().find_by_name(name) {
            desc.test()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_registers_defaults_and_passes_self_test() {
        // init() is safe to call more than once across the test binary's
        // shared process-wide registries: register_defaults surfaces
        // PkDuplicate on a second call, which we tolerate here.
        let _ = init();
        assert!(registry::ciphers().find_by_name("aes").is_some());
        assert!(registry::hashes().find_by_name("sha256").is_some());
        self_test().unwrap();
    }
}
