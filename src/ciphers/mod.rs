//! Default cipher descriptors (spec §1: individual round functions are
//! out of scope, "specified only by the cipher-descriptor contract").
//!
//! AES is the one default cipher this crate registers; anything else an
//! embedder wants (DES, RC6, Noekeon, ...) is registered the same way,
//! by implementing [`crate::registry::CipherDescriptor`] and calling
//! [`crate::registry::ciphers`]`().register(...)`.

pub mod aes;
