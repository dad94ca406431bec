//! Public-key primitives (spec §4.7 RSA, §4.8 Diffie–Hellman, §4.9 ECC),
//! all built on the [`crate::mpi`] engine.

pub mod dh;
pub mod ecc;
pub mod rsa;
