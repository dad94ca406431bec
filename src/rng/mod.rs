//! Default PRNG descriptor (spec §1: "Entropy collection from OS
//! sources and the Yarrow/Fortuna/SPRNG PRNG drivers — specified only
//! by the PRNG-descriptor contract"). This crate registers one default,
//! backed by the OS entropy source through the `rand`/`rand_core`
//! ecosystem rather than a from-scratch Yarrow/Fortuna reimplementation.

pub mod os;
