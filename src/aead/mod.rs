//! Authenticated-encryption modes (spec §4.5 EAX, §4.6 OCB), both built
//! on block-cipher primitives plus the GF(2ⁿ) subkey machinery shared
//! with [`crate::mac`].

pub mod eax;
pub mod ocb;

pub use eax::EaxState;
pub use ocb::OcbState;
