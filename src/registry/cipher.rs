//! Cipher descriptor contract (spec §5 "Cipher descriptor contract").

use super::Descriptor;
use crate::error::Result;

/// A block cipher's key schedule, already initialized from a key.
/// The capability-trait analogue of the source's opaque per-cipher
/// key-schedule struct plus its `ecb_encrypt`/`ecb_decrypt` function
/// pointers.
pub trait CipherState: Send + Sync {
    fn encrypt_block(&self, input: &[u8], output: &mut [u8]);
    fn decrypt_block(&self, input: &[u8], output: &mut [u8]);
}

/// A registered block cipher algorithm.
pub trait CipherDescriptor: Descriptor {
    /// Smallest accepted key size, in bytes.
    fn min_key_size(&self) -> usize;
    /// Largest accepted key size, in bytes.
    fn max_key_size(&self) -> usize;
    /// Block size in bytes (same for every mode built on this cipher).
    fn block_size(&self) -> usize;
    /// Default round count, used when `setup`'s caller passes 0.
    fn default_rounds(&self) -> u32;

    /// `setup(key, keylen, rounds, &state)`: build a key schedule.
    fn setup(&self, key: &[u8], rounds: u32) -> Result<Box<dyn CipherState>>;

    /// Clamp `desired` down to the largest supported key size `<=
    /// desired` (spec: "`keysize(&desired) -> status` clamps `desired`
    /// down to the largest supported size <= input").
    fn keysize(&self, desired: usize) -> Result<usize>;

    /// Run the descriptor's embedded known-answer test.
    fn test(&self) -> Result<()>;
}
