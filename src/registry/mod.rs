//! Cipher, hash, and PRNG descriptor registries (spec §2 "L0 Registry",
//! §5 "Descriptor tables").
//!
//! The source keeps three fixed-size arrays of descriptor structs
//! (name, numeric ID, sizes, function pointers), mutated only by
//! register/unregister and otherwise read-only. Here that becomes a
//! fixed-*capacity* table of trait objects behind a single `RwLock`,
//! reached through a process-wide [`OnceLock`]-initialized handle (spec
//! §9 redesign flag: "Becomes a process-wide registry guarded by an
//! initialization barrier ... a read-mostly map accessed through an
//! immutable handle after startup"). Function pointers become capability
//! traits (`CipherDescriptor`, `HashDescriptor`, `PrngDescriptor`);
//! dispatch is virtual but the slots hold typed `Arc<dyn Trait>` handles,
//! not raw pointers.
//!
//! Registration is expected to happen once at startup, before any other
//! crypto operation begins (spec §5 "Shared state"); this module does
//! not itself enforce that beyond the mutual exclusion the lock gives
//! register/unregister against each other.

mod cipher;
mod hash;
mod prng;

pub use cipher::{CipherDescriptor, CipherState};
pub use hash::{HashDescriptor, HashState};
pub use prng::{PrngDescriptor, PrngState};

use crate::error::{Error, Result};
use std::sync::{Arc, OnceLock, RwLock};

/// Default number of slots in each descriptor table, matching the
/// source's small fixed-size arrays (spec never names an exact bound;
/// this comfortably covers every descriptor this crate registers plus
/// headroom for an embedder's own).
pub const DEFAULT_CAPACITY: usize = 32;

/// Common identity every descriptor kind exposes, used by the registry
/// for name/ID lookup independent of which capability trait it wraps.
pub trait Descriptor: Send + Sync {
    fn name(&self) -> &'static str;
    fn id(&self) -> u8;
}

/// A fixed-capacity, by-name-or-ID lookup table of descriptors of one
/// kind, guarded by a single reader-writer lock.
pub struct Registry<T: ?Sized> {
    capacity: usize,
    slots: RwLock<Vec<Option<Arc<T>>>>,
}

impl<T: ?Sized + Descriptor> Registry<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Registry {
            capacity,
            slots: RwLock::new((0..capacity).map(|_| None).collect()),
        }
    }

    /// Copy `entry` into the first empty slot. Errors if the name is
    /// already registered ([`Error::PkDuplicate`]) or every slot is full
    /// ([`Error::OutOfMemory`]).
    pub fn register(&self, entry: Arc<T>) -> Result<()> {
        let mut slots = self.slots.write().expect("registry lock poisoned");
        if slots.iter().flatten().any(|d| d.name() == entry.name()) {
            return Err(Error::PkDuplicate);
        }
        match slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                log::debug!("registered descriptor '{}' (id={})", entry.name(), entry.id());
                *slot = Some(entry);
                Ok(())
            }
            None => Err(Error::OutOfMemory),
        }
    }

    /// Clear the slot holding the descriptor named `name`.
    pub fn unregister(&self, name: &str) -> Result<()> {
        let mut slots = self.slots.write().expect("registry lock poisoned");
        match slots.iter_mut().find(|s| s.as_ref().is_some_and(|d| d.name() == name)) {
            Some(slot) => {
                log::debug!("unregistered descriptor '{name}'");
                *slot = None;
                Ok(())
            }
            None => Err(Error::PkNotFound),
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<Arc<T>> {
        let slots = self.slots.read().expect("registry lock poisoned");
        slots.iter().flatten().find(|d| d.name() == name).cloned()
    }

    pub fn find_by_id(&self, id: u8) -> Option<Arc<T>> {
        let slots = self.slots.read().expect("registry lock poisoned");
        slots.iter().flatten().find(|d| d.id() == id).cloned()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.read().expect("registry lock poisoned").iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static CIPHERS: OnceLock<Registry<dyn CipherDescriptor>> = OnceLock::new();
static HASHES: OnceLock<Registry<dyn HashDescriptor>> = OnceLock::new();
static PRNGS: OnceLock<Registry<dyn PrngDescriptor>> = OnceLock::new();

/// The process-wide cipher descriptor table, created with
/// [`DEFAULT_CAPACITY`] slots on first access.
pub fn ciphers() -> &'static Registry<dyn CipherDescriptor> {
    CIPHERS.get_or_init(|| Registry::with_capacity(DEFAULT_CAPACITY))
}

pub fn hashes() -> &'static Registry<dyn HashDescriptor> {
    HASHES.get_or_init(|| Registry::with_capacity(DEFAULT_CAPACITY))
}

pub fn prngs() -> &'static Registry<dyn PrngDescriptor> {
    PRNGS.get_or_init(|| Registry::with_capacity(DEFAULT_CAPACITY))
}

/// Register every descriptor this crate ships by default (AES, SHA-1,
/// SHA-256, the OS-entropy PRNG). Idempotent: re-registering a name
/// already present returns [`Error::PkDuplicate`] rather than silently
/// succeeding, matching the source's register/unregister discipline.
pub fn register_defaults() -> Result<()> {
    use crate::ciphers::aes::AesDescriptor;
    use crate::hashes::sha1::Sha1Descriptor;
    use crate::hashes::sha256::Sha256Descriptor;
    use crate::rng::os::OsPrngDescriptor;

    ciphers().register(Arc::new(AesDescriptor))?;
    hashes().register(Arc::new(Sha1Descriptor))?;
    hashes().register(Arc::new(Sha256Descriptor))?;
    prngs().register(Arc::new(OsPrngDescriptor))?;
    Ok(())
}
