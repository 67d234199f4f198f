//! Generation-checked handle registry for live solver bundles.
//!
//! Handles are opaque integers packing a slot index and a generation
//! counter.  A deleted slot bumps its generation, so a stale handle (use
//! after delete, or double delete) is detected and rejected instead of
//! aliasing whatever occupies the slot next.

use super::EngineError;
use crate::chol::CholBundle;

/// Opaque identifier of one live solver bundle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    fn new(index: usize, generation: u32) -> Self {
        Handle(((generation as u64) << 32) | index as u64)
    }

    fn index(&self) -> usize {
        (self.0 & 0xFFFF_FFFF) as usize
    }

    fn generation(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// The raw integer form handed across the call boundary.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn from_u64(raw: u64) -> Self {
        Handle(raw)
    }
}

struct Slot {
    generation: u32,
    entry: Option<Box<CholBundle>>,
}

/// Slot arena owning every live [`CholBundle`].
#[derive(Default)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert(&mut self, bundle: CholBundle) -> Handle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.entry = Some(Box::new(bundle));
                Handle::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(Box::new(bundle)),
                });
                Handle::new(index, 0)
            }
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut CholBundle, EngineError> {
        self.slots
            .get_mut(handle.index())
            .filter(|s| s.generation == handle.generation())
            .and_then(|s| s.entry.as_deref_mut())
            .ok_or(EngineError::InvalidHandle)
    }

    pub fn remove(&mut self, handle: Handle) -> Result<(), EngineError> {
        let index = handle.index();
        let slot = self
            .slots
            .get_mut(index)
            .filter(|s| s.generation == handle.generation() && s.entry.is_some())
            .ok_or(EngineError::InvalidHandle)?;

        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::CscMatrix;

    fn bundle() -> CholBundle {
        CholBundle::new(&CscMatrix::identity(2), 0).unwrap()
    }

    #[test]
    fn insert_get_remove() {
        let mut reg = Registry::new();
        let h = reg.insert(bundle());
        assert!(reg.get_mut(h).is_ok());
        assert_eq!(reg.len(), 1);

        assert!(reg.remove(h).is_ok());
        assert!(reg.is_empty());
    }

    #[test]
    fn stale_handle_is_rejected() {
        let mut reg = Registry::new();
        let h = reg.insert(bundle());
        reg.remove(h).unwrap();

        // double delete and use after delete
        assert!(matches!(reg.remove(h), Err(EngineError::InvalidHandle)));
        assert!(matches!(reg.get_mut(h), Err(EngineError::InvalidHandle)));

        // the recycled slot gets a fresh generation
        let h2 = reg.insert(bundle());
        assert_ne!(h.as_u64(), h2.as_u64());
        assert!(reg.get_mut(h2).is_ok());
        assert!(matches!(reg.get_mut(h), Err(EngineError::InvalidHandle)));
    }

    #[test]
    fn handle_roundtrips_through_raw_integer() {
        let mut reg = Registry::new();
        let h = reg.insert(bundle());
        let raw = h.as_u64();
        assert!(reg.get_mut(Handle::from_u64(raw)).is_ok());
    }
}
