//! Host-side instance registry
//!
//! A generational slot map from [`InstanceHandle`] to the native instance
//! index and its per-frame bookkeeping. Handles outlive their instances
//! safely: once a slot is freed its generation moves on, and every later
//! use of the old handle is reported as stale instead of reaching whatever
//! instance reuses the slot or the native index.

use std::fmt;

use hashbrown::HashMap;

use crate::error::{BridgeError, SequencingViolation};

/// Caller-facing reference to one registered instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceHandle {
    slot: u32,
    generation: u32,
}

impl InstanceHandle {
    pub fn slot(self) -> u32 {
        self.slot
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.slot, self.generation)
    }
}

/// Bookkeeping for one live instance.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceEntry {
    /// Index the native engine returned from creation.
    pub native_index: i32,
    pub active: bool,
    /// Scheduled for per-frame work; destruction must cancel this first.
    pub scheduled: bool,
    /// Last frame an update was submitted in.
    pub last_update_frame: Option<u64>,
    /// Checksum of the state the instance was created from.
    pub checksum: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<InstanceEntry>,
}

/// Generational registry of live native instances.
#[derive(Debug)]
pub struct InstanceRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_index: HashMap<i32, u32>,
    capacity: usize,
}

impl InstanceRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_index: HashMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Fail if another registration would exceed capacity.
    pub fn ensure_capacity(&self) -> Result<(), BridgeError> {
        if self.len() >= self.capacity {
            return Err(BridgeError::CapacityExceeded { max: self.capacity });
        }
        Ok(())
    }

    pub fn contains_index(&self, native_index: i32) -> bool {
        self.by_index.contains_key(&native_index)
    }

    /// Record a freshly created native instance.
    pub fn register(
        &mut self,
        native_index: i32,
        checksum: u64,
    ) -> Result<InstanceHandle, BridgeError> {
        self.ensure_capacity()?;
        if self.contains_index(native_index) {
            return Err(BridgeError::DuplicateIndex {
                index: native_index,
            });
        }

        let entry = InstanceEntry {
            native_index,
            active: true,
            scheduled: false,
            last_update_frame: None,
            checksum,
        };

        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: None,
                });
                slot
            }
        };
        let cell = &mut self.slots[slot as usize];
        cell.entry = Some(entry);
        self.by_index.insert(native_index, slot);

        Ok(InstanceHandle {
            slot,
            generation: cell.generation,
        })
    }

    pub fn get(&self, handle: InstanceHandle) -> Result<&InstanceEntry, BridgeError> {
        let slot = self
            .slots
            .get(handle.slot as usize)
            .ok_or(BridgeError::InvalidIndex(handle))?;
        let generation = slot.generation;
        match &slot.entry {
            Some(entry) if generation == handle.generation => Ok(entry),
            _ if handle.generation < generation => {
                Err(SequencingViolation::StaleHandle(handle).into())
            }
            _ => Err(BridgeError::InvalidIndex(handle)),
        }
    }

    pub fn get_mut(&mut self, handle: InstanceHandle) -> Result<&mut InstanceEntry, BridgeError> {
        let slot = self
            .slots
            .get_mut(handle.slot as usize)
            .ok_or(BridgeError::InvalidIndex(handle))?;
        let generation = slot.generation;
        match &mut slot.entry {
            Some(entry) if generation == handle.generation => Ok(entry),
            _ if handle.generation < generation => {
                Err(SequencingViolation::StaleHandle(handle).into())
            }
            _ => Err(BridgeError::InvalidIndex(handle)),
        }
    }

    /// Mark an update as submitted in `frame`, returning the native index.
    pub fn record_update(&mut self, handle: InstanceHandle, frame: u64) -> Result<i32, BridgeError> {
        let entry = self.get_mut(handle)?;
        entry.last_update_frame = Some(frame);
        Ok(entry.native_index)
    }

    /// Native index for a render in `frame`; the instance must have been
    /// updated in that same frame.
    pub fn check_render(&self, handle: InstanceHandle, frame: u64) -> Result<i32, BridgeError> {
        let entry = self.get(handle)?;
        if entry.last_update_frame != Some(frame) {
            return Err(SequencingViolation::RenderBeforeUpdate { handle, frame }.into());
        }
        Ok(entry.native_index)
    }

    pub fn set_scheduled(&mut self, handle: InstanceHandle, scheduled: bool) -> Result<(), BridgeError> {
        self.get_mut(handle)?.scheduled = scheduled;
        Ok(())
    }

    /// Native index of an instance that may be destroyed now.
    pub fn check_destroy(&self, handle: InstanceHandle) -> Result<i32, BridgeError> {
        let entry = self.get(handle)?;
        if entry.scheduled {
            return Err(SequencingViolation::DestroyWhileScheduled(handle).into());
        }
        Ok(entry.native_index)
    }

    /// Drop a registration after native destruction completed.
    ///
    /// The slot's generation advances, so `handle` and every copy of it
    /// become stale. The native index becomes available for reuse.
    pub fn unregister(&mut self, handle: InstanceHandle) -> Result<InstanceEntry, BridgeError> {
        self.check_destroy(handle)?;
        let slot = &mut self.slots[handle.slot as usize];
        let entry = slot.entry.take().ok_or(BridgeError::InvalidIndex(handle))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.slot);
        self.by_index.remove(&entry.native_index);
        Ok(entry)
    }

    /// Handles of all live instances, in slot order.
    pub fn handles(&self) -> impl Iterator<Item = InstanceHandle> + '_ {
        self.slots.iter().enumerate().filter_map(|(slot, cell)| {
            cell.entry.as_ref().map(|_| InstanceHandle {
                slot: slot as u32,
                generation: cell.generation,
            })
        })
    }
}
