//! Slot arena with generational indices.
//!
//! Freed slots are reused. Each slot counts how often it was freed, and an
//! [`ArenaIndex`] only resolves while its generation matches, so an index to
//! a removed value never reaches the value stored in its slot later.

/// Slot position plus the generation it was handed out for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaIndex {
    slot: usize,
    generation: u32,
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub(crate) fn insert(&mut self, value: T) -> ArenaIndex {
        self.len += 1;
        match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot];
                entry.value = Some(value);
                ArenaIndex {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                ArenaIndex {
                    slot: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    pub(crate) fn remove(&mut self, index: ArenaIndex) -> Option<T> {
        let entry = self.slots.get_mut(index.slot)?;
        if entry.generation != index.generation {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(index.slot);
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, index: ArenaIndex) -> Option<&T> {
        self.slots
            .get(index.slot)
            .filter(|entry| entry.generation == index.generation)
            .and_then(|entry| entry.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, index: ArenaIndex) -> Option<&mut T> {
        self.slots
            .get_mut(index.slot)
            .filter(|entry| entry.generation == index.generation)
            .and_then(|entry| entry.value.as_mut())
    }

    pub(crate) fn contains(&self, index: ArenaIndex) -> bool {
        self.get(index).is_some()
    }

    /// Number of live values.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of slots allocated so far, live or free.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }
}
