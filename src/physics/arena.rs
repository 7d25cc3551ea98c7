use serde::{Deserialize, Serialize};

/// Stable index into an [`Arena`]. The generation guards against a stale
/// index resolving to a slot that has since been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArenaIndex {
    index: u32,
    generation: u32,
}

impl ArenaIndex {
    pub fn slot(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with index reuse.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
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
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> ArenaIndex {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return ArenaIndex {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        ArenaIndex {
            index,
            generation: 0,
        }
    }

    pub fn remove(&mut self, at: ArenaIndex) -> Option<T> {
        let slot = self.slots.get_mut(at.slot())?;
        if slot.generation != at.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(at.index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, at: ArenaIndex) -> Option<&T> {
        self.slots
            .get(at.slot())
            .filter(|slot| slot.generation == at.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, at: ArenaIndex) -> Option<&mut T> {
        self.slots
            .get_mut(at.slot())
            .filter(|slot| slot.generation == at.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArenaIndex, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    ArenaIndex {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }
}
