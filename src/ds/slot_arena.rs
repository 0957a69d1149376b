//! Generation-checked slot arena.
//!
//! Values live in a `Vec` of slots and are addressed by [`SlotId`]. Freed
//! slots are recycled through a free list, so inserts and removals are O(1).
//!
//! Every insert stamps the slot with a fresh generation taken from a
//! per-arena counter. The counter only grows (it survives [`SlotArena::clear`]),
//! so an id whose slot was freed and reused, or an id issued before a
//! `clear`, never resolves again: lookups through it return `None`.

/// Handle to a value stored in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: usize,
    generation: u64,
}

impl SlotId {
    /// Position of the slot inside the arena.
    pub fn index(self) -> usize {
        self.index
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    value: Option<T>,
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<usize>,
    len: usize,
    next_generation: u64,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            next_generation: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
            next_generation: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> SlotId {
        let generation = self.next_generation;
        self.next_generation += 1;

        let index = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index];
            slot.generation = generation;
            slot.value = Some(value);
            index
        } else {
            self.slots.push(Slot {
                generation,
                value: Some(value),
            });
            self.slots.len() - 1
        };
        self.len += 1;
        SlotId { index, generation }
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        self.free_list.push(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots the arena can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Drops every value. Ids issued before the call stay dead.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    SlotId {
                        index,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
