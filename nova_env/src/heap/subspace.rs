// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::{fmt, ops};

use super::indexes::BaseIndex;

/// A heap slot: the data itself and the number of owning references to it.
#[derive(Debug)]
pub(crate) struct HeapEntry<D> {
    ref_count: u32,
    data: D,
}

/// A homogenous, reference counted arena.
///
/// Slots are addressed by [`BaseIndex`]. Allocation hands out the first
/// reference; the slot is emptied and put on the free list when the last
/// reference is released. Freed indexes are reused by later allocations.
pub(crate) struct IsoSubspace<D> {
    name: &'static str,
    data: Vec<Option<HeapEntry<D>>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<D> fmt::Debug for IsoSubspace<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IsoSubspace")
            .field("name", &self.name)
            .field("capacity", &self.data.len())
            .field("live", &self.live)
            .finish()
    }
}

impl<D> IsoSubspace<D> {
    pub(crate) fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            data: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Number of slots currently holding data.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Moves `data` into a slot and returns its index. The caller owns the
    /// single reference the slot starts out with.
    pub(crate) fn alloc(&mut self, data: D) -> BaseIndex<D> {
        let entry = HeapEntry { ref_count: 1, data };
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.data[index as usize];
            debug_assert!(slot.is_none());
            *slot = Some(entry);
            return BaseIndex::from_u32_index(index);
        }
        self.data.push(Some(entry));
        BaseIndex::from_index(self.data.len() - 1)
    }

    /// Number of owning references to the slot; zero once it has been freed.
    pub(crate) fn ref_count(&self, index: BaseIndex<D>) -> u32 {
        self.data
            .get(index.into_index())
            .and_then(Option::as_ref)
            .map_or(0, |entry| entry.ref_count)
    }

    /// Adds an owning reference to the slot.
    ///
    /// ## Panics
    /// - If the slot is empty or the count would overflow.
    pub(crate) fn retain(&mut self, index: BaseIndex<D>) {
        let name = self.name;
        let entry = self.entry_mut(index);
        entry.ref_count = entry
            .ref_count
            .checked_add(1)
            .unwrap_or_else(|| panic!("{name} reference count overflow"));
    }

    /// Drops an owning reference to the slot. When the last reference goes,
    /// the slot is emptied and its data is handed back so that the caller can
    /// release whatever the data itself holds.
    pub(crate) fn release(&mut self, index: BaseIndex<D>) -> Option<D> {
        let entry = self.entry_mut(index);
        debug_assert!(entry.ref_count > 0);
        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            return None;
        }
        let entry = self.data[index.into_index()].take()?;
        self.free_list.push(index.into_u32_index());
        self.live -= 1;
        Some(entry.data)
    }

    fn entry(&self, index: BaseIndex<D>) -> &HeapEntry<D> {
        self.data
            .get(index.into_index())
            .expect("subspace index out of bounds")
            .as_ref()
            .expect("subspace slot is empty")
    }

    fn entry_mut(&mut self, index: BaseIndex<D>) -> &mut HeapEntry<D> {
        self.data
            .get_mut(index.into_index())
            .expect("subspace index out of bounds")
            .as_mut()
            .expect("subspace slot is empty")
    }
}

impl<D> ops::Index<BaseIndex<D>> for IsoSubspace<D> {
    type Output = D;

    fn index(&self, index: BaseIndex<D>) -> &Self::Output {
        &self.entry(index).data
    }
}

impl<D> ops::IndexMut<BaseIndex<D>> for IsoSubspace<D> {
    fn index_mut(&mut self, index: BaseIndex<D>) -> &mut Self::Output {
        &mut self.entry_mut(index).data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_release_frees_the_slot() {
        let mut space = IsoSubspace::with_capacity("test", 4);
        let index = space.alloc(7u32);
        space.retain(index);
        assert_eq!(space.ref_count(index), 2);
        assert_eq!(space.release(index), None);
        assert_eq!(space[index], 7);
        assert_eq!(space.release(index), Some(7));
        assert_eq!(space.ref_count(index), 0);
        assert_eq!(space.live(), 0);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut space = IsoSubspace::with_capacity("test", 4);
        let first = space.alloc("a");
        let second = space.alloc("b");
        assert_eq!(space.release(first), Some("a"));
        let third = space.alloc("c");
        assert_eq!(third, first);
        assert_eq!(space[second], "b");
        assert_eq!(space[third], "c");
        assert_eq!(space.live(), 2);
    }

    #[test]
    #[should_panic(expected = "subspace slot is empty")]
    fn retaining_a_freed_slot_panics() {
        let mut space = IsoSubspace::with_capacity("test", 1);
        let index = space.alloc(());
        let _ = space.release(index);
        space.retain(index);
    }
}
