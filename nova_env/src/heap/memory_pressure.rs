// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notifications to the embedder about memory getting scarce.
//!
//! The heap does not collect anything on its own: reference counts free
//! slots eagerly. What it can do is tell interested parties that the
//! accounted heap size has grown past a configured limit so that they can
//! drop caches or otherwise give memory back.

use core::fmt;

/// How scarce memory has become.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemoryPressureSeverity {
    /// The heap has grown past its desired size.
    Low,
    /// The heap has grown past its hard limit.
    High,
}

/// Identifies a registered callback so that it can be unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryPressureCallbackId(u32);

pub type MemoryPressureCallback = Box<dyn FnMut(MemoryPressureSeverity)>;

#[derive(Default)]
pub(crate) struct MemoryPressureCallbacks {
    next_id: u32,
    callbacks: Vec<(MemoryPressureCallbackId, MemoryPressureCallback)>,
}

impl fmt::Debug for MemoryPressureCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPressureCallbacks")
            .field("registered", &self.callbacks.len())
            .finish()
    }
}

impl MemoryPressureCallbacks {
    pub(crate) fn register(&mut self, callback: MemoryPressureCallback) -> MemoryPressureCallbackId {
        let id = MemoryPressureCallbackId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn unregister(&mut self, id: MemoryPressureCallbackId) -> bool {
        let Some(position) = self.callbacks.iter().position(|(entry, _)| *entry == id) else {
            return false;
        };
        // Keep registration order: callbacks run in the order they were added.
        drop(self.callbacks.remove(position));
        true
    }

    pub(crate) fn run(&mut self, severity: MemoryPressureSeverity) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(severity);
        }
    }
}

/// Tracks the accounted heap size against the configured limits and decides
/// when callbacks must run.
#[derive(Debug)]
pub(crate) struct AllocationAccounting {
    allocated: usize,
    desired_limit: usize,
    limit: usize,
}

impl AllocationAccounting {
    pub(crate) fn new(desired_limit: usize, limit: usize) -> Self {
        assert!(
            desired_limit <= limit,
            "desired heap limit must not exceed the hard heap limit"
        );
        Self {
            allocated: 0,
            desired_limit,
            limit,
        }
    }

    pub(crate) fn allocated(&self) -> usize {
        self.allocated
    }

    /// Accounts `bytes` more and returns the severity of the limit that the
    /// allocation crossed, if any.
    pub(crate) fn grow(&mut self, bytes: usize) -> Option<MemoryPressureSeverity> {
        let before = self.allocated;
        self.allocated = before.saturating_add(bytes);
        if before <= self.limit && self.allocated > self.limit {
            Some(MemoryPressureSeverity::High)
        } else if before <= self.desired_limit && self.allocated > self.desired_limit {
            Some(MemoryPressureSeverity::Low)
        } else {
            None
        }
    }

    pub(crate) fn shrink(&mut self, bytes: usize) {
        debug_assert!(self.allocated >= bytes);
        self.allocated = self.allocated.saturating_sub(bytes);
    }
}
