// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::borrow::Cow;

use wtf8::{Wtf8, Wtf8Buf};

use crate::{
    ecmascript::execution::Agent,
    heap::{Heap, indexes::StringIndex},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringHeapData {
    pub(crate) data: Wtf8Buf,
}

impl StringHeapData {
    pub(crate) fn from_str(str: &str) -> Self {
        StringHeapData {
            data: Wtf8Buf::from_str(str),
        }
    }

    pub(crate) fn as_wtf8(&self) -> &Wtf8 {
        &self.data
    }

    /// Length of the WTF-8 encoded contents in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }
}

/// ### [6.1.4 The String Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-string-type)
///
/// A handle to an interned, reference counted heap string. Two handles are
/// equal exactly when their contents are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct String(pub(crate) StringIndex);

impl String {
    /// Interns `str` and returns a new owning reference to it.
    pub fn from_str(agent: &mut Agent, str: &str) -> String {
        agent.heap.create_string(str)
    }

    pub(crate) fn get_index(self) -> StringIndex {
        self.0
    }

    pub fn as_str(self, agent: &Agent) -> Option<&str> {
        agent.heap.strings[self.0].as_wtf8().as_str()
    }

    pub fn to_string_lossy(self, agent: &Agent) -> Cow<'_, str> {
        self.to_string_lossy_in(&agent.heap)
    }

    pub(crate) fn to_string_lossy_in(self, heap: &Heap) -> Cow<'_, str> {
        heap.strings[self.0].as_wtf8().to_string_lossy()
    }
}

#[cfg(test)]
mod tests {
    use crate::ecmascript::execution::{Agent, agent::Options};

    use super::String;

    #[test]
    fn strings_are_interned() {
        let mut agent = Agent::new(Options::default());
        let a = String::from_str(&mut agent, "binding");
        let b = String::from_str(&mut agent, "binding");
        let c = String::from_str(&mut agent, "other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(agent.heap().string_ref_count(a), 2);
        assert_eq!(a.as_str(&agent), Some("binding"));
        assert_eq!(c.to_string_lossy(&agent), "other");
    }

    #[test]
    fn released_strings_are_uninterned() {
        let mut agent = Agent::new(Options::default());
        let a = String::from_str(&mut agent, "temporary");
        agent.heap_mut().free_string(a);
        assert_eq!(agent.heap().string_count(), 0);
        let b = String::from_str(&mut agent, "temporary");
        assert_eq!(agent.heap().string_ref_count(b), 1);
    }
}
