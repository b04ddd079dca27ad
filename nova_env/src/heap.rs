// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The heap: reference counted arenas for strings, objects and environment
//! records.
//!
//! Every slot carries a reference count. Handles ([`String`], [`Object`],
//! [`Environment`]) are plain indexes; ownership is tracked explicitly with
//! the `copy_*`/`ref_*` and `free_*`/`deref_*` pairs. Releasing the last
//! reference to a slot empties it and releases everything the slot's data
//! held, iteratively so that long chains do not recurse.

pub mod indexes;
mod memory_pressure;
pub(crate) mod subspace;

use core::mem::size_of;

use ahash::AHashMap;

pub use memory_pressure::{
    MemoryPressureCallback, MemoryPressureCallbackId, MemoryPressureSeverity,
};

use self::{
    indexes::{DeclarativeEnvironmentIndex, ObjectEnvironmentIndex, ObjectIndex, StringIndex},
    memory_pressure::{AllocationAccounting, MemoryPressureCallbacks},
    subspace::IsoSubspace,
};
use crate::ecmascript::{
    execution::{
        Binding, BindingValue, DeclarativeEnvironmentRecord, Environment, Environments,
        ObjectEnvironmentRecord, Options,
    },
    types::{
        Object, ObjectEntry, ObjectEntryPropertyDescriptor, ObjectHeapData, String,
        StringHeapData, Value,
    },
};

#[derive(Debug)]
pub struct Heap {
    pub(crate) strings: IsoSubspace<StringHeapData>,
    /// Interning table: every live string appears here exactly once.
    string_lookup: AHashMap<Box<str>, StringIndex>,
    pub(crate) objects: IsoSubspace<ObjectHeapData>,
    pub(crate) environments: Environments,
    accounting: AllocationAccounting,
    memory_pressure_callbacks: MemoryPressureCallbacks,
}

/// A reference whose release is still pending.
#[derive(Debug, Clone, Copy)]
enum PendingRelease {
    String(StringIndex),
    Object(ObjectIndex),
    DeclarativeEnvironment(DeclarativeEnvironmentIndex),
    ObjectEnvironment(ObjectEnvironmentIndex),
}

impl PendingRelease {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(string) => Some(PendingRelease::String(string.get_index())),
            Value::Object(object) => Some(PendingRelease::Object(object.get_index())),
            _ => None,
        }
    }
}

impl From<Environment> for PendingRelease {
    fn from(value: Environment) -> Self {
        match value {
            Environment::Declarative(index) => PendingRelease::DeclarativeEnvironment(index),
            Environment::Object(index) => PendingRelease::ObjectEnvironment(index),
        }
    }
}

impl Heap {
    pub fn new(options: &Options) -> Heap {
        Heap {
            strings: IsoSubspace::with_capacity("strings", 256),
            string_lookup: AHashMap::with_capacity(256),
            objects: IsoSubspace::with_capacity("objects", 64),
            environments: Environments::default(),
            accounting: AllocationAccounting::new(options.heap_desired_limit, options.heap_limit),
            memory_pressure_callbacks: MemoryPressureCallbacks::default(),
        }
    }

    /// Registers a callback that runs whenever an allocation pushes the
    /// accounted heap size past one of the configured limits. Callbacks run
    /// before the allocation is written and in registration order.
    pub fn register_memory_pressure_callback(
        &mut self,
        callback: impl FnMut(MemoryPressureSeverity) + 'static,
    ) -> MemoryPressureCallbackId {
        self.memory_pressure_callbacks.register(Box::new(callback))
    }

    pub fn unregister_memory_pressure_callback(&mut self, id: MemoryPressureCallbackId) -> bool {
        self.memory_pressure_callbacks.unregister(id)
    }

    /// Bytes currently accounted to live heap data.
    pub fn allocated_bytes(&self) -> usize {
        self.accounting.allocated()
    }

    fn account_allocation(&mut self, bytes: usize) {
        let Some(severity) = self.accounting.grow(bytes) else {
            return;
        };
        let allocated = self.accounting.allocated();
        match severity {
            MemoryPressureSeverity::Low => {
                tracing::debug!(allocated, "heap grew past its desired limit")
            }
            MemoryPressureSeverity::High => {
                tracing::warn!(allocated, "heap grew past its limit")
            }
        }
        self.memory_pressure_callbacks.run(severity);
    }

    // Strings

    /// Interns `str` and returns a new owning reference to it.
    pub(crate) fn create_string(&mut self, str: &str) -> String {
        if let Some(&index) = self.string_lookup.get(str) {
            self.strings.retain(index);
            return String(index);
        }
        self.account_allocation(size_of::<StringHeapData>() + str.len());
        let index = self.strings.alloc(StringHeapData::from_str(str));
        self.string_lookup.insert(str.into(), index);
        String(index)
    }

    /// Adds an owning reference to `string`.
    pub fn copy_string(&mut self, string: String) -> String {
        self.strings.retain(string.get_index());
        string
    }

    pub fn free_string(&mut self, string: String) {
        self.release(PendingRelease::String(string.get_index()));
    }

    pub fn string_ref_count(&self, string: String) -> u32 {
        self.strings.ref_count(string.get_index())
    }

    /// Number of live strings.
    pub fn string_count(&self) -> usize {
        self.strings.live()
    }

    // Values

    /// Returns the value with a new owning reference added.
    pub fn copy_value(&mut self, value: Value) -> Value {
        match value {
            Value::String(string) => self.strings.retain(string.get_index()),
            Value::Object(object) => self.objects.retain(object.get_index()),
            _ => debug_assert!(!value.is_heap_value()),
        }
        value
    }

    /// Releases an owning reference to the value.
    pub fn free_value(&mut self, value: Value) {
        if let Some(pending) = PendingRelease::from_value(value) {
            self.release(pending);
        }
    }

    // Objects

    pub(crate) fn create_object(&mut self, data: ObjectHeapData) -> Object {
        self.account_allocation(size_of::<ObjectHeapData>());
        Object(self.objects.alloc(data))
    }

    pub fn ref_object(&mut self, object: Object) {
        self.objects.retain(object.get_index());
    }

    pub fn deref_object(&mut self, object: Object) {
        self.release(PendingRelease::Object(object.get_index()));
    }

    pub fn object_ref_count(&self, object: Object) -> u32 {
        self.objects.ref_count(object.get_index())
    }

    /// Number of live objects.
    pub fn object_count(&self) -> usize {
        self.objects.live()
    }

    /// Appends a property. The object takes a new reference on `key` and
    /// takes over the reference held by a data property value.
    pub(crate) fn push_object_entry(
        &mut self,
        object: Object,
        key: String,
        value: ObjectEntryPropertyDescriptor,
    ) {
        self.account_allocation(size_of::<ObjectEntry>());
        let key = self.copy_string(key);
        self.objects[object.get_index()]
            .entries
            .push(ObjectEntry { key, value });
    }

    pub(crate) fn remove_object_entry(&mut self, object: Object, index: usize) {
        let entry = self.objects[object.get_index()].entries.remove(index);
        self.accounting.shrink(size_of::<ObjectEntry>());
        self.free_string(entry.key);
        if let ObjectEntryPropertyDescriptor::Data { value, .. } = entry.value {
            self.free_value(value);
        }
    }

    // Environments

    pub(crate) fn create_declarative_environment(
        &mut self,
        record: DeclarativeEnvironmentRecord,
    ) -> DeclarativeEnvironmentIndex {
        self.account_allocation(size_of::<DeclarativeEnvironmentRecord>());
        self.environments.declarative.alloc(record)
    }

    pub(crate) fn create_object_environment(
        &mut self,
        record: ObjectEnvironmentRecord,
    ) -> ObjectEnvironmentIndex {
        self.account_allocation(size_of::<ObjectEnvironmentRecord>());
        self.environments.object.alloc(record)
    }

    pub fn ref_environment(&mut self, env: Environment) {
        match env {
            Environment::Declarative(index) => self.environments.declarative.retain(index),
            Environment::Object(index) => self.environments.object.retain(index),
        }
    }

    /// Releases a reference to the record. Destroying the record releases
    /// its bindings, its binding object and its outer record.
    pub fn deref_environment(&mut self, env: Environment) {
        self.release(env.into());
    }

    pub fn environment_ref_count(&self, env: Environment) -> u32 {
        match env {
            Environment::Declarative(index) => self.environments.declarative.ref_count(index),
            Environment::Object(index) => self.environments.object.ref_count(index),
        }
    }

    /// Number of live environment records.
    pub fn environment_count(&self) -> usize {
        self.environments.len()
    }

    pub(crate) fn account_binding_created(&mut self) {
        self.account_allocation(size_of::<Binding>());
    }

    /// Releases the name and value of a binding removed from its record.
    pub(crate) fn release_binding(&mut self, binding: Binding) {
        self.accounting.shrink(size_of::<Binding>());
        self.free_string(binding.name);
        if let BindingValue::Initialized(value) = binding.value {
            self.free_value(value);
        }
    }

    fn release(&mut self, first: PendingRelease) {
        let mut pending = vec![first];
        while let Some(next) = pending.pop() {
            match next {
                PendingRelease::String(index) => {
                    let Some(data) = self.strings.release(index) else {
                        continue;
                    };
                    if let Some(str) = data.as_wtf8().as_str() {
                        self.string_lookup.remove(str);
                    }
                    self.accounting
                        .shrink(size_of::<StringHeapData>() + data.len());
                }
                PendingRelease::Object(index) => {
                    let Some(data) = self.objects.release(index) else {
                        continue;
                    };
                    self.accounting.shrink(
                        size_of::<ObjectHeapData>() + data.entries.len() * size_of::<ObjectEntry>(),
                    );
                    if let Some(prototype) = data.prototype {
                        pending.push(PendingRelease::Object(prototype.get_index()));
                    }
                    for entry in data.entries {
                        pending.push(PendingRelease::String(entry.key.get_index()));
                        if let ObjectEntryPropertyDescriptor::Data { value, .. } = entry.value {
                            pending.extend(PendingRelease::from_value(value));
                        }
                    }
                }
                PendingRelease::DeclarativeEnvironment(index) => {
                    let Some(mut record) = self.environments.declarative.release(index) else {
                        continue;
                    };
                    tracing::trace!(?index, "declarative environment destroyed");
                    let bindings = record.take_bindings();
                    self.accounting.shrink(
                        size_of::<DeclarativeEnvironmentRecord>()
                            + bindings.len() * size_of::<Binding>(),
                    );
                    if let Some(outer_env) = record.outer_env() {
                        pending.push(outer_env.into());
                    }
                    for binding in bindings {
                        pending.push(PendingRelease::String(binding.name.get_index()));
                        if let BindingValue::Initialized(value) = binding.value {
                            pending.extend(PendingRelease::from_value(value));
                        }
                    }
                }
                PendingRelease::ObjectEnvironment(index) => {
                    let Some(record) = self.environments.object.release(index) else {
                        continue;
                    };
                    tracing::trace!(?index, "object environment destroyed");
                    self.accounting.shrink(size_of::<ObjectEnvironmentRecord>());
                    if let Some(outer_env) = record.outer_env() {
                        pending.push(outer_env.into());
                    }
                    pending.push(PendingRelease::Object(record.binding_object().get_index()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::create_data_property,
        builtins::ordinary::ordinary_object_create,
        execution::{Agent, new_declarative_environment, new_object_environment},
    };

    #[test]
    fn destroying_a_chain_releases_everything() {
        let mut agent = Agent::new(Options::default());
        let global = ordinary_object_create(&mut agent, None);
        let outer = new_object_environment(&mut agent, global, false, None);
        agent.heap_mut().deref_object(global);
        let mut env = outer;
        for _ in 0..1000 {
            let inner = new_declarative_environment(&mut agent, Some(env));
            agent.heap_mut().deref_environment(env);
            env = inner;
        }
        let name = String::from_str(&mut agent, "deep");
        let value = String::from_str(&mut agent, "value");
        env.create_mutable_binding(&mut agent, name, true).unwrap();
        env.set_mutable_binding(&mut agent, name, value.into(), true)
            .unwrap();
        agent.heap_mut().free_string(name);
        assert_eq!(agent.heap().environment_count(), 1001);

        agent.heap_mut().deref_environment(env);
        assert_eq!(agent.heap().environment_count(), 0);
        assert_eq!(agent.heap().object_count(), 0);
        assert_eq!(agent.heap().string_count(), 0);
        assert_eq!(agent.heap().allocated_bytes(), 0);
    }

    #[test]
    fn objects_release_keys_values_and_prototype() {
        let mut agent = Agent::new(Options::default());
        let proto = ordinary_object_create(&mut agent, None);
        let object = ordinary_object_create(&mut agent, Some(proto));
        agent.heap_mut().deref_object(proto);
        let key = String::from_str(&mut agent, "key");
        let value = String::from_str(&mut agent, "value");
        assert!(create_data_property(&mut agent, object, key, value.into()));
        agent.heap_mut().free_string(key);
        assert_eq!(agent.heap().string_count(), 2);
        agent.heap_mut().deref_object(object);
        assert_eq!(agent.heap().object_count(), 0);
        assert_eq!(agent.heap().string_count(), 0);
    }

    #[test]
    fn memory_pressure_callbacks_fire_at_limits() {
        let options = Options {
            heap_desired_limit: 64,
            heap_limit: 256,
        };
        let mut agent = Agent::new(options);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let id = {
            let seen = seen.clone();
            agent
                .heap_mut()
                .register_memory_pressure_callback(move |severity| seen.borrow_mut().push(severity))
        };
        let text = "x".repeat(100);
        let big = String::from_str(&mut agent, &text);
        assert_eq!(*seen.borrow(), vec![MemoryPressureSeverity::Low]);
        let bigger = String::from_str(&mut agent, &text.repeat(2));
        assert_eq!(
            *seen.borrow(),
            vec![MemoryPressureSeverity::Low, MemoryPressureSeverity::High]
        );
        agent.heap_mut().free_string(big);
        agent.heap_mut().free_string(bigger);
        assert!(agent.heap_mut().unregister_memory_pressure_callback(id));
        let _ = String::from_str(&mut agent, &text);
        assert_eq!(seen.borrow().len(), 2);
    }
}
