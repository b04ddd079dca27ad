// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{
        builtins::ordinary::{
            ordinary_define_own_property, ordinary_delete, ordinary_get, ordinary_get_own_property,
            ordinary_get_prototype_of, ordinary_has_property, ordinary_is_extensible,
            ordinary_own_property_keys, ordinary_prevent_extensions, ordinary_set,
        },
        execution::{Agent, JsResult},
        types::PropertyDescriptor,
    },
    heap::indexes::ObjectIndex,
};

use super::{String, Value};

/// A native \[\[Get]] accessor. Receives a borrowed receiver and returns an
/// owned value.
pub type NativeGetter = fn(agent: &mut Agent, receiver: Value) -> JsResult<Value>;

/// A native \[\[Set]] accessor. Receives a borrowed receiver and takes
/// ownership of the assigned value.
pub type NativeSetter = fn(agent: &mut Agent, receiver: Value, value: Value) -> JsResult<()>;

#[derive(Debug, Clone, Copy)]
pub(crate) enum ObjectEntryPropertyDescriptor {
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<NativeGetter>,
        set: Option<NativeSetter>,
        enumerable: bool,
        configurable: bool,
    },
}

impl ObjectEntryPropertyDescriptor {
    pub(crate) fn to_property_descriptor(self) -> PropertyDescriptor {
        match self {
            ObjectEntryPropertyDescriptor::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => PropertyDescriptor {
                value: Some(value),
                writable: Some(writable),
                get: None,
                set: None,
                enumerable: Some(enumerable),
                configurable: Some(configurable),
            },
            ObjectEntryPropertyDescriptor::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => PropertyDescriptor {
                value: None,
                writable: None,
                get: Some(get),
                set: Some(set),
                enumerable: Some(enumerable),
                configurable: Some(configurable),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ObjectEntry {
    pub(crate) key: String,
    pub(crate) value: ObjectEntryPropertyDescriptor,
}

/// Backing storage of an ordinary object.
///
/// The object owns a reference to every key, every data property value and
/// its prototype.
#[derive(Debug, Clone)]
pub struct ObjectHeapData {
    pub(crate) extensible: bool,
    pub(crate) prototype: Option<Object>,
    pub(crate) entries: Vec<ObjectEntry>,
}

impl ObjectHeapData {
    pub(crate) fn new(prototype: Option<Object>) -> Self {
        Self {
            extensible: true,
            prototype,
            entries: Vec::new(),
        }
    }

    pub(crate) fn find(&self, key: String) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }
}

/// ### [6.1.7 The Object Type](https://tc39.es/ecma262/#sec-object-type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Object(pub(crate) ObjectIndex);

impl Object {
    pub(crate) fn get_index(self) -> ObjectIndex {
        self.0
    }

    /// ### [\[\[GetPrototypeOf\]\] ( )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-getprototypeof)
    pub fn internal_get_prototype_of(self, agent: &Agent) -> Option<Object> {
        ordinary_get_prototype_of(agent, self)
    }

    /// ### [\[\[IsExtensible\]\] ( )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-isextensible)
    pub fn internal_is_extensible(self, agent: &Agent) -> bool {
        ordinary_is_extensible(agent, self)
    }

    /// ### [\[\[PreventExtensions\]\] ( )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-preventextensions)
    pub fn internal_prevent_extensions(self, agent: &mut Agent) -> bool {
        ordinary_prevent_extensions(agent, self)
    }

    /// ### [\[\[GetOwnProperty\]\] ( P )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-getownproperty-p)
    ///
    /// The returned descriptor is a view: its value is not an owning
    /// reference.
    pub fn internal_get_own_property(self, agent: &Agent, key: String) -> Option<PropertyDescriptor> {
        ordinary_get_own_property(agent, self, key)
    }

    /// ### [\[\[DefineOwnProperty\]\] ( P, Desc )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-defineownproperty-p-desc)
    ///
    /// Takes ownership of the descriptor's value.
    pub fn internal_define_own_property(
        self,
        agent: &mut Agent,
        key: String,
        descriptor: PropertyDescriptor,
    ) -> bool {
        ordinary_define_own_property(agent, self, key, descriptor)
    }

    /// ### [\[\[HasProperty\]\] ( P )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-hasproperty-p)
    pub fn internal_has_property(self, agent: &Agent, key: String) -> bool {
        ordinary_has_property(agent, self, key)
    }

    /// ### [\[\[Get\]\] ( P, Receiver )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-get-p-receiver)
    pub fn internal_get(self, agent: &mut Agent, key: String, receiver: Value) -> JsResult<Value> {
        ordinary_get(agent, self, key, receiver)
    }

    /// ### [\[\[Set\]\] ( P, V, Receiver )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-set-p-v-receiver)
    ///
    /// Takes ownership of `value`.
    pub fn internal_set(
        self,
        agent: &mut Agent,
        key: String,
        value: Value,
        receiver: Value,
    ) -> JsResult<bool> {
        ordinary_set(agent, self, key, value, receiver)
    }

    /// ### [\[\[Delete\]\] ( P )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-delete-p)
    pub fn internal_delete(self, agent: &mut Agent, key: String) -> bool {
        ordinary_delete(agent, self, key)
    }

    /// ### [\[\[OwnPropertyKeys\]\] ( )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-ownpropertykeys)
    ///
    /// The returned keys are not owning references.
    pub fn internal_own_property_keys(self, agent: &Agent) -> Vec<String> {
        ordinary_own_property_keys(agent, self)
    }
}

impl core::ops::Index<Object> for Agent {
    type Output = ObjectHeapData;

    fn index(&self, index: Object) -> &Self::Output {
        &self.heap.objects[index.get_index()]
    }
}

impl core::ops::IndexMut<Object> for Agent {
    fn index_mut(&mut self, index: Object) -> &mut Self::Output {
        &mut self.heap.objects[index.get_index()]
    }
}
