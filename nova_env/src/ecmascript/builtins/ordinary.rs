// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.1 Ordinary Object Internal Methods and Internal Slots](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots)
//!
//! Property values stored in an object are owning references. Values passed
//! in through \[\[DefineOwnProperty]] and \[\[Set]] are consumed: either
//! stored or released. Values returned from \[\[Get]] are new references.

use crate::ecmascript::{
    abstract_operations::{
        operations_on_objects::create_data_property, testing_and_comparison::same_value,
    },
    execution::{Agent, JsResult},
    types::{
        NativeGetter, NativeSetter, Object, ObjectEntryPropertyDescriptor, ObjectHeapData,
        PropertyDescriptor, String, Value,
    },
};

/// ### [10.1.12 OrdinaryObjectCreate ( proto \[ , additionalInternalSlotsList \] )](https://tc39.es/ecma262/#sec-ordinaryobjectcreate)
///
/// Returns the single owning reference to the new object. The object takes
/// its own reference on `proto`.
pub fn ordinary_object_create(agent: &mut Agent, proto: Option<Object>) -> Object {
    if let Some(proto) = proto {
        agent.heap.ref_object(proto);
    }
    // 1. Let internalSlotsList be « [[Prototype]], [[Extensible]] ».
    // 3. Let O be MakeBasicObject(internalSlotsList).
    // 4. Set O.[[Prototype]] to proto.
    // 5. Return O.
    agent.heap.create_object(ObjectHeapData::new(proto))
}

/// ### [10.1.1.1 OrdinaryGetPrototypeOf ( O )](https://tc39.es/ecma262/#sec-ordinarygetprototypeof)
pub(crate) fn ordinary_get_prototype_of(agent: &Agent, object: Object) -> Option<Object> {
    // 1. Return O.[[Prototype]].
    agent[object].prototype
}

/// ### [10.1.3.1 OrdinaryIsExtensible ( O )](https://tc39.es/ecma262/#sec-ordinaryisextensible)
pub(crate) fn ordinary_is_extensible(agent: &Agent, object: Object) -> bool {
    // 1. Return O.[[Extensible]].
    agent[object].extensible
}

/// ### [10.1.4.1 OrdinaryPreventExtensions ( O )](https://tc39.es/ecma262/#sec-ordinarypreventextensions)
pub(crate) fn ordinary_prevent_extensions(agent: &mut Agent, object: Object) -> bool {
    // 1. Set O.[[Extensible]] to false.
    agent[object].extensible = false;
    // 2. Return true.
    true
}

/// ### [10.1.5.1 OrdinaryGetOwnProperty ( O, P )](https://tc39.es/ecma262/#sec-ordinarygetownproperty)
pub(crate) fn ordinary_get_own_property(
    agent: &Agent,
    object: Object,
    property_key: String,
) -> Option<PropertyDescriptor> {
    let data = &agent[object];
    // 1. If O does not have an own property with key P, return undefined.
    let index = data.find(property_key)?;
    // 2. Let D be a newly created Property Descriptor with no fields.
    // 3. Let X be O's own property whose key is P.
    // 4-8. Set the fields of D from X.
    // 9. Return D.
    Some(data.entries[index].value.to_property_descriptor())
}

/// ### [10.1.6.1 OrdinaryDefineOwnProperty ( O, P, Desc )](https://tc39.es/ecma262/#sec-ordinarydefineownproperty)
pub(crate) fn ordinary_define_own_property(
    agent: &mut Agent,
    object: Object,
    property_key: String,
    descriptor: PropertyDescriptor,
) -> bool {
    // 1. Let current be ? O.[[GetOwnProperty]](P).
    let current = ordinary_get_own_property(agent, object, property_key);

    // 2. Let extensible be ? IsExtensible(O).
    let extensible = ordinary_is_extensible(agent, object);

    // 3. Return ValidateAndApplyPropertyDescriptor(O, P, extensible, Desc, current).
    validate_and_apply_property_descriptor(
        agent,
        object,
        property_key,
        extensible,
        descriptor,
        current,
    )
}

/// ### [10.1.6.3 ValidateAndApplyPropertyDescriptor ( O, P, extensible, Desc, current )](https://tc39.es/ecma262/#sec-validateandapplypropertydescriptor)
fn validate_and_apply_property_descriptor(
    agent: &mut Agent,
    object: Object,
    property_key: String,
    extensible: bool,
    descriptor: PropertyDescriptor,
    current: Option<PropertyDescriptor>,
) -> bool {
    debug_assert!(!(descriptor.is_accessor_descriptor() && descriptor.is_data_descriptor()));

    // 2. If current is undefined, then
    let Some(current) = current else {
        // a. If extensible is false, return false.
        if !extensible {
            if let Some(value) = descriptor.value {
                agent.heap.free_value(value);
            }
            return false;
        }

        // c. If IsAccessorDescriptor(Desc) is true, then
        let entry = if descriptor.is_accessor_descriptor() {
            // i. Create an own accessor property named P of object O whose
            //    [[Get]], [[Set]], [[Enumerable]], and [[Configurable]]
            //    attributes are set to the value of the corresponding field
            //    in Desc if Desc has that field, or to the attribute's default
            //    value otherwise.
            ObjectEntryPropertyDescriptor::Accessor {
                get: descriptor.get.flatten(),
                set: descriptor.set.flatten(),
                enumerable: descriptor.enumerable.unwrap_or(false),
                configurable: descriptor.configurable.unwrap_or(false),
            }
        } else {
            // d. Else,
            // i. Create an own data property named P of object O whose
            //    [[Value]], [[Writable]], [[Enumerable]], and [[Configurable]]
            //    attributes are set to the value of the corresponding field
            //    in Desc if Desc has that field, or to the attribute's default
            //    value otherwise.
            ObjectEntryPropertyDescriptor::Data {
                value: descriptor.value.unwrap_or(Value::Undefined),
                writable: descriptor.writable.unwrap_or(false),
                enumerable: descriptor.enumerable.unwrap_or(false),
                configurable: descriptor.configurable.unwrap_or(false),
            }
        };
        agent.heap.push_object_entry(object, property_key, entry);

        // e. Return true.
        return true;
    };

    // 3. Assert: current is a fully populated Property Descriptor.
    debug_assert!(current.configurable.is_some() && current.enumerable.is_some());

    // 5. If current.[[Configurable]] is false, then
    if !is_compatible_change(&descriptor, &current) {
        if let Some(value) = descriptor.value {
            agent.heap.free_value(value);
        }
        return false;
    }

    // 6. If O is not undefined, then
    let Some(index) = agent[object].find(property_key) else {
        unreachable!("own property disappeared during [[DefineOwnProperty]]");
    };
    let previous = agent[object].entries[index].value;
    let (next, released) = match previous {
        // a. If IsDataDescriptor(current) is true and IsAccessorDescriptor(Desc)
        //    is true, then
        ObjectEntryPropertyDescriptor::Data {
            value,
            enumerable,
            configurable,
            ..
        } if descriptor.is_accessor_descriptor() => (
            ObjectEntryPropertyDescriptor::Accessor {
                get: descriptor.get.flatten(),
                set: descriptor.set.flatten(),
                enumerable: descriptor.enumerable.unwrap_or(enumerable),
                configurable: descriptor.configurable.unwrap_or(configurable),
            },
            Some(value),
        ),
        // b. Else if IsAccessorDescriptor(current) is true and
        //    IsDataDescriptor(Desc) is true, then
        ObjectEntryPropertyDescriptor::Accessor {
            enumerable,
            configurable,
            ..
        } if descriptor.is_data_descriptor() => (
            ObjectEntryPropertyDescriptor::Data {
                value: descriptor.value.unwrap_or(Value::Undefined),
                writable: descriptor.writable.unwrap_or(false),
                enumerable: descriptor.enumerable.unwrap_or(enumerable),
                configurable: descriptor.configurable.unwrap_or(configurable),
            },
            None,
        ),
        // c. Else,
        // i. For each field of Desc, set the corresponding attribute of the
        //    property named P of object O to the value of the field.
        ObjectEntryPropertyDescriptor::Data {
            value,
            writable,
            enumerable,
            configurable,
        } => (
            ObjectEntryPropertyDescriptor::Data {
                value: descriptor.value.unwrap_or(value),
                writable: descriptor.writable.unwrap_or(writable),
                enumerable: descriptor.enumerable.unwrap_or(enumerable),
                configurable: descriptor.configurable.unwrap_or(configurable),
            },
            descriptor.value.map(|_| value),
        ),
        ObjectEntryPropertyDescriptor::Accessor {
            get,
            set,
            enumerable,
            configurable,
        } => (
            ObjectEntryPropertyDescriptor::Accessor {
                get: descriptor.get.unwrap_or(get),
                set: descriptor.set.unwrap_or(set),
                enumerable: descriptor.enumerable.unwrap_or(enumerable),
                configurable: descriptor.configurable.unwrap_or(configurable),
            },
            None,
        ),
    };
    agent[object].entries[index].value = next;
    if let Some(released) = released {
        agent.heap.free_value(released);
    }

    // 7. Return true.
    true
}

/// Steps 4 and 5 of ValidateAndApplyPropertyDescriptor.
fn is_compatible_change(descriptor: &PropertyDescriptor, current: &PropertyDescriptor) -> bool {
    // 5. If current.[[Configurable]] is false, then
    if current.configurable != Some(false) {
        return true;
    }
    // a. If Desc has a [[Configurable]] field and Desc.[[Configurable]] is
    //    true, return false.
    if descriptor.configurable == Some(true) {
        return false;
    }
    // b. If Desc has an [[Enumerable]] field and Desc.[[Enumerable]] is not
    //    current.[[Enumerable]], return false.
    if descriptor.enumerable.is_some() && descriptor.enumerable != current.enumerable {
        return false;
    }
    // c. If IsGenericDescriptor(Desc) is false and IsAccessorDescriptor(Desc)
    //    is not IsAccessorDescriptor(current), return false.
    if !descriptor.is_generic_descriptor()
        && descriptor.is_accessor_descriptor() != current.is_accessor_descriptor()
    {
        return false;
    }
    // d. If IsAccessorDescriptor(current) is true, then
    if current.is_accessor_descriptor() {
        // i. If Desc has a [[Get]] field and SameValue(Desc.[[Get]],
        //    current.[[Get]]) is false, return false.
        if let Some(get) = descriptor.get
            && !same_getter(get, current.get.flatten())
        {
            return false;
        }
        // ii. If Desc has a [[Set]] field and SameValue(Desc.[[Set]],
        //     current.[[Set]]) is false, return false.
        if let Some(set) = descriptor.set
            && !same_setter(set, current.set.flatten())
        {
            return false;
        }
    }
    // e. Else if current.[[Writable]] is false, then
    else if current.writable == Some(false) {
        // i. If Desc has a [[Writable]] field and Desc.[[Writable]] is true,
        //    return false.
        if descriptor.writable == Some(true) {
            return false;
        }
        // ii. If Desc has a [[Value]] field and SameValue(Desc.[[Value]],
        //     current.[[Value]]) is false, return false.
        if let Some(value) = descriptor.value
            && !same_value(value, current.value.unwrap_or_default())
        {
            return false;
        }
    }
    true
}

fn same_getter(a: Option<NativeGetter>, b: Option<NativeGetter>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => core::ptr::fn_addr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn same_setter(a: Option<NativeSetter>, b: Option<NativeSetter>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => core::ptr::fn_addr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// ### [10.1.7.1 OrdinaryHasProperty ( O, P )](https://tc39.es/ecma262/#sec-ordinaryhasproperty)
pub(crate) fn ordinary_has_property(agent: &Agent, object: Object, property_key: String) -> bool {
    let mut object = object;
    loop {
        // 1. Let hasOwn be ? O.[[GetOwnProperty]](P).
        // 2. If hasOwn is not undefined, return true.
        if agent[object].find(property_key).is_some() {
            return true;
        }
        // 3. Let parent be ? O.[[GetPrototypeOf]]().
        // 4. If parent is not null, then
        //    a. Return ? parent.[[HasProperty]](P).
        // 5. Return false.
        match ordinary_get_prototype_of(agent, object) {
            Some(parent) => object = parent,
            None => return false,
        }
    }
}

/// ### [10.1.8.1 OrdinaryGet ( O, P, Receiver )](https://tc39.es/ecma262/#sec-ordinaryget)
pub(crate) fn ordinary_get(
    agent: &mut Agent,
    object: Object,
    property_key: String,
    receiver: Value,
) -> JsResult<Value> {
    // 1. Let desc be ? O.[[GetOwnProperty]](P).
    let Some(descriptor) = ordinary_get_own_property(agent, object, property_key) else {
        // 2. If desc is undefined, then
        // a. Let parent be ? O.[[GetPrototypeOf]]().
        // b. If parent is null, return undefined.
        let Some(parent) = ordinary_get_prototype_of(agent, object) else {
            return Ok(Value::Undefined);
        };
        // c. Return ? parent.[[Get]](P, Receiver).
        return parent.internal_get(agent, property_key, receiver);
    };

    // 3. If IsDataDescriptor(desc) is true, return desc.[[Value]].
    if let Some(value) = descriptor.value {
        return Ok(agent.heap.copy_value(value));
    }

    // 4. Assert: IsAccessorDescriptor(desc) is true.
    debug_assert!(descriptor.is_accessor_descriptor());

    // 5. Let getter be desc.[[Get]].
    // 6. If getter is undefined, return undefined.
    let Some(Some(getter)) = descriptor.get else {
        return Ok(Value::Undefined);
    };

    // 7. Return ? Call(getter, Receiver).
    getter(agent, receiver)
}

/// ### [10.1.9.1 OrdinarySet ( O, P, V, Receiver )](https://tc39.es/ecma262/#sec-ordinaryset)
pub(crate) fn ordinary_set(
    agent: &mut Agent,
    object: Object,
    property_key: String,
    value: Value,
    receiver: Value,
) -> JsResult<bool> {
    // 1. Let ownDesc be ? O.[[GetOwnProperty]](P).
    let own_descriptor = ordinary_get_own_property(agent, object, property_key);

    // 2. Return ? OrdinarySetWithOwnDescriptor(O, P, V, Receiver, ownDesc).
    ordinary_set_with_own_descriptor(agent, object, property_key, value, receiver, own_descriptor)
}

/// ### [10.1.9.2 OrdinarySetWithOwnDescriptor ( O, P, V, Receiver, ownDesc )](https://tc39.es/ecma262/#sec-ordinarysetwithowndescriptor)
fn ordinary_set_with_own_descriptor(
    agent: &mut Agent,
    object: Object,
    property_key: String,
    value: Value,
    receiver: Value,
    own_descriptor: Option<PropertyDescriptor>,
) -> JsResult<bool> {
    let own_descriptor = if let Some(own_descriptor) = own_descriptor {
        own_descriptor
    } else {
        // 1. If ownDesc is undefined, then
        // a. Let parent be ? O.[[GetPrototypeOf]]().
        // b. If parent is not null, then
        if let Some(parent) = ordinary_get_prototype_of(agent, object) {
            // i. Return ? parent.[[Set]](P, V, Receiver).
            return parent.internal_set(agent, property_key, value, receiver);
        }
        // c. Else,
        // i. Set ownDesc to the PropertyDescriptor { [[Value]]: undefined,
        //    [[Writable]]: true, [[Enumerable]]: true, [[Configurable]]: true }.
        PropertyDescriptor::new_data_descriptor(Value::Undefined)
    };

    // 2. If IsDataDescriptor(ownDesc) is true, then
    if own_descriptor.is_data_descriptor() {
        // a. If ownDesc.[[Writable]] is false, return false.
        if own_descriptor.writable == Some(false) {
            agent.heap.free_value(value);
            return Ok(false);
        }

        // b. If Receiver is not an Object, return false.
        let Ok(receiver) = Object::try_from(receiver) else {
            agent.heap.free_value(value);
            return Ok(false);
        };

        // c. Let existingDescriptor be ? Receiver.[[GetOwnProperty]](P).
        // d. If existingDescriptor is not undefined, then
        if let Some(existing_descriptor) = receiver.internal_get_own_property(agent, property_key) {
            // i. If IsAccessorDescriptor(existingDescriptor) is true, return false.
            // ii. If existingDescriptor.[[Writable]] is false, return false.
            if existing_descriptor.is_accessor_descriptor()
                || existing_descriptor.writable == Some(false)
            {
                agent.heap.free_value(value);
                return Ok(false);
            }

            // iii. Let valueDesc be the PropertyDescriptor { [[Value]]: V }.
            let value_descriptor = PropertyDescriptor {
                value: Some(value),
                ..Default::default()
            };

            // iv. Return ? Receiver.[[DefineOwnProperty]](P, valueDesc).
            return Ok(receiver.internal_define_own_property(agent, property_key, value_descriptor));
        }

        // e. Else,
        // i. Assert: Receiver does not currently have a property P.
        // ii. Return ? CreateDataProperty(Receiver, P, V).
        return Ok(create_data_property(agent, receiver, property_key, value));
    }

    // 3. Assert: IsAccessorDescriptor(ownDesc) is true.
    debug_assert!(own_descriptor.is_accessor_descriptor());

    // 4. Let setter be ownDesc.[[Set]].
    // 5. If setter is undefined, return false.
    let Some(Some(setter)) = own_descriptor.set else {
        agent.heap.free_value(value);
        return Ok(false);
    };

    // 6. Perform ? Call(setter, Receiver, « V »).
    setter(agent, receiver, value)?;

    // 7. Return true.
    Ok(true)
}

/// ### [10.1.10.1 OrdinaryDelete ( O, P )](https://tc39.es/ecma262/#sec-ordinarydelete)
pub(crate) fn ordinary_delete(agent: &mut Agent, object: Object, property_key: String) -> bool {
    // 1. Let desc be ? O.[[GetOwnProperty]](P).
    // 2. If desc is undefined, return true.
    let Some(index) = agent[object].find(property_key) else {
        return true;
    };

    // 3. If desc.[[Configurable]] is true, then
    let configurable = match agent[object].entries[index].value {
        ObjectEntryPropertyDescriptor::Data { configurable, .. }
        | ObjectEntryPropertyDescriptor::Accessor { configurable, .. } => configurable,
    };
    if configurable {
        // a. Remove the own property with name P from O.
        agent.heap.remove_object_entry(object, index);
        // b. Return true.
        return true;
    }

    // 4. Return false.
    false
}

/// ### [10.1.11.1 OrdinaryOwnPropertyKeys ( O )](https://tc39.es/ecma262/#sec-ordinaryownpropertykeys)
pub(crate) fn ordinary_own_property_keys(agent: &Agent, object: Object) -> Vec<String> {
    // 1. Let keys be a new empty List.
    // 3. For each own property key P of O such that P is a String and P is
    //    not an array index, in ascending chronological order of property
    //    creation, do
    //    a. Append P to keys.
    // 5. Return keys.
    agent[object].entries.iter().map(|entry| entry.key).collect()
}
