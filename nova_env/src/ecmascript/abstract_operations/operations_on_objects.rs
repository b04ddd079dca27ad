// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [7.3 Operations on Objects](https://tc39.es/ecma262/#sec-operations-on-objects)

use crate::ecmascript::{
    execution::{Agent, JsError, JsResult, agent::ExceptionType},
    types::{NativeGetter, NativeSetter, Object, PropertyDescriptor, String, Value},
};

/// ### [7.3.2 Get ( O, P )](https://tc39.es/ecma262/#sec-get-o-p)
///
/// The abstract operation Get takes arguments O (an Object) and P (a property
/// key) and returns either a normal completion containing an ECMAScript
/// language value or a throw completion. It is used to retrieve the value of a
/// specific property of an object.
///
/// The returned value is a new owning reference.
pub fn get(agent: &mut Agent, o: Object, p: String) -> JsResult<Value> {
    // 1. Return ? O.[[Get]](P, O).
    o.internal_get(agent, p, o.into())
}

/// ### [7.3.4 Set ( O, P, V, Throw )](https://tc39.es/ecma262/#sec-set-o-p-v-throw)
///
/// The abstract operation Set takes arguments O (an Object), P (a property
/// key), V (an ECMAScript language value), and Throw (a Boolean) and returns
/// either a normal completion containing UNUSED or a throw completion. It is
/// used to set the value of a specific property of an object. V is the new
/// value for the property.
///
/// Takes ownership of `v`.
pub fn set(agent: &mut Agent, o: Object, p: String, v: Value, throw: bool) -> JsResult<()> {
    // 1. Let success be ? O.[[Set]](P, V, O).
    let success = o.internal_set(agent, p, v, o.into())?;
    // 2. If success is false and Throw is true, throw a TypeError exception.
    if !success && throw {
        return Err(throw_set_error(agent, p));
    }
    // 3. Return UNUSED.
    Ok(())
}

pub(crate) fn throw_set_error(agent: &mut Agent, p: String) -> JsError {
    let message = format!("Could not set property '{}'.", p.to_string_lossy(agent));
    agent.throw_exception(ExceptionType::TypeError, message)
}

/// ### [7.3.5 CreateDataProperty ( O, P, V )](https://tc39.es/ecma262/#sec-createdataproperty)
///
/// The abstract operation CreateDataProperty takes arguments O (an Object), P
/// (a property key), and V (an ECMAScript language value) and returns either a
/// normal completion containing a Boolean or a throw completion. It is used to
/// create a new own property of an object.
///
/// > NOTE: This abstract operation creates a property whose attributes are set
/// > to the same defaults used for properties created by the ECMAScript language
/// > assignment operator. Normally, the property will not already exist. If it
/// > does exist and is not configurable or if O is not extensible,
/// > [\[DefineOwnProperty]] will return false.
pub fn create_data_property(
    agent: &mut Agent,
    object: Object,
    property_key: String,
    value: Value,
) -> bool {
    // 1. Let newDesc be the PropertyDescriptor { [[Value]]: V, [[Writable]]: true, [[Enumerable]]: true, [[Configurable]]: true }.
    let new_desc = PropertyDescriptor::new_data_descriptor(value);
    // 2. Return ? O.[[DefineOwnProperty]](P, newDesc).
    object.internal_define_own_property(agent, property_key, new_desc)
}

/// ### [7.3.8 DefinePropertyOrThrow ( O, P, desc )](https://tc39.es/ecma262/#sec-definepropertyorthrow)
///
/// The abstract operation DefinePropertyOrThrow takes arguments O (an Object),
/// P (a property key), and desc (a Property Descriptor) and returns either a
/// normal completion containing UNUSED or a throw completion. It is used to
/// call the \[\[DefineOwnProperty]] internal method of an object in a manner
/// that will throw a TypeError exception if the requested property update
/// cannot be performed.
pub fn define_property_or_throw(
    agent: &mut Agent,
    object: Object,
    property_key: String,
    desc: PropertyDescriptor,
) -> JsResult<()> {
    // 1. Let success be ? O.[[DefineOwnProperty]](P, desc).
    let success = object.internal_define_own_property(agent, property_key, desc);
    // 2. If success is false, throw a TypeError exception.
    if !success {
        let message = format!(
            "Cannot define property '{}'.",
            property_key.to_string_lossy(agent)
        );
        Err(agent.throw_exception(ExceptionType::TypeError, message))
    } else {
        // 3. Return UNUSED.
        Ok(())
    }
}

/// Defines an enumerable accessor property backed by native functions.
pub fn define_accessor_property(
    agent: &mut Agent,
    object: Object,
    property_key: String,
    get: Option<NativeGetter>,
    set: Option<NativeSetter>,
    configurable: bool,
) -> JsResult<()> {
    let desc = PropertyDescriptor::new_accessor_descriptor(get, set, configurable);
    define_property_or_throw(agent, object, property_key, desc)
}

/// ### [7.3.9 DeletePropertyOrThrow ( O, P )](https://tc39.es/ecma262/#sec-deletepropertyorthrow)
///
/// The abstract operation DeletePropertyOrThrow takes arguments O (an Object)
/// and P (a property key) and returns either a normal completion containing
/// unused or a throw completion. It is used to remove a specific own property
/// of an object. It throws an exception if the property is not configurable.
pub fn delete_property_or_throw(agent: &mut Agent, o: Object, p: String) -> JsResult<()> {
    // 1. Let success be ? O.[[Delete]](P).
    // 2. If success is false, throw a TypeError exception.
    // 3. Return unused.
    delete(agent, o, p, true).map(|_| ())
}

/// Calls \[\[Delete]] and optionally throws a TypeError when the property
/// could not be removed.
pub fn delete(agent: &mut Agent, o: Object, p: String, throw: bool) -> JsResult<bool> {
    let success = o.internal_delete(agent, p);
    if !success && throw {
        let message = format!("Cannot delete property '{}'.", p.to_string_lossy(agent));
        return Err(agent.throw_exception(ExceptionType::TypeError, message));
    }
    Ok(success)
}

/// ### [7.3.12 HasProperty ( O, P )](https://tc39.es/ecma262/#sec-hasproperty)
///
/// The abstract operation HasProperty takes arguments O (an Object) and P (a
/// property key) and returns either a normal completion containing a Boolean
/// or a throw completion. It is used to determine whether an object has a
/// property with the specified property key. The property may be either own
/// or inherited.
pub fn has_property(agent: &Agent, o: Object, p: String) -> bool {
    // 1. Return ? O.[[HasProperty]](P).
    o.internal_has_property(agent, p)
}

/// ### [7.3.13 HasOwnProperty ( O, P )](https://tc39.es/ecma262/#sec-hasownproperty)
pub fn has_own_property(agent: &Agent, o: Object, p: String) -> bool {
    // 1. Let desc be ? O.[[GetOwnProperty]](P).
    // 2. If desc is undefined, return false.
    // 3. Return true.
    o.internal_get_own_property(agent, p).is_some()
}

/// ### [7.3.15 SetIntegrityLevel ( O, level )](https://tc39.es/ecma262/#sec-setintegritylevel)
///
/// Only the \[\[PreventExtensions]] step is provided.
pub fn prevent_extensions(agent: &mut Agent, o: Object) -> bool {
    o.internal_prevent_extensions(agent)
}
