// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod common;

use nova_env::ecmascript::{
    abstract_operations::operations_on_objects::{
        create_data_property, define_accessor_property, define_property_or_throw, get,
        has_own_property, prevent_extensions,
    },
    builtins::ordinary::ordinary_object_create,
    execution::{
        Agent, EnvironmentKind, ExceptionType, JsResult, get_identifier_reference,
        new_declarative_environment, new_object_environment,
    },
    types::{PropertyDescriptor, Value},
};
use pretty_assertions::assert_eq;

use common::{new_agent, string, string_value};

fn reject_assignment(agent: &mut Agent, _receiver: Value, value: Value) -> JsResult<()> {
    agent.heap_mut().free_value(value);
    Err(agent.throw_exception_with_static_message(ExceptionType::RangeError, "setter rejected"))
}

fn failing_getter(agent: &mut Agent, _receiver: Value) -> JsResult<Value> {
    Err(agent.throw_exception_with_static_message(ExceptionType::TypeError, "getter failed"))
}

fn always_seven(_agent: &mut Agent, _receiver: Value) -> JsResult<Value> {
    Ok(Value::Number(7.0))
}

#[test]
fn bindings_are_properties_of_the_binding_object() {
    let mut agent = new_agent();
    let object = ordinary_object_create(&mut agent, None);
    let env = new_object_environment(&mut agent, object, false, None);
    let name = string(&mut agent, "answer");

    assert!(!env.has_binding(&agent, name));
    env.create_mutable_binding(&mut agent, name, true).unwrap();
    assert!(env.has_binding(&agent, name));
    assert!(has_own_property(&agent, object, name));
    assert_eq!(
        env.get_binding_value(&mut agent, name, true).unwrap(),
        Value::Undefined
    );

    env.set_mutable_binding(&mut agent, name, Value::Number(42.0), true)
        .unwrap();
    assert_eq!(get(&mut agent, object, name).unwrap(), Value::Number(42.0));

    let descriptor = object
        .internal_get_own_property(&agent, name)
        .expect("binding property exists");
    assert_eq!(descriptor.writable, Some(true));
    assert_eq!(descriptor.enumerable, Some(true));
    assert_eq!(descriptor.configurable, Some(true));
    agent.heap_mut().deref_environment(env);
    agent.heap_mut().deref_object(object);
}

#[test]
fn inherited_properties_are_bindings() {
    let mut agent = new_agent();
    let proto = ordinary_object_create(&mut agent, None);
    let object = ordinary_object_create(&mut agent, Some(proto));
    let name = string(&mut agent, "inherited");
    assert!(create_data_property(&mut agent, proto, name, Value::Boolean(true)));

    let env = new_object_environment(&mut agent, object, false, None);
    assert!(env.has_binding(&agent, name));
    assert_eq!(
        env.get_binding_value(&mut agent, name, true).unwrap(),
        Value::Boolean(true)
    );
    agent.heap_mut().deref_environment(env);
    agent.heap_mut().deref_object(object);
    agent.heap_mut().deref_object(proto);
    assert_eq!(agent.heap().object_count(), 0);
}

#[test]
fn unbound_name_is_undefined_unless_strict() {
    let mut agent = new_agent();
    let object = ordinary_object_create(&mut agent, None);
    let env = new_object_environment(&mut agent, object, false, None);
    let name = string(&mut agent, "missing");

    assert_eq!(
        env.get_binding_value(&mut agent, name, false).unwrap(),
        Value::Undefined
    );
    let error = env.get_binding_value(&mut agent, name, true).unwrap_err();
    assert_eq!(error.kind(), ExceptionType::ReferenceError);
    assert_eq!(error.message(), "Binding 'missing' does not exist.");
    agent.heap_mut().deref_environment(env);
    agent.heap_mut().deref_object(object);
}

#[test]
fn non_configurable_property_survives_delete() {
    let mut agent = new_agent();
    let object = ordinary_object_create(&mut agent, None);
    let env = new_object_environment(&mut agent, object, false, None);
    let name = string(&mut agent, "pinned");
    env.create_mutable_binding(&mut agent, name, false).unwrap();
    env.set_mutable_binding(&mut agent, name, Value::Number(1.0), true)
        .unwrap();

    assert!(!env.delete_binding(&mut agent, name));
    assert!(env.has_binding(&agent, name));
    assert_eq!(
        env.get_binding_value(&mut agent, name, true).unwrap(),
        Value::Number(1.0)
    );

    let loose = string(&mut agent, "loose");
    env.create_mutable_binding(&mut agent, loose, true).unwrap();
    assert!(env.delete_binding(&mut agent, loose));
    assert!(!env.has_binding(&agent, loose));
    agent.heap_mut().deref_environment(env);
    agent.heap_mut().deref_object(object);
}

#[test]
fn creating_a_binding_on_a_sealed_object_throws() {
    let mut agent = new_agent();
    let object = ordinary_object_create(&mut agent, None);
    assert!(prevent_extensions(&mut agent, object));
    let env = new_object_environment(&mut agent, object, false, None);
    let name = string(&mut agent, "late");
    let error = env
        .create_mutable_binding(&mut agent, name, true)
        .unwrap_err();
    assert_eq!(error.kind(), ExceptionType::TypeError);
    assert!(!env.has_binding(&agent, name));
    agent.heap_mut().deref_environment(env);
    agent.heap_mut().deref_object(object);
}

#[test]
fn writing_a_read_only_property_depends_on_strictness() {
    let mut agent = new_agent();
    let object = ordinary_object_create(&mut agent, None);
    let name = string(&mut agent, "readonly");
    define_property_or_throw(
        &mut agent,
        object,
        name,
        PropertyDescriptor {
            value: Some(Value::Number(1.0)),
            writable: Some(false),
            enumerable: Some(true),
            configurable: Some(false),
            ..Default::default()
        },
    )
    .unwrap();
    let env = new_object_environment(&mut agent, object, false, None);

    env.set_mutable_binding(&mut agent, name, Value::Number(2.0), false)
        .unwrap();
    let value = string_value(&mut agent, "rejected");
    let error = env
        .set_mutable_binding(&mut agent, name, value, true)
        .unwrap_err();
    assert_eq!(error.kind(), ExceptionType::TypeError);
    assert_eq!(
        env.get_binding_value(&mut agent, name, true).unwrap(),
        Value::Number(1.0)
    );
    let Value::String(value) = value else {
        unreachable!()
    };
    assert_eq!(agent.heap().string_ref_count(value), 0);
    agent.heap_mut().deref_environment(env);
    agent.heap_mut().deref_object(object);
}

#[test]
fn setter_errors_propagate_through_set_mutable_binding() {
    let mut agent = new_agent();
    let object = ordinary_object_create(&mut agent, None);
    let name = string(&mut agent, "guarded");
    define_accessor_property(
        &mut agent,
        object,
        name,
        Some(always_seven),
        Some(reject_assignment),
        true,
    )
    .unwrap();
    let env = new_object_environment(&mut agent, object, false, None);

    for strict in [false, true] {
        let error = env
            .set_mutable_binding(&mut agent, name, Value::Number(1.0), strict)
            .unwrap_err();
        assert_eq!(error.kind(), ExceptionType::RangeError);
        assert_eq!(error.message(), "setter rejected");
    }
    assert_eq!(
        env.get_binding_value(&mut agent, name, true).unwrap(),
        Value::Number(7.0)
    );
    agent.heap_mut().deref_environment(env);
    agent.heap_mut().deref_object(object);
}

#[test]
fn getter_errors_propagate_through_get_binding_value() {
    let mut agent = new_agent();
    let object = ordinary_object_create(&mut agent, None);
    let name = string(&mut agent, "exploding");
    define_accessor_property(&mut agent, object, name, Some(failing_getter), None, true)
        .unwrap();
    let env = new_object_environment(&mut agent, object, false, None);
    assert!(env.has_binding(&agent, name));

    for strict in [false, true] {
        let error = env.get_binding_value(&mut agent, name, strict).unwrap_err();
        assert_eq!(error.kind(), ExceptionType::TypeError);
        assert_eq!(error.message(), "getter failed");
    }
    agent.heap_mut().deref_environment(env);
    agent.heap_mut().deref_object(object);
}

#[test]
fn implicit_this_follows_provide_this() {
    let mut agent = new_agent();
    let object = ordinary_object_create(&mut agent, None);
    let plain = new_object_environment(&mut agent, object, false, None);
    let with = new_object_environment(&mut agent, object, true, None);
    assert_eq!(plain.kind(&agent), EnvironmentKind::ObjectBound);
    assert_eq!(with.kind(&agent), EnvironmentKind::ThisObjectBound);
    assert_eq!(agent.heap().object_ref_count(object), 3);

    assert_eq!(plain.implicit_this_value(&mut agent), Value::Undefined);
    assert_eq!(agent.heap().object_ref_count(object), 3);

    for expected in 4..=5 {
        assert_eq!(with.implicit_this_value(&mut agent), Value::Object(object));
        assert_eq!(agent.heap().object_ref_count(object), expected);
    }
    agent.heap_mut().deref_object(object);
    agent.heap_mut().deref_object(object);
    agent.heap_mut().deref_environment(plain);
    agent.heap_mut().deref_environment(with);
    assert_eq!(agent.heap().object_ref_count(object), 1);
    agent.heap_mut().deref_object(object);
    assert_eq!(agent.heap().object_count(), 0);
}

#[test]
fn destruction_releases_the_binding_object() {
    let mut agent = new_agent();
    let object = ordinary_object_create(&mut agent, None);
    let outer = new_declarative_environment(&mut agent, None);
    let env = new_object_environment(&mut agent, object, true, Some(outer));
    assert_eq!(agent.heap().object_ref_count(object), 2);
    assert_eq!(agent.heap().environment_ref_count(outer), 2);

    agent.heap_mut().deref_environment(env);
    assert_eq!(agent.heap().object_ref_count(object), 1);
    assert_eq!(agent.heap().environment_ref_count(outer), 1);
    agent.heap_mut().deref_environment(outer);
    agent.heap_mut().deref_object(object);
    assert_eq!(agent.heap().environment_count(), 0);
    assert_eq!(agent.heap().object_count(), 0);
}

#[test]
fn identifier_resolution_crosses_record_kinds() {
    let mut agent = new_agent();
    let global_object = ordinary_object_create(&mut agent, None);
    let global = new_object_environment(&mut agent, global_object, false, None);
    let function_scope = new_declarative_environment(&mut agent, Some(global));
    let block_scope = new_declarative_environment(&mut agent, Some(function_scope));

    let global_name = string(&mut agent, "globalThing");
    let local_name = string(&mut agent, "local");
    let shadowed = string(&mut agent, "shadowed");
    global
        .create_mutable_binding(&mut agent, global_name, true)
        .unwrap();
    global.create_mutable_binding(&mut agent, shadowed, true).unwrap();
    function_scope
        .create_mutable_binding(&mut agent, local_name, false)
        .unwrap();
    block_scope
        .create_mutable_binding(&mut agent, shadowed, false)
        .unwrap();

    let cases = [
        (global_name, Some(global)),
        (local_name, Some(function_scope)),
        (shadowed, Some(block_scope)),
    ];
    for (name, expected) in cases {
        let found = get_identifier_reference(&mut agent, Some(block_scope), name);
        assert_eq!(found, expected);
        if let Some(found) = found {
            agent.heap_mut().deref_environment(found);
        }
    }
    let unknown = string(&mut agent, "unknown");
    assert_eq!(
        get_identifier_reference(&mut agent, Some(block_scope), unknown),
        None
    );

    agent.heap_mut().deref_environment(global);
    agent.heap_mut().deref_environment(function_scope);
    agent.heap_mut().deref_object(global_object);
    agent.heap_mut().deref_environment(block_scope);
    assert_eq!(agent.heap().environment_count(), 0);
    assert_eq!(agent.heap().object_count(), 0);
}
