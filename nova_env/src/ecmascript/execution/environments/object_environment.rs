// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{Environment, OuterEnv};
use crate::{
    ecmascript::{
        abstract_operations::operations_on_objects::{
            define_property_or_throw, delete, get, has_property, set,
        },
        execution::{Agent, JsResult, agent::ExceptionType},
        types::{Object, PropertyDescriptor, String, Value},
    },
    heap::indexes::ObjectEnvironmentIndex,
};

/// ### [9.1.1.2 Object Environment Records](https://tc39.es/ecma262/#sec-object-environment-records)
///
/// Each Object Environment Record is associated with an object called its
/// binding object. An Object Environment Record binds the set of string
/// identifier names that directly correspond to the property names of its
/// binding object. Both own and inherited properties are included in the set
/// regardless of the setting of their \[\[Enumerable\]\] attribute. Because
/// properties can be dynamically added and deleted from objects, the set of
/// identifiers bound by an Object Environment Record may potentially change
/// as a side-effect of any operation that adds or deletes properties.
/// Immutable bindings do not exist for Object Environment Records.
#[derive(Debug, Clone)]
pub struct ObjectEnvironmentRecord {
    /// ### \[\[BindingObject\]\]
    ///
    /// The binding object of this Environment Record.
    binding_object: Object,

    /// Whether the binding object is the implicit `this` value of calls
    /// resolved through this record.
    provide_this: bool,

    /// ### \[\[OuterEnv\]\]
    ///
    /// See [OuterEnv].
    outer_env: OuterEnv,
}

impl ObjectEnvironmentRecord {
    /// ### [9.1.2.3 NewObjectEnvironment ( O, W, E )](https://tc39.es/ecma262/#sec-newobjectenvironment)
    ///
    /// The abstract operation NewObjectEnvironment takes arguments O (an
    /// Object), W (a Boolean), and E (an Environment Record or null) and
    /// returns an Object Environment Record.
    pub(crate) fn new(
        binding_object: Object,
        provide_this: bool,
        outer_env: OuterEnv,
    ) -> ObjectEnvironmentRecord {
        // 1. Let env be a new Object Environment Record.
        ObjectEnvironmentRecord {
            // 2. Set env.[[BindingObject]] to O.
            binding_object,
            // 3. Set env.[[IsWithEnvironment]] to W.
            provide_this,
            // 4. Set env.[[OuterEnv]] to E.
            outer_env,
        }
        // 5. Return env.
    }

    pub(crate) fn binding_object(&self) -> Object {
        self.binding_object
    }

    pub(crate) fn provides_this(&self) -> bool {
        self.provide_this
    }

    pub(crate) fn outer_env(&self) -> OuterEnv {
        self.outer_env
    }
}

/// ### [9.1.2.3 NewObjectEnvironment ( O, W, E )](https://tc39.es/ecma262/#sec-newobjectenvironment)
///
/// The record takes its own references on `binding_object` and `outer_env`;
/// the caller owns the single reference to the new record.
pub fn new_object_environment(
    agent: &mut Agent,
    binding_object: Object,
    provide_this: bool,
    outer_env: OuterEnv,
) -> Environment {
    agent.heap.ref_object(binding_object);
    if let Some(outer_env) = outer_env {
        agent.heap.ref_environment(outer_env);
    }
    let index = agent
        .heap
        .create_object_environment(ObjectEnvironmentRecord::new(
            binding_object,
            provide_this,
            outer_env,
        ));
    tracing::trace!(?index, ?binding_object, provide_this, "object environment created");
    Environment::Object(index)
}

impl ObjectEnvironmentIndex {
    pub fn get_binding_object(self, agent: &Agent) -> Object {
        agent[self].binding_object
    }

    /// ### [9.1.1.2.1 HasBinding ( N )](https://tc39.es/ecma262/#sec-object-environment-records-hasbinding-n)
    ///
    /// The HasBinding concrete method of an Object Environment Record envRec
    /// takes argument N (a String) and returns a Boolean. It determines if its
    /// associated binding object has a property whose name is N.
    pub fn has_binding(self, agent: &Agent, n: String) -> bool {
        // 1. Let bindingObject be envRec.[[BindingObject]].
        let binding_object = agent[self].binding_object;
        // 2. Let foundBinding be ? HasProperty(bindingObject, N).
        // 3. If foundBinding is false, return false.
        // 4. Return true.
        has_property(agent, binding_object, n)
    }

    /// ### [9.1.1.2.2 CreateMutableBinding ( N, D )](https://tc39.es/ecma262/#sec-object-environment-records-createmutablebinding-n-d)
    ///
    /// The CreateMutableBinding concrete method of an Object Environment
    /// Record envRec takes arguments N (a String) and D (a Boolean) and
    /// returns either a normal completion containing UNUSED or a throw
    /// completion. It creates in an Environment Record's associated binding
    /// object a property whose name is N and initializes it to the value
    /// undefined. If D is true, the new property's \[\[Configurable]] attribute
    /// is set to true; otherwise it is set to false.
    pub fn create_mutable_binding(self, agent: &mut Agent, n: String, d: bool) -> JsResult<()> {
        // 1. Let bindingObject be envRec.[[BindingObject]].
        let binding_object = agent[self].binding_object;
        // 2. Perform ? DefinePropertyOrThrow(bindingObject, N, PropertyDescriptor { [[Value]]: undefined, [[Writable]]: true, [[Enumerable]]: true, [[Configurable]]: D }).
        define_property_or_throw(
            agent,
            binding_object,
            n,
            PropertyDescriptor {
                value: Some(Value::Undefined),
                writable: Some(true),
                get: None,
                set: None,
                enumerable: Some(true),
                configurable: Some(d),
            },
        )
        // 3. Return UNUSED.
    }

    /// ### [9.1.1.2.5 SetMutableBinding ( N, V, S )](https://tc39.es/ecma262/#sec-object-environment-records-setmutablebinding-n-v-s)
    ///
    /// The SetMutableBinding concrete method of an Object Environment Record
    /// envRec takes arguments N (a String), V (an ECMAScript language value),
    /// and S (a Boolean) and returns either a normal completion containing
    /// UNUSED or a throw completion. It attempts to set the value of the
    /// Environment Record's associated binding object's property whose name
    /// is N to the value V. A property named N normally already exists but if
    /// it does not or is not currently writable, error handling is determined
    /// by S.
    pub fn set_mutable_binding(
        self,
        agent: &mut Agent,
        n: String,
        v: Value,
        s: bool,
    ) -> JsResult<()> {
        // 1. Let bindingObject be envRec.[[BindingObject]].
        let binding_object = agent[self].binding_object;
        // 4. Perform ? Set(bindingObject, N, V, S).
        set(agent, binding_object, n, v, s)
        // 5. Return UNUSED.
    }

    /// ### [9.1.1.2.6 GetBindingValue ( N, S )](https://tc39.es/ecma262/#sec-object-environment-records-getbindingvalue-n-s)
    ///
    /// The GetBindingValue concrete method of an Object Environment Record
    /// envRec takes arguments N (a String) and S (a Boolean) and returns
    /// either a normal completion containing an ECMAScript language value or a
    /// throw completion. It returns the value of its associated binding
    /// object's property whose name is N. The property should already exist
    /// but if it does not the result depends upon S.
    pub fn get_binding_value(self, agent: &mut Agent, n: String, s: bool) -> JsResult<Value> {
        // 1. Let bindingObject be envRec.[[BindingObject]].
        let binding_object = agent[self].binding_object;
        // 2. Let value be ? HasProperty(bindingObject, N).
        // 3. If value is false, then
        if !has_property(agent, binding_object, n) {
            // a. If S is false, return undefined; otherwise throw a
            //    ReferenceError exception.
            if !s {
                return Ok(Value::Undefined);
            }
            let error_message = format!("Binding '{}' does not exist.", n.to_string_lossy(agent));
            return Err(agent.throw_exception(ExceptionType::ReferenceError, error_message));
        }

        // 4. Return ? Get(bindingObject, N).
        get(agent, binding_object, n)
    }

    /// ### [9.1.1.2.7 DeleteBinding ( N )](https://tc39.es/ecma262/#sec-object-environment-records-deletebinding-n)
    ///
    /// The DeleteBinding concrete method of an Object Environment Record
    /// envRec takes argument N (a String) and returns a Boolean. It can only
    /// delete bindings that correspond to properties of the environment
    /// object whose \[\[Configurable]] attribute have the value true.
    pub fn delete_binding(self, agent: &mut Agent, n: String) -> bool {
        // 1. Let bindingObject be envRec.[[BindingObject]].
        let binding_object = agent[self].binding_object;
        // 2. Return ? bindingObject.[[Delete]](N).
        let Ok(deleted) = delete(agent, binding_object, n, false) else {
            unreachable!("non-throwing delete returned an error");
        };
        deleted
    }

    /// ### [9.1.1.2.10 WithBaseObject ( )](https://tc39.es/ecma262/#sec-object-environment-records-withbaseobject)
    ///
    /// Returns the binding object when the record provides `this`, and
    /// undefined otherwise. The returned value is a new owning reference.
    pub fn implicit_this_value(self, agent: &mut Agent) -> Value {
        let env_rec = &agent[self];
        // 1. If envRec.[[IsWithEnvironment]] is true, return envRec.[[BindingObject]].
        if env_rec.provide_this {
            let binding_object = env_rec.binding_object;
            agent.heap.ref_object(binding_object);
            return Value::Object(binding_object);
        }
        // 2. Otherwise, return undefined.
        Value::Undefined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::create_data_property,
        builtins::ordinary::ordinary_object_create, execution::agent::Options,
    };

    fn object_environment(
        agent: &mut Agent,
        provide_this: bool,
    ) -> (Object, ObjectEnvironmentIndex) {
        let object = ordinary_object_create(agent, None);
        let Environment::Object(index) = new_object_environment(agent, object, provide_this, None)
        else {
            unreachable!()
        };
        (object, index)
    }

    #[test]
    fn bindings_are_properties() {
        let mut agent = Agent::new(Options::default());
        let (object, env) = object_environment(&mut agent, false);
        let name = String::from_str(&mut agent, "prop");
        env.create_mutable_binding(&mut agent, name, true).unwrap();
        let descriptor = object.internal_get_own_property(&agent, name).unwrap();
        assert_eq!(descriptor.value, Some(Value::Undefined));
        assert_eq!(descriptor.writable, Some(true));
        assert_eq!(descriptor.enumerable, Some(true));
        assert_eq!(descriptor.configurable, Some(true));

        env.set_mutable_binding(&mut agent, name, Value::Number(9.0), true)
            .unwrap();
        assert_eq!(get(&mut agent, object, name), Ok(Value::Number(9.0)));
        assert!(env.delete_binding(&mut agent, name));
        assert!(!env.has_binding(&agent, name));
    }

    #[test]
    fn missing_binding_depends_on_strictness() {
        let mut agent = Agent::new(Options::default());
        let (_, env) = object_environment(&mut agent, false);
        let name = String::from_str(&mut agent, "ghost");
        assert_eq!(
            env.get_binding_value(&mut agent, name, false),
            Ok(Value::Undefined)
        );
        let error = env.get_binding_value(&mut agent, name, true).unwrap_err();
        assert_eq!(error.kind(), ExceptionType::ReferenceError);
    }

    #[test]
    fn inherited_properties_are_bindings() {
        let mut agent = Agent::new(Options::default());
        let proto = ordinary_object_create(&mut agent, None);
        let object = ordinary_object_create(&mut agent, Some(proto));
        let name = String::from_str(&mut agent, "shared");
        assert!(create_data_property(&mut agent, proto, name, Value::Boolean(false)));
        let env = new_object_environment(&mut agent, object, false, None);
        assert!(env.has_binding(&agent, name));
        assert_eq!(
            env.get_binding_value(&mut agent, name, true),
            Ok(Value::Boolean(false))
        );
    }

    #[test]
    fn implicit_this_adds_a_reference() {
        let mut agent = Agent::new(Options::default());
        let (object, env) = object_environment(&mut agent, true);
        assert_eq!(agent.heap().object_ref_count(object), 2);
        assert_eq!(env.implicit_this_value(&mut agent), Value::Object(object));
        assert_eq!(agent.heap().object_ref_count(object), 3);

        let (other, env) = object_environment(&mut agent, false);
        assert_eq!(env.implicit_this_value(&mut agent), Value::Undefined);
        assert_eq!(agent.heap().object_ref_count(other), 2);
    }
}
