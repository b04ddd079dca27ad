// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ahash::AHashMap;

use super::{Environment, OuterEnv};
use crate::{
    ecmascript::{
        execution::{Agent, JsResult, agent::ExceptionType},
        types::{String, Value},
    },
    heap::indexes::DeclarativeEnvironmentIndex,
};

/// The value slot of a declarative binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingValue {
    /// An immutable binding that has not been initialized yet.
    Uninitialized,
    Initialized(Value),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Binding {
    pub(crate) name: String,
    pub(crate) value: BindingValue,
    // TODO: Pack these into bitfields.
    pub(crate) mutable: bool,
    pub(crate) deletable: bool,
}

/// #### [9.1.1.1 Declarative Environment Records](https://tc39.es/ecma262/#sec-declarative-environment-records)
///
/// A Declarative Environment Record is used to define the effect of ECMAScript
/// language syntactic elements such as FunctionDeclarations,
/// VariableDeclarations, and Catch clauses that directly associate identifier
/// bindings with ECMAScript language values.
///
/// Bindings are kept in creation order.
#[derive(Debug, Clone)]
pub struct DeclarativeEnvironmentRecord {
    /// ### \[\[OuterEnv\]\]
    ///
    /// See [OuterEnv].
    outer_env: OuterEnv,

    /// The environment's bindings.
    bindings: Vec<Binding>,

    /// Position of each binding in `bindings`.
    lookup: AHashMap<String, u32>,
}

impl DeclarativeEnvironmentRecord {
    /// #### [9.1.2.2 NewDeclarativeEnvironment ( E )](https://tc39.es/ecma262/#sec-newdeclarativeenvironment)
    ///
    /// The abstract operation NewDeclarativeEnvironment takes argument E (an
    /// Environment Record or null) and returns a Declarative Environment
    /// Record.
    pub(crate) fn new(outer_env: OuterEnv) -> DeclarativeEnvironmentRecord {
        // 1. Let env be a new Declarative Environment Record containing no bindings.
        // 2. Set env.[[OuterEnv]] to E.
        // 3. Return env.
        DeclarativeEnvironmentRecord {
            outer_env,
            bindings: Vec::new(),
            lookup: AHashMap::default(),
        }
    }

    pub(crate) fn outer_env(&self) -> OuterEnv {
        self.outer_env
    }

    /// Names of the bindings in creation order.
    pub fn binding_names(&self) -> impl Iterator<Item = String> + '_ {
        self.bindings.iter().map(|binding| binding.name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// ##### [9.1.1.1.1 HasBinding ( N )](https://tc39.es/ecma262/#sec-declarative-environment-records-hasbinding-n)
    pub(super) fn has_binding(&self, name: String) -> bool {
        // 1. If envRec has a binding for N, return true.
        // 2. Return false.
        self.lookup.contains_key(&name)
    }

    fn insert(&mut self, binding: Binding) {
        // 1. Assert: envRec does not already have a binding for N.
        debug_assert!(!self.has_binding(binding.name));
        let position = u32::try_from(self.bindings.len()).expect("too many bindings");
        self.lookup.insert(binding.name, position);
        self.bindings.push(binding);
    }

    /// ##### [9.1.1.1.2 CreateMutableBinding ( N, D )](https://tc39.es/ecma262/#sec-declarative-environment-records-createmutablebinding-n-d)
    pub(super) fn create_mutable_binding(&mut self, name: String, is_deletable: bool) {
        // 2. Create a mutable binding in envRec for N. If D is true, record
        //    that the newly created binding may be deleted by a subsequent
        //    DeleteBinding call.
        // Mutable bindings are never observable as uninitialized: they start
        // out holding undefined.
        self.insert(Binding {
            name,
            value: BindingValue::Initialized(Value::Undefined),
            mutable: true,
            deletable: is_deletable,
        });
        // 3. Return UNUSED.
    }

    /// ##### [9.1.1.1.3 CreateImmutableBinding ( N, S )](https://tc39.es/ecma262/#sec-declarative-environment-records-createimmutablebinding-n-s)
    pub(super) fn create_immutable_binding(&mut self, name: String) {
        // 2. Create an immutable binding in envRec for N and record that it is
        //    uninitialized.
        self.insert(Binding {
            name,
            value: BindingValue::Uninitialized,
            mutable: false,
            deletable: false,
        });
        // 3. Return UNUSED.
    }

    /// ##### [9.1.1.1.4 InitializeBinding ( N, V )](https://tc39.es/ecma262/#sec-declarative-environment-records-initializebinding-n-v)
    pub(super) fn initialize_binding(&mut self, name: String, value: Value) {
        // 1. Assert: envRec must have an uninitialized binding for N.
        let binding = self
            .get_binding_mut(name)
            .expect("InitializeBinding on a name with no binding");
        assert!(
            !binding.mutable && binding.value == BindingValue::Uninitialized,
            "binding is not an uninitialized immutable binding"
        );

        // 2. Set the bound value for N in envRec to V.
        // 3. Record that the binding for N in envRec has been initialized.
        binding.value = BindingValue::Initialized(value);

        // 4. Return UNUSED.
    }

    pub(crate) fn get_binding(&self, name: String) -> Option<&Binding> {
        let position = *self.lookup.get(&name)?;
        Some(&self.bindings[position as usize])
    }

    fn get_binding_mut(&mut self, name: String) -> Option<&mut Binding> {
        let position = *self.lookup.get(&name)?;
        Some(&mut self.bindings[position as usize])
    }

    /// Removes the binding, keeping the creation order of the rest.
    fn remove_binding(&mut self, name: String) -> Option<Binding> {
        let position = self.lookup.remove(&name)? as usize;
        let binding = self.bindings.remove(position);
        for later in &self.bindings[position..] {
            if let Some(slot) = self.lookup.get_mut(&later.name) {
                *slot -= 1;
            }
        }
        Some(binding)
    }

    /// Takes every binding out of the record. Used when the record is
    /// destroyed.
    pub(crate) fn take_bindings(&mut self) -> Vec<Binding> {
        self.lookup.clear();
        core::mem::take(&mut self.bindings)
    }
}

/// #### [9.1.2.2 NewDeclarativeEnvironment ( E )](https://tc39.es/ecma262/#sec-newdeclarativeenvironment)
///
/// Creates a record with no bindings. The record takes its own reference on
/// `outer_env`; the caller owns the single reference to the new record.
pub fn new_declarative_environment(agent: &mut Agent, outer_env: OuterEnv) -> Environment {
    if let Some(outer_env) = outer_env {
        agent.heap.ref_environment(outer_env);
    }
    let index = agent
        .heap
        .create_declarative_environment(DeclarativeEnvironmentRecord::new(outer_env));
    tracing::trace!(?index, ?outer_env, "declarative environment created");
    Environment::Declarative(index)
}

impl DeclarativeEnvironmentIndex {
    /// ##### [9.1.1.1.1 HasBinding ( N )](https://tc39.es/ecma262/#sec-declarative-environment-records-hasbinding-n)
    ///
    /// The HasBinding concrete method of a Declarative Environment Record
    /// envRec takes argument N (a String) and returns a normal completion
    /// containing a Boolean. It determines if the argument identifier is one
    /// of the identifiers bound by the record.
    pub fn has_binding(self, agent: &Agent, name: String) -> bool {
        // Delegate to heap data record method.
        agent[self].has_binding(name)
    }

    /// ##### [9.1.1.1.2 CreateMutableBinding ( N, D )](https://tc39.es/ecma262/#sec-declarative-environment-records-createmutablebinding-n-d)
    ///
    /// The CreateMutableBinding concrete method of a Declarative Environment
    /// Record envRec takes arguments N (a String) and D (a Boolean) and
    /// returns a normal completion containing UNUSED. It creates a new mutable
    /// binding for the name N. A binding must not already exist in this
    /// Environment Record for N. If D is true, the new binding is marked as
    /// being subject to deletion.
    pub fn create_mutable_binding(self, agent: &mut Agent, name: String, is_deletable: bool) {
        agent.heap.account_binding_created();
        agent.heap.copy_string(name);
        // Delegate to heap data record method.
        agent[self].create_mutable_binding(name, is_deletable);
    }

    /// ##### [9.1.1.1.3 CreateImmutableBinding ( N, S )](https://tc39.es/ecma262/#sec-declarative-environment-records-createimmutablebinding-n-s)
    ///
    /// The CreateImmutableBinding concrete method of a Declarative Environment
    /// Record envRec takes argument N (a String) and returns a normal
    /// completion containing UNUSED. It creates a new immutable binding for
    /// the name N that is uninitialized. A binding must not already exist in
    /// this Environment Record for N.
    pub fn create_immutable_binding(self, agent: &mut Agent, name: String) {
        agent.heap.account_binding_created();
        agent.heap.copy_string(name);
        // Delegate to heap data record method.
        agent[self].create_immutable_binding(name);
    }

    /// ##### [9.1.1.1.4 InitializeBinding ( N, V )](https://tc39.es/ecma262/#sec-declarative-environment-records-initializebinding-n-v)
    ///
    /// Sets the bound value of the uninitialized immutable binding N to V.
    /// The transition happens at most once. Takes ownership of `value`.
    pub fn initialize_immutable_binding(self, agent: &mut Agent, name: String, value: Value) {
        // Delegate to heap data record method.
        agent[self].initialize_binding(name, value);
    }

    /// ##### [9.1.1.1.5 SetMutableBinding ( N, V, S )](https://tc39.es/ecma262/#sec-declarative-environment-records-setmutablebinding-n-v-s)
    ///
    /// The SetMutableBinding concrete method of a Declarative Environment
    /// Record envRec takes arguments N (a String), V (an ECMAScript language
    /// value), and S (a Boolean) and returns either a normal completion
    /// containing UNUSED or a throw completion. It attempts to change the
    /// bound value of the current binding of the identifier whose name is N to
    /// the value V. If the binding is an immutable binding, a TypeError is
    /// thrown if S is true and the assignment is silently ignored otherwise.
    pub fn set_mutable_binding(
        self,
        agent: &mut Agent,
        name: String,
        value: Value,
        is_strict: bool,
    ) -> JsResult<()> {
        let env_rec = &mut agent[self];
        // 1. Assert: envRec has a binding for N.
        let Some(binding) = env_rec.get_binding_mut(name) else {
            unreachable!("SetMutableBinding on a name with no binding");
        };

        // 2. If the binding for N in envRec is a mutable binding, then
        if binding.mutable {
            // a. Change its bound value to V.
            let previous = core::mem::replace(&mut binding.value, BindingValue::Initialized(value));
            if let BindingValue::Initialized(previous) = previous {
                agent.heap.free_value(previous);
            }
            // 4. Return UNUSED.
            return Ok(());
        }

        // 3. Else,
        // a. Assert: This is an attempt to change the value of an immutable binding.
        agent.heap.free_value(value);

        // b. If S is true, throw a TypeError exception.
        if is_strict {
            let error_message = format!(
                "Cannot assign to immutable binding '{}'.",
                name.to_string_lossy(agent)
            );
            return Err(agent.throw_exception(ExceptionType::TypeError, error_message));
        }

        // 4. Return UNUSED.
        Ok(())
    }

    /// ##### [9.1.1.1.6 GetBindingValue ( N, S )](https://tc39.es/ecma262/#sec-declarative-environment-records-getbindingvalue-n-s)
    ///
    /// The GetBindingValue concrete method of a Declarative Environment Record
    /// envRec takes arguments N (a String) and S (a Boolean) and returns
    /// either a normal completion containing an ECMAScript language value or a
    /// throw completion. It returns the value of its bound identifier whose
    /// name is N. If the binding exists but is uninitialized a ReferenceError
    /// is thrown if S is true and undefined is returned otherwise.
    ///
    /// The returned value is a new owning reference.
    pub fn get_binding_value(
        self,
        agent: &mut Agent,
        name: String,
        is_strict: bool,
    ) -> JsResult<Value> {
        // 1. Assert: envRec has a binding for N.
        let Some(binding) = agent[self].get_binding(name) else {
            unreachable!("GetBindingValue on a name with no binding");
        };
        let value = binding.value;

        match value {
            // 3. Return the value currently bound to N in envRec.
            BindingValue::Initialized(value) => Ok(agent.heap.copy_value(value)),
            // 2. If the binding for N in envRec is an uninitialized binding,
            //    throw a ReferenceError exception if S is true.
            BindingValue::Uninitialized if is_strict => {
                let error_message = format!(
                    "Binding '{}' is not initialized.",
                    name.to_string_lossy(agent)
                );
                Err(agent.throw_exception(ExceptionType::ReferenceError, error_message))
            }
            BindingValue::Uninitialized => Ok(Value::Undefined),
        }
    }

    /// ##### [9.1.1.1.7 DeleteBinding ( N )](https://tc39.es/ecma262/#sec-declarative-environment-records-deletebinding-n)
    ///
    /// The DeleteBinding concrete method of a Declarative Environment Record
    /// envRec takes argument N (a String) and returns a normal completion
    /// containing a Boolean. It can only delete bindings that have been
    /// explicitly designated as being subject to deletion. Deleting a name
    /// that is not bound succeeds.
    pub fn delete_binding(self, agent: &mut Agent, name: String) -> bool {
        let env_rec = &mut agent[self];
        // 1. If envRec does not have a binding for N, return true.
        let Some(binding) = env_rec.get_binding(name) else {
            return true;
        };

        // 2. If the binding for N in envRec cannot be deleted, return false.
        if !binding.deletable {
            return false;
        }

        // 3. Remove the binding for N from envRec.
        if let Some(binding) = env_rec.remove_binding(name) {
            agent.heap.release_binding(binding);
        }

        // 4. Return true.
        true
    }

    /// Returns the current state of the binding without adding a reference.
    pub fn get_binding_state(self, agent: &Agent, name: String) -> Option<BindingValue> {
        agent[self].get_binding(name).map(|binding| binding.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::agent::Options;

    fn declarative(agent: &mut Agent) -> DeclarativeEnvironmentIndex {
        match new_declarative_environment(agent, None) {
            Environment::Declarative(index) => index,
            Environment::Object(_) => unreachable!(),
        }
    }

    #[test]
    fn mutable_binding_starts_undefined() {
        let mut agent = Agent::new(Options::default());
        let env = declarative(&mut agent);
        let name = String::from_str(&mut agent, "a");
        env.create_mutable_binding(&mut agent, name, false);
        assert!(env.has_binding(&agent, name));
        assert_eq!(
            env.get_binding_value(&mut agent, name, true),
            Ok(Value::Undefined)
        );
    }

    #[test]
    fn immutable_binding_is_initialized_once() {
        let mut agent = Agent::new(Options::default());
        let env = declarative(&mut agent);
        let name = String::from_str(&mut agent, "c");
        env.create_immutable_binding(&mut agent, name);
        assert_eq!(
            env.get_binding_state(&agent, name),
            Some(BindingValue::Uninitialized)
        );
        let error = env.get_binding_value(&mut agent, name, true).unwrap_err();
        assert_eq!(error.kind(), ExceptionType::ReferenceError);
        assert_eq!(
            env.get_binding_value(&mut agent, name, false),
            Ok(Value::Undefined)
        );
        env.initialize_immutable_binding(&mut agent, name, Value::Number(3.0));
        assert_eq!(
            env.get_binding_value(&mut agent, name, true),
            Ok(Value::Number(3.0))
        );
    }

    #[test]
    #[should_panic(expected = "binding is not an uninitialized immutable binding")]
    fn second_initialization_panics() {
        let mut agent = Agent::new(Options::default());
        let env = declarative(&mut agent);
        let name = String::from_str(&mut agent, "c");
        env.create_immutable_binding(&mut agent, name);
        env.initialize_immutable_binding(&mut agent, name, Value::Null);
        env.initialize_immutable_binding(&mut agent, name, Value::Null);
    }

    #[test]
    fn deletion_keeps_creation_order() {
        let mut agent = Agent::new(Options::default());
        let env = declarative(&mut agent);
        let names = ["a", "b", "c", "d"].map(|name| String::from_str(&mut agent, name));
        for name in names {
            env.create_mutable_binding(&mut agent, name, true);
        }
        assert!(env.delete_binding(&mut agent, names[1]));
        assert_eq!(
            agent[env].binding_names().collect::<Vec<_>>(),
            vec![names[0], names[2], names[3]]
        );
        env.set_mutable_binding(&mut agent, names[3], Value::Boolean(true), true)
            .unwrap();
        assert_eq!(
            env.get_binding_value(&mut agent, names[3], true),
            Ok(Value::Boolean(true))
        );
    }

    #[test]
    fn binding_holds_its_own_name_reference() {
        let mut agent = Agent::new(Options::default());
        let env = declarative(&mut agent);
        let name = String::from_str(&mut agent, "owned");
        env.create_mutable_binding(&mut agent, name, true);
        assert_eq!(agent.heap().string_ref_count(name), 2);
        assert!(env.delete_binding(&mut agent, name));
        assert_eq!(agent.heap().string_ref_count(name), 1);
    }
}
