// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.1 Environment Records](https://tc39.es/ecma262/#sec-environment-records)
//!
//! Environment Record is a specification type used to define the association of
//! Identifiers to specific variables and functions, based upon the lexical
//! nesting structure of ECMAScript code. Each time such code is evaluated, a new
//! Environment Record is created to record the identifier bindings that are
//! created by that code.
//!
//! Every Environment Record has an \[\[OuterEnv\]\] field, which is either null or
//! a reference to an outer Environment Record. This is used to model the
//! logical nesting of Environment Record values.
//!
//! Records live in reference counted heap slots. A record owns a reference to
//! its outer record, to its binding object and to every binding name and
//! value it stores. Releasing the last reference to a record releases all of
//! those in turn.

mod declarative_environment;
mod global_environment;
mod object_environment;

pub(crate) use declarative_environment::Binding;
pub use declarative_environment::{
    BindingValue, DeclarativeEnvironmentRecord, new_declarative_environment,
};
pub use global_environment::{finalize_environment, get_global_environment, init_environment};
pub use object_environment::{ObjectEnvironmentRecord, new_object_environment};

use crate::{
    ecmascript::types::{Object, String, Value},
    heap::{
        indexes::{DeclarativeEnvironmentIndex, ObjectEnvironmentIndex},
        subspace::IsoSubspace,
    },
};

use super::{Agent, JsResult};

/// ### [\[\[OuterEnv\]\]](https://tc39.es/ecma262/#sec-environment-records)
///
/// Every Environment Record has an \[\[OuterEnv\]\] field, which is either
/// null or a reference to an outer Environment Record.
pub(super) type OuterEnv = Option<Environment>;

macro_rules! impl_environment_index {
    ($name: ident, $index: ident, $entry: ident, $variant: ident) => {
        impl core::ops::Index<$index> for Agent {
            type Output = $name;

            fn index(&self, index: $index) -> &Self::Output {
                &self.heap.environments.$entry[index]
            }
        }

        impl core::ops::IndexMut<$index> for Agent {
            fn index_mut(&mut self, index: $index) -> &mut Self::Output {
                &mut self.heap.environments.$entry[index]
            }
        }

        impl From<$index> for Environment {
            fn from(value: $index) -> Self {
                Environment::$variant(value)
            }
        }
    };
}

/// Heap storage for environment records.
#[derive(Debug)]
pub(crate) struct Environments {
    pub(crate) declarative: IsoSubspace<DeclarativeEnvironmentRecord>,
    pub(crate) object: IsoSubspace<ObjectEnvironmentRecord>,
}

impl Default for Environments {
    fn default() -> Self {
        Self {
            declarative: IsoSubspace::with_capacity("declarative environments", 64),
            object: IsoSubspace::with_capacity("object environments", 8),
        }
    }
}

impl Environments {
    pub(crate) fn len(&self) -> usize {
        self.declarative.live() + self.object.live()
    }
}

/// ### [9.1.1 The Environment Record Type Hierarchy](https://tc39.es/ecma262/#sec-the-environment-record-type-hierarchy)
///
/// A handle to either kind of environment record. Copying the handle does not
/// add a reference: use [`Heap::ref_environment`] and
/// [`Heap::deref_environment`] for that.
///
/// [`Heap::ref_environment`]: crate::heap::Heap::ref_environment
/// [`Heap::deref_environment`]: crate::heap::Heap::deref_environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Declarative(DeclarativeEnvironmentIndex),
    Object(ObjectEnvironmentIndex),
}

impl_environment_index!(
    DeclarativeEnvironmentRecord,
    DeclarativeEnvironmentIndex,
    declarative,
    Declarative
);
impl_environment_index!(
    ObjectEnvironmentRecord,
    ObjectEnvironmentIndex,
    object,
    Object
);

/// How an environment record stores its bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentKind {
    /// Bindings live in the record itself.
    Declarative,
    /// Bindings are the properties of a binding object.
    ObjectBound,
    /// Like [`EnvironmentKind::ObjectBound`], and the binding object is
    /// provided as the implicit `this` value.
    ThisObjectBound,
}

impl Environment {
    pub fn kind(self, agent: &Agent) -> EnvironmentKind {
        match self {
            Environment::Declarative(_) => EnvironmentKind::Declarative,
            Environment::Object(index) if agent[index].provides_this() => {
                EnvironmentKind::ThisObjectBound
            }
            Environment::Object(_) => EnvironmentKind::ObjectBound,
        }
    }

    /// The \[\[OuterEnv]] of the record. This is a view: no reference is
    /// added.
    pub fn get_outer_env(self, agent: &Agent) -> Option<Environment> {
        match self {
            Environment::Declarative(index) => agent[index].outer_env(),
            Environment::Object(index) => agent[index].outer_env(),
        }
    }

    /// The \[\[BindingObject]] of an object-bound record. This is a view: no
    /// reference is added.
    pub fn get_binding_object(self, agent: &Agent) -> Option<Object> {
        match self {
            Environment::Declarative(_) => None,
            Environment::Object(index) => Some(agent[index].binding_object()),
        }
    }

    pub fn provides_this(self, agent: &Agent) -> bool {
        self.kind(agent) == EnvironmentKind::ThisObjectBound
    }

    /// ### [HasBinding(N)](https://tc39.es/ecma262/#table-abstract-methods-of-environment-records)
    ///
    /// Determine if an Environment Record has a binding for the String value
    /// N. Return true if it does and false if it does not.
    pub fn has_binding(self, agent: &Agent, name: String) -> bool {
        match self {
            Environment::Declarative(index) => index.has_binding(agent, name),
            Environment::Object(index) => index.has_binding(agent, name),
        }
    }

    /// ### [CreateMutableBinding(N, D)](https://tc39.es/ecma262/#table-abstract-methods-of-environment-records)
    ///
    /// Create a new mutable binding in an Environment Record. The String
    /// value N is the text of the bound name. If the Boolean argument D is
    /// true the binding may be subsequently deleted. The binding starts out
    /// holding undefined.
    pub fn create_mutable_binding(
        self,
        agent: &mut Agent,
        name: String,
        is_deletable: bool,
    ) -> JsResult<()> {
        match self {
            Environment::Declarative(index) => {
                index.create_mutable_binding(agent, name, is_deletable);
                Ok(())
            }
            Environment::Object(index) => index.create_mutable_binding(agent, name, is_deletable),
        }
    }

    /// ### [SetMutableBinding(N, V, S)](https://tc39.es/ecma262/#table-abstract-methods-of-environment-records)
    ///
    /// Set the value of an already existing mutable binding in an Environment
    /// Record. The String value N is the text of the bound name. V is the
    /// value for the binding and may be a value of any ECMAScript language
    /// type. S is a Boolean flag. If S is true and the binding cannot be set
    /// throw a TypeError exception.
    ///
    /// Takes ownership of `value` on every path.
    pub fn set_mutable_binding(
        self,
        agent: &mut Agent,
        name: String,
        value: Value,
        is_strict: bool,
    ) -> JsResult<()> {
        match self {
            Environment::Declarative(index) => {
                index.set_mutable_binding(agent, name, value, is_strict)
            }
            Environment::Object(index) => index.set_mutable_binding(agent, name, value, is_strict),
        }
    }

    /// ### [GetBindingValue(N, S)](https://tc39.es/ecma262/#table-abstract-methods-of-environment-records)
    ///
    /// Returns the value of an already existing binding from an Environment
    /// Record. The String value N is the text of the bound name. S is used to
    /// identify references originating in strict mode code or that otherwise
    /// require strict mode reference semantics. If S is true and the binding
    /// does not exist or is uninitialized throw a ReferenceError exception;
    /// otherwise undefined is returned.
    ///
    /// The returned value is a new owning reference.
    pub fn get_binding_value(
        self,
        agent: &mut Agent,
        name: String,
        is_strict: bool,
    ) -> JsResult<Value> {
        match self {
            Environment::Declarative(index) => index.get_binding_value(agent, name, is_strict),
            Environment::Object(index) => index.get_binding_value(agent, name, is_strict),
        }
    }

    /// ### [DeleteBinding(N)](https://tc39.es/ecma262/#table-abstract-methods-of-environment-records)
    ///
    /// Delete a binding from an Environment Record. The String value N is the
    /// text of the bound name. If a binding for N exists, remove the binding
    /// and return true. If the binding exists but cannot be removed return
    /// false. If the binding does not exist return true.
    pub fn delete_binding(self, agent: &mut Agent, name: String) -> bool {
        match self {
            Environment::Declarative(index) => index.delete_binding(agent, name),
            Environment::Object(index) => index.delete_binding(agent, name),
        }
    }

    /// ### [ImplicitThisValue()](https://tc39.es/ecma262/#table-additional-methods-of-function-environment-records)
    ///
    /// Determine the value to use as the `this` value on calls to function
    /// objects that are obtained as binding values from this Environment
    /// Record.
    ///
    /// The returned value is a new owning reference.
    pub fn implicit_this_value(self, agent: &mut Agent) -> Value {
        match self {
            // Declarative Environment Records always return undefined as
            // their ImplicitThisValue.
            Environment::Declarative(_) => Value::Undefined,
            Environment::Object(index) => index.implicit_this_value(agent),
        }
    }

    /// ### [CreateImmutableBinding(N)](https://tc39.es/ecma262/#table-abstract-methods-of-environment-records)
    ///
    /// Create a new but uninitialized immutable binding in an Environment
    /// Record. The String value N is the text of the bound name.
    ///
    /// ## Panics
    /// - If the record is object-bound: those have no immutable bindings.
    pub fn create_immutable_binding(self, agent: &mut Agent, name: String) {
        match self {
            Environment::Declarative(index) => index.create_immutable_binding(agent, name),
            Environment::Object(_) => {
                unreachable!("object environment records have no immutable bindings")
            }
        }
    }

    /// ### [InitializeBinding(N, V)](https://tc39.es/ecma262/#table-abstract-methods-of-environment-records)
    ///
    /// Set the value of an already existing but uninitialized immutable
    /// binding in an Environment Record. Takes ownership of `value`.
    ///
    /// ## Panics
    /// - If the record is object-bound.
    pub fn initialize_immutable_binding(self, agent: &mut Agent, name: String, value: Value) {
        match self {
            Environment::Declarative(index) => {
                index.initialize_immutable_binding(agent, name, value)
            }
            Environment::Object(_) => {
                unreachable!("object environment records have no immutable bindings")
            }
        }
    }
}

/// ### [9.1.2.1 GetIdentifierReference ( env, name, strict )](https://tc39.es/ecma262/#sec-getidentifierreference)
///
/// Walks `env` and its outer records and returns the first record that has a
/// binding for `name`, or `None` if the name is unresolvable. The returned
/// record carries a new reference.
#[tracing::instrument(level = "trace", skip(agent, name), fields(name = ?name), ret)]
pub fn get_identifier_reference(
    agent: &mut Agent,
    env: Option<Environment>,
    name: String,
) -> Option<Environment> {
    let mut env = env;
    // 1. If env is null, then
    //    a. Return the Reference Record { [[Base]]: UNRESOLVABLE, ... }.
    while let Some(current) = env {
        // 2. Let exists be ? env.HasBinding(name).
        // 3. If exists is true, then
        if current.has_binding(agent, name) {
            // a. Return the Reference Record { [[Base]]: env, ... }.
            agent.heap.ref_environment(current);
            return Some(current);
        }
        // 4. Else,
        //    a. Let outer be env.[[OuterEnv]].
        //    b. Return ? GetIdentifierReference(outer, name, strict).
        env = current.get_outer_env(agent);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{builtins::ordinary::ordinary_object_create, execution::agent::Options};

    #[test]
    fn kinds_follow_storage() {
        let mut agent = Agent::new(Options::default());
        let declarative = new_declarative_environment(&mut agent, None);
        let object = ordinary_object_create(&mut agent, None);
        let bound = new_object_environment(&mut agent, object, false, Some(declarative));
        let this_bound = new_object_environment(&mut agent, object, true, None);
        assert_eq!(declarative.kind(&agent), EnvironmentKind::Declarative);
        assert_eq!(bound.kind(&agent), EnvironmentKind::ObjectBound);
        assert_eq!(this_bound.kind(&agent), EnvironmentKind::ThisObjectBound);
        assert_eq!(bound.get_outer_env(&agent), Some(declarative));
        assert_eq!(bound.get_binding_object(&agent), Some(object));
        assert_eq!(declarative.get_binding_object(&agent), None);
        assert!(this_bound.provides_this(&agent));
    }

    #[test]
    fn identifier_resolution_walks_outward() {
        let mut agent = Agent::new(Options::default());
        let outer = new_declarative_environment(&mut agent, None);
        let inner = new_declarative_environment(&mut agent, Some(outer));
        let name = String::from_str(&mut agent, "x");
        let missing = String::from_str(&mut agent, "y");
        outer.create_mutable_binding(&mut agent, name, false).unwrap();
        assert_eq!(get_identifier_reference(&mut agent, Some(inner), name), Some(outer));
        assert_eq!(agent.heap().environment_ref_count(outer), 3);
        assert_eq!(get_identifier_reference(&mut agent, Some(inner), missing), None);
        assert_eq!(get_identifier_reference(&mut agent, None, name), None);
    }

    #[test]
    #[should_panic(expected = "object environment records have no immutable bindings")]
    fn object_records_reject_immutable_bindings() {
        let mut agent = Agent::new(Options::default());
        let object = ordinary_object_create(&mut agent, None);
        let env = new_object_environment(&mut agent, object, false, None);
        let name = String::from_str(&mut agent, "c");
        env.create_immutable_binding(&mut agent, name);
    }
}
