// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.1.1.4 Global Environment Records](https://tc39.es/ecma262/#sec-global-environment-records)
//!
//! The global environment is the outer most scope. Each [`Agent`] has at most
//! one, created by [`init_environment`] and destroyed by
//! [`finalize_environment`]. With the `global-declarative` feature it is a
//! declarative record; otherwise it is an object record over a fresh global
//! object that does not provide `this`.

use super::Environment;
#[cfg(feature = "global-declarative")]
use super::new_declarative_environment;
#[cfg(not(feature = "global-declarative"))]
use super::new_object_environment;
#[cfg(not(feature = "global-declarative"))]
use crate::ecmascript::builtins::ordinary::ordinary_object_create;
use crate::ecmascript::execution::Agent;

/// Creates the global environment of the agent.
///
/// ## Panics
/// - If the global environment is already initialized.
/// - If the global environment was already finalized.
pub fn init_environment(agent: &mut Agent) {
    assert!(
        agent.global_env.is_none(),
        "global environment is already initialized"
    );
    assert!(
        !agent.global_env_finalized,
        "global environment was already finalized"
    );

    #[cfg(feature = "global-declarative")]
    let global_env = new_declarative_environment(agent, None);

    #[cfg(not(feature = "global-declarative"))]
    let global_env = {
        let global_object = ordinary_object_create(agent, None);
        let global_env = new_object_environment(agent, global_object, false, None);
        // The environment holds the only reference to the global object.
        agent.heap.deref_object(global_object);
        global_env
    };

    tracing::debug!(?global_env, "global environment initialized");
    agent.global_env = Some(global_env);
}

/// Returns a new reference to the global environment.
///
/// ## Panics
/// - If the global environment is not initialized.
pub fn get_global_environment(agent: &mut Agent) -> Environment {
    let Some(global_env) = agent.global_env else {
        panic!("global environment is not initialized");
    };
    agent.heap.ref_environment(global_env);
    global_env
}

/// Releases the agent's reference to the global environment.
///
/// ## Panics
/// - If the global environment is not initialized.
pub fn finalize_environment(agent: &mut Agent) {
    let Some(global_env) = agent.global_env.take() else {
        panic!("global environment is not initialized");
    };
    agent.global_env_finalized = true;
    tracing::debug!(?global_env, "global environment finalized");
    agent.heap.deref_environment(global_env);
}
