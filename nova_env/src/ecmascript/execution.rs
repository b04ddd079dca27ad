// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod agent;
mod environments;

pub use agent::{Agent, ExceptionType, JsError, JsResult, Options};
pub(crate) use environments::{Binding, Environments};
pub use environments::{
    BindingValue, DeclarativeEnvironmentRecord, Environment, EnvironmentKind,
    ObjectEnvironmentRecord, finalize_environment, get_global_environment,
    get_identifier_reference, init_environment, new_declarative_environment,
    new_object_environment,
};
