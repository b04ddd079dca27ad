// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.7 Agents](https://tc39.es/ecma262/#sec-agents)

use core::fmt;

use super::Environment;
use crate::heap::Heap;

/// Heap limits above which memory pressure callbacks run.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Accounted heap size past which [`MemoryPressureSeverity::Low`]
    /// callbacks run.
    ///
    /// [`MemoryPressureSeverity::Low`]: crate::heap::MemoryPressureSeverity::Low
    pub heap_desired_limit: usize,
    /// Accounted heap size past which [`MemoryPressureSeverity::High`]
    /// callbacks run. Must not be below `heap_desired_limit`.
    ///
    /// [`MemoryPressureSeverity::High`]: crate::heap::MemoryPressureSeverity::High
    pub heap_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            heap_desired_limit: 8 * 1024 * 1024,
            heap_limit: 32 * 1024 * 1024,
        }
    }
}

pub type JsResult<T> = core::result::Result<T, JsError>;

/// An abrupt completion: a thrown exception of some [`ExceptionType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsError {
    kind: ExceptionType,
    message: std::string::String,
}

impl JsError {
    pub(crate) fn new(kind: ExceptionType, message: std::string::String) -> Self {
        Self { kind, message }
    }

    pub fn kind(&self) -> ExceptionType {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for JsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionType {
    Error,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExceptionType::Error => "Error",
            ExceptionType::RangeError => "RangeError",
            ExceptionType::ReferenceError => "ReferenceError",
            ExceptionType::SyntaxError => "SyntaxError",
            ExceptionType::TypeError => "TypeError",
        })
    }
}

/// ### [9.7 Agents](https://tc39.es/ecma262/#sec-agents)
#[derive(Debug)]
pub struct Agent {
    pub(crate) heap: Heap,
    /// The global environment. Present between
    /// [`init_environment`](super::init_environment) and
    /// [`finalize_environment`](super::finalize_environment).
    pub(crate) global_env: Option<Environment>,
    /// Set by [`finalize_environment`](super::finalize_environment). The
    /// global environment is not created again afterwards.
    pub(crate) global_env_finalized: bool,
}

impl Agent {
    pub fn new(options: Options) -> Self {
        Self {
            heap: Heap::new(&options),
            global_env: None,
            global_env_finalized: false,
        }
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// ### [5.2.3.2 Throw an Exception](https://tc39.es/ecma262/#sec-throw-an-exception)
    pub fn throw_exception(&mut self, kind: ExceptionType, message: std::string::String) -> JsError {
        tracing::trace!(%kind, %message, "throwing exception");
        JsError::new(kind, message)
    }

    /// ### [5.2.3.2 Throw an Exception](https://tc39.es/ecma262/#sec-throw-an-exception)
    pub fn throw_exception_with_static_message(
        &mut self,
        kind: ExceptionType,
        message: &'static str,
    ) -> JsError {
        self.throw_exception(kind, message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thrown_errors_carry_kind_and_message() {
        let mut agent = Agent::new(Options::default());
        let error = agent.throw_exception_with_static_message(ExceptionType::TypeError, "nope");
        assert_eq!(error.kind(), ExceptionType::TypeError);
        assert_eq!(error.message(), "nope");
        assert_eq!(error.to_string(), "TypeError: nope");
    }
}
