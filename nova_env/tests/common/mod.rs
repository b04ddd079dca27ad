// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![allow(dead_code)]

use std::sync::Once;

use nova_env::ecmascript::{
    execution::{Agent, Options},
    types::{String, Value},
};

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber once per test binary. Output is only
/// produced when `RUST_LOG` is set, e.g. `RUST_LOG=nova_env=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_test_writer())
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

pub fn new_agent() -> Agent {
    init_tracing();
    Agent::new(Options::default())
}

pub fn string(agent: &mut Agent, str: &str) -> String {
    String::from_str(agent, str)
}

pub fn string_value(agent: &mut Agent, str: &str) -> Value {
    String::from_str(agent, str).into()
}

/// Reads a string value back into Rust, or `None` for any other value.
pub fn as_rust_string(agent: &Agent, value: Value) -> Option<std::string::String> {
    match value {
        Value::String(string) => Some(string.to_string_lossy(agent).into_owned()),
        _ => None,
    }
}
