// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lexical environment records for the Nova JavaScript engine.
//!
//! Environment records map identifier names to values and chain together
//! through their outer reference to form the scope chain that identifier
//! resolution walks. Records, strings and objects live in the reference
//! counted [`Heap`] owned by an [`Agent`](ecmascript::execution::Agent).

pub mod ecmascript;
pub mod heap;

pub use heap::Heap;
