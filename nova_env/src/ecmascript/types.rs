// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod language;
mod spec;

pub use language::{
    NativeGetter, NativeSetter, Object, ObjectHeapData, String, StringHeapData, Value,
};
pub(crate) use language::{ObjectEntry, ObjectEntryPropertyDescriptor};
pub use spec::PropertyDescriptor;
