// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::types::{NativeGetter, NativeSetter, Value};

/// ### [6.2.6 The Property Descriptor Specification Type](https://tc39.es/ecma262/#sec-property-descriptor-specification-type)
///
/// A descriptor passed into \[\[DefineOwnProperty]] owns its value. A
/// descriptor handed out by \[\[GetOwnProperty]] is only a view of the stored
/// property and owns nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyDescriptor {
    /// \[\[Value]]
    pub value: Option<Value>,

    /// \[\[Writable]]
    pub writable: Option<bool>,

    /// \[\[Get]]
    ///
    /// Note: double-Option because these fields can be set explicitly undefined
    /// to unset them.
    pub get: Option<Option<NativeGetter>>,

    /// \[\[Set]]
    ///
    /// Note: double-Option because these fields can be set explicitly undefined
    /// to unset them.
    pub set: Option<Option<NativeSetter>>,

    /// \[\[Enumerable]]
    pub enumerable: Option<bool>,

    /// \[\[Configurable]]
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub fn new_data_descriptor(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            writable: Some(true),
            get: None,
            set: None,
            enumerable: Some(true),
            configurable: Some(true),
        }
    }

    pub fn new_accessor_descriptor(
        get: Option<NativeGetter>,
        set: Option<NativeSetter>,
        configurable: bool,
    ) -> Self {
        Self {
            value: None,
            writable: None,
            get: Some(get),
            set: Some(set),
            enumerable: Some(true),
            configurable: Some(configurable),
        }
    }

    /// ### [6.2.6.1 IsAccessorDescriptor ( Desc )](https://tc39.es/ecma262/#sec-isaccessordescriptor)
    pub fn is_accessor_descriptor(&self) -> bool {
        // 1. If Desc is undefined, return false.
        match (self.get, self.set) {
            // 2. If Desc has a [[Get]] field, return true.
            (Some(_), _) => true,
            // 3. If Desc has a [[Set]] field, return true.
            (_, Some(_)) => true,
            // 4. Return false.
            _ => false,
        }
    }

    /// ### [6.2.6.2 IsDataDescriptor ( Desc )](https://tc39.es/ecma262/#sec-isdatadescriptor)
    pub fn is_data_descriptor(&self) -> bool {
        // 1. If Desc is undefined, return false.
        match (self.value, self.writable) {
            // 2. If Desc has a [[Value]] field, return true.
            (Some(_), _) => true,
            // 3. If Desc has a [[Writable]] field, return true.
            (_, Some(_)) => true,
            // 4. Return false.
            _ => false,
        }
    }

    /// ### [6.2.6.3 IsGenericDescriptor ( Desc )](https://tc39.es/ecma262/#sec-isgenericdescriptor)
    pub fn is_generic_descriptor(&self) -> bool {
        // 1. If Desc is undefined, return false.
        // 2. If IsAccessorDescriptor(Desc) is true, return false.
        // 3. If IsDataDescriptor(Desc) is true, return false.
        // 4. Return true.
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyDescriptor;
    use crate::ecmascript::types::Value;

    #[test]
    fn descriptor_classification() {
        let data = PropertyDescriptor::new_data_descriptor(Value::Null);
        assert!(data.is_data_descriptor());
        assert!(!data.is_accessor_descriptor());

        let accessor = PropertyDescriptor::new_accessor_descriptor(None, None, false);
        assert!(accessor.is_accessor_descriptor());
        assert!(!accessor.is_data_descriptor());

        let generic = PropertyDescriptor {
            enumerable: Some(false),
            ..Default::default()
        };
        assert!(generic.is_generic_descriptor());
    }
}
