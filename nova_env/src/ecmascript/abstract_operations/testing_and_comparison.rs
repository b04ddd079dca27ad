// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [7.2 Testing and Comparison Operations](https://tc39.es/ecma262/#sec-testing-and-comparison-operations)

use crate::ecmascript::types::Value;

/// ### [7.2.9 SameValue ( x, y )](https://tc39.es/ecma262/#sec-samevalue)
///
/// The abstract operation SameValue takes arguments x (an ECMAScript language
/// value) and y (an ECMAScript language value) and returns a Boolean. It
/// determines whether or not the two arguments are the same value.
///
/// Strings are interned so handle equality is content equality.
pub fn same_value(x: Value, y: Value) -> bool {
    match (x, y) {
        // 2. If x is a Number, then
        //    a. Return Number::sameValue(x, y).
        (Value::Number(x), Value::Number(y)) => {
            if x.is_nan() && y.is_nan() {
                return true;
            }
            x.to_bits() == y.to_bits() || (x == y && x != 0.0)
        }
        // 3. Return SameValueNonNumber(x, y).
        (x, y) => x == y,
    }
}

#[cfg(test)]
mod tests {
    use super::same_value;
    use crate::ecmascript::types::Value;

    #[test]
    fn same_value_distinguishes_zeroes() {
        assert!(same_value(Value::Number(f64::NAN), Value::Number(f64::NAN)));
        assert!(!same_value(Value::Number(0.0), Value::Number(-0.0)));
        assert!(same_value(Value::Number(1.5), Value::Number(1.5)));
        assert!(!same_value(Value::Undefined, Value::Null));
        assert!(same_value(Value::Boolean(true), Value::Boolean(true)));
    }
}
