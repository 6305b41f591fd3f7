//! Unit tests for Value

use core_types::{ObjectId, Value};
use num_bigint::BigInt;

#[test]
fn smi_and_double_are_numbers() {
    assert_eq!(Value::Smi(-1).type_of(), "number");
    assert_eq!(Value::Double(0.5).type_of(), "number");
}

#[test]
fn null_type_of_is_object() {
    assert_eq!(Value::Null.type_of(), "object");
}

#[test]
fn bigint_displays_with_suffix() {
    assert_eq!(Value::BigInt(BigInt::from(12)).to_string(), "12n");
}

#[test]
fn double_display_special_values() {
    assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
    assert_eq!(Value::Double(f64::INFINITY).to_string(), "Infinity");
    assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
    assert_eq!(Value::Double(1.5).to_string(), "1.5");
}

#[test]
fn object_values_compare_by_identity() {
    let a = Value::Object(ObjectId::new(1, 0));
    let b = Value::Object(ObjectId::new(1, 0));
    let stale = Value::Object(ObjectId::new(1, 1));
    assert_eq!(a, b);
    assert_ne!(a, stale);
}

#[test]
fn conversions_from_rust_primitives() {
    assert_eq!(Value::from(42), Value::Smi(42));
    assert_eq!(Value::from(true), Value::Boolean(true));
    assert_eq!(Value::from("boom"), Value::String("boom".to_string()));
}

#[test]
fn empty_string_is_falsy() {
    assert!(!Value::from("").is_truthy());
    assert!(Value::from("x").is_truthy());
}
