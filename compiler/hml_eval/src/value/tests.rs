use hml_ir::TypeKind;
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn truthiness() {
    assert!(!Value::I32(0).is_truthy());
    assert!(!Value::U8(0).is_truthy());
    assert!(!Value::F64(0.0).is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(!Value::Null.is_truthy());
    assert!(Value::I8(-1).is_truthy());
    assert!(Value::F32(0.5).is_truthy());
    assert!(Value::string("").is_truthy());
    assert!(Value::Object(ObjectRef::default()).is_truthy());
}

#[test]
fn display_formats() {
    assert_eq!(Value::I32(-42).to_string(), "-42");
    assert_eq!(Value::U32(4_000_000_000).to_string(), "4000000000");
    assert_eq!(Value::F64(2.5).to_string(), "2.5");
    assert_eq!(Value::F32(0.1).to_string(), "0.1");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::string("hi").to_string(), "hi");
    assert_eq!(Value::buffer(4).to_string(), "<buffer length=4 capacity=4>");
    assert_eq!(Value::Type(TypeKind::U16).to_string(), "<type u16>");
    assert_eq!(Value::Object(ObjectRef::default()).to_string(), "<object>");
}

#[test]
fn invalid_utf8_prints_lossily() {
    let value = Value::Str(SharedBytes::new(vec![b'a', 0xFF, b'b']));
    assert_eq!(value.to_string(), "a\u{FFFD}b");
}

#[test]
fn strings_alias_their_storage() {
    let a = Value::string("abc");
    let b = a.clone();
    if let Value::Str(bytes) = &b {
        bytes.borrow_mut()[0] = b'Z';
    }
    assert_eq!(a.to_string(), "Zbc");
}

#[test]
fn string_equality_is_by_content() {
    assert_eq!(Value::string("abc"), Value::string("abc"));
    assert_ne!(Value::string("abc"), Value::string("abd"));
}

#[test]
fn buffers_and_objects_compare_by_identity() {
    let buffer = Value::buffer(2);
    assert_eq!(buffer, buffer.clone());
    assert_ne!(buffer, Value::buffer(2));

    let object = Value::Object(ObjectRef::default());
    assert_eq!(object, object.clone());
    assert_ne!(object, Value::Object(ObjectRef::default()));
}

#[test]
fn object_fields_keep_insertion_order() {
    let object = ObjectRef::new([
        (Name::from("b"), Value::I32(1)),
        (Name::from("a"), Value::I32(2)),
        (Name::from("b"), Value::I32(3)),
    ]);
    object.set(Name::from("c"), Value::Null);

    let names: Vec<String> = object.field_names().iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["b", "a", "c"]);
    assert_eq!(object.get("b"), Some(Value::I32(3)));
    assert_eq!(object.get("missing"), None);
}

#[test]
fn numeric_accessors() {
    assert_eq!(Value::U32(7).as_i64(), Some(7));
    assert_eq!(Value::F64(1.5).as_i64(), None);
    assert_eq!(Value::I16(-3).as_f64(), Some(-3.0));
    assert_eq!(Value::I32(-1).as_usize(), None);
    assert_eq!(Value::Bool(true).as_i64(), None);
}

#[test]
fn type_names() {
    assert_eq!(Value::U16(1).type_name(), "u16");
    assert_eq!(Value::string("").type_name(), "string");
    assert_eq!(Value::Null.type_name(), "null");
    assert_eq!(Value::Type(TypeKind::I8).type_name(), "type");
}
