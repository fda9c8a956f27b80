use pretty_assertions::assert_eq;

use super::*;

fn name(text: &str) -> Name {
    Name::from(text)
}

#[test]
fn define_then_get() {
    let env = Environment::new();
    env.define(name("x"), Value::I32(42), Mutability::Mutable);
    assert_eq!(env.get("x"), Some(Value::I32(42)));
    assert_eq!(env.get("y"), None);
}

#[test]
fn redefine_overwrites_in_place() {
    let env = Environment::new();
    env.define(name("a"), Value::I32(1), Mutability::Mutable);
    env.define(name("b"), Value::I32(2), Mutability::Mutable);
    env.define(name("a"), Value::I32(3), Mutability::Immutable);

    let names: Vec<String> = env.local_names().iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(env.get("a"), Some(Value::I32(3)));
    assert_eq!(env.assign("a", Value::I32(4)), Err(AssignError::Immutable));
}

#[test]
fn redefine_never_loosens_immutable() {
    let env = Environment::new();
    env.define(name("c"), Value::I32(1), Mutability::Immutable);
    env.define(name("c"), Value::I32(2), Mutability::Mutable);

    assert_eq!(env.get("c"), Some(Value::I32(2)));
    assert_eq!(env.assign("c", Value::I32(3)), Err(AssignError::Immutable));
}

#[test]
fn child_shadows_parent() {
    let parent = Environment::new();
    parent.define(name("x"), Value::I32(1), Mutability::Mutable);

    let child = parent.child();
    child.define(name("x"), Value::I32(2), Mutability::Mutable);
    let sibling = parent.child();

    assert_eq!(child.get("x"), Some(Value::I32(2)));
    assert_eq!(sibling.get("x"), Some(Value::I32(1)));
    assert_eq!(parent.get("x"), Some(Value::I32(1)));
}

#[test]
fn assign_writes_nearest_owner() {
    let parent = Environment::new();
    parent.define(name("x"), Value::I32(1), Mutability::Mutable);
    let child = parent.child();

    assert_eq!(child.assign("x", Value::I32(5)), Ok(()));
    assert!(!child.contains_local("x"));
    assert_eq!(parent.get("x"), Some(Value::I32(5)));
}

#[test]
fn assign_to_missing_name_is_undefined() {
    let env = Environment::new().child();
    assert_eq!(env.assign("nope", Value::Null), Err(AssignError::Undefined));
}

#[test]
fn assign_respects_immutability_through_parents() {
    let parent = Environment::new();
    parent.define(name("k"), Value::I32(1), Mutability::Immutable);
    let child = parent.child();
    assert_eq!(child.assign("k", Value::I32(2)), Err(AssignError::Immutable));
    assert_eq!(parent.get("k"), Some(Value::I32(1)));
}

#[test]
fn clones_share_the_scope() {
    let env = Environment::new();
    let alias = env.clone();
    alias.define(name("late"), Value::Bool(true), Mutability::Mutable);
    assert_eq!(env.get("late"), Some(Value::Bool(true)));
    assert!(env.ptr_eq(&alias));
    assert!(!env.ptr_eq(&env.child()));
    assert!(env.child().parent().is_some_and(|p| p.ptr_eq(&env)));
}
