//! Parent-linked scopes for variable binding.
//!
//! An [`Environment`] is a shared handle to one [`Scope`]. Call frames and
//! modules each get a fresh scope whose parent is the closure's captured
//! environment (or the global scope); blocks and loops do not open scopes.
//! Closures keep their scope alive by holding a clone of the handle, and
//! lookups through it are live: later rebinding is visible.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hml_ir::Name;

use crate::value::Value;

/// Whether a variable binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// `let` and parameters.
    Mutable,
    /// `const`, imports, builtins and type names.
    Immutable,
}

impl Mutability {
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Error returned by [`Environment::assign`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// The nearest binding is immutable.
    Immutable,
    /// No scope in the chain binds the name.
    Undefined,
}

/// A single-threaded shared cell for scopes.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

/// A variable binding.
#[derive(Clone, Debug)]
struct Binding {
    name: Name,
    value: Value,
    mutability: Mutability,
}

/// Bindings of one scope in definition order, plus the parent link.
///
/// Scopes are small; a linear scan beats hashing for the common case.
#[derive(Default)]
pub struct Scope {
    bindings: Vec<Binding>,
    parent: Option<Environment>,
}

impl Scope {
    fn find(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| &*b.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings.iter_mut().find(|b| &*b.name == name)
    }
}

/// Shared handle to a scope.
#[derive(Clone)]
pub struct Environment {
    scope: LocalScope<Scope>,
}

impl Environment {
    /// A root scope with no parent.
    pub fn new() -> Self {
        Environment {
            scope: LocalScope::new(Scope::default()),
        }
    }

    /// A fresh scope whose parent is `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Environment {
            scope: LocalScope::new(Scope {
                bindings: Vec::new(),
                parent: Some(self.clone()),
            }),
        }
    }

    pub fn parent(&self) -> Option<Environment> {
        self.scope.borrow().parent.clone()
    }

    /// Bind `name` in this scope. An existing binding of the same name in
    /// this scope is overwritten in place, so a scope never holds two
    /// bindings with one name.
    ///
    /// Redefinition can make a binding immutable but never mutable again:
    /// a `let` over a `const` or an import replaces the value and keeps the
    /// binding immutable.
    pub fn define(&self, name: Name, value: Value, mutability: Mutability) {
        let mut scope = self.scope.borrow_mut();
        if let Some(binding) = scope.find_mut(&name) {
            binding.value = value;
            if !mutability.is_mutable() {
                binding.mutability = mutability;
            }
        } else {
            scope.bindings.push(Binding {
                name,
                value,
                mutability,
            });
        }
    }

    /// Look `name` up in this scope, then in each parent.
    pub fn get(&self, name: &str) -> Option<Value> {
        let scope = self.scope.borrow();
        if let Some(binding) = scope.find(name) {
            return Some(binding.value.clone());
        }
        scope.parent.as_ref()?.get(name)
    }

    /// Overwrite the nearest existing binding of `name`.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), AssignError> {
        let parent = {
            let mut scope = self.scope.borrow_mut();
            if let Some(binding) = scope.find_mut(name) {
                if !binding.mutability.is_mutable() {
                    return Err(AssignError::Immutable);
                }
                binding.value = value;
                return Ok(());
            }
            scope.parent.clone()
        };
        match parent {
            Some(parent) => parent.assign(name, value),
            None => Err(AssignError::Undefined),
        }
    }

    /// Whether this scope itself (not a parent) binds `name`.
    pub fn contains_local(&self, name: &str) -> bool {
        self.scope.borrow().find(name).is_some()
    }

    /// Names bound directly in this scope, in definition order.
    pub fn local_names(&self) -> Vec<Name> {
        self.scope
            .borrow()
            .bindings
            .iter()
            .map(|b| b.name.clone())
            .collect()
    }

    /// Whether both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        self.scope.ptr_eq(&other.scope)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// Scopes reach closures that reach scopes; print names only.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.local_names())
            .field("has_parent", &self.scope.borrow().parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests;
