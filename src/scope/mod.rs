//! Lexically nested name tables.
//!
//! A scope maps names to values and points at an optional parent. The
//! analyzer instantiates `Scope<Type>`, the evaluator
//! `Scope<RuntimeValue>`; both push a child on entering a lexical block
//! and restore the parent on the way out.
//!
//! Two lookups exist on purpose: the current-only form backs
//! redeclaration checks, the inherited form walks the parent chain the
//! way name resolution does. `define` always writes into the current
//! scope (shadowing), `set` rebinds the nearest existing binding and
//! reports failure when there is none.

use std::{collections::HashMap, fmt};

use crate::utils::RcCell;

/// A lexically nested mapping from names to values. Cloning the handle
/// aliases the same table, so a function value and the evaluator can both
/// hold the scope the function was defined in.
pub struct Scope<T> {
	data: RcCell<ScopeData<T>>,
}

struct ScopeData<T> {
	parent:   Option<Scope<T>>,
	bindings: HashMap<String, T>,
}

impl<T> Clone for Scope<T> {
	fn clone(&self) -> Self { Self { data: self.data.clone() } }
}

impl<T: Clone> Scope<T> {
	pub fn new(parent: Option<Scope<T>>) -> Self {
		Self { data: RcCell::new(ScopeData { parent, bindings: HashMap::new() }) }
	}

	/// A fresh child scope with `self` as its parent.
	pub fn child(&self) -> Self { Self::new(Some(self.clone())) }

	/// Adds a binding to this scope, shadowing any parent binding.
	pub fn define(&self, name: impl Into<String>, value: T) {
		self.data.borrow_mut().bindings.insert(name.into(), value);
	}

	/// Returns the nearest binding, or with `current_only` just this
	/// scope's own binding.
	pub fn get(&self, name: &str, current_only: bool) -> Option<T> {
		let data = self.data.borrow();
		if let Some(value) = data.bindings.get(name) {
			return Some(value.clone());
		}
		if current_only {
			return None;
		}
		data.parent.as_ref().and_then(|parent| parent.get(name, false))
	}

	/// Rebinds the nearest existing binding. Returns false when no scope
	/// in the chain defines `name`.
	pub fn set(&self, name: &str, value: T) -> bool {
		let mut data = self.data.borrow_mut();
		if data.bindings.contains_key(name) {
			data.bindings.insert(name.to_string(), value);
			return true;
		}
		match &data.parent {
			Some(parent) => parent.set(name, value),
			None => false,
		}
	}

	/// True when both handles refer to the same scope. Object types and
	/// object values compare by this identity.
	pub fn ptr_eq(&self, other: &Self) -> bool { self.data.ptr_eq(&other.data) }
}

impl<T> fmt::Debug for Scope<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = self.data.borrow();
		let mut names: Vec<&String> = data.bindings.keys().collect();
		names.sort();
		f.debug_struct("Scope").field("bindings", &names).field("has_parent", &data.parent.is_some()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn define_and_get() {
		let scope: Scope<i32> = Scope::new(None);
		scope.define("x", 1);
		assert_eq!(scope.get("x", true), Some(1));
		assert_eq!(scope.get("x", false), Some(1));
		assert_eq!(scope.get("y", false), None);
	}

	#[test]
	fn inherited_lookup_walks_parents() {
		let parent: Scope<i32> = Scope::new(None);
		parent.define("x", 1);
		let child = parent.child();
		assert_eq!(child.get("x", false), Some(1));
		assert_eq!(child.get("x", true), None);
	}

	#[test]
	fn define_shadows_parent() {
		let parent: Scope<i32> = Scope::new(None);
		parent.define("x", 1);
		let child = parent.child();
		child.define("x", 2);
		assert_eq!(child.get("x", false), Some(2));
		assert_eq!(parent.get("x", false), Some(1));
	}

	#[test]
	fn set_rebinds_nearest() {
		let parent: Scope<i32> = Scope::new(None);
		parent.define("x", 1);
		let child = parent.child();
		assert!(child.set("x", 2));
		assert_eq!(parent.get("x", true), Some(2));
		assert_eq!(child.get("x", true), None);
	}

	#[test]
	fn set_without_binding_fails() {
		let scope: Scope<i32> = Scope::new(None);
		assert!(!scope.set("missing", 1));
	}

	#[test]
	fn ptr_eq_is_identity() {
		let scope: Scope<i32> = Scope::new(None);
		let alias = scope.clone();
		let other: Scope<i32> = Scope::new(None);
		assert!(scope.ptr_eq(&alias));
		assert!(!scope.ptr_eq(&other));
	}
}
