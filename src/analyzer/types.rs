//! The type algebra and its subtype lattice.
//!
//! Nine named types plus two structural ones. The named types are plain
//! tags; `Function` compares structurally and `Object` by the identity of
//! its member scope, so two object literals never share a type even when
//! their members line up.
//!
//! The lattice is deliberately small: `Any` sits on top, `Equatable`
//! covers everything `==` accepts, `Comparable` covers the four ordered
//! primitives, and everything else relates only to itself. It is encoded
//! as a predicate, not as inheritance.

use std::fmt::{self, Display};

use crate::scope::Scope;

#[derive(Debug, Clone)]
pub enum Type {
	Nil,
	Boolean,
	Integer,
	Decimal,
	String,
	/// Top of the lattice.
	Any,
	/// Anything `==` and `!=` accept.
	Equatable,
	/// The ordered primitives: Boolean, Integer, Decimal, String.
	Comparable,
	Iterable,
	Function(FunctionType),
	Object(ObjectType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
	pub parameters: Vec<Type>,
	pub returns:    Box<Type>,
}

impl FunctionType {
	pub fn new(parameters: Vec<Type>, returns: Type) -> Self {
		Self { parameters, returns: Box::new(returns) }
	}
}

/// An object type owns its member scope. The scope has no parent, so
/// members are reachable only through a receiver.
#[derive(Debug, Clone)]
pub struct ObjectType {
	pub scope: Scope<Type>,
}

impl PartialEq for Type {
	fn eq(&self, other: &Self) -> bool {
		use Type::*;
		match (self, other) {
			(Nil, Nil)
			| (Boolean, Boolean)
			| (Integer, Integer)
			| (Decimal, Decimal)
			| (String, String)
			| (Any, Any)
			| (Equatable, Equatable)
			| (Comparable, Comparable)
			| (Iterable, Iterable) => true,
			(Function(left), Function(right)) => left == right,
			(Object(left), Object(right)) => left.scope.ptr_eq(&right.scope),
			_ => false,
		}
	}
}

impl Type {
	pub fn is_subtype_of(&self, other: &Type) -> bool {
		if self == other || *other == Type::Any {
			return true;
		}
		match other {
			Type::Equatable => {
				matches!(self, Type::Nil | Type::Iterable) || self.is_subtype_of(&Type::Comparable)
			}
			Type::Comparable => matches!(self, Type::Boolean | Type::Integer | Type::Decimal | Type::String),
			_ => false,
		}
	}
}

/// The process-wide table of named types, used both to resolve
/// annotations and to reject object names that collide with a built-in
/// type.
pub fn lookup(name: &str) -> Option<Type> {
	Some(match name {
		"Nil" => Type::Nil,
		"Boolean" => Type::Boolean,
		"Integer" => Type::Integer,
		"Decimal" => Type::Decimal,
		"String" => Type::String,
		"Any" => Type::Any,
		"Equatable" => Type::Equatable,
		"Comparable" => Type::Comparable,
		"Iterable" => Type::Iterable,
		_ => return None,
	})
}

impl Display for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Type::Nil => write!(f, "Nil"),
			Type::Boolean => write!(f, "Boolean"),
			Type::Integer => write!(f, "Integer"),
			Type::Decimal => write!(f, "Decimal"),
			Type::String => write!(f, "String"),
			Type::Any => write!(f, "Any"),
			Type::Equatable => write!(f, "Equatable"),
			Type::Comparable => write!(f, "Comparable"),
			Type::Iterable => write!(f, "Iterable"),
			Type::Function(function) => {
				write!(f, "Function(")?;
				for (index, parameter) in function.parameters.iter().enumerate() {
					if index > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{parameter}")?;
				}
				write!(f, ") -> {}", function.returns)
			}
			Type::Object(_) => write!(f, "Object"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn subtyping_is_reflexive() {
		for ty in [Type::Nil, Type::Boolean, Type::Integer, Type::Decimal, Type::String, Type::Iterable] {
			assert!(ty.is_subtype_of(&ty));
		}
	}

	#[test]
	fn any_is_top() {
		assert!(Type::Nil.is_subtype_of(&Type::Any));
		assert!(Type::Iterable.is_subtype_of(&Type::Any));
		assert!(Type::Function(FunctionType::new(vec![], Type::Nil)).is_subtype_of(&Type::Any));
		assert!(!Type::Any.is_subtype_of(&Type::Integer));
	}

	#[test]
	fn comparable_members() {
		for ty in [Type::Boolean, Type::Integer, Type::Decimal, Type::String] {
			assert!(ty.is_subtype_of(&Type::Comparable));
		}
		assert!(!Type::Nil.is_subtype_of(&Type::Comparable));
		assert!(!Type::Iterable.is_subtype_of(&Type::Comparable));
	}

	#[test]
	fn equatable_members() {
		for ty in [Type::Nil, Type::Iterable, Type::Boolean, Type::Integer, Type::Decimal, Type::String] {
			assert!(ty.is_subtype_of(&Type::Equatable));
		}
		assert!(!Type::Any.is_subtype_of(&Type::Equatable));
	}

	#[test]
	fn subtyping_is_transitive_through_comparable() {
		// Integer <= Comparable and Comparable's members are Equatable,
		// so Integer <= Equatable without a direct rule for it.
		assert!(Type::Integer.is_subtype_of(&Type::Comparable));
		assert!(Type::Integer.is_subtype_of(&Type::Equatable));
	}

	#[test]
	fn function_types_compare_structurally() {
		let left = Type::Function(FunctionType::new(vec![Type::Integer], Type::Nil));
		let right = Type::Function(FunctionType::new(vec![Type::Integer], Type::Nil));
		let other = Type::Function(FunctionType::new(vec![Type::Decimal], Type::Nil));
		assert_eq!(left, right);
		assert_ne!(left, other);
		assert!(left.is_subtype_of(&right));
		assert!(!left.is_subtype_of(&other));
	}

	#[test]
	fn object_types_compare_by_scope_identity() {
		let scope: Scope<Type> = Scope::new(None);
		let left = Type::Object(ObjectType { scope: scope.clone() });
		let alias = Type::Object(ObjectType { scope });
		let other = Type::Object(ObjectType { scope: Scope::new(None) });
		assert_eq!(left, alias);
		assert_ne!(left, other);
	}

	#[test]
	fn lookup_covers_the_named_types() {
		for name in
			["Nil", "Boolean", "Integer", "Decimal", "String", "Any", "Equatable", "Comparable", "Iterable"]
		{
			assert!(lookup(name).is_some(), "missing type {name}");
		}
		assert!(lookup("Character").is_none());
		assert!(lookup("Point").is_none());
	}
}
