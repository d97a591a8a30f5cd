//! Declaration entities registered into scopes
//!
//! These are the values the grammar driver creates once during tree
//! construction and registers into exactly one scope. The core components
//! only read and annotate them.

use std::fmt::Display;

use indexmap::IndexMap;

use crate::ty::{Fn, GenericBinding, Type};

/// A `let`-declared binding: a variable in a scope, or a field of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct LetBinding<'input> {
    /// The binding's data type
    pub ty: Type<'input>,
    /// Whether the binding may be reassigned
    pub mutable: bool,
}

impl<'input> LetBinding<'input> {
    /// Create an immutable binding of the given type.
    #[must_use]
    pub fn immutable(ty: Type<'input>) -> Self {
        Self { ty, mutable: false }
    }

    /// Create a mutable binding of the given type.
    #[must_use]
    pub fn mutable(ty: Type<'input>) -> Self {
        Self { ty, mutable: true }
    }
}

impl Display for LetBinding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.mutable {
            write!(f, "mut ")?;
        }
        write!(f, "{}", self.ty)
    }
}

/// One argument of a function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionArgument<'input> {
    /// The argument's name
    pub name: &'input str,
    /// The argument's declared type
    pub ty: Type<'input>,
    /// Whether the argument may be reassigned within the body
    pub mutable: bool,
}

impl Display for FunctionArgument<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.mutable {
            write!(f, "mut ")?;
        }
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// The header of a declared function: its name and signature, plus any
/// generic parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionHeader<'input> {
    /// The function's name
    pub name: &'input str,
    /// The function's signature
    pub signature: Fn<'input>,
    /// Generic parameters declared on the function. Ordered by declaration
    /// order.
    pub generics: IndexMap<&'input str, GenericBinding<'input>>,
    /// Whether the function declares any generic parameters
    pub is_generic: bool,
}

impl<'input> FunctionHeader<'input> {
    /// Create a non-generic function header from a name and signature.
    #[must_use]
    pub fn new(name: &'input str, signature: Fn<'input>) -> Self {
        Self {
            name,
            signature,
            generics: IndexMap::new(),
            is_generic: false,
        }
    }
}

impl Display for FunctionHeader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.signature)
    }
}

/// A foreign declaration block: a linkage name and the function headers it
/// exposes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternDeclaration<'input> {
    /// The name the block is registered under
    pub name: &'input str,
    /// The linkage convention, e.g. `"C"`
    pub linkage: &'input str,
    /// The foreign functions this block exposes. Ordered by declaration
    /// order.
    pub methods: IndexMap<&'input str, FunctionHeader<'input>>,
}

/// An import of another unit's declaration by dotted path, optionally
/// aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct Import<'input> {
    /// The dotted path to the imported declaration
    pub path: Vec<&'input str>,
    /// The alias the import is known by locally, if one was written
    pub alias: Option<&'input str>,
}

impl<'input> Import<'input> {
    /// The name this import is looked up by: the alias when present,
    /// otherwise the last path segment.
    ///
    /// # Panics
    /// Panics if the import path is empty, which the grammar driver never
    /// produces.
    #[must_use]
    pub fn lookup_name(&self) -> &'input str {
        self.alias.unwrap_or_else(|| {
            self.path
                .last()
                .copied()
                .expect("import path should never be empty")
        })
    }
}
