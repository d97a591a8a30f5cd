//! Type representation for the Vesper semantic core
//!
//! Note: types are not assigned a span, because they may be obtained from an
//! arbitrary location in the program (and simply inferred). The tree nodes
//! that *mention* a type in the source carry their own spans.

use std::{collections::HashSet, fmt::Display};

use indexmap::IndexMap;
use vsp_diagnostics::DiagnosticKind;

use crate::{
    decl::{FunctionArgument, LetBinding},
    scope::{ScopeArena, ScopeId},
};

/// The underlying kind of a type once `Reference`, `Union` and `Join` layers
/// have been stripped away.
///
/// Obtained with [`Type::base_kind`]. Two algebraic sides that disagree on
/// their base kind normalize to [`BaseKind::Invalid`], as does a reference
/// chain that revisits itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BaseKind {
    /// `i8`
    #[display("i8")]
    I8,
    /// `u8`
    #[display("u8")]
    U8,
    /// `i16`
    #[display("i16")]
    I16,
    /// `u16`
    #[display("u16")]
    U16,
    /// `i32`
    #[display("i32")]
    I32,
    /// `u32`
    #[display("u32")]
    U32,
    /// `i64`
    #[display("i64")]
    I64,
    /// `u64`
    #[display("u64")]
    U64,
    /// `f32`
    #[display("f32")]
    F32,
    /// `f64`
    #[display("f64")]
    F64,
    /// `bool`
    #[display("bool")]
    Bool,
    /// `char`
    #[display("char")]
    Char,
    /// `str`
    #[display("str")]
    Str,
    /// `void`
    #[display("void")]
    Void,
    /// `[N]T`
    #[display("array")]
    Array,
    /// A structural `struct`
    #[display("struct")]
    Struct,
    /// A structural `interface`
    #[display("interface")]
    Interface,
    /// A nominal `class`
    #[display("class")]
    Class,
    /// A tagged `variant`
    #[display("variant")]
    Variant,
    /// `fn(A, B) -> T`
    #[display("fn")]
    Fn,
    /// `*T`
    #[display("ptr")]
    Ptr,
    /// An actor-like `process`
    #[display("process")]
    Process,
    /// A free generic parameter
    #[display("generic")]
    Generic,
    /// A placeholder that has not been resolved yet
    #[display("unresolved")]
    Unresolved,
    /// Marker for an illegal union/join or an unresolvable reference chain
    #[display("invalid")]
    Invalid,
}

impl BaseKind {
    /// The rank of `f64`, the top of the numeric ladder.
    const DOUBLE_RANK: u8 = 10;

    /// The position of this kind on the numeric ladder, or [`None`] if it is
    /// not numeric. `f64` sits at the top.
    #[must_use]
    pub const fn numeric_rank(&self) -> Option<u8> {
        Some(match *self {
            Self::I8 => 1,
            Self::U8 => 2,
            Self::I16 => 3,
            Self::U16 => 4,
            Self::I32 => 5,
            Self::U32 => 6,
            Self::I64 => 7,
            Self::U64 => 8,
            Self::F32 => 9,
            Self::F64 => Self::DOUBLE_RANK,
            _ => return None,
        })
    }

    /// Returns `true` if this is a numeric kind strictly below the `f64`
    /// rank. Casts between two such kinds are always legal.
    #[must_use]
    pub const fn is_below_double_rank(&self) -> bool {
        matches!(self.numeric_rank(), Some(rank) if rank < Self::DOUBLE_RANK)
    }
}

/// A free generic parameter, possibly constrained (`T: Shape`)
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParam<'input> {
    /// The parameter's name
    pub name: &'input str,
    /// The constraint the parameter must satisfy, if any
    pub constraint: Option<Box<Type<'input>>>,
}

/// One entry of a type's generic parameter list: either still free, or bound
/// to a concrete type.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericBinding<'input> {
    /// A free parameter declared on this type
    Free(GenericParam<'input>),
    /// A parameter bound to a concrete type
    Bound(Type<'input>),
}

/// Data attached to a [`TypeKind::Fn`]
#[derive(Debug, Clone, PartialEq)]
pub struct Fn<'input> {
    /// The function's arguments, keyed by name. Ordered by declaration
    /// order.
    pub arguments: IndexMap<&'input str, FunctionArgument<'input>>,
    /// The function's return type. [`None`] means the function returns
    /// nothing.
    pub returns: Option<Box<Type<'input>>>,
}

impl Display for Fn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fn({})",
            self.arguments
                .values()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        match &self.returns {
            Some(returns) => write!(f, " -> {returns}"),
            None => Ok(()),
        }
    }
}

/// Data attached to a [`TypeKind::Struct`]
#[derive(Debug, Clone, PartialEq)]
pub struct StructType<'input> {
    /// The scope owned by this struct's body
    pub owned_scope: ScopeId,
    /// The struct's attributes. Ordered by declaration order.
    pub attributes: IndexMap<&'input str, Type<'input>>,
    /// The types this struct extends
    pub extends: Vec<Type<'input>>,
}

/// Data attached to a [`TypeKind::Interface`]
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType<'input> {
    /// The scope owned by this interface's body
    pub owned_scope: ScopeId,
    /// The interface's method signatures. Ordered by declaration order.
    pub methods: IndexMap<&'input str, Fn<'input>>,
    /// The types this interface extends
    pub extends: Vec<Type<'input>>,
}

/// Data attached to a [`TypeKind::Class`]
#[derive(Debug, Clone, PartialEq)]
pub struct ClassType<'input> {
    /// The scope owned by this class's body. Flagged `within_class` and
    /// back-linked to the class itself.
    pub owned_scope: ScopeId,
    /// The class's methods. Ordered by declaration order.
    pub methods: IndexMap<&'input str, Fn<'input>>,
    /// The class's fields, which are `let`-declarations. Ordered by
    /// declaration order.
    pub fields: IndexMap<&'input str, LetBinding<'input>>,
    /// The types this class extends
    pub extends: Vec<Type<'input>>,
}

/// A single constructor of a [`TypeKind::Variant`]
#[derive(Debug, Clone, PartialEq)]
pub struct VariantConstructor<'input> {
    /// The constructor's arguments, keyed by name. Ordered by declaration
    /// order.
    pub arguments: IndexMap<&'input str, Type<'input>>,
}

/// Data attached to a [`TypeKind::Variant`]
#[derive(Debug, Clone, PartialEq)]
pub struct VariantType<'input> {
    /// The scope owned by this variant's body
    pub owned_scope: ScopeId,
    /// The variant's constructors. Ordered by declaration order.
    pub constructors: IndexMap<&'input str, VariantConstructor<'input>>,
}

/// Data attached to a [`TypeKind::Process`]
///
/// A process is an actor-like unit with constructor arguments, an
/// input/output type pair, and a body that must define a `receive` handler.
/// The core performs no actor scheduling; it only validates the handler's
/// presence (see [`crate::check`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessType<'input> {
    /// The process's constructor arguments. Ordered by declaration order.
    pub arguments: IndexMap<&'input str, Type<'input>>,
    /// The type of messages the process accepts
    pub input: Box<Type<'input>>,
    /// The type of messages the process emits
    pub output: Box<Type<'input>>,
    /// The scope owned by this process's body
    pub owned_scope: ScopeId,
    /// The handlers declared in the process body. A well-formed process
    /// declares exactly one, named `receive`.
    pub handlers: IndexMap<&'input str, Fn<'input>>,
}

/// Data attached to a [`TypeKind::Reference`]
///
/// A reference names another type, either by an already-resolved link or by a
/// dotted path to be looked up through the scope chain. A reference with
/// neither is an error state, not a silent no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceType<'input> {
    /// The resolved target, once resolution has happened
    pub resolved: Option<Box<Type<'input>>>,
    /// The dotted path naming the target, before resolution
    pub path: Option<Vec<&'input str>>,
    /// The scope the reference occurred in; unresolved paths are looked up
    /// from here
    pub scope: ScopeId,
}

/// The possible shapes of a Vesper type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind<'input> {
    // WHENEVER ADDING NEW PRIMITIVES HERE, ADD THEM TO THE ROOT TYPE TABLE IN
    // [`crate::scope::ScopeArena::new`].
    /// `i8`
    I8,
    /// `u8`
    U8,
    /// `i16`
    I16,
    /// `u16`
    U16,
    /// `i32`
    I32,
    /// `u32`
    U32,
    /// `i64`
    I64,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `str`
    Str,
    /// `void`
    Void,
    /// `[N]T`
    Array {
        /// The element type
        element: Box<Type<'input>>,
        /// The number of elements
        length: u64,
    },
    /// A structural `struct` type
    Struct(StructType<'input>),
    /// A structural `interface` type
    Interface(InterfaceType<'input>),
    /// A nominal `class` type
    Class(ClassType<'input>),
    /// A tagged `variant` type
    Variant(VariantType<'input>),
    /// `fn(A, B) -> T`
    Fn(Fn<'input>),
    /// `*T`
    Ptr(Box<Type<'input>>),
    /// A by-path or by-link placeholder naming another type
    Reference(ReferenceType<'input>),
    /// `A | B` -- a value satisfies exactly one operand
    Union(Box<Type<'input>>, Box<Type<'input>>),
    /// `A & B` -- a value satisfies both operands simultaneously
    Join(Box<Type<'input>>, Box<Type<'input>>),
    /// An actor-like `process` type
    Process(ProcessType<'input>),
    /// A free generic parameter in scope
    Generic(GenericParam<'input>),
    /// A placeholder used before resolution
    Unresolved,
}

/// A complete Vesper type: a [`TypeKind`] plus the data every type carries
/// regardless of kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Type<'input> {
    /// The shape of this type
    pub kind: TypeKind<'input>,
    /// The display name this type was declared under, if any
    pub name: Option<&'input str>,
    /// Whether the type admits null
    pub nullable: bool,
    /// Generic parameters declared on (or bound into) this type. Ordered by
    /// declaration order.
    pub generics: IndexMap<&'input str, GenericBinding<'input>>,
}

impl<'input> Type<'input> {
    /// Create a type of the given kind with no name, no nullability and no
    /// generics.
    #[must_use]
    pub fn new(kind: TypeKind<'input>) -> Self {
        Self {
            kind,
            name: None,
            nullable: false,
            generics: IndexMap::new(),
        }
    }

    /// Create an empty struct type owning a fresh scope parented to the
    /// scope the declaration occurs in.
    #[must_use]
    pub fn structure(scopes: &mut ScopeArena<'input>, parent: ScopeId) -> Self {
        let owned_scope = scopes.subscope(parent);
        Self::new(TypeKind::Struct(StructType {
            owned_scope,
            attributes: IndexMap::new(),
            extends: Vec::new(),
        }))
    }

    /// Create an empty interface type owning a fresh scope.
    #[must_use]
    pub fn interface(scopes: &mut ScopeArena<'input>, parent: ScopeId) -> Self {
        let owned_scope = scopes.subscope(parent);
        Self::new(TypeKind::Interface(InterfaceType {
            owned_scope,
            methods: IndexMap::new(),
            extends: Vec::new(),
        }))
    }

    /// Create an empty class type owning a fresh scope. The scope is marked
    /// `within_class`; once the class's members are final the driver
    /// back-links the scope to the class with
    /// [`ScopeArena::attach_class`].
    #[must_use]
    pub fn class(scopes: &mut ScopeArena<'input>, parent: ScopeId) -> Self {
        let owned_scope = scopes.subscope_class(parent);
        Self::new(TypeKind::Class(ClassType {
            owned_scope,
            methods: IndexMap::new(),
            fields: IndexMap::new(),
            extends: Vec::new(),
        }))
    }

    /// Create an empty variant type owning a fresh scope.
    #[must_use]
    pub fn variant(scopes: &mut ScopeArena<'input>, parent: ScopeId) -> Self {
        let owned_scope = scopes.subscope(parent);
        Self::new(TypeKind::Variant(VariantType {
            owned_scope,
            constructors: IndexMap::new(),
        }))
    }

    /// Create a process type owning a fresh scope, with the given
    /// input/output message pair.
    #[must_use]
    pub fn process(
        scopes: &mut ScopeArena<'input>,
        parent: ScopeId,
        input: Self,
        output: Self,
    ) -> Self {
        let owned_scope = scopes.subscope(parent);
        Self::new(TypeKind::Process(ProcessType {
            arguments: IndexMap::new(),
            input: Box::new(input),
            output: Box::new(output),
            owned_scope,
            handlers: IndexMap::new(),
        }))
    }

    /// Create an unresolved by-path reference occurring in the given scope.
    #[must_use]
    pub fn reference(scope: ScopeId, path: Vec<&'input str>) -> Self {
        Self::new(TypeKind::Reference(ReferenceType {
            resolved: None,
            path: Some(path),
            scope,
        }))
    }

    /// Attach a display name to this type.
    #[must_use]
    pub fn named(mut self, name: &'input str) -> Self {
        self.name = Some(name);
        self
    }

    /// Normalize through `Union`, `Join` and `Reference` layers to find the
    /// single underlying [`BaseKind`].
    ///
    /// A union or join whose two sides disagree in base kind is
    /// [`BaseKind::Invalid`]. A reference chain that revisits a path is also
    /// [`BaseKind::Invalid`] -- this function always terminates, even on
    /// cyclic references.
    #[must_use]
    pub fn base_kind(&self, scopes: &ScopeArena<'input>) -> BaseKind {
        let mut visiting = HashSet::new();
        self.base_kind_visiting(scopes, &mut visiting)
    }

    /// [`Type::base_kind`] with the set of reference paths currently being
    /// resolved threaded through the recursion.
    pub(crate) fn base_kind_visiting(
        &self,
        scopes: &ScopeArena<'input>,
        visiting: &mut HashSet<(ScopeId, Vec<&'input str>)>,
    ) -> BaseKind {
        match &self.kind {
            TypeKind::I8 => BaseKind::I8,
            TypeKind::U8 => BaseKind::U8,
            TypeKind::I16 => BaseKind::I16,
            TypeKind::U16 => BaseKind::U16,
            TypeKind::I32 => BaseKind::I32,
            TypeKind::U32 => BaseKind::U32,
            TypeKind::I64 => BaseKind::I64,
            TypeKind::U64 => BaseKind::U64,
            TypeKind::F32 => BaseKind::F32,
            TypeKind::F64 => BaseKind::F64,
            TypeKind::Bool => BaseKind::Bool,
            TypeKind::Char => BaseKind::Char,
            TypeKind::Str => BaseKind::Str,
            TypeKind::Void => BaseKind::Void,
            TypeKind::Array { .. } => BaseKind::Array,
            TypeKind::Struct(_) => BaseKind::Struct,
            TypeKind::Interface(_) => BaseKind::Interface,
            TypeKind::Class(_) => BaseKind::Class,
            TypeKind::Variant(_) => BaseKind::Variant,
            TypeKind::Fn(_) => BaseKind::Fn,
            TypeKind::Ptr(_) => BaseKind::Ptr,
            TypeKind::Process(_) => BaseKind::Process,
            TypeKind::Generic(_) => BaseKind::Generic,
            TypeKind::Unresolved => BaseKind::Unresolved,
            TypeKind::Union(left, right) | TypeKind::Join(left, right) => {
                let left_kind = left.base_kind_visiting(scopes, visiting);
                let right_kind = right.base_kind_visiting(scopes, visiting);
                if left_kind == right_kind && left_kind != BaseKind::Invalid {
                    left_kind
                } else {
                    BaseKind::Invalid
                }
            }
            TypeKind::Reference(reference) => {
                if let Some(target) = &reference.resolved {
                    return target.base_kind_visiting(scopes, visiting);
                }
                let Some(path) = &reference.path else {
                    // neither a resolved target nor a path: error state
                    return BaseKind::Invalid;
                };
                let key = (reference.scope, path.clone());
                if !visiting.insert(key.clone()) {
                    // revisited this path: cyclic reference chain
                    return BaseKind::Invalid;
                }
                let kind = scopes
                    .resolve_type_path(reference.scope, path)
                    .map_or(BaseKind::Invalid, |target| {
                        target.base_kind_visiting(scopes, visiting)
                    });
                // Only the paths on the current chain count as revisits; a
                // sibling branch reaching the same definition is not a cycle.
                visiting.remove(&key);
                kind
            }
        }
    }

    /// Normalize through `Reference` layers to the underlying definition,
    /// returning a clone of it. `Union` and `Join` layers are kept.
    ///
    /// # Errors
    /// - [`DiagnosticKind::UnableToResolveType`] if a path does not resolve
    ///   or a reference chain is cyclic;
    /// - [`DiagnosticKind::InternalInvariantViolation`] if a reference has
    ///   neither a resolved target nor a path.
    pub fn normalized(&self, scopes: &ScopeArena<'input>) -> Result<Self, DiagnosticKind> {
        let mut visiting = HashSet::new();
        self.normalized_visiting(scopes, &mut visiting)
    }

    /// [`Type::normalized`] with the visiting set threaded through.
    fn normalized_visiting(
        &self,
        scopes: &ScopeArena<'input>,
        visiting: &mut HashSet<(ScopeId, Vec<&'input str>)>,
    ) -> Result<Self, DiagnosticKind> {
        let TypeKind::Reference(reference) = &self.kind else {
            return Ok(self.clone());
        };

        if let Some(target) = &reference.resolved {
            return target.normalized_visiting(scopes, visiting);
        }

        let Some(path) = &reference.path else {
            return Err(DiagnosticKind::InternalInvariantViolation(
                "reference has neither a resolved target nor a path".to_string(),
            ));
        };

        let key = (reference.scope, path.clone());
        if !visiting.insert(key.clone()) {
            return Err(DiagnosticKind::UnableToResolveType(path.join(".")));
        }

        let normalized = scopes
            .resolve_type_path(reference.scope, path)
            .ok_or_else(|| DiagnosticKind::UnableToResolveType(path.join(".")))
            .and_then(|target| target.normalized_visiting(scopes, visiting));
        visiting.remove(&key);
        normalized
    }
}

impl Display for Type<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = self.name {
            write!(f, "{name}")?;
        } else {
            match &self.kind {
                TypeKind::I8 => write!(f, "i8")?,
                TypeKind::U8 => write!(f, "u8")?,
                TypeKind::I16 => write!(f, "i16")?,
                TypeKind::U16 => write!(f, "u16")?,
                TypeKind::I32 => write!(f, "i32")?,
                TypeKind::U32 => write!(f, "u32")?,
                TypeKind::I64 => write!(f, "i64")?,
                TypeKind::U64 => write!(f, "u64")?,
                TypeKind::F32 => write!(f, "f32")?,
                TypeKind::F64 => write!(f, "f64")?,
                TypeKind::Bool => write!(f, "bool")?,
                TypeKind::Char => write!(f, "char")?,
                TypeKind::Str => write!(f, "str")?,
                TypeKind::Void => write!(f, "void")?,
                TypeKind::Array { element, length } => write!(f, "[{length}]{element}")?,
                TypeKind::Struct(data) => write!(
                    f,
                    "struct {{ {} }}",
                    data.attributes
                        .iter()
                        .map(|(key, ty)| format!("{key}: {ty}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                )?,
                TypeKind::Interface(data) => write!(
                    f,
                    "interface {{ {} }}",
                    data.methods
                        .iter()
                        .map(|(key, signature)| format!("{key}: {signature}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                )?,
                TypeKind::Class(_) => write!(f, "class {{ .. }}")?,
                TypeKind::Variant(data) => write!(
                    f,
                    "variant {{ {} }}",
                    data.constructors.keys().copied().collect::<Vec<_>>().join(" | ")
                )?,
                TypeKind::Fn(signature) => write!(f, "{signature}")?,
                TypeKind::Ptr(target) => write!(f, "*{target}")?,
                TypeKind::Reference(reference) => match (&reference.resolved, &reference.path) {
                    (Some(target), _) => write!(f, "{target}")?,
                    (None, Some(path)) => write!(f, "{}", path.join("."))?,
                    (None, None) => write!(f, "<unbound reference>")?,
                },
                TypeKind::Union(left, right) => write!(f, "{left} | {right}")?,
                TypeKind::Join(left, right) => write!(f, "{left} & {right}")?,
                TypeKind::Process(data) => {
                    write!(f, "process({} -> {})", data.input, data.output)?;
                }
                TypeKind::Generic(param) => write!(f, "{}", param.name)?,
                TypeKind::Unresolved => write!(f, "_")?,
            }
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}
