//! Scopes and name resolution
//!
//! All scopes of one compilation unit live in a single owning
//! [`ScopeArena`], indexed by [`ScopeId`]. Parent links and the class/function
//! back-references a scope may carry never form ownership cycles: the parent
//! direction is an index, and back-references hold clones of the owning
//! declaration, which the core only reads.
//!
//! Every scope partitions its names into four namespaces (variables,
//! functions, types and foreign declarations). A variable and a type may
//! share a name in one scope; two entries in one namespace may not.
//! Shadowing a name from an enclosing scope is always permitted.

use indexmap::IndexMap;
use vsp_diagnostics::DiagnosticKind;

use crate::{
    decl::{ExternDeclaration, FunctionHeader, LetBinding},
    ty::{Type, TypeKind},
};

/// Handle to a scope inside a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// The declaration a scope is owned by, when the scope needs to reach back
/// to it (class bodies and function bodies).
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeOwner<'input> {
    /// The scope is a class body; holds the owning class type
    Class(Type<'input>),
    /// The scope is a function body; holds the owning function's header
    Function(FunctionHeader<'input>),
}

/// A single lexical environment: four name tables plus flags describing the
/// enclosing context.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope<'input> {
    /// The enclosing scope, if any
    parent: Option<ScopeId>,
    /// `let`-declared variables. Ordered by declaration order.
    variables: IndexMap<&'input str, LetBinding<'input>>,
    /// Declared functions. Ordered by declaration order.
    functions: IndexMap<&'input str, FunctionHeader<'input>>,
    /// Declared types. Ordered by declaration order.
    types: IndexMap<&'input str, Type<'input>>,
    /// Foreign declaration blocks. Ordered by declaration order.
    externs: IndexMap<&'input str, ExternDeclaration<'input>>,
    /// `false` inside an `unsafe` region
    pub is_safe: bool,
    /// `true` inside a class body (and everything nested in it)
    pub within_class: bool,
    /// `true` inside a `sync` region
    pub within_sync: bool,
    /// `true` inside a function body
    pub is_function: bool,
    /// Back-reference to the owning declaration, set for class and function
    /// body scopes
    owner: Option<ScopeOwner<'input>>,
}

impl<'input> Scope<'input> {
    /// The enclosing scope, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// The owning declaration, if this scope is a class or function body.
    #[must_use]
    pub const fn owner(&self) -> Option<&ScopeOwner<'input>> {
        self.owner.as_ref()
    }
}

/// Which namespace (or extended member list) a name resolves into.
/// Produced by [`ScopeArena::lookup_symbol_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// A `let`-declared variable
    Variable,
    /// A declared function
    Function,
    /// A declared type
    Type,
    /// A foreign declaration block
    Extern,
    /// An argument of the enclosing function
    Argument,
    /// A method of the nearest enclosing class
    Method,
    /// A field of the nearest enclosing class
    Attribute,
    /// Nothing by that name is visible
    Undefined,
}

/// A borrowed view of whatever entity a name resolved to.
/// Produced by [`ScopeArena::resolve`].
#[derive(Debug, PartialEq)]
pub enum SymbolRef<'scope, 'input> {
    /// A `let`-declared variable
    Variable(&'scope LetBinding<'input>),
    /// A declared function
    Function(&'scope FunctionHeader<'input>),
    /// A declared type
    Type(&'scope Type<'input>),
    /// A foreign declaration block
    Extern(&'scope ExternDeclaration<'input>),
}

/// All types namable without declaration, seeded into the root scope
fn all_namable_types<'input>() -> [(&'input str, Type<'input>); 14] {
    [
        ("i8", Type::new(TypeKind::I8)),
        ("u8", Type::new(TypeKind::U8)),
        ("i16", Type::new(TypeKind::I16)),
        ("u16", Type::new(TypeKind::U16)),
        ("i32", Type::new(TypeKind::I32)),
        ("u32", Type::new(TypeKind::U32)),
        ("i64", Type::new(TypeKind::I64)),
        ("u64", Type::new(TypeKind::U64)),
        ("f32", Type::new(TypeKind::F32)),
        ("f64", Type::new(TypeKind::F64)),
        ("bool", Type::new(TypeKind::Bool)),
        ("char", Type::new(TypeKind::Char)),
        ("str", Type::new(TypeKind::Str)),
        ("void", Type::new(TypeKind::Void)),
    ]
}

/// The owning arena of every scope of one compilation unit.
// Cloning this would be an error, so it does not derive [Clone].
#[derive(Debug)]
pub struct ScopeArena<'input> {
    /// All scopes, in creation order. Index 0 is the program root.
    scopes: Vec<Scope<'input>>,
}

impl<'input> ScopeArena<'input> {
    /// Create an arena whose root scope contains just the primitive types.
    /// This is the normal initialization method.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Self::new_empty();
        for (name, ty) in all_namable_types() {
            arena.scopes[0].types.insert(name, ty);
        }
        arena
    }

    /// Create an arena whose root scope contains **nothing** -- not even
    /// primitives. This is most useful for testing.
    #[must_use]
    pub fn new_empty() -> Self {
        Self {
            scopes: vec![Scope {
                parent: None,
                variables: IndexMap::new(),
                functions: IndexMap::new(),
                types: IndexMap::new(),
                externs: IndexMap::new(),
                is_safe: true,
                within_class: false,
                within_sync: false,
                is_function: false,
                owner: None,
            }],
        }
    }

    /// The program root scope.
    #[must_use]
    pub const fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Access a scope by handle.
    ///
    /// # Panics
    /// Panics if the handle did not come from this arena.
    #[must_use]
    pub fn get(&self, id: ScopeId) -> &Scope<'input> {
        &self.scopes[id.0]
    }

    /// Create a plain child scope (a block or a type body), inheriting the
    /// parent's context flags.
    pub fn subscope(&mut self, parent: ScopeId) -> ScopeId {
        self.push_child(parent, |_| {})
    }

    /// Create a child scope for a class body. The new scope is flagged
    /// `within_class`; once the class's members are final,
    /// [`ScopeArena::attach_class`] back-links the scope to it.
    pub fn subscope_class(&mut self, parent: ScopeId) -> ScopeId {
        self.push_child(parent, |scope| scope.within_class = true)
    }

    /// Create a child scope for an `unsafe` region.
    pub fn subscope_unsafe(&mut self, parent: ScopeId) -> ScopeId {
        self.push_child(parent, |scope| scope.is_safe = false)
    }

    /// Create a child scope for a `sync` region.
    pub fn subscope_sync(&mut self, parent: ScopeId) -> ScopeId {
        self.push_child(parent, |scope| scope.within_sync = true)
    }

    /// Create a child scope for a function body, back-linked to the
    /// function's header.
    pub fn subscope_function(
        &mut self,
        parent: ScopeId,
        header: FunctionHeader<'input>,
    ) -> ScopeId {
        self.push_child(parent, |scope| {
            scope.is_function = true;
            scope.owner = Some(ScopeOwner::Function(header));
        })
    }

    /// Allocate a child of `parent` with inherited flags, then apply `adjust`
    /// to it.
    fn push_child(
        &mut self,
        parent: ScopeId,
        adjust: impl FnOnce(&mut Scope<'input>),
    ) -> ScopeId {
        let parent_scope = self.get(parent);
        let mut child = Scope {
            parent: Some(parent),
            variables: IndexMap::new(),
            functions: IndexMap::new(),
            types: IndexMap::new(),
            externs: IndexMap::new(),
            is_safe: parent_scope.is_safe,
            within_class: parent_scope.within_class,
            within_sync: parent_scope.within_sync,
            is_function: parent_scope.is_function,
            owner: None,
        };
        adjust(&mut child);
        let id = ScopeId(self.scopes.len());
        self.scopes.push(child);
        id
    }

    /// Back-link a class body scope to its completed class type.
    ///
    /// # Panics
    /// Panics if the scope was not created with
    /// [`ScopeArena::subscope_class`].
    pub fn attach_class(&mut self, scope: ScopeId, class: Type<'input>) {
        assert!(
            self.scopes[scope.0].within_class,
            "attach_class called on a non-class scope"
        );
        self.scopes[scope.0].owner = Some(ScopeOwner::Class(class));
    }

    /// Register a variable into a scope's variable namespace.
    ///
    /// # Errors
    /// [`DiagnosticKind::IdentifierAlreadyInUse`] if the name already exists
    /// in that namespace *in this scope only*; the scope is left unmodified.
    /// Shadowing a parent's name is allowed.
    pub fn register_variable(
        &mut self,
        scope: ScopeId,
        name: &'input str,
        binding: LetBinding<'input>,
    ) -> Result<(), DiagnosticKind> {
        let table = &mut self.scopes[scope.0].variables;
        if table.contains_key(name) {
            return Err(DiagnosticKind::IdentifierAlreadyInUse(name.to_string()));
        }
        table.insert(name, binding);
        Ok(())
    }

    /// Register a function into a scope's function namespace.
    ///
    /// # Errors
    /// [`DiagnosticKind::IdentifierAlreadyInUse`] on a same-namespace,
    /// same-scope duplicate; the scope is left unmodified.
    pub fn register_function(
        &mut self,
        scope: ScopeId,
        name: &'input str,
        header: FunctionHeader<'input>,
    ) -> Result<(), DiagnosticKind> {
        let table = &mut self.scopes[scope.0].functions;
        if table.contains_key(name) {
            return Err(DiagnosticKind::IdentifierAlreadyInUse(name.to_string()));
        }
        table.insert(name, header);
        Ok(())
    }

    /// Register a type into a scope's type namespace.
    ///
    /// # Errors
    /// [`DiagnosticKind::IdentifierAlreadyInUse`] on a same-namespace,
    /// same-scope duplicate; the scope is left unmodified.
    pub fn register_type(
        &mut self,
        scope: ScopeId,
        name: &'input str,
        ty: Type<'input>,
    ) -> Result<(), DiagnosticKind> {
        let table = &mut self.scopes[scope.0].types;
        if table.contains_key(name) {
            return Err(DiagnosticKind::IdentifierAlreadyInUse(name.to_string()));
        }
        table.insert(name, ty);
        Ok(())
    }

    /// Register a foreign declaration block into a scope's extern namespace.
    ///
    /// # Errors
    /// [`DiagnosticKind::IdentifierAlreadyInUse`] on a same-namespace,
    /// same-scope duplicate; the scope is left unmodified.
    pub fn register_extern(
        &mut self,
        scope: ScopeId,
        name: &'input str,
        declaration: ExternDeclaration<'input>,
    ) -> Result<(), DiagnosticKind> {
        let table = &mut self.scopes[scope.0].externs;
        if table.contains_key(name) {
            return Err(DiagnosticKind::IdentifierAlreadyInUse(name.to_string()));
        }
        table.insert(name, declaration);
        Ok(())
    }

    /// Replace the declared type of an already-registered variable with its
    /// inferred type. Used by the inference pass to annotate `let`
    /// declarations whose type was left unresolved.
    ///
    /// # Errors
    /// [`DiagnosticKind::InternalInvariantViolation`] if no variable by that
    /// name exists in the scope -- the driver registers every declaration
    /// before the pass runs.
    pub fn annotate_variable_type(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: Type<'input>,
    ) -> Result<(), DiagnosticKind> {
        match self.scopes[scope.0].variables.get_mut(name) {
            Some(binding) => {
                binding.ty = ty;
                Ok(())
            }
            None => Err(DiagnosticKind::InternalInvariantViolation(format!(
                "annotating unregistered variable `{name}`"
            ))),
        }
    }

    /// Resolve a bare name in a scope, checking the four namespaces in the
    /// fixed order variable, function, type, extern. With `recursive`, the
    /// search repeats in the parent scope on failure.
    ///
    /// The ordering is significant: a name may legally exist in two
    /// namespaces simultaneously, and the nearest scope wins before the
    /// namespace order does.
    #[must_use]
    pub fn resolve(
        &self,
        scope: ScopeId,
        name: &str,
        recursive: bool,
    ) -> Option<SymbolRef<'_, 'input>> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let node = self.get(id);
            if let Some(binding) = node.variables.get(name) {
                return Some(SymbolRef::Variable(binding));
            }
            if let Some(header) = node.functions.get(name) {
                return Some(SymbolRef::Function(header));
            }
            if let Some(ty) = node.types.get(name) {
                return Some(SymbolRef::Type(ty));
            }
            if let Some(declaration) = node.externs.get(name) {
                return Some(SymbolRef::Extern(declaration));
            }
            if !recursive {
                return None;
            }
            current = node.parent;
        }
        None
    }

    /// Resolve a name in the type namespace only, recursively upward.
    #[must_use]
    pub fn resolve_type_name(&self, scope: ScopeId, name: &str) -> Option<&Type<'input>> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let node = self.get(id);
            if let Some(ty) = node.types.get(name) {
                return Some(ty);
            }
            current = node.parent;
        }
        None
    }

    /// Resolve a dotted path to a type: the first segment through the scope
    /// chain's type tables, each further segment through the type table of
    /// the previous type's owned scope.
    #[must_use]
    pub fn resolve_type_path(&self, scope: ScopeId, path: &[&str]) -> Option<&Type<'input>> {
        let (first, rest) = path.split_first()?;
        let mut current = self.resolve_type_name(scope, first)?;
        for segment in rest {
            let owned = self.owned_scope_of(current)?;
            current = self.get(owned).types.get(*segment)?;
        }
        Some(current)
    }

    /// The scope a type's body owns, if it has one. Follows already-resolved
    /// reference links; an unresolved by-path reference yields [`None`] here
    /// (the caller sees it as an unresolvable path).
    fn owned_scope_of(&self, ty: &Type<'input>) -> Option<ScopeId> {
        match &ty.kind {
            TypeKind::Struct(data) => Some(data.owned_scope),
            TypeKind::Interface(data) => Some(data.owned_scope),
            TypeKind::Class(data) => Some(data.owned_scope),
            TypeKind::Variant(data) => Some(data.owned_scope),
            TypeKind::Process(data) => Some(data.owned_scope),
            TypeKind::Reference(reference) => reference
                .resolved
                .as_deref()
                .and_then(|target| self.owned_scope_of(target)),
            _ => None,
        }
    }

    /// Determine which kind of symbol a name refers to, extending plain
    /// resolution to cover the enclosing function's argument list and the
    /// nearest enclosing class's method and field lists -- class members are
    /// visible without qualification inside their own methods.
    #[must_use]
    pub fn lookup_symbol_kind(&self, scope: ScopeId, name: &str) -> SymbolKind {
        let mut current = Some(scope);
        while let Some(id) = current {
            let node = self.get(id);
            if node.variables.contains_key(name) {
                return SymbolKind::Variable;
            }
            if node.functions.contains_key(name) {
                return SymbolKind::Function;
            }
            if node.types.contains_key(name) {
                return SymbolKind::Type;
            }
            if node.externs.contains_key(name) {
                return SymbolKind::Extern;
            }
            match &node.owner {
                Some(ScopeOwner::Function(header))
                    if header.signature.arguments.contains_key(name) =>
                {
                    return SymbolKind::Argument;
                }
                Some(ScopeOwner::Class(class)) => {
                    if let TypeKind::Class(data) = &class.kind {
                        if data.methods.contains_key(name) {
                            return SymbolKind::Method;
                        }
                        if data.fields.contains_key(name) {
                            return SymbolKind::Attribute;
                        }
                    }
                }
                _ => {}
            }
            current = node.parent;
        }
        SymbolKind::Undefined
    }

    /// Walk upward to the class owning the nearest enclosing class body.
    ///
    /// # Errors
    /// [`DiagnosticKind::InternalInvariantViolation`] if called outside a
    /// class context.
    pub fn class_of(&self, scope: ScopeId) -> Result<&Type<'input>, DiagnosticKind> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let node = self.get(id);
            if !node.within_class {
                break;
            }
            if let Some(ScopeOwner::Class(class)) = &node.owner {
                return Ok(class);
            }
            current = node.parent;
        }
        Err(DiagnosticKind::InternalInvariantViolation(
            "class_of called outside of a class context".to_string(),
        ))
    }
}

impl Default for ScopeArena<'_> {
    fn default() -> Self {
        Self::new()
    }
}
