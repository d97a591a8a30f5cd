//! Debug-tree rendering of types, declarations and program trees
//!
//! Diagnostics render types compactly through their [`Display`] impls; this
//! module is the verbose counterpart, used by dump flags and by tests that
//! want to assert on a whole tree shape at once. Every field of every tree
//! shape is visitable: names, nullability, generics, extends lists, variant
//! constructor arguments and attached expression types all appear as
//! explicit child nodes.

use std::fmt::{self, Display, Formatter};

use crate::{
    decl::{ExternDeclaration, FunctionHeader, Import},
    tree::{Declaration, Expr, ExprKind, Literal, Program, Stmt},
    ty::{Fn, GenericBinding, Type, TypeKind},
};

/// A renderable tree: either a leaf value or a labelled node with named
/// children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugTree {
    /// A terminal value
    Leaf(String),
    /// A labelled node with (key, child) pairs
    Node(String, Vec<(String, DebugTree)>),
}

impl DebugTree {
    /// Shorthand for a leaf holding anything displayable
    fn leaf(value: impl Display) -> Self {
        Self::Leaf(value.to_string())
    }

    /// Write this tree at the given indentation depth
    fn write(&self, f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Self::Leaf(value) => write!(f, "{value}"),
            Self::Node(label, children) => {
                write!(f, "{label}")?;
                let indent = (depth + 1) * 2;
                for (key, child) in children {
                    write!(f, "\n{:indent$}{key}: ", "")?;
                    child.write(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl Display for DebugTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}

/// One (key, child) pair
type Entry = (String, DebugTree);

/// Build the entry list shared by every type: display name, nullability and
/// generics, present only when set
fn common_type_entries(ty: &Type) -> Vec<Entry> {
    let mut entries = Vec::new();
    if let Some(name) = ty.name {
        entries.push(("name".to_string(), DebugTree::leaf(name)));
    }
    if ty.nullable {
        entries.push(("nullable".to_string(), DebugTree::leaf("true")));
    }
    if !ty.generics.is_empty() {
        let generics = ty
            .generics
            .iter()
            .map(|(name, binding)| {
                let child = match binding {
                    GenericBinding::Free(param) => match &param.constraint {
                        Some(constraint) => DebugTree::Node(
                            "free".to_string(),
                            vec![("constraint".to_string(), type_tree(constraint))],
                        ),
                        None => DebugTree::leaf("free"),
                    },
                    GenericBinding::Bound(target) => DebugTree::Node(
                        "bound".to_string(),
                        vec![("to".to_string(), type_tree(target))],
                    ),
                };
                ((*name).to_string(), child)
            })
            .collect();
        entries.push((
            "generics".to_string(),
            DebugTree::Node("generics".to_string(), generics),
        ));
    }
    entries
}

/// Entries for a list of `extends` parents, empty when there are none
fn extends_entries(extends: &[Type]) -> Vec<Entry> {
    extends
        .iter()
        .enumerate()
        .map(|(index, parent)| (format!("extends[{index}]"), type_tree(parent)))
        .collect()
}

/// Render a function signature as a tree
fn fn_tree(signature: &Fn) -> DebugTree {
    let mut children: Vec<Entry> = signature
        .arguments
        .values()
        .map(|argument| {
            (
                argument.name.to_string(),
                DebugTree::Node(
                    if argument.mutable { "mut argument" } else { "argument" }.to_string(),
                    vec![("type".to_string(), type_tree(&argument.ty))],
                ),
            )
        })
        .collect();
    if let Some(returns) = &signature.returns {
        children.push(("returns".to_string(), type_tree(returns)));
    }
    DebugTree::Node("fn".to_string(), children)
}

/// Render a type as a tree, showing every stored field
#[must_use]
pub fn type_tree(ty: &Type) -> DebugTree {
    let mut entries = common_type_entries(ty);
    let label = match &ty.kind {
        TypeKind::I8
        | TypeKind::U8
        | TypeKind::I16
        | TypeKind::U16
        | TypeKind::I32
        | TypeKind::U32
        | TypeKind::I64
        | TypeKind::U64
        | TypeKind::F32
        | TypeKind::F64
        | TypeKind::Bool
        | TypeKind::Char
        | TypeKind::Str
        | TypeKind::Void => {
            if entries.is_empty() {
                return DebugTree::leaf(Type::new(ty.kind.clone()));
            }
            Type::new(ty.kind.clone()).to_string()
        }
        TypeKind::Array { element, length } => {
            entries.push(("length".to_string(), DebugTree::leaf(length)));
            entries.push(("element".to_string(), type_tree(element)));
            "array".to_string()
        }
        TypeKind::Struct(data) => {
            entries.extend(extends_entries(&data.extends));
            for (name, attribute) in &data.attributes {
                entries.push(((*name).to_string(), type_tree(attribute)));
            }
            "struct".to_string()
        }
        TypeKind::Interface(data) => {
            entries.extend(extends_entries(&data.extends));
            for (name, method) in &data.methods {
                entries.push(((*name).to_string(), fn_tree(method)));
            }
            "interface".to_string()
        }
        TypeKind::Class(data) => {
            entries.extend(extends_entries(&data.extends));
            for (name, field) in &data.fields {
                entries.push((
                    (*name).to_string(),
                    DebugTree::Node(
                        if field.mutable { "mut field" } else { "field" }.to_string(),
                        vec![("type".to_string(), type_tree(&field.ty))],
                    ),
                ));
            }
            for (name, method) in &data.methods {
                entries.push(((*name).to_string(), fn_tree(method)));
            }
            "class".to_string()
        }
        TypeKind::Variant(data) => {
            for (name, constructor) in &data.constructors {
                let arguments = constructor
                    .arguments
                    .iter()
                    .map(|(argument, argument_ty)| {
                        ((*argument).to_string(), type_tree(argument_ty))
                    })
                    .collect();
                entries.push((
                    (*name).to_string(),
                    DebugTree::Node("constructor".to_string(), arguments),
                ));
            }
            "variant".to_string()
        }
        TypeKind::Fn(signature) => {
            entries.push(("signature".to_string(), fn_tree(signature)));
            "fn".to_string()
        }
        TypeKind::Ptr(target) => {
            entries.push(("target".to_string(), type_tree(target)));
            "ptr".to_string()
        }
        TypeKind::Reference(reference) => {
            if let Some(path) = &reference.path {
                entries.push(("path".to_string(), DebugTree::leaf(path.join("."))));
            }
            match &reference.resolved {
                Some(target) => entries.push(("resolved".to_string(), type_tree(target))),
                None => entries.push(("resolved".to_string(), DebugTree::leaf("none"))),
            }
            "reference".to_string()
        }
        TypeKind::Union(lhs, rhs) => {
            entries.push(("left".to_string(), type_tree(lhs)));
            entries.push(("right".to_string(), type_tree(rhs)));
            "union".to_string()
        }
        TypeKind::Join(lhs, rhs) => {
            entries.push(("left".to_string(), type_tree(lhs)));
            entries.push(("right".to_string(), type_tree(rhs)));
            "join".to_string()
        }
        TypeKind::Process(data) => {
            for (name, argument) in &data.arguments {
                entries.push((format!("argument {name}"), type_tree(argument)));
            }
            entries.push(("input".to_string(), type_tree(&data.input)));
            entries.push(("output".to_string(), type_tree(&data.output)));
            for (name, handler) in &data.handlers {
                entries.push((format!("handler {name}"), fn_tree(handler)));
            }
            "process".to_string()
        }
        TypeKind::Generic(param) => {
            entries.push(("parameter".to_string(), DebugTree::leaf(param.name)));
            if let Some(constraint) = &param.constraint {
                entries.push(("constraint".to_string(), type_tree(constraint)));
            }
            "generic".to_string()
        }
        TypeKind::Unresolved => {
            if entries.is_empty() {
                return DebugTree::leaf("unresolved");
            }
            "unresolved".to_string()
        }
    };
    DebugTree::Node(label, entries)
}

/// Render an expression as a tree, including its inferred type when the
/// checking pass has attached one
#[must_use]
pub fn expr_tree(expr: &Expr) -> DebugTree {
    let mut entries = Vec::new();
    let label = match expr.kind.value() {
        ExprKind::Literal(literal) => {
            let rendered = match literal {
                Literal::Number(text) | Literal::String(text) | Literal::Char(text) => {
                    (*text).to_string()
                }
                Literal::Bool(value) => value.to_string(),
            };
            entries.push(("value".to_string(), DebugTree::leaf(rendered)));
            "literal".to_string()
        }
        ExprKind::Identifier(name) => {
            entries.push(("name".to_string(), DebugTree::leaf(name)));
            "identifier".to_string()
        }
        ExprKind::Cast(inner, target) => {
            entries.push(("operand".to_string(), expr_tree(inner)));
            entries.push(("target".to_string(), type_tree(target)));
            "cast".to_string()
        }
        ExprKind::Member(object, member) => {
            entries.push(("object".to_string(), expr_tree(object)));
            entries.push(("member".to_string(), DebugTree::leaf(member.value())));
            "member".to_string()
        }
    };
    if let Some(ty) = &expr.ty {
        entries.push(("type".to_string(), type_tree(ty)));
    }
    DebugTree::Node(label, entries)
}

/// Entries for a statement list
fn body_entries(body: &[Stmt]) -> Vec<Entry> {
    body.iter()
        .enumerate()
        .map(|(index, stmt)| (format!("[{index}]"), stmt_tree(stmt)))
        .collect()
}

/// Render a statement as a tree
#[must_use]
pub fn stmt_tree(stmt: &Stmt) -> DebugTree {
    match stmt {
        Stmt::Expr(expr) => DebugTree::Node(
            "expr".to_string(),
            vec![("value".to_string(), expr_tree(expr))],
        ),
        Stmt::Let { name, value, .. } => {
            let mut entries = vec![("name".to_string(), DebugTree::leaf(name.value()))];
            if let Some(value) = value {
                entries.push(("value".to_string(), expr_tree(value)));
            }
            DebugTree::Node("let".to_string(), entries)
        }
        Stmt::Block { body, .. } => DebugTree::Node("block".to_string(), body_entries(body)),
        Stmt::Unsafe { body, .. } => DebugTree::Node("unsafe".to_string(), body_entries(body)),
        Stmt::Sync { body, .. } => DebugTree::Node("sync".to_string(), body_entries(body)),
        Stmt::Return(value) => DebugTree::Node(
            "return".to_string(),
            value
                .as_ref()
                .map(|value| ("value".to_string(), expr_tree(value)))
                .into_iter()
                .collect(),
        ),
    }
}

/// Render a function header as a tree
fn header_tree(header: &FunctionHeader) -> DebugTree {
    let mut entries = vec![
        ("name".to_string(), DebugTree::leaf(header.name)),
        ("signature".to_string(), fn_tree(&header.signature)),
    ];
    if header.is_generic {
        let generics = header
            .generics
            .keys()
            .map(|name| ((*name).to_string(), DebugTree::leaf("free")))
            .collect();
        entries.push((
            "generics".to_string(),
            DebugTree::Node("generics".to_string(), generics),
        ));
    }
    DebugTree::Node("function".to_string(), entries)
}

/// Render a foreign declaration block as a tree
#[must_use]
pub fn extern_tree(declaration: &ExternDeclaration) -> DebugTree {
    let mut entries = vec![
        ("name".to_string(), DebugTree::leaf(declaration.name)),
        ("linkage".to_string(), DebugTree::leaf(declaration.linkage)),
    ];
    for (name, header) in &declaration.methods {
        entries.push(((*name).to_string(), header_tree(header)));
    }
    DebugTree::Node("extern".to_string(), entries)
}

/// Render an import as a tree
fn import_tree(import: &Import) -> DebugTree {
    let mut entries = vec![(
        "path".to_string(),
        DebugTree::leaf(import.path.join(".")),
    )];
    if let Some(alias) = import.alias {
        entries.push(("alias".to_string(), DebugTree::leaf(alias)));
    }
    DebugTree::Node("import".to_string(), entries)
}

/// Render a top-level declaration as a tree
#[must_use]
pub fn declaration_tree(declaration: &Declaration) -> DebugTree {
    match declaration {
        Declaration::Function { header, body, .. } => {
            let mut entries = vec![("header".to_string(), header_tree(header))];
            entries.extend(body_entries(body));
            DebugTree::Node("function".to_string(), entries)
        }
        Declaration::Type { name, ty } => DebugTree::Node(
            "type".to_string(),
            vec![
                ("name".to_string(), DebugTree::leaf(name.value())),
                ("definition".to_string(), type_tree(ty)),
            ],
        ),
        Declaration::Extern(declaration) => extern_tree(declaration),
        Declaration::Import(import) => import_tree(import),
    }
}

/// Render a whole program as a tree
#[must_use]
pub fn program_tree(program: &Program) -> DebugTree {
    DebugTree::Node(
        "program".to_string(),
        program
            .0
            .iter()
            .enumerate()
            .map(|(index, declaration)| (format!("[{index}]"), declaration_tree(declaration)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use vsp_utils::spanned;

    use super::*;
    use crate::scope::ScopeArena;

    #[test]
    fn primitive_types_render_as_leaves() {
        assert_eq!(
            type_tree(&Type::new(TypeKind::I32)),
            DebugTree::Leaf("i32".to_string())
        );
    }

    #[test]
    fn struct_trees_show_every_field() {
        let mut scopes = ScopeArena::new_empty();
        let root = scopes.root();
        let mut point = Type::structure(&mut scopes, root).named("Point");
        point.nullable = true;
        let TypeKind::Struct(data) = &mut point.kind else {
            unreachable!();
        };
        data.attributes.insert("x", Type::new(TypeKind::I32));
        data.attributes.insert("y", Type::new(TypeKind::I32));

        let rendered = type_tree(&point).to_string();
        assert_eq!(
            rendered,
            "struct\n  name: Point\n  nullable: true\n  x: i32\n  y: i32"
        );
    }

    #[test]
    fn extends_entries_are_indexed() {
        let mut scopes = ScopeArena::new_empty();
        let root = scopes.root();
        let base = Type::interface(&mut scopes, root).named("Base");
        let mut child = Type::interface(&mut scopes, root);
        let TypeKind::Interface(data) = &mut child.kind else {
            unreachable!();
        };
        data.extends.push(base);

        let rendered = type_tree(&child).to_string();
        assert!(rendered.contains("extends[0]: interface"));
        assert!(rendered.contains("name: Base"));
    }

    #[test]
    fn variant_trees_show_constructor_arguments() {
        let mut scopes = ScopeArena::new_empty();
        let root = scopes.root();
        let mut shape = Type::variant(&mut scopes, root);
        let TypeKind::Variant(data) = &mut shape.kind else {
            unreachable!();
        };
        let mut arguments = IndexMap::new();
        arguments.insert("radius", Type::new(TypeKind::F32));
        data.constructors.insert(
            "Circle",
            crate::ty::VariantConstructor { arguments },
        );

        let rendered = type_tree(&shape).to_string();
        assert!(rendered.contains("Circle: constructor"));
        assert!(rendered.contains("radius: f32"));
    }

    #[test]
    fn typed_expressions_render_their_type() {
        let expr = Expr::literal(
            spanned!(0, Literal::Number("42"), 2),
            Type::new(TypeKind::I32),
        );
        assert_eq!(
            expr_tree(&expr).to_string(),
            "literal\n  value: 42\n  type: i32"
        );
    }

    #[test]
    fn nested_statements_indent_per_level() {
        let mut scopes = ScopeArena::new_empty();
        let block = scopes.subscope(scopes.root());
        let stmt = Stmt::Block {
            scope: block,
            body: vec![Stmt::Return(Some(Expr::literal(
                spanned!(9, Literal::Bool(true), 13),
                Type::new(TypeKind::Bool),
            )))],
        };

        assert_eq!(
            stmt_tree(&stmt).to_string(),
            "block\n  [0]: return\n    value: literal\n      value: true\n      type: bool"
        );
    }
}
