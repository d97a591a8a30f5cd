//! The resolution and inference pass
//!
//! A single depth-first walk over an already-scoped [`Program`]: the front
//! end has registered every declaration into the [`ScopeArena`] and left
//! every expression untyped (except literals). The pass validates each type
//! declaration's shape, infers and attaches a [`Type`] to every expression,
//! and annotates `let` bindings whose declared type was left unresolved.
//!
//! The first failure aborts the walk with a spanned [`Diagnostic`]; nothing
//! is partially mutated on the failing path.

use vsp_diagnostics::{Diagnostic, DiagnosticKind, SpanExt};
use vsp_utils::span::{Span, Spanned};

use crate::{
    compat::{
        can_extend, can_join, can_union, resolve_class_field, resolve_class_method,
        resolve_interface_method, resolve_struct_attribute, struct_contains, types_match,
        AlgebraError, ContainmentError,
    },
    scope::{ScopeArena, ScopeId, SymbolRef},
    tree::{Declaration, Expr, ExprKind, Program, Stmt},
    ty::{BaseKind, Type, TypeKind},
};

/// Check a whole compilation unit, mutating it in place to attach types.
///
/// # Errors
/// The first [`Diagnostic`] the walk produces.
pub fn check_program<'input>(
    scopes: &mut ScopeArena<'input>,
    program: &mut Program<'input>,
) -> Result<(), Diagnostic> {
    for declaration in &mut program.0 {
        match declaration {
            Declaration::Type { name, ty } => check_type_declaration(scopes, *name, ty)?,
            Declaration::Function { scope, body, .. } => {
                let scope = *scope;
                for stmt in body {
                    check_stmt(scopes, scope, stmt)?;
                }
            }
            // registration already validated both of these
            Declaration::Extern(_) | Declaration::Import(_) => {}
        }
    }
    Ok(())
}

/// Validate one named type declaration: extends lists, join/union algebra
/// and process handlers. Completed classes are back-linked onto their body
/// scope so member lookup inside methods can reach them.
fn check_type_declaration<'input>(
    scopes: &mut ScopeArena<'input>,
    name: Spanned<&'input str>,
    ty: &Type<'input>,
) -> Result<(), Diagnostic> {
    let span = name.span();
    match &ty.kind {
        TypeKind::Struct(data) => {
            check_extends(ty, BaseKind::Struct, &data.extends, scopes, span)?;
            check_inherited_members(ty, scopes, span)
        }
        TypeKind::Interface(data) => {
            check_extends(ty, BaseKind::Interface, &data.extends, scopes, span)?;
            check_inherited_members(ty, scopes, span)
        }
        TypeKind::Class(data) => {
            check_extends(ty, BaseKind::Class, &data.extends, scopes, span)?;
            check_inherited_members(ty, scopes, span)?;
            scopes.attach_class(data.owned_scope, ty.clone());
            Ok(())
        }
        TypeKind::Join(lhs, rhs) => match can_join(lhs, rhs, scopes) {
            Ok(_) => Ok(()),
            Err(AlgebraError::KindMismatch(..)) => Err(span.error(
                DiagnosticKind::InvalidJoinOperands(lhs.to_string(), rhs.to_string()),
            )),
            Err(AlgebraError::Collision(member)) => {
                Err(span.error(DiagnosticKind::JoinMemberCollision(
                    lhs.to_string(),
                    rhs.to_string(),
                    member.to_string(),
                )))
            }
            Err(AlgebraError::Unresolvable(path)) => {
                Err(span.error(DiagnosticKind::UnableToResolveType(path)))
            }
        },
        TypeKind::Union(lhs, rhs) => match can_union(lhs, rhs, scopes) {
            Ok(()) => Ok(()),
            Err(AlgebraError::KindMismatch(..)) => Err(span.error(
                DiagnosticKind::InvalidUnionOperands(lhs.to_string(), rhs.to_string()),
            )),
            Err(AlgebraError::Collision(member)) => {
                let side = if crate::compat::accumulate_members(
                    lhs,
                    scopes,
                    &mut indexmap::IndexSet::new(),
                )
                .is_err()
                {
                    lhs
                } else {
                    rhs
                };
                Err(span.error(DiagnosticKind::UnionOperandCollision(
                    side.to_string(),
                    member.to_string(),
                )))
            }
            Err(AlgebraError::Unresolvable(path)) => {
                Err(span.error(DiagnosticKind::UnableToResolveType(path)))
            }
        },
        TypeKind::Process(data) => {
            if data.handlers.len() == 1 && data.handlers.contains_key("receive") {
                Ok(())
            } else {
                Err(span.error(DiagnosticKind::ProcessMissingReceive(
                    name.value().to_string(),
                )))
            }
        }
        _ => Ok(()),
    }
}

/// Every `extends` entry must normalize to the declaring kind
fn check_extends<'input>(
    child: &Type<'input>,
    child_kind: BaseKind,
    extends: &[Type<'input>],
    scopes: &ScopeArena<'input>,
    span: Span,
) -> Result<(), Diagnostic> {
    for parent in extends {
        if !can_extend(child_kind, parent, scopes) {
            return Err(span.error(DiagnosticKind::InvalidExtend(
                child.to_string(),
                parent.to_string(),
            )));
        }
    }
    Ok(())
}

/// The flattened member set of the declaration must be collision-free
fn check_inherited_members<'input>(
    ty: &Type<'input>,
    scopes: &ScopeArena<'input>,
    span: Span,
) -> Result<(), Diagnostic> {
    let mut seen = indexmap::IndexSet::new();
    crate::compat::accumulate_members(ty, scopes, &mut seen).map_err(|error| match error {
        crate::compat::MemberError::Collision(member) => {
            span.error(DiagnosticKind::DuplicateInheritedMember(member.to_string()))
        }
        crate::compat::MemberError::Unresolvable(path) => {
            span.error(DiagnosticKind::UnableToResolveType(path))
        }
    })
}

/// Check one statement, re-entering the statement's own scope where it
/// opens one.
fn check_stmt<'input>(
    scopes: &mut ScopeArena<'input>,
    scope: ScopeId,
    stmt: &mut Stmt<'input>,
) -> Result<(), Diagnostic> {
    match stmt {
        Stmt::Expr(expr) => {
            type_expr(scopes, scope, expr)?;
            Ok(())
        }
        Stmt::Let { name, scope: let_scope, value } => {
            let (name, let_scope) = (*name, *let_scope);
            let declared = match scopes.resolve(let_scope, name.value(), false) {
                Some(SymbolRef::Variable(binding)) => binding.ty.clone(),
                _ => {
                    return Err(name.span().error(DiagnosticKind::InternalInvariantViolation(
                        format!("let statement for unregistered variable `{}`", name.value()),
                    )));
                }
            };

            let Some(value) = value else {
                return Ok(());
            };
            let inferred = type_expr(scopes, scope, value)?;

            if declared.kind == TypeKind::Unresolved {
                scopes
                    .annotate_variable_type(let_scope, name.value(), inferred)
                    .map_err(|kind| kind.error_in(name.span()))
            } else if types_match(&declared, &inferred, scopes) {
                Ok(())
            } else {
                Err(value.kind.span().error(DiagnosticKind::ExpectedSameType(
                    declared.to_string(),
                    inferred.to_string(),
                )))
            }
        }
        Stmt::Block { scope, body }
        | Stmt::Unsafe { scope, body }
        | Stmt::Sync { scope, body } => {
            let scope = *scope;
            for stmt in body {
                check_stmt(scopes, scope, stmt)?;
            }
            Ok(())
        }
        Stmt::Return(value) => {
            if let Some(value) = value {
                type_expr(scopes, scope, value)?;
            }
            Ok(())
        }
    }
}

/// Infer an expression's type, attach it to the node and return it.
///
/// # Errors
/// A spanned [`Diagnostic`] at the subexpression that failed.
pub fn type_expr<'input>(
    scopes: &ScopeArena<'input>,
    scope: ScopeId,
    expr: &mut Expr<'input>,
) -> Result<Type<'input>, Diagnostic> {
    let span = expr.kind.span();
    let ty = match expr.kind.value_mut() {
        ExprKind::Literal(_) => match &expr.ty {
            Some(ty) => ty.clone(),
            // the grammar driver types every literal at construction
            None => {
                return Err(span.error(DiagnosticKind::InternalInvariantViolation(
                    "literal expression with no attached type".to_string(),
                )));
            }
        },
        ExprKind::Identifier(name) => match scopes.resolve(scope, name, true) {
            Some(SymbolRef::Variable(binding)) => binding
                .ty
                .normalized(scopes)
                .map_err(|kind| kind.error_in(span))?,
            Some(SymbolRef::Function(header)) => {
                Type::new(TypeKind::Fn(header.signature.clone()))
            }
            Some(SymbolRef::Type(_) | SymbolRef::Extern(_)) => {
                return Err(span.error(DiagnosticKind::TypeUsedAsValue((*name).to_string())));
            }
            None => {
                return Err(span.error(DiagnosticKind::UnableToResolveIdentifier(
                    (*name).to_string(),
                )));
            }
        },
        ExprKind::Cast(inner, target) => {
            let from = type_expr(scopes, scope, inner)?;
            check_cast(&from, target, scopes).map_err(|kind| kind.error_in(span))?;
            target
                .normalized(scopes)
                .map_err(|kind| kind.error_in(span))?
        }
        ExprKind::Member(object, member) => {
            let object_ty = type_expr(scopes, scope, object)?;
            let normalized = object_ty
                .normalized(scopes)
                .map_err(|kind| kind.error_in(span))?;
            resolve_member(&normalized, *member, scopes)?
        }
    };

    expr.ty = Some(ty.clone());
    Ok(ty)
}

/// Resolve a `.member` access against a normalized object type
fn resolve_member<'input>(
    object: &Type<'input>,
    member: Spanned<&'input str>,
    scopes: &ScopeArena<'input>,
) -> Result<Type<'input>, Diagnostic> {
    let span = member.span();
    let name = member.value();
    let found = match &object.kind {
        TypeKind::Struct(_) => resolve_struct_attribute(object, name, scopes)
            .map_err(|kind| kind.error_in(span))?,
        TypeKind::Class(_) => {
            let field = resolve_class_field(object, name, scopes)
                .map_err(|kind| kind.error_in(span))?
                .map(|binding| binding.ty);
            match field {
                Some(ty) => Some(ty),
                None => resolve_class_method(object, name, scopes)
                    .map_err(|kind| kind.error_in(span))?
                    .map(|signature| Type::new(TypeKind::Fn(signature))),
            }
        }
        TypeKind::Interface(_) => resolve_interface_method(object, name, scopes)
            .map_err(|kind| kind.error_in(span))?
            .map(|signature| Type::new(TypeKind::Fn(signature))),
        _ => {
            return Err(span.error(DiagnosticKind::MemberAccessOnNonStructural(
                object.to_string(),
            )));
        }
    };

    found.ok_or_else(|| {
        DiagnosticKind::DoesNotHaveMember(object.to_string(), (*name).to_string())
            .error_in(span)
    })
}

/// Whether a value of type `from` may be cast to `to`.
///
/// Numeric casts strictly below the `f64` rank are always legal. Struct
/// casts are legal when the source structurally contains the target (a
/// width-narrowing cast). Everything else requires exact base-kind
/// equality.
///
/// # Errors
/// [`DiagnosticKind::StructureMismatch`] naming the missing member, or
/// [`DiagnosticKind::InvalidCast`].
pub fn check_cast<'input>(
    from: &Type<'input>,
    to: &Type<'input>,
    scopes: &ScopeArena<'input>,
) -> Result<(), DiagnosticKind> {
    let from_kind = from.base_kind(scopes);
    let to_kind = to.base_kind(scopes);

    if from_kind.is_below_double_rank() && to_kind.is_below_double_rank() {
        return Ok(());
    }
    if from_kind == BaseKind::Struct && to_kind == BaseKind::Struct {
        return struct_contains(from, to, scopes).map_err(|error| match error {
            ContainmentError::Missing(member) => DiagnosticKind::StructureMismatch(
                from.to_string(),
                to.to_string(),
                member.to_string(),
            ),
            ContainmentError::NotAStruct => {
                DiagnosticKind::InvalidCast(from.to_string(), to.to_string())
            }
        });
    }
    if from_kind == to_kind && from_kind != BaseKind::Invalid {
        return Ok(());
    }
    Err(DiagnosticKind::InvalidCast(from.to_string(), to.to_string()))
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use vsp_utils::spanned;

    use super::*;
    use crate::{decl::LetBinding, tree::Literal, ty::Fn};

    fn nullary_method(returns: TypeKind<'static>) -> Fn<'static> {
        Fn {
            arguments: IndexMap::new(),
            returns: Some(Box::new(Type::new(returns))),
        }
    }

    fn interface_with_method(
        scopes: &mut ScopeArena<'static>,
        method: &'static str,
        returns: TypeKind<'static>,
    ) -> Type<'static> {
        let root = scopes.root();
        let mut ty = Type::interface(scopes, root);
        let TypeKind::Interface(data) = &mut ty.kind else {
            unreachable!();
        };
        data.methods.insert(method, nullary_method(returns));
        ty
    }

    fn struct_with_attributes(
        scopes: &mut ScopeArena<'static>,
        attributes: &[(&'static str, TypeKind<'static>)],
    ) -> Type<'static> {
        let root = scopes.root();
        let mut ty = Type::structure(scopes, root);
        let TypeKind::Struct(data) = &mut ty.kind else {
            unreachable!();
        };
        for (name, kind) in attributes {
            data.attributes.insert(name, Type::new(kind.clone()));
        }
        ty
    }

    fn identifier(name: &'static str) -> Expr<'static> {
        Expr::new(spanned!(0, ExprKind::Identifier(name), name.len()))
    }

    mod cast_legality {
        use super::*;

        #[test]
        fn numeric_casts_below_double_rank_always_succeed() {
            let scopes = ScopeArena::new_empty();
            let tests = [
                (TypeKind::I32, TypeKind::F32),
                (TypeKind::F32, TypeKind::I8),
                (TypeKind::U64, TypeKind::I8),
            ];
            for (from, to) in tests {
                assert_eq!(
                    check_cast(&Type::new(from), &Type::new(to), &scopes),
                    Ok(())
                );
            }
        }

        #[test]
        fn double_rank_casts_require_exact_kind_equality() {
            let scopes = ScopeArena::new_empty();
            assert_eq!(
                check_cast(
                    &Type::new(TypeKind::F64),
                    &Type::new(TypeKind::F64),
                    &scopes
                ),
                Ok(())
            );
            assert!(matches!(
                check_cast(
                    &Type::new(TypeKind::F32),
                    &Type::new(TypeKind::F64),
                    &scopes
                ),
                Err(DiagnosticKind::InvalidCast(..))
            ));
        }

        #[test]
        fn struct_casts_narrow_but_never_widen() {
            let mut scopes = ScopeArena::new_empty();
            let wide = struct_with_attributes(
                &mut scopes,
                &[("x", TypeKind::I32), ("y", TypeKind::I32)],
            );
            let narrow = struct_with_attributes(&mut scopes, &[("x", TypeKind::I32)]);

            assert_eq!(check_cast(&wide, &narrow, &scopes), Ok(()));
            assert!(matches!(
                check_cast(&narrow, &wide, &scopes),
                Err(DiagnosticKind::StructureMismatch(_, _, member)) if member == "y"
            ));
        }

        #[test]
        fn interface_to_class_casts_fail_on_kind_mismatch() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            let interface = interface_with_method(&mut scopes, "area", TypeKind::F32);
            let class = Type::class(&mut scopes, root);

            assert!(matches!(
                check_cast(&interface, &class, &scopes),
                Err(DiagnosticKind::InvalidCast(..))
            ));
        }

        #[test]
        fn casts_see_through_reference_chains() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            let point = struct_with_attributes(&mut scopes, &[("x", TypeKind::I32)]);
            scopes
                .register_type(root, "Point", point)
                .expect("registration should succeed");
            scopes
                .register_type(root, "Alias", Type::reference(root, vec!["Point"]))
                .expect("registration should succeed");

            let direct = Type::reference(root, vec!["Point"]);
            let indirect = Type::reference(root, vec!["Alias"]);
            assert_eq!(check_cast(&direct, &indirect, &scopes), Ok(()));
        }
    }

    mod expressions {
        use super::*;

        #[test]
        fn identifiers_take_their_declared_type() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            scopes
                .register_variable(root, "x", LetBinding::immutable(Type::new(TypeKind::I32)))
                .expect("registration should succeed");

            let mut expr = identifier("x");
            assert_eq!(
                type_expr(&scopes, root, &mut expr),
                Ok(Type::new(TypeKind::I32))
            );
            assert_eq!(expr.ty, Some(Type::new(TypeKind::I32)));
        }

        #[test]
        fn identifiers_naming_functions_take_the_function_type() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            scopes
                .register_function(
                    root,
                    "area",
                    crate::decl::FunctionHeader::new("area", nullary_method(TypeKind::F32)),
                )
                .expect("registration should succeed");

            let mut expr = identifier("area");
            assert!(matches!(
                type_expr(&scopes, root, &mut expr),
                Ok(Type { kind: TypeKind::Fn(_), .. })
            ));
        }

        #[test]
        fn identifiers_naming_types_are_rejected_as_values() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            scopes
                .register_type(root, "Point", Type::new(TypeKind::I32))
                .expect("registration should succeed");

            let mut expr = identifier("Point");
            let error = type_expr(&scopes, root, &mut expr).expect_err("should be rejected");
            assert_eq!(
                *error.1.value(),
                DiagnosticKind::TypeUsedAsValue("Point".to_string())
            );
        }

        #[test]
        fn unresolvable_identifiers_are_hard_failures() {
            let scopes = ScopeArena::new_empty();
            let root = scopes.root();

            let mut expr = identifier("ghost");
            let error = type_expr(&scopes, root, &mut expr).expect_err("should be rejected");
            assert_eq!(
                *error.1.value(),
                DiagnosticKind::UnableToResolveIdentifier("ghost".to_string())
            );
        }

        #[test]
        fn untyped_literals_violate_an_internal_invariant() {
            let scopes = ScopeArena::new_empty();

            // bypass Expr::literal, which would attach the type
            let mut expr = Expr::new(spanned!(0, ExprKind::Literal(Literal::Number("1")), 1));
            let error =
                type_expr(&scopes, scopes.root(), &mut expr).expect_err("should be rejected");
            assert!(matches!(
                error.1.value(),
                DiagnosticKind::InternalInvariantViolation(_)
            ));
        }

        #[test]
        fn member_access_resolves_struct_attributes() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            let point = struct_with_attributes(
                &mut scopes,
                &[("x", TypeKind::I32), ("y", TypeKind::I32)],
            );
            scopes
                .register_variable(root, "origin", LetBinding::immutable(point))
                .expect("registration should succeed");

            let mut expr = Expr::new(spanned!(
                0,
                ExprKind::Member(Box::new(identifier("origin")), spanned!(7, "x", 8)),
                8
            ));
            assert_eq!(
                type_expr(&scopes, root, &mut expr),
                Ok(Type::new(TypeKind::I32))
            );

            let mut missing = Expr::new(spanned!(
                0,
                ExprKind::Member(Box::new(identifier("origin")), spanned!(7, "z", 8)),
                8
            ));
            let error =
                type_expr(&scopes, root, &mut missing).expect_err("should be rejected");
            assert!(matches!(
                error.1.value(),
                DiagnosticKind::DoesNotHaveMember(..)
            ));
        }

        #[test]
        fn member_access_on_primitives_is_rejected() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            scopes
                .register_variable(root, "n", LetBinding::immutable(Type::new(TypeKind::I32)))
                .expect("registration should succeed");

            let mut expr = Expr::new(spanned!(
                0,
                ExprKind::Member(Box::new(identifier("n")), spanned!(2, "x", 3)),
                3
            ));
            let error = type_expr(&scopes, root, &mut expr).expect_err("should be rejected");
            assert_eq!(
                *error.1.value(),
                DiagnosticKind::MemberAccessOnNonStructural("i32".to_string())
            );
        }

        #[test]
        fn member_access_resolves_interface_methods() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            let shape = interface_with_method(&mut scopes, "area", TypeKind::F32);
            scopes
                .register_variable(root, "shape", LetBinding::immutable(shape))
                .expect("registration should succeed");

            let mut expr = Expr::new(spanned!(
                0,
                ExprKind::Member(Box::new(identifier("shape")), spanned!(6, "area", 10)),
                10
            ));
            assert!(matches!(
                type_expr(&scopes, root, &mut expr),
                Ok(Type { kind: TypeKind::Fn(_), .. })
            ));
        }

        #[test]
        fn cast_expressions_annotate_with_the_normalized_target() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            scopes
                .register_type(root, "Celsius", Type::new(TypeKind::F32))
                .expect("registration should succeed");
            scopes
                .register_variable(root, "n", LetBinding::immutable(Type::new(TypeKind::I32)))
                .expect("registration should succeed");

            let mut expr = Expr::new(spanned!(
                0,
                ExprKind::Cast(
                    Box::new(identifier("n")),
                    Type::reference(root, vec!["Celsius"])
                ),
                12
            ));
            assert_eq!(
                type_expr(&scopes, root, &mut expr),
                Ok(Type::new(TypeKind::F32))
            );
        }
    }

    mod statements {
        use super::*;

        #[test]
        fn let_with_unresolved_type_is_annotated_from_the_initializer() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            scopes
                .register_variable(
                    root,
                    "x",
                    LetBinding::immutable(Type::new(TypeKind::Unresolved)),
                )
                .expect("registration should succeed");

            let mut stmt = Stmt::Let {
                name: spanned!(4, "x", 5),
                scope: root,
                value: Some(Expr::literal(
                    spanned!(8, Literal::Number("1"), 9),
                    Type::new(TypeKind::I32),
                )),
            };
            assert_eq!(check_stmt(&mut scopes, root, &mut stmt), Ok(()));
            assert!(matches!(
                scopes.resolve(root, "x", false),
                Some(SymbolRef::Variable(binding)) if binding.ty.kind == TypeKind::I32
            ));
        }

        #[test]
        fn let_with_mismatched_initializer_is_rejected() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            scopes
                .register_variable(
                    root,
                    "flag",
                    LetBinding::immutable(Type::new(TypeKind::Bool)),
                )
                .expect("registration should succeed");

            let mut stmt = Stmt::Let {
                name: spanned!(4, "flag", 8),
                scope: root,
                value: Some(Expr::literal(
                    spanned!(11, Literal::Number("1"), 12),
                    Type::new(TypeKind::I32),
                )),
            };
            let error = check_stmt(&mut scopes, root, &mut stmt).expect_err("should be rejected");
            assert_eq!(
                *error.1.value(),
                DiagnosticKind::ExpectedSameType("bool".to_string(), "i32".to_string())
            );
        }

        #[test]
        fn blocks_check_their_bodies_in_their_own_scope() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            let inner = scopes.subscope(root);
            scopes
                .register_variable(
                    inner,
                    "x",
                    LetBinding::immutable(Type::new(TypeKind::I32)),
                )
                .expect("registration should succeed");

            // `x` is only visible from the block's own scope
            let mut stmt = Stmt::Block {
                scope: inner,
                body: vec![Stmt::Expr(identifier("x"))],
            };
            assert_eq!(check_stmt(&mut scopes, root, &mut stmt), Ok(()));

            let mut outside = Stmt::Expr(identifier("x"));
            assert!(check_stmt(&mut scopes, root, &mut outside).is_err());
        }
    }

    mod declarations {
        use super::*;

        /// interface Shape { area() -> f32 } and interface Named
        /// { name() -> str } may join; Shape & Named2 collides on `area`.
        #[test]
        fn joined_interfaces_check_end_to_end() {
            let mut scopes = ScopeArena::new_empty();
            let shape = interface_with_method(&mut scopes, "area", TypeKind::F32);
            let named = interface_with_method(&mut scopes, "name", TypeKind::Str);
            let named2 = interface_with_method(&mut scopes, "area", TypeKind::F32);

            let thing = Type::new(TypeKind::Join(
                Box::new(shape.clone()),
                Box::new(named),
            ))
            .named("Thing");
            let mut program = Program(vec![Declaration::Type {
                name: spanned!(5, "Thing", 10),
                ty: thing,
            }]);
            assert_eq!(check_program(&mut scopes, &mut program), Ok(()));

            let broken = Type::new(TypeKind::Join(Box::new(shape), Box::new(named2)));
            let mut program = Program(vec![Declaration::Type {
                name: spanned!(5, "Broken", 11),
                ty: broken,
            }]);
            let error =
                check_program(&mut scopes, &mut program).expect_err("should be rejected");
            assert!(matches!(
                error.1.value(),
                DiagnosticKind::JoinMemberCollision(_, _, member) if member == "area"
            ));
        }

        #[test]
        fn unions_of_mismatched_kinds_are_rejected() {
            let mut scopes = ScopeArena::new_empty();
            let shape = interface_with_method(&mut scopes, "area", TypeKind::F32);
            let union = Type::new(TypeKind::Union(
                Box::new(shape),
                Box::new(Type::new(TypeKind::I32)),
            ));

            let mut program = Program(vec![Declaration::Type {
                name: spanned!(5, "Either", 11),
                ty: union,
            }]);
            let error =
                check_program(&mut scopes, &mut program).expect_err("should be rejected");
            assert!(matches!(
                error.1.value(),
                DiagnosticKind::InvalidUnionOperands(..)
            ));

            // matching kinds are not enough, the operands must be structural
            let numeric = Type::new(TypeKind::Union(
                Box::new(Type::new(TypeKind::I32)),
                Box::new(Type::new(TypeKind::I32)),
            ));
            let mut program = Program(vec![Declaration::Type {
                name: spanned!(5, "Number", 11),
                ty: numeric,
            }]);
            let error =
                check_program(&mut scopes, &mut program).expect_err("should be rejected");
            assert!(matches!(
                error.1.value(),
                DiagnosticKind::InvalidUnionOperands(..)
            ));
        }

        #[test]
        fn extending_across_kinds_is_rejected() {
            let mut scopes = ScopeArena::new_empty();
            let shape = interface_with_method(&mut scopes, "area", TypeKind::F32);
            let mut point = struct_with_attributes(&mut scopes, &[("x", TypeKind::I32)]);
            let TypeKind::Struct(data) = &mut point.kind else {
                unreachable!();
            };
            data.extends.push(shape);

            let mut program = Program(vec![Declaration::Type {
                name: spanned!(5, "Point", 10),
                ty: point,
            }]);
            let error =
                check_program(&mut scopes, &mut program).expect_err("should be rejected");
            assert!(matches!(
                error.1.value(),
                DiagnosticKind::InvalidExtend(..)
            ));
        }

        #[test]
        fn inheriting_the_same_member_twice_is_rejected() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            let left = interface_with_method(&mut scopes, "speak", TypeKind::Str);
            let right = interface_with_method(&mut scopes, "speak", TypeKind::Str);
            let mut child = Type::interface(&mut scopes, root);
            let TypeKind::Interface(data) = &mut child.kind else {
                unreachable!();
            };
            data.extends.push(left);
            data.extends.push(right);

            let mut program = Program(vec![Declaration::Type {
                name: spanned!(10, "Talker", 16),
                ty: child,
            }]);
            let error =
                check_program(&mut scopes, &mut program).expect_err("should be rejected");
            assert_eq!(
                *error.1.value(),
                DiagnosticKind::DuplicateInheritedMember("speak".to_string())
            );
        }

        #[test]
        fn class_declarations_back_link_their_scope() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();
            let class = Type::class(&mut scopes, root).named("Circle");
            let TypeKind::Class(data) = &class.kind else {
                unreachable!();
            };
            let body = data.owned_scope;

            let mut program = Program(vec![Declaration::Type {
                name: spanned!(6, "Circle", 12),
                ty: class.clone(),
            }]);
            assert_eq!(check_program(&mut scopes, &mut program), Ok(()));
            assert_eq!(scopes.class_of(body), Ok(&class));
        }

        #[test]
        fn processes_require_exactly_one_receive_handler() {
            let mut scopes = ScopeArena::new_empty();
            let root = scopes.root();

            let mut ok = Type::process(
                &mut scopes,
                root,
                Type::new(TypeKind::I32),
                Type::new(TypeKind::Void),
            );
            let TypeKind::Process(data) = &mut ok.kind else {
                unreachable!();
            };
            data.handlers.insert("receive", nullary_method(TypeKind::Void));
            let mut program = Program(vec![Declaration::Type {
                name: spanned!(8, "Counter", 15),
                ty: ok,
            }]);
            assert_eq!(check_program(&mut scopes, &mut program), Ok(()));

            let wrong = Type::process(
                &mut scopes,
                root,
                Type::new(TypeKind::I32),
                Type::new(TypeKind::Void),
            );
            let mut program = Program(vec![Declaration::Type {
                name: spanned!(8, "Counter", 15),
                ty: wrong,
            }]);
            let error =
                check_program(&mut scopes, &mut program).expect_err("should be rejected");
            assert_eq!(
                *error.1.value(),
                DiagnosticKind::ProcessMissingReceive("Counter".to_string())
            );
        }
    }
}
