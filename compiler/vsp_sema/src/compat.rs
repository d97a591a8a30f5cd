//! Structural compatibility checks
//!
//! Everything in this module is a pure function over [`Type`]s and a
//! [`ScopeArena`]: failure is reported by value (usually the first offending
//! member name) so the caller can embed it in a diagnostic, and no check
//! mutates a type on failure.
//!
//! Member accumulation walks ancestors before the type's own members, so
//! collisions follow a first-writer-wins rule: whichever declaration
//! contributed a name first owns it, and the *later* contributor is the one
//! reported.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use vsp_diagnostics::DiagnosticKind;

use crate::{
    decl::LetBinding,
    scope::{ScopeArena, ScopeId},
    ty::{BaseKind, Fn, Type, TypeKind},
};

/// Why a member cannot be accumulated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberError<'input> {
    /// A member name was contributed twice
    Collision(&'input str),
    /// A by-path reference did not resolve to a type, or referred back to
    /// itself
    Unresolvable(String),
}

/// Why a join or union of two types is illegal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgebraError<'input> {
    /// The operands' base kinds differ, or are not joinable kinds
    KindMismatch(BaseKind, BaseKind),
    /// Accumulating the operands' members hit a duplicate name
    Collision(&'input str),
    /// An operand contains a reference that does not resolve
    Unresolvable(String),
}

impl<'input> From<MemberError<'input>> for AlgebraError<'input> {
    fn from(error: MemberError<'input>) -> Self {
        match error {
            MemberError::Collision(name) => Self::Collision(name),
            MemberError::Unresolvable(path) => Self::Unresolvable(path),
        }
    }
}

/// The key a by-path reference is tracked under while a recursion is in
/// flight
type ReferenceKey<'input> = (ScopeId, Vec<&'input str>);

/// Flatten a type's member names into `seen`, ancestors first.
///
/// For structs, interfaces and classes this recurses into each `extends`
/// entry before the type's own members, in declaration order. Union operands
/// accumulate independently (each side against a copy of `seen`); join
/// operands accumulate jointly, since a joined type exposes both member sets
/// as one flat namespace. Types without members accumulate nothing.
///
/// # Errors
/// [`MemberError::Collision`] with the first name inserted twice, or
/// [`MemberError::Unresolvable`] with the path of a reference that does not
/// name a type or refers back to itself.
pub fn accumulate_members<'input>(
    ty: &Type<'input>,
    scopes: &ScopeArena<'input>,
    seen: &mut IndexSet<&'input str>,
) -> Result<(), MemberError<'input>> {
    accumulate_visiting(ty, scopes, seen, &mut HashSet::new())
}

/// [`accumulate_members`] with the in-flight reference set threaded through
fn accumulate_visiting<'input>(
    ty: &Type<'input>,
    scopes: &ScopeArena<'input>,
    seen: &mut IndexSet<&'input str>,
    visiting: &mut HashSet<ReferenceKey<'input>>,
) -> Result<(), MemberError<'input>> {
    match &ty.kind {
        TypeKind::Struct(data) => {
            for ancestor in &data.extends {
                accumulate_visiting(ancestor, scopes, seen, visiting)?;
            }
            for name in data.attributes.keys() {
                note(seen, name)?;
            }
            Ok(())
        }
        TypeKind::Interface(data) => {
            for ancestor in &data.extends {
                accumulate_visiting(ancestor, scopes, seen, visiting)?;
            }
            for name in data.methods.keys() {
                note(seen, name)?;
            }
            Ok(())
        }
        TypeKind::Class(data) => {
            for ancestor in &data.extends {
                accumulate_visiting(ancestor, scopes, seen, visiting)?;
            }
            for name in data.fields.keys() {
                note(seen, name)?;
            }
            for name in data.methods.keys() {
                note(seen, name)?;
            }
            Ok(())
        }
        TypeKind::Union(lhs, rhs) => {
            // either side's member set is acceptable for a union value, so
            // the sides may overlap with each other (but not with `seen`)
            let mut left = seen.clone();
            accumulate_visiting(lhs, scopes, &mut left, visiting)?;
            let mut right = seen.clone();
            accumulate_visiting(rhs, scopes, &mut right, visiting)
        }
        TypeKind::Join(lhs, rhs) => {
            accumulate_visiting(lhs, scopes, seen, visiting)?;
            accumulate_visiting(rhs, scopes, seen, visiting)
        }
        TypeKind::Reference(reference) => {
            if let Some(target) = &reference.resolved {
                return accumulate_visiting(target, scopes, seen, visiting);
            }
            let Some(path) = &reference.path else {
                return Err(MemberError::Unresolvable(
                    "<unbound reference>".to_string(),
                ));
            };
            let key = (reference.scope, path.clone());
            if !visiting.insert(key.clone()) {
                // the reference reached itself; its members cannot be
                // enumerated
                return Err(MemberError::Unresolvable(path.join(".")));
            }
            let accumulated = match scopes.resolve_type_path(reference.scope, path) {
                Some(target) => accumulate_visiting(target, scopes, seen, visiting),
                None => Err(MemberError::Unresolvable(path.join("."))),
            };
            // two sibling branches may legitimately share a referent, so
            // only the chain currently in flight counts as a revisit
            visiting.remove(&key);
            accumulated
        }
        _ => Ok(()),
    }
}

/// Insert one member name, failing if it is already present
fn note<'input>(
    seen: &mut IndexSet<&'input str>,
    name: &'input str,
) -> Result<(), MemberError<'input>> {
    if seen.insert(name) {
        Ok(())
    } else {
        Err(MemberError::Collision(name))
    }
}

/// Whether two types may form a join (`A & B`).
///
/// Legal only when both operands share a base kind of `struct` or
/// `interface` and a joint accumulation of both member sets is
/// collision-free. On success, returns the joined type's flat member set.
///
/// # Errors
/// [`AlgebraError::KindMismatch`], [`AlgebraError::Collision`], or
/// [`AlgebraError::Unresolvable`] when an operand's references dangle.
pub fn can_join<'input>(
    left: &Type<'input>,
    right: &Type<'input>,
    scopes: &ScopeArena<'input>,
) -> Result<IndexSet<&'input str>, AlgebraError<'input>> {
    let left_kind = left.base_kind(scopes);
    let right_kind = right.base_kind(scopes);
    if left_kind != right_kind
        || !matches!(left_kind, BaseKind::Struct | BaseKind::Interface)
    {
        return Err(AlgebraError::KindMismatch(left_kind, right_kind));
    }

    let mut members = IndexSet::new();
    accumulate_members(left, scopes, &mut members)
        .and_then(|()| accumulate_members(right, scopes, &mut members))
        .map_err(AlgebraError::from)?;
    Ok(members)
}

/// Whether two types may form a union (`A | B`).
///
/// Legal only when both operands share a base kind of `struct` or
/// `interface` and each is individually well-formed (its own accumulation
/// collision-free). The sides are *not* required to be disjoint from each
/// other.
///
/// # Errors
/// [`AlgebraError::KindMismatch`], [`AlgebraError::Collision`], or
/// [`AlgebraError::Unresolvable`] when an operand's references dangle.
pub fn can_union<'input>(
    left: &Type<'input>,
    right: &Type<'input>,
    scopes: &ScopeArena<'input>,
) -> Result<(), AlgebraError<'input>> {
    let left_kind = left.base_kind(scopes);
    let right_kind = right.base_kind(scopes);
    if left_kind != right_kind
        || !matches!(left_kind, BaseKind::Struct | BaseKind::Interface)
    {
        return Err(AlgebraError::KindMismatch(left_kind, right_kind));
    }

    for side in [left, right] {
        accumulate_members(side, scopes, &mut IndexSet::new())
            .map_err(AlgebraError::from)?;
    }
    Ok(())
}

/// Whether a declaration of base kind `child` may extend `parent`: true iff
/// the parent normalizes to the same base kind.
#[must_use]
pub fn can_extend<'input>(
    child: BaseKind,
    parent: &Type<'input>,
    scopes: &ScopeArena<'input>,
) -> bool {
    parent.base_kind(scopes) == child
}

/// The full attribute map of a struct, inherited attributes first.
/// [`None`] if the type does not normalize to a struct.
fn collect_attributes<'input>(
    ty: &Type<'input>,
    scopes: &ScopeArena<'input>,
) -> Option<IndexMap<&'input str, Type<'input>>> {
    let normalized = ty.normalized(scopes).ok()?;
    let TypeKind::Struct(data) = normalized.kind else {
        return None;
    };
    let mut attributes = IndexMap::new();
    for ancestor in &data.extends {
        attributes.extend(collect_attributes(ancestor, scopes)?);
    }
    attributes.extend(data.attributes);
    Some(attributes)
}

/// Why `big` does not structurally contain `small`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainmentError<'input> {
    /// An operand does not normalize to a struct
    NotAStruct,
    /// The first attribute of `small` that `big` is missing or holds at an
    /// incompatible type
    Missing(&'input str),
}

/// Whether every attribute of `small` exists in `big` with a compatible
/// type. This is structural width containment, so a cast from `big` to
/// `small` drops the extra attributes.
///
/// # Errors
/// [`ContainmentError::NotAStruct`] when either operand is not a struct, or
/// [`ContainmentError::Missing`] with the offending attribute name.
pub fn struct_contains<'input>(
    big: &Type<'input>,
    small: &Type<'input>,
    scopes: &ScopeArena<'input>,
) -> Result<(), ContainmentError<'input>> {
    let Some(small_attributes) = collect_attributes(small, scopes) else {
        return Err(ContainmentError::NotAStruct);
    };
    let Some(big_attributes) = collect_attributes(big, scopes) else {
        return Err(ContainmentError::NotAStruct);
    };
    for (name, small_ty) in &small_attributes {
        match big_attributes.get(name) {
            Some(big_ty) if types_match(big_ty, small_ty, scopes) => {}
            _ => return Err(ContainmentError::Missing(name)),
        }
    }
    Ok(())
}

/// Whether two types are compatible as member types: structurally recursive
/// for structs, exact base-kind equality otherwise.
#[must_use]
pub fn types_match<'input>(
    left: &Type<'input>,
    right: &Type<'input>,
    scopes: &ScopeArena<'input>,
) -> bool {
    types_match_visiting(left, right, scopes, &mut HashSet::new())
}

/// [`types_match`] with the set of reference pairs already under comparison
/// threaded through. A revisited pair is taken as matching; a genuine
/// mismatch always surfaces at some non-reference layer of the recursion.
fn types_match_visiting<'input>(
    left: &Type<'input>,
    right: &Type<'input>,
    scopes: &ScopeArena<'input>,
    visiting: &mut HashSet<(ReferenceKey<'input>, ReferenceKey<'input>)>,
) -> bool {
    if let (Some(left_key), Some(right_key)) = (reference_key(left), reference_key(right)) {
        if !visiting.insert((left_key, right_key)) {
            return true;
        }
    }

    let left_kind = left.base_kind(scopes);
    let right_kind = right.base_kind(scopes);
    if left_kind == BaseKind::Struct && right_kind == BaseKind::Struct {
        let (Some(left_attributes), Some(right_attributes)) = (
            collect_attributes(left, scopes),
            collect_attributes(right, scopes),
        ) else {
            return false;
        };
        left_attributes.len() == right_attributes.len()
            && left_attributes.iter().all(|(name, left_ty)| {
                right_attributes
                    .get(name)
                    .is_some_and(|right_ty| {
                        types_match_visiting(left_ty, right_ty, scopes, visiting)
                    })
            })
    } else {
        left_kind == right_kind && left_kind != BaseKind::Invalid
    }
}

/// The tracking key of a by-path reference, if `ty` is one
fn reference_key<'input>(ty: &Type<'input>) -> Option<ReferenceKey<'input>> {
    match &ty.kind {
        TypeKind::Reference(reference) => reference
            .path
            .as_ref()
            .map(|path| (reference.scope, path.clone())),
        _ => None,
    }
}

/// Find an attribute on a struct or its ancestors: own attributes first,
/// then each `extends` entry.
///
/// # Errors
/// [`DiagnosticKind::InternalInvariantViolation`] on a non-struct input or
/// on an ambiguous inherited name.
pub fn resolve_struct_attribute<'input>(
    structure: &Type<'input>,
    name: &str,
    scopes: &ScopeArena<'input>,
) -> Result<Option<Type<'input>>, DiagnosticKind> {
    let normalized = structure.normalized(scopes)?;
    let TypeKind::Struct(data) = &normalized.kind else {
        return Err(DiagnosticKind::InternalInvariantViolation(format!(
            "attribute lookup of `{name}` on non-struct type `{structure}`"
        )));
    };
    if let Some(own) = data.attributes.get(name) {
        return Ok(Some(own.clone()));
    }

    let mut found = None;
    for ancestor in &data.extends {
        if let Some(hit) = resolve_struct_attribute(ancestor, name, scopes)? {
            if found.is_some() {
                return Err(DiagnosticKind::InternalInvariantViolation(format!(
                    "member `{name}` is inherited ambiguously"
                )));
            }
            found = Some(hit);
        }
    }
    Ok(found)
}

/// Find a field on a class or its ancestors: own fields first, then each
/// `extends` entry. If more than one ancestor defines the name, the
/// declaration-time collision check should already have rejected the class.
///
/// # Errors
/// [`DiagnosticKind::InternalInvariantViolation`] on a non-class input or on
/// an ambiguous inherited name.
pub fn resolve_class_field<'input>(
    class: &Type<'input>,
    name: &str,
    scopes: &ScopeArena<'input>,
) -> Result<Option<LetBinding<'input>>, DiagnosticKind> {
    resolve_inherited(class, name, scopes, &|data: &crate::ty::ClassType<'input>| {
        data.fields.get(name).cloned()
    })
}

/// Find a method on a class or its ancestors: own methods first, then each
/// `extends` entry.
///
/// # Errors
/// [`DiagnosticKind::InternalInvariantViolation`] on a non-class input or on
/// an ambiguous inherited name.
pub fn resolve_class_method<'input>(
    class: &Type<'input>,
    name: &str,
    scopes: &ScopeArena<'input>,
) -> Result<Option<Fn<'input>>, DiagnosticKind> {
    resolve_inherited(class, name, scopes, &|data: &crate::ty::ClassType<'input>| {
        data.methods.get(name).cloned()
    })
}

/// Shared own-members-then-ancestors walk for class member lookup
fn resolve_inherited<'input, T>(
    class: &Type<'input>,
    name: &str,
    scopes: &ScopeArena<'input>,
    pick: &dyn core::ops::Fn(&crate::ty::ClassType<'input>) -> Option<T>,
) -> Result<Option<T>, DiagnosticKind> {
    let normalized = class.normalized(scopes)?;
    let TypeKind::Class(data) = &normalized.kind else {
        return Err(DiagnosticKind::InternalInvariantViolation(format!(
            "class member lookup of `{name}` on non-class type `{class}`"
        )));
    };
    if let Some(own) = pick(data) {
        return Ok(Some(own));
    }

    let mut found = None;
    for ancestor in &data.extends {
        if let Some(hit) = resolve_inherited(ancestor, name, scopes, pick)? {
            if found.is_some() {
                return Err(DiagnosticKind::InternalInvariantViolation(format!(
                    "member `{name}` is inherited ambiguously"
                )));
            }
            found = Some(hit);
        }
    }
    Ok(found)
}

/// Find a method on an interface or its ancestors: own methods first, then
/// each `extends` entry.
///
/// # Errors
/// [`DiagnosticKind::InternalInvariantViolation`] on a non-interface input
/// or on an ambiguous inherited name.
pub fn resolve_interface_method<'input>(
    interface: &Type<'input>,
    name: &str,
    scopes: &ScopeArena<'input>,
) -> Result<Option<Fn<'input>>, DiagnosticKind> {
    let normalized = interface.normalized(scopes)?;
    let TypeKind::Interface(data) = &normalized.kind else {
        return Err(DiagnosticKind::InternalInvariantViolation(format!(
            "interface method lookup of `{name}` on non-interface type `{interface}`"
        )));
    };
    if let Some(own) = data.methods.get(name) {
        return Ok(Some(own.clone()));
    }

    let mut found = None;
    for ancestor in &data.extends {
        if let Some(hit) = resolve_interface_method(ancestor, name, scopes)? {
            if found.is_some() {
                return Err(DiagnosticKind::InternalInvariantViolation(format!(
                    "member `{name}` is inherited ambiguously"
                )));
            }
            found = Some(hit);
        }
    }
    Ok(found)
}
